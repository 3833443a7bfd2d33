//! Status bar UI rendering
//!
//! Shows the store status, pending writes and where settings are stored.

use crate::app::AppState;
use egui::RichText;
use rquill::StoreStatus;

/// Renders the status panel at the bottom of the window
pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let status = match state.settings.status() {
            StoreStatus::Uninitialized => "Starting",
            StoreStatus::Loading => "Loading",
            StoreStatus::Ready => "Ready",
        };
        ui.label(RichText::new(status).strong());

        if state.settings.is_saving() {
            ui.label(RichText::new("| Saving…").strong());
        }

        ui.label(RichText::new("|").strong());
        if state.is_authenticated() {
            ui.label(RichText::new(format!("Synced with {}", state.api_base_url)).strong());
        } else {
            ui.label(RichText::new("Offline, settings stay on this device").strong());
        }

        ui.label(RichText::new("|").strong());
        ui.label(format!("Storage: {}", state.storage_path.display()));

        if state.has_unsaved_changes() {
            ui.label(RichText::new("| Unsaved changes").strong().color(ui.visuals().warn_fg_color));
        }
    });
}
