//! Panel orchestration and layout management.
//!
//! Lays out the header, status bar, settings form and toast overlay, and
//! funnels their interactions into a single `PanelInteraction`.

use crate::app::AppState;
use crate::ui::{header, settings_panel, status_bar, toasts};
use rquill::{AccentColor, ThemeName};

/// Result of panel interactions that need to be handled by the application coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelInteraction {
    /// Persist the form edits
    SaveRequested,
    /// Discard the form edits
    RevertRequested,
    /// Restore default settings
    ResetRequested,
    /// Re-fetch the server copy
    SyncRequested,
    SignInRequested(String),
    SignOutRequested,
    ThemeSelected(ThemeName),
    ThemeToggled,
    AccentSelected(AccentColor),
    UseSystemThemeChanged(bool),
}

/// Manages the layout and rendering of all UI panels.
pub struct PanelManager;

impl PanelManager {
    /// Renders all panels in the application window.
    ///
    /// This is the main entry point for rendering the entire UI, called from
    /// the eframe::App::update() implementation.
    pub fn render_all_panels(ctx: &egui::Context, state: &mut AppState) -> Option<PanelInteraction> {
        let mut interaction: Option<PanelInteraction> = None;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            if let Some(header_interaction) = header::render_header(ui, state) {
                interaction = Some(header_interaction);
            }
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar::render_status_bar(ui, state);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(form_interaction) = settings_panel::render_settings_panel(ui, state) {
                interaction = Some(form_interaction);
            }
        });

        toasts::render_toasts(ctx, state);

        interaction
    }
}
