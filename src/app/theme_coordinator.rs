//! Theme detection and application.
//!
//! The visual side effects of the theme store live here: reading the OS
//! theme and pushing the selected palette into the egui context.

use crate::app::AppState;

/// Coordinates theme detection and application.
pub struct ThemeCoordinator;

impl ThemeCoordinator {
    /// OS light/dark preference as reported by the backend, if known.
    pub fn detect_system_theme(ctx: &egui::Context) -> Option<egui::Theme> {
        ctx.input(|i| i.raw.system_theme)
    }

    /// Applies the current theme to the egui context.
    ///
    /// Called every frame to ensure theme is correctly applied.
    pub fn apply_current_theme(ctx: &egui::Context, state: &AppState) {
        let visuals = state
            .theme_manager
            .visuals_for(state.theme.theme(), state.theme.theme_color());
        ctx.set_visuals(visuals);
    }
}
