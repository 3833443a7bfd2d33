//! Header panel UI rendering
//!
//! Handles the top bar with theme controls and sign-in.

use crate::app::AppState;
use crate::ui::panel_manager::PanelInteraction;
use rquill::{AccentColor, ThemeName};

/// Renders the application header with theme and account controls
///
/// # Arguments
/// * `ui` - The egui UI context for drawing
/// * `state` - Mutable reference to application state
///
/// # Returns
/// * `Option<PanelInteraction>` - User interaction result
pub fn render_header(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        ui.heading("Quill");
        ui.separator();

        ui.label("Theme:");
        let old_theme = state.theme.theme();
        let mut current_theme = old_theme;
        egui::ComboBox::from_id_salt("theme_selector")
            .selected_text(current_theme.label())
            .show_ui(ui, |ui| {
                for theme in ThemeName::ALL {
                    ui.selectable_value(&mut current_theme, theme, theme.label());
                }
            });
        if current_theme != old_theme {
            interaction = Some(PanelInteraction::ThemeSelected(current_theme));
        }

        if ui
            .button("◐")
            .on_hover_text(format!("Switch to {}", state.theme.theme().next().label()))
            .clicked()
        {
            interaction = Some(PanelInteraction::ThemeToggled);
        }

        ui.label("Accent:");
        let old_accent = state.theme.theme_color();
        let mut current_accent = old_accent;
        egui::ComboBox::from_id_salt("accent_selector")
            .selected_text(egui::RichText::new(current_accent.label()).color(current_accent.color()))
            .show_ui(ui, |ui| {
                for accent in AccentColor::ALL {
                    ui.selectable_value(
                        &mut current_accent,
                        accent,
                        egui::RichText::new(accent.label()).color(accent.color()),
                    );
                }
            });
        if current_accent != old_accent {
            interaction = Some(PanelInteraction::AccentSelected(current_accent));
        }

        let mut use_system = state.theme.use_system_theme();
        let system_response = ui.checkbox(&mut use_system, "Use system theme");
        if system_response.changed() {
            interaction = Some(PanelInteraction::UseSystemThemeChanged(use_system));
        }
        if state.system_theme.is_none() {
            system_response.on_hover_text("The OS theme is not known yet; the current theme is kept");
        }

        // Push account controls to the right
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if state.is_authenticated() {
                if ui.button("Sign out").clicked() {
                    interaction = Some(PanelInteraction::SignOutRequested);
                }
                ui.label("✔ Signed in");
            } else {
                let sign_in_clicked = ui.button("Sign in").clicked();
                let response = egui::TextEdit::singleline(&mut state.token_input)
                    .hint_text("Access token")
                    .password(true)
                    .desired_width(180.0)
                    .show(ui)
                    .response;

                let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (sign_in_clicked || enter_pressed) && !state.token_input.trim().is_empty() {
                    interaction = Some(PanelInteraction::SignInRequested(state.token_input.clone()));
                }
            }
        });
    });

    interaction
}
