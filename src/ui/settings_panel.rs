//! Settings form rendering
//!
//! Edits a draft copy of the settings; nothing reaches the store until the
//! user presses Save.

use crate::app::AppState;
use crate::ui::panel_manager::PanelInteraction;
use rquill::settings::{MAX_SESSION_TIMEOUT_MINUTES, MIN_SESSION_TIMEOUT_MINUTES};
use rquill::{AccountTheme, DigestFrequency};

const ACCOUNT_THEMES: [AccountTheme; 3] = [AccountTheme::Light, AccountTheme::Dark, AccountTheme::System];

/// Renders the settings groups and the form actions
pub fn render_settings_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<PanelInteraction> {
    let mut interaction = None;

    if state.settings.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading settings…");
        });
        ui.separator();
    }

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        let draft = &mut state.draft;

        egui::CollapsingHeader::new("Comments")
            .default_open(true)
            .show(ui, |ui| {
                ui.checkbox(&mut draft.comments.require_approval, "Require approval before publishing");
                ui.checkbox(&mut draft.comments.allow_anonymous, "Allow anonymous comments");
                ui.checkbox(&mut draft.comments.notify_on_new, "Notify me about new comments");
            });

        egui::CollapsingHeader::new("Security")
            .default_open(true)
            .show(ui, |ui| {
                ui.checkbox(&mut draft.security.two_factor_enabled, "Two-factor authentication");
                ui.horizontal(|ui| {
                    ui.label("Session timeout:");
                    ui.add(
                        egui::DragValue::new(&mut draft.security.session_timeout_minutes)
                            .range(MIN_SESSION_TIMEOUT_MINUTES..=MAX_SESSION_TIMEOUT_MINUTES)
                            .suffix(" min"),
                    );
                });
                ui.checkbox(&mut draft.security.login_notifications, "Notify me about new logins");
            });

        egui::CollapsingHeader::new("Notifications")
            .default_open(true)
            .show(ui, |ui| {
                ui.checkbox(&mut draft.notifications.email_enabled, "E-mail notifications");
                ui.checkbox(&mut draft.notifications.push_enabled, "Push notifications");
                ui.checkbox(&mut draft.notifications.notify_on_new_articles, "New articles");
                ui.checkbox(&mut draft.notifications.notify_on_replies, "Replies to my comments");
                ui.horizontal(|ui| {
                    ui.label("Digest:");
                    egui::ComboBox::from_id_salt("digest_frequency")
                        .selected_text(draft.notifications.digest_frequency.as_str())
                        .show_ui(ui, |ui| {
                            for frequency in DigestFrequency::ALL {
                                ui.selectable_value(
                                    &mut draft.notifications.digest_frequency,
                                    frequency,
                                    frequency.as_str(),
                                );
                            }
                        });
                });
            });

        egui::CollapsingHeader::new("Account")
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("account_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Display name:");
                    ui.text_edit_singleline(&mut draft.account.display_name);
                    ui.end_row();

                    ui.label("Bio:");
                    ui.add(egui::TextEdit::multiline(&mut draft.account.bio).desired_rows(3));
                    ui.end_row();

                    ui.label("Language:");
                    ui.add(egui::TextEdit::singleline(&mut draft.account.language).desired_width(80.0));
                    ui.end_row();

                    ui.label("Theme:");
                    egui::ComboBox::from_id_salt("account_theme")
                        .selected_text(draft.account.theme.as_str())
                        .show_ui(ui, |ui| {
                            for theme in ACCOUNT_THEMES {
                                ui.selectable_value(&mut draft.account.theme, theme, theme.as_str());
                            }
                        });
                    ui.end_row();
                });
                ui.checkbox(&mut draft.account.show_email, "Show my e-mail on my profile");
            });
    });

    ui.separator();
    ui.horizontal(|ui| {
        let dirty = state.has_unsaved_changes();
        if ui.add_enabled(dirty, egui::Button::new("💾 Save")).clicked() {
            interaction = Some(PanelInteraction::SaveRequested);
        }
        if ui.add_enabled(dirty, egui::Button::new("Revert")).clicked() {
            interaction = Some(PanelInteraction::RevertRequested);
        }
        if ui.button("Reset to defaults").clicked() {
            interaction = Some(PanelInteraction::ResetRequested);
        }
        let sync = ui.add_enabled(state.is_authenticated(), egui::Button::new("⟳ Sync with server"));
        if sync.clicked() {
            interaction = Some(PanelInteraction::SyncRequested);
        }
        if state.settings.is_saving() {
            ui.spinner();
        }
    });

    interaction
}
