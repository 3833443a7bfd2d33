//! Application-level coordination and workflow management.
//!
//! Turns panel interactions into store operations and keeps the two stores
//! consistent with each other once per frame.

use crate::app::{AppState, Toast};
use crate::ui::panel_manager::PanelInteraction;
use rquill::{NotificationKind, Notifier, ThemeStore};

/// Coordinates application-level operations and workflows.
///
/// This struct is responsible for:
/// - Restoring state on startup
/// - Applying background completions every frame
/// - Forwarding theme changes into the account settings and back
/// - Handling user interactions
pub struct ApplicationCoordinator;

impl ApplicationCoordinator {
    /// Restores the theme and settings. Called once, before the first frame.
    pub fn startup(state: &mut AppState) {
        state.theme.initialize(state.system_theme);
        state.settings.load();
        state.revert_draft();
    }

    /// Folds finished background work into the state.
    ///
    /// Called once per frame in the update loop.
    pub fn process_frame(state: &mut AppState, now: f64) {
        if state.settings.poll() {
            state.refresh_draft();
        }

        // User theme edits flow into the account group...
        if let Some(partial) = state.theme.take_remote_save_request() {
            state.settings.update_settings_in_background(partial);
            state.refresh_draft();
        }
        // ...and account edits or server copies flow back into the theme.
        if let Some(account_theme) = state.settings.take_account_theme_change() {
            Self::reconcile_theme(&mut state.theme, account_theme, state.system_theme);
        }

        for notification in state.notifications.drain() {
            state.toasts.push(Toast {
                notification,
                shown_at: now,
            });
        }
    }

    fn reconcile_theme(
        theme: &mut ThemeStore,
        account_theme: rquill::AccountTheme,
        system: Option<egui::Theme>,
    ) {
        if theme.reconcile_with_account(account_theme, system) {
            log::info!("Theme changed to {} from account settings", theme.theme());
        }
    }

    /// Handles one user interaction.
    pub fn handle_interaction(state: &mut AppState, interaction: PanelInteraction) {
        match interaction {
            PanelInteraction::SaveRequested => {
                state.refresh_draft();
                let partial = state.pending_edits();
                if partial.is_empty() {
                    state
                        .notifications
                        .show_notification(NotificationKind::Info, "No changes to save");
                } else {
                    state.settings.update_settings(partial);
                    state.refresh_draft();
                }
            }
            PanelInteraction::RevertRequested => state.revert_draft(),
            PanelInteraction::ResetRequested => {
                state.settings.reset_settings();
                state.revert_draft();
            }
            PanelInteraction::SyncRequested => state.settings.sync_settings_with_server(),
            PanelInteraction::SignInRequested(token) => {
                state.auth.sign_in(token);
                if state.is_authenticated() {
                    state.token_input.clear();
                    state.theme.mirror_to_session();
                    state.settings.sync_settings_with_server();
                    state
                        .notifications
                        .show_notification(NotificationKind::Info, "Signed in");
                }
            }
            PanelInteraction::SignOutRequested => {
                state.theme.clear_session();
                state.auth.sign_out();
                state
                    .notifications
                    .show_notification(NotificationKind::Info, "Signed out");
            }
            PanelInteraction::ThemeSelected(theme) => state.theme.set_theme(theme),
            PanelInteraction::ThemeToggled => {
                state.theme.toggle_theme();
            }
            PanelInteraction::AccentSelected(color) => state.theme.set_theme_color(color),
            PanelInteraction::UseSystemThemeChanged(enabled) => {
                state.theme.set_use_system_theme(enabled, state.system_theme);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquill::{AccountTheme, ClientConfig, PartialAccountSettings, PartialUserSettings, ThemeName};
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn offline_state(name: &str) -> (AppState, PathBuf) {
        let dir = env::temp_dir().join(format!("rquill_app_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let config = ClientConfig {
            storage_dir: dir.clone(),
            ..ClientConfig::default()
        };
        let mut state = AppState::new(&config).unwrap();
        ApplicationCoordinator::startup(&mut state);
        (state, dir)
    }

    #[test]
    fn test_form_save_keeps_header_theme_choice() {
        let (mut state, dir) = offline_state("header_theme");
        state.draft.account.bio = "editing".to_string();

        ApplicationCoordinator::handle_interaction(&mut state, PanelInteraction::ThemeSelected(ThemeName::Light));
        ApplicationCoordinator::process_frame(&mut state, 0.0);
        assert_eq!(state.settings.settings().account.theme, AccountTheme::Light);
        assert_eq!(state.draft.account.theme, AccountTheme::Light);
        assert_eq!(state.draft.account.bio, "editing");

        ApplicationCoordinator::handle_interaction(&mut state, PanelInteraction::SaveRequested);
        state.settings.wait_idle();
        ApplicationCoordinator::process_frame(&mut state, 0.0);

        let saved = state.settings.settings();
        assert_eq!(saved.account.bio, "editing");
        assert_eq!(saved.account.theme, AccountTheme::Light);
        assert_eq!(state.theme.theme(), ThemeName::Light);
        assert!(!state.theme.use_system_theme());
        assert!(!state.has_unsaved_changes());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_store_changes_reach_untouched_draft_fields() {
        let (mut state, dir) = offline_state("untouched");
        state.draft.comments.allow_anonymous = true;

        let partial = PartialUserSettings {
            account: Some(PartialAccountSettings {
                display_name: Some("Server".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        state.settings.update_settings_in_background(partial);
        state.refresh_draft();

        assert_eq!(state.draft.account.display_name, "Server");
        assert!(state.draft.comments.allow_anonymous);
        assert_eq!(state.pending_edits().comments.and_then(|c| c.allow_anonymous), Some(true));
        assert!(state.pending_edits().account.is_none());

        state.settings.wait_idle();
        let _ = fs::remove_dir_all(&dir);
    }
}
