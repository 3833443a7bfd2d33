//! Quill settings client
//!
//! Desktop front-end for the account settings of a Quill CMS user. The
//! window edits the settings groups, keeps them in local storage and, when
//! an access token is present, in the backend. The theme chosen in the
//! header follows the account theme and the other way round.
//!
//! The application is built with a small modular layout:
//! - `app/` - Application state and coordinators
//! - `ui/` - Panel rendering
//!
//! Stores, storage and the HTTP client live in the `rquill` library.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::anyhow;
use eframe::egui;

mod app;
mod ui;

use app::{AppState, ApplicationCoordinator, ThemeCoordinator};
use rquill::ClientConfig;
use std::time::Duration;
use ui::panel_manager::PanelManager;

/// Longest time the window waits for pending settings writes on close.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Initializes logging and configuration, then launches the window.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    // An optional first argument overrides the backend URL
    let mut config = ClientConfig::from_env();
    if let Some(url) = std::env::args().nth(1) {
        config = config.with_api_base_url(&url);
    }
    log::info!("Using settings API at {}", config.api_base_url);

    let state = AppState::new(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Quill Settings"),
        ..Default::default()
    };

    eframe::run_native(
        "Quill Settings",
        options,
        Box::new(move |_cc| Ok(Box::new(QuillApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}

/// The main application.
///
/// Delegates to coordinators:
/// - `ApplicationCoordinator` handles startup, store completions and interactions
/// - `ThemeCoordinator` handles OS theme detection and visuals
/// - `PanelManager` handles UI panel layout and rendering
struct QuillApp {
    state: AppState,
    /// Startup waits for the first frame, when the OS theme is known
    started: bool,
}

impl QuillApp {
    fn new(state: AppState) -> Self {
        Self { state, started: false }
    }
}

impl eframe::App for QuillApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.system_theme = ThemeCoordinator::detect_system_theme(ctx);

        if !self.started {
            self.state.settings.set_repaint_context(ctx);
            ApplicationCoordinator::startup(&mut self.state);
            self.started = true;
        }

        let now = ctx.input(|i| i.time);
        ApplicationCoordinator::process_frame(&mut self.state, now);

        ThemeCoordinator::apply_current_theme(ctx, &self.state);

        if let Some(interaction) = PanelManager::render_all_panels(ctx, &mut self.state) {
            ApplicationCoordinator::handle_interaction(&mut self.state, interaction);
        }
    }
}

impl Drop for QuillApp {
    fn drop(&mut self) {
        // Local writes land before remote calls, so giving up only loses
        // the server copy of the last edits
        if !self.state.settings.wait_idle_for(SHUTDOWN_DRAIN_TIMEOUT) {
            log::warn!(
                "Settings writes still pending after {SHUTDOWN_DRAIN_TIMEOUT:?}, exiting anyway"
            );
        }
    }
}
