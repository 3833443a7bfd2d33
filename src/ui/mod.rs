//! UI modules for the Quill settings client.
//!
//! - `header` - theme controls and sign-in
//! - `settings_panel` - editors for the four settings groups
//! - `status_bar` - load/save/auth status
//! - `toasts` - notification overlay
//! - `panel_manager` - panel layout and interaction routing

pub mod header;
pub mod panel_manager;
pub mod settings_panel;
pub mod status_bar;
pub mod toasts;
