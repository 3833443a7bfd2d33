//! Stores owning the client-side preference state.
//!
//! - Settings store (user settings, load/update/reset/sync lifecycle)
//! - Theme store (theme selection, accent color, system-theme gate)

mod settings_store;
mod theme_state;

pub use settings_store::{SettingsStore, StoreStatus};
pub use theme_state::{
    ThemePreference, ThemeStore, THEME_COLOR_KEY, THEME_KEY, USE_SYSTEM_THEME_KEY,
};
