pub mod auth;
pub mod config;
pub mod error;
pub mod io;
pub mod notify;
pub mod settings;
pub mod state;
pub mod storage;
pub mod sync;
pub mod theme;

// Export settings model
pub use settings::{
    AccountSettings, AccountTheme, CommentSettings, DigestFrequency, NotificationSettings,
    PartialAccountSettings, PartialCommentSettings, PartialNotificationSettings,
    PartialSecuritySettings, PartialUserSettings, SecuritySettings, UserSettings,
    DEFAULT_SETTINGS,
};

// Export persistence
pub use error::SettingsError;
pub use io::{HttpSettingsClient, LocalSettingsAdapter, RemoteSettings};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SharedStorage};
pub use sync::SettingsSynchronizer;

// Export stores and collaborators
pub use auth::{AuthProvider, SessionAuth};
pub use config::ClientConfig;
pub use notify::{Notification, NotificationKind, NotificationQueue, Notifier};
pub use state::{SettingsStore, StoreStatus, ThemePreference, ThemeStore};

// Export theme support
pub use theme::{
    adjust_brightness, hex_to_color32, with_alpha, AccentColor, Theme, ThemeColors, ThemeManager,
    ThemeName,
};
