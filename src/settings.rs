//! User settings model.
//!
//! `UserSettings` is the aggregate edited on the settings page. It always
//! carries all four groups; partial edits arrive as `PartialUserSettings`
//! and are merged field by field so a group is never replaced by an
//! incomplete one.
//!
//! The serialized shape (camelCase) is the one kept in local storage under
//! the `user_settings` key. The backend uses a different, snake_case shape,
//! see `io::remote_client`.
//!
//! # Examples
//!
//! ```
//! use rquill::settings::{PartialCommentSettings, PartialUserSettings, UserSettings};
//!
//! let mut settings = UserSettings::default();
//! settings.merge(PartialUserSettings {
//!     comments: Some(PartialCommentSettings {
//!         allow_anonymous: Some(true),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! });
//! assert!(settings.comments.allow_anonymous);
//! assert!(settings.comments.require_approval);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Lower bound for `SecuritySettings::session_timeout_minutes`.
pub const MIN_SESSION_TIMEOUT_MINUTES: u32 = 5;
/// Upper bound for `SecuritySettings::session_timeout_minutes` (one day).
pub const MAX_SESSION_TIMEOUT_MINUTES: u32 = 1440;

const DEFAULT_LANGUAGE: &str = "en";

/// Fallback for any missing or corrupt stored settings value.
pub static DEFAULT_SETTINGS: Lazy<UserSettings> = Lazy::new(UserSettings::default);

/// How often the e-mail digest is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestFrequency {
    Daily,
    #[default]
    Weekly,
    Never,
}

impl DigestFrequency {
    pub const ALL: [DigestFrequency; 3] = [Self::Daily, Self::Weekly, Self::Never];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Never => "never",
        }
    }
}

/// Theme selection as stored in the account group.
///
/// This is a projection of the richer theme state owned by
/// `state::ThemeStore`; see `ThemeStore::account_theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountTheme {
    Light,
    Dark,
    #[default]
    System,
}

impl AccountTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentSettings {
    pub require_approval: bool,
    pub allow_anonymous: bool,
    pub notify_on_new: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            require_approval: true,
            allow_anonymous: false,
            notify_on_new: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    /// Idle minutes before the session expires, kept within
    /// `MIN_SESSION_TIMEOUT_MINUTES..=MAX_SESSION_TIMEOUT_MINUTES`.
    pub session_timeout_minutes: u32,
    pub login_notifications: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            session_timeout_minutes: 30,
            login_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub notify_on_new_articles: bool,
    pub notify_on_replies: bool,
    pub digest_frequency: DigestFrequency,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            push_enabled: false,
            notify_on_new_articles: true,
            notify_on_replies: true,
            digest_frequency: DigestFrequency::Weekly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountSettings {
    pub display_name: String,
    pub bio: String,
    pub show_email: bool,
    /// Locale tag such as `en` or `pt-BR`.
    pub language: String,
    pub theme: AccountTheme,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            bio: String::new(),
            show_email: false,
            language: DEFAULT_LANGUAGE.to_string(),
            theme: AccountTheme::System,
        }
    }
}

/// The persisted, user-editable preference aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub comments: CommentSettings,
    pub security: SecuritySettings,
    pub notifications: NotificationSettings,
    pub account: AccountSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialCommentSettings {
    pub require_approval: Option<bool>,
    pub allow_anonymous: Option<bool>,
    pub notify_on_new: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialSecuritySettings {
    pub two_factor_enabled: Option<bool>,
    pub session_timeout_minutes: Option<u32>,
    pub login_notifications: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialNotificationSettings {
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub notify_on_new_articles: Option<bool>,
    pub notify_on_replies: Option<bool>,
    pub digest_frequency: Option<DigestFrequency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAccountSettings {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub show_email: Option<bool>,
    pub language: Option<String>,
    pub theme: Option<AccountTheme>,
}

/// A sparse edit of `UserSettings`. Absent groups and fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialUserSettings {
    pub comments: Option<PartialCommentSettings>,
    pub security: Option<PartialSecuritySettings>,
    pub notifications: Option<PartialNotificationSettings>,
    pub account: Option<PartialAccountSettings>,
}

impl PartialUserSettings {
    /// A partial touching only `account.theme`.
    pub fn account_theme(theme: AccountTheme) -> Self {
        Self {
            account: Some(PartialAccountSettings {
                theme: Some(theme),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Returns true if the partial carries no field at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn apply<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn changed<T: PartialEq + Clone>(current: &T, next: &T) -> Option<T> {
    (current != next).then(|| next.clone())
}

fn non_empty<T: Default + PartialEq>(group: T) -> Option<T> {
    (group != T::default()).then_some(group)
}

impl UserSettings {
    /// Merges `partial` into `self`, group by group and field by field.
    pub fn merge(&mut self, partial: PartialUserSettings) {
        if let Some(c) = partial.comments {
            apply(&mut self.comments.require_approval, c.require_approval);
            apply(&mut self.comments.allow_anonymous, c.allow_anonymous);
            apply(&mut self.comments.notify_on_new, c.notify_on_new);
        }
        if let Some(s) = partial.security {
            apply(&mut self.security.two_factor_enabled, s.two_factor_enabled);
            apply(&mut self.security.session_timeout_minutes, s.session_timeout_minutes);
            apply(&mut self.security.login_notifications, s.login_notifications);
        }
        if let Some(n) = partial.notifications {
            apply(&mut self.notifications.email_enabled, n.email_enabled);
            apply(&mut self.notifications.push_enabled, n.push_enabled);
            apply(&mut self.notifications.notify_on_new_articles, n.notify_on_new_articles);
            apply(&mut self.notifications.notify_on_replies, n.notify_on_replies);
            apply(&mut self.notifications.digest_frequency, n.digest_frequency);
        }
        if let Some(a) = partial.account {
            apply(&mut self.account.display_name, a.display_name);
            apply(&mut self.account.bio, a.bio);
            apply(&mut self.account.show_email, a.show_email);
            apply(&mut self.account.language, a.language);
            apply(&mut self.account.theme, a.theme);
        }
        self.normalize();
    }

    /// Returns a copy of `self` with `partial` merged in.
    pub fn merged(&self, partial: PartialUserSettings) -> Self {
        let mut next = self.clone();
        next.merge(partial);
        next
    }

    /// The fields of `other` that differ from `self`, as a partial that
    /// turns `self` into `other` when merged.
    pub fn diff(&self, other: &UserSettings) -> PartialUserSettings {
        let (a, b) = (&self.comments, &other.comments);
        let comments = PartialCommentSettings {
            require_approval: changed(&a.require_approval, &b.require_approval),
            allow_anonymous: changed(&a.allow_anonymous, &b.allow_anonymous),
            notify_on_new: changed(&a.notify_on_new, &b.notify_on_new),
        };
        let (a, b) = (&self.security, &other.security);
        let security = PartialSecuritySettings {
            two_factor_enabled: changed(&a.two_factor_enabled, &b.two_factor_enabled),
            session_timeout_minutes: changed(&a.session_timeout_minutes, &b.session_timeout_minutes),
            login_notifications: changed(&a.login_notifications, &b.login_notifications),
        };
        let (a, b) = (&self.notifications, &other.notifications);
        let notifications = PartialNotificationSettings {
            email_enabled: changed(&a.email_enabled, &b.email_enabled),
            push_enabled: changed(&a.push_enabled, &b.push_enabled),
            notify_on_new_articles: changed(&a.notify_on_new_articles, &b.notify_on_new_articles),
            notify_on_replies: changed(&a.notify_on_replies, &b.notify_on_replies),
            digest_frequency: changed(&a.digest_frequency, &b.digest_frequency),
        };
        let (a, b) = (&self.account, &other.account);
        let account = PartialAccountSettings {
            display_name: changed(&a.display_name, &b.display_name),
            bio: changed(&a.bio, &b.bio),
            show_email: changed(&a.show_email, &b.show_email),
            language: changed(&a.language, &b.language),
            theme: changed(&a.theme, &b.theme),
        };

        PartialUserSettings {
            comments: non_empty(comments),
            security: non_empty(security),
            notifications: non_empty(notifications),
            account: non_empty(account),
        }
    }

    /// Brings out-of-range values back into their documented bounds.
    pub fn normalize(&mut self) {
        self.security.session_timeout_minutes = self
            .security
            .session_timeout_minutes
            .clamp(MIN_SESSION_TIMEOUT_MINUTES, MAX_SESSION_TIMEOUT_MINUTES);

        let language = self.account.language.trim();
        if language.is_empty() {
            self.account.language = DEFAULT_LANGUAGE.to_string();
        } else if language.len() != self.account.language.len() {
            self.account.language = language.to_string();
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }
}
