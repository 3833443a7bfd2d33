//! Remote settings persistence over the backend REST API.
//!
//! The backend exposes a single settings resource per user at
//! `GET`/`PUT {base}/v1/users/me/settings`, authenticated with a bearer
//! token. Bodies use snake_case field names, so the in-memory model is
//! mapped through `SettingsPayload` at this boundary.

use crate::auth::AuthProvider;
use crate::config::ClientConfig;
use crate::error::{Result, SettingsError};
use crate::settings::{
    AccountSettings, AccountTheme, CommentSettings, DigestFrequency, NotificationSettings,
    SecuritySettings, UserSettings,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SETTINGS_PATH: &str = "/v1/users/me/settings";

/// Remote copy of the current user's settings.
pub trait RemoteSettings: Send + Sync {
    /// Fetches the stored settings. Fails with `Unauthenticated` when no
    /// access token is available; transport errors are returned as is.
    fn load(&self) -> Result<UserSettings>;

    /// Upserts the full settings object and returns what the server stored,
    /// which may be normalized.
    fn save(&self, settings: &UserSettings) -> Result<UserSettings>;
}

// ===== Wire format =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentsPayload {
    pub require_approval: bool,
    pub allow_anonymous: bool,
    pub notify_on_new: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPayload {
    pub two_factor_enabled: bool,
    pub session_timeout_minutes: u32,
    pub login_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsPayload {
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub notify_on_new_articles: bool,
    pub notify_on_replies: bool,
    pub digest_frequency: DigestFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPayload {
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    pub show_email: bool,
    pub language: String,
    pub theme: AccountTheme,
}

/// Settings body as sent to and received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub comments: CommentsPayload,
    pub security: SecurityPayload,
    pub notifications: NotificationsPayload,
    pub account: AccountPayload,
}

impl From<&UserSettings> for SettingsPayload {
    fn from(s: &UserSettings) -> Self {
        Self {
            comments: CommentsPayload {
                require_approval: s.comments.require_approval,
                allow_anonymous: s.comments.allow_anonymous,
                notify_on_new: s.comments.notify_on_new,
            },
            security: SecurityPayload {
                two_factor_enabled: s.security.two_factor_enabled,
                session_timeout_minutes: s.security.session_timeout_minutes,
                login_notifications: s.security.login_notifications,
            },
            notifications: NotificationsPayload {
                email_enabled: s.notifications.email_enabled,
                push_enabled: s.notifications.push_enabled,
                notify_on_new_articles: s.notifications.notify_on_new_articles,
                notify_on_replies: s.notifications.notify_on_replies,
                digest_frequency: s.notifications.digest_frequency,
            },
            account: AccountPayload {
                display_name: s.account.display_name.clone(),
                bio: s.account.bio.clone(),
                show_email: s.account.show_email,
                language: s.account.language.clone(),
                theme: s.account.theme,
            },
        }
    }
}

impl From<SettingsPayload> for UserSettings {
    fn from(p: SettingsPayload) -> Self {
        UserSettings {
            comments: CommentSettings {
                require_approval: p.comments.require_approval,
                allow_anonymous: p.comments.allow_anonymous,
                notify_on_new: p.comments.notify_on_new,
            },
            security: SecuritySettings {
                two_factor_enabled: p.security.two_factor_enabled,
                session_timeout_minutes: p.security.session_timeout_minutes,
                login_notifications: p.security.login_notifications,
            },
            notifications: NotificationSettings {
                email_enabled: p.notifications.email_enabled,
                push_enabled: p.notifications.push_enabled,
                notify_on_new_articles: p.notifications.notify_on_new_articles,
                notify_on_replies: p.notifications.notify_on_replies,
                digest_frequency: p.notifications.digest_frequency,
            },
            account: AccountSettings {
                display_name: p.account.display_name,
                bio: p.account.bio,
                show_email: p.account.show_email,
                language: p.account.language,
                theme: p.account.theme,
            },
        }
        .normalized()
    }
}

// ===== HTTP client =====

/// `RemoteSettings` implementation using a blocking `reqwest` client.
///
/// Calls block the current thread; the stores only invoke it from the
/// write-queue worker.
pub struct HttpSettingsClient {
    client: Client,
    url: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpSettingsClient {
    pub fn new(config: &ClientConfig, auth: Arc<dyn AuthProvider>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rquill/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}{SETTINGS_PATH}", config.api_base_url.trim_end_matches('/')),
            auth,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.auth.access_token().ok_or(SettingsError::Unauthenticated)?;
        Ok(request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json"))
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SettingsError::Unauthenticated);
    }
    if !status.is_success() {
        return Err(SettingsError::Status(status.as_u16()));
    }
    Ok(response)
}

impl RemoteSettings for HttpSettingsClient {
    fn load(&self) -> Result<UserSettings> {
        let response = self.authorized(self.client.get(&self.url))?.send()?;
        let payload: SettingsPayload = check_status(response)?.json()?;
        Ok(payload.into())
    }

    fn save(&self, settings: &UserSettings) -> Result<UserSettings> {
        let body = SettingsPayload::from(settings);
        let response = self.authorized(self.client.put(&self.url))?.json(&body).send()?;
        let response = check_status(response)?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(settings.clone());
        }
        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(settings.clone());
        }
        let payload: SettingsPayload = serde_json::from_str(&text)?;
        Ok(payload.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionAuth;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_payload_uses_snake_case() {
        let json = serde_json::to_value(SettingsPayload::from(&UserSettings::default())).unwrap();
        assert_eq!(json["comments"]["require_approval"], true);
        assert_eq!(json["security"]["session_timeout_minutes"], 30);
        assert_eq!(json["notifications"]["notify_on_new_articles"], true);
        assert_eq!(json["notifications"]["digest_frequency"], "weekly");
        assert_eq!(json["account"]["display_name"], "");
        assert!(json["comments"].get("requireApproval").is_none());
    }

    #[test]
    fn test_payload_maps_back() {
        let mut settings = UserSettings::default();
        settings.account.display_name = "Editor".to_string();
        settings.notifications.digest_frequency = DigestFrequency::Daily;
        settings.account.theme = AccountTheme::Dark;

        let restored = UserSettings::from(SettingsPayload::from(&settings));
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_server_values_are_normalized() {
        let mut payload = SettingsPayload::from(&UserSettings::default());
        payload.security.session_timeout_minutes = 0;
        let settings = UserSettings::from(payload);
        assert_eq!(settings.security.session_timeout_minutes, 5);
    }

    #[test]
    fn test_requests_without_token_fail_before_sending() {
        let config = ClientConfig::default().with_api_base_url("http://127.0.0.1:9/api/");
        let client = HttpSettingsClient::new(&config, Arc::new(SessionAuth::new())).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:9/api/v1/users/me/settings");

        assert!(matches!(client.load(), Err(SettingsError::Unauthenticated)));
        assert!(matches!(
            client.save(&UserSettings::default()),
            Err(SettingsError::Unauthenticated)
        ));
    }

    fn signed_in_client(server: &MockServer) -> HttpSettingsClient {
        let config = ClientConfig::default().with_api_base_url(&server.url("/api"));
        let auth = Arc::new(SessionAuth::with_token(Some("secret".to_string())));
        HttpSettingsClient::new(&config, auth).unwrap()
    }

    #[test]
    fn test_load_sends_bearer_token_and_maps_payload() {
        let server = MockServer::start();
        let mut body = serde_json::to_value(SettingsPayload::from(&UserSettings::default())).unwrap();
        body["account"]["display_name"] = json!("Server");
        let mock = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/api/v1/users/me/settings")
                .header("authorization", "Bearer secret");
            then.status(200).json_body(body);
        });

        let settings = signed_in_client(&server).load().unwrap();
        mock.assert();
        assert_eq!(settings.account.display_name, "Server");
    }

    #[test]
    fn test_unauthorized_maps_to_unauthenticated() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/api/v1/users/me/settings");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(Method::PUT).path("/api/v1/users/me/settings");
            then.status(500);
        });

        let client = signed_in_client(&server);
        assert!(matches!(client.load(), Err(SettingsError::Unauthenticated)));
        assert!(matches!(
            client.save(&UserSettings::default()),
            Err(SettingsError::Status(500))
        ));
    }

    #[test]
    fn test_no_content_save_echoes_sent_value() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::PUT)
                .path("/api/v1/users/me/settings")
                .header("authorization", "Bearer secret");
            then.status(204);
        });

        let mut settings = UserSettings::default();
        settings.account.display_name = "Editor".to_string();
        let stored = signed_in_client(&server).save(&settings).unwrap();
        mock.assert();
        assert_eq!(stored, settings);
    }

    #[test]
    fn test_save_adopts_normalized_echo() {
        let server = MockServer::start();
        let mut echo = serde_json::to_value(SettingsPayload::from(&UserSettings::default())).unwrap();
        echo["account"]["language"] = json!("fr");
        server.mock(|when, then| {
            when.method(Method::PUT).path("/api/v1/users/me/settings");
            then.status(200).json_body(echo);
        });

        let stored = signed_in_client(&server).save(&UserSettings::default()).unwrap();
        assert_eq!(stored.account.language, "fr");
    }
}
