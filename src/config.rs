//! Runtime configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const API_URL_VAR: &str = "QUILL_API_URL";
const ACCESS_TOKEN_VAR: &str = "QUILL_ACCESS_TOKEN";
const STORAGE_DIR_VAR: &str = "QUILL_STORAGE_DIR";
const HTTP_TIMEOUT_VAR: &str = "QUILL_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API, without trailing slash.
    pub api_base_url: String,
    /// Token to start the session with, if any.
    pub access_token: Option<String>,
    /// Directory holding the durable local storage file.
    pub storage_dir: PathBuf,
    /// Per-request timeout for remote calls. `None` means no timeout.
    pub http_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            storage_dir: default_storage_dir(),
            http_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = var(API_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                log::info!("{API_URL_VAR} not set, using default: {}", defaults.api_base_url);
                defaults.api_base_url
            });

        let http_timeout = var(HTTP_TIMEOUT_VAR).and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Invalid {HTTP_TIMEOUT_VAR} value {raw:?}: {e}");
                None
            }
        });

        Self {
            api_base_url,
            access_token: var(ACCESS_TOKEN_VAR),
            storage_dir: var(STORAGE_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.storage_dir),
            http_timeout,
        }
    }

    /// Replaces the API base URL, e.g. from a command-line argument.
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join("rquill")
}
