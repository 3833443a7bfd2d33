//! Error taxonomy for settings persistence.
//!
//! Every variant is recovered inside the library; callers of the stores
//! never see these. They surface only from the adapters so the stores can
//! decide between falling back and notifying.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No access token available for a remote settings call")]
    Unauthenticated,
    #[error("Settings storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Error while communicating with the settings API: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Settings API responded with status {0}")]
    Status(u16),
    #[error("Error while parsing settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SettingsError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        SettingsError::StorageUnavailable(err.to_string())
    }
}

pub type Result<T, E = SettingsError> = std::result::Result<T, E>;
