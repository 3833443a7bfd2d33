//! Persistence boundaries: local storage, backend API, and the ordered
//! background writer in front of both.

pub mod local_store;
pub mod remote_client;
pub mod write_queue;

// Re-export commonly used types
pub use local_store::{LocalSettingsAdapter, SETTINGS_KEY};
pub use remote_client::{HttpSettingsClient, RemoteSettings, SettingsPayload};
pub use write_queue::{Completion, SaveOrigin, Sequence, WriteIntent, WriteQueue};
