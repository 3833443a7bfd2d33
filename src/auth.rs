//! Authentication collaborator.
//!
//! The stores only need to know whether a user is signed in and which bearer
//! token to send. Sign-in itself happens elsewhere.

use std::sync::RwLock;

/// Source of the current access token.
pub trait AuthProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// Mutable sign-in state shared between the UI and the stores.
#[derive(Debug, Default)]
pub struct SessionAuth {
    token: RwLock<Option<String>>,
}

impl SessionAuth {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that starts signed in when `token` is non-blank.
    pub fn with_token(token: Option<String>) -> Self {
        let session = Self::new();
        if let Some(token) = token {
            session.sign_in(token);
        }
        session
    }

    /// Stores `token` as the active access token. Blank tokens sign out.
    pub fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        let token = token.trim();
        let mut slot = self.token.write().unwrap_or_else(|e| e.into_inner());
        *slot = if token.is_empty() { None } else { Some(token.to_string()) };
    }

    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl AuthProvider for SessionAuth {
    fn access_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
