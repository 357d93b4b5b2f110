//! Authentication and session error types

/// Errors that can occur during authentication or session handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The server rejected the session token (HTTP 401).
    ///
    /// This is a global signal: the consuming application should drop the
    /// stored session and return to the login screen.
    #[error("Session is no longer valid")]
    SessionInvalid,

    /// Invalid username, password or one-time code.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The principal lacks a permission required for the operation.
    #[error("Missing permission: {permission}")]
    MissingPermission { permission: String },

    /// The session store failed to load or persist a session.
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Creates a missing-permission error.
    pub fn missing_permission(permission: impl Into<String>) -> Self {
        Self::MissingPermission {
            permission: permission.into(),
        }
    }
}
