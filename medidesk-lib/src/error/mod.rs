//! Error types

mod api;
mod auth;
mod field;
mod validation;

pub use api::*;
pub use auth::*;
pub use field::*;
pub use validation::*;

/// Top-level error type for the MediDesk client.
///
/// Wraps the per-concern error types so fallible operations can return a
/// single error across module boundaries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from an API call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Error from authentication or session handling.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Error accessing a record field.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A field failed validation before reaching the network.
    #[error("Validation failed: {0}")]
    Validation(FieldValidationError),
}

impl Error {
    /// Returns the user-facing message for this error.
    ///
    /// Used by the cache layer when building failure notifications.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(api) => api.user_message(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if this error represents an invalid session (HTTP 401).
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::Auth(AuthError::SessionInvalid))
    }
}
