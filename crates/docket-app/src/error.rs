//! Unified error taxonomy for task store operations.

use docket_core::{TaskId, ValidationError};
use docket_store_http::HttpStoreError;
use thiserror::Error;

/// Coarse classification that decides how a failure is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The session is gone; log out and drop task state.
    AuthExpired,
    /// The operation was abandoned; keep the last fetched state.
    NetworkOrServer,
    /// Input was rejected before reaching the store.
    Validation,
}

/// Errors surfaced by [`TaskStore`](crate::TaskStore) implementations and the board.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store no longer accepts the session token.
    #[error("login required: session expired")]
    AuthExpired,

    /// Input rejected locally.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Task id is not part of the fetched collection.
    #[error("task {0} not found")]
    UnknownTask(TaskId),

    /// The store answered with a failure status.
    #[error("server returned {status}: {message}")]
    Server {
        /// HTTP-style status code.
        status: u16,
        /// Message reported by the store.
        message: String,
    },

    /// The store could not be reached.
    #[error("network error: {0}")]
    Transport(String),

    /// The store answered with something unreadable.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthExpired => ErrorKind::AuthExpired,
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnknownTask(_) | Self::Server { .. } | Self::Transport(_) | Self::Decode(_) => {
                ErrorKind::NetworkOrServer
            }
        }
    }

    /// Returns true when the session must be dropped.
    #[must_use]
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::Server {
            status: 404,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::Server {
            status: 400,
            message: message.into(),
        }
    }
}

impl From<HttpStoreError> for StoreError {
    fn from(err: HttpStoreError) -> Self {
        match err {
            HttpStoreError::Unauthorized(_) | HttpStoreError::MissingToken => Self::AuthExpired,
            HttpStoreError::InvalidCredentials(message) => Self::Server { status: 401, message },
            HttpStoreError::Api { status, message } => Self::Server { status, message },
            HttpStoreError::InvalidUrl { .. } | HttpStoreError::Transport(_) => Self::Transport(err.to_string()),
            HttpStoreError::Decode { .. } => Self::Decode(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_becomes_auth_expired() {
        let err = StoreError::from(HttpStoreError::Unauthorized("Token is invalid!".into()));
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        let missing = StoreError::from(HttpStoreError::MissingToken);
        assert!(missing.is_auth_expired());
    }

    #[test]
    fn bad_credentials_are_not_a_session_expiry() {
        let err = StoreError::from(HttpStoreError::InvalidCredentials("Invalid username or password".into()));
        assert_eq!(err.kind(), ErrorKind::NetworkOrServer);
        assert!(err.to_string().contains("Invalid username or password"));
    }

    #[test]
    fn api_errors_keep_status_and_message() {
        let err = StoreError::from(HttpStoreError::Api {
            status: 404,
            message: "Task not found".into(),
        });
        assert!(matches!(err, StoreError::Server { status: 404, ref message } if message == "Task not found"));
    }

    #[test]
    fn validation_errors_are_classified() {
        let err = StoreError::from(ValidationError::EmptyTitle);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(StoreError::UnknownTask(TaskId(3)).kind(), ErrorKind::NetworkOrServer);
    }
}
