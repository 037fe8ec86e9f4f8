//! Error types for HTTP task store operations.

use thiserror::Error;

/// Errors that can occur while talking to the task server.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    /// The server rejected the session token (HTTP 401 on a protected call).
    #[error("session rejected by server: {0}")]
    Unauthorized(String),

    /// No session token was configured for a protected call.
    #[error("not logged in")]
    MissingToken,

    /// Login was refused because the username or password is wrong.
    #[error("login failed: {0}")]
    InvalidCredentials(String),

    /// Non-success status other than the cases above.
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Base URL could not be parsed or joined.
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        /// Offending input.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// Connection, timeout or protocol failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        /// Endpoint that produced the body.
        endpoint: String,
        /// Decode failure.
        #[source]
        source: serde_json::Error,
    },
}

impl HttpStoreError {
    /// Returns true when the server no longer accepts the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::MissingToken)
    }
}
