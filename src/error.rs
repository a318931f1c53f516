//! Error types for the Twitter and Google Sheets clients

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while resolving a user or walking their timeline
#[derive(Debug, Error)]
pub enum TwitterError {
    /// The request never produced a response (network, TLS, DNS)
    #[error("Twitter request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status (bad token lands here)
    #[error("Twitter API error: {status}: {message}")]
    Status {
        /// HTTP status returned
        status: StatusCode,
        /// Error detail taken from the response body
        message: String,
    },

    /// A 200 response that carried only an `errors` array (protected or
    /// suspended account, revoked access)
    #[error("Twitter API refused the request: {detail}")]
    Refused {
        /// Detail of the first reported problem
        detail: String,
    },

    /// The handle does not belong to any account
    #[error("no Twitter account named @{handle}: {detail}")]
    UnknownUser {
        /// Handle that was looked up
        handle: String,
        /// Detail reported by the API
        detail: String,
    },

    /// A follow-up page was needed but the last page carried no next token
    #[error("timeline exhausted after {fetched} of {requested} tweets")]
    Exhausted {
        /// Rows collected so far
        fetched: usize,
        /// Rows the caller asked for
        requested: usize,
    },

    /// The body was not the documented JSON envelope
    #[error("malformed Twitter response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A tweet lacked one of the fields a row needs
    #[error("tweet {id} is missing {field}")]
    MalformedRecord {
        /// Tweet id, or "<unknown>" if the id itself is missing
        id: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The bearer token environment variable is unset or empty
    #[error("environment variable {0} is not set")]
    MissingToken(String),
}

impl TwitterError {
    /// True for failures of the request itself rather than of its content.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::Refused { .. }
        )
    }
}

/// Errors raised while authorizing against or writing to Google Sheets
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Sheets request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Sheets API error: {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The service-account key could not be read or parsed
    #[error("service account key {path}: {reason}")]
    Credentials { path: String, reason: String },

    #[error("failed to sign service account assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
