//! Error types returned by the TrustFlow API client.

use thiserror::Error;

use super::auth::TokenStoreError;

/// Every failure a request can surface to the caller.
///
/// Nothing is retried or swallowed: a call either yields a parsed JSON body
/// or one of these.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered 401. The session token has already been cleared
    /// and the unauthorized handler notified by the time this is returned.
    #[error("HTTP 401: {body}")]
    Unauthorized { body: String },

    /// Any other non-success status, with the raw response body text.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A success response whose body was not the expected JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
