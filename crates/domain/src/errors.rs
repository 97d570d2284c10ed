//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Larkwire
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LarkwireError {
    /// Required request parameter was absent
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// State token was never issued, already consumed, or expired
    #[error("Unknown or expired state token")]
    UnknownOrExpiredState,

    /// Upstream token endpoint rejected the authorization-code exchange
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Identity profile could not be fetched with the new access token
    #[error("Identity fetch failed: {0}")]
    IdentityFetchFailed(String),

    /// Bearer header missing or malformed
    #[error("Unauthorized")]
    Unauthorized,

    /// Syntactically valid bearer token rejected by the upstream
    #[error("Invalid token")]
    InvalidToken,

    /// Network-level failure reaching the upstream service
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream returned a non-success status that is mirrored to the caller
    #[error("Upstream error ({status}): {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Larkwire operations
pub type Result<T> = std::result::Result<T, LarkwireError>;
