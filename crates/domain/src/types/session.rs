//! Session and handoff types
//!
//! The credential is owned exclusively by the client after handoff; the
//! relay never retains it. The handoff message is the only channel by which
//! the credential crosses from the relay's response context into the client.

use serde::{Deserialize, Serialize};

use super::identity::Identity;

/// Bearer credential held by the client after a completed login
///
/// Expiry is intentionally not tracked; the credential lives until explicit
/// logout or a failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Create a credential from an access token and optional refresh token
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token }
    }
}

/// Authentication state of the client session
///
/// Exactly one instance per session manager; mutated only by the manager
/// and observed by consuming UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "detail")]
pub enum AuthSessionState {
    #[default]
    Unauthenticated,
    Pending,
    Authenticated(Identity),
    Error(String),
}

impl AuthSessionState {
    /// Whether the session currently holds a verified identity
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Whether a login attempt is in flight
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Structured message posted by the handoff document to the opening window
///
/// Serialized into the callback page by the relay and consumed by the
/// client's pairing channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HandoffMessage {
    #[serde(rename = "AUTH_SUCCESS")]
    Success {
        access_token: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        refresh_token: Option<String>,
        identity: Identity,
    },
    #[serde(rename = "AUTH_ERROR")]
    Error { error: String },
}
