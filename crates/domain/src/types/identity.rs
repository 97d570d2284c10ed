//! Identity profile types
//!
//! The identity profile is derived read-only from the upstream identity
//! endpoint; field names follow its wire format. It is never persisted
//! server-side.

use serde::{Deserialize, Serialize};

/// Profile of the delegating account holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
}
