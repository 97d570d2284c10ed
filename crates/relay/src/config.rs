//! Relay configuration
//!
//! Loads the relay's runtime configuration from environment variables
//! (optionally populated from a `.env` file by the binary).
//!
//! ## Environment Variables
//! - `LARKWIRE_CLIENT_ID`: upstream OAuth client identifier (required)
//! - `LARKWIRE_CLIENT_SECRET`: confidential client secret (required)
//! - `LARKWIRE_PUBLIC_URL`: public base URL of this relay; the callback
//!   redirect target is `<public_url>/callback` (required)
//! - `LARKWIRE_LISTEN_ADDR`: socket address to bind (default `127.0.0.1:8787`)
//! - `LARKWIRE_UPSTREAM_AUTH_URL`: upstream authorization page
//! - `LARKWIRE_UPSTREAM_API_URL`: upstream API base URL
//! - `LARKWIRE_CORRELATION_TTL_SECS`: correlation entry TTL (default 600)

use std::fmt;
use std::time::Duration;

use larkwire_domain::constants::CORRELATION_TTL_SECS;
use larkwire_domain::{LarkwireError, Result};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_UPSTREAM_AUTH_URL: &str = "https://twitter.com/i/oauth2/authorize";
const DEFAULT_UPSTREAM_API_URL: &str = "https://api.twitter.com";

/// Runtime configuration for the relay binary
#[derive(Clone)]
pub struct RelayConfig {
    /// Upstream OAuth client identifier (server-held, never sent to clients)
    pub client_id: String,
    /// Confidential client secret for the Basic-authenticated token exchange
    pub client_secret: String,
    /// Public base URL of this relay
    pub public_url: String,
    /// Socket address the server binds to
    pub listen_addr: String,
    /// Upstream authorization page URL
    pub upstream_auth_url: String,
    /// Upstream API base URL (token, identity, timeline endpoints)
    pub upstream_api_url: String,
    /// Lifetime of a pending authorization attempt
    pub correlation_ttl: Duration,
}

impl RelayConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns `LarkwireError::Config` if a required variable is missing or
    /// a numeric variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let client_id = env_var("LARKWIRE_CLIENT_ID")?;
        let client_secret = env_var("LARKWIRE_CLIENT_SECRET")?;
        let public_url = env_var("LARKWIRE_PUBLIC_URL")?;

        let listen_addr = env_or("LARKWIRE_LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let upstream_auth_url = env_or("LARKWIRE_UPSTREAM_AUTH_URL", DEFAULT_UPSTREAM_AUTH_URL);
        let upstream_api_url = env_or("LARKWIRE_UPSTREAM_API_URL", DEFAULT_UPSTREAM_API_URL);

        let ttl_secs = match std::env::var("LARKWIRE_CORRELATION_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                LarkwireError::Config(format!("Invalid correlation TTL: {e}"))
            })?,
            Err(_) => CORRELATION_TTL_SECS,
        };

        Ok(Self {
            client_id,
            client_secret,
            public_url: public_url.trim_end_matches('/').to_string(),
            listen_addr,
            upstream_auth_url,
            upstream_api_url,
            correlation_ttl: Duration::from_secs(ttl_secs),
        })
    }

    /// The redirect target registered with the upstream provider
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.public_url)
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("public_url", &self.public_url)
            .field("listen_addr", &self.listen_addr)
            .field("upstream_auth_url", &self.upstream_auth_url)
            .field("upstream_api_url", &self.upstream_api_url)
            .field("correlation_ttl", &self.correlation_ttl)
            .finish()
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| LarkwireError::Config(format!("Missing environment variable: {name}")))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
