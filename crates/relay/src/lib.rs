//! # Larkwire Relay
//!
//! Stateless backend relay for the delegated-access authorization flow.
//!
//! The relay exposes four HTTP endpoints:
//! - `GET /start`: mint an authorization attempt (state + PKCE challenge)
//! - `GET /callback`: consume the upstream redirect, exchange the code,
//!   and hand the credential off to the opening window
//! - `GET /verify`: forward-validate a bearer credential
//! - `GET /timeline`: authenticated pass-through of the home timeline
//!
//! The only mutable state is the single-use correlation store; the bearer
//! credential itself never touches the relay beyond the callback response.

pub mod config;
pub mod error;
pub mod handlers;
pub mod handoff;
pub mod server;
pub mod upstream;

pub use config::RelayConfig;
pub use error::ApiError;
pub use server::{router, AppState, RelayServer};
pub use upstream::UpstreamClient;
