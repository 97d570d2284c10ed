//! Shared authorization infrastructure for Larkwire crates.
//!
//! This crate holds the pieces of the authorization core that both the
//! backend relay and the client session manager build on:
//!
//! - [`auth::pkce`]: PKCE verifier/challenge generation (RFC 7636)
//! - [`auth::correlation`]: the single-use, TTL-bound correlation store
//!   that binds an authorization callback to the request that started it
//! - [`auth::traits`] / [`auth::keychain`]: durable client-side credential
//!   persistence behind an injectable trait
//! - [`testing`]: in-memory doubles for the traits above

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod testing;

// Re-export commonly used types and traits for convenience
pub use auth::correlation::{CorrelationStore, InMemoryCorrelationStore};
pub use auth::keychain::KeychainCredentialStore;
pub use auth::pkce::{derive_code_challenge, generate_code_verifier, PkcePair};
pub use auth::traits::CredentialStore;
