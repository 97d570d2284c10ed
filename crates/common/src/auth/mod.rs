//! Core authorization building blocks
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌─────────────────────┐
//! │  larkwire-relay  │─────►│ correlation store   │  state → verifier,
//! └──────────────────┘      │ (single-use, TTL)   │  consumed exactly once
//!                           └─────────────────────┘
//! ┌──────────────────┐      ┌─────────────────────┐
//! │ larkwire-client  │─────►│ credential store    │  durable bearer
//! └──────────────────┘      │ (platform keychain) │  credential
//!                           └─────────────────────┘
//! ```
//!
//! PKCE utilities are pure functions used by the relay when it mints an
//! authorization attempt.

pub mod correlation;
pub mod keychain;
pub mod pkce;
pub mod traits;

pub use correlation::{CorrelationStore, InMemoryCorrelationStore};
pub use keychain::KeychainCredentialStore;
pub use pkce::{derive_code_challenge, generate_code_verifier, PkcePair};
pub use traits::CredentialStore;
