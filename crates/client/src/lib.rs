//! # Larkwire Client
//!
//! Client-side authentication core: the session state machine that drives
//! the popup-based login flow, receives the credential handoff, persists
//! it, and keeps the rest of the application informed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ AuthSessionManager  │  state machine + attempt lifecycle
//! └─────────┬───────────┘
//!           ├──► SessionApi       (HTTP calls to the relay)
//!           ├──► PairingChannel   (cross-window handoff messages)
//!           ├──► PopupDriver      (login window lifetime)
//!           └──► CredentialStore  (durable persistence, from larkwire-common)
//! ```
//!
//! The embedding shell bridges real window messages into the pairing
//! channel and renders the [`AuthSessionState`] it observes through the
//! manager's watch channel.
//!
//! [`AuthSessionState`]: larkwire_domain::AuthSessionState

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod api;
pub mod feed;
pub mod pairing;
pub mod popup;
pub mod session;
pub mod testing;

pub use api::{RelayApi, SessionApi, StartLogin};
pub use feed::TimelineFeed;
pub use pairing::{AttemptId, PairingChannel, PairingSender};
pub use popup::{PopupDriver, PopupHandle, SystemBrowser};
pub use session::AuthSessionManager;
