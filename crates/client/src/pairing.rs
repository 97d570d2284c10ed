//! Pairing channel for the cross-window credential handoff
//!
//! Generalizes the popup-to-opener message handshake: each login attempt
//! owns a single-use message slot keyed by a fresh [`AttemptId`]. The
//! embedding shell bridges real window messages into the channel through a
//! [`PairingSender`]; envelopes whose attempt id or origin do not match the
//! channel are discarded before they can reach the session manager. The
//! same-origin restriction is a hard invariant of the handoff.

use std::fmt;

use larkwire_domain::HandoffMessage;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier of one login attempt, used to discard stale messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Mint a fresh attempt identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Receiving half of the pairing channel, owned by the attempt task
pub struct PairingChannel {
    rx: mpsc::UnboundedReceiver<HandoffMessage>,
}

impl PairingChannel {
    /// Create a channel for `attempt`, accepting only messages from
    /// `origin`
    #[must_use]
    pub fn new(attempt: AttemptId, origin: impl Into<String>) -> (Self, PairingSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = PairingSender { attempt, origin: origin.into(), tx };
        (Self { rx }, sender)
    }

    /// Wait for the next accepted handoff message
    ///
    /// Returns `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<HandoffMessage> {
        self.rx.recv().await
    }

    /// Take a message that is already queued, without waiting
    pub fn try_recv(&mut self) -> Option<HandoffMessage> {
        self.rx.try_recv().ok()
    }
}

/// Sending half handed to the embedding shell's message bridge
#[derive(Clone)]
pub struct PairingSender {
    attempt: AttemptId,
    origin: String,
    tx: mpsc::UnboundedSender<HandoffMessage>,
}

impl PairingSender {
    /// Deliver a message observed by the shell
    ///
    /// Returns `true` if the message was accepted. Messages from another
    /// attempt, from a foreign origin, or arriving after the attempt
    /// resolved are discarded.
    pub fn post(&self, attempt: AttemptId, origin: &str, message: HandoffMessage) -> bool {
        if attempt != self.attempt {
            debug!(%attempt, current = %self.attempt, "discarding handoff from stale attempt");
            return false;
        }
        if origin != self.origin {
            warn!(%origin, "discarding cross-origin handoff message");
            return false;
        }
        self.tx.send(message).is_ok()
    }

    /// Attempt this sender is bound to
    #[must_use]
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Whether the attempt task is still listening
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}
