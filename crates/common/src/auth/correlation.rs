//! Single-use correlation store binding callbacks to authorization attempts
//!
//! The relay mints an opaque `state` token per authorization attempt and
//! stores the PKCE verifier under it. The callback consumes the entry
//! exactly once: a `state` that was never issued, already consumed, or
//! expired yields nothing, which the caller surfaces as
//! `UnknownOrExpiredState`.
//!
//! Entries live in process memory only and do not survive restarts; this
//! is an accepted limitation of the relay, not a defect. Abandoned
//! attempts are bounded by the TTL and removed by [`purge_expired`]
//! sweeps.
//!
//! [`purge_expired`]: InMemoryCorrelationStore::purge_expired

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use larkwire_domain::Result;
use tokio::time::Instant;
use tracing::debug;

/// Injectable key-value store for in-flight authorization attempts
///
/// Implementations must make [`take`](CorrelationStore::take) atomic: two
/// concurrent callbacks presenting the same `state` must never both
/// receive the verifier.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Record a fresh attempt, mapping `state` to its code verifier
    async fn insert(&self, state: String, code_verifier: String) -> Result<()>;

    /// Consume the attempt for `state`, returning its verifier
    ///
    /// Returns `None` when the state was never issued, already consumed,
    /// or expired. The entry is removed either way.
    async fn take(&self, state: &str) -> Result<Option<String>>;

    /// Number of live (unexpired) attempts, primarily for observability
    async fn pending(&self) -> usize;
}

struct AuthAttempt {
    code_verifier: String,
    expires_at: Instant,
}

/// Process-local correlation store with per-entry TTL
pub struct InMemoryCorrelationStore {
    entries: DashMap<String, AuthAttempt>,
    ttl: Duration,
}

impl InMemoryCorrelationStore {
    /// Create a store whose entries expire after `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    /// Drop every expired entry, returning how many were removed
    ///
    /// The relay binary runs this on a coarse interval so abandoned
    /// attempts cannot grow the map without bound.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, attempt| attempt.expires_at > now);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, "purged expired authorization attempts");
        }
        removed
    }
}

#[async_trait]
impl CorrelationStore for InMemoryCorrelationStore {
    async fn insert(&self, state: String, code_verifier: String) -> Result<()> {
        let attempt = AuthAttempt { code_verifier, expires_at: Instant::now() + self.ttl };
        self.entries.insert(state, attempt);
        Ok(())
    }

    async fn take(&self, state: &str) -> Result<Option<String>> {
        // remove() is atomic: a concurrent duplicate callback observes None.
        match self.entries.remove(state) {
            Some((_, attempt)) if attempt.expires_at > Instant::now() => {
                Ok(Some(attempt.code_verifier))
            }
            Some(_) => {
                debug!("correlation entry expired before consumption");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn pending(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|entry| entry.expires_at > now).count()
    }
}
