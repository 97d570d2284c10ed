//! Incremental timeline feed
//!
//! Thin consumer over the relay's timeline endpoint: remembers the newest
//! tweet id it has seen, asks only for newer tweets on refresh, and keeps
//! a bounded in-memory page for rendering.

use std::sync::Arc;

use larkwire_domain::constants::FEED_CAPACITY;
use larkwire_domain::{Result, Tweet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::SessionApi;

/// Bounded, incrementally refreshed view of the home timeline
pub struct TimelineFeed {
    api: Arc<dyn SessionApi>,
    page_size: u32,
    inner: RwLock<FeedState>,
}

#[derive(Default)]
struct FeedState {
    tweets: Vec<Tweet>,
    newest_id: Option<String>,
}

impl TimelineFeed {
    /// Create a feed fetching `page_size` tweets per refresh
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>, page_size: u32) -> Self {
        Self { api, page_size, inner: RwLock::new(FeedState::default()) }
    }

    /// Fetch tweets newer than the last refresh and prepend them
    ///
    /// Returns how many new tweets arrived. An `InvalidToken` error
    /// propagates so the session manager can fail closed.
    ///
    /// # Errors
    /// Returns the underlying relay error unchanged.
    pub async fn refresh(&self, access_token: &str) -> Result<usize> {
        let since_id = self.inner.read().await.newest_id.clone();
        let page =
            self.api.timeline(access_token, self.page_size, since_id.as_deref()).await?;

        let fetched = page.tweets.len();
        if fetched == 0 {
            debug!("timeline refresh returned no new tweets");
            return Ok(0);
        }

        let mut inner = self.inner.write().await;
        // Upstream pages are newest-first; new tweets go in front.
        let mut merged = page.tweets;
        merged.append(&mut inner.tweets);
        merged.truncate(FEED_CAPACITY);
        inner.newest_id = merged.first().map(|tweet| tweet.id.clone());
        inner.tweets = merged;

        debug!(fetched, total = inner.tweets.len(), "timeline refreshed");
        Ok(fetched)
    }

    /// Snapshot of the current page, newest first
    pub async fn tweets(&self) -> Vec<Tweet> {
        self.inner.read().await.tweets.clone()
    }

    /// Newest tweet id seen so far (the next refresh's `since_id`)
    pub async fn newest_id(&self) -> Option<String> {
        self.inner.read().await.newest_id.clone()
    }

    /// Forget everything, e.g. after logout
    pub async fn clear(&self) {
        *self.inner.write().await = FeedState::default();
    }
}
