//! Mock implementations for client tests

// Allow missing error/panic docs for test mocks - they are designed to be
// simple and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use larkwire_domain::{Identity, LarkwireError, Result, Timeline};

use crate::api::{SessionApi, StartLogin};

/// Scriptable [`SessionApi`] double
///
/// Responses are queues: each call pops the next configured response.
/// `start` falls back to a generated success, `verify` to
/// `Err(InvalidToken)`, and `timeline` to an internal error, so tests only
/// script what they exercise.
#[derive(Default)]
pub struct MockSessionApi {
    start_responses: Mutex<VecDeque<Result<StartLogin>>>,
    verify_responses: Mutex<VecDeque<Result<Identity>>>,
    timeline_responses: Mutex<VecDeque<Result<Timeline>>>,
    start_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    timeline_since_ids: Mutex<Vec<Option<String>>>,
}

impl MockSessionApi {
    /// Create a mock with empty response queues
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `start` call
    pub fn push_start(&self, response: Result<StartLogin>) {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        self.start_responses.lock().unwrap().push_back(response);
    }

    /// Queue a response for the next `verify` call
    pub fn push_verify(&self, response: Result<Identity>) {
        self.verify_responses.lock().unwrap().push_back(response);
    }

    /// Queue a response for the next `timeline` call
    pub fn push_timeline(&self, response: Result<Timeline>) {
        self.timeline_responses.lock().unwrap().push_back(response);
    }

    /// Number of `start` calls observed
    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Number of `verify` calls observed
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    /// `since_id` values seen by `timeline` calls, in order
    #[must_use]
    pub fn timeline_since_ids(&self) -> Vec<Option<String>> {
        self.timeline_since_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionApi for MockSessionApi {
    async fn start(&self) -> Result<StartLogin> {
        let call = self.start_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = self.start_responses.lock().unwrap().pop_front() {
            return response;
        }

        Ok(StartLogin {
            auth_url: format!("https://auth.example/authorize?state=state-{call}"),
            state: format!("state-{call}"),
            code_challenge: "challenge".to_string(),
        })
    }

    async fn verify(&self, _access_token: &str) -> Result<Identity> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LarkwireError::InvalidToken))
    }

    async fn timeline(
        &self,
        _access_token: &str,
        _max_results: u32,
        since_id: Option<&str>,
    ) -> Result<Timeline> {
        self.timeline_since_ids.lock().unwrap().push(since_id.map(str::to_string));
        self.timeline_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LarkwireError::Internal("no timeline response configured".to_string())))
    }
}
