//! Mock implementations of common traits
//!
//! Provides in-memory doubles for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be
// simple and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use larkwire_domain::Credential;

use crate::auth::traits::CredentialStore;

/// In-memory [`CredentialStore`] with optional failure injection
///
/// # Examples
///
/// ```
/// use larkwire_common::testing::MemoryCredentialStore;
/// use larkwire_common::CredentialStore;
/// use larkwire_domain::Credential;
///
/// # tokio_test::block_on(async {
/// let store = MemoryCredentialStore::new();
/// store.store(&Credential::new("token", None)).await.unwrap();
/// assert!(store.load().await.unwrap().is_some());
/// store.clear().await.unwrap();
/// assert!(store.load().await.unwrap().is_none());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
    fail: AtomicBool,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a credential
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self { credential: Mutex::new(Some(credential)), fail: AtomicBool::new(false) }
    }

    /// Make every subsequent operation fail (simulates a broken backend)
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check_fail(&self) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            Err("credential store unavailable".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn store(&self, credential: &Credential) -> Result<(), String> {
        self.check_fail()?;
        // SAFETY: Mutex poisoning is acceptable in test mocks - if a test
        // panics the test fails anyway
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, String> {
        self.check_fail()?;
        Ok(self.credential.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<(), String> {
        self.check_fail()?;
        *self.credential.lock().unwrap() = None;
        Ok(())
    }
}
