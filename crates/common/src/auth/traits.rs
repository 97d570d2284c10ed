//! Traits for credential persistence
//!
//! These traits enable dependency injection and testing by abstracting the
//! durable client-side credential store (platform keychain in production,
//! in-memory double in tests).

use async_trait::async_trait;
use larkwire_domain::Credential;

/// Durable client-side credential persistence under a fixed key
///
/// The store holds at most one credential whose lifetime is tied to
/// explicit logout (or a failed verification). Implementations may use any
/// platform-appropriate secure storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist the credential, replacing any previous one
    ///
    /// # Errors
    /// Returns an error if the backing store rejects the write.
    async fn store(&self, credential: &Credential) -> Result<(), String>;

    /// Load the stored credential, if any
    ///
    /// # Errors
    /// Returns an error if the backing store fails; an absent credential
    /// is `Ok(None)`, not an error.
    async fn load(&self) -> Result<Option<Credential>, String>;

    /// Remove the stored credential
    ///
    /// Removing an absent credential is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing store rejects the delete.
    async fn clear(&self) -> Result<(), String>;
}
