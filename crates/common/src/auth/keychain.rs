//! Platform-keychain credential storage
//!
//! Stores the access and refresh tokens as separate secrets under a fixed
//! service/account pair (macOS Keychain, Windows Credential Manager, or
//! the Secret Service API via the `keyring` crate).

use async_trait::async_trait;
use keyring::Entry;
use larkwire_domain::constants::{CREDENTIAL_ACCOUNT, KEYCHAIN_SERVICE};
use larkwire_domain::Credential;
use tracing::debug;

use super::traits::CredentialStore;

const ACCESS_PREFIX: &str = "access.";
const REFRESH_PREFIX: &str = "refresh.";

/// Keychain-backed [`CredentialStore`]
pub struct KeychainCredentialStore {
    service: String,
    account: String,
}

impl KeychainCredentialStore {
    /// Create a store scoped to `service`/`account`
    #[must_use]
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    fn entry(&self, prefix: &str) -> Result<Entry, String> {
        Entry::new(&self.service, &format!("{prefix}{}", self.account)).map_err(|e| e.to_string())
    }
}

impl Default for KeychainCredentialStore {
    /// Store under the application's fixed service/account pair
    fn default() -> Self {
        Self::new(KEYCHAIN_SERVICE, CREDENTIAL_ACCOUNT)
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn store(&self, credential: &Credential) -> Result<(), String> {
        debug!(account = %self.account, "storing credential in keychain");

        self.entry(ACCESS_PREFIX)?
            .set_password(&credential.access_token)
            .map_err(|e| e.to_string())?;

        let refresh_entry = self.entry(REFRESH_PREFIX)?;
        match &credential.refresh_token {
            Some(refresh) => refresh_entry.set_password(refresh).map_err(|e| e.to_string())?,
            // A replaced credential may have dropped its refresh token.
            None => match refresh_entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e.to_string()),
            },
        }

        Ok(())
    }

    async fn load(&self) -> Result<Option<Credential>, String> {
        let access_token = match self.entry(ACCESS_PREFIX)?.get_password() {
            Ok(token) => token,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e.to_string()),
        };

        let refresh_token = match self.entry(REFRESH_PREFIX)?.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => return Err(e.to_string()),
        };

        Ok(Some(Credential { access_token, refresh_token }))
    }

    async fn clear(&self) -> Result<(), String> {
        debug!(account = %self.account, "clearing credential from keychain");

        for prefix in [ACCESS_PREFIX, REFRESH_PREFIX] {
            match self.entry(prefix)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(e.to_string()),
            }
        }

        Ok(())
    }
}
