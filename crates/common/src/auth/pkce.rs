//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636. The verifier stays server-side in the correlation
//! store until the token exchange; only the derived challenge travels
//! through the browser.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use larkwire_domain::{LarkwireError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure code verifier
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43
/// characters). Per RFC 7636, verifiers must be 43-128 characters long.
///
/// # Errors
/// Returns an error if the OS entropy source fails; this is fatal and
/// propagates.
pub fn generate_code_verifier() -> Result<String> {
    let mut random_bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut random_bytes)
        .map_err(|e| LarkwireError::Internal(format!("entropy source failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(random_bytes))
}

/// Derive the code challenge from a verifier using SHA-256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier))).
/// Pure and deterministic.
#[must_use]
pub fn derive_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// PKCE verifier/challenge pair for one authorization attempt
///
/// The verifier is kept secret until the token exchange; the challenge is
/// sent in the authorization request.
#[derive(Debug, Clone)]
pub struct PkcePair {
    /// Random string (43 chars, base64url encoded)
    pub code_verifier: String,

    /// SHA-256 hash of `code_verifier` (base64url encoded)
    pub code_challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair from cryptographically secure randomness
    ///
    /// # Errors
    /// Returns an error if the entropy source fails.
    pub fn generate() -> Result<Self> {
        let code_verifier = generate_code_verifier()?;
        let code_challenge = derive_code_challenge(&code_verifier);
        Ok(Self { code_verifier, code_challenge })
    }

    /// Get the challenge method (always "S256" for SHA-256)
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    /// Validates `PkcePair::generate` output against the RFC 7636 length and
    /// method constraints.
    #[test]
    fn test_generate_pkce_pair() {
        let pair = PkcePair::generate().expect("failed to generate pair");

        assert!(pair.code_verifier.len() >= 43, "verifier too short: {}", pair.code_verifier.len());
        assert!(pair.code_verifier.len() <= 128, "verifier too long: {}", pair.code_verifier.len());
        assert!(!pair.code_challenge.is_empty());
        assert_eq!(pair.challenge_method(), "S256");
    }

    /// Validates that successive generations never repeat verifier,
    /// challenge, or their pairing.
    #[test]
    fn test_unique_pairs() {
        let a = PkcePair::generate().expect("failed to generate pair a");
        let b = PkcePair::generate().expect("failed to generate pair b");

        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.code_challenge, b.code_challenge);
    }

    /// Validates base64url output: no padding, no `+`, no `/`.
    #[test]
    fn test_base64url_encoding() {
        let pair = PkcePair::generate().expect("failed to generate pair");

        for value in [&pair.code_verifier, &pair.code_challenge] {
            assert!(!value.contains('='));
            assert!(!value.contains('+'));
            assert!(!value.contains('/'));
        }
    }

    /// Validates that an independently recomputed challenge matches the one
    /// produced at generation time.
    #[test]
    fn test_challenge_deterministic() {
        let pair = PkcePair::generate().expect("failed to generate pair");
        let recomputed = derive_code_challenge(&pair.code_verifier);

        assert_eq!(pair.code_challenge, recomputed);
    }

    /// Validates the challenge derivation against a fixed RFC 7636 appendix
    /// vector.
    #[test]
    fn test_known_challenge_vector() {
        // Appendix B of RFC 7636
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(derive_code_challenge(verifier), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }
}
