//! Admin reset guard
//!
//! Gates the destructive full-board reset behind a shared secret. The secret
//! itself is never stored: configuration carries a SHA-256 digest, and each
//! candidate is hashed and compared. The comparison is ordinary string
//! equality, not constant-time. There is no lockout on repeated guesses.

use sha2::{Digest, Sha256};

/// Shared-secret check for the reset operation
#[derive(Debug, Clone)]
pub struct ResetGuard {
    expected_digest: String,
}

impl ResetGuard {
    /// Create a guard from the configured hex digest
    #[must_use]
    pub fn new(expected_digest_hex: impl Into<String>) -> Self {
        Self {
            expected_digest: expected_digest_hex.into().to_lowercase(),
        }
    }

    /// Hash the candidate and compare against the configured digest
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        Self::digest_hex(candidate) == self.expected_digest
    }

    /// Hex-encoded SHA-256 of a secret, as stored in configuration
    #[must_use]
    pub fn digest_hex(secret: &str) -> String {
        let digest = Sha256::digest(secret.as_bytes());
        digest.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}
