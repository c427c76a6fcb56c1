//! PIN authority: one-way digests for cancellation secrets and the
//! administrator override check.
//!
//! Deliberately minimal — no lockout, no rate limiting, no attempt
//! counting. The trust boundary is a parish rehearsal room, not a
//! credential system. The admin secret is compared as plaintext and is
//! never written to the ledger.

use sha2::{Digest, Sha256};

/// Holds the optionally configured administrator secret.
#[derive(Debug, Clone, Default)]
pub struct PinAuthority {
    admin_secret: Option<String>,
}

impl PinAuthority {
    /// An empty or whitespace-only secret counts as "not configured" and
    /// never matches.
    pub fn new(admin_secret: Option<String>) -> Self {
        let admin_secret = admin_secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { admin_secret }
    }

    /// Lowercase hex SHA-256 of the secret. Deterministic, irreversible.
    pub fn digest(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// True only when an admin secret is configured and matches exactly.
    pub fn is_admin(&self, secret: &str) -> bool {
        self.admin_secret.as_deref() == Some(secret)
    }

    /// True when the secret is the record's own PIN or the admin override.
    pub fn authorizes(&self, secret: &str, pin_digest: &str) -> bool {
        Self::digest(secret) == pin_digest || self.is_admin(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            PinAuthority::digest("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
        assert_eq!(PinAuthority::digest("1234").len(), 64);
        assert_ne!(PinAuthority::digest("1234"), PinAuthority::digest("1235"));
    }

    #[test]
    fn admin_requires_configuration() {
        let unconfigured = PinAuthority::new(None);
        assert!(!unconfigured.is_admin(""));
        assert!(!unconfigured.is_admin("anything"));

        // Blank configuration is the same as none.
        let blank = PinAuthority::new(Some("   ".to_string()));
        assert!(!blank.is_admin(""));
        assert!(!blank.is_admin("   "));

        let configured = PinAuthority::new(Some("0000".to_string()));
        assert!(configured.is_admin("0000"));
        assert!(!configured.is_admin("9999"));
    }

    #[test]
    fn authorizes_own_pin_or_admin() {
        let pins = PinAuthority::new(Some("0000".to_string()));
        let digest = PinAuthority::digest("9999");
        assert!(pins.authorizes("9999", &digest));
        assert!(pins.authorizes("0000", &digest));
        assert!(!pins.authorizes("1111", &digest));
    }
}
