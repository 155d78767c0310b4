//! bcrypt password hashing.
//!
//! Hashes are self-describing (`$2b$<cost>$<salt+digest>`), so verification needs
//! nothing but the stored string.

use anyhow::{Context, Result};
use tokio::task;

/// Hashes a plaintext password with the given bcrypt cost.
pub fn hash(plaintext: &str, cost: u32) -> Result<String> {
    bcrypt::hash(plaintext, cost).context("Failed to hash password")
}

/// Compares a plaintext against a stored hash.
///
/// Any mismatch, malformed hash or empty hash yields `false`.
#[must_use]
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

/// Runs [`hash`] on the blocking pool.
pub async fn hash_blocking(plaintext: String, cost: u32) -> Result<String> {
    task::spawn_blocking(move || hash(&plaintext, cost))
        .await
        .context("Password hashing task panicked")?
}

/// Runs [`verify`] on the blocking pool.
pub async fn verify_blocking(plaintext: String, stored_hash: String) -> Result<bool> {
    task::spawn_blocking(move || verify(&plaintext, &stored_hash))
        .await
        .context("Password verification task panicked")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash("secret1", TEST_COST).unwrap();
        assert!(hashed.starts_with("$2"));
        assert_ne!(hashed, "secret1");

        assert!(verify("secret1", &hashed));
        assert!(!verify("wrong", &hashed));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = hash("secret1", TEST_COST).unwrap();
        let second = hash("secret1", TEST_COST).unwrap();
        assert_ne!(first, second);
        assert!(verify("secret1", &second));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify("secret1", ""));
        assert!(!verify("secret1", "not-a-bcrypt-hash"));
        assert!(!verify("secret1", "$2b$04$truncated"));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(hash("secret1", 2).is_err());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hashed = hash_blocking("secret1".to_string(), TEST_COST).await.unwrap();
        assert!(verify_blocking("secret1".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_blocking("nope".to_string(), hashed).await.unwrap());
    }
}
