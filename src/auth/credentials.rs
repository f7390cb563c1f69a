//! Credential Manager
//! Mission: Hash and verify passwords without ever exposing plaintext
//!
//! bcrypt runs on the blocking pool so a hash never stalls the request
//! workers. Plaintext passwords are never logged, cached, or persisted.

use anyhow::{Context, Result};
use bcrypt::{hash, verify};

/// Fixed adaptive-hash cost factor.
const BCRYPT_COST: u32 = 10;

pub async fn hash_password(plaintext: &str) -> Result<String> {
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || hash(plaintext, BCRYPT_COST))
        .await
        .context("password hashing task panicked")?
        .context("failed to hash password")
}

pub async fn verify_password(plaintext: &str, password_hash: &str) -> Result<bool> {
    let plaintext = plaintext.to_owned();
    let password_hash = password_hash.to_owned();
    tokio::task::spawn_blocking(move || verify(plaintext, &password_hash))
        .await
        .context("password verification task panicked")?
        .context("failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_round_trip() {
        let hashed = hash_password("Str0ng!pw").await.unwrap();
        assert_ne!(hashed, "Str0ng!pw");
        assert!(hashed.starts_with("$2"));

        assert!(verify_password("Str0ng!pw", &hashed).await.unwrap());
        assert!(!verify_password("wrong-password", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently() {
        let a = hash_password("Str0ng!pw").await.unwrap();
        let b = hash_password("Str0ng!pw").await.unwrap();
        // Salted: identical inputs must not collide.
        assert_ne!(a, b);
    }
}
