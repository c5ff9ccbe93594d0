//! Password hashing and verification using Argon2id
//!
//! Cost parameters are fixed server-side:
//! - Algorithm: Argon2id
//! - Memory: 64 MB
//! - Iterations: 3
//! - Parallelism: 4 threads
//! - Salt: 16 bytes random
//! - Output: 32 bytes hash

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

const MEMORY_COST_KIB: u32 = 65536;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 4;
const OUTPUT_LEN: usize = 32;

/// Hash compared against when no account matches a login email
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password into a PHC string
///
/// The returned string embeds algorithm, parameters and salt, so it is the
/// only thing that needs to be stored.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// Fails closed: a malformed hash or any error inside the comparison yields
/// `false`.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Password verification failed");
            false
        }
    }
}

/// Spend one full verification on a throwaway hash and report `false`
///
/// Used when a login names no known account, so that path costs the same
/// Argon2 work as a wrong password.
pub fn verify_dummy(password: &str) -> bool {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("no-such-account").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(hash, password);
    }
    false
}

/// Registration-time policy check, separate from verification
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "SecureP@ssw0rd!";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(&hash, password));
        assert!(!verify_password(&hash, "WrongPassword"));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        let password = "SamePassword123!";

        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password(&hash1, password));
        assert!(verify_password(&hash2, password));
    }

    #[test]
    fn test_hash_uses_fixed_parameters() {
        let hash = hash_password("TestPassword123!").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_invalid_hash_fails_closed() {
        assert!(!verify_password("invalid-hash-format", "password"));
        assert!(!verify_password("", ""));
        assert!(!verify_password("$argon2id$v=19$m=65536,t=3,p=4$bm9wZQ$", "password"));
    }

    #[test]
    fn test_dummy_verification_always_fails() {
        assert!(!verify_dummy("anything"));
        assert!(!verify_dummy("no-such-account"));

        let dummy = DUMMY_HASH.get().and_then(|h| h.as_deref()).unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        assert!(dummy.contains("m=65536"));
        assert!(PasswordHash::new(dummy).is_ok());
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("longenough").is_ok());
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("        ").is_err());
    }
}
