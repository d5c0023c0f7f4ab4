//! Argon2id password hashing and login verification.
//!
//! Hashes are stored in PHC string format so algorithm parameters and salt
//! travel with the hash.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash verified against when the login names no account, so unknown and
/// known logins cost the same.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("turnstile-decoy-password").ok());

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only if the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check login credentials against an optional stored hash.
///
/// A missing account still pays for one Argon2 verification. A corrupt
/// stored hash is logged and treated as a mismatch.
pub fn verify_credentials(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Stored password hash is unusable");
            false
        }),
        None => {
            if let Some(decoy) = DECOY_HASH.as_deref() {
                let _ = verify_password(password, decoy);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn credentials_reject_missing_account() {
        assert!(!verify_credentials("anything", None));
    }

    #[test]
    fn credentials_reject_corrupt_hash() {
        assert!(!verify_credentials("anything", Some("not-a-phc-string")));
    }

    #[test]
    fn credentials_accept_matching_password() {
        let hash = hash_password("pw-123456").unwrap();
        assert!(verify_credentials("pw-123456", Some(&hash)));
        assert!(!verify_credentials("pw-654321", Some(&hash)));
    }
}
