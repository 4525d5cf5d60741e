/// Password hashing and verification (Argon2id)
///
/// Plaintext passwords never leave this module: callers store and compare
/// only the opaque PHC-format hash string.
use crate::error::{SubgateError, SubgateResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(plaintext: &str) -> SubgateResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SubgateError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash
///
/// Returns false on mismatch; only a malformed stored hash is an error.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> SubgateResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| SubgateError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SubgateError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Random salt per hash
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_is_an_error() {
        assert!(verify_password("hunter2", "not-a-phc-string").is_err());
    }
}
