//! Password hashing and verification using bcrypt.

use crate::error::AuthError;

/// bcrypt cost factor. Intentionally slow to resist brute force.
const BCRYPT_COST: u32 = 12;

/// Hash a plaintext password with bcrypt.
///
/// A fresh salt is generated per call, so hashing the same password
/// twice yields two different strings that both verify.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Crypto(format!("bcrypt hash: {e}")))
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch, or `Err(AuthError::Crypto)` if the
/// stored value is not a recognized bcrypt encoding — a corrupt hash is
/// never reported as a mere mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashing_is_salted() {
        let h1 = hash_password("hunter2").unwrap();
        let h2 = hash_password("hunter2").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("hunter2", &h1).unwrap());
        assert!(verify_password("hunter2", &h2).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
