//! Salted password hashing (bcrypt).

use crate::authenticator::AuthError;

/// Hash a plaintext password with the given bcrypt cost.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(plain, cost).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// CPU-bound: call from a blocking context.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(plain, hash).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("123456", 4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("123456", &hash).unwrap());
        assert!(!verify_password("654321", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("123456", 4).unwrap();
        let b = hash_password("123456", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("123456", "not-a-hash"),
            Err(AuthError::PasswordHash(_))
        ));
    }
}
