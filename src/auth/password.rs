/// Password Hashing and Verification
///
/// bcrypt with a per-call random salt. The work factor comes from
/// `PasswordSettings` so deployments can raise it over time; hashes made with
/// an older cost keep verifying because the cost is embedded in the hash.

use bcrypt::{hash, verify};

use crate::configuration::PasswordSettings;
use crate::error::{AppError, CryptoError};

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `CryptoError::Hashing` if bcrypt fails
pub fn hash_password(password: &str, settings: &PasswordSettings) -> Result<String, AppError> {
    hash(password, settings.hash_cost).map_err(|e| CryptoError::Hashing(e.to_string()).into())
}

/// Verify a password against its hash
///
/// A malformed hash is a negative result, not an error.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Password verification against malformed hash: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordSettings {
        PasswordSettings { hash_cost: 4 }
    }

    #[test]
    fn test_hash_password() {
        let password = "secret123";
        let hash = hash_password(password, &fast()).expect("Failed to hash password");

        // Hash should not be the same as password
        assert_ne!(password, hash);
        // Hash should start with bcrypt identifier
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("secret123", &fast()).unwrap();

        assert!(verify_password("secret123", &hash));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("secret123", &fast()).unwrap();

        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("secret123", &fast()).unwrap();
        let second = hash_password("secret123", &fast()).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret123", &first));
        assert!(verify_password("secret123", &second));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("secret123", "not-a-bcrypt-hash"));
        assert!(!verify_password("secret123", ""));
    }

    #[test]
    fn test_cost_is_embedded_in_hash() {
        let hash = hash_password("secret123", &fast()).unwrap();

        assert!(hash.starts_with("$2b$04$"));
    }

    #[test]
    fn test_invalid_cost_fails() {
        let result = hash_password("secret123", &PasswordSettings { hash_cost: 2 });

        assert!(matches!(result, Err(AppError::Crypto(CryptoError::Hashing(_)))));
    }
}
