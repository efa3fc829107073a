// Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng};

use crate::auth::error::AuthError;
use crate::validation::validate_password_strength;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    /// Verify a password against a PHC-format hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Generate an initial password for accounts created by an operator.
    /// Always satisfies the strength rule.
    pub fn generate_initial_password(len: usize) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len.max(8))
                .map(char::from)
                .collect();
            if validate_password_strength(&candidate).is_ok() {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash_password("matkhau123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordService::verify_password("matkhau123", &hash).unwrap());
        assert!(!PasswordService::verify_password("matkhau124", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = PasswordService::hash_password("matkhau123").unwrap();
        let b = PasswordService::hash_password("matkhau123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_with_garbage_hash_is_error() {
        assert!(PasswordService::verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_generated_password_is_strong() {
        for _ in 0..20 {
            let password = PasswordService::generate_initial_password(12);
            assert_eq!(password.len(), 12);
            assert!(validate_password_strength(&password).is_ok());
        }
    }
}
