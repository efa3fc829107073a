// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role};

/// Distinguishes access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub role: Role,
    /// Facility a staff account operates for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<i32>,
    pub token_type: TokenType,
    /// Unique id so two tokens issued in the same second still differ
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

/// Identity a token is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub facility_id: Option<i32>,
}

/// Token service for JWT operations
pub struct TokenService {
    secret: String,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Access tokens default to 15 minutes, refresh tokens to 7 days
    pub fn new(secret: String) -> Self {
        Self::with_durations(secret, 900, 604_800)
    }

    pub fn with_durations(secret: String, access_secs: i64, refresh_secs: i64) -> Self {
        Self {
            secret,
            access_token_duration: access_secs,
            refresh_token_duration: refresh_secs,
        }
    }

    pub fn access_token_duration(&self) -> i64 {
        self.access_token_duration
    }

    pub fn refresh_token_duration(&self) -> i64 {
        self.refresh_token_duration
    }

    fn generate(&self, subject: &TokenSubject, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let duration = match token_type {
            TokenType::Access => self.access_token_duration,
            TokenType::Refresh => self.refresh_token_duration,
        };

        let claims = Claims {
            sub: subject.user_id,
            email: subject.email.clone(),
            role: subject.role,
            facility_id: subject.facility_id,
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    pub fn generate_access_token(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        self.generate(subject, TokenType::Access)
    }

    pub fn generate_refresh_token(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        self.generate(subject, TokenType::Refresh)
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(&self, subject: &TokenSubject) -> Result<(String, String), AuthError> {
        let access_token = self.generate_access_token(subject)?;
        let refresh_token = self.generate_refresh_token(subject)?;
        Ok((access_token, refresh_token))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenType::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenType::Refresh)
    }

    fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        // A refresh token must never authenticate a request, and vice versa
        if claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    fn subject(user_id: i32, email: &str, role: Role) -> TokenSubject {
        TokenSubject {
            user_id,
            email: email.to_string(),
            role,
            facility_id: None,
        }
    }

    #[test]
    fn test_access_token_expiration_is_15_minutes() {
        let service = test_token_service();
        let token = service
            .generate_access_token(&subject(1, "test@example.com", Role::Customer))
            .unwrap();
        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let token = service
            .generate_refresh_token(&subject(1, "test@example.com", Role::Customer))
            .unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_custom_durations() {
        let service = TokenService::with_durations("s".into(), 60, 120);
        let (access, refresh) = service
            .generate_token_pair(&subject(1, "a@b.com", Role::Admin))
            .unwrap();
        let a = service.validate_access_token(&access).unwrap();
        let r = service.validate_refresh_token(&refresh).unwrap();
        assert_eq!(a.exp - a.iat, 60);
        assert_eq!(r.exp - r.iat, 120);
    }

    #[test]
    fn test_staff_claims_carry_facility() {
        let service = test_token_service();
        let staff = TokenSubject {
            user_id: 5,
            email: "nv@example.com".into(),
            role: Role::Staff,
            facility_id: Some(3),
        };
        let token = service.generate_access_token(&staff).unwrap();
        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.facility_id, Some(3));
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = test_token_service();
        let (access, refresh) = service
            .generate_token_pair(&subject(1, "test@example.com", Role::Customer))
            .unwrap();
        assert!(matches!(
            service.validate_access_token(&refresh),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            service.validate_refresh_token(&access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_two_refresh_tokens_differ() {
        let service = test_token_service();
        let s = subject(1, "test@example.com", Role::Customer);
        let a = service.generate_refresh_token(&s).unwrap();
        let b = service.generate_refresh_token(&s).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let claims = Claims {
            sub: 1,
            email: "test@example.com".to_string(),
            role: Role::Customer,
            facility_id: None,
            token_type: TokenType::Access,
            jti: "x".into(),
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            test_token_service().validate_access_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());
        let token = service1
            .generate_access_token(&subject(1, "test@example.com", Role::Customer))
            .unwrap();
        assert!(service1.validate_access_token(&token).is_ok());
        assert!(service2.validate_access_token(&token).is_err());
    }

    proptest! {
        #[test]
        fn prop_token_claims_contain_identity(
            user_id in 1i32..1000000,
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net|vn)"
        ) {
            let service = test_token_service();
            let token = service.generate_access_token(&subject(user_id, &email, Role::Owner))?;
            let claims = service.validate_access_token(&token)?;
            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.role, Role::Owner);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate_access_token(&malformed).is_err());
        }
    }
}
