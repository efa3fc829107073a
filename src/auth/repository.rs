// Database repositories for users and tokens

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Postgres, Transaction};

use crate::auth::{
    error::AuthError,
    models::{RefreshToken, Role, User},
};

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, phone, role, is_active, created_at, updated_at";

/// Fields needed to insert a user row
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: Role,
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create_user(&self, user: NewUser<'_>) -> Result<User, AuthError> {
        let mut tx = self.pool.begin().await?;
        let created = Self::create_user_in_tx(&mut tx, user).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Insert a user inside a caller-owned transaction (staff creation)
    pub async fn create_user_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user: NewUser<'_>,
    ) -> Result<User, AuthError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name, phone, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.email.trim().to_lowercase())
        .bind(user.password_hash)
        .bind(user.full_name.trim())
        .bind(user.phone)
        .bind(user.role)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Facility a staff user is assigned to, if any
    pub async fn find_staff_facility(&self, user_id: i32) -> Result<Option<i32>, AuthError> {
        let facility_id: Option<i32> =
            sqlx::query_scalar("SELECT facility_id FROM staff WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(facility_id)
    }
}

/// Token repository for refresh token operations
#[derive(Clone)]
pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a token using SHA-256; raw refresh tokens are never stored
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn store_refresh_token(
        &self,
        user_id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(Self::hash_token(token))
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a live refresh token and return it; only one caller can win
    pub async fn consume_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        let refresh_token = sqlx::query_as::<_, RefreshToken>(
            "DELETE FROM refresh_tokens
             WHERE token_hash = $1 AND expires_at > NOW()
             RETURNING id, user_id, token_hash, expires_at, created_at",
        )
        .bind(Self::hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(refresh_token)
    }

    /// Returns true when a token row was actually removed
    pub async fn invalidate_token(&self, token: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = $1")
            .bind(Self::hash_token(token))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop every refresh token of a user (used when an account is disabled)
    pub async fn invalidate_all_for_user(&self, user_id: i32) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_expired_tokens(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = TokenRepository::hash_token("abc");
        assert_eq!(a, TokenRepository::hash_token("abc"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, TokenRepository::hash_token("abd"));
    }
}
