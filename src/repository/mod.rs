/// Persistence boundary
///
/// The flows only need five single-row operations. Each implementation must
/// make every call individually atomic; no multi-statement transactions are
/// required.

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Stored user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Stored refresh token; the token value itself is not read back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError>;

    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` when the login is taken
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AppError>;

    async fn create_refresh_token(&self, user_id: i64, token: &str) -> Result<(), AppError>;

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}
