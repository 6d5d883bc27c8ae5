use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{AuthRepository, RefreshTokenRecord, User};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct State {
    users: HashMap<i64, User>,
    logins: HashMap<String, i64>,
    tokens: HashMap<String, RefreshTokenRecord>,
    next_user_id: i64,
    next_token_id: i64,
}

/// Process-local repository with the same uniqueness rules as the schema.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
    fail_token_writes: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_refresh_token` call fail, simulating a lost
    /// connection on the background write path.
    pub fn fail_refresh_token_writes(&self, fail: bool) {
        self.fail_token_writes.store(fail, Ordering::SeqCst);
    }

    pub fn refresh_token_count(&self) -> usize {
        self.state.read().tokens.len()
    }

    pub fn refresh_tokens_for(&self, user_id: i64) -> usize {
        self.state
            .read()
            .tokens
            .values()
            .filter(|record| record.user_id == user_id)
            .count()
    }

    /// Remove a user. Its refresh tokens stay behind, as they do when the
    /// account layer deletes a user row.
    pub fn delete_user(&self, id: i64) -> Option<User> {
        let mut state = self.state.write();
        let user = state.users.remove(&id)?;
        state.logins.remove(&user.login);
        Some(user)
    }
}

#[async_trait]
impl AuthRepository for InMemoryRepository {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read();
        Ok(state
            .logins
            .get(login)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.state.write();
        if state.logins.contains_key(login) {
            return Err(DatabaseError::UniqueConstraintViolation("users_login_key".to_string()).into());
        }

        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        state.logins.insert(user.login.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn create_refresh_token(&self, user_id: i64, token: &str) -> Result<(), AppError> {
        if self.fail_token_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionPool("connection reset".to_string()).into());
        }

        let mut state = self.state.write();
        if state.tokens.contains_key(token) {
            return Err(
                DatabaseError::UniqueConstraintViolation("refresh_tokens_token_hash_key".to_string()).into(),
            );
        }

        state.next_token_id += 1;
        let record = RefreshTokenRecord {
            id: state.next_token_id,
            user_id,
            created_at: Utc::now(),
        };
        state.tokens.insert(token.to_string(), record);
        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self.state.read().tokens.get(token).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.state.read().users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryRepository::new();

        let user = repo.create_user("alice", "hash").await.unwrap();
        assert_eq!(user.id, 1);

        let by_login = repo.find_user_by_login("alice").await.unwrap();
        let by_id = repo.find_user_by_id(user.id).await.unwrap();
        assert_eq!(by_login, Some(user.clone()));
        assert_eq!(by_id, Some(user));
        assert!(repo.find_user_by_login("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login_is_rejected() {
        let repo = InMemoryRepository::new();
        repo.create_user("alice", "hash").await.unwrap();

        let result = repo.create_user("alice", "other").await;
        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UniqueConstraintViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_lookup() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("alice", "hash").await.unwrap();

        repo.create_refresh_token(user.id, "token-1").await.unwrap();

        let record = repo.find_refresh_token("token-1").await.unwrap().unwrap();
        assert_eq!(record.user_id, user.id);
        assert!(repo.find_refresh_token("token-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_refresh_token_is_rejected() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("alice", "hash").await.unwrap();
        repo.create_refresh_token(user.id, "token-1").await.unwrap();

        assert!(repo.create_refresh_token(user.id, "token-1").await.is_err());
        assert_eq!(repo.refresh_token_count(), 1);
    }

    #[tokio::test]
    async fn test_deleted_user_leaves_orphaned_tokens() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("alice", "hash").await.unwrap();
        repo.create_refresh_token(user.id, "token-1").await.unwrap();

        repo.delete_user(user.id);

        assert!(repo.find_user_by_id(user.id).await.unwrap().is_none());
        assert!(repo.find_user_by_login("alice").await.unwrap().is_none());
        assert!(repo.find_refresh_token("token-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("alice", "hash").await.unwrap();

        repo.fail_refresh_token_writes(true);
        assert!(repo.create_refresh_token(user.id, "token-1").await.is_err());

        repo.fail_refresh_token_writes(false);
        assert!(repo.create_refresh_token(user.id, "token-1").await.is_ok());
    }
}
