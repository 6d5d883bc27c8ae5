/// Asynchronous refresh token persistence
///
/// Flows hand freshly minted refresh tokens to `RefreshTokenStore::persist`,
/// which enqueues them without waiting. A single `RefreshTokenWriter` task
/// drains the queue into the repository. Write failures are logged and never
/// reach the HTTP caller; the client keeps its access token and simply has to
/// sign in again once its refresh attempt misses.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::repository::AuthRepository;

/// A refresh token waiting to be written
#[derive(Debug)]
pub struct PendingRefreshToken {
    pub user_id: i64,
    pub token: String,
}

/// Non-blocking handle used by request handlers
#[derive(Clone)]
pub struct RefreshTokenStore {
    sender: mpsc::Sender<PendingRefreshToken>,
}

impl RefreshTokenStore {
    /// Enqueue a token for persistence. Never blocks and never fails the
    /// caller; a full or closed queue drops the write with an error log.
    pub fn persist(&self, user_id: i64, token: String) {
        match self.sender.try_send(PendingRefreshToken { user_id, token }) {
            Ok(()) => {}
            Err(TrySendError::Full(pending)) => {
                tracing::error!(
                    user_id = pending.user_id,
                    "Refresh token queue full, dropping write"
                );
            }
            Err(TrySendError::Closed(pending)) => {
                tracing::error!(
                    user_id = pending.user_id,
                    "Refresh token writer stopped, dropping write"
                );
            }
        }
    }
}

/// Background consumer of the refresh token queue
pub struct RefreshTokenWriter {
    receiver: mpsc::Receiver<PendingRefreshToken>,
    repository: Arc<dyn AuthRepository>,
}

impl RefreshTokenWriter {
    pub fn new(
        repository: Arc<dyn AuthRepository>,
        capacity: usize,
    ) -> (RefreshTokenStore, RefreshTokenWriter) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            RefreshTokenStore { sender },
            RefreshTokenWriter {
                receiver,
                repository,
            },
        )
    }

    /// Spawn the writer on the current Tokio runtime.
    ///
    /// The returned handle may be ignored; the task ends once every
    /// `RefreshTokenStore` clone has been dropped and the queue is drained.
    pub fn spawn(
        repository: Arc<dyn AuthRepository>,
        capacity: usize,
    ) -> (RefreshTokenStore, JoinHandle<()>) {
        let (store, writer) = Self::new(repository, capacity);
        (store, tokio::spawn(writer.run()))
    }

    pub async fn run(mut self) {
        tracing::debug!("Refresh token writer started");

        while let Some(pending) = self.receiver.recv().await {
            match self
                .repository
                .create_refresh_token(pending.user_id, &pending.token)
                .await
            {
                Ok(()) => {
                    tracing::debug!(user_id = pending.user_id, "Refresh token saved");
                }
                Err(e) => {
                    tracing::error!(
                        user_id = pending.user_id,
                        error = %e,
                        "Failed to save refresh token"
                    );
                }
            }
        }

        tracing::debug!("Refresh token writer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    async fn repo_with_user() -> (Arc<InMemoryRepository>, i64) {
        let repo = Arc::new(InMemoryRepository::new());
        let user = repo.create_user("alice", "hash").await.unwrap();
        (repo, user.id)
    }

    #[tokio::test]
    async fn test_queued_tokens_are_persisted() {
        let (repo, user_id) = repo_with_user().await;
        let (store, handle) = RefreshTokenWriter::spawn(repo.clone(), 8);

        store.persist(user_id, "token-1".to_string());
        store.persist(user_id, "token-2".to_string());
        drop(store);
        handle.await.unwrap();

        assert_eq!(repo.refresh_tokens_for(user_id), 2);
        assert!(repo.find_refresh_token("token-2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_writer() {
        let (repo, user_id) = repo_with_user().await;
        let (store, writer) = RefreshTokenWriter::new(repo.clone(), 8);

        repo.fail_refresh_token_writes(true);
        store.persist(user_id, "lost".to_string());
        drop(store);
        writer.run().await;

        assert_eq!(repo.refresh_token_count(), 0);

        repo.fail_refresh_token_writes(false);
        let (store, handle) = RefreshTokenWriter::spawn(repo.clone(), 8);
        store.persist(user_id, "kept".to_string());
        drop(store);
        handle.await.unwrap();

        assert_eq!(repo.refresh_token_count(), 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (repo, user_id) = repo_with_user().await;
        // Writer not running yet, so the single slot fills up.
        let (store, writer) = RefreshTokenWriter::new(repo.clone(), 1);

        store.persist(user_id, "first".to_string());
        store.persist(user_id, "second".to_string());
        drop(store);
        writer.run().await;

        assert!(repo.find_refresh_token("first").await.unwrap().is_some());
        assert!(repo.find_refresh_token("second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_after_writer_stopped_is_silent() {
        let (repo, user_id) = repo_with_user().await;
        let (store, writer) = RefreshTokenWriter::new(repo.clone(), 4);
        drop(writer);

        store.persist(user_id, "orphan".to_string());

        assert_eq!(repo.refresh_token_count(), 0);
    }
}
