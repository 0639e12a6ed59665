use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::{error::AppResult, models::MovieId};

/// Per-user record of movies already recommended
///
/// Implementations decide durability and retention; the pipeline only relies
/// on ids being retained until an explicit [`ExclusionStore::reset`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ExclusionStore: Send + Sync {
    /// Ids already shown to `username`
    async fn excluded(&self, username: &str) -> AppResult<HashSet<MovieId>>;

    /// Appends ids to the user's exclusion set
    async fn record(&self, username: &str, ids: &[MovieId]) -> AppResult<()>;

    /// Clears the user's exclusion set
    async fn reset(&self, username: &str) -> AppResult<()>;
}

/// Exclusion store held in process memory, lost on restart
#[derive(Default)]
pub struct InMemoryExclusionStore {
    shown: RwLock<HashMap<String, HashSet<MovieId>>>,
}

impl InMemoryExclusionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ExclusionStore for InMemoryExclusionStore {
    async fn excluded(&self, username: &str) -> AppResult<HashSet<MovieId>> {
        let shown = self.shown.read().await;
        Ok(shown.get(username).cloned().unwrap_or_default())
    }

    async fn record(&self, username: &str, ids: &[MovieId]) -> AppResult<()> {
        let mut shown = self.shown.write().await;
        shown
            .entry(username.to_string())
            .or_default()
            .extend(ids.iter().copied());

        tracing::debug!(
            username = %username,
            recorded = ids.len(),
            total = shown.get(username).map_or(0, HashSet::len),
            "Recorded shown movies"
        );

        Ok(())
    }

    async fn reset(&self, username: &str) -> AppResult<()> {
        self.shown.write().await.remove(username);
        tracing::info!(username = %username, "Exclusion set reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_has_empty_set() {
        let store = InMemoryExclusionStore::new();
        assert!(store.excluded("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_accumulates() {
        let store = InMemoryExclusionStore::new();
        store.record("ana", &[MovieId(1), MovieId(2)]).await.unwrap();
        store.record("ana", &[MovieId(3)]).await.unwrap();

        let excluded = store.excluded("ana").await.unwrap();
        assert_eq!(excluded.len(), 3);
        assert!(excluded.contains(&MovieId(3)));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = InMemoryExclusionStore::new();
        store.record("ana", &[MovieId(1)]).await.unwrap();

        assert!(store.excluded("ben").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_only_that_user() {
        let store = InMemoryExclusionStore::new();
        store.record("ana", &[MovieId(1)]).await.unwrap();
        store.record("ben", &[MovieId(2)]).await.unwrap();

        store.reset("ana").await.unwrap();

        assert!(store.excluded("ana").await.unwrap().is_empty());
        assert_eq!(store.excluded("ben").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_unknown_user_is_ok() {
        let store = InMemoryExclusionStore::new();
        tokio_test::assert_ok!(store.reset("ghost").await);
    }
}
