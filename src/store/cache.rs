use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::AppResult;

/// Query parameters that identify the caller rather than the request
const CREDENTIAL_PARAMS: &[&str] = &["api_key"];

/// Cache key: the exact signature of an outbound request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a request URL, with credential parameters left out
    pub fn for_url(url: &reqwest::Url) -> Self {
        let params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| {
                let name: &str = k;
                !CREDENTIAL_PARAMS.contains(&name)
            })
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut signature = url.clone();
        signature.set_query(None);
        if !params.is_empty() {
            signature.query_pairs_mut().extend_pairs(params);
        }

        Self(signature.into())
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide response cache with a fixed time-to-live per entry
///
/// Cloning is cheap; every clone shares the same entries. Expired entries
/// read as absent and are physically removed by [`ResponseCache::purge_expired`],
/// usually driven by the background sweeper.
#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

/// Handle for stopping the background sweeper
pub struct CacheSweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheSweeperHandle {
    /// Signals the sweeper to stop and waits for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache sweeper task failed");
        }
        tracing::info!("Cache sweeper stopped");
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a live value from the cache by key
    ///
    /// Returns `None` when the key is missing or its entry has expired.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let value = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(Instant::now()) => entry.value.clone(),
                _ => return Ok(None),
            }
        };

        Ok(Some(serde_json::from_value(value)?))
    }

    /// Stores a value that expires after `ttl`
    pub async fn set<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };

        self.entries.write().await.insert(key.clone(), entry);
    }

    /// Removes every expired entry, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawns a background task that purges expired entries every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> CacheSweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let cache = self.clone();

        let task = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Cache sweeper started");
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired().await;
                        if removed > 0 {
                            tracing::debug!(removed, "Purged expired cache entries");
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        CacheSweeperHandle { shutdown_tx, task }
    }
}
