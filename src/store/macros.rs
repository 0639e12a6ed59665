/// A macro to simplify response caching.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it awaits the provided future to compute the value,
/// stores it in the cache only when it succeeded, and then returns it.
///
/// # Arguments
/// * `$cache`: The [`ResponseCache`](crate::store::ResponseCache) to read and write.
/// * `$key`: The [`CacheKey`](crate::store::CacheKey) for the value.
/// * `$ttl`: The time-to-live as a `std::time::Duration`.
/// * `$block`: A future yielding `AppResult<T>`, awaited only on a miss.
///
/// # Example
/// ```rust,ignore
/// let page: MoviePage = cached!(self.cache, CacheKey::for_url(&url), ttl, async move {
///     fetch_page(&url).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(cached)
            }
            Ok(None) | Err(_) => match $block.await {
                Ok(value) => {
                    $cache.set(&key, &value, $ttl).await;
                    Ok(value)
                }
                Err(e) => Err(e),
            },
        }
    }};
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::{AppError, AppResult};
    use crate::store::{CacheKey, ResponseCache};

    const TTL: Duration = Duration::from_secs(60);

    async fn lookup(cache: &ResponseCache, calls: &AtomicUsize, fail: bool) -> AppResult<u32> {
        cached!(cache, CacheKey::from("lookup"), TTL, async {
            calls.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(AppError::ExternalApi("upstream down".to_string()))
            } else {
                Ok(7u32)
            }
        })
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = ResponseCache::new();
        let calls = AtomicUsize::new(0);

        assert_eq!(lookup(&cache, &calls, false).await.unwrap(), 7);
        assert_eq!(lookup(&cache, &calls, false).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = ResponseCache::new();
        let calls = AtomicUsize::new(0);

        assert!(lookup(&cache, &calls, true).await.is_err());
        assert!(cache.is_empty().await);

        assert_eq!(lookup(&cache, &calls, false).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
