//! TMDB (The Movie Database) v3 catalog provider
//!
//! Endpoints used:
//! 1. Title Search: /search/movie → candidate ids for watched titles
//! 2. Discovery: /discover/movie → filtered, sorted, paginated candidates
//! 3. Details: /movie/{id} → rating, popularity, poster, synopsis
//! 4. Credits: /movie/{id}/credits → director
//!
//! Every response is cached by request signature; only cache misses take a
//! permit from the shared [`RequestLimiter`].

use crate::{
    cached,
    error::{AppError, AppResult},
    models::{
        CatalogMovie, DiscoverQuery, MovieCredits, MovieDetails, MovieId, MoviePage,
        PreferenceMode,
    },
    services::providers::{CatalogProvider, RequestLimiter},
    store::{CacheKey, ResponseCache},
};
use reqwest::{Client as HttpClient, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Vote-count boundary between the obscure and popular pools
const VOTE_COUNT_THRESHOLD: u32 = 500;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: ResponseCache,
    limiter: RequestLimiter,
    cache_ttl: Duration,
}

impl TmdbProvider {
    pub fn new(
        http_client: HttpClient,
        api_key: String,
        api_url: String,
        cache: ResponseCache,
        limiter: RequestLimiter,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            cache,
            limiter,
            cache_ttl,
        }
    }

    /// Builds an authenticated endpoint URL with query parameters in a fixed order
    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> AppResult<Url> {
        let base = format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let pairs = std::iter::once(("api_key", self.api_key.as_str()))
            .chain(params.iter().map(|(k, v)| (*k, v.as_str())));

        Url::parse_with_params(&base, pairs)
            .map_err(|e| AppError::Internal(format!("Invalid TMDB URL {}: {}", base, e)))
    }

    /// GETs a JSON payload, serving repeats from the response cache
    async fn get_json<T>(&self, url: Url) -> AppResult<T>
    where
        T: DeserializeOwned + Serialize,
    {
        cached!(self.cache, CacheKey::for_url(&url), self.cache_ttl, async {
            let _permit = self.limiter.acquire().await?;

            let response = self.http_client.get(url.clone()).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    path = %url.path(),
                    status = %status,
                    "TMDB request failed"
                );
                return Err(AppError::ExternalApi(format!(
                    "TMDB API returned status {}: {}",
                    status, body
                )));
            }

            let payload: T = response.json().await?;
            Ok::<T, AppError>(payload)
        })
    }
}

/// Query parameters for one discovery page
fn discover_params(query: &DiscoverQuery, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("with_genres", query.genre.clone()),
        ("primary_release_date.gte", format!("{}-01-01", query.start_year)),
        ("primary_release_date.lte", format!("{}-12-31", query.end_year)),
        ("page", page.to_string()),
    ];

    match query.mode {
        PreferenceMode::Obscure => {
            params.push(("vote_count.lte", VOTE_COUNT_THRESHOLD.to_string()));
            params.push(("sort_by", "vote_average.desc".to_string()));
        }
        PreferenceMode::Popular => {
            params.push(("vote_count.gte", VOTE_COUNT_THRESHOLD.to_string()));
            params.push(("sort_by", "popularity.desc".to_string()));
        }
    }

    params
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = self.endpoint_url("search/movie", &[("query", query.to_string())])?;
        let page: MoviePage = self.get_json(url).await?;

        tracing::debug!(
            query = %query,
            results = page.results.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(page.results)
    }

    async fn discover_movies(
        &self,
        query: &DiscoverQuery,
        page: u32,
    ) -> AppResult<Vec<CatalogMovie>> {
        let url = self.endpoint_url("discover/movie", &discover_params(query, page))?;
        let movies: MoviePage = self.get_json(url).await?;

        tracing::debug!(
            page,
            results = movies.results.len(),
            provider = self.name(),
            "Discovery page fetched"
        );

        Ok(movies.results)
    }

    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        let url = self.endpoint_url(&format!("movie/{}", id), &[])?;
        self.get_json(url).await
    }

    async fn movie_credits(&self, id: MovieId) -> AppResult<MovieCredits> {
        let url = self.endpoint_url(&format!("movie/{}/credits", id), &[])?;
        self.get_json(url).await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens here, so any request that reaches the network fails fast.
    const UNREACHABLE_API: &str = "http://127.0.0.1:1/3";

    fn create_test_provider(cache: ResponseCache, limiter: RequestLimiter) -> TmdbProvider {
        TmdbProvider::new(
            reqwest::Client::new(),
            "test_key".to_string(),
            UNREACHABLE_API.to_string(),
            cache,
            limiter,
            Duration::from_secs(3600),
        )
    }

    fn query(mode: PreferenceMode) -> DiscoverQuery {
        DiscoverQuery {
            genre: "18".to_string(),
            start_year: 1990,
            end_year: 1999,
            mode,
        }
    }

    #[test]
    fn test_endpoint_url_includes_api_key_first() {
        let provider = create_test_provider(ResponseCache::new(), RequestLimiter::new(1));
        let url = provider
            .endpoint_url("search/movie", &[("query", "Chungking Express".to_string())])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:1/3/search/movie?api_key=test_key&query=Chungking+Express"
        );
    }

    #[test]
    fn test_discover_params_obscure() {
        let params = discover_params(&query(PreferenceMode::Obscure), 3);

        assert!(params.contains(&("with_genres", "18".to_string())));
        assert!(params.contains(&("primary_release_date.gte", "1990-01-01".to_string())));
        assert!(params.contains(&("primary_release_date.lte", "1999-12-31".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("vote_count.lte", "500".to_string())));
        assert!(params.contains(&("sort_by", "vote_average.desc".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "vote_count.gte"));
    }

    #[test]
    fn test_discover_params_popular() {
        let params = discover_params(&query(PreferenceMode::Popular), 1);

        assert!(params.contains(&("vote_count.gte", "500".to_string())));
        assert!(params.contains(&("sort_by", "popularity.desc".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "vote_count.lte"));
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected() {
        let provider = create_test_provider(ResponseCache::new(), RequestLimiter::new(1));
        let result = provider.search_movies("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network_and_limiter() {
        let cache = ResponseCache::new();
        let limiter = RequestLimiter::new(1);
        let provider = create_test_provider(cache.clone(), limiter.clone());

        let url = provider.endpoint_url("movie/949/credits", &[]).unwrap();
        let credits = MovieCredits {
            crew: vec![crate::models::CrewMember {
                name: "Michael Mann".to_string(),
                job: "Director".to_string(),
            }],
        };
        cache
            .set(&CacheKey::for_url(&url), &credits, Duration::from_secs(60))
            .await;

        // With the only permit held, a network call would block forever.
        let _held = limiter.acquire().await.unwrap();
        let fetched = tokio::time::timeout(
            Duration::from_secs(5),
            provider.movie_credits(MovieId(949)),
        )
        .await
        .expect("cache hit must not wait for a permit")
        .unwrap();

        assert_eq!(fetched.director(), Some("Michael Mann"));
    }

    #[tokio::test]
    async fn test_failed_request_is_not_cached() {
        let cache = ResponseCache::new();
        let provider = create_test_provider(cache.clone(), RequestLimiter::new(1));

        let result = provider.movie_details(MovieId(1)).await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }
}
