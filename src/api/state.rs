use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::AppResult,
    services::{
        providers::{LetterboxdFeed, RequestLimiter, TmdbProvider},
        Recommender,
    },
    store::{InMemoryExclusionStore, ResponseCache},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
        }
    }

    /// Wires the production providers around a shared response cache
    pub fn from_config(config: &Config, cache: ResponseCache) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let limiter = RequestLimiter::new(config.max_concurrent_requests);

        let catalog = TmdbProvider::new(
            http_client.clone(),
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            cache,
            limiter,
            Duration::from_secs(config.cache_ttl_secs),
        );

        let history = LetterboxdFeed::new(http_client, config.feed_base_url.clone());

        tracing::info!(
            max_concurrent_requests = config.max_concurrent_requests,
            cache_ttl_secs = config.cache_ttl_secs,
            "Providers configured"
        );

        Ok(Self::new(Recommender::new(
            Arc::new(history),
            Arc::new(catalog),
            Arc::new(InMemoryExclusionStore::new()),
            config.pipeline_settings(),
            config.tmdb_image_base_url.clone(),
        )))
    }
}
