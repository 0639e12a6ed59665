//! Upstream data provider abstraction
//!
//! The pipeline talks to two kinds of upstream: a movie catalog (search,
//! discovery, details and credits) and a watch-history feed. Each is a trait
//! so stages can be exercised without the network.

use crate::{
    error::AppResult,
    models::{CatalogMovie, DiscoverQuery, MovieCredits, MovieDetails, MovieId},
};

pub mod letterboxd;
pub mod limiter;
pub mod tmdb;

pub use letterboxd::LetterboxdFeed;
pub use limiter::RequestLimiter;
pub use tmdb::TmdbProvider;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Free-text title search, best match first
    async fn search_movies(&self, query: &str) -> AppResult<Vec<CatalogMovie>>;

    /// One page (1-based) of filtered discovery results
    async fn discover_movies(&self, query: &DiscoverQuery, page: u32)
        -> AppResult<Vec<CatalogMovie>>;

    /// Rating, popularity, poster and synopsis for one movie
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Cast and crew for one movie
    async fn movie_credits(&self, id: MovieId) -> AppResult<MovieCredits>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for watch-history sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Normalized titles from the user's feed, most recent first
    async fn watched_titles(&self, username: &str) -> AppResult<Vec<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
