use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL prepended to poster paths
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Base URL of the watch-history feed host
    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Response cache time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How often expired cache entries are swept, in seconds
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Maximum simultaneous outbound catalog requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Per-request timeout for outbound calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_discovery_pages")]
    pub discovery_pages: u32,

    #[serde(default = "default_history_sample_size")]
    pub history_sample_size: usize,

    #[serde(default = "default_top_creator_count")]
    pub top_creator_count: usize,

    #[serde(default = "default_selection_pool_size")]
    pub selection_pool_size: usize,

    #[serde(default = "default_result_count")]
    pub result_count: usize,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_feed_base_url() -> String {
    "https://letterboxd.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_sweep_interval_secs() -> u64 {
    300
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_discovery_pages() -> u32 {
    PipelineSettings::default().discovery_pages
}

fn default_history_sample_size() -> usize {
    PipelineSettings::default().history_sample_size
}

fn default_top_creator_count() -> usize {
    PipelineSettings::default().top_creator_count
}

fn default_selection_pool_size() -> usize {
    PipelineSettings::default().selection_pool_size
}

fn default_result_count() -> usize {
    PipelineSettings::default().result_count
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Pipeline sizing knobs taken from this configuration
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            history_sample_size: self.history_sample_size,
            top_creator_count: self.top_creator_count,
            discovery_pages: self.discovery_pages,
            selection_pool_size: self.selection_pool_size,
            result_count: self.result_count,
        }
    }
}

/// Sizes and budgets used by each recommendation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Number of most recent watched titles used for inference
    pub history_sample_size: usize,
    /// Length of the preference profile
    pub top_creator_count: usize,
    /// Discovery pages requested per recommendation
    pub discovery_pages: u32,
    /// Top-scored candidates eligible for the random draw
    pub selection_pool_size: usize,
    /// Recommendations returned per call
    pub result_count: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            history_sample_size: 15,
            top_creator_count: 5,
            discovery_pages: 5,
            selection_pool_size: 50,
            result_count: 3,
        }
    }
}
