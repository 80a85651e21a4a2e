//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API endpoint and account settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Request pacing and retry policy
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Page size and degrade policy for channel contents
    #[serde(default)]
    pub paging: PagingConfig,

    /// Auto-tagging vocabularies and thresholds
    #[serde(default)]
    pub tagging: TaggingConfig,

    /// Search index settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Cache and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        url::Url::parse(&self.api.base_url)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.channels_per_page == 0 {
            return Err(AppError::validation("api.channels_per_page must be > 0"));
        }
        if self.fetch.max_attempts == 0 {
            return Err(AppError::validation("fetch.max_attempts must be > 0"));
        }
        if self.paging.per_page == 0 || self.paging.min_per_page == 0 {
            return Err(AppError::validation("paging sizes must be > 0"));
        }
        if self.paging.min_per_page > self.paging.per_page {
            return Err(AppError::validation(
                "paging.min_per_page must not exceed paging.per_page",
            ));
        }
        if self.paging.shrink_factor < 2 {
            return Err(AppError::validation("paging.shrink_factor must be >= 2"));
        }
        if self.tagging.artist_min_len > self.tagging.artist_max_len {
            return Err(AppError::validation(
                "tagging.artist_min_len must not exceed tagging.artist_max_len",
            ));
        }
        if self.tagging.artist_separators.is_empty() {
            return Err(AppError::validation("No artist separators defined"));
        }
        if self.tagging.media_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(AppError::validation("No media extensions defined"));
        }
        if self.index.min_token_length == 0 {
            return Err(AppError::validation("index.min_token_length must be > 0"));
        }
        Ok(())
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Public site URL used to build channel links
    #[serde(default = "defaults::web_url")]
    pub web_url: String,

    /// Numeric id of the account whose channels are fetched
    #[serde(default = "defaults::user_id")]
    pub user_id: u64,

    /// Public slug of that account
    #[serde(default = "defaults::user_slug")]
    pub user_slug: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Page size for the channel listing call
    #[serde(default = "defaults::channels_per_page")]
    pub channels_per_page: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            web_url: defaults::web_url(),
            user_id: defaults::user_id(),
            user_slug: defaults::user_slug(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            channels_per_page: defaults::channels_per_page(),
        }
    }
}

/// Pacing and retry policy for single requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Delay before every request in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Attempts per request, first try included
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Backoff base; the wait after failed attempt n is base * 2^n
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,

    /// HTTP statuses that are retried
    #[serde(default = "defaults::retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: defaults::request_delay(),
            max_attempts: defaults::max_attempts(),
            backoff_base_ms: defaults::backoff_base(),
            retryable_statuses: defaults::retryable_statuses(),
        }
    }
}

/// Channel contents paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Initial page size
    #[serde(default = "defaults::per_page")]
    pub per_page: usize,

    /// Smallest page size before a channel is given up
    #[serde(default = "defaults::min_per_page")]
    pub min_per_page: usize,

    /// Divisor applied to the page size after a failed pass
    #[serde(default = "defaults::shrink_factor")]
    pub shrink_factor: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            per_page: defaults::per_page(),
            min_per_page: defaults::min_per_page(),
            shrink_factor: defaults::shrink_factor(),
        }
    }
}

/// Auto-tagging vocabularies and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Label used for blocks without any title
    #[serde(default = "defaults::untitled_label")]
    pub untitled_label: String,

    /// Separators tried in order when splitting "Artist, Work"
    #[serde(default = "defaults::artist_separators")]
    pub artist_separators: Vec<String>,

    /// Shortest accepted artist name, in characters
    #[serde(default = "defaults::artist_min_len")]
    pub artist_min_len: usize,

    /// Longest accepted artist name, in characters
    #[serde(default = "defaults::artist_max_len")]
    pub artist_max_len: usize,

    /// Distinct blocks a candidate needs before it becomes a tag
    #[serde(default = "defaults::artist_min_blocks")]
    pub artist_min_blocks: usize,

    /// Labels ending in one of these extensions are filenames
    #[serde(default = "defaults::media_extensions")]
    pub media_extensions: Vec<String>,

    /// Material and medium words
    #[serde(default = "defaults::medium_keywords")]
    pub medium_keywords: Vec<String>,

    /// Thematic words
    #[serde(default = "defaults::theme_keywords")]
    pub theme_keywords: Vec<String>,

    /// Blocks a domain needs before it gets a source tag
    #[serde(default = "defaults::source_min_blocks")]
    pub source_min_blocks: usize,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            untitled_label: defaults::untitled_label(),
            artist_separators: defaults::artist_separators(),
            artist_min_len: defaults::artist_min_len(),
            artist_max_len: defaults::artist_max_len(),
            artist_min_blocks: defaults::artist_min_blocks(),
            media_extensions: defaults::media_extensions(),
            medium_keywords: defaults::medium_keywords(),
            theme_keywords: defaults::theme_keywords(),
            source_min_blocks: defaults::source_min_blocks(),
        }
    }
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Minimum token length to include
    #[serde(default = "defaults::min_token_length")]
    pub min_token_length: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_token_length: defaults::min_token_length(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Raw channel contents cache
    #[serde(default = "defaults::cache_file")]
    pub cache_file: String,

    /// Graph document output
    #[serde(default = "defaults::output_file")]
    pub output_file: String,

    /// Dotenv-style file consulted when no token is given
    #[serde(default = "defaults::env_file")]
    pub env_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_file: defaults::cache_file(),
            output_file: defaults::output_file(),
            env_file: defaults::env_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when no RUST_LOG is set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "https://api.are.na/v2".into()
    }
    pub fn web_url() -> String {
        "https://www.are.na".into()
    }
    pub fn user_id() -> u64 {
        646889
    }
    pub fn user_slug() -> String {
        "conrad-house".into()
    }
    pub fn user_agent() -> String {
        "arena-graph-builder/1.0".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn channels_per_page() -> usize {
        100
    }

    // Fetch defaults
    pub fn request_delay() -> u64 {
        1200
    }
    pub fn max_attempts() -> u32 {
        5
    }
    pub fn backoff_base() -> u64 {
        5000
    }
    pub fn retryable_statuses() -> Vec<u16> {
        vec![429, 500, 502, 503, 504]
    }

    // Paging defaults
    pub fn per_page() -> usize {
        50
    }
    pub fn min_per_page() -> usize {
        10
    }
    pub fn shrink_factor() -> usize {
        5
    }

    // Tagging defaults
    pub fn untitled_label() -> String {
        "Untitled".into()
    }
    pub fn artist_separators() -> Vec<String> {
        [", ", " — ", " - ", " – "]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn artist_min_len() -> usize {
        3
    }
    pub fn artist_max_len() -> usize {
        60
    }
    pub fn artist_min_blocks() -> usize {
        2
    }
    pub fn media_extensions() -> Vec<String> {
        [
            "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "svg", "pdf", "mp4", "mov",
            "avi", "mp3", "wav",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn medium_keywords() -> Vec<String> {
        [
            "paper",
            "ink",
            "acrylic",
            "canvas",
            "oil",
            "pencil",
            "digital",
            "collage",
            "textile",
            "video",
            "ceramic",
            "glass",
            "bronze",
            "linen",
            "watercolor",
            "charcoal",
            "lithograph",
            "woodcut",
            "etching",
            "silkscreen",
            "embroidery",
            "photograph",
            "neon",
            "wire",
            "steel",
            "wood",
            "plaster",
            "marble",
            "gouache",
            "pastel",
            "tempera",
            "fresco",
            "mosaic",
            "porcelain",
            "aluminum",
            "copper",
            "latex",
            "resin",
            "plywood",
            "cardboard",
            "fabric",
            "thread",
            "yarn",
            "felt",
            "silk",
            "cotton",
            "wool",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn theme_keywords() -> Vec<String> {
        [
            "music",
            "light",
            "sound",
            "landscape",
            "grid",
            "geometric",
            "generative",
            "abstract",
            "pattern",
            "architecture",
            "typography",
            "algorithmic",
            "minimal",
            "kinetic",
            "optical",
            "conceptual",
            "systems",
            "rhythm",
            "portrait",
            "nature",
            "chance",
            "noise",
            "color",
            "space",
            "time",
            "movement",
            "texture",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn source_min_blocks() -> usize {
        5
    }

    // Index defaults
    pub fn min_token_length() -> usize {
        2
    }

    // Path defaults
    pub fn cache_file() -> String {
        "data/.arena-cache.json".into()
    }
    pub fn output_file() -> String {
        "data/arena-graph.json".into()
    }
    pub fn env_file() -> String {
        ".env".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
