// src/pipeline/fetch.rs

//! Fetch stage: list channels and resolve every channel's blocks, from the
//! cache where possible.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Block, Channel, Config};
use crate::services::{ChannelLoader, JsonSource, fetch_user_channels};
use crate::storage::BlockCache;

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub cached: usize,
    pub fetched: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Everything the graph stage needs.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub channels: Vec<Channel>,
    pub blocks_by_slug: HashMap<String, Vec<Block>>,
    /// Slugs that could not be loaded this run
    pub failed: Vec<String>,
    pub stats: FetchStats,
}

/// Resolve all channels of the configured user.
///
/// Channels are walked in listing order. A cached slug is never requested;
/// a declared-empty channel is recorded without a request; anything else is
/// loaded and cached straight away. A channel that fails to load contributes
/// no blocks, is not cached, and does not stop the run.
pub async fn fetch_all(
    source: &dyn JsonSource,
    cache: &mut dyn BlockCache,
    config: &Config,
) -> Result<FetchOutcome> {
    let channels = fetch_user_channels(source, &config.api).await?;
    let loader = ChannelLoader::new(source, config.paging.clone());

    let mut blocks_by_slug: HashMap<String, Vec<Block>> = HashMap::new();
    let mut failed = Vec::new();
    let mut stats = FetchStats::default();

    for (i, channel) in channels.iter().enumerate() {
        let slug = channel.slug.as_str();
        if blocks_by_slug.contains_key(slug) {
            continue;
        }
        let progress = format!("[{}/{}]", i + 1, channels.len());

        if cache.has(slug) {
            let blocks = cache.get(slug).map(<[Block]>::to_vec).unwrap_or_default();
            log::info!(
                "{} \"{}\" ({} blocks) cached",
                progress,
                channel.title(),
                blocks.len()
            );
            blocks_by_slug.insert(slug.to_string(), blocks);
            stats.cached += 1;
            continue;
        }

        if channel.length() == 0 {
            log::info!("{} \"{}\" is empty, skipping", progress, channel.title());
            store(cache, slug, &[]).await;
            blocks_by_slug.insert(slug.to_string(), Vec::new());
            stats.empty += 1;
            continue;
        }

        log::info!(
            "{} Fetching \"{}\" ({} blocks)",
            progress,
            channel.title(),
            channel.length()
        );
        match loader.load_channel(slug, channel.length()).await {
            Ok(blocks) => {
                store(cache, slug, &blocks).await;
                blocks_by_slug.insert(slug.to_string(), blocks);
                stats.fetched += 1;
            }
            Err(e) => {
                log::error!("Failed to fetch '{}': {}. Re-run to retry.", slug, e);
                blocks_by_slug.insert(slug.to_string(), Vec::new());
                failed.push(slug.to_string());
                stats.failed += 1;
            }
        }
    }

    log::info!(
        "Fetch complete: {} cached, {} fetched, {} empty, {} failed",
        stats.cached,
        stats.fetched,
        stats.empty,
        stats.failed
    );

    Ok(FetchOutcome {
        channels,
        blocks_by_slug,
        failed,
        stats,
    })
}

/// Persist a channel; a write failure only costs resumability.
async fn store(cache: &mut dyn BlockCache, slug: &str, blocks: &[Block]) {
    if let Err(e) = cache.put(slug, blocks).await {
        log::warn!("Could not cache '{}': {}", slug, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::error::FetchError;
    use crate::storage::LocalCache;

    /// Fixed responses by path; unknown paths fail with 404.
    struct MapSource {
        responses: HashMap<String, Value>,
        requests: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn new(responses: Vec<(String, Value)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JsonSource for MapSource {
        async fn fetch_json(&self, path: &str) -> std::result::Result<Value, FetchError> {
            self.requests.lock().unwrap().push(path.to_string());
            self.responses
                .get(path)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: path.to_string(),
                    status: 404,
                })
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.api.user_id = 7;
        config
    }

    fn listing(channels: Value) -> (String, Value) {
        ("/users/7/channels?per=100".to_string(), json!({ "channels": channels }))
    }

    fn page(slug: &str, ids: &[u64]) -> (String, Value) {
        let contents: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
        (
            format!("/channels/{slug}/contents?per=50&page=1"),
            json!({ "contents": contents }),
        )
    }

    #[tokio::test]
    async fn test_cached_empty_fetched_and_failed() {
        let tmp = TempDir::new().unwrap();
        let cache_path = tmp.path().join("cache.json");
        {
            let mut seed = LocalCache::open(&cache_path, false).await;
            seed.put("kept", &[Block { id: Some(1), ..Block::default() }])
                .await
                .unwrap();
        }

        let source = MapSource::new(vec![
            listing(json!([
                {"id": 1, "title": "Kept", "slug": "kept", "length": 1},
                {"id": 2, "title": "Void", "slug": "void", "length": 0},
                {"id": 3, "title": "New", "slug": "new", "length": 2},
                {"id": 4, "title": "Gone", "slug": "gone", "length": 3}
            ])),
            page("new", &[2, 3]),
        ]);
        let mut cache = LocalCache::open(&cache_path, false).await;

        let outcome = fetch_all(&source, &mut cache, &config()).await.unwrap();

        assert_eq!(
            outcome.stats,
            FetchStats {
                cached: 1,
                fetched: 1,
                empty: 1,
                failed: 1,
            }
        );
        assert_eq!(outcome.failed, vec!["gone".to_string()]);
        assert_eq!(outcome.blocks_by_slug["new"].len(), 2);
        assert!(outcome.blocks_by_slug["gone"].is_empty());

        // nothing requested for kept or void; gone tried once per page size
        let requests = source.requests();
        assert!(!requests.iter().any(|p| p.contains("/kept/") || p.contains("/void/")));
        assert_eq!(
            requests.iter().filter(|p| p.contains("/gone/")).count(),
            2
        );

        let persisted = LocalCache::load_all(&cache_path).await;
        let mut slugs: Vec<_> = persisted.keys().cloned().collect();
        slugs.sort();
        assert_eq!(slugs, vec!["kept", "new", "void"]);
    }

    #[tokio::test]
    async fn test_resume_skips_cached_channel() {
        let tmp = TempDir::new().unwrap();
        let cache_path = tmp.path().join("cache.json");
        let channels = json!([{"id": 1, "title": "X", "slug": "x", "length": 2}]);

        let first = MapSource::new(vec![listing(channels.clone()), page("x", &[10, 11])]);
        let mut cache = LocalCache::open(&cache_path, false).await;
        let fetched = fetch_all(&first, &mut cache, &config()).await.unwrap();

        let second = MapSource::new(vec![listing(channels)]);
        let mut cache = LocalCache::open(&cache_path, false).await;
        let resumed = fetch_all(&second, &mut cache, &config()).await.unwrap();

        assert_eq!(second.requests(), vec!["/users/7/channels?per=100"]);
        assert_eq!(resumed.blocks_by_slug["x"], fetched.blocks_by_slug["x"]);
        assert_eq!(resumed.stats.cached, 1);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let source = MapSource::new(vec![]);
        let mut cache = LocalCache::open(tmp.path().join("cache.json"), false).await;

        assert!(fetch_all(&source, &mut cache, &config()).await.is_err());
    }
}
