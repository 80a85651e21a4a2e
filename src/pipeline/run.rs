// src/pipeline/run.rs

//! Pipeline entry points: full fetch run, configuration check, and a
//! summary of what is on disk.

use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, GraphDocument};
use crate::services::{JsonSource, RetryFetcher};
use crate::storage::{LocalCache, read_graph, write_graph};
use crate::utils::http::create_async_client;

use super::document::build_document;
use super::fetch::{FetchStats, fetch_all};
use super::tags::AutoTagger;

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: FetchStats,
    pub document: GraphDocument,
}

/// Fetch everything over HTTP and write the graph document.
pub async fn run_pipeline(config: &Config, token: &str, fresh: bool) -> Result<RunReport> {
    config.validate()?;
    let client = create_async_client(&config.api, token)?;
    let fetcher = RetryFetcher::new(client, &config.api, config.fetch.clone());
    run_with_source(&fetcher, config, fresh).await
}

/// Same as [`run_pipeline`] over any JSON source.
pub async fn run_with_source(
    source: &dyn JsonSource,
    config: &Config,
    fresh: bool,
) -> Result<RunReport> {
    log::info!("Are.na graph fetch for user {}", config.api.user_slug);
    if fresh {
        log::info!("Fresh run, ignoring {}", config.paths.cache_file);
    }

    let mut cache = LocalCache::open(&config.paths.cache_file, fresh).await;
    let outcome = fetch_all(source, &mut cache, config).await?;

    log::info!("Building graph");
    let document = build_document(
        &outcome.channels,
        &outcome.blocks_by_slug,
        &outcome.failed,
        config,
        Utc::now(),
    )?;

    write_graph(&config.paths.output_file, &document).await?;
    log_summary(&document, &config.paths.output_file);

    Ok(RunReport {
        stats: outcome.stats,
        document,
    })
}

fn log_summary(document: &GraphDocument, path: &str) {
    let meta = &document.meta;
    log::info!("Graph written to {}", path);
    log::info!(
        "  {} channels, {} unique blocks, {} edges",
        meta.channel_count,
        meta.block_count,
        meta.edge_count
    );
    log::info!("  {} blocks in multiple channels", meta.cross_connected_blocks);
    log::info!(
        "  {} auto-tags, {} blocks tagged",
        meta.auto_tag_stats.unique_tags,
        meta.auto_tag_stats.total_tagged
    );
    log::info!(
        "  {} search terms, {} timestamped blocks",
        meta.search_index.len(),
        meta.sorted_timestamps.len()
    );
    if !meta.failed_channels.is_empty() {
        log::warn!(
            "  {} channels failed: {}",
            meta.failed_channels.len(),
            meta.failed_channels.join(", ")
        );
    }
}

/// Check configuration values and compile the tagging patterns.
pub fn run_validate(config: &Config) -> Result<()> {
    config.validate()?;
    AutoTagger::new(&config.tagging)?;
    log::info!(
        "Configuration OK: user {} ({}), {} medium and {} theme keywords",
        config.api.user_slug,
        config.api.user_id,
        config.tagging.medium_keywords.len(),
        config.tagging.theme_keywords.len()
    );
    Ok(())
}

/// What is currently on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoReport {
    pub cached_channels: usize,
    pub cached_blocks: usize,
    /// `(fetchedAt, channels, blocks, edges)` of the last document
    pub last_output: Option<(String, usize, usize, usize)>,
}

/// Summarise the cache and the last written document.
pub async fn run_info(config: &Config) -> Result<InfoReport> {
    let entries = LocalCache::load_all(Path::new(&config.paths.cache_file)).await;
    let cached_blocks = entries.values().map(Vec::len).sum();
    log::info!(
        "Cache {}: {} channels, {} blocks",
        config.paths.cache_file,
        entries.len(),
        cached_blocks
    );

    let last_output = read_graph(&config.paths.output_file).await?.map(|doc| {
        let meta = doc.meta;
        log::info!(
            "Output {}: fetched {}, {} channels, {} blocks, {} edges",
            config.paths.output_file,
            meta.fetched_at,
            meta.channel_count,
            meta.block_count,
            meta.edge_count
        );
        (
            meta.fetched_at,
            meta.channel_count,
            meta.block_count,
            meta.edge_count,
        )
    });
    if last_output.is_none() {
        log::info!("No output at {}", config.paths.output_file);
    }

    Ok(InfoReport {
        cached_channels: entries.len(),
        cached_blocks,
        last_output,
    })
}
