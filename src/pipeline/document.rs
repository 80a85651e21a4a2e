// src/pipeline/document.rs

//! Assembly of the output document from fetched channels.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Block, Channel, Config, GraphDocument, GraphMeta};

use super::graph::consolidate;
use super::index::build_index;
use super::tags::AutoTagger;
use super::timeline::build_timeline;

/// Format of `meta.fetchedAt`.
pub const FETCHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Consolidate, derive every index, and wrap it all in a document.
pub fn build_document(
    channels: &[Channel],
    blocks_by_slug: &HashMap<String, Vec<Block>>,
    failed: &[String],
    config: &Config,
    fetched_at: DateTime<Utc>,
) -> Result<GraphDocument> {
    let tagger = AutoTagger::new(&config.tagging)?;
    let mut graph = consolidate(
        channels,
        blocks_by_slug,
        &config.api,
        &config.tagging.untitled_label,
    );

    let mut tags = tagger.tag(&graph.blocks, &graph.domain_counts);
    for block in &mut graph.blocks {
        if let Some(block_tags) = tags.by_block.remove(&block.id) {
            block.auto_tags = block_tags;
        }
    }

    let search_index = build_index(&graph.blocks, &config.index);
    let sorted_timestamps = build_timeline(&graph.blocks);

    let meta = GraphMeta {
        user_id: config.api.user_id,
        user_slug: config.api.user_slug.clone(),
        fetched_at: fetched_at.format(FETCHED_AT_FORMAT).to_string(),
        channel_count: graph.channels.len(),
        block_count: graph.blocks.len(),
        edge_count: graph.edges.len(),
        cross_connected_blocks: graph.cross_connected(),
        domain_counts: std::mem::take(&mut graph.domain_counts),
        auto_tag_index: tags.index,
        auto_tag_stats: tags.stats,
        search_index,
        sorted_timestamps,
        failed_channels: failed.to_vec(),
    };

    Ok(GraphDocument {
        meta,
        elements: graph.into_elements(),
    })
}
