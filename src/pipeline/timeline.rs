// src/pipeline/timeline.rs

//! Time-ordered index of blocks for timeline scrubbing.

use crate::models::{BlockNode, Timeline};
use crate::utils::parse_timestamp_ms;

/// Sort blocks by connection time (creation time as fallback).
///
/// Blocks without a parseable timestamp are left out. Equal timestamps keep
/// block order.
pub fn build_timeline(blocks: &[BlockNode]) -> Timeline {
    let mut entries: Vec<(i64, String)> = blocks
        .iter()
        .filter_map(|block| {
            let at = if block.connected_at.is_empty() {
                &block.created_at
            } else {
                &block.connected_at
            };
            parse_timestamp_ms(at).map(|ts| (ts, block.id.clone()))
        })
        .collect();

    entries.sort_by_key(|(ts, _)| *ts);
    log::info!("Timeline: {} timestamped blocks", entries.len());
    Timeline(entries)
}
