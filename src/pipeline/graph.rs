// src/pipeline/graph.rs

//! Consolidation of all channels' raw blocks into one deduplicated graph.
//!
//! Blocks live in a single arena keyed by their API id. A block that appears
//! in several channels keeps one node; every appearance adds one edge and
//! bumps the node's connection count.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::models::graph::{block_node_id, channel_node_id};
use crate::models::{
    ApiConfig, Block, BlockNode, Channel, ChannelNode, EdgeData, Elements, GraphEdge, GraphNode,
    NodeData,
};
use crate::utils::{get_domain, parse_timestamp_ms};

/// Node radius for a channel with `length` blocks, one decimal.
pub fn channel_size(length: usize) -> f64 {
    let raw = 30.0 + 12.0 * ((length as f64) + 1.0).ln();
    (raw.clamp(50.0, 120.0) * 10.0).round() / 10.0
}

/// Result of consolidation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// Channel nodes in input order
    pub channels: Vec<ChannelNode>,
    /// Block nodes in first-seen order
    pub blocks: Vec<BlockNode>,
    /// One edge per (channel, block) occurrence
    pub edges: Vec<GraphEdge>,
    /// Blocks per source domain, largest first
    pub domain_counts: IndexMap<String, usize>,
}

impl Graph {
    /// Blocks referenced by more than one channel.
    pub fn cross_connected(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.connection_count > 1)
            .count()
    }

    /// Cytoscape elements: channels first, then blocks.
    pub fn into_elements(self) -> Elements {
        let nodes = self
            .channels
            .into_iter()
            .map(NodeData::Channel)
            .chain(self.blocks.into_iter().map(NodeData::Block))
            .map(|data| GraphNode { data })
            .collect();

        Elements {
            nodes,
            edges: self.edges,
        }
    }
}

/// Block arena plus id lookup.
#[derive(Default)]
struct BlockArena {
    nodes: Vec<BlockNode>,
    by_id: HashMap<u64, usize>,
}

impl BlockArena {
    /// Record one occurrence of `block`, returning its node id.
    fn record(&mut self, id: u64, block: &Block, untitled: &str) -> &str {
        let idx = match self.by_id.get(&id) {
            Some(&idx) => {
                merge_occurrence(&mut self.nodes[idx], block);
                idx
            }
            None => {
                let idx = self.nodes.len();
                self.nodes.push(new_block_node(id, block, untitled));
                self.by_id.insert(id, idx);
                idx
            }
        };
        &self.nodes[idx].id
    }
}

fn new_block_node(id: u64, block: &Block, untitled: &str) -> BlockNode {
    let source = block.source_url().map(String::from);
    let domain = source.as_deref().and_then(get_domain);
    let connected_at = match block.connected_at() {
        "" => block.created_at(),
        at => at,
    }
    .to_string();

    BlockNode {
        id: block_node_id(id),
        label: block.label(untitled).to_string(),
        class: block.class().to_string(),
        thumb: block.thumb_url().map(String::from),
        display: block.display_url().map(String::from),
        original: block.original_url().map(String::from),
        source,
        domain,
        content: block.text_content().map(String::from),
        description: block.description.clone().unwrap_or_default(),
        created_at: block.created_at().to_string(),
        ts: parse_timestamp_ms(&connected_at),
        connected_at,
        connection_count: 1,
        auto_tags: Vec::new(),
    }
}

/// Later occurrence of a known block: count it and keep the earliest
/// connection time (ISO 8601 strings compare chronologically).
fn merge_occurrence(node: &mut BlockNode, block: &Block) {
    node.connection_count += 1;
    let candidate = block.connected_at();
    if !candidate.is_empty()
        && (node.connected_at.is_empty() || candidate < node.connected_at.as_str())
    {
        node.connected_at = candidate.to_string();
        node.ts = parse_timestamp_ms(candidate);
    }
}

fn channel_node(channel: &Channel, api: &ApiConfig) -> ChannelNode {
    ChannelNode {
        id: channel_node_id(channel.id),
        label: channel.title().to_string(),
        slug: channel.slug.clone(),
        block_count: channel.length(),
        status: channel.status().to_string(),
        description: channel.description().to_string(),
        updated_at: channel.updated_at.clone().unwrap_or_default(),
        arena_url: format!(
            "{}/{}/{}",
            api.web_url.trim_end_matches('/'),
            api.user_slug,
            channel.slug
        ),
        size: channel_size(channel.length()),
    }
}

/// Merge every channel's blocks into one graph.
///
/// Channels without an entry in `blocks_by_slug` (failed fetches) contribute
/// only their node. Blocks without an id are skipped.
pub fn consolidate(
    channels: &[Channel],
    blocks_by_slug: &HashMap<String, Vec<Block>>,
    api: &ApiConfig,
    untitled: &str,
) -> Graph {
    let mut arena = BlockArena::default();
    let mut edges = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    let channel_nodes: Vec<ChannelNode> = channels.iter().map(|c| channel_node(c, api)).collect();

    for channel in channels {
        if !visited.insert(channel.slug.as_str()) {
            log::debug!("Channel '{}' listed twice, consolidating once", channel.slug);
            continue;
        }
        let Some(blocks) = blocks_by_slug.get(&channel.slug) else {
            continue;
        };

        let source = channel_node_id(channel.id);
        for block in blocks {
            let Some(id) = block.id else { continue };
            let target = arena.record(id, block, untitled).to_string();
            edges.push(GraphEdge {
                data: EdgeData {
                    id: format!("e-{}-{}", channel.id, id),
                    source: source.clone(),
                    target,
                },
            });
        }
    }

    let domain_counts = count_domains(&arena.nodes);
    log::info!(
        "Consolidated {} channels, {} blocks, {} edges",
        channel_nodes.len(),
        arena.nodes.len(),
        edges.len()
    );

    Graph {
        channels: channel_nodes,
        blocks: arena.nodes,
        edges,
        domain_counts,
    }
}

/// Blocks per domain, sorted by count descending; ties keep first-seen order.
fn count_domains(blocks: &[BlockNode]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for domain in blocks.iter().filter_map(|b| b.domain.as_deref()) {
        *counts.entry(domain.to_string()).or_default() += 1;
    }
    // stable
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}
