// src/models/graph.rs

//! Output document: Cytoscape-style `elements` plus derived indices in `meta`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of channel node ids.
pub const CHANNEL_PREFIX: &str = "ch-";

/// Prefix of block node ids.
pub const BLOCK_PREFIX: &str = "bl-";

/// Node id of a channel.
pub fn channel_node_id(id: u64) -> String {
    format!("{CHANNEL_PREFIX}{id}")
}

/// Node id of a block.
pub fn block_node_id(id: u64) -> String {
    format!("{BLOCK_PREFIX}{id}")
}

/// The complete graph document written at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub meta: GraphMeta,
    pub elements: Elements,
}

/// Aggregate counts and derived indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
    pub user_id: u64,
    pub user_slug: String,
    /// UTC, `%Y-%m-%dT%H:%M:%SZ`
    pub fetched_at: String,
    pub channel_count: usize,
    pub block_count: usize,
    pub edge_count: usize,
    /// Blocks connected to more than one channel
    pub cross_connected_blocks: usize,
    /// Blocks per source domain, largest first
    pub domain_counts: IndexMap<String, usize>,
    pub auto_tag_index: IndexMap<String, Vec<String>>,
    pub auto_tag_stats: TagStats,
    pub search_index: SearchIndex,
    pub sorted_timestamps: Timeline,
    /// Channels that could not be fetched this run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_channels: Vec<String>,
}

/// Summary of the auto-tagging pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStats {
    /// Blocks carrying at least one tag
    pub total_tagged: usize,
    /// Tag assignments over all blocks
    pub total_tags: usize,
    /// Distinct tag keys
    pub unique_tags: usize,
}

/// Nodes and edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Elements {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A node wrapper in Cytoscape's `{ data: ... }` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub data: NodeData,
}

/// Node payload, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeData {
    Channel(ChannelNode),
    Block(BlockNode),
}

impl NodeData {
    pub fn id(&self) -> &str {
        match self {
            NodeData::Channel(c) => &c.id,
            NodeData::Block(b) => &b.id,
        }
    }
}

/// A channel node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelNode {
    pub id: String,
    pub label: String,
    pub slug: String,
    pub block_count: usize,
    pub status: String,
    pub description: String,
    pub updated_at: String,
    pub arena_url: String,
    /// Presentational radius, see [`channel_size`](crate::pipeline::graph::channel_size)
    pub size: f64,
}

/// A block node, shared by every channel that references the block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub id: String,
    pub label: String,
    pub class: String,
    pub thumb: Option<String>,
    pub display: Option<String>,
    pub original: Option<String>,
    pub source: Option<String>,
    pub domain: Option<String>,
    pub content: Option<String>,
    pub description: String,
    pub created_at: String,
    /// Earliest connection time over all channels
    pub connected_at: String,
    /// `connected_at` in epoch milliseconds
    pub ts: Option<i64>,
    pub connection_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_tags: Vec<String>,
}

/// A channel → block edge, one per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub data: EdgeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Inverted index: token → block ids containing it, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchIndex(pub IndexMap<String, Vec<String>>);

impl SearchIndex {
    /// Block ids for an exact token.
    pub fn lookup(&self, token: &str) -> &[String] {
        self.0.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tokens starting with `prefix`, in index order.
    pub fn tokens_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.0
            .keys()
            .filter(move |t| t.starts_with(prefix))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ascending `(epoch ms, block id)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline(pub Vec<(i64, String)>);

impl Timeline {
    /// Entries with `from <= ts < to`, found by binary search.
    pub fn range(&self, from: i64, to: i64) -> &[(i64, String)] {
        let start = self.0.partition_point(|(ts, _)| *ts < from);
        let end = self.0.partition_point(|(ts, _)| *ts < to);
        &self.0[start..end.max(start)]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serializes_with_type_tag() {
        let node = GraphNode {
            data: NodeData::Channel(ChannelNode {
                id: channel_node_id(9),
                label: "Stones".into(),
                slug: "stones".into(),
                block_count: 0,
                status: "public".into(),
                description: String::new(),
                updated_at: String::new(),
                arena_url: "https://www.are.na/someone/stones".into(),
                size: 50.0,
            }),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["data"]["type"], "channel");
        assert_eq!(value["data"]["id"], "ch-9");
        assert_eq!(value["data"]["blockCount"], 0);
        assert_eq!(value["data"]["arenaUrl"], "https://www.are.na/someone/stones");
    }

    #[test]
    fn test_timeline_range() {
        let timeline = Timeline(vec![
            (10, "bl-1".into()),
            (20, "bl-2".into()),
            (20, "bl-3".into()),
            (30, "bl-4".into()),
        ]);
        let hits: Vec<_> = timeline.range(20, 30).iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(hits, vec!["bl-2", "bl-3"]);
        assert!(timeline.range(31, 40).is_empty());
        assert!(timeline.range(30, 10).is_empty());
    }

    #[test]
    fn test_search_index_prefix() {
        let mut map = IndexMap::new();
        map.insert("moon".to_string(), vec!["bl-1".to_string()]);
        map.insert("moonrise".to_string(), vec!["bl-2".to_string()]);
        map.insert("dome".to_string(), vec!["bl-3".to_string()]);
        let index = SearchIndex(map);

        let tokens: Vec<_> = index.tokens_with_prefix("moon").collect();
        assert_eq!(tokens, vec!["moon", "moonrise"]);
        assert_eq!(index.lookup("dome"), ["bl-3".to_string()]);
        assert!(index.lookup("sun").is_empty());
    }
}
