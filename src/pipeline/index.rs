//! Inverted index generation for client-side search.
//!
//! Maps lowercase ASCII word tokens to the block node ids whose label or
//! description contains them, so the viewer can do prefix search without a
//! backend.
//!
//! > Example: `{"moonrise": ["bl-1"], "adams": ["bl-1", "bl-2"]}`

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::models::{BlockNode, IndexConfig, SearchIndex};

/// Builder for constructing a search index.
pub struct IndexBuilder {
    config: IndexConfig,
    index: IndexMap<String, Vec<String>>,
    block_count: usize,
}

impl IndexBuilder {
    /// Create a new index builder with default configuration.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Create a new index builder with custom configuration.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            index: IndexMap::new(),
            block_count: 0,
        }
    }

    /// Add a block to the index.
    pub fn add_block(&mut self, block: &BlockNode) {
        self.block_count += 1;

        let text = format!("{} {}", block.label, block.description);
        let mut seen = HashSet::new();
        for token in self.tokenize(&text) {
            if seen.insert(token.clone()) {
                self.index.entry(token).or_default().push(block.id.clone());
            }
        }
    }

    /// Add multiple blocks to the index.
    pub fn add_blocks(&mut self, blocks: &[BlockNode]) {
        for block in blocks {
            self.add_block(block);
        }
    }

    /// Build the final index.
    pub fn build(self) -> SearchIndex {
        log::info!(
            "Search index: {} terms over {} blocks",
            self.index.len(),
            self.block_count
        );
        SearchIndex(self.index)
    }

    /// Maximal runs of `[a-z0-9]` after lowercasing, at least
    /// `min_token_length` long.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.to_lowercase();

        normalized
            .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
            .filter(|word| word.len() >= self.config.min_token_length)
            .map(String::from)
            .collect()
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a search index from block nodes.
pub fn build_index(blocks: &[BlockNode], config: &IndexConfig) -> SearchIndex {
    let mut builder = IndexBuilder::with_config(config.clone());
    builder.add_blocks(blocks);
    builder.build()
}
