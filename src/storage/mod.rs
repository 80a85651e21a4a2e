//! Storage for raw channel contents and the output document.
//!
//! ## Layout
//!
//! ```text
//! data/
//! ├── .arena-cache.json     # slug -> raw blocks, rewritten after every channel
//! └── arena-graph.json      # graph document
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Block;

// Re-export for convenience
pub use local::{LocalCache, read_graph, write_graph};

/// Durable record of channels that were fetched completely.
///
/// A present entry is a full substitute for fetching that channel again.
#[async_trait]
pub trait BlockCache: Send + Sync {
    /// Whether `slug` can be served from the cache.
    fn has(&self, slug: &str) -> bool;

    /// Cached blocks of `slug`.
    fn get(&self, slug: &str) -> Option<&[Block]>;

    /// Record `slug` and persist the whole cache before returning.
    async fn put(&mut self, slug: &str, blocks: &[Block]) -> Result<()>;

    /// Number of cached channels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
