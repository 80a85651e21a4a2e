// src/models/mod.rs

//! Domain models for the graph builder.
//!
//! Raw API shapes (`Channel`, `Block`), configuration, and the output
//! graph document.

mod block;
mod channel;
mod config;
pub mod graph;

// Re-export all public types
pub use block::{Block, BlockImage, BlockSource, ContentsPage, ImageVersion};
pub use channel::{Channel, ChannelList, ChannelMetadata};
pub use config::{
    ApiConfig, Config, FetchConfig, IndexConfig, LoggingConfig, PagingConfig, PathsConfig,
    TaggingConfig,
};
pub use graph::{
    BlockNode, ChannelNode, EdgeData, Elements, GraphDocument, GraphEdge, GraphMeta, GraphNode,
    NodeData, SearchIndex, TagStats, Timeline,
};
