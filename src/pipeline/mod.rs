//! Pipeline stages and entry points.
//!
//! - `fetch`: list channels and resolve their blocks through the cache
//! - `graph`: consolidate blocks into one deduplicated graph
//! - `tags`, `index`, `timeline`: derived indices over block nodes
//! - `document`: assemble the output document
//! - `run`: full run, `validate` and `info`

pub mod document;
pub mod fetch;
pub mod graph;
pub mod index;
pub mod run;
pub mod tags;
pub mod timeline;

pub use document::build_document;
pub use fetch::{FetchOutcome, FetchStats, fetch_all};
pub use graph::{Graph, channel_size, consolidate};
pub use index::build_index;
pub use run::{InfoReport, RunReport, run_info, run_pipeline, run_validate, run_with_source};
pub use tags::{AutoTagger, TagSet};
pub use timeline::build_timeline;
