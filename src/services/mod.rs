//! Service layer for talking to the Are.na API.
//!
//! - Paced, retrying requests (`RetryFetcher`)
//! - Channel listing and paginated contents (`ChannelLoader`)

mod fetcher;
mod loader;

pub use fetcher::{JsonSource, RetryFetcher};
pub use loader::{ChannelLoader, channels_path, contents_path, fetch_user_channels};
