// src/services/loader.rs

//! Channel listing and paginated channel contents.

use serde_json::Value;

use crate::error::{AppError, FetchError, Result};
use crate::models::{ApiConfig, Block, Channel, ChannelList, ContentsPage, PagingConfig};
use crate::services::JsonSource;

/// API path of the user's channel listing.
pub fn channels_path(user_id: u64, per: usize) -> String {
    format!("/users/{user_id}/channels?per={per}")
}

/// API path of one page of channel contents.
pub fn contents_path(slug: &str, per: usize, page: usize) -> String {
    format!("/channels/{slug}/contents?per={per}&page={page}")
}

/// Fetch every channel owned by the configured user.
pub async fn fetch_user_channels(source: &dyn JsonSource, api: &ApiConfig) -> Result<Vec<Channel>> {
    let path = channels_path(api.user_id, api.channels_per_page);
    let value = source.fetch_json(&path).await?;
    let list: ChannelList = serde_json::from_value(value)?;
    log::info!("Found {} channels", list.channels.len());
    Ok(list.channels)
}

/// Loads all blocks of a channel, shrinking the page size when pages fail.
pub struct ChannelLoader<'a> {
    source: &'a dyn JsonSource,
    paging: PagingConfig,
}

impl<'a> ChannelLoader<'a> {
    pub fn new(source: &'a dyn JsonSource, paging: PagingConfig) -> Self {
        Self { source, paging }
    }

    /// Fetch every page of `slug` in order.
    ///
    /// A failed page throws away the partial result and starts again from
    /// page 1 with a smaller page size. Once the floor size fails too, the
    /// channel is reported as failed.
    pub async fn load_channel(&self, slug: &str, declared: usize) -> Result<Vec<Block>> {
        let floor = self.paging.min_per_page.max(1);
        let factor = self.paging.shrink_factor.max(2);
        let mut per_page = self.paging.per_page.max(1);

        loop {
            match self.fetch_pages(slug, declared, per_page).await {
                Ok(blocks) => return Ok(blocks),
                Err(error) if per_page > floor => {
                    let smaller = (per_page / factor).max(floor);
                    log::warn!(
                        "Page size {} failing for '{}' ({}), retrying channel with per={}",
                        per_page,
                        slug,
                        error,
                        smaller
                    );
                    per_page = smaller;
                }
                Err(error) => return Err(AppError::channel_load(slug, per_page, error)),
            }
        }
    }

    /// One full pass over the channel at a fixed page size.
    async fn fetch_pages(
        &self,
        slug: &str,
        declared: usize,
        per_page: usize,
    ) -> std::result::Result<Vec<Block>, FetchError> {
        let total_pages = declared.div_ceil(per_page);
        let mut blocks = Vec::new();

        for page in 1..=total_pages {
            let path = contents_path(slug, per_page, page);
            let value = self.source.fetch_json(&path).await?;
            let contents = parse_contents(&path, value)?;
            log::debug!(
                "{} page {}/{} (per={}): {} blocks",
                slug,
                page,
                total_pages,
                per_page,
                contents.len()
            );
            blocks.extend(contents);
        }
        Ok(blocks)
    }
}

/// Decode a contents page, dropping entries that are not block objects.
fn parse_contents(path: &str, value: Value) -> std::result::Result<Vec<Block>, FetchError> {
    let page: ContentsPage = serde_json::from_value(value).map_err(|source| FetchError::Decode {
        url: path.to_string(),
        source,
    })?;

    Ok(page
        .contents
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Block>(raw) {
            Ok(block) => Some(block),
            Err(e) => {
                log::debug!("Skipping undecodable block in {}: {}", path, e);
                None
            }
        })
        .collect())
}
