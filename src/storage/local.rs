//! Local filesystem storage implementation.
//!
//! The cache is a single JSON object mapping channel slug to the raw block
//! list. It is read once when opened and rewritten atomically on every `put`,
//! so an interrupted run keeps every channel that finished.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Block, GraphDocument};
use crate::storage::BlockCache;

/// Ensure the parent directory of `path` exists.
async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Read bytes, returning None if the file doesn't exist.
async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Write compact JSON atomically.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    write_bytes(path, &bytes).await
}

/// Read JSON, returning None if the file doesn't exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match read_bytes(path).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Write the graph document.
pub async fn write_graph(path: impl AsRef<Path>, document: &GraphDocument) -> Result<()> {
    write_json(path.as_ref(), document).await
}

/// Read a previously written graph document.
pub async fn read_graph(path: impl AsRef<Path>) -> Result<Option<GraphDocument>> {
    read_json(path.as_ref()).await
}

/// JSON file backed [`BlockCache`].
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
    entries: IndexMap<String, Vec<Block>>,
}

impl LocalCache {
    /// Open the cache at `path`.
    ///
    /// With `fresh` set the persisted entries are ignored; the first `put`
    /// replaces the file with a cache that starts from scratch.
    pub async fn open(path: impl Into<PathBuf>, fresh: bool) -> Self {
        let path = path.into();
        let entries = if fresh {
            IndexMap::new()
        } else {
            Self::load_all(&path).await
        };
        if !entries.is_empty() {
            log::info!("Resuming with {} cached channels", entries.len());
        }
        Self { path, entries }
    }

    /// Read every cached channel. A missing or unreadable file is an empty cache.
    pub async fn load_all(path: &Path) -> IndexMap<String, Vec<Block>> {
        match read_json::<IndexMap<String, Vec<Block>>>(path).await {
            Ok(Some(entries)) => entries,
            Ok(None) => IndexMap::new(),
            Err(e) => {
                log::warn!("Ignoring unreadable cache {}: {}", path.display(), e);
                IndexMap::new()
            }
        }
    }

    /// All cached entries in insertion order.
    pub fn entries(&self) -> &IndexMap<String, Vec<Block>> {
        &self.entries
    }
}

#[async_trait]
impl BlockCache for LocalCache {
    fn has(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    fn get(&self, slug: &str) -> Option<&[Block]> {
        self.entries.get(slug).map(Vec::as_slice)
    }

    async fn put(&mut self, slug: &str, blocks: &[Block]) -> Result<()> {
        self.entries.insert(slug.to_string(), blocks.to_vec());
        write_json(&self.path, &self.entries).await
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn block(id: u64) -> Block {
        Block {
            id: Some(id),
            title: Some(format!("Block {id}")),
            ..Block::default()
        }
    }

    #[tokio::test]
    async fn test_write_and_read_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/test.txt");

        write_bytes(&path, b"hello").await.unwrap();
        assert_eq!(read_bytes(&path).await.unwrap(), Some(b"hello".to_vec()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        assert!(read_bytes(&tmp.path().join("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_is_durable_immediately() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut cache = LocalCache::open(&path, false).await;
        cache.put("stones", &[block(1), block(2)]).await.unwrap();
        cache.put("empty", &[]).await.unwrap();

        let reopened = LocalCache::open(&path, false).await;
        assert!(reopened.has("stones"));
        assert!(reopened.has("empty"));
        assert_eq!(reopened.get("stones").unwrap(), &[block(1), block(2)]);
        assert_eq!(reopened.get("empty").unwrap().len(), 0);
        assert_eq!(
            reopened.entries().keys().collect::<Vec<_>>(),
            vec!["stones", "empty"]
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty_cache() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        tokio::fs::write(&path, b"{\"stones\": [").await.unwrap();

        let cache = LocalCache::open(&path, false).await;
        assert!(cache.is_empty());
        assert!(!cache.has("stones"));
    }

    #[tokio::test]
    async fn test_fresh_ignores_and_replaces_existing_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");

        let mut old = LocalCache::open(&path, false).await;
        old.put("old", &[block(9)]).await.unwrap();

        let mut fresh = LocalCache::open(&path, true).await;
        assert!(!fresh.has("old"));
        assert!(fresh.get("old").is_none());

        fresh.put("new", &[block(1)]).await.unwrap();
        let on_disk = LocalCache::load_all(&path).await;
        assert_eq!(on_disk.keys().collect::<Vec<_>>(), vec!["new"]);
    }
}
