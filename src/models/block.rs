// src/models/block.rs

//! Raw block (item) data structure as returned by the API and kept in the cache.
//!
//! Only the fields the graph needs are typed; everything else is carried in
//! `extra` so a cached block serializes back to what the API sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A block inside a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_title: Option<String>,

    /// Block kind: Image, Text, Link, Media, Attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BlockImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BlockSource>,

    /// Text body, meaningful for Text blocks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// When the block was connected to the channel it was listed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image variants of a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<ImageVersion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square: Option<ImageVersion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<ImageVersion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ImageVersion>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One image variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a block was captured from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl Block {
    /// Display label: title, then generated title, then the placeholder.
    pub fn label<'a>(&'a self, untitled: &'a str) -> &'a str {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.generated_title.as_deref()))
            .unwrap_or(untitled)
    }

    /// Block class, `Unknown` when absent.
    pub fn class(&self) -> &str {
        self.class.as_deref().unwrap_or("Unknown")
    }

    fn image_url(&self, pick: impl Fn(&BlockImage) -> Option<&ImageVersion>) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(pick)
            .and_then(|v| non_empty(v.url.as_deref()))
    }

    /// Thumbnail URL: dedicated thumb, else the square crop.
    pub fn thumb_url(&self) -> Option<&str> {
        self.image_url(|i| i.thumb.as_ref())
            .or_else(|| self.image_url(|i| i.square.as_ref()))
    }

    /// Display-quality URL (plays animated GIFs).
    pub fn display_url(&self) -> Option<&str> {
        self.image_url(|i| i.display.as_ref())
    }

    /// Original upload URL.
    pub fn original_url(&self) -> Option<&str> {
        self.image_url(|i| i.original.as_ref())
    }

    /// Source URL, if the block was captured from somewhere.
    pub fn source_url(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| non_empty(s.url.as_deref()))
    }

    /// Text content for Text blocks; `None` for every other class.
    pub fn text_content(&self) -> Option<&str> {
        (self.class() == "Text").then(|| self.content.as_deref().unwrap_or(""))
    }

    /// Creation timestamp, empty when absent.
    pub fn created_at(&self) -> &str {
        self.created_at.as_deref().unwrap_or("")
    }

    /// Connection timestamp, empty when absent.
    pub fn connected_at(&self) -> &str {
        self.connected_at.as_deref().unwrap_or("")
    }
}

/// Response of one channel contents page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentsPage {
    #[serde(default)]
    pub contents: Vec<Value>,
}
