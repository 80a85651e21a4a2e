// src/models/channel.rs

//! Channel (collection) data structure as returned by the API.

use serde::{Deserialize, Serialize};

/// A channel owned by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    /// Numeric channel id
    pub id: u64,

    /// Display title
    #[serde(default)]
    pub title: Option<String>,

    /// Stable external key, also the cache key
    pub slug: String,

    /// Declared number of blocks
    #[serde(default)]
    pub length: Option<usize>,

    /// Visibility status
    #[serde(default)]
    pub status: Option<String>,

    /// Free-form metadata; only the description is read
    #[serde(default)]
    pub metadata: Option<ChannelMetadata>,

    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Channel metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChannelMetadata {
    #[serde(default)]
    pub description: Option<String>,
}

impl Channel {
    /// Display title, empty when absent.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Declared block count, zero when absent.
    pub fn length(&self) -> usize {
        self.length.unwrap_or(0)
    }

    /// Description text, empty when absent.
    pub fn description(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.description.as_deref())
            .unwrap_or("")
    }

    /// Visibility status, `public` when absent.
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("public")
    }
}

/// Response of the channel listing call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelList {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_sparse_channel() {
        let channel: Channel =
            serde_json::from_str(r#"{"id": 7, "slug": "stones", "metadata": null}"#).unwrap();
        assert_eq!(channel.length(), 0);
        assert_eq!(channel.status(), "public");
        assert_eq!(channel.description(), "");
        assert_eq!(channel.title(), "");
    }

    #[test]
    fn test_listing_tolerates_null_title_and_length() {
        let list: ChannelList = serde_json::from_str(
            r#"{"channels": [
                {"id": 1, "title": null, "slug": "a", "length": null},
                {"id": 2, "title": "B", "slug": "b", "length": 4}
            ]}"#,
        )
        .unwrap();
        assert_eq!(list.channels.len(), 2);
        assert_eq!(list.channels[0].title(), "");
        assert_eq!(list.channels[0].length(), 0);
        assert_eq!(list.channels[1].title(), "B");
        assert_eq!(list.channels[1].length(), 4);
    }

    #[test]
    fn test_description_from_metadata() {
        let channel: Channel = serde_json::from_str(
            r#"{"id": 1, "title": "Stones", "slug": "stones", "length": 3,
                "status": "closed", "metadata": {"description": "rocks"}}"#,
        )
        .unwrap();
        assert_eq!(channel.description(), "rocks");
        assert_eq!(channel.status(), "closed");
    }
}
