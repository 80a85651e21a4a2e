// src/pipeline/tags.rs

//! Heuristic auto-tagging of block nodes.
//!
//! Four strategies run independently and are merged by tag key:
//!
//! - `artist:<slug>` from "Artist, Work" style titles seen on 2+ blocks
//! - `medium:<word>` and `theme:<word>` from whole-word keyword matches
//! - `source:<slug>` for domains that contributed enough blocks

use std::collections::HashMap;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::Result;
use crate::models::{BlockNode, TagStats, TaggingConfig};
use crate::utils::slugify;

/// Tag key → block node ids, in emission order.
pub type TagIndex = IndexMap<String, Vec<String>>;

/// Output of a tagging pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    /// Tag key → block ids
    pub index: TagIndex,
    /// Block id → tag keys, in merge order
    pub by_block: HashMap<String, Vec<String>>,
    pub stats: TagStats,
}

/// A compiled keyword vocabulary under one namespace.
struct Vocabulary {
    namespace: &'static str,
    patterns: Vec<(String, Regex)>,
}

impl Vocabulary {
    fn compile(namespace: &'static str, words: &[String]) -> Result<Self> {
        let patterns = words
            .iter()
            .map(|word| -> Result<(String, Regex)> {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
                Ok((word.to_lowercase(), Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            namespace,
            patterns,
        })
    }

    fn tag(&self, blocks: &[BlockNode]) -> TagIndex {
        let mut index = TagIndex::new();
        for block in blocks {
            let text = format!("{} {}", block.label, block.description);
            if text.trim().is_empty() {
                continue;
            }
            for (word, pattern) in &self.patterns {
                if pattern.is_match(&text) {
                    index
                        .entry(format!("{}:{}", self.namespace, word))
                        .or_default()
                        .push(block.id.clone());
                }
            }
        }
        index
    }
}

/// Precompiled tagging strategies.
pub struct AutoTagger {
    config: TaggingConfig,
    /// `None` when no extensions are configured
    filename: Option<Regex>,
    medium: Vocabulary,
    theme: Vocabulary,
}

impl AutoTagger {
    /// Compile vocabularies and the filename pattern.
    pub fn new(config: &TaggingConfig) -> Result<Self> {
        let extensions: Vec<String> = config
            .media_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();
        let filename = if extensions.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)\.(?:{})$", extensions.join("|")))?)
        };

        Ok(Self {
            config: config.clone(),
            filename,
            medium: Vocabulary::compile("medium", &config.medium_keywords)?,
            theme: Vocabulary::compile("theme", &config.theme_keywords)?,
        })
    }

    /// Tag `blocks`; `domain_counts` decides which sources qualify.
    pub fn tag(&self, blocks: &[BlockNode], domain_counts: &IndexMap<String, usize>) -> TagSet {
        let mut index = self.artist_tags(blocks);
        for strategy in [
            self.medium.tag(blocks),
            self.theme.tag(blocks),
            self.source_tags(blocks, domain_counts),
        ] {
            index.extend(strategy);
        }

        let mut by_block: HashMap<String, Vec<String>> = HashMap::new();
        for (tag, ids) in &index {
            for id in ids {
                by_block.entry(id.clone()).or_default().push(tag.clone());
            }
        }

        let stats = TagStats {
            total_tagged: by_block.len(),
            total_tags: by_block.values().map(Vec::len).sum(),
            unique_tags: index.len(),
        };
        log::info!(
            "Auto-tagging: {} unique tags, {} blocks tagged, {} assignments",
            stats.unique_tags,
            stats.total_tagged,
            stats.total_tags
        );

        TagSet {
            index,
            by_block,
            stats,
        }
    }

    /// Candidate artist name of a title, if any.
    ///
    /// The first separator with a plausible left-hand side decides; an
    /// implausible one falls through to the next separator.
    pub fn artist_candidate(&self, label: &str) -> Option<String> {
        let is_filename = self.filename.as_ref().is_some_and(|re| re.is_match(label));
        if label.is_empty() || label == self.config.untitled_label || is_filename {
            return None;
        }

        for sep in &self.config.artist_separators {
            let Some((head, _)) = label.split_once(sep.as_str()) else {
                continue;
            };
            let name = head.trim();
            let len = name.chars().count();
            if len < self.config.artist_min_len || len > self.config.artist_max_len {
                continue;
            }
            if !name.chars().any(char::is_alphabetic) {
                continue;
            }
            let slug = slugify(name);
            return (!slug.is_empty()).then_some(slug);
        }
        None
    }

    /// Pass 1 collects candidates per block, pass 2 keeps the ones shared
    /// by enough blocks.
    fn artist_tags(&self, blocks: &[BlockNode]) -> TagIndex {
        let mut candidates: IndexMap<String, Vec<String>> = IndexMap::new();
        for block in blocks {
            if let Some(slug) = self.artist_candidate(&block.label) {
                candidates.entry(slug).or_default().push(block.id.clone());
            }
        }

        candidates
            .into_iter()
            .filter(|(_, ids)| ids.len() >= self.config.artist_min_blocks)
            .map(|(slug, ids)| (format!("artist:{slug}"), ids))
            .collect()
    }

    fn source_tags(&self, blocks: &[BlockNode], domain_counts: &IndexMap<String, usize>) -> TagIndex {
        let mut by_domain: IndexMap<&str, Vec<String>> = IndexMap::new();
        for block in blocks {
            let Some(domain) = block.domain.as_deref() else {
                continue;
            };
            if domain_counts.get(domain).copied().unwrap_or(0) >= self.config.source_min_blocks {
                by_domain.entry(domain).or_default().push(block.id.clone());
            }
        }

        let mut index = TagIndex::new();
        for (domain, ids) in by_domain {
            let slug = source_slug(domain);
            if slug.is_empty() {
                continue;
            }
            index.entry(format!("source:{slug}")).or_default().extend(ids);
        }
        index
    }
}

/// `www.youtube.com` → `youtube`.
pub fn source_slug(domain: &str) -> String {
    let host = domain.strip_prefix("www.").unwrap_or(domain);
    let first = host.split('.').next().unwrap_or(host);
    slugify(first)
}
