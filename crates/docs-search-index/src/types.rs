use std::fmt;

use serde::{Deserialize, Serialize};

/// A single link produced by the documentation generator for a search key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display name shown in the dropdown.
    pub label: String,
    /// Link relative to the generator's `search/` directory.
    pub target_url: String,
    /// Containing scope, or the full signature when several overloads share a label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_scope: Option<String>,
    /// Whether the link opens in the parent frame rather than the search frame.
    #[serde(default)]
    pub open_in_parent: bool,
}

impl SearchResult {
    pub fn new(label: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target_url: target_url.into(),
            parent_scope: None,
            open_in_parent: true,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.parent_scope = if scope.is_empty() { None } else { Some(scope) };
        self
    }

    /// Scope when present, label otherwise.
    pub fn display_name(&self) -> &str {
        self.parent_scope.as_deref().unwrap_or(&self.label)
    }
}

/// One searchable key and the links recorded for it, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub key: String,
    pub results: Vec<SearchResult>,
}

/// Identifies a shard by the generator's `<category>_<ordinal>` file naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardId {
    pub category: String,
    pub ordinal: Option<u32>,
}

impl ShardId {
    pub fn new(category: impl Into<String>, ordinal: u32) -> Self {
        Self {
            category: category.into(),
            ordinal: Some(ordinal),
        }
    }

    /// Derives an id from a file stem such as `functions_3`.
    ///
    /// Stems without a numeric suffix keep the whole stem as their category.
    pub fn from_stem(stem: &str) -> Self {
        if let Some((category, ordinal)) = stem.rsplit_once('_') {
            if let Ok(ordinal) = ordinal.parse::<u32>() {
                return Self {
                    category: category.to_string(),
                    ordinal: Some(ordinal),
                };
            }
        }
        Self {
            category: stem.to_string(),
            ordinal: None,
        }
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordinal {
            Some(ordinal) => write!(f, "{}_{}", self.category, ordinal),
            None => f.write_str(&self.category),
        }
    }
}

/// Parsed contents of a single shard, still in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub id: ShardId,
    pub entries: Vec<SearchEntry>,
}

impl Shard {
    pub fn result_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.results.len()).sum()
    }
}

/// Unparsed shard text as handed over by a [`crate::source::ShardSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawShard {
    pub id: ShardId,
    pub contents: String,
}

impl RawShard {
    pub fn new(id: ShardId, contents: impl Into<String>) -> Self {
        Self {
            id,
            contents: contents.into(),
        }
    }
}
