use serde::Serialize;
use time::OffsetDateTime;

use crate::types::{Shard, ShardId};

/// Outcome of merging a set of shards into one table.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    #[serde(with = "time::serde::rfc3339")]
    pub loaded_at: OffsetDateTime,
    /// Shards merged into the table, in load order.
    pub loaded: Vec<ShardSummary>,
    /// Shards rejected as a unit, in load order.
    pub rejected: Vec<RejectedShard>,
    /// Distinct keys in the merged table.
    pub key_count: usize,
    /// Results across all keys in the merged table.
    pub result_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardSummary {
    pub shard: ShardId,
    pub entries: usize,
    pub results: usize,
}

impl From<&Shard> for ShardSummary {
    fn from(shard: &Shard) -> Self {
        Self {
            shard: shard.id.clone(),
            entries: shard.entries.len(),
            results: shard.result_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedShard {
    pub shard: ShardId,
    pub reason: String,
}

impl LoadReport {
    pub(crate) fn new() -> Self {
        Self {
            loaded_at: OffsetDateTime::now_utc(),
            loaded: Vec::new(),
            rejected: Vec::new(),
            key_count: 0,
            result_count: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn shard_count(&self) -> usize {
        self.loaded.len() + self.rejected.len()
    }
}
