pub mod directory;

pub use directory::DirectorySource;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    report::LoadReport,
    table::{SearchIndexTable, TableBuilder},
    types::{RawShard, ShardId},
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("shard directory {path:?} is not accessible: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A shard whose text could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableShard {
    pub id: ShardId,
    pub reason: String,
}

pub type ShardRead = Result<RawShard, UnreadableShard>;

/// Where shard text comes from.
///
/// Implementations return shards in the order they must be merged.
#[async_trait]
pub trait ShardSource: Send + Sync {
    /// Human-readable origin used in logs.
    fn describe(&self) -> String;

    async fn read_shards(&self) -> Result<Vec<ShardRead>, SourceError>;
}

/// Shards held in memory.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    shards: Vec<RawShard>,
}

impl InlineSource {
    pub fn new(shards: Vec<RawShard>) -> Self {
        Self { shards }
    }

    #[must_use]
    pub fn with_shard(mut self, stem: &str, contents: impl Into<String>) -> Self {
        self.shards
            .push(RawShard::new(ShardId::from_stem(stem), contents));
        self
    }
}

#[async_trait]
impl ShardSource for InlineSource {
    fn describe(&self) -> String {
        format!("{} inline shard(s)", self.shards.len())
    }

    async fn read_shards(&self) -> Result<Vec<ShardRead>, SourceError> {
        Ok(self.shards.iter().cloned().map(Ok).collect())
    }
}

/// Reads every shard from `source` and merges them into one table.
///
/// Unreadable or malformed shards are rejected individually; only a failure of the
/// source as a whole is returned as an error.
#[instrument(name = "docs_search_index.load_from", skip(source), fields(source = %source.describe()))]
pub async fn load_from<S>(source: &S) -> Result<(SearchIndexTable, LoadReport), SourceError>
where
    S: ShardSource + ?Sized,
{
    let reads = source.read_shards().await?;

    let mut builder = TableBuilder::new();
    for read in reads {
        match read {
            Ok(raw) => builder.add_raw(raw),
            Err(UnreadableShard { id, reason }) => builder.reject(id, reason),
        }
    }
    let (table, report) = builder.finish();

    info!(
        target: "docs_search_index",
        loaded = report.loaded.len(),
        rejected = report.rejected.len(),
        keys = report.key_count,
        results = report.result_count,
        "search table loaded"
    );
    Ok((table, report))
}
