//! Loading and querying of generated documentation search shards.
//!
//! The generator splits its search data into many small script files. This crate
//! parses them, merges them into one [`SearchIndexTable`] and answers
//! case-insensitive prefix lookups over it.

pub mod entities;
pub mod report;
pub mod shard;
pub mod source;
pub mod table;
pub mod types;

pub use report::{LoadReport, RejectedShard, ShardSummary};
pub use shard::{parse_shard, ShardError};
pub use source::{load_from, DirectorySource, InlineSource, ShardSource, SourceError};
pub use table::SearchIndexTable;
pub use types::{RawShard, SearchEntry, SearchResult, Shard, ShardId};
