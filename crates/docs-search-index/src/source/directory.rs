use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{ShardRead, ShardSource, SourceError, UnreadableShard};
use crate::types::{RawShard, ShardId};

const SHARD_EXTENSION: &str = "js";

/// Scripts the generator writes next to the shards that hold no search data.
const HELPER_SCRIPTS: &[&str] = &["search", "searchdata", "nomatches"];

/// Reads the shards of a generated `search/` directory.
///
/// Files are merged in file-name order so repeated loads agree on key order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn shard_paths(&self) -> Result<Vec<(ShardId, PathBuf)>, SourceError> {
        let directory_error = |source| SourceError::Directory {
            path: self.root.clone(),
            source,
        };

        let mut listing = fs::read_dir(&self.root).await.map_err(directory_error)?;
        let mut paths = Vec::new();
        while let Some(item) = listing.next_entry().await.map_err(directory_error)? {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SHARD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if HELPER_SCRIPTS.contains(&stem) {
                debug!(target: "docs_search_index", file = ?path, "skipping helper script");
                continue;
            }
            paths.push((ShardId::from_stem(stem), path));
        }

        paths.sort_by(|(_, left), (_, right)| left.file_name().cmp(&right.file_name()));
        Ok(paths)
    }
}

#[async_trait]
impl ShardSource for DirectorySource {
    fn describe(&self) -> String {
        self.root().display().to_string()
    }

    async fn read_shards(&self) -> Result<Vec<ShardRead>, SourceError> {
        let mut reads = Vec::new();
        for (id, path) in self.shard_paths().await? {
            let read = match fs::read_to_string(&path).await {
                Ok(contents) => {
                    debug!(target: "docs_search_index", file = ?path, bytes = contents.len(), "read shard");
                    Ok(RawShard::new(id, contents))
                }
                Err(error) => Err(UnreadableShard {
                    id,
                    reason: format!("failed to read {}: {error}", path.display()),
                }),
            };
            reads.push(read);
        }
        Ok(reads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn lists_shards_in_name_order() {
        let dir = tempdir().expect("tempdir");
        for name in ["functions_2.js", "all_3.js", "search.js", "notes.txt", "classes_0.js"] {
            std::fs::write(dir.path().join(name), "var searchData=[];").expect("write fixture");
        }

        let source = DirectorySource::new(dir.path());
        let reads = source.read_shards().await.expect("directory readable");
        let ids: Vec<String> = reads
            .into_iter()
            .map(|read| read.expect("readable").id.to_string())
            .collect();

        assert_eq!(ids, vec!["all_3", "classes_0", "functions_2"]);
    }

    #[test]
    fn describes_itself_by_root() {
        let source = DirectorySource::new("/srv/docs/html/search");
        assert_eq!(source.root(), Path::new("/srv/docs/html/search"));
        assert_eq!(source.describe(), "/srv/docs/html/search");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let source = DirectorySource::new(dir.path().join("absent"));
        let error = source.read_shards().await.expect_err("missing directory");
        assert!(matches!(error, SourceError::Directory { .. }));
    }

    #[tokio::test]
    async fn non_utf8_shard_is_unreadable() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("all_0.js"), [0xff, 0xfe, 0x00]).expect("write fixture");

        let reads = DirectorySource::new(dir.path())
            .read_shards()
            .await
            .expect("directory readable");
        let unreadable = reads[0].clone().expect_err("invalid utf-8");
        assert_eq!(unreadable.id, ShardId::new("all", 0));
    }
}
