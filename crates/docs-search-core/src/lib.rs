use anyhow::{Context, Result};
use docs_search_index::{load_from, DirectorySource, ShardSource};
use tracing::{debug, info, warn};

pub mod config;
pub mod interactive;
pub mod links;
pub mod markdown;
pub mod session;

pub use crate::config::{ConfigError, ViewerConfig};
pub use links::{LinkResolver, ResolvedHit};
pub use session::{KeySummary, SearchPage, SearchSession};

/// Loads the shards named by `config` and opens a viewing session over them.
pub async fn bootstrap(config: ViewerConfig) -> Result<SearchSession> {
    let source = DirectorySource::new(config.shard_dir.clone());
    bootstrap_from(config, &source).await
}

/// Same as [`bootstrap`] with an explicit shard source.
pub async fn bootstrap_from<S>(config: ViewerConfig, source: &S) -> Result<SearchSession>
where
    S: ShardSource + ?Sized,
{
    config.validate()?;
    debug!(
        target: "docs_search_core",
        source = %source.describe(),
        site_root = %config.site_root,
        "loading search shards"
    );

    let (table, report) = load_from(source)
        .await
        .with_context(|| format!("failed to load search shards from {}", source.describe()))?;

    for rejected in &report.rejected {
        warn!(
            target: "docs_search_core",
            shard = %rejected.shard,
            reason = %rejected.reason,
            "shard excluded from this session"
        );
    }
    info!(
        target: "docs_search_core",
        shards = report.loaded.len(),
        keys = report.key_count,
        results = report.result_count,
        loaded_at = %report.loaded_at,
        "search session ready"
    );

    Ok(SearchSession::new(config, table, report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docs_search_index::InlineSource;
    use tempfile::tempdir;

    #[tokio::test]
    async fn bootstrap_reads_configured_directory() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("all_0.js"),
            "var searchData=[['camera',['Camera',['../classDynacoe_1_1Camera.html',1,'Dynacoe']]]];",
        )
        .expect("write shard");

        let config = ViewerConfig {
            shard_dir: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let session = bootstrap(config).await.expect("bootstrap succeeds");
        assert_eq!(session.table().len(), 1);
        assert_eq!(session.search("CAM").total, 1);
    }

    #[tokio::test]
    async fn bootstrap_fails_without_directory() {
        let dir = tempdir().expect("tempdir");
        let config = ViewerConfig {
            shard_dir: dir.path().join("missing"),
            ..ViewerConfig::default()
        };
        assert!(bootstrap(config).await.is_err());
    }

    #[tokio::test]
    async fn bootstrap_rejects_invalid_site_root() {
        let config = ViewerConfig {
            site_root: "not a url".to_string(),
            ..ViewerConfig::default()
        };
        let result = bootstrap_from(config, &InlineSource::default()).await;
        assert!(result.is_err());
    }
}
