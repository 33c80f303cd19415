use std::sync::Arc;

use docs_search_index::{LoadReport, SearchIndexTable};
use serde::Serialize;

use crate::{
    config::{ConfigError, ViewerConfig},
    links::{LinkResolver, ResolvedHit},
};

/// One answered query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub query: String,
    /// Matches before the display cap was applied.
    pub total: usize,
    pub hits: Vec<ResolvedHit>,
}

impl SearchPage {
    pub fn truncated(&self) -> bool {
        self.hits.len() < self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    pub key: String,
    pub results: usize,
}

/// A loaded table plus what is needed to present its results.
///
/// Cheap to clone; the table is shared and never mutated.
#[derive(Debug, Clone)]
pub struct SearchSession {
    config: Arc<ViewerConfig>,
    table: Arc<SearchIndexTable>,
    report: Arc<LoadReport>,
    resolver: LinkResolver,
}

impl SearchSession {
    pub fn new(
        config: ViewerConfig,
        table: SearchIndexTable,
        report: LoadReport,
    ) -> Result<Self, ConfigError> {
        let resolver = LinkResolver::new(config.search_base()?);
        Ok(Self {
            config: Arc::new(config),
            table: Arc::new(table),
            report: Arc::new(report),
            resolver,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn table(&self) -> &SearchIndexTable {
        &self.table
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Runs `query` with the configured display cap.
    pub fn search(&self, query: &str) -> SearchPage {
        self.search_with_limit(query, self.config.max_results)
    }

    /// Runs `query`, keeping at most `limit` hits (0 keeps all).
    pub fn search_with_limit(&self, query: &str, limit: usize) -> SearchPage {
        let results = self.table.lookup(query);
        let total = results.len();
        let keep = if limit == 0 { total } else { limit.min(total) };
        let hits = results
            .into_iter()
            .take(keep)
            .map(|result| self.resolver.hit(result))
            .collect();

        SearchPage {
            query: query.to_string(),
            total,
            hits,
        }
    }

    /// Keys starting with `prefix`, in table order.
    pub fn keys(&self, prefix: &str) -> Vec<KeySummary> {
        self.table
            .lookup_entries(prefix)
            .map(|(key, results)| KeySummary {
                key: key.to_string(),
                results: results.len(),
            })
            .collect()
    }
}
