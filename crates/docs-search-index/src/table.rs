//! The merged, read-only search table.

use indexmap::{map::Entry, IndexMap};
use tracing::{debug, warn};

use crate::{
    report::{LoadReport, RejectedShard, ShardSummary},
    types::{RawShard, SearchEntry, SearchResult, Shard, ShardId},
};

/// All shards merged into one logical table.
///
/// Keys keep the order in which they were first seen across shards. A key that
/// appears in several shards keeps its first position and accumulates the results of
/// every shard in load order.
#[derive(Debug, Clone, Default)]
pub struct SearchIndexTable {
    entries: IndexMap<String, Vec<SearchResult>>,
}

impl SearchIndexTable {
    /// Parses and merges `shards` in iteration order.
    ///
    /// A shard that fails to parse is skipped as a whole and listed in the report;
    /// the remaining shards are still merged.
    pub fn load<I>(shards: I) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = RawShard>,
    {
        let mut builder = TableBuilder::new();
        for raw in shards {
            builder.add_raw(raw);
        }
        builder.finish()
    }

    /// Merges already parsed shards.
    pub fn from_shards<I>(shards: I) -> Self
    where
        I: IntoIterator<Item = Shard>,
    {
        let mut table = Self::default();
        for shard in shards {
            table.merge(shard);
        }
        table
    }

    fn merge(&mut self, shard: Shard) {
        for SearchEntry { key, results } in shard.entries {
            match self.entries.entry(key) {
                Entry::Occupied(mut existing) => existing.get_mut().extend(results),
                Entry::Vacant(slot) => {
                    slot.insert(results);
                }
            }
        }
    }

    /// Results of every key starting with `query`, ignoring case.
    ///
    /// Keys are visited in table order and each key's results keep their recorded
    /// order. An empty query matches everything; no match yields an empty vector.
    pub fn lookup(&self, query: &str) -> Vec<&SearchResult> {
        self.lookup_entries(query)
            .flat_map(|(_, results)| results.iter())
            .collect()
    }

    /// Matching keys with their results, in table order.
    pub fn lookup_entries<'a>(
        &'a self,
        query: &str,
    ) -> impl Iterator<Item = (&'a str, &'a [SearchResult])> + 'a {
        let prefix = query.to_lowercase();
        self.entries
            .iter()
            .filter(move |(key, _)| key.starts_with(&prefix))
            .map(|(key, results)| (key.as_str(), results.as_slice()))
    }

    /// Results recorded for exactly `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&[SearchResult]> {
        self.entries
            .get(key.to_lowercase().as_str())
            .map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.entries
            .iter()
            .map(|(key, results)| (key.as_str(), results.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn result_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Accumulates shards and the report describing how each one fared.
#[derive(Debug)]
pub(crate) struct TableBuilder {
    table: SearchIndexTable,
    report: LoadReport,
}

impl TableBuilder {
    pub(crate) fn new() -> Self {
        Self {
            table: SearchIndexTable::default(),
            report: LoadReport::new(),
        }
    }

    pub(crate) fn add_raw(&mut self, raw: RawShard) {
        let id = raw.id.clone();
        match Shard::try_from(raw) {
            Ok(shard) => self.add_shard(shard),
            Err(error) => self.reject(id, error.to_string()),
        }
    }

    pub(crate) fn add_shard(&mut self, shard: Shard) {
        let summary = ShardSummary::from(&shard);
        debug!(
            target: "docs_search_index",
            shard = %summary.shard,
            entries = summary.entries,
            results = summary.results,
            "merged shard"
        );
        self.table.merge(shard);
        self.report.loaded.push(summary);
    }

    pub(crate) fn reject(&mut self, shard: ShardId, reason: String) {
        warn!(
            target: "docs_search_index",
            shard = %shard,
            reason = %reason,
            "rejecting shard"
        );
        self.report.rejected.push(RejectedShard { shard, reason });
    }

    pub(crate) fn finish(mut self) -> (SearchIndexTable, LoadReport) {
        self.report.key_count = self.table.len();
        self.report.result_count = self.table.result_count();
        (self.table, self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(stem: &str, body: &str) -> RawShard {
        RawShard::new(ShardId::from_stem(stem), format!("var searchData=\n[\n{body}\n];\n"))
    }

    fn draw_table() -> SearchIndexTable {
        let (table, report) = SearchIndexTable::load([raw(
            "all_3",
            "  ['draw',['Draw',['../classDynacoe_1_1Entity.html#a3d',1,'Dynacoe::Entity::Draw()'],\
             ['../classDynacoe_1_1Graphics.html#a7d',1,'Dynacoe::Graphics::Draw(Render2D &amp;)']]],\n\
             ['drawduration',['DrawDuration',['../classDynacoe_1_1Graphics.html#a6e',1,'Dynacoe::Graphics']]]",
        )]);
        assert!(report.is_complete());
        table
    }

    fn urls(results: &[&SearchResult]) -> Vec<String> {
        results.iter().map(|result| result.target_url.clone()).collect()
    }

    #[test]
    fn exact_and_prefix_lookup() {
        let table = draw_table();

        let exact = table.lookup("draw");
        assert_eq!(
            urls(&exact)[..2],
            [
                "../classDynacoe_1_1Entity.html#a3d".to_string(),
                "../classDynacoe_1_1Graphics.html#a7d".to_string()
            ]
        );
        assert_eq!(exact.len(), 3, "`draw` also prefixes `drawduration`");

        let prefix = table.lookup("dra");
        assert_eq!(urls(&prefix), urls(&exact));

        assert!(table.lookup("draws").is_empty());
    }

    #[test]
    fn lookup_ignores_case() {
        let table = draw_table();
        assert_eq!(urls(&table.lookup("DrawD")), vec!["../classDynacoe_1_1Graphics.html#a6e"]);
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let table = draw_table();
        let all = table.lookup("");
        assert_eq!(all.len(), table.result_count());
        assert_eq!(all[2].label, "DrawDuration");
    }

    #[test]
    fn unknown_prefix_is_empty() {
        assert!(draw_table().lookup("zzzznotfound").is_empty());
    }

    #[test]
    fn every_key_finds_itself() {
        let table = draw_table();
        for (key, _) in table.entries() {
            assert!(!table.lookup(key).is_empty(), "no results for {key}");
        }
    }

    #[test]
    fn duplicate_keys_merge_in_shard_order() {
        let (table, report) = SearchIndexTable::load([
            raw("all_3", "['define',['Define',['../classDynacoe_1_1AudioBlock.html#a69',1,'']]]"),
            raw("functions_3", "['define',['Define',['../classDynacoe_1_1Color.html#ae7',1,'']]]"),
        ]);

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.key_count, 1);
        assert_eq!(
            urls(&table.lookup("define")),
            vec![
                "../classDynacoe_1_1AudioBlock.html#a69",
                "../classDynacoe_1_1Color.html#ae7"
            ]
        );
    }

    #[test]
    fn merged_key_keeps_first_position() {
        let table = SearchIndexTable::load([
            raw("all_1", "['beta',['Beta',['b1',1,'']]],['alpha',['Alpha',['a1',1,'']]]"),
            raw("all_2", "['alpha',['Alpha',['a2',1,'']]],['apex',['Apex',['x',1,'']]]"),
        ])
        .0;

        let keys: Vec<&str> = table.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["beta", "alpha", "apex"]);
        assert_eq!(urls(&table.lookup("a")), vec!["a1", "a2", "x"]);
    }

    #[test]
    fn malformed_shard_is_rejected_alone() {
        let (table, report) = SearchIndexTable::load([
            raw("all_1", "['clear',['Clear',['../a.html',1,'']]]"),
            raw("all_2", "['broken',['Broken']]"),
            raw("all_3", "['clock',['Clock',['../b.html',1,'']]]"),
        ]);

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].shard, ShardId::new("all", 2));
        assert!(table.get("broken").is_none());
        assert_eq!(table.lookup("c").len(), 2);
    }

    #[test]
    fn runaway_nesting_is_rejected_alone() {
        let deep = RawShard::new(
            ShardId::new("all", 2),
            format!("var searchData={}", "[".repeat(100_000)),
        );
        let (table, report) = SearchIndexTable::load([
            raw("all_1", "['clear',['Clear',['../a.html',1,'']]]"),
            deep,
            raw("all_3", "['clock',['Clock',['../b.html',1,'']]]"),
        ]);

        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].shard, ShardId::new("all", 2));
        assert!(report.rejected[0].reason.contains("nested deeper"));
        assert_eq!(table.lookup("cl").len(), 2);
    }

    #[test]
    fn get_matches_exact_key_only() {
        let table = draw_table();
        assert_eq!(table.get("DRAW").map(<[SearchResult]>::len), Some(2));
        assert!(table.get("dra").is_none());
    }

    #[test]
    fn from_shards_merges_parsed_input() {
        let shard = Shard {
            id: ShardId::new("classes", 0),
            entries: vec![SearchEntry {
                key: "camera".to_string(),
                results: vec![SearchResult::new("Camera", "../classDynacoe_1_1Camera.html")
                    .with_scope("Dynacoe")],
            }],
        };
        let table = SearchIndexTable::from_shards([shard]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("cam")[0].display_name(), "Dynacoe");
    }
}
