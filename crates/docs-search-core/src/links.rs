use docs_search_index::SearchResult;
use serde::Serialize;
use url::Url;

/// A search result ready for display, with its link made absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedHit {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub url: String,
    pub open_in_parent: bool,
}

/// Resolves generator links against the `search/` directory of a site.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base: Url,
}

impl LinkResolver {
    pub fn new(search_base: Url) -> Self {
        Self { base: search_base }
    }

    /// Absolute form of `target`, or `target` unchanged when it cannot be joined.
    pub fn resolve(&self, target: &str) -> String {
        self.base
            .join(target)
            .map_or_else(|_| target.to_string(), String::from)
    }

    pub fn hit(&self, result: &SearchResult) -> ResolvedHit {
        ResolvedHit {
            label: result.label.clone(),
            scope: result.parent_scope.clone(),
            url: self.resolve(&result.target_url),
            open_in_parent: result.open_in_parent,
        }
    }
}
