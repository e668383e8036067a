//! Documentation search via pre-built index files
//!
//! Design: each lookup (one base × one index path) produces a
//! [`LookupOutcome`]. The loop visits bases outer, index paths inner, and
//! returns the first non-empty result. `sitemap.xml` is only consulted
//! after every index lookup across every base came back empty.

mod candidates;
mod mkdocs;
mod sitemap;
mod sphinx;

pub use candidates::candidate_bases;

use crate::error::DocsError;
use crate::http::{FetchHeaders, TextFetcher, UserAgentSource};
use crate::normalize::parse_base;
use crate::types::{DocsetType, SearchResult};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Why an index body could not be read
#[derive(Debug, Error)]
pub(crate) enum IndexParseError {
    #[error("invalid index JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no embedded search index found")]
    MissingIndex,
}

/// On-disk format of a search index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexFormat {
    /// `{docs: [{title, text, location}]}`
    Json,
    /// `Search.setIndex({...})`
    Js,
}

impl IndexFormat {
    fn for_path(path: &str) -> Self {
        if path.ends_with(".js") {
            IndexFormat::Js
        } else {
            IndexFormat::Json
        }
    }

    fn allowed_by(&self, hint: Option<DocsetType>) -> bool {
        match hint {
            Some(DocsetType::Mkdocs) => *self == IndexFormat::Json,
            Some(DocsetType::Sphinx) => *self == IndexFormat::Js,
            _ => true,
        }
    }
}

/// Index locations relative to a candidate base, in lookup order
const INDEX_CANDIDATES: &[&str] = &[
    "search/search_index.json",
    "searchindex.json",
    "search.json",
    "search-index.json",
    "searchindex.js",
];

const SITEMAP_PATH: &str = "sitemap.xml";

/// Result of one lookup
#[derive(Debug)]
enum LookupOutcome {
    /// Parsed and at least one entry matched
    Found(Vec<SearchResult>),
    /// Parsed, nothing matched
    NoMatch,
    /// Fetch or parse failed
    Unavailable,
}

/// Searches documentation sites through their published indexes
#[derive(Clone)]
pub struct DocsetSearcher {
    fetcher: Arc<dyn TextFetcher>,
    user_agents: Arc<dyn UserAgentSource>,
}

impl DocsetSearcher {
    pub fn new(fetcher: Arc<dyn TextFetcher>, user_agents: Arc<dyn UserAgentSource>) -> Self {
        Self {
            fetcher,
            user_agents,
        }
    }

    /// Search the documentation site containing `base_url`
    ///
    /// A blank query returns an empty list without touching the network.
    /// Lookup failures are never reported; exhausting every candidate also
    /// yields an empty list. Only an unusable base URL is an error.
    pub async fn search_documents(
        &self,
        base_url: &str,
        query: &str,
        docset_type: Option<DocsetType>,
    ) -> Result<Vec<SearchResult>, DocsError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let page = parse_base(base_url)?;
        let bases = candidate_bases(&page);
        debug!(base_url, bases = bases.len(), "Searching documentation");

        for base in &bases {
            for path in INDEX_CANDIDATES {
                let format = IndexFormat::for_path(path);
                if !format.allowed_by(docset_type) {
                    continue;
                }
                if let LookupOutcome::Found(results) = self.lookup_index(base, path, format, &query).await {
                    info!(index = %join_or_base(base, path), results = results.len(), "Search index matched");
                    return Ok(results);
                }
            }
        }

        for base in &bases {
            if let LookupOutcome::Found(results) = self.lookup_sitemap(base, &query).await {
                info!(base = %base, results = results.len(), "Sitemap matched");
                return Ok(results);
            }
        }

        debug!(base_url, "No search results");
        Ok(Vec::new())
    }

    async fn lookup_index(&self, base: &Url, path: &str, format: IndexFormat, query: &str) -> LookupOutcome {
        let url = join_or_base(base, path);
        let headers = FetchHeaders::index(self.user_agents.user_agent());
        let body = match self.fetcher.fetch_text(url.as_str(), &headers).await {
            Ok(body) => body,
            Err(err) => {
                debug!(url = %url, error = %err, "Index lookup failed");
                return LookupOutcome::Unavailable;
            }
        };

        let parsed = match format {
            IndexFormat::Json => mkdocs::parse(&body, base, query),
            IndexFormat::Js => sphinx::parse(&body, base, query),
        };
        match parsed {
            Ok(results) => outcome(results),
            Err(err) => {
                debug!(url = %url, error = %err, "Index unreadable");
                LookupOutcome::Unavailable
            }
        }
    }

    async fn lookup_sitemap(&self, base: &Url, query: &str) -> LookupOutcome {
        let url = join_or_base(base, SITEMAP_PATH);
        let headers = FetchHeaders::sitemap(self.user_agents.user_agent());
        match self.fetcher.fetch_text(url.as_str(), &headers).await {
            Ok(body) => outcome(sitemap::parse(&body, query)),
            Err(err) => {
                debug!(url = %url, error = %err, "Sitemap lookup failed");
                LookupOutcome::Unavailable
            }
        }
    }
}

fn join_or_base(base: &Url, path: &str) -> Url {
    base.join(path).unwrap_or_else(|_| base.clone())
}

/// Drop repeated URLs, keeping the first
fn dedupe_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}

fn outcome(results: Vec<SearchResult>) -> LookupOutcome {
    let results = dedupe_by_url(results);
    if results.is_empty() {
        LookupOutcome::NoMatch
    } else {
        LookupOutcome::Found(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MapFetcher;
    use crate::http::{StaticUserAgent, ACCEPT_INDEX, ACCEPT_XML};

    fn searcher(fetcher: Arc<MapFetcher>) -> DocsetSearcher {
        DocsetSearcher::new(fetcher, Arc::new(StaticUserAgent::new("TestAgent/1.0")))
    }

    const MKDOCS_INDEX: &str = r#"{"docs": [
        {"location": "install/", "title": "Install", "text": "How to install."},
        {"location": "usage/", "title": "Usage", "text": "Using it."}
    ]}"#;

    #[tokio::test]
    async fn test_blank_query_no_network() {
        let fetcher = Arc::new(MapFetcher::new());
        let results = searcher(fetcher.clone())
            .search_documents("https://docs.example.com", "   ", None)
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(fetcher.requested().is_empty());

        // Blank query wins even over a bad base
        let results = searcher(fetcher.clone()).search_documents("", "", None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_base_is_error() {
        let fetcher = Arc::new(MapFetcher::new());
        let err = searcher(fetcher).search_documents("  ", "install", None).await.unwrap_err();
        assert!(matches!(err, DocsError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_mkdocs_index_found() {
        let fetcher = Arc::new(
            MapFetcher::new().with("https://docs.example.com/search/search_index.json", MKDOCS_INDEX),
        );
        let results = searcher(fetcher.clone())
            .search_documents("https://docs.example.com/", "Install", None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Install");
        assert_eq!(results[0].url, "https://docs.example.com/install/");
        assert_eq!(fetcher.requested().len(), 1);
        assert_eq!(fetcher.headers()[0].accept, ACCEPT_INDEX);
    }

    #[tokio::test]
    async fn test_lookup_order_bases_outer_paths_inner() {
        let fetcher = Arc::new(MapFetcher::new());
        let results = searcher(fetcher.clone())
            .search_documents("https://docs.example.com/en/stable/reference/foo/", "foo", None)
            .await
            .unwrap();
        assert!(results.is_empty());

        let requested = fetcher.requested();
        let expected_prefix: Vec<String> = INDEX_CANDIDATES
            .iter()
            .map(|p| format!("https://docs.example.com/en/stable/{}", p))
            .collect();
        assert_eq!(&requested[..INDEX_CANDIDATES.len()], expected_prefix.as_slice());
        assert!(requested.contains(&"https://docs.example.com/en/stable/searchindex.js".to_string()));

        // 4 bases × 5 index paths, then 4 sitemaps
        assert_eq!(requested.len(), 4 * 5 + 4);
        assert!(requested[..20].iter().all(|u| !u.ends_with("sitemap.xml")));
        assert_eq!(requested[20], "https://docs.example.com/en/stable/sitemap.xml");
        assert_eq!(requested[23], "https://docs.example.com/sitemap.xml");
    }

    #[tokio::test]
    async fn test_sphinx_hint_only_fetches_js() {
        let index = r#"Search.setIndex({"docnames": ["api/foo"], "filenames": ["api/foo.html"],
            "titles": ["Foo API"], "terms": {"foo": 0}})"#;
        let fetcher = Arc::new(
            MapFetcher::new().with("https://docs.example.com/en/stable/searchindex.js", index),
        );
        let results = searcher(fetcher.clone())
            .search_documents(
                "https://docs.example.com/en/stable/reference/foo/",
                "foo",
                Some(DocsetType::Sphinx),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://docs.example.com/en/stable/api/foo.html");
        assert_eq!(
            fetcher.requested(),
            vec!["https://docs.example.com/en/stable/searchindex.js"]
        );
    }

    #[tokio::test]
    async fn test_mkdocs_hint_skips_js() {
        let fetcher = Arc::new(MapFetcher::new());
        searcher(fetcher.clone())
            .search_documents("https://docs.example.com/", "x", Some(DocsetType::Mkdocs))
            .await
            .unwrap();
        let requested = fetcher.requested();
        assert!(requested.iter().all(|u| !u.ends_with(".js")));
        assert_eq!(requested.len(), 4 + 1);
    }

    #[tokio::test]
    async fn test_non_matching_index_keeps_probing() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .with("https://docs.example.com/guide/search/search_index.json", MKDOCS_INDEX)
                .with("https://docs.example.com/searchindex.json", "not json")
                .with(
                    "https://docs.example.com/search.json",
                    r#"{"docs": [{"location": "usage/", "title": "Usage", "text": "run it"}]}"#,
                ),
        );
        let results = searcher(fetcher.clone())
            .search_documents("https://docs.example.com/guide/", "run", None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://docs.example.com/usage/");
        assert_eq!(
            fetcher.requested().last().unwrap(),
            "https://docs.example.com/search.json"
        );
    }

    #[tokio::test]
    async fn test_sitemap_fallback() {
        let sitemap = r#"<urlset>
            <url><loc>https://docs.example.com/guide/install/</loc></url>
            <url><loc>https://docs.example.com/guide/install/</loc></url>
            <url><loc>https://docs.example.com/guide/usage/</loc></url>
        </urlset>"#;
        let fetcher = Arc::new(MapFetcher::new().with("https://docs.example.com/sitemap.xml", sitemap));
        let results = searcher(fetcher.clone())
            .search_documents("https://docs.example.com/guide/", "install", None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "install");
        assert_eq!(results[0].source, "sitemap");
        assert_eq!(fetcher.headers().last().unwrap().accept, ACCEPT_XML);
    }
}
