//! One-shot entry points for DocsKit
//!
//! Each call builds a fresh [`Tool`] over the default HTTP fetcher. For
//! repeated calls, or a custom fetcher, build a [`Tool`] once and reuse it.

use crate::error::DocsError;
use crate::http::FetchOptions;
use crate::tool::Tool;
use crate::types::{DocsetType, DocumentationRequest, ResolvedDocument, SearchRequest, SearchResult};

fn tool_with_options(options: FetchOptions) -> Result<Tool, DocsError> {
    Tool::builder().options(options).build()
}

/// Resolve a documentation page to Markdown
///
/// Uses default transport options. For custom options, use
/// [`resolve_document_with_options`].
pub async fn resolve_document(req: DocumentationRequest) -> Result<ResolvedDocument, DocsError> {
    resolve_document_with_options(req, FetchOptions::default()).await
}

/// Resolve a documentation page with custom transport options
pub async fn resolve_document_with_options(
    req: DocumentationRequest,
    options: FetchOptions,
) -> Result<ResolvedDocument, DocsError> {
    tool_with_options(options)?.resolve(req).await
}

/// Search the documentation site containing `base_url`
///
/// Returns an empty list for a blank query or when no index or sitemap
/// entry matches.
pub async fn search_documents(
    base_url: &str,
    query: &str,
    docset_type: Option<DocsetType>,
) -> Result<Vec<SearchResult>, DocsError> {
    search_documents_with_options(base_url, query, docset_type, FetchOptions::default()).await
}

/// Search with custom transport options
pub async fn search_documents_with_options(
    base_url: &str,
    query: &str,
    docset_type: Option<DocsetType>,
    options: FetchOptions,
) -> Result<Vec<SearchResult>, DocsError> {
    let req = SearchRequest {
        base_url: base_url.to_string(),
        query: query.to_string(),
        docset_type,
    };
    tool_with_options(options)?.search(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_empty_base() {
        let result = resolve_document(DocumentationRequest::new("")).await;
        assert!(matches!(result, Err(DocsError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_resolve_invalid_scheme() {
        let result = resolve_document(DocumentationRequest::new("ftp://example.com")).await;
        assert!(matches!(result, Err(DocsError::InvalidUrlScheme)));
    }

    #[tokio::test]
    async fn test_resolve_blocked_prefix() {
        let options = FetchOptions {
            block_prefixes: vec!["https://blocked.example".to_string()],
            ..Default::default()
        };
        let result = resolve_document_with_options(
            DocumentationRequest::new("https://blocked.example/docs/"),
            options,
        )
        .await;
        assert!(matches!(result, Err(DocsError::BlockedUrl)));
    }

    #[tokio::test]
    async fn test_search_blank_query() {
        let results = search_documents("https://docs.example.com", " ", None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert!(options.allow_prefixes.is_empty());
        assert!(options.block_prefixes.is_empty());
        assert!(!options.min_request_interval.is_zero());
    }
}
