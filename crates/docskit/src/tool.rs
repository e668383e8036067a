//! Tool builder and contract for DocsKit

use crate::error::DocsError;
use crate::http::{
    FetchOptions, HttpFetcher, RotatingUserAgent, StaticUserAgent, TextFetcher, UserAgentSource,
};
use crate::resolve::DocsetResolver;
use crate::search::DocsetSearcher;
use crate::types::{DocumentationRequest, ResolvedDocument, SearchRequest, SearchResult};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring the DocsKit tool
#[derive(Clone, Default)]
pub struct ToolBuilder {
    /// User-Agents, rotated per request when more than one
    user_agents: Vec<String>,
    /// Transport options for the default HTTP fetcher
    options: FetchOptions,
    /// Replaces the default HTTP fetcher
    fetcher: Option<Arc<dyn TextFetcher>>,
}

impl ToolBuilder {
    /// Create a new tool builder with default transport options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent (replaces any previously configured)
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agents = vec![ua.into()];
        self
    }

    /// Rotate through several User-Agents
    pub fn user_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Replace all transport options at once
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.block_prefixes.push(prefix.into());
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Set the time allowed for response headers to arrive
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = timeout;
        self
    }

    /// Set body read timeout
    pub fn body_timeout(mut self, timeout: Duration) -> Self {
        self.options.body_timeout = timeout;
        self
    }

    /// Set minimum spacing between requests (zero disables throttling)
    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.options.min_request_interval = interval;
        self
    }

    /// Use a custom fetcher instead of the built-in HTTP client
    pub fn fetcher(mut self, fetcher: Arc<dyn TextFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the tool
    pub fn build(self) -> Result<Tool, DocsError> {
        let fetcher: Arc<dyn TextFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(self.options)?),
        };

        let user_agents: Arc<dyn UserAgentSource> = match self.user_agents.len() {
            0 => Arc::new(StaticUserAgent::default()),
            1 => Arc::new(StaticUserAgent::new(self.user_agents[0].clone())),
            _ => Arc::new(RotatingUserAgent::new(self.user_agents)),
        };

        Ok(Tool {
            resolver: DocsetResolver::new(fetcher.clone(), user_agents.clone()),
            searcher: DocsetSearcher::new(fetcher, user_agents),
        })
    }
}

/// Configured DocsKit tool
#[derive(Clone)]
pub struct Tool {
    resolver: DocsetResolver,
    searcher: DocsetSearcher,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(DocumentationRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(ResolvedDocument);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get search input schema as JSON
    pub fn search_input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(SearchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get search output schema as JSON
    pub fn search_output_schema(&self) -> serde_json::Value {
        let schema = schema_for!(Vec<SearchResult>);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Resolve one documentation page to Markdown
    pub async fn resolve(&self, req: DocumentationRequest) -> Result<ResolvedDocument, DocsError> {
        self.resolver.resolve_document(&req).await
    }

    /// Search a documentation site
    pub async fn search(&self, req: SearchRequest) -> Result<Vec<SearchResult>, DocsError> {
        self.searcher
            .search_documents(&req.base_url, &req.query, req.docset_type)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::MapFetcher;
    use crate::types::DocsetType;

    #[test]
    fn test_tool_builder() {
        let builder = Tool::builder()
            .user_agent("TestAgent/1.0")
            .allow_prefix("https://allowed.com")
            .block_prefix("https://blocked.com")
            .connect_timeout(Duration::from_secs(3))
            .request_timeout(Duration::from_secs(5))
            .min_request_interval(Duration::ZERO);

        assert_eq!(builder.user_agents, vec!["TestAgent/1.0"]);
        assert_eq!(builder.options.allow_prefixes, vec!["https://allowed.com"]);
        assert_eq!(builder.options.block_prefixes, vec!["https://blocked.com"]);
        assert_eq!(builder.options.connect_timeout, Duration::from_secs(3));
        assert_eq!(builder.options.request_timeout, Duration::from_secs(5));
        assert!(builder.options.min_request_interval.is_zero());
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_user_agents_replace() {
        let builder = Tool::builder().user_agent("A").user_agents(["B", "C"]);
        assert_eq!(builder.user_agents, vec!["B", "C"]);
    }

    #[test]
    fn test_tool_description() {
        let tool = Tool::builder().build().unwrap();
        assert!(!tool.description().is_empty());
        assert!(tool.llmtxt().contains("base_url"));
    }

    #[test]
    fn test_tool_schemas() {
        let tool = Tool::builder().build().unwrap();

        let input = tool.input_schema();
        assert!(input["properties"]["base_url"].is_object());
        assert!(input["properties"]["path"].is_object());

        let output = tool.output_schema();
        assert!(output["properties"]["markdown"].is_object());
        assert!(output["properties"]["docset_type"].is_object());

        let search_input = tool.search_input_schema();
        assert!(search_input["properties"]["query"].is_object());

        assert_eq!(tool.search_output_schema()["type"], "array");
    }

    #[tokio::test]
    async fn test_rotating_agents_reach_fetcher() {
        let fetcher = Arc::new(MapFetcher::new());
        let tool = Tool::builder()
            .user_agents(["A/1", "B/1"])
            .fetcher(fetcher.clone())
            .build()
            .unwrap();

        let _ = tool
            .resolve(DocumentationRequest::new("https://docs.example.com/page"))
            .await;

        let agents: Vec<_> = fetcher.headers().into_iter().map(|h| h.user_agent).collect();
        assert_eq!(agents, vec!["A/1", "B/1"]);
    }

    #[tokio::test]
    async fn test_resolve_and_search_with_injected_fetcher() {
        let fetcher = Arc::new(
            MapFetcher::new()
                .with(
                    "https://docs.example.com/install",
                    r#"<meta name="generator" content="mkdocs-1.5">
                    <div class="md-content"><h1>Install</h1><p>pip install it</p></div>"#,
                )
                .with(
                    "https://docs.example.com/search/search_index.json",
                    r#"{"docs": [{"location": "install/", "title": "Install", "text": "pip"}]}"#,
                ),
        );
        let tool = Tool::builder().fetcher(fetcher).build().unwrap();

        let doc = tool
            .resolve(DocumentationRequest::new("https://docs.example.com/install"))
            .await
            .unwrap();
        assert_eq!(doc.docset_type, DocsetType::Mkdocs);
        assert!(doc.markdown.starts_with("# Install"));

        let results = tool
            .search(SearchRequest {
                base_url: "https://docs.example.com".to_string(),
                query: "install".to_string(),
                docset_type: None,
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}
