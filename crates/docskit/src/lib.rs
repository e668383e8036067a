//! DocsKit - documentation sites as Markdown for AI agents
//!
//! Resolves a documentation page into clean Markdown and searches a
//! documentation site through the index files its generator publishes.
//!
//! ## Pipeline
//!
//! A page request flows through pure stages around one fetch:
//! [`normalize_url`] → fetch → [`detect_docset_type`] → [`extract_content`]
//! → [`html_to_markdown`]. Each stage is public and usable on its own.
//!
//! Search derives candidate documentation roots with [`candidate_bases`],
//! looks up MkDocs and Sphinx index files under each, and falls back to
//! `sitemap.xml`.
//!
//! ## Fetching
//!
//! Network access goes through the [`TextFetcher`] trait. [`HttpFetcher`]
//! is the default reqwest implementation; tests and embedders can inject
//! their own via [`ToolBuilder::fetcher`].

pub mod client;
mod convert;
mod detect;
mod error;
mod extract;
pub mod http;
mod normalize;
mod resolve;
mod search;
mod tool;
mod types;

pub use client::{
    resolve_document, resolve_document_with_options, search_documents,
    search_documents_with_options,
};
pub use convert::html_to_markdown;
pub use detect::detect_docset_type;
pub use error::DocsError;
pub use extract::{extract_content, ExtractedContent};
pub use http::{
    FetchHeaders, FetchOptions, HttpFetcher, RotatingUserAgent, StaticUserAgent, TextFetcher,
    UserAgentSource,
};
pub use normalize::{normalize_url, original_url};
pub use resolve::DocsetResolver;
pub use search::{candidate_bases, DocsetSearcher};
pub use tool::{Tool, ToolBuilder};
pub use types::{DocsetType, DocumentationRequest, ResolvedDocument, SearchRequest, SearchResult};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns DocsKit/1.0";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Fetches a documentation page and returns its main content as Markdown.

- Detects the generator (Sphinx, MkDocs, Docusaurus, rustdoc, ...)
- Strips navigation, sidebars and other page chrome
- Searches a site through its published search index
- Retries common URL variants before failing"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# DocsKit Tool

Fetches documentation pages as clean Markdown and searches documentation sites.

## Capabilities
- Docset detection: apple, docusaurus, mkdocs, sphinx, typedoc, jsdoc, rustdoc, godoc, pdoc
- Main-content extraction with generator-specific selectors
- HTML to Markdown conversion (headings, lists, code blocks, tables)
- Search via MkDocs `search_index.json`, Sphinx `searchindex.js`, or `sitemap.xml`

## Resolve: Input Parameters
- `base_url` (required): Documentation page or site URL (https:// assumed if omitted)
- `path` (optional): Page path relative to the base directory, or an absolute URL
- `docset_type` (optional): Skip detection and use this generator's selectors

## Resolve: Output Fields
- `markdown`: Page content as Markdown, starting with `# Title` when known
- `url`: The URL that was fetched successfully
- `docset_type`: Detected or forced generator; `html` when the whole page was converted

## Search: Input Parameters
- `base_url` (required): Any page on the documentation site
- `query` (required): Case-insensitive text to look for
- `docset_type` (optional): `mkdocs` fetches only JSON indexes, `sphinx` only `searchindex.js`

## Search: Output Fields
Array of results, each with:
- `title`: Page title
- `url`: Absolute page URL
- `snippet`: Up to 200 characters of page text (may be empty)
- `source`: `mkdocs`, `sphinx` or `sitemap`

## URL Normalization
- Query strings and fragments are dropped
- `.html` is removed (`glossary.html` is kept) and `/index.html` collapses to its directory
- Relative paths resolve against the base page's directory

## Examples

### Fetch a page
```json
{"base_url": "https://docs.python.org/3/library/asyncio.html"}
```

### Fetch a sibling page
```json
{"base_url": "https://docs.python.org/3/library/asyncio.html", "path": "asyncio-task.html"}
```

### Search a site
```json
{"base_url": "https://docs.example.com/en/stable/", "query": "install"}
```

## Error Handling
- Empty or unparseable base URLs return an invalid input error
- Failed fetches return the URL and HTTP status of the last attempt
- Search never fails for missing indexes; it returns an empty list
"#;
