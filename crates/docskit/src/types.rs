//! Core types for docskit

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Documentation generator that produced a site
///
/// Declaration order matters: generator meta keywords and CSS markers are
/// checked in this order during detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocsetType {
    /// Apple developer documentation
    Apple,
    /// Docusaurus site
    Docusaurus,
    /// MkDocs (incl. Material for MkDocs)
    Mkdocs,
    /// Sphinx / Read the Docs
    Sphinx,
    /// TypeDoc API reference
    Typedoc,
    /// JSDoc API reference
    Jsdoc,
    /// rustdoc output
    Rustdoc,
    /// Go package documentation
    Godoc,
    /// pdoc / pdoc3 Python API reference
    Pdoc,
    /// Unknown generator, generic selectors
    Generic,
    /// Whole-page fallback when extraction produced nothing
    Html,
}

impl DocsetType {
    /// All types in declaration order
    pub const ALL: [DocsetType; 11] = [
        DocsetType::Apple,
        DocsetType::Docusaurus,
        DocsetType::Mkdocs,
        DocsetType::Sphinx,
        DocsetType::Typedoc,
        DocsetType::Jsdoc,
        DocsetType::Rustdoc,
        DocsetType::Godoc,
        DocsetType::Pdoc,
        DocsetType::Generic,
        DocsetType::Html,
    ];

    /// Lower-case name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DocsetType::Apple => "apple",
            DocsetType::Docusaurus => "docusaurus",
            DocsetType::Mkdocs => "mkdocs",
            DocsetType::Sphinx => "sphinx",
            DocsetType::Typedoc => "typedoc",
            DocsetType::Jsdoc => "jsdoc",
            DocsetType::Rustdoc => "rustdoc",
            DocsetType::Godoc => "godoc",
            DocsetType::Pdoc => "pdoc",
            DocsetType::Generic => "generic",
            DocsetType::Html => "html",
        }
    }

    /// Keyword looked for in `<meta name="generator">`, for generators that emit one
    pub fn generator_keyword(&self) -> Option<&'static str> {
        match self {
            DocsetType::Docusaurus
            | DocsetType::Mkdocs
            | DocsetType::Sphinx
            | DocsetType::Typedoc
            | DocsetType::Jsdoc
            | DocsetType::Rustdoc
            | DocsetType::Pdoc => Some(self.as_str()),
            _ => None,
        }
    }
}

impl FromStr for DocsetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        DocsetType::ALL
            .iter()
            .find(|t| t.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Unknown docset type: {}", s))
    }
}

impl std::fmt::Display for DocsetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to resolve one documentation page
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocumentationRequest {
    /// Base URL of the page or docset (scheme optional, https assumed)
    pub base_url: String,

    /// Path relative to the base directory, or an absolute URL overriding the base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Skip detection and extract with this generator's selectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docset_type: Option<DocsetType>,
}

impl DocumentationRequest {
    /// Create a new request for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the relative path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Force a docset type
    pub fn docset_type(mut self, docset_type: DocsetType) -> Self {
        self.docset_type = Some(docset_type);
        self
    }
}

/// A successfully resolved documentation page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedDocument {
    /// Page content as Markdown
    pub markdown: String,
    /// The URL that ultimately answered
    pub url: String,
    /// Generator used for extraction (`html` when the whole page was converted)
    pub docset_type: DocsetType,
}

/// Request to search a documentation site
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Any page URL on the documentation site
    pub base_url: String,

    /// Case-insensitive search text
    pub query: String,

    /// Restrict index probing (`mkdocs` → JSON indexes, `sphinx` → `searchindex.js`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docset_type: Option<DocsetType>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    pub title: String,
    /// Absolute URL of the page
    pub url: String,
    /// Up to 200 characters of body text, may be empty
    pub snippet: String,
    /// Parser that produced the hit: `mkdocs`, `sphinx` or `sitemap`
    pub source: String,
}
