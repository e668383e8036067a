//! Document resolution
//!
//! Ties normalization, fetching, detection, extraction and conversion
//! together for one request. Fetching walks a short, fixed list of
//! candidate URLs; everything after the fetch is pure.

use crate::convert::html_to_markdown;
use crate::detect::detect_docset_type;
use crate::error::DocsError;
use crate::extract::{extract_content, strip_anchor_glyph};
use crate::http::{FetchHeaders, TextFetcher, UserAgentSource};
use crate::normalize::{has_extension, normalize_url, original_url};
use crate::types::{DocsetType, DocumentationRequest, ResolvedDocument};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};
use url::Url;

/// Inline link or image, capturing the visible text
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());

/// Why a URL is in the fetch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptKind {
    /// The normalized target
    Canonical,
    /// Target with a trailing slash, for directory-style servers
    TrailingSlash,
    /// The URL as the caller wrote it, before normalization
    Original,
}

impl AttemptKind {
    fn as_str(&self) -> &'static str {
        match self {
            AttemptKind::Canonical => "canonical",
            AttemptKind::TrailingSlash => "trailing_slash",
            AttemptKind::Original => "original",
        }
    }
}

/// Resolves documentation requests into Markdown documents
#[derive(Clone)]
pub struct DocsetResolver {
    fetcher: Arc<dyn TextFetcher>,
    user_agents: Arc<dyn UserAgentSource>,
}

impl DocsetResolver {
    pub fn new(fetcher: Arc<dyn TextFetcher>, user_agents: Arc<dyn UserAgentSource>) -> Self {
        Self {
            fetcher,
            user_agents,
        }
    }

    /// Fetch a documentation page and convert it to Markdown
    ///
    /// Tries the normalized URL, then the same URL with a trailing slash
    /// (extensionless paths only), then the URL as originally given. The
    /// first success wins; otherwise the last failure is returned.
    pub async fn resolve_document(
        &self,
        request: &DocumentationRequest,
    ) -> Result<ResolvedDocument, DocsError> {
        let target = normalize_url(&request.base_url, request.path.as_deref())?;
        let original = original_url(&request.base_url, request.path.as_deref())?;

        let mut last_error = None;
        for (kind, url) in fetch_attempts(&target, &original) {
            debug!(url = %url, attempt = kind.as_str(), "Fetching documentation page");
            let headers = FetchHeaders::document(self.user_agents.user_agent());

            match self.fetcher.fetch_text(url.as_str(), &headers).await {
                Ok(html) => return Ok(render_document(&html, url.as_str(), request.docset_type)),
                Err(err) => {
                    debug!(url = %url, attempt = kind.as_str(), error = %err, "Fetch attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DocsError::FetchFailure {
            url: target.to_string(),
            status: None,
            reason: "no fetch attempted".to_string(),
        }))
    }
}

/// Ordered, de-duplicated fetch sequence for a target
fn fetch_attempts(target: &Url, original: &Url) -> Vec<(AttemptKind, Url)> {
    let mut attempts = vec![(AttemptKind::Canonical, target.clone())];

    let path = target.path();
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if !path.ends_with('/') && !has_extension(last_segment) {
        let mut slashed = target.clone();
        slashed.set_path(&format!("{}/", path));
        attempts.push((AttemptKind::TrailingSlash, slashed));
    }

    if attempts.iter().all(|(_, url)| url != original) {
        attempts.push((AttemptKind::Original, original.clone()));
    }

    attempts
}

/// Detect, extract and convert a fetched page
///
/// When extraction yields no Markdown the whole page is converted and the
/// type becomes [`DocsetType::Html`].
pub(crate) fn render_document(
    html: &str,
    url: &str,
    forced_type: Option<DocsetType>,
) -> ResolvedDocument {
    let docset_type = forced_type.unwrap_or_else(|| detect_docset_type(html, url));
    let extracted = extract_content(html, docset_type);

    let mut markdown = html_to_markdown(&extracted.content_html);
    let mut resolved_type = docset_type;
    if markdown.is_empty() {
        warn!(url, %docset_type, "Extraction produced no content, converting whole page");
        markdown = html_to_markdown(html);
        resolved_type = DocsetType::Html;
    }

    ResolvedDocument {
        markdown: with_title(markdown, &extracted.title),
        url: url.to_string(),
        docset_type: resolved_type,
    }
}

/// Prepend `# {title}` unless the Markdown already opens with it
///
/// The first line counts as that heading when its text, with links, code
/// spans and emphasis markers removed, equals the title.
fn with_title(markdown: String, title: &str) -> String {
    if title.is_empty() {
        return markdown;
    }
    let first_line = markdown.lines().next().unwrap_or_default();
    if let Some(heading) = first_line.strip_prefix("# ") {
        if plain_text(heading) == plain_text(title) {
            return markdown;
        }
    }
    format!("# {}\n\n{}", title, markdown).trim_end().to_string()
}

fn plain_text(inline: &str) -> String {
    let text = MARKDOWN_LINK.replace_all(inline, "$1");
    let text: String = text
        .chars()
        .filter(|c| !matches!(c, '`' | '*' | '~'))
        .collect();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_anchor_glyph(&text).to_string()
}
