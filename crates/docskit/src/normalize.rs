//! URL normalization
//!
//! Turns a user-supplied base URL and optional relative path into the one
//! absolute URL that gets fetched. Pure: no I/O, same input → same output.

use crate::error::DocsError;
use url::Url;

/// Filename kept verbatim when stripping `.html` (sites link to it literally)
const HTML_STRIP_EXCEPTION: &str = "glossary.html";

/// Normalize a base URL and optional path into a canonical absolute URL
///
/// - `https://` is assumed when the base has no scheme
/// - fragment and query are dropped
/// - `/index.html` collapses to its directory, other `.html` extensions are removed
/// - a single trailing slash is removed (except for the root)
/// - an absolute `http(s)://` path replaces the base entirely
/// - any other path resolves against the base *directory*; a leading `/`
///   is relative to that directory, not to the origin
pub fn normalize_url(base: &str, path: Option<&str>) -> Result<Url, DocsError> {
    let mut url = resolve(base, path)?;
    url.set_query(None);
    canonicalize(&mut url);
    Ok(url)
}

/// Resolve base and path the same way as [`normalize_url`] but without
/// canonicalizing the result: the URL as the caller literally addressed it.
pub fn original_url(base: &str, path: Option<&str>) -> Result<Url, DocsError> {
    resolve(base, path)
}

/// Parse a base URL, assuming `https://` and dropping the fragment
pub(crate) fn parse_base(raw: &str) -> Result<Url, DocsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DocsError::InvalidInput("base URL is empty".to_string()));
    }

    let with_scheme = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| DocsError::InvalidInput(format!("unparseable URL '{}': {}", trimmed, e)))?;
    url.set_fragment(None);
    Ok(url)
}

/// True when the input opens with `scheme://`; a `://` later on (in a query) does not count
fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn resolve(base: &str, path: Option<&str>) -> Result<Url, DocsError> {
    let base_url = parse_base(base)?;

    let path = match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => p,
        None => return Ok(base_url),
    };

    if is_absolute(path) {
        return parse_base(path);
    }

    let dir = base_directory(&base_url);
    let mut joined = dir
        .join(path.trim_start_matches('/'))
        .map_err(|e| DocsError::InvalidInput(format!("cannot resolve path '{}': {}", path, e)))?;
    joined.set_fragment(None);
    Ok(joined)
}

fn is_absolute(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Directory a relative path resolves against
///
/// File-looking bases (last segment has an extension) use their parent,
/// everything else is treated as a directory.
fn base_directory(base: &Url) -> Url {
    let mut dir = base.clone();
    dir.set_query(None);

    let path = base.path();
    let last_slash = path.rfind('/').unwrap_or(0);
    let last_segment = &path[last_slash + 1..];

    if has_extension(last_segment) {
        dir.set_path(&path[..=last_slash]);
    } else if !path.ends_with('/') {
        dir.set_path(&format!("{}/", path));
    }
    dir
}

pub(crate) fn has_extension(segment: &str) -> bool {
    match segment.rfind('.') {
        Some(idx) => idx > 0 && idx + 1 < segment.len(),
        None => false,
    }
}

/// Apply the path rewrites until nothing changes, so normalizing is idempotent
fn canonicalize(url: &mut Url) {
    let mut path = url.path().to_string();
    loop {
        let next = canonical_path(&path);
        if next == path {
            break;
        }
        path = next;
    }
    url.set_path(&path);
}

fn canonical_path(path: &str) -> String {
    if let Some(parent) = path.strip_suffix("index.html") {
        if parent.ends_with('/') {
            return parent.to_string();
        }
    }

    let last_segment = path.rsplit('/').next().unwrap_or("");
    if last_segment != HTML_STRIP_EXCEPTION && last_segment.len() > ".html".len() {
        if let Some(stripped) = path.strip_suffix(".html") {
            return stripped.to_string();
        }
    }

    if path.len() > 1 {
        if let Some(stripped) = path.strip_suffix('/') {
            return stripped.to_string();
        }
    }

    path.to_string()
}
