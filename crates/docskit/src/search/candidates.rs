//! Candidate documentation roots for a page URL

use crate::normalize::has_extension;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static LANG_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]{2}(?:[-_][a-z]{2,4})?$").unwrap());

static NUMERIC_VERSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v?\d").unwrap());

const VERSION_LITERALS: &[&str] = &[
    "latest", "stable", "dev", "main", "master", "develop", "nightly",
];

fn is_version_segment(segment: &str) -> bool {
    let lower = segment.to_lowercase();
    VERSION_LITERALS.contains(&lower.as_str()) || NUMERIC_VERSION.is_match(segment)
}

/// Guess documentation roots for a page, most specific first
///
/// Order: `/lang/version/` prefix (when present), first path segment,
/// current directory, site root. Duplicates keep their first position.
pub fn candidate_bases(url: &Url) -> Vec<Url> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let is_dir = url.path().ends_with('/');

    let mut paths: Vec<String> = Vec::new();

    if let [lang, version, ..] = segments.as_slice() {
        if LANG_SEGMENT.is_match(lang) && is_version_segment(version) {
            paths.push(format!("/{}/{}/", lang, version));
        }
    }

    // A lone file-looking segment is a page, not a directory
    if let Some(first) = segments.first() {
        if segments.len() > 1 || is_dir || !has_extension(first) {
            paths.push(format!("/{}/", first));
        }
    }

    let dir_segments = match segments.split_last() {
        Some((last, rest)) if !is_dir && has_extension(last) => rest,
        _ => segments.as_slice(),
    };
    if dir_segments.is_empty() {
        paths.push("/".to_string());
    } else {
        paths.push(format!("/{}/", dir_segments.join("/")));
    }

    paths.push("/".to_string());

    let mut bases: Vec<Url> = Vec::new();
    for path in paths {
        let mut base = url.clone();
        base.set_path(&path);
        base.set_query(None);
        base.set_fragment(None);
        if !bases.contains(&base) {
            bases.push(base);
        }
    }
    bases
}
