//! `sitemap.xml` fallback parser

use crate::types::SearchResult;
use regex::Regex;
use std::sync::LazyLock;

static LOC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").unwrap());

/// Decode the predefined XML entities
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Title for a sitemap URL: its last non-empty path segment
fn title_for(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let path = without_query
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, path)| path).unwrap_or_default())
        .unwrap_or(without_query);

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string())
}

/// `<loc>` entries whose URL contains `query` (already lower-cased)
pub(crate) fn parse(body: &str, query: &str) -> Vec<SearchResult> {
    LOC.captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
        .filter(|loc| !loc.is_empty() && loc.to_lowercase().contains(query))
        .map(|loc| SearchResult {
            title: title_for(&loc),
            url: loc,
            snippet: String::new(),
            source: "sitemap".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://docs.example.com/</loc></url>
  <url><loc>https://docs.example.com/guide/install/</loc><lastmod>2024-01-01</lastmod></url>
  <url><LOC>
    https://docs.example.com/api/Installer.html
  </LOC></url>
  <url><loc>https://docs.example.com/search?q=install&amp;page=2</loc></url>
  <url><loc>https://docs.example.com/usage/</loc></url>
</urlset>"#;

    #[test]
    fn test_filters_by_query() {
        let results = parse(SITEMAP, "install");
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://docs.example.com/guide/install/",
                "https://docs.example.com/api/Installer.html",
                "https://docs.example.com/search?q=install&page=2",
            ]
        );
        assert_eq!(results[0].title, "install");
        assert_eq!(results[1].title, "Installer.html");
        assert_eq!(results[2].title, "search");
        assert!(results.iter().all(|r| r.source == "sitemap" && r.snippet.is_empty()));
    }

    #[test]
    fn test_title_falls_back_to_url() {
        assert_eq!(title_for("https://docs.example.com/"), "https://docs.example.com/");
        assert_eq!(title_for("https://docs.example.com/a/b"), "b");
    }

    #[test]
    fn test_no_locs() {
        assert!(parse("<html>404</html>", "x").is_empty());
    }
}
