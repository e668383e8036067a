//! MkDocs `search_index.json` parser

use super::IndexParseError;
use crate::types::SearchResult;
use serde::Deserialize;
use url::Url;

const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchIndex {
    #[serde(default)]
    docs: Vec<IndexDoc>,
}

#[derive(Debug, Deserialize)]
struct IndexDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

/// Documents whose title or text contains `query` (already lower-cased)
pub(crate) fn parse(body: &str, base: &Url, query: &str) -> Result<Vec<SearchResult>, IndexParseError> {
    let index: SearchIndex = serde_json::from_str(body)?;

    let results = index
        .docs
        .into_iter()
        .filter(|doc| {
            let title = doc.title.as_deref().unwrap_or_default().to_lowercase();
            let text = doc.text.as_deref().unwrap_or_default().to_lowercase();
            title.contains(query) || text.contains(query)
        })
        .map(|doc| {
            let url = match doc.location.as_deref() {
                Some(location) => base.join(location).unwrap_or_else(|_| base.clone()),
                None => base.clone(),
            };
            SearchResult {
                title: doc
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Untitled".to_string()),
                url: url.to_string(),
                snippet: doc
                    .text
                    .unwrap_or_default()
                    .chars()
                    .take(SNIPPET_CHARS)
                    .collect(),
                source: "mkdocs".to_string(),
            }
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/").unwrap()
    }

    const INDEX: &str = r#"{
        "config": {"lang": ["en"]},
        "docs": [
            {"location": "install/", "title": "Install", "text": "Run pip install example."},
            {"location": "usage/#cli", "title": "Usage", "text": "Command line usage."},
            {"location": "", "title": "", "text": "Welcome. See INSTALL notes."}
        ]
    }"#;

    #[test]
    fn test_matches_title_and_text_case_insensitive() {
        let results = parse(INDEX, &base(), "install").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Install");
        assert_eq!(results[0].url, "https://docs.example.com/install/");
        assert_eq!(results[0].snippet, "Run pip install example.");
        assert_eq!(results[0].source, "mkdocs");

        assert_eq!(results[1].title, "Untitled");
        assert_eq!(results[1].url, "https://docs.example.com/");
    }

    #[test]
    fn test_location_keeps_anchor() {
        let results = parse(INDEX, &base(), "command").unwrap();
        assert_eq!(results[0].url, "https://docs.example.com/usage/#cli");
    }

    #[test]
    fn test_missing_location_uses_base() {
        let body = r#"{"docs": [{"title": "Home", "text": "home page"}]}"#;
        let base = Url::parse("https://docs.example.com/en/latest/").unwrap();
        let results = parse(body, &base, "home").unwrap();
        assert_eq!(results[0].url, "https://docs.example.com/en/latest/");
    }

    #[test]
    fn test_snippet_truncated() {
        let body = format!(r#"{{"docs": [{{"title": "Long", "text": "{}"}}]}}"#, "é".repeat(300));
        let results = parse(&body, &base(), "long").unwrap();
        assert_eq!(results[0].snippet.chars().count(), 200);
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse("<html>not json</html>", &base(), "x").is_err());
        assert!(parse(r#"{"docs": []}"#, &base(), "x").unwrap().is_empty());
    }
}
