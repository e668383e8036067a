//! Sphinx `searchindex.js` parser

use super::IndexParseError;
use crate::types::SearchResult;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

const MAX_RESULTS: usize = 20;
const TERM_SCORE: u32 = 2;
const TITLE_SCORE: u32 = 3;

static SET_INDEX_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Search\.setIndex\(\s*(\{.*\})\s*\)").unwrap());

static INDEX_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var\s+index\s*=\s*(\{.*\})").unwrap());

static TOKEN_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());

#[derive(Debug, Default, Deserialize)]
struct SearchIndex {
    #[serde(default)]
    docnames: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    filenames: Vec<String>,
    #[serde(default)]
    terms: HashMap<String, Value>,
}

/// Object literal passed to `Search.setIndex(...)` or assigned to `var index`
fn embedded_object(body: &str) -> Option<&str> {
    SET_INDEX_CALL
        .captures(body)
        .or_else(|| INDEX_ASSIGNMENT.captures(body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Document ids in one `terms` posting list
fn posting_ids(posting: &Value) -> Vec<usize> {
    match posting {
        Value::Number(n) => n.as_u64().map(|id| id as usize).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Number(n) => n.as_u64(),
                Value::Array(pair) => pair.first().and_then(Value::as_u64),
                _ => None,
            })
            .map(|id| id as usize)
            .collect(),
        _ => Vec::new(),
    }
}

/// Rank documents against `query` (already lower-cased)
pub(crate) fn parse(body: &str, base: &Url, query: &str) -> Result<Vec<SearchResult>, IndexParseError> {
    let object = embedded_object(body).ok_or(IndexParseError::MissingIndex)?;
    let index: SearchIndex = serde_json::from_str(object)?;

    let doc_count = index.docnames.len().max(index.filenames.len());
    let mut scores = vec![0u32; doc_count];

    for token in TOKEN_SEPARATOR.split(query).filter(|t| !t.is_empty()) {
        if let Some(posting) = index.terms.get(token) {
            for id in posting_ids(posting) {
                if let Some(score) = scores.get_mut(id) {
                    *score += TERM_SCORE;
                }
            }
        }
    }

    for (id, score) in scores.iter_mut().enumerate() {
        let title = index.titles.get(id).map(|t| t.to_lowercase()).unwrap_or_default();
        let docname = index.docnames.get(id).map(|d| d.to_lowercase()).unwrap_or_default();
        if title.contains(query) || docname.contains(query) {
            *score += TITLE_SCORE;
        }
    }

    let mut ranked: Vec<(usize, u32)> = scores
        .into_iter()
        .enumerate()
        .filter(|(_, score)| *score > 0)
        .collect();
    // Stable sort keeps index order among equal scores
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let results = ranked
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|(id, _)| {
            let docname = index.docnames.get(id).filter(|d| !d.is_empty());
            let target = match index.filenames.get(id).filter(|f| !f.is_empty()) {
                Some(filename) => filename.clone(),
                None => format!("{}.html", docname?),
            };
            let url = base.join(&target).ok()?;
            let title = index
                .titles
                .get(id)
                .filter(|t| !t.is_empty())
                .or(docname)
                .cloned()
                .unwrap_or_else(|| target.clone());

            Some(SearchResult {
                title,
                url: url.to_string(),
                snippet: String::new(),
                source: "sphinx".to_string(),
            })
        })
        .collect();

    Ok(results)
}
