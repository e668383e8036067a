//! Main-content extraction
//!
//! Picks the DOM subtree holding the article using per-generator selectors,
//! then strips navigation and other page chrome from it.

use crate::types::DocsetType;
use scraper::{ElementRef, Html, Selector};

/// Tried after the generator-specific selectors, ending with `body`
const FALLBACK_SELECTORS: &[&str] = &[
    "main article",
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".content",
    ".markdown-body",
    ".documentation",
    "body",
];

/// Elements removed from the selected root
const DENYLIST: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    "script",
    "style",
    "noscript",
    "template",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"contentinfo\"]",
    "[aria-label=\"breadcrumbs\"]",
    ".sidebar",
    ".sphinxsidebar",
    ".md-sidebar",
    ".toc",
    ".table-of-contents",
    ".pagination",
    ".pager",
    ".breadcrumb",
    ".breadcrumbs",
    ".headerlink",
    ".edit-this-page",
];

/// Title and cleaned markup of a page's primary content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub content_html: String,
}

impl ExtractedContent {
    pub fn is_empty(&self) -> bool {
        self.content_html.is_empty()
    }
}

/// Content selectors preferred for a generator, most specific first
fn content_selectors(docset_type: DocsetType) -> &'static [&'static str] {
    match docset_type {
        DocsetType::Apple => &["main", "#main", ".main"],
        DocsetType::Docusaurus => &[".theme-doc-markdown", "article", "main"],
        DocsetType::Mkdocs => &[
            ".md-content__inner",
            ".md-content",
            "div[role=\"main\"]",
            "article",
            "main",
        ],
        DocsetType::Sphinx => &["div.body", "div[role=\"main\"]", "article", "main"],
        DocsetType::Typedoc => &[".col-content", ".tsd-panel-group", "main"],
        DocsetType::Jsdoc => &["#main", "article"],
        DocsetType::Rustdoc => &["#main-content", "section#main", "main"],
        DocsetType::Godoc => &[".Documentation", "#pkg-overview", ".UnitDoc", "main"],
        DocsetType::Pdoc => &["main.pdoc", "main", "#content"],
        DocsetType::Generic | DocsetType::Html => &[],
    }
}

/// Extract the title and cleaned content markup from a page
///
/// Returns an empty [`ExtractedContent`] when no selector matched or the
/// selected root is empty after stripping; callers fall back to the whole page.
pub fn extract_content(html: &str, docset_type: DocsetType) -> ExtractedContent {
    let document = Html::parse_document(html);

    let root = match select_root(&document, docset_type) {
        Some(root) => root,
        None => return ExtractedContent::default(),
    };

    let mut fragment = Html::parse_fragment(&root.inner_html());
    strip_boilerplate(&mut fragment);
    let content_html = fragment.root_element().inner_html().trim().to_string();

    if content_html.is_empty() {
        return ExtractedContent::default();
    }

    let title = first_text(root, "h1")
        .or_else(|| first_text(document.root_element(), "h1"))
        .or_else(|| first_text(document.root_element(), "title"))
        .unwrap_or_default();

    ExtractedContent {
        title,
        content_html,
    }
}

fn select_root(document: &Html, docset_type: DocsetType) -> Option<ElementRef<'_>> {
    content_selectors(docset_type)
        .iter()
        .chain(FALLBACK_SELECTORS)
        .find_map(|css| {
            let selector = Selector::parse(css).ok()?;
            let root = document.select(&selector).next()?;
            tracing::debug!(selector = css, %docset_type, "Selected content root");
            Some(root)
        })
}

/// Detach every denylisted element; selectors matching nothing are skipped
fn strip_boilerplate(fragment: &mut Html) {
    for css in DENYLIST {
        if let Ok(selector) = Selector::parse(css) {
            let ids: Vec<_> = fragment.select(&selector).map(|el| el.id()).collect();
            for id in ids {
                if let Some(mut node) = fragment.tree.get_mut(id) {
                    node.detach();
                }
            }
        }
    }
}

/// Whitespace-collapsed text of the first non-empty match under `scope`
fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).find_map(|el| {
        let text = el.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let text = strip_anchor_glyph(&text);
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// Remove a trailing permalink glyph: any `¶`, or a `#` standing alone
///
/// A `#` glued to a word is part of the name ("C#", "F#") and is kept.
pub(crate) fn strip_anchor_glyph(text: &str) -> &str {
    let mut text = text.trim_end();
    loop {
        let stripped = text.trim_end_matches('¶').trim_end();
        let stripped = match stripped.strip_suffix('#') {
            Some(rest) if rest.is_empty() || rest.ends_with(char::is_whitespace) => rest.trim_end(),
            _ => stripped,
        };
        if stripped.len() == text.len() {
            return text;
        }
        text = stripped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_prefers_main_article_and_drops_nav() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a> Navigation links</nav>
            <main><article><h1>Example</h1><p>Doc content.</p></article></main>
            </body></html>"#;
        let extracted = extract_content(html, DocsetType::Generic);

        assert_eq!(extracted.title, "Example");
        assert!(extracted.content_html.contains("Doc content."));
        assert!(!extracted.content_html.contains("Navigation links"));
    }

    #[test]
    fn test_denylist_removed_recursively_inside_root() {
        let html = r#"<main>
            <div class="toc"><ul><li>Section</li></ul></div>
            <div><div><nav>Deep nav</nav><p>Body text</p></div></div>
            <footer>Copyright</footer>
            <script>track()</script>
            </main>"#;
        let extracted = extract_content(html, DocsetType::Generic);

        assert!(extracted.content_html.contains("Body text"));
        assert!(!extracted.content_html.contains("Deep nav"));
        assert!(!extracted.content_html.contains("Section"));
        assert!(!extracted.content_html.contains("Copyright"));
        assert!(!extracted.content_html.contains("track()"));
    }

    #[test]
    fn test_mkdocs_prefers_content_wrapper() {
        let html = r#"<body>
            <div class="md-sidebar">Site nav</div>
            <main><div class="md-content"><article class="md-content__inner">
            <h1>Install</h1><p>pip install thing</p></article></div>
            <p>Outside wrapper</p></main></body>"#;
        let extracted = extract_content(html, DocsetType::Mkdocs);

        assert_eq!(extracted.title, "Install");
        assert!(extracted.content_html.contains("pip install thing"));
        assert!(!extracted.content_html.contains("Outside wrapper"));
    }

    #[test]
    fn test_sphinx_body_and_headerlink() {
        let html = r##"<div class="document"><div class="sphinxsidebar">Sidebar</div>
            <div class="body" role="main"><h1>asyncio<a class="headerlink" href="#asyncio">¶</a></h1>
            <p>Asynchronous I/O.</p></div></div>"##;
        let extracted = extract_content(html, DocsetType::Sphinx);

        assert_eq!(extracted.title, "asyncio");
        assert!(extracted.content_html.contains("Asynchronous I/O."));
        assert!(!extracted.content_html.contains("headerlink"));
        assert!(!extracted.content_html.contains("Sidebar"));
    }

    #[test]
    fn test_title_keeps_hash_that_is_part_of_name() {
        let extracted = extract_content("<main><h1>C#</h1><p>Body</p></main>", DocsetType::Generic);
        assert_eq!(extracted.title, "C#");

        let html = r##"<main><h1>F# guide <a class="anchor" href="#g">#</a></h1><p>x</p></main>"##;
        assert_eq!(extract_content(html, DocsetType::Generic).title, "F# guide");
    }

    #[test]
    fn test_strip_anchor_glyph() {
        assert_eq!(strip_anchor_glyph("asyncio¶"), "asyncio");
        assert_eq!(strip_anchor_glyph("Install #"), "Install");
        assert_eq!(strip_anchor_glyph("Install # ¶"), "Install");
        assert_eq!(strip_anchor_glyph("C#"), "C#");
        assert_eq!(strip_anchor_glyph("#"), "");
    }

    #[test]
    fn test_title_falls_back_to_document_title() {
        let html = r#"<html><head><title>Page Title</title></head>
            <body><main><p>No heading here</p></main></body></html>"#;
        let extracted = extract_content(html, DocsetType::Generic);
        assert_eq!(extracted.title, "Page Title");
    }

    #[test]
    fn test_title_empty_when_absent() {
        let extracted = extract_content("<main><p>Just text</p></main>", DocsetType::Generic);
        assert_eq!(extracted.title, "");
        assert!(extracted.content_html.contains("Just text"));
    }

    #[test]
    fn test_empty_root_returns_empty() {
        let html = r#"<body><main><nav>Only navigation</nav></main></body>"#;
        let extracted = extract_content(html, DocsetType::Generic);
        assert!(extracted.is_empty());
        assert_eq!(extracted.title, "");
    }

    #[test]
    fn test_falls_back_to_body() {
        let extracted = extract_content("<p>Loose paragraph</p>", DocsetType::Rustdoc);
        assert!(extracted.content_html.contains("Loose paragraph"));
    }
}
