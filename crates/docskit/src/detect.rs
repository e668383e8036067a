//! Docset type detection
//!
//! Design: detection is an ordered list of rules, first match wins. The
//! order encodes confidence: a first-party host is certain, a generator
//! meta tag is explicit, CSS markers are strong hints, URL markers weak ones.

use crate::types::DocsetType;
use scraper::{Html, Selector};
use url::Url;

/// Hosts whose generator is known without looking at the page
const FIRST_PARTY_HOSTS: &[(&str, DocsetType)] = &[
    ("developer.apple.com", DocsetType::Apple),
    ("docs.rs", DocsetType::Rustdoc),
    ("doc.rust-lang.org", DocsetType::Rustdoc),
    ("pkg.go.dev", DocsetType::Godoc),
];

/// Package-documentation hosting markers found in a hostname or path
const URL_MARKERS: &[(&str, DocsetType)] = &[
    ("readthedocs.io", DocsetType::Sphinx),
    ("readthedocs.org", DocsetType::Sphinx),
    ("godoc.org", DocsetType::Godoc),
];

/// Page facts shared by every rule
struct Page {
    document: Html,
    url: Option<Url>,
}

type Rule = fn(&Page) -> Option<DocsetType>;

/// Detection rules in evaluation order
const RULES: &[(&str, Rule)] = &[
    ("first_party_host", first_party_host),
    ("generator_meta", generator_meta),
    ("css_markers", css_markers),
    ("url_markers", url_markers),
];

/// Classify a fetched page by the generator that produced it
///
/// Never fails: missing or malformed markup simply fails each check and
/// the result falls through to [`DocsetType::Generic`].
pub fn detect_docset_type(html: &str, url: &str) -> DocsetType {
    let page = Page {
        document: Html::parse_document(html),
        url: Url::parse(url).ok(),
    };

    for (name, rule) in RULES {
        if let Some(docset_type) = rule(&page) {
            tracing::debug!(rule = name, %docset_type, url, "Detected docset type");
            return docset_type;
        }
    }

    DocsetType::Generic
}

fn first_party_host(page: &Page) -> Option<DocsetType> {
    let host = page.url.as_ref()?.host_str()?.to_lowercase();
    FIRST_PARTY_HOSTS
        .iter()
        .find(|(known, _)| host == *known || host.ends_with(&format!(".{}", known)))
        .map(|(_, t)| *t)
}

fn generator_meta(page: &Page) -> Option<DocsetType> {
    let generator = generator_content(&page.document)?;
    DocsetType::ALL.iter().copied().find(|t| {
        t.generator_keyword()
            .is_some_and(|keyword| generator.contains(keyword))
    })
}

/// Lower-cased content of the first `<meta name="generator">`
fn generator_content(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    document
        .select(&selector)
        .find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
        })
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.to_lowercase())
}

/// CSS selectors specific to one generator's default theme
fn css_markers_for(docset_type: DocsetType) -> &'static [&'static str] {
    match docset_type {
        DocsetType::Docusaurus => &["#__docusaurus", ".theme-doc-markdown"],
        DocsetType::Mkdocs => &[".md-content", ".md-sidebar", "[data-md-component]"],
        DocsetType::Sphinx => &[".sphinxsidebar", ".rst-content", "div.bodywrapper"],
        DocsetType::Typedoc => &["[class*=\"tsd-kind\"]", ".tsd-page-title"],
        DocsetType::Jsdoc => &["a[href*=\"github.com/jsdoc\"]", "#main > h1.page-title"],
        DocsetType::Rustdoc => &["body.rustdoc", "#rustdoc-vars"],
        DocsetType::Pdoc => &["main.pdoc", "#pdoc-search", "div.pdoc"],
        _ => &[],
    }
}

fn css_markers(page: &Page) -> Option<DocsetType> {
    DocsetType::ALL
        .iter()
        .copied()
        .filter(|t| t.generator_keyword().is_some())
        .find(|t| {
            css_markers_for(*t).iter().any(|marker| match Selector::parse(marker) {
                Ok(selector) => page.document.select(&selector).next().is_some(),
                Err(_) => false,
            })
        })
}

fn url_markers(page: &Page) -> Option<DocsetType> {
    let url = page.url.as_ref()?;
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let path = url.path().to_lowercase();
    URL_MARKERS
        .iter()
        .find(|(marker, _)| host.contains(marker) || path.contains(marker))
        .map(|(_, t)| *t)
}
