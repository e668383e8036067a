//! HTML to Markdown conversion
//!
//! Walks the parsed DOM and renders GitHub-flavored Markdown: ATX headings,
//! fenced code blocks, pipe tables, strikethrough and task lists. Output is
//! a pure function of the input markup.

use scraper::{ElementRef, Html, Selector};

/// Elements whose content is never rendered
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "svg", "iframe",
    "button", "select", "textarea",
];

/// Elements rendered as a sequence of blocks
const BLOCK_CONTAINERS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "figure", "figcaption", "details", "summary", "center", "dl", "dd", "li", "form", "fieldset",
    "address", "hgroup", "search",
];

/// Block-level elements with their own rendering
const BLOCK_LEAVES: &[&str] = &[
    "p", "pre", "ul", "ol", "blockquote", "table", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "dt",
];

/// Elements always rendered inline, even if they wrap block markup
const INLINE_TAGS: &[&str] = &[
    "a", "strong", "b", "em", "i", "code", "kbd", "samp", "tt", "del", "s", "strike", "img", "br",
    "input", "span", "small", "sup", "sub", "abbr", "cite", "q", "mark", "u", "time", "var",
    "label",
];

/// Convert HTML (a fragment or a whole document) to Markdown
pub fn html_to_markdown(html: &str) -> String {
    let html = html.replace("&nbsp;", " ").replace('\u{a0}', " ");
    if html.trim().is_empty() {
        return String::new();
    }

    let lower = html.to_ascii_lowercase();
    let document = if lower.contains("<html") || lower.contains("<body") || lower.contains("<!doctype")
    {
        Html::parse_document(&html)
    } else {
        Html::parse_fragment(&html)
    };

    let blocks = render_to_blocks(document.root_element());
    normalize_blank_lines(&blocks.join("\n\n"))
}

/// Accumulates finished blocks plus the inline run currently being built
#[derive(Default)]
struct BlockWriter {
    blocks: Vec<String>,
    inline: String,
}

impl BlockWriter {
    fn flush(&mut self) {
        let paragraph = tidy_inline(&self.inline);
        if !paragraph.is_empty() {
            self.blocks.push(paragraph);
        }
        self.inline.clear();
    }

    fn push_block(&mut self, block: String) {
        self.flush();
        if !block.trim().is_empty() {
            self.blocks.push(block);
        }
    }
}

fn render_to_blocks(el: ElementRef<'_>) -> Vec<String> {
    let mut writer = BlockWriter::default();
    render_children(el, &mut writer);
    writer.flush();
    writer.blocks
}

fn render_children(el: ElementRef<'_>, out: &mut BlockWriter) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.inline.push_str(&collapse_whitespace(text));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            render_element(child_el, out);
        }
    }
}

fn render_element(el: ElementRef<'_>, out: &mut BlockWriter) {
    let name = el.value().name();
    if SKIP_TAGS.contains(&name) {
        return;
    }

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = tidy_inline(&inline_children(el)).replace('\n', " ");
            if text.is_empty() {
                out.flush();
            } else {
                out.push_block(format!("{} {}", "#".repeat(level), text));
            }
        }
        "p" => out.push_block(tidy_inline(&inline_children(el))),
        "pre" => out.push_block(code_block(el)),
        "ul" | "ol" => out.push_block(list(el)),
        "blockquote" => out.push_block(blockquote(el)),
        "table" => out.push_block(table(el)),
        "hr" => out.push_block("---".to_string()),
        "dt" => {
            let term = tidy_inline(&inline_children(el));
            if !term.is_empty() {
                out.push_block(format!("**{}**", term));
            }
        }
        _ if is_block_container(el) => {
            out.flush();
            render_children(el, out);
            out.flush();
        }
        _ => out.inline.push_str(&inline_element(el)),
    }
}

fn is_block_container(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    if BLOCK_CONTAINERS.contains(&name) {
        return true;
    }
    if INLINE_TAGS.contains(&name) {
        return false;
    }
    // Unknown (often custom) elements count as blocks when they wrap block markup
    el.descendants().skip(1).filter_map(ElementRef::wrap).any(|d| {
        let n = d.value().name();
        BLOCK_CONTAINERS.contains(&n) || BLOCK_LEAVES.contains(&n)
    })
}

fn inline_children(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&collapse_whitespace(text));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            out.push_str(&inline_element(child_el));
        }
    }
    out
}

fn inline_element(el: ElementRef<'_>) -> String {
    let name = el.value().name();
    match name {
        "input" => checkbox(el),
        _ if SKIP_TAGS.contains(&name) => String::new(),
        "br" => "\n".to_string(),
        "strong" | "b" => wrap_inline(&inline_children(el), "**"),
        "em" | "i" => wrap_inline(&inline_children(el), "*"),
        "del" | "s" | "strike" => wrap_inline(&inline_children(el), "~~"),
        "code" | "kbd" | "samp" | "tt" => inline_code(el),
        "a" => link(el),
        "img" => image(el),
        _ => inline_children(el),
    }
}

/// Wrap trimmed content in a marker, keeping surrounding spaces outside it
fn wrap_inline(content: &str, marker: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return if content.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let lead = if content.starts_with(' ') { " " } else { "" };
    let trail = if content.ends_with(' ') { " " } else { "" };
    format!("{}{}{}{}{}", lead, marker, trimmed, marker, trail)
}

fn inline_code(el: ElementRef<'_>) -> String {
    let text = collapse_whitespace(&el.text().collect::<String>());
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

/// Anchors without visible text are dropped entirely
fn link(el: ElementRef<'_>) -> String {
    let text = tidy_inline(&inline_children(el)).replace('\n', " ");
    if text.is_empty() {
        return String::new();
    }
    match el.value().attr("href").map(str::trim) {
        Some(href) if !href.is_empty() && !href.starts_with("javascript:") => {
            format!("[{}]({})", text, href)
        }
        _ => text,
    }
}

fn image(el: ElementRef<'_>) -> String {
    let alt = el.value().attr("alt").unwrap_or_default().trim();
    match el.value().attr("src").map(str::trim) {
        Some(src) if !src.is_empty() => format!("![{}]({})", alt, src),
        _ => alt.to_string(),
    }
}

fn checkbox(el: ElementRef<'_>) -> String {
    let is_checkbox = el
        .value()
        .attr("type")
        .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
    if !is_checkbox {
        String::new()
    } else if el.value().attr("checked").is_some() {
        "[x] ".to_string()
    } else {
        "[ ] ".to_string()
    }
}

fn code_block(pre: ElementRef<'_>) -> String {
    let text = pre.text().collect::<String>().replace('\u{a0}', " ");
    let text = text.trim_start_matches('\n').trim_end();
    if text.is_empty() {
        return String::new();
    }

    let language = code_language(pre).unwrap_or_default();
    let fence = "`".repeat(longest_backtick_run(text).max(2) + 1);
    format!("{}{}\n{}\n{}", fence, language, text, fence)
}

/// Language from `language-*`, `lang-*` or Sphinx `highlight-*` classes on
/// the `<pre>`, its `<code>` child, or a wrapping element
fn code_language(pre: ElementRef<'_>) -> Option<String> {
    let code_child = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "code");
    let ancestors = pre.ancestors().filter_map(ElementRef::wrap).take(2);

    code_child
        .into_iter()
        .chain(std::iter::once(pre))
        .chain(ancestors)
        .flat_map(|el| el.value().classes().collect::<Vec<_>>())
        .find_map(|class| {
            ["language-", "lang-", "highlight-"]
                .iter()
                .find_map(|prefix| class.strip_prefix(prefix))
                .filter(|lang| !lang.is_empty() && !matches!(*lang, "default" | "none" | "text"))
                .map(str::to_string)
        })
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn list(el: ElementRef<'_>) -> String {
    let ordered = el.value().name() == "ol";
    let mut number = el
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let mut lines: Vec<String> = Vec::new();
    for item in el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "li")
    {
        let marker = if ordered {
            let m = format!("{}. ", number);
            number += 1;
            m
        } else {
            "- ".to_string()
        };
        let indent = " ".repeat(marker.len());

        let body = render_to_blocks(item).join("\n");
        let mut body_lines = body.lines();
        let first = body_lines.next().unwrap_or_default();
        lines.push(format!("{}{}", marker, first).trim_end().to_string());
        for line in body_lines {
            if line.trim().is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{}{}", indent, line));
            }
        }
    }
    lines.join("\n")
}

fn blockquote(el: ElementRef<'_>) -> String {
    render_to_blocks(el)
        .join("\n\n")
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn table(el: ElementRef<'_>) -> String {
    let (row_selector, cell_selector) = match (Selector::parse("tr"), Selector::parse("th, td")) {
        (Ok(r), Ok(c)) => (r, c),
        _ => return String::new(),
    };

    let mut rows: Vec<Vec<String>> = el
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| {
                    tidy_inline(&inline_children(cell))
                        .replace('\n', " ")
                        .replace('|', "\\|")
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let format_row = |cells: &[String]| format!("| {} |", cells.join(" | "));
    let mut lines = vec![format_row(rows[0].as_slice())];
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows[1..].iter().map(|r| format_row(r.as_slice())));
    lines.join("\n")
}

/// Collapse every whitespace run (including non-breaking spaces) to one space
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }
    result
}

/// Collapse spaces within each line and trim the paragraph
fn tidy_inline(s: &str) -> String {
    s.split('\n')
        .map(|line| line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Keep at most one blank line between blocks and strip trailing spaces,
/// leaving fenced code untouched
fn normalize_blank_lines(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    // Backtick count of the open fence; only a bare run at least as long closes it
    let mut fence: Option<usize> = None;
    let mut blank_run = 0;

    for line in markdown.lines() {
        let marker = line.trim_start();
        let ticks = marker.chars().take_while(|&c| c == '`').count();
        match fence {
            Some(open) if ticks >= open && marker[ticks..].trim().is_empty() => fence = None,
            Some(_) => {
                lines.push(line);
                continue;
            }
            None if ticks >= 3 => fence = Some(ticks),
            None => {}
        }

        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}
