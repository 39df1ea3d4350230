//! Main-text extraction from HTML
//!
//! Picks the most specific content container (`<article>`, `<main>`, common
//! content classes) that carries a meaningful amount of text, falling back to
//! `<body>`. Text is gathered block by block so paragraphs, headings, list
//! items and table cells end up on separate lines.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

/// Containers tried in order before falling back to `<body>`
const CONTENT_SELECTORS: [&str; 10] = [
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".article-body",
    ".content-body",
    "#article-body",
    "#content",
];

/// Subtrees that never hold main text
const SKIP_TAGS: [&str; 12] = [
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg", "button",
];

/// Elements whose text forms its own line
const BLOCK_TAGS: [&str; 22] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th", "tr", "blockquote", "pre",
    "figcaption", "dd", "dt", "div", "section", "article", "main", "table", "br",
];

/// A container must hold at least this many characters to beat `<body>`
const MIN_CANDIDATE_CHARS: usize = 200;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Extract the main text of an HTML document, or `None` if there is none
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(element);
            if text.chars().count() >= MIN_CANDIDATE_CHARS {
                return Some(text);
            }
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let text = element_text(body);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Block-separated, whitespace-normalized text of an element
fn element_text(element: ElementRef) -> String {
    let mut blocks = Vec::new();
    let mut current = String::new();
    collect_blocks(element, &mut blocks, &mut current);
    flush(&mut current, &mut blocks);
    blocks.join("\n")
}

fn collect_blocks(element: ElementRef, blocks: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    flush(current, blocks);
                }
                collect_blocks(child_element, blocks, current);
                if is_block {
                    flush(current, blocks);
                }
            }
            _ => {}
        }
    }
}

fn flush(current: &mut String, blocks: &mut Vec<String>) {
    let normalized = whitespace().replace_all(current, " ");
    let normalized = normalized.trim();
    if !normalized.is_empty() {
        blocks.push(normalized.to_string());
    }
    current.clear();
}
