//! Best-effort plain-text projection of HTML bodies.
//!
//! Anchors are rendered as `label <href>` so that both the visible text and
//! the link target are scannable. Script and style content is dropped.

use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "div", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "ol", "p", "section", "table", "tr", "ul",
];

const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style"];
const LINK_ELEMENTS: &[&str] = &["a"];

pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.tree.root().descendants() {
        let within = |names: &[&str]| {
            node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| names.contains(&el.name()))
            })
        };
        match node.value() {
            Node::Text(text) => {
                if !within(HIDDEN_ELEMENTS) && !within(LINK_ELEMENTS) {
                    push_text(&mut out, text);
                }
            }
            Node::Element(el) if el.name() == "a" => {
                if within(HIDDEN_ELEMENTS) {
                    continue;
                }
                let mut label = String::new();
                if let Some(anchor) = ElementRef::wrap(node) {
                    for text in anchor.text() {
                        push_text(&mut label, text);
                    }
                }
                push_text(&mut out, &format!(" {label} "));
                if let Some(href) = el.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
                    push_text(&mut out, &format!("<{href}> "));
                }
            }
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => out.push('\n'),
            _ => {}
        }
    }

    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append `text` with internal whitespace collapsed, keeping one separating
/// space where the source had whitespace at either end.
fn push_text(out: &mut String, text: &str) {
    if text.starts_with(char::is_whitespace) {
        push_space(out);
    }
    let mut words = text.split_whitespace();
    if let Some(first) = words.next() {
        out.push_str(first);
        for word in words {
            out.push(' ');
            out.push_str(word);
        }
    }
    if text.ends_with(char::is_whitespace) {
        push_space(out);
    }
}

fn push_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
}
