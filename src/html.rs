//! HTML description cleanup: visible-text extraction and first-link lookup.
//!
//! Markup is parsed permissively with `scraper`; malformed fragments never
//! fail, they just yield whatever text survives parsing.

use scraper::{Html, Node, Selector};

/// Extract the visible text of an HTML fragment.
///
/// Anchor elements are removed together with their nested content, so link
/// label text is dropped too. The remaining text nodes are joined with single
/// spaces, whitespace runs collapse to one space, and the result is trimmed.
/// Empty input yields an empty string.
pub fn extract_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let document = Html::parse_fragment(html);
    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let inside_anchor = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| element.name() == "a")
            });
            if !inside_anchor {
                parts.push(&**text);
            }
        }
    }

    let joined = parts.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Return the `href` of the first anchor, in document order, whose value
/// starts with `http`.
///
/// The prefix match is deliberately loose: it admits any scheme beginning with
/// those four characters. Empty input and fragments without a qualifying
/// anchor yield `None`.
pub fn extract_first_link(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let document = Html::parse_fragment(html);
    let anchors = Selector::parse("a[href]").ok()?;
    document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .find(|href| href.starts_with("http"))
        .map(str::to_string)
}
