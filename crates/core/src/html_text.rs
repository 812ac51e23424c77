//! Plain-text extraction from landing-page HTML.

use scraper::{Html, Node};

/// Maximum number of characters of scraped page text passed to the model.
pub const SCRAPE_CHAR_LIMIT: usize = 2_000;

/// Elements whose text is never shown to a visitor.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Convert an HTML document into whitespace-normalized visible text,
/// truncated to at most `max_chars` characters.
///
/// Entities are decoded by the parser; attribute values and comments never
/// reach the output.
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut words: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    truncate_chars(&words.join(" "), max_chars)
}

/// Truncate on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
