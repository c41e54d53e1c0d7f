//! Text extraction and whitespace normalization for parsed markup.

use scraper::{ElementRef, Html};

/// Visible text of `node` with whitespace runs collapsed to single spaces.
///
/// Text fragments are joined with a space, so `<b>Cafe</b><i>Sunrise</i>`
/// reads as `"Cafe Sunrise"`. An absent node yields an empty string.
#[must_use]
pub fn clean_text(node: Option<ElementRef<'_>>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    node.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses whitespace runs in `text` to single spaces and trims both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `html` and returns the cleaned text of the whole document.
#[must_use]
pub fn text_of_html(html: &str) -> String {
    let document = Html::parse_document(html);
    clean_text(Some(document.root_element()))
}

/// `Some(text)` when `text` is non-empty.
pub(crate) fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
