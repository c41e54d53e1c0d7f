//! HTML parsing for search-result pages and place detail pages.
//!
//! Every function here is synchronous and returns owned records, so parsed
//! documents never live across an `.await` in the orchestrator.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::contact::{absolutize, extract_emails, extract_phones, extract_website};
use crate::coordinates::extract_coordinates;
use crate::text::{clean_text, non_empty, normalize_whitespace};
use crate::types::RawRecord;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Card patterns in priority order. Only the first pattern that matches
/// anything is used.
static CARD_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["article", "div.search-result", "div.poi-result", "li"]
        .into_iter()
        .map(selector)
        .collect()
});

static CARD_NAME: LazyLock<Selector> = LazyLock::new(|| selector("h2, h3, .title, .name"));
static CARD_ADDRESS: LazyLock<Selector> =
    LazyLock::new(|| selector(".address, .location, .street"));
static CARD_CATEGORY: LazyLock<Selector> = LazyLock::new(|| selector(".category, .tag"));
static CARD_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static DETAIL_NAME: LazyLock<Selector> = LazyLock::new(|| {
    selector("h1, h2, .poi-title, .business-name, [itemprop='name']")
});
static DETAIL_ADDRESS: LazyLock<Selector> = LazyLock::new(|| {
    selector(".address, .poi-address, [itemprop='address'], [data-testid='address']")
});
static DETAIL_CATEGORY: LazyLock<Selector> =
    LazyLock::new(|| selector(".category, .poi-category, [itemprop='category']"));
static DETAIL_CONTACT: LazyLock<Selector> = LazyLock::new(|| {
    selector(".contact, .contact-info, .contacts, [itemprop='telephone'], [itemprop='email']")
});
static DETAIL_HOURS: LazyLock<Selector> =
    LazyLock::new(|| selector(".opening-hours, .hours, [itemprop='openingHours']"));

/// Cleaned text of the first element under `root` matching `selector`, or
/// `None` when there is no match or it has no text.
fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    non_empty(clean_text(root.select(selector).next()))
}

/// Returns the candidate listing cards on a search-result page.
#[must_use]
pub fn find_listing_cards<'a>(root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    for card_selector in CARD_SELECTORS.iter() {
        let cards: Vec<ElementRef<'a>> = root.select(card_selector).collect();
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

/// Parses one search-result card. Returns `None` when no name can be found.
///
/// The name comes from the first heading-like element, falling back to the
/// card's `aria-label`. The url is the first link, made absolute against
/// `base_url`.
#[must_use]
pub fn parse_listing_card(card: ElementRef<'_>, base_url: &str) -> Option<RawRecord> {
    let name = first_text(card, &CARD_NAME).or_else(|| {
        card.value()
            .attr("aria-label")
            .map(normalize_whitespace)
            .and_then(non_empty)
    })?;

    let url = card
        .select(&CARD_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(|href| absolutize(base_url, href));

    Some(RawRecord {
        name: Some(name),
        address: first_text(card, &CARD_ADDRESS),
        category: first_text(card, &CARD_CATEGORY),
        url,
        ..RawRecord::default()
    })
}

/// Parses a place detail page. Never fails; missing data leaves fields unset.
///
/// Contact elements are concatenated into one text blob and the first email
/// and phone found there are kept. The returned record has no `url`; the
/// caller knows which URL it fetched.
#[must_use]
pub fn parse_detail_page(root: ElementRef<'_>, base_url: &str) -> RawRecord {
    let contact_blob = root
        .select(&DETAIL_CONTACT)
        .map(|el| clean_text(Some(el)))
        .collect::<Vec<_>>()
        .join(" ");

    RawRecord {
        name: first_text(root, &DETAIL_NAME),
        address: first_text(root, &DETAIL_ADDRESS),
        category: first_text(root, &DETAIL_CATEGORY),
        email: extract_emails(&contact_blob).into_iter().next(),
        phone: extract_phones(&contact_blob).into_iter().next(),
        website: extract_website(root, Some(base_url)),
        opening_hours: first_text(root, &DETAIL_HOURS),
        coordinates: extract_coordinates(root),
        ..RawRecord::default()
    }
}

/// Parses a whole search-result page into card records, skipping cards
/// without a name.
#[must_use]
pub fn parse_search_page(html: &str, base_url: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let cards = find_listing_cards(document.root_element());
    tracing::debug!(cards = cards.len(), "listing cards on search page");

    cards
        .into_iter()
        .filter_map(|card| parse_listing_card(card, base_url))
        .collect()
}

/// Parses a detail page from raw HTML.
#[must_use]
pub fn parse_detail_html(html: &str, base_url: &str) -> RawRecord {
    let document = Html::parse_document(html);
    parse_detail_page(document.root_element(), base_url)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
