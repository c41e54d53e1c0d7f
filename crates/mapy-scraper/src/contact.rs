//! Contact extraction: emails and phones from free text, website links from
//! markup, and href resolution.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Selector};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

// ASCII digits only; the cleanup in `extract_phones` keeps nothing else.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?[0-9][0-9\s\-()]{7,}[0-9]").expect("valid phone regex")
});

const MIN_PHONE_DIGITS: usize = 7;

/// Anchors that usually point at the business's own website, most specific
/// first.
static WEBSITE_HINT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "a.website",
        ".contact a[href]",
        ".contact-info a[href]",
        ".contacts a[href]",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// All email addresses in `text`, in first-seen order.
///
/// Duplicates are detected case-insensitively; the first spelling wins.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|email| seen.insert(email.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// All phone numbers in `text`, reduced to digits and a leading `+`.
///
/// Candidates with fewer than seven digits are dropped. Duplicates are
/// detected on the reduced form; first-seen order is kept.
#[must_use]
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phones = Vec::new();

    for m in PHONE_RE.find_iter(text) {
        let cleaned: String = m
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();

        let digits = cleaned.chars().filter(char::is_ascii_digit).count();
        if digits < MIN_PHONE_DIGITS {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            phones.push(cleaned);
        }
    }

    phones
}

/// Finds the business's own website link in a page.
///
/// Tries the contact-area hints first; the first hinted anchor whose href
/// resolves wins. Otherwise returns the first anchor that resolves to an
/// absolute URL on a different host than `base_url`.
#[must_use]
pub fn extract_website(root: ElementRef<'_>, base_url: Option<&str>) -> Option<String> {
    for selector in WEBSITE_HINT_SELECTORS.iter() {
        let Some(link) = root.select(selector).next() else {
            continue;
        };
        if let Some(full) = link
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base_url))
        {
            return Some(full);
        }
    }

    let base_host = base_url
        .and_then(|b| Url::parse(b).ok())
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

    root.select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(href, base_url))
        .find(|full| {
            let Some(host) = Url::parse(full)
                .ok()
                .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            else {
                return false;
            };
            // Self-link check: the base host containing the candidate host
            // also catches `mapy.com` links seen from `www.mapy.com`.
            !base_host
                .as_deref()
                .is_some_and(|base| base.contains(host.as_str()))
        })
}

/// Resolves `href` to an absolute URL for use as a website.
///
/// - `mailto:` / `tel:` / empty: `None` (not a website).
/// - `http://` / `https://`: returned as-is.
/// - relative: joined onto `base_url`; returned unchanged when there is no base.
#[must_use]
pub fn resolve_href(href: &str, base_url: Option<&str>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("mailto:") || href.starts_with("tel:") {
        return None;
    }
    if is_absolute(href) {
        return Some(href.to_string());
    }
    match base_url {
        Some(base) => Some(join_relative(base, href)),
        None => Some(href.to_string()),
    }
}

/// Joins `href` onto `base`, or returns `href` as-is when already absolute.
#[must_use]
pub fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if is_absolute(href) {
        href.to_string()
    } else {
        join_relative(base, href)
    }
}

fn is_absolute(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// The base always gets exactly one trailing slash and the href loses its
/// leading slashes, so `/place/1` and `place/1` resolve under the base path.
fn join_relative(base: &str, href: &str) -> String {
    let base = format!("{}/", base.trim_end_matches('/'));
    let relative = href.trim_start_matches('/');
    match Url::parse(&base).and_then(|b| b.join(relative)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!(base, href, error = %e, "cannot join href onto base; concatenating");
            format!("{base}{relative}")
        }
    }
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
