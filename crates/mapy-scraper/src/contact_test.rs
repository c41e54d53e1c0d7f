use scraper::Html;

use super::*;

const BASE: &str = "https://mapy.com";

fn website_in(html: &str, base: Option<&str>) -> Option<String> {
    let doc = Html::parse_document(html);
    extract_website(doc.root_element(), base)
}

// -----------------------------------------------------------------------
// extract_emails / extract_phones
// -----------------------------------------------------------------------

#[test]
fn contact_line_yields_email_and_phone() {
    let text = "Contact: Jane Doe <jane.doe@example.com>, call +1 (555) 123-4567";
    assert_eq!(extract_emails(text), vec!["jane.doe@example.com"]);
    assert_eq!(extract_phones(text), vec!["+15551234567"]);
}

#[test]
fn emails_dedupe_case_insensitively_keeping_first_spelling() {
    let text = "JANE@Example.COM, jane@example.com; other@mail.cz";
    assert_eq!(
        extract_emails(text),
        vec!["JANE@Example.COM".to_string(), "other@mail.cz".to_string()]
    );
}

#[test]
fn emails_require_a_tld() {
    assert!(extract_emails("user@localhost and @example.com").is_empty());
    assert!(extract_emails("").is_empty());
}

#[test]
fn emails_all_match_pattern() {
    let text = "a.b+c@x-y.org junk @@ foo@bar.c0m x_y%z@sub.domain.info";
    let emails = extract_emails(text);
    assert!(!emails.is_empty());
    for email in &emails {
        assert!(EMAIL_RE.is_match(email), "{email} does not match");
        let (local, domain) = email.split_once('@').unwrap();
        assert!(!local.is_empty());
        assert!(domain.contains('.'));
    }
}

#[test]
fn phones_strip_formatting() {
    assert_eq!(extract_phones("tel. 602 123 456"), vec!["602123456"]);
    assert_eq!(extract_phones("(+420) 224-123-456"), vec!["+420224123456"]);
}

#[test]
fn dotted_numbers_are_not_phones() {
    assert!(extract_phones("Version 2024.10.16.1234 released").is_empty());
    assert!(extract_phones("Price 1.234.567,00 CZK").is_empty());
    assert!(extract_phones("(+420) 224.123.456").is_empty());
}

#[test]
fn phones_dedupe_on_cleaned_form() {
    let text = "555 123 4567 or 555-123-4567 or (555) 123 4567";
    assert_eq!(extract_phones(text), vec!["5551234567"]);
}

#[test]
fn phones_with_too_few_digits_are_dropped() {
    assert!(extract_phones("1 - - - - 2").is_empty());
    assert!(extract_phones("call 12-34").is_empty());
}

#[test]
fn phones_contain_only_digits_and_leading_plus() {
    let text = "+44 20 7946 0958, 020-7946-0958 ext, (0) 1234 5678, 1-2-3-4-5-6-7-8";
    let phones = extract_phones(text);
    assert!(!phones.is_empty());
    for phone in &phones {
        assert!(phone.len() >= 7, "{phone} is too short");
        let body = phone.strip_prefix('+').unwrap_or(phone);
        assert!(body.chars().all(|c| c.is_ascii_digit()), "{phone} has stray chars");
    }
}

// -----------------------------------------------------------------------
// resolve_href / absolutize
// -----------------------------------------------------------------------

#[test]
fn resolve_href_rejects_mailto_and_tel() {
    assert_eq!(resolve_href("mailto:a@b.cz", Some(BASE)), None);
    assert_eq!(resolve_href("tel:+420123456789", Some(BASE)), None);
    assert_eq!(resolve_href("", Some(BASE)), None);
}

#[test]
fn resolve_href_keeps_absolute_urls() {
    assert_eq!(
        resolve_href("http://cafe.example/", Some(BASE)).as_deref(),
        Some("http://cafe.example/")
    );
}

#[test]
fn resolve_href_joins_relative_paths() {
    assert_eq!(
        resolve_href("/place/123", Some("https://mapy.com/")).as_deref(),
        Some("https://mapy.com/place/123")
    );
    assert_eq!(
        resolve_href("place/123", Some("https://mapy.com/en")).as_deref(),
        Some("https://mapy.com/en/place/123")
    );
}

#[test]
fn resolve_href_without_base_is_unresolved() {
    assert_eq!(resolve_href("/place/1", None).as_deref(), Some("/place/1"));
}

#[test]
fn absolutize_handles_both_forms() {
    assert_eq!(absolutize(BASE, "/poi/7"), "https://mapy.com/poi/7");
    assert_eq!(absolutize(BASE, "https://x.cz/a"), "https://x.cz/a");
}

// -----------------------------------------------------------------------
// extract_website
// -----------------------------------------------------------------------

#[test]
fn website_prefers_hinted_anchor() {
    let html = r#"
        <a href="https://facebook.com/cafe">fb</a>
        <a class="website" href="https://cafe-sunrise.cz">web</a>
    "#;
    assert_eq!(
        website_in(html, Some(BASE)).as_deref(),
        Some("https://cafe-sunrise.cz")
    );
}

#[test]
fn website_from_contact_container() {
    let html = r#"
        <a href="https://ads.example.net/">ad</a>
        <div class="contact-info"><a href="mailto:x@y.cz">mail</a></div>
        <div class="contacts"><a href="/redirect?to=cafe">web</a></div>
    "#;
    // `.contact-info a[href]` picks the mailto anchor, which does not resolve,
    // so the next hint wins even though it points at the base site.
    assert_eq!(
        website_in(html, Some(BASE)).as_deref(),
        Some("https://mapy.com/redirect?to=cafe")
    );
}

#[test]
fn website_fallback_skips_self_links_and_mailto() {
    let html = r#"
        <a href="/search?q=cafe">back</a>
        <a href="https://mapy.com/place/2">other</a>
        <a href="mailto:hello@cafe.cz">mail</a>
        <a href="tel:+420111222333">call</a>
        <a href="https://www.cafe.cz/">site</a>
    "#;
    assert_eq!(
        website_in(html, Some(BASE)).as_deref(),
        Some("https://www.cafe.cz/")
    );
}

#[test]
fn website_none_when_only_internal_links() {
    let html = r#"<a href="/a">a</a><a href="https://mapy.com/b">b</a>"#;
    assert_eq!(website_in(html, Some(BASE)), None);
}

#[test]
fn website_without_base_needs_a_host() {
    let html = r#"<a href="/a">a</a><a href="https://cafe.cz">b</a>"#;
    assert_eq!(website_in(html, None).as_deref(), Some("https://cafe.cz"));
}
