//! Heuristic signal extraction from listing URLs and page content.
//!
//! Each extractor is independent and tolerant of absence. Precedence between
//! them is decided by the caller:
//!
//! * rent: URL-embedded price ([`rent_from_url`]) before page text
//!   ([`rent_from_text`]);
//! * BHK: page title before URL ([`bhk_from_text`] on each).
//!
//! All entry points are synchronous. `scraper::Html` is `!Send`, so parsing
//! happens entirely inside these functions and only owned data is returned.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::{DiscoveryConfig, PRICE_MARKER};
use crate::search::is_listing_shape;

/// Title and visible text of a fetched listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub title: Option<String>,
    pub text: String,
}

fn url_price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)for-rs-([0-9][0-9,]*)").expect("url price regex is valid"))
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:₹|\bINR\b|\bRs\b\.?)\s*([0-9][0-9,]*)(?:\s*(k)\b)?")
            .expect("currency regex is valid")
    })
}

fn bare_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9]{4,7}\b").expect("bare number regex is valid"))
}

fn bhk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b([0-9]{1,2})[\s-]*bhk").expect("bhk regex is valid"))
}

fn parse_grouped(digits: &str) -> Option<u64> {
    let cleaned: String = digits.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Price embedded in a listing URL as `for-rs-<digits>`, separators stripped.
pub fn rent_from_url(url: &str) -> Option<u64> {
    let decoded = url.replace("%2C", ",").replace("%2c", ",");
    url_price_re()
        .captures(&decoded)
        .and_then(|caps| parse_grouped(&caps[1]))
}

/// Largest currency-marked amount in `text`.
///
/// Falls back to the largest bare 4–7 digit run when no currency marker is
/// present. The fallback is coarse: pincodes and floor areas match it too.
pub fn rent_from_text(text: &str) -> Option<u64> {
    let marked = currency_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let base = parse_grouped(&caps[1])?;
            if caps.get(2).is_some() {
                base.checked_mul(1000)
            } else {
                Some(base)
            }
        })
        .max();

    if marked.is_some() {
        return marked;
    }

    bare_number_re()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .max()
}

/// `"<N> BHK"` for the first `<N>[-| ]BHK` token in `text`, `N >= 1`.
pub fn bhk_from_text(text: &str) -> Option<String> {
    bhk_re()
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .find(|n| *n > 0)
        .map(|n| format!("{n} BHK"))
}

/// BHK label from the title when present there, else from the URL.
pub fn bhk_from_title_or_url(title: Option<&str>, url: &str) -> Option<String> {
    title.and_then(bhk_from_text).or_else(|| bhk_from_text(url))
}

/// Rent from the URL price token when present, else from page text.
pub fn rent_from_url_or_text(url: &str, text: &str) -> Option<u64> {
    rent_from_url(url).or_else(|| rent_from_text(text))
}

/// Listing-detail links on a probe page.
///
/// Keeps anchors whose href carries both the property path marker and the
/// `for-rs-` price marker. Relative hrefs resolve against the site root.
/// Deduplicated; order is first-seen but carries no meaning.
pub fn listing_urls_from_page(body: &str, config: &DiscoveryConfig) -> Vec<String> {
    let document = Html::parse_document(body);
    let sel = Selector::parse("a[href]").expect("anchor selector is valid");
    let root = url::Url::parse(&config.site_root).ok();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for element in document.select(&sel) {
        let href = element.value().attr("href").unwrap_or("").trim();
        if !href.contains(config.property_marker.as_str()) || !href.contains(PRICE_MARKER) {
            continue;
        }

        let resolved = match &root {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };
        if !is_listing_shape(&resolved, config) {
            tracing::debug!("ignoring off-site listing link {resolved}");
            continue;
        }

        if seen.insert(resolved.clone()) {
            out.push(resolved);
        }
    }
    out
}

/// Title (`<title>`, else first `<h1>`) and visible body text.
pub fn parse_listing_page(body: &str) -> ListingPage {
    let document = Html::parse_document(body);

    let title = first_text(&document, "title").or_else(|| first_text(&document, "h1"));

    let text = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next().map(|b| visible_text(&b)))
        .unwrap_or_default();

    ListingPage { title, text }
}

fn first_text(document: &Html, tag: &str) -> Option<String> {
    let sel = Selector::parse(tag).ok()?;
    let el = document.select(&sel).next()?;
    let text = collapse_ws(&el.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn visible_text(root: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript"))
            .unwrap_or(false);
        if !hidden {
            parts.push(&**text);
        }
    }
    collapse_ws(&parts.join(" "))
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
