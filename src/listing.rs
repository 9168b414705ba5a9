//! Listing parsers: payload objects first, rendered cards as fallback.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::fields;
use crate::payload;
use crate::types::{ContentItem, MediaType};

/// Most entries shown for one catalog section.
pub const SECTION_CAP: usize = 20;

pub const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Section,
    Search,
}

impl ListingMode {
    fn cap(self) -> Option<usize> {
        match self {
            ListingMode::Section => Some(SECTION_CAP),
            ListingMode::Search => None,
        }
    }
}

/// Best-effort shallow object scanner.
///
/// Yields every `{...}` span with no brace inside it. An object that nests
/// another object is never yielded whole; only its innermost flat parts are.
pub fn flat_objects(text: &str) -> impl Iterator<Item = &str> {
    static FLAT_OBJECT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("flat object regex should compile"));
    FLAT_OBJECT.find_iter(text).map(|m| m.as_str())
}

/// Flat objects that carry both a numeric `id` and a `media_type`.
pub fn item_fragments(text: &str) -> impl Iterator<Item = &str> {
    flat_objects(text)
        .filter(|frag| frag.contains("\"media_type\"") && fields::extract_id(frag).is_some())
}

/// Builds an item from one object fragment. Requires id and media type.
pub fn assemble_item(fragment: &str) -> Option<ContentItem> {
    let external_id = fields::extract_id(fragment)?;
    let media_type = fields::extract_media_type(fragment)?;
    let title = fields::extract_title_for(fragment, media_type).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    Some(ContentItem {
        external_id,
        media_type,
        title,
        poster_path: fields::extract_poster_path(fragment),
        backdrop_path: fields::extract_backdrop_path(fragment),
        overview: fields::extract_overview(fragment),
        year: fields::extract_year_for(fragment, media_type),
        rating: fields::extract_rating(fragment),
    })
}

pub fn parse_payload_listing(payload: &str, main_url: &str, mode: ListingMode) -> Vec<ContentItem> {
    let items = item_fragments(payload).filter_map(assemble_item);
    finish(items, main_url, mode)
}

pub fn parse_markup_listing(doc: &Html, main_url: &str, mode: ListingMode) -> Vec<ContentItem> {
    let Ok(card_sel) = Selector::parse("div[role=button][aria-label]") else { return Vec::new() };
    let items = doc.select(&card_sel).filter_map(parse_card);
    finish(items, main_url, mode)
}

fn parse_card(card: ElementRef<'_>) -> Option<ContentItem> {
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("digits regex should compile"));
    static YEAR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b([12]\d{3})\b").expect("card year regex should compile"));

    let title = card.value().attr("aria-label").map(str::trim).filter(|t| !t.is_empty())?;

    let link_sel = Selector::parse("a[href^='/movie/'], a[href^='/tv/'], a[href^='/watch/']").ok()?;
    let href = card.select(&link_sel).next()?.value().attr("href")?;
    let external_id = DIGITS.captures(href)?.get(1)?.as_str().to_string();
    let media_type = if href.contains("/movie/") { MediaType::Movie } else { MediaType::Series };

    let img_sel = Selector::parse("img[src*='image.tmdb.org'], img[data-nimg]").ok()?;
    let poster_path = card
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let span_sel = Selector::parse("span").ok()?;
    let year = card
        .select(&span_sel)
        .map(|s| s.text().collect::<String>())
        .find_map(|t| YEAR.captures(&t).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse::<i32>().ok()));

    let mut item = ContentItem::new(external_id, media_type, title);
    item.poster_path = poster_path;
    item.year = year;
    Some(item)
}

/// Dedup by canonical URL (first wins), then apply the mode's cap.
fn finish(items: impl Iterator<Item = ContentItem>, main_url: &str, mode: ListingMode) -> Vec<ContentItem> {
    let mut seen = HashSet::new();
    let deduped = items.filter(|item| seen.insert(item.url(main_url)));
    match mode.cap() {
        Some(cap) => deduped.take(cap).collect(),
        None => deduped.collect(),
    }
}

/// Payload strategy first; markup only when that yields nothing.
pub fn select_listing(doc: &Html, main_url: &str, mode: ListingMode) -> Vec<ContentItem> {
    let payload = payload::extract_payload(doc);
    if !payload.is_empty() {
        let items = parse_payload_listing(&payload, main_url, mode);
        if !items.is_empty() {
            debug!("payload listing: {} items", items.len());
            return items;
        }
    }
    let items = parse_markup_listing(doc, main_url, mode);
    debug!("markup listing: {} items (payload {} bytes)", items.len(), payload.len());
    items
}
