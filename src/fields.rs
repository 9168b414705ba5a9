//! Field extractors over payload text or object fragments.
//!
//! Every extractor walks an ordered list of patterns and returns the first
//! capture found. Numbers that fail to parse or fall outside their range
//! are reported as absent.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::types::MediaType;

/// Suffix the site appends to document titles.
pub const SITE_TITLE_SUFFIX: &str = " - Vibemax";

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($re).expect(concat!(stringify!($name), " regex should compile")));
    };
}

pattern!(ID, r#""id":\s*(\d+)"#);
pattern!(MEDIA_TYPE, r#""media_type":\s*"(movie|tv)""#);
pattern!(TITLE, r#""title":\s*"([^"]+)""#);
pattern!(NAME, r#""name":\s*"([^"]+)""#);
pattern!(POSTER_PATH, r#""poster_path":\s*"([^"]+)""#);
pattern!(BACKDROP_PATH, r#""backdrop_path":\s*"([^"]+)""#);
pattern!(OVERVIEW, r#""overview":\s*"([^"]+)""#);
pattern!(RELEASE_YEAR, r#""release_date":\s*"(\d{4})"#);
pattern!(FIRST_AIR_YEAR, r#""first_air_date":\s*"(\d{4})"#);
pattern!(VOTE_AVERAGE, r#""vote_average":\s*([\d.]+)"#);
pattern!(SEASON_COUNT, r#""number_of_seasons":\s*(\d+)"#);
pattern!(EPISODE_COUNT, r#""number_of_episodes":\s*(\d+)"#);

/// First capture of the first pattern that matches.
pub fn first_match(text: &str, patterns: &[&Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
}

pub fn extract_id(text: &str) -> Option<String> {
    first_match(text, &[&*ID])
}

pub fn extract_media_type(text: &str) -> Option<MediaType> {
    first_match(text, &[&*MEDIA_TYPE]).and_then(|t| MediaType::from_token(&t))
}

/// Title under either spelling, movie key first.
pub fn extract_title(text: &str) -> Option<String> {
    first_match(text, &[&*TITLE, &*NAME])
}

/// Title under the key the given media type uses.
pub fn extract_title_for(text: &str, media_type: MediaType) -> Option<String> {
    match media_type {
        MediaType::Movie => first_match(text, &[&*TITLE]),
        MediaType::Series => first_match(text, &[&*NAME]),
    }
}

pub fn extract_poster_path(text: &str) -> Option<String> {
    first_match(text, &[&*POSTER_PATH])
}

pub fn extract_backdrop_path(text: &str) -> Option<String> {
    first_match(text, &[&*BACKDROP_PATH])
}

pub fn extract_overview(text: &str) -> Option<String> {
    first_match(text, &[&*OVERVIEW])
}

pub fn extract_year(text: &str) -> Option<i32> {
    first_match(text, &[&*RELEASE_YEAR, &*FIRST_AIR_YEAR]).and_then(|y| y.parse().ok())
}

pub fn extract_year_for(text: &str, media_type: MediaType) -> Option<i32> {
    let re: &Regex = match media_type {
        MediaType::Movie => &*RELEASE_YEAR,
        MediaType::Series => &*FIRST_AIR_YEAR,
    };
    first_match(text, &[re]).and_then(|y| y.parse().ok())
}

pub fn extract_rating(text: &str) -> Option<f64> {
    first_match(text, &[&*VOTE_AVERAGE])
        .and_then(|r| r.parse::<f64>().ok())
        .filter(|r| r.is_finite() && (0.0..=10.0).contains(r))
}

pub fn extract_season_count(text: &str) -> Option<u32> {
    first_match(text, &[&*SEASON_COUNT]).and_then(|n| n.parse().ok())
}

pub fn extract_episode_count(text: &str) -> Option<u32> {
    first_match(text, &[&*EPISODE_COUNT]).and_then(|n| n.parse().ok())
}

/// `<title>` text without the site suffix, if anything is left.
pub fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    let text = doc.select(&sel).next()?.text().collect::<String>();
    let title = text.replace(SITE_TITLE_SUFFIX, "").trim().to_string();
    (!title.is_empty()).then_some(title)
}
