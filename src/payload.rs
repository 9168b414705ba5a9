//! Reads the server component stream that the site inlines into its pages.
//!
//! Pages push string chunks through `self.__next_f.push([1,"..."])` calls.
//! The chunks are concatenated in document order and unescaped into one
//! text blob that the field extractors search.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

pub const PUSH_MARKER: &str = "self.__next_f.push";

static PUSH_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"self\.__next_f\.push\(\[1,"(.+?)"\]\)"#).expect("push call regex should compile")
});

/// Concatenated, unescaped payload of every marked script, or an empty
/// string when the page carries none.
pub fn extract_payload(doc: &Html) -> String {
    let Ok(script_sel) = Selector::parse("script") else { return String::new() };
    let mut raw = String::new();
    for script in doc.select(&script_sel) {
        let content = script.text().collect::<String>();
        if !content.contains(PUSH_MARKER) {
            continue;
        }
        for cap in PUSH_CALL.captures_iter(&content) {
            if let Some(m) = cap.get(1) {
                raw.push_str(m.as_str());
            }
        }
    }
    unescape(&raw)
}

/// Quotes, then newlines, then backslashes.
pub fn unescape(raw: &str) -> String {
    raw.replace("\\\"", "\"").replace("\\n", "\n").replace("\\\\", "\\")
}
