use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RefError;

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/original";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Token used by the site in paths, payloads and content references.
    pub fn as_path(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "tv",
        }
    }

    /// Strict parse of a payload `media_type` value.
    pub fn from_token(token: &str) -> Option<MediaType> {
        match token {
            "movie" => Some(MediaType::Movie),
            "tv" | "series" => Some(MediaType::Series),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub external_id: String,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
}

impl ContentItem {
    pub fn new(external_id: impl Into<String>, media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            media_type,
            title: title.into(),
            poster_path: None,
            backdrop_path: None,
            overview: None,
            year: None,
            rating: None,
        }
    }

    /// Canonical watch page, also the listing deduplication key.
    pub fn url(&self, main_url: &str) -> String {
        format!("{}/watch/{}/{}", main_url, self.media_type.as_path(), self.external_id)
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path.as_deref().map(|p| resolve_image(POSTER_BASE, p))
    }

    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_path.as_deref().map(|p| resolve_image(BACKDROP_BASE, p))
    }

    /// Rating on a 0-100 scale, truncated.
    pub fn score(&self) -> Option<u32> {
        self.rating.map(|r| (r * 10.0) as u32)
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef::new(self.external_id.clone(), self.media_type)
    }
}

fn resolve_image(base: &str, path: &str) -> String {
    if path.starts_with("http") { path.to_string() } else { format!("{}{}", base, path) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(flatten)]
    pub item: ContentItem,
    pub url: String,
    pub episodes: Vec<EpisodeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
    pub label: String,
    pub data: String,
}

impl EpisodeRef {
    pub fn new(external_id: &str, season: u32, episode: u32) -> Self {
        let data = ContentRef::new(external_id, MediaType::Series)
            .with_episode(season, episode)
            .to_string();
        Self { season, episode, label: format!("Episode {}", episode), data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCandidate {
    pub server_index: u8,
    pub embed_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Unknown,
    P360,
    P480,
    P720,
    P1080,
    P2160,
}

impl Quality {
    pub fn from_url(url: &str) -> Quality {
        static RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)(?:^|[^0-9])(360|480|720|1080|2160)p|(?:^|[^0-9a-z])4k(?:[^0-9a-z]|$)")
                .expect("quality regex should compile")
        });
        let Some(caps) = RE.captures(url) else { return Quality::Unknown };
        match caps.get(1).map(|m| m.as_str()) {
            Some("360") => Quality::P360,
            Some("480") => Quality::P480,
            Some("720") => Quality::P720,
            Some("1080") => Quality::P1080,
            _ => Quality::P2160,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Quality::Unknown => "unknown",
            Quality::P360 => "360p",
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::P2160 => "2160p",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamLink {
    pub source_label: String,
    pub url: String,
    pub referer: String,
    pub is_segmented_stream: bool,
    pub quality_hint: Quality,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Identifier threaded between detail loads and link resolution,
/// encoded as `id|type[|season|episode]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub external_id: String,
    pub media_type: MediaType,
    pub season: u32,
    pub episode: u32,
}

impl ContentRef {
    pub fn new(external_id: impl Into<String>, media_type: MediaType) -> Self {
        Self { external_id: external_id.into(), media_type, season: 1, episode: 1 }
    }

    pub fn with_episode(mut self, season: u32, episode: u32) -> Self {
        self.season = season;
        self.episode = episode;
        self
    }

    pub fn parse(data: &str) -> Result<ContentRef, RefError> {
        let mut parts = data.split('|');
        let id = parts.next().unwrap_or("").trim();
        if id.is_empty() {
            return Err(RefError::MissingId(data.to_string()));
        }
        let media_type = parts
            .next()
            .and_then(|t| MediaType::from_token(t.trim()))
            .unwrap_or(MediaType::Movie);
        let season = parts.next().and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(1);
        let episode = parts.next().and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(1);
        Ok(ContentRef { external_id: id.to_string(), media_type, season, episode })
    }

    /// Recover a reference from a site or watch URL.
    pub fn from_url(url: &str) -> Result<ContentRef, RefError> {
        static PATH_ID: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"/(?:movie|tv|watch/movie|watch/tv)/(\d+)").expect("path id regex should compile")
        });
        static ANY_DIGITS: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(\d+)").expect("digits regex should compile"));

        let id = PATH_ID
            .captures(url)
            .or_else(|| ANY_DIGITS.captures(url))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| RefError::MissingId(url.to_string()))?;
        let media_type = if url.contains("/movie/") || url.contains("type=movie") {
            MediaType::Movie
        } else {
            MediaType::Series
        };
        Ok(ContentRef::new(id, media_type))
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.media_type {
            MediaType::Movie => write!(f, "{}|movie", self.external_id),
            MediaType::Series => {
                write!(f, "{}|tv|{}|{}", self.external_id, self.season, self.episode)
            }
        }
    }
}

impl std::str::FromStr for ContentRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentRef::parse(s)
    }
}
