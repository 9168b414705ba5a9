//! Stream link resolution across the player's servers.
//!
//! Each server slot first yields its embed URL as a direct link, then the
//! embed page is fetched and scanned for stream URLs. Slots run one after
//! another; a failed probe only drops that slot's scanned links.

use std::collections::BTreeMap;

use futures::{Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::http;
use crate::types::{ContentRef, MediaType, Quality, ServerCandidate, StreamLink};

pub const SOURCE_NAME: &str = "Vibemax";
pub const SERVER_COUNT: u8 = 3;
pub const PROBE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static HLS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(https?://[^\s"']+\.m3u8[^\s"']*)"#).expect("hls url regex should compile")
});
static MP4_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(https?://[^\s"']+\.mp4[^\s"']*)"#).expect("mp4 url regex should compile")
});
static SOURCE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["']?(?:file|src|source)["']?\s*[:=]\s*["']([^"']+)["']"#)
        .expect("source key regex should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scanner {
    Hls,
    Mp4,
    SourceKey,
}

#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: reqwest::Client,
    config: Config,
}

impl LinkResolver {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        Self { client, config }
    }

    pub fn candidates(&self, content: &ContentRef) -> Vec<ServerCandidate> {
        let embed = match content.media_type {
            MediaType::Movie => format!("{}/player/movie/{}", self.config.embed_url, content.external_id),
            MediaType::Series => format!(
                "{}/player/tv/{}/{}/{}",
                self.config.embed_url, content.external_id, content.season, content.episode
            ),
        };
        (0..SERVER_COUNT)
            .map(|i| ServerCandidate {
                server_index: i,
                embed_url: format!("{}?autoplay=true&server={}", embed, i),
            })
            .collect()
    }

    /// The embed URL itself, openable as is.
    pub fn direct_link(&self, candidate: &ServerCandidate) -> StreamLink {
        let mut headers = BTreeMap::new();
        headers.insert("Referer".to_string(), self.config.main_url.clone());
        headers.insert("Origin".to_string(), self.config.main_url.clone());
        StreamLink {
            source_label: server_label(candidate.server_index, None),
            url: candidate.embed_url.clone(),
            referer: self.config.main_url.clone(),
            is_segmented_stream: false,
            quality_hint: Quality::Unknown,
            headers,
        }
    }

    /// Fetch one embed page and scan it.
    pub async fn probe(&self, candidate: &ServerCandidate) -> Result<Vec<StreamLink>, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(PROBE_UA));
        if let Ok(hv) = HeaderValue::from_str(&self.config.main_url) {
            headers.insert(REFERER, hv);
        }
        let body = http::fetch_text(&self.client, &candidate.embed_url, headers).await?;
        Ok(scan_embed(&body, candidate.server_index, &self.config.embed_url))
    }

    /// Lazily yields every link, slot by slot.
    pub fn stream(&self, content: &ContentRef) -> impl Stream<Item = StreamLink> + '_ {
        let candidates = self.candidates(content);
        async_stream::stream! {
            for candidate in candidates {
                yield self.direct_link(&candidate);
                match self.probe(&candidate).await {
                    Ok(links) => {
                        debug!("server {}: {} scanned links", candidate.server_index, links.len());
                        for link in links {
                            yield link;
                        }
                    }
                    Err(err) => warn!("server {} probe skipped: {}", candidate.server_index, err),
                }
            }
        }
    }

    /// Pushes every link into `on_link`. Completes with `true` once all
    /// slots have been tried.
    pub async fn resolve<F>(&self, content: &ContentRef, mut on_link: F) -> bool
    where
        F: FnMut(StreamLink),
    {
        let stream = self.stream(content);
        futures::pin_mut!(stream);
        while let Some(link) = stream.next().await {
            on_link(link);
        }
        true
    }
}

fn server_label(server_index: u8, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => format!("{} - Server {} ({})", SOURCE_NAME, server_index + 1, s),
        None => format!("{} - Server {}", SOURCE_NAME, server_index + 1),
    }
}

/// Runs the three scanners over an embed page body. Matches are not
/// deduplicated across scanners.
pub fn scan_embed(body: &str, server_index: u8, referer: &str) -> Vec<StreamLink> {
    let mut links = Vec::new();
    for scanner in [Scanner::Hls, Scanner::Mp4, Scanner::SourceKey] {
        let (re, suffix): (&Regex, Option<&str>) = match scanner {
            Scanner::Hls => (&*HLS_URL, Some("HLS")),
            Scanner::Mp4 => (&*MP4_URL, Some("MP4")),
            Scanner::SourceKey => (&*SOURCE_KEY, None),
        };
        for cap in re.captures_iter(body) {
            let Some(m) = cap.get(1) else { continue };
            let raw = m.as_str();
            if scanner == Scanner::SourceKey && !(raw.contains(".m3u8") || raw.contains(".mp4")) {
                continue;
            }
            let url = raw.replace('\\', "");
            let is_segmented_stream = match scanner {
                Scanner::Hls => true,
                Scanner::Mp4 => false,
                Scanner::SourceKey => url.contains(".m3u8"),
            };
            links.push(StreamLink {
                source_label: server_label(server_index, suffix),
                quality_hint: Quality::from_url(&url),
                url,
                referer: referer.to_string(),
                is_segmented_stream,
                headers: BTreeMap::new(),
            });
        }
    }
    links
}
