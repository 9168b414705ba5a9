use anyhow::{Context, Result};
use futures::Stream;
use reqwest::header::HeaderMap;
use scraper::Html;
use tracing::{debug, warn};

use crate::config::{Config, SECTIONS};
use crate::episodes;
use crate::fields;
use crate::http;
use crate::links::LinkResolver;
use crate::listing::{self, ListingMode, UNKNOWN_TITLE};
use crate::payload;
use crate::types::{ContentItem, ContentRef, DetailRecord, EpisodeRef, MediaType, StreamLink};

#[derive(Debug, Clone)]
pub struct Vibemax {
    client: reqwest::Client,
    config: Config,
    resolver: LinkResolver,
}

impl Vibemax {
    pub fn new(config: Config) -> Result<Self> {
        let client = http::client(&config)?;
        let resolver = LinkResolver::new(client.clone(), config.clone());
        Ok(Self { client, config, resolver })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn watch_url(&self, content: &ContentRef) -> String {
        format!("{}/watch/{}/{}", self.config.main_url, content.media_type.as_path(), content.external_id)
    }

    /// Body of a site page. An error status still yields its body so the
    /// parsers can degrade to empty fields; only an unreachable host fails.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let (status, body) = http::fetch_with_status(&self.client, url, HeaderMap::new())
            .await
            .with_context(|| format!("failed to load {}", url))?;
        if !status.is_success() {
            warn!("{} returned {}, parsing the body anyway", url, status);
        }
        Ok(body)
    }

    async fn fetch_listing(&self, url: &str, mode: ListingMode) -> Result<Vec<ContentItem>> {
        let body = self.fetch_page(url).await?;
        let doc = Html::parse_document(&body);
        Ok(listing::select_listing(&doc, &self.config.main_url, mode))
    }

    /// Every catalog section that produced at least one item, in order.
    pub async fn main_page(&self) -> Vec<(String, Vec<ContentItem>)> {
        let mut sections = Vec::new();
        for (path, name) in SECTIONS {
            match self.list_catalog_section(path).await {
                Ok(items) if !items.is_empty() => sections.push((name.to_string(), items)),
                Ok(_) => debug!("section {} is empty", name),
                Err(err) => warn!("section {} skipped: {:#}", name, err),
            }
        }
        sections
    }

    /// Items of one catalog page, at most [`listing::SECTION_CAP`].
    pub async fn list_catalog_section(&self, section_url: &str) -> Result<Vec<ContentItem>> {
        let url = self.config.resolve(section_url);
        self.fetch_listing(&url, ListingMode::Section).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<ContentItem>> {
        let url = self.config.search_url(query.trim());
        self.fetch_listing(&url, ListingMode::Search).await
    }

    /// Full record for one title. Missing fields stay empty; only an
    /// unreachable host is an error.
    pub async fn load_detail(&self, content: &ContentRef) -> Result<DetailRecord> {
        let url = self.watch_url(content);
        let body = self.fetch_page(&url).await?;
        let item = parse_detail_page(&body, content);
        let episodes = match content.media_type {
            MediaType::Movie => Vec::new(),
            MediaType::Series => self.load_episodes(&content.external_id).await,
        };
        Ok(DetailRecord { item, url, episodes })
    }

    /// Episode grid for a series. Never fails; an unreadable page gives one
    /// season of ten episodes.
    pub async fn load_episodes(&self, external_id: &str) -> Vec<EpisodeRef> {
        let url = self.watch_url(&ContentRef::new(external_id, MediaType::Series));
        match self.fetch_page(&url).await {
            Ok(body) => {
                let payload = payload::extract_payload(&Html::parse_document(&body));
                episodes::from_payload(external_id, &payload)
            }
            Err(err) => {
                warn!("episode counts unavailable for {}: {:#}", external_id, err);
                episodes::fallback(external_id)
            }
        }
    }

    pub fn stream_links(&self, content: &ContentRef) -> impl Stream<Item = StreamLink> + '_ {
        self.resolver.stream(content)
    }

    /// Sends each link to `on_link` as soon as it is found.
    pub async fn resolve_links<F>(&self, content: &ContentRef, on_link: F) -> bool
    where
        F: FnMut(StreamLink),
    {
        self.resolver.resolve(content, on_link).await
    }
}

/// Detail fields from a watch page. Title falls back from the payload to
/// the document title, then to a placeholder.
pub fn parse_detail_page(html: &str, content: &ContentRef) -> ContentItem {
    let doc = Html::parse_document(html);
    let data = payload::extract_payload(&doc);
    let title = fields::extract_title(&data)
        .or_else(|| fields::document_title(&doc))
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    ContentItem {
        external_id: content.external_id.clone(),
        media_type: content.media_type,
        title,
        poster_path: fields::extract_poster_path(&data),
        backdrop_path: fields::extract_backdrop_path(&data),
        overview: fields::extract_overview(&data),
        year: fields::extract_year(&data),
        rating: fields::extract_rating(&data),
    }
}
