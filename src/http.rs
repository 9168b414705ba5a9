use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;

use crate::config::Config;
use crate::error::FetchError;

fn default_headers(config: &Config) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, ua);
    }
    headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

pub fn client(config: &Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .default_headers(default_headers(config))
        .redirect(reqwest::redirect::Policy::limited(10))
        .cookie_store(true);
    if let Some(proxy) = &config.proxy {
        let px = reqwest::Proxy::all(proxy).with_context(|| format!("invalid proxy {}", proxy))?;
        builder = builder.proxy(px);
    }
    builder.build().context("failed to build HTTP client")
}

/// GET `url` and return the status with the body, whatever the status.
/// Only transport failures are errors.
pub async fn fetch_with_status(
    c: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<(StatusCode, String), FetchError> {
    let network = |source: reqwest::Error| FetchError::Network { url: url.to_string(), source };
    let resp = c.get(url).headers(headers).send().await.map_err(network)?;
    let status = resp.status();
    let body = resp.text().await.map_err(network)?;
    Ok((status, body))
}

/// GET `url` and return the body. Non-success statuses are errors.
pub async fn fetch_text(c: &reqwest::Client, url: &str, headers: HeaderMap) -> Result<String, FetchError> {
    let (status, body) = fetch_with_status(c, url, headers).await?;
    if !status.is_success() {
        return Err(FetchError::Status { status, url: url.to_string() });
    }
    Ok(body)
}
