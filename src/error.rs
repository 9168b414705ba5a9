//! Error types for the HTTP seam and content references.
//!
//! Parsing never fails with these: malformed upstream data degrades to
//! `None` or an empty list instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { status: reqwest::StatusCode, url: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("content reference has no id: {0:?}")]
    MissingId(String),
}
