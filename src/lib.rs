//! Catalog, detail and stream link client for the Vibemax streaming site.
//!
//! Pages are read from the server component payload the site inlines into
//! its HTML, with a fallback to the rendered cards. Playable links come from
//! probing the player's embed servers.

pub mod config;
pub mod episodes;
pub mod error;
pub mod fields;
pub mod http;
pub mod links;
pub mod listing;
pub mod payload;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{FetchError, RefError};
pub use provider::Vibemax;
pub use types::{ContentItem, ContentRef, DetailRecord, EpisodeRef, MediaType, Quality, ServerCandidate, StreamLink};
