use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use vibemax::{ContentItem, DetailRecord, StreamLink};

/// Logs go to stderr. `RUST_LOG` wins over `--debug`.
pub fn init_logging(debug: bool) {
    let default = if debug { "vibemax=debug" } else { "vibemax=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Pretty JSON for `--json`. A record that fails to serialize is an error.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

pub fn print_items_table(items: &[ContentItem]) {
    println!("{} {}", "Total".bold(), items.len());

    let index_header = "#";
    let ref_header = "Ref";
    let title_header = "Title";

    let refs: Vec<String> = items.iter().map(|i| i.content_ref().to_string()).collect();
    let index_width = std::cmp::max(index_header.len(), format!("{}", items.len()).len());
    let ref_width = std::cmp::max(ref_header.len(), refs.iter().map(|r| r.len()).max().unwrap_or(0));

    println!(
        "{:<iw$}  {:<rw$}  {}",
        index_header.bold(),
        ref_header.bold(),
        title_header.bold(),
        iw = index_width,
        rw = ref_width
    );
    println!(
        "{:<iw$}  {:<rw$}  {}",
        "-".repeat(index_width),
        "-".repeat(ref_width),
        "-".repeat(10),
        iw = index_width,
        rw = ref_width
    );

    for (idx, (item, r)) in items.iter().zip(&refs).enumerate() {
        let title = match item.year {
            Some(y) => format!("{} ({})", item.title, y),
            None => item.title.clone(),
        };
        println!("{:<iw$}  {:<rw$}  {}", idx + 1, r, title, iw = index_width, rw = ref_width);
    }
}

pub fn print_detail_human(detail: &DetailRecord) {
    let item = &detail.item;
    println!("Title:    {}", item.title.bold());
    println!("Ref:      {}", item.content_ref());
    println!("Page:     {}", detail.url);
    if let Some(y) = item.year {
        println!("Year:     {}", y);
    }
    if let Some(r) = item.rating {
        println!("Rating:   {:.1}", r);
    }
    if let Some(p) = item.poster_url() {
        println!("Poster:   {}", p);
    }
    if let Some(b) = item.backdrop_url() {
        println!("Backdrop: {}", b);
    }
    if let Some(o) = &item.overview {
        println!("Overview:\n{}", o);
    }
    if !detail.episodes.is_empty() {
        let seasons = detail.episodes.iter().map(|e| e.season).max().unwrap_or(0);
        println!("Episodes: {} across {} season(s)", detail.episodes.len(), seasons);
        for e in detail.episodes.iter().take(5) {
            println!("  S{:02}E{:02}  {}  {}", e.season, e.episode, e.label, e.data.dimmed());
        }
        if detail.episodes.len() > 5 {
            println!("  ...");
        }
    }
}

pub fn print_link(n: usize, link: &StreamLink) {
    let kind = if link.is_segmented_stream { "HLS".yellow() } else { "file".normal() };
    println!("{}. {} [{} | {}]", n, link.source_label.bold(), kind, link.quality_hint);
    println!("   {}", link.url.cyan());
    println!("   referer: {}", link.referer.dimmed());
}
