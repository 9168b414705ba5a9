use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use vibemax::{ContentRef, Vibemax};

mod util;

#[derive(Parser, Debug)]
#[command(name = "vibemax", version, about = "Vibemax CLI: browse, search and resolve stream links", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print debug logs
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every catalog section of the main page
    Home,

    /// List one catalog section (path or URL, e.g. /movies)
    #[command(visible_alias = "ls")]
    Section { url: String },

    /// Search movies and series
    Search { query: String },

    /// Show details of a title (`id|type` reference or watch URL)
    Detail { target: String },

    /// Resolve playable links for a title
    #[command(visible_alias = "get")]
    Links {
        target: String,
        #[arg(short, long)]
        season: Option<u32>,
        #[arg(short, long)]
        episode: Option<u32>,
    },
}

fn parse_target(target: &str) -> Result<ContentRef> {
    let target = target.trim();
    let content = if target.contains("://") || target.starts_with('/') {
        ContentRef::from_url(target)?
    } else {
        ContentRef::parse(target)?
    };
    Ok(content)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_logging(cli.debug);
    let provider = Vibemax::from_env()?;

    match cli.command {
        Commands::Home => {
            let sections = provider.main_page().await;
            if cli.json {
                util::print_json(&sections)?;
            } else if sections.is_empty() {
                println!("{}", "No sections found".red().bold());
            } else {
                for (name, items) in &sections {
                    println!("\n{}", name.green().bold());
                    util::print_items_table(items);
                }
            }
            Ok(())
        }
        Commands::Section { url } => {
            let items = provider.list_catalog_section(&url).await?;
            if cli.json {
                util::print_json(&items)?;
            } else {
                util::print_items_table(&items);
            }
            Ok(())
        }
        Commands::Search { query } => {
            let items = provider.search(&query).await?;
            if cli.json {
                util::print_json(&items)?;
            } else {
                util::print_items_table(&items);
            }
            Ok(())
        }
        Commands::Detail { target } => {
            let content = parse_target(&target)?;
            tracing::debug!("detail: loading {}", content);
            let detail = provider.load_detail(&content).await?;
            if cli.json {
                util::print_json(&detail)?;
            } else {
                util::print_detail_human(&detail);
            }
            Ok(())
        }
        Commands::Links { target, season, episode } => {
            let mut content = parse_target(&target)?;
            if season.is_some() || episode.is_some() {
                let (s, e) = (season.unwrap_or(content.season), episode.unwrap_or(content.episode));
                content = content.with_episode(s, e);
            }
            let mut links = Vec::new();
            let json = cli.json;
            provider
                .resolve_links(&content, |link| {
                    if !json {
                        util::print_link(links.len() + 1, &link);
                    }
                    links.push(link);
                })
                .await;
            if json {
                util::print_json(&links)?;
            } else if links.is_empty() {
                println!("{}", "No links found".red().bold());
            }
            Ok(())
        }
    }
}
