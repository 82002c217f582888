mod bot;
mod config;
mod extract;
mod models;
mod pipeline;
mod render;
mod scraper;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::bot::Bot;
use crate::config::AppConfig;
use crate::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "afisha", about = "Theater and ballet listings scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Vakhtangov theater show pages, cross-referenced with the availability feed
    Vakhtangov {
        /// Print Telegram Markdown instead of console frames
        #[arg(long)]
        markdown: bool,
    },

    /// Ballet pages parsed heuristically for sessions and buy links
    Ballet {
        /// Print Telegram Markdown instead of console frames
        #[arg(long)]
        markdown: bool,
    },

    /// Run session extraction on a saved HTML page
    Extract {
        /// Path to the HTML file
        #[arg(short, long)]
        file: PathBuf,

        /// URL the page was saved from, used to resolve relative buy links
        #[arg(short, long)]
        url: String,
    },

    /// Run the Telegram bot (long polling)
    Bot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "afisha=info,warn",
        1 => "afisha=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Vakhtangov { markdown } => {
            let shows = Pipeline::new(config).run_vakhtangov().await?;
            if markdown {
                println!("{}", render::shows_markdown(&shows));
            } else {
                for show in &shows {
                    println!("{}", render::show_console(show));
                }
            }
        }

        Command::Ballet { markdown } => {
            let listings = Pipeline::new(config).run_ballet().await?;
            if markdown {
                println!("{}", render::listings_markdown(&listings));
            } else {
                for listing in &listings {
                    println!("{}", render::listing_console(listing));
                }
            }
        }

        Command::Extract { file, url } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let listing = extract::extract_listing(&html, &url)?;
            info!("{:?}: {} sessions", file, listing.sessions.len());
            println!("{}", render::listing_console(&listing));
        }

        Command::Bot => {
            Bot::new(Pipeline::new(config))?.run().await?;
        }
    }

    Ok(())
}
