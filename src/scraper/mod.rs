pub mod cleaner;
pub mod feed;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::extract::extract_listing;
use crate::models::{FeedEntry, Show, ShowListing};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use self::http_client::HttpClient;
use self::parsers::parse_show_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable per-page source. Never fails: a broken page becomes a placeholder.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Output: Send + 'static;

    async fn fetch_page(&self, url: &str) -> Self::Output;
}

// ── Ballet pages (heuristic extraction) ───────────────────────────────────────

pub struct BalletScraper {
    client: HttpClient,
}

impl BalletScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<ShowListing> {
        let html = self
            .client
            .get_text(url)
            .await
            .with_context(|| format!("Failed to fetch ballet page {}", url))?;
        extract_listing(&html, url).with_context(|| format!("Failed to parse {}", url))
    }
}

#[async_trait]
impl PageSource for BalletScraper {
    type Output = ShowListing;

    async fn fetch_page(&self, url: &str) -> ShowListing {
        info!("Parsing ballet page {}", url);
        match self.try_fetch(url).await {
            Ok(listing) => {
                debug!("{}: {:?} with {} sessions", url, listing.title, listing.sessions.len());
                listing
            }
            Err(e) => {
                warn!("{:#}", e);
                ShowListing::failed()
            }
        }
    }
}

// ── Vakhtangov pages (exact selectors + availability feed) ────────────────────

pub struct VakhtangovScraper {
    client: HttpClient,
    feed: Arc<Vec<FeedEntry>>,
}

impl VakhtangovScraper {
    /// Build a scraper after loading the availability feed with the same client.
    pub async fn with_feed(config: &ScraperConfig, feed_url: &str) -> Result<Self> {
        let client = HttpClient::new(config)?;
        let feed = feed::fetch_feed(&client, feed_url).await?;
        Ok(Self {
            client,
            feed: Arc::new(feed),
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<Show> {
        let html = self
            .client
            .get_text(url)
            .await
            .with_context(|| format!("Failed to fetch show page {}", url))?;
        parse_show_page(&html, &self.feed)
    }
}

#[async_trait]
impl PageSource for VakhtangovScraper {
    type Output = Show;

    async fn fetch_page(&self, url: &str) -> Show {
        info!("Parsing {}", url);
        match self.try_fetch(url).await {
            Ok(show) => {
                if show.info.is_empty() {
                    debug!("{}: no feed entries for {:?}", url, show.title);
                }
                show
            }
            Err(e) => {
                warn!("{:#}", e);
                Show::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> ScraperConfig {
        ScraperConfig {
            timeout_secs: 2,
            max_retries: 0,
            ..ScraperConfig::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_ballet_page_yields_placeholder() {
        let scraper = BalletScraper::new(&offline_config()).unwrap();
        let listing = scraper.fetch_page("http://127.0.0.1:1/show").await;
        assert_eq!(listing, ShowListing::failed());
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_an_error() {
        let result = VakhtangovScraper::with_feed(&offline_config(), "http://127.0.0.1:1/data.json").await;
        assert!(result.is_err());
    }
}
