//! Pipeline orchestrator: ties config → scrapers → results together.
//!
//! ## Fan-out
//!
//! Every configured URL gets its own task; there is no concurrency cap.
//! A single deadline bounds the whole run. When it fires, unfinished tasks are
//! aborted (dropping their in-flight requests) and simply don't appear in the
//! output. Results arrive in completion order, not configuration order.

use crate::config::AppConfig;
use crate::models::{Show, ShowListing};
use crate::scraper::{BalletScraper, PageSource, VakhtangovScraper};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Fetch every URL through `source` concurrently, keeping whatever finishes
/// before `deadline`.
pub async fn fan_out<S: PageSource>(
    source: Arc<S>,
    urls: &[String],
    deadline: Duration,
) -> Vec<S::Output> {
    let started = Instant::now();
    let mut tasks = JoinSet::new();
    for url in urls {
        let source = Arc::clone(&source);
        let url = url.clone();
        tasks.spawn(async move { source.fetch_page(&url).await });
    }

    let mut results = Vec::with_capacity(urls.len());
    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            _ = &mut timer => {
                warn!(
                    "{:.0?} deadline exceeded, dropping {} unfinished page(s)",
                    deadline,
                    tasks.len()
                );
                tasks.abort_all();
                break;
            }
            joined = tasks.join_next() => match joined {
                Some(Ok(output)) => results.push(output),
                Some(Err(e)) => error!("Page task failed: {}", e),
                None => break,
            },
        }
    }

    info!(
        "Fan-out finished: {}/{} pages in {:.2?}",
        results.len(),
        urls.len(),
        started.elapsed()
    );
    results
}

/// Per-page budget times page count, saturating instead of overflowing.
fn ballet_deadline(page_timeout_secs: u64, pages: usize) -> Duration {
    let pages = u64::try_from(pages).unwrap_or(u64::MAX);
    Duration::from_secs(page_timeout_secs.saturating_mul(pages))
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Ballet pages: each gets `page_timeout_secs` of the shared budget.
    pub async fn run_ballet(&self) -> Result<Vec<ShowListing>> {
        let urls = &self.config.ballet.urls;
        if urls.is_empty() {
            bail!("No ballet URLs configured (set [ballet] urls)");
        }

        let scraper = Arc::new(
            BalletScraper::new(&self.config.scraper).context("Failed to build ballet scraper")?,
        );
        let deadline = ballet_deadline(self.config.ballet.page_timeout_secs, urls.len());

        info!("=== Ballet: {} pages, deadline {:?} ===", urls.len(), deadline);
        let listings = fan_out(scraper, urls, deadline).await;
        info!(
            "=== Ballet done: {}/{} pages, {} sessions ===",
            listings.len(),
            urls.len(),
            listings.iter().map(|l| l.sessions.len()).sum::<usize>()
        );
        Ok(listings)
    }

    /// Primary show pages, cross-referenced with the availability feed.
    pub async fn run_vakhtangov(&self) -> Result<Vec<Show>> {
        let cfg = &self.config.vakhtangov;
        if cfg.urls.is_empty() {
            bail!("No show URLs configured (set [vakhtangov] urls)");
        }

        let scraper = Arc::new(
            VakhtangovScraper::with_feed(&self.config.scraper, &cfg.feed_url)
                .await
                .context("Failed to load availability feed")?,
        );
        let deadline = Duration::from_secs(cfg.deadline_secs);

        info!("=== Shows: {} pages, deadline {:?} ===", cfg.urls.len(), deadline);
        let shows = fan_out(scraper, &cfg.urls, deadline).await;
        info!("=== Shows done: {}/{} pages ===", shows.len(), cfg.urls.len());
        Ok(shows)
    }
}
