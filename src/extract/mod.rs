//! Heuristic session extraction for pages with unknown markup.
//!
//! ## Passes
//!
//! Each pass hands raw text blocks to a single `SessionSet` accumulator:
//!   1. table rows / schedule cards holding a "купить билет" control
//!   2. three ancestor levels of every such control
//!   3. its preceding, following and all element siblings
//!   4. any text element carrying a date, a time and a venue keyword
//!   5. elements with ticket/schedule-ish class names holding a buy control
//!
//! The accumulated list then goes through `filter_duplicate_sessions`, which
//! drops venue-less entries shadowed by a venue-bearing one.

pub mod dedup;
pub mod links;
pub mod patterns;
pub mod scan;
pub mod synth;
pub mod theater;

use crate::models::ShowListing;
use anyhow::Result;
use scraper::Html;
use tracing::debug;

pub use self::dedup::filter_duplicate_sessions;
pub use self::scan::PageScanner;
pub use self::synth::SessionSet;

/// Extract a listing from raw HTML fetched from `page_url`.
pub fn extract_listing(html: &str, page_url: &str) -> Result<ShowListing> {
    let doc = Html::parse_document(html);
    extract_from_document(&doc, page_url)
}

pub fn extract_from_document(doc: &Html, page_url: &str) -> Result<ShowListing> {
    let mut scanner = PageScanner::new(doc, page_url)?;
    let mut sessions = SessionSet::new();

    let title = scanner.title();
    scanner.scan(&mut sessions);

    if sessions.is_empty() {
        debug!("{}: no date/time candidates found", page_url);
    }
    let candidates = sessions.into_vec();
    let sessions = filter_duplicate_sessions(&candidates);
    debug!(
        "{}: {} candidates → {} sessions (purchasable={})",
        page_url,
        candidates.len(),
        sessions.len(),
        scanner.purchasable()
    );

    Ok(ShowListing {
        title,
        purchasable: scanner.purchasable(),
        sessions,
    })
}
