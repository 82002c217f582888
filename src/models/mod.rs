use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Title used for a page that could not be fetched or parsed (ballet source).
pub const FAILED_LISTING_TITLE: &str = "Ошибка";

/// Title used for a page that could not be fetched or parsed (primary source).
pub const FAILED_SHOW_TITLE: &str = "Error";

// ── Ballet listing (heuristic source) ────────────────────────────────────────

/// One scraped ballet page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShowListing {
    pub title: String,
    /// Any purchase affordance was seen anywhere on the page.
    pub purchasable: bool,
    pub sessions: Vec<Session>,
}

impl ShowListing {
    /// Placeholder for a page that failed upstream of extraction.
    pub fn failed() -> Self {
        Self {
            title: FAILED_LISTING_TITLE.to_string(),
            purchasable: false,
            sessions: Vec::new(),
        }
    }
}

/// One candidate performance: free text with date/time and ideally a venue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub info: String,
    pub buy_link: String, // absolute, or empty when none was found
}

impl Session {
    pub fn new(info: impl Into<String>, buy_link: impl Into<String>) -> Self {
        Self {
            info: info.into(),
            buy_link: buy_link.into(),
        }
    }
}

// ── Primary show page + availability feed ────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub title: String,
    pub info: Vec<ShowInfo>,
}

impl Show {
    pub fn failed() -> Self {
        Self {
            title: FAILED_SHOW_TITLE.to_string(),
            info: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowInfo {
    pub date: String,    // "30 ноября 2025"
    pub weekday: String, // "Воскресенье"
    pub time: String,    // "19:00"
    pub can_buy: bool,
}

/// Per-performance record inside the availability feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShowDetail {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub has_tickets: bool,
    #[serde(default)]
    pub sales_on: bool,
    #[serde(default)]
    pub reveal_dt: String,
    #[serde(default)]
    pub reveal_dt_str: String,
    #[serde(default)]
    pub now: String,
}

/// One feed performance with its start time parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub stage_uid: String,
    pub date_time_key: String, // "YYYY-MM-DD-HH-MM-SS" as keyed in the feed
    pub start: NaiveDateTime,
    pub detail: ShowDetail,
}

impl FeedEntry {
    pub fn can_buy(&self) -> bool {
        self.detail.has_tickets || self.detail.sales_on
    }
}
