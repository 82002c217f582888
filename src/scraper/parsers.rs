use super::cleaner::{format_date_with_year, format_time, titles_match, weekday_ru};
use crate::extract::scan::element_text;
use crate::models::{FeedEntry, Show, ShowInfo};
use anyhow::Result;
use chrono::Datelike;
use scraper::{Html, Selector};

// ── Primary show page ─────────────────────────────────────────────────────────

const SHOW_TITLE_CSS: &str = "header.cover-header h1";

/// Page heading of a primary-source show page; empty when the layout changed.
pub fn parse_show_title(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(SHOW_TITLE_CSS)
        .map_err(|e| anyhow::anyhow!("title selector: {:?}", e))?;

    Ok(doc
        .select(&sel)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(""))
}

/// Session rows for `title`, taken from the availability feed.
pub fn sessions_for_title(title: &str, feed: &[FeedEntry]) -> Vec<ShowInfo> {
    feed.iter()
        .filter(|entry| titles_match(&entry.detail.title, title))
        .map(|entry| ShowInfo {
            date: format_date_with_year(&entry.start),
            weekday: weekday_ru(entry.start.weekday()).to_string(),
            time: format_time(&entry.start),
            can_buy: entry.can_buy(),
        })
        .collect()
}

pub fn parse_show_page(html: &str, feed: &[FeedEntry]) -> Result<Show> {
    let title = parse_show_title(html)?;
    let info = sessions_for_title(&title, feed);
    Ok(Show { title, info })
}
