//! Scan passes that pull candidate text blocks out of a parsed page.

use super::links::resolve_buy_link;
use super::patterns::{BUY_PHRASE, has_date_and_time_markers, has_venue_lower};
use super::synth::SessionSet;
use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const MAX_ANCESTOR_LEVELS: usize = 3;

const ROW_CSS: &str = "table tr, .schedule-item, .event-item, .performance-item, .show-item";
const AFFORDANCE_CSS: &str = "a, button";
const BROAD_CSS: &str =
    "div, span, p, li, td, .event, .performance, .show, .schedule, .afisha-item, .ticket-info";
const CLASS_HINT_CSS: &str =
    "[class*='ticket'], [class*='buy'], [class*='schedule'], [class*='date'], [class*='time']";
const TITLE_CSS: &str = "h1";
const TITLE_FALLBACK_CSS: &str = ".event-title, .title, header h1";

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("selector {:?}: {:?}", css, e))
}

struct Selectors {
    rows: Selector,
    affordances: Selector,
    broad: Selector,
    class_hints: Selector,
    title: Selector,
    title_fallback: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            rows: parse_selector(ROW_CSS)?,
            affordances: parse_selector(AFFORDANCE_CSS)?,
            broad: parse_selector(BROAD_CSS)?,
            class_hints: parse_selector(CLASS_HINT_CSS)?,
            title: parse_selector(TITLE_CSS)?,
            title_fallback: parse_selector(TITLE_FALLBACK_CSS)?,
        })
    }
}

/// Trimmed concatenation of every text node below `el`.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Walks one parsed page, feeding every candidate block into a `SessionSet`.
pub struct PageScanner<'a> {
    doc: &'a Html,
    page_url: &'a str,
    sel: Selectors,
    purchasable: bool,
}

impl<'a> PageScanner<'a> {
    pub fn new(doc: &'a Html, page_url: &'a str) -> Result<Self> {
        Ok(Self {
            doc,
            page_url,
            sel: Selectors::new()?,
            purchasable: false,
        })
    }

    /// Whether any pass (or the page-wide fallback) saw a purchase affordance.
    pub fn purchasable(&self) -> bool {
        self.purchasable
    }

    pub fn title(&self) -> String {
        let first = |sel: &Selector| {
            self.doc
                .select(sel)
                .next()
                .map(element_text)
                .unwrap_or_default()
        };
        let title = first(&self.sel.title);
        if title.is_empty() {
            first(&self.sel.title_fallback)
        } else {
            title
        }
    }

    /// Run every pass in order. None of them short-circuits.
    pub fn scan(&mut self, sessions: &mut SessionSet) {
        let in_rows = self.scan_rows(sessions);
        debug!("{}: {} candidates after row pass", self.page_url, sessions.len());

        let near_links = self.scan_affordance_neighbourhoods(sessions);
        debug!("{}: {} candidates after link pass", self.page_url, sessions.len());

        self.purchasable = in_rows || near_links || self.page_mentions_purchase();

        self.scan_venue_blocks(sessions);
        debug!("{}: {} candidates after venue pass", self.page_url, sessions.len());

        if self.scan_class_hints(sessions) {
            self.purchasable = true;
        }
        debug!("{}: {} candidates after class pass", self.page_url, sessions.len());
    }

    /// Buy link of the last matching affordance under `container` that has an
    /// `href`, or `None` when no affordance matches at all.
    fn nested_affordance(&self, container: ElementRef<'_>, matches: fn(&str) -> bool) -> Option<String> {
        let mut found = false;
        let mut link = String::new();
        for btn in container.select(&self.sel.affordances) {
            if !matches(&element_text(btn).to_lowercase()) {
                continue;
            }
            found = true;
            if let Some(href) = btn.value().attr("href") {
                link = resolve_buy_link(self.page_url, href);
            }
        }
        found.then_some(link)
    }

    fn buy_link_of(&self, btn: ElementRef<'_>) -> String {
        btn.value()
            .attr("href")
            .map(|href| resolve_buy_link(self.page_url, href))
            .unwrap_or_default()
    }

    /// Table rows and schedule cards that contain a buy button.
    fn scan_rows(&self, sessions: &mut SessionSet) -> bool {
        let mut found = false;
        for row in self.doc.select(&self.sel.rows) {
            if let Some(link) = self.nested_affordance(row, is_buy_phrase) {
                found = true;
                sessions.add_block(&element_text(row), &link);
            }
        }
        found
    }

    /// Ancestors (three levels) and siblings of every buy link or button.
    fn scan_affordance_neighbourhoods(&self, sessions: &mut SessionSet) -> bool {
        let mut found = false;
        for btn in self.doc.select(&self.sel.affordances) {
            if !is_buy_phrase(&element_text(btn).to_lowercase()) {
                continue;
            }
            found = true;
            let link = self.buy_link_of(btn);

            for ancestor in btn
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(MAX_ANCESTOR_LEVELS)
            {
                sessions.add_block(&element_text(ancestor), &link);
            }

            for prev in btn.prev_siblings().filter_map(ElementRef::wrap) {
                sessions.add_block(&element_text(prev), &link);
            }

            for next in btn.next_siblings().filter_map(ElementRef::wrap) {
                sessions.add_block(&element_text(next), &link);
            }

            let siblings = btn
                .parent()
                .into_iter()
                .flat_map(|p| p.children())
                .filter(|n| n.id() != btn.id())
                .filter_map(ElementRef::wrap);
            for sibling in siblings {
                sessions.add_block(&element_text(sibling), &link);
            }
        }
        found
    }

    /// Any text element with a date, a time and a venue, regardless of links.
    fn scan_venue_blocks(&self, sessions: &mut SessionSet) {
        for el in self.doc.select(&self.sel.broad) {
            let text = element_text(el);
            if has_date_and_time_markers(&text) && has_venue_lower(&text.to_lowercase()) {
                sessions.add_block(&text, "");
            }
        }
    }

    /// Elements whose class hints at tickets or schedules and that hold a buy control.
    fn scan_class_hints(&self, sessions: &mut SessionSet) -> bool {
        let mut found = false;
        for el in self.doc.select(&self.sel.class_hints) {
            if let Some(link) = self.nested_affordance(el, is_loose_buy_text) {
                found = true;
                sessions.add_block(&element_text(el), &link);
            }
        }
        found
    }

    fn page_mentions_purchase(&self) -> bool {
        self.doc
            .root_element()
            .text()
            .collect::<String>()
            .to_lowercase()
            .contains(BUY_PHRASE)
    }
}

fn is_buy_phrase(lower: &str) -> bool {
    lower.contains(BUY_PHRASE)
}

fn is_loose_buy_text(lower: &str) -> bool {
    lower.contains("купить") || lower.contains("билет")
}
