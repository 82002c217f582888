//! Turns candidate text blocks into `Session`s.

use super::patterns::{date_time_key, has_venue, has_venue_lower, looks_like_date_time};
use super::theater::block_theater_names;
use crate::models::Session;
use std::collections::HashSet;

const MIN_VENUE_LINE_CHARS: usize = 10; // exclusive
const MIN_BARE_LINE_CHARS: usize = 8; // exclusive
const MAX_SESSION_CHARS: usize = 300; // exclusive
const NEIGHBOUR_WINDOW: usize = 5;

/// Accumulator shared by every scan pass over one page.
///
/// Keeps discovery order and never holds two sessions with the same `info`.
#[derive(Debug, Default)]
pub struct SessionSet {
    sessions: Vec<Session>,
    seen: HashSet<String>,
}

impl SessionSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn contains(&self, info: &str) -> bool {
        self.seen.contains(info)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[Session] {
        &self.sessions
    }

    pub fn into_vec(self) -> Vec<Session> {
        self.sessions
    }

    /// Returns false when `info` is already present.
    fn push(&mut self, info: String, link: &str) -> bool {
        if !self.seen.insert(info.clone()) {
            return false;
        }
        self.sessions.push(Session::new(info, link));
        true
    }

    /// A venue-bearing session with the same date-time key already exists.
    fn has_venue_version_of(&self, line: &str) -> bool {
        let key = date_time_key(line);
        self.sessions
            .iter()
            .any(|s| date_time_key(&s.info) == key && has_venue(&s.info))
    }

    /// Feed one candidate block, with the buy link resolved for its affordance.
    pub fn add_block(&mut self, text: &str, link: &str) {
        let lines: Vec<&str> = text.split('\n').collect();
        let theater_names = block_theater_names(text);

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() || !looks_like_date_time(line) {
                continue;
            }

            let len = line.chars().count();
            if has_venue(line) {
                if len > MIN_VENUE_LINE_CHARS && len < MAX_SESSION_CHARS {
                    self.push(line.to_string(), link);
                }
                continue;
            }

            if line.split_whitespace().count() < 2 || len <= MIN_BARE_LINE_CHARS {
                continue;
            }

            if self.attach_neighbour_venue(line, idx, &lines, link) {
                continue;
            }
            if self.attach_block_venue(line, &theater_names, link) {
                continue;
            }
            if self.has_venue_version_of(line) {
                continue;
            }
            self.push(line.to_string(), link);
        }
    }

    /// Venue from a line at most five lines away in the same block.
    fn attach_neighbour_venue(&mut self, line: &str, idx: usize, lines: &[&str], link: &str) -> bool {
        let from = idx.saturating_sub(NEIGHBOUR_WINDOW);
        let to = (idx + NEIGHBOUR_WINDOW + 1).min(lines.len());

        for (i, candidate) in lines.iter().enumerate().take(to).skip(from) {
            if i == idx {
                continue;
            }
            let candidate = candidate.trim();
            if candidate.is_empty() || !has_venue_lower(&candidate.to_lowercase()) {
                continue;
            }
            if self.try_accept(merge_lines(line, candidate), link) {
                return true;
            }
        }
        false
    }

    /// Venue names resolved from the whole block, in discovery order.
    fn attach_block_venue(&mut self, line: &str, names: &[String], link: &str) -> bool {
        names
            .iter()
            .any(|name| self.try_accept(merge_lines(line, name), link))
    }

    fn try_accept(&mut self, combined: String, link: &str) -> bool {
        combined.chars().count() < MAX_SESSION_CHARS && self.push(combined, link)
    }
}

/// Join two fragments without repeating one that the other already contains.
fn merge_lines(line: &str, extra: &str) -> String {
    let line_lower = line.to_lowercase();
    let extra_lower = extra.to_lowercase();
    if line_lower.contains(&extra_lower) {
        line.to_string()
    } else if extra_lower.contains(&line_lower) {
        extra.to_string()
    } else {
        format!("{} {}", line, extra)
    }
}
