//! Availability feed: a JSON envelope whose `data` field is itself JSON text
//! keyed by stage, then by `YYYY-MM-DD-HH-MM-SS` start time.

use super::http_client::HttpClient;
use crate::models::{FeedEntry, ShowDetail};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{info, warn};

const KEY_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    pub data: String,
}

type StageMap = HashMap<String, HashMap<String, ShowDetail>>;

/// Start time from the feed key, else from the detail's RFC 3339 `start_date`.
fn parse_start(key: &str, detail: &ShowDetail) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(key, KEY_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(detail.start_date.trim())
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Flatten the envelope into entries sorted by start time.
pub fn parse_envelope(envelope: &Envelope) -> Result<Vec<FeedEntry>> {
    let stages: StageMap =
        serde_json::from_str(&envelope.data).context("Feed `data` is not a stage map")?;

    let mut entries = Vec::new();
    for (stage_uid, shows) in stages {
        for (key, detail) in shows {
            let Some(start) = parse_start(&key, &detail) else {
                warn!("Skipping feed entry {:?} ({}): unparseable date", key, detail.title);
                continue;
            };
            entries.push(FeedEntry {
                stage_uid: stage_uid.clone(),
                date_time_key: key,
                start,
                detail,
            });
        }
    }

    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.stage_uid.cmp(&b.stage_uid)));
    Ok(entries)
}

pub async fn fetch_feed(client: &HttpClient, url: &str) -> Result<Vec<FeedEntry>> {
    let envelope: Envelope = client
        .get_json(url)
        .await
        .with_context(|| format!("Failed to fetch availability feed {}", url))?;

    if let Some(created) = envelope.created_at {
        info!("Availability feed created at {}", created);
    }

    let entries = parse_envelope(&envelope)?;
    info!("Availability feed: {} performances", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn envelope(data: serde_json::Value) -> Envelope {
        let raw = serde_json::json!({
            "createdAt": "2025-11-20T10:00:00Z",
            "data": data.to_string(),
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_parse_and_sort() {
        let env = envelope(serde_json::json!({
            "main": {
                "2025-12-01-19-00-00": {"title": "Идиот", "has_tickets": true},
                "2025-11-30-12-00-00": {"title": "Пиковая дама", "sales_on": true}
            },
            "small": {
                "2025-11-30-19-00-00": {"title": "Мёртвые души"}
            }
        }));
        assert!(env.created_at.is_some());

        let entries = parse_envelope(&env).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.detail.title.as_str()).collect();
        assert_eq!(titles, vec!["Пиковая дама", "Мёртвые души", "Идиот"]);
        assert_eq!(entries[1].stage_uid, "small");
        assert!(entries[0].can_buy());
        assert!(!entries[1].can_buy());
        assert_eq!(
            entries[2].start.date(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_start_date_fallback_and_skip() {
        let env = envelope(serde_json::json!({
            "main": {
                "bogus": {"title": "A", "start_date": "2025-12-05T18:30:00+03:00"},
                "worse": {"title": "B", "start_date": "soon"}
            }
        }));
        let entries = parse_envelope(&env).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].detail.title, "A");
        assert_eq!(entries[0].start.hour(), 18);
        assert_eq!(entries[0].start.minute(), 30);
    }

    #[test]
    fn test_bad_data_payload() {
        let env = Envelope {
            created_at: None,
            data: "[1, 2]".into(),
        };
        assert!(parse_envelope(&env).is_err());
    }
}
