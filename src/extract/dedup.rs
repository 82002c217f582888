use super::patterns::{date_time_key, has_venue};
use crate::models::Session;
use std::collections::HashSet;

/// Final venue-preferring pass over a page's sessions.
///
/// Venue-bearing sessions come first, in discovery order. A venue-less
/// session is kept only if no venue-bearing session shares its date-time key
/// and its text was not already emitted. Applying it twice is a no-op.
pub fn filter_duplicate_sessions(sessions: &[Session]) -> Vec<Session> {
    let (with_venue, without_venue): (Vec<&Session>, Vec<&Session>) =
        sessions.iter().partition(|s| has_venue(&s.info));

    let mut filtered: Vec<Session> = Vec::with_capacity(sessions.len());
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut seen_info: HashSet<&str> = HashSet::new();

    for session in with_venue {
        seen_keys.insert(date_time_key(&session.info));
        if seen_info.insert(&session.info) {
            filtered.push(session.clone());
        }
    }

    for session in without_venue {
        if seen_keys.contains(&date_time_key(&session.info)) {
            continue;
        }
        if seen_info.insert(&session.info) {
            filtered.push(session.clone());
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(info: &str) -> Session {
        Session::new(info, "")
    }

    #[test]
    fn test_venue_version_wins() {
        let input = vec![s("30/11 12:00"), s("30/11 12:00 Мариинский театр"), s("1/12 19:00")];
        let out = filter_duplicate_sessions(&input);
        assert_eq!(out, vec![s("30/11 12:00 Мариинский театр"), s("1/12 19:00")]);
    }

    #[test]
    fn test_venue_entries_keep_discovery_order() {
        let input = vec![
            s("2/12 19:00 Новая сцена"),
            s("5/12 12:00"),
            s("1/12 19:00 Мариинский театр"),
        ];
        let out = filter_duplicate_sessions(&input);
        assert_eq!(
            out,
            vec![
                s("2/12 19:00 Новая сцена"),
                s("1/12 19:00 Мариинский театр"),
                s("5/12 12:00"),
            ]
        );
    }

    #[test]
    fn test_verbatim_venue_less_duplicates_collapse() {
        let input = vec![s("5/12 12:00"), Session::new("5/12 12:00", "https://x/buy")];
        assert_eq!(filter_duplicate_sessions(&input), vec![s("5/12 12:00")]);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            s("30/11 12:00"),
            s("30/11 12:00 Мариинский театр"),
            s("1/12 19:00"),
            s("1/12   19:00 продолжительность 2 часа"),
            s("3/12 19:00 БДТ"),
            s("3/12 19:00"),
        ];
        let once = filter_duplicate_sessions(&input);
        let twice = filter_duplicate_sessions(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_venue_precedence_holds_for_every_key() {
        let input = vec![
            s("30/11 12:00"),
            s("30/11 12:00 зал"),
            s("1/12 19:00"),
            s("1/12 19:00 Дворец"),
            s("2/12 19:00"),
        ];
        let out = filter_duplicate_sessions(&input);
        let venue_keys: HashSet<String> = input
            .iter()
            .filter(|x| has_venue(&x.info))
            .map(|x| date_time_key(&x.info))
            .collect();
        for session in &out {
            if !has_venue(&session.info) {
                assert!(!venue_keys.contains(&date_time_key(&session.info)));
            }
        }
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_empty() {
        assert!(filter_duplicate_sessions(&[]).is_empty());
    }
}
