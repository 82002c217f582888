//! Text-level recognisers: date/time fragments, dedup keys, venue markers.

/// Substrings that mark a line as naming a venue. Matched against lowercased text.
pub const VENUE_KEYWORDS: &[&str] = &[
    "мариинский",
    "театр",
    "сцена",
    "бдт",
    "дворец",
    "зал",
    "концерт",
    "филармония",
];

/// Link/button text that marks a purchase affordance.
pub const BUY_PHRASE: &str = "купить билет";

/// Permissive "DD/MM"-ish detector.
///
/// Requires a digit, then a `/` or `.` that is not the last character, then
/// another digit somewhere after it. Calendar ranges are never checked, and
/// once a separator has been accepted later ones are ignored.
pub fn looks_like_date_time(line: &str) -> bool {
    let mut digit_before = false;
    let mut separator = false;
    let mut digit_after = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            if separator {
                digit_after = true;
            } else {
                digit_before = true;
            }
        } else if (c == '/' || c == '.') && digit_before && chars.peek().is_some() {
            separator = true;
        }
    }

    digit_before && separator && digit_after
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join key for "same occurrence" detection: the first two tokens.
///
/// `"30/11    12:00   Мариинский театр"` → `"30/11 12:00"`. When the tokens
/// don't look like a date and a time the first two are still used, so
/// unrelated two-word prefixes can collide.
pub fn date_time_key(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [date, time, ..] => format!("{} {}", date, time),
        _ => tokens.join(" "),
    }
}

/// Whether the (already lowercased) text names a venue.
pub fn has_venue_lower(lower: &str) -> bool {
    VENUE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

pub fn has_venue(text: &str) -> bool {
    has_venue_lower(&text.to_lowercase())
}

/// `/`-or-`.` date marker plus `:` time marker, used by the broad page pass.
pub fn has_date_and_time_markers(text: &str) -> bool {
    (text.contains('/') || text.contains('.')) && text.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_date_time() {
        assert!(looks_like_date_time("30/11 12:00"));
        assert!(looks_like_date_time("30/11"));
        assert!(looks_like_date_time("1.2"));
        assert!(looks_like_date_time("суббота, 30.11 в 19:00"));
        assert!(!looks_like_date_time("hello world"));
        assert!(!looks_like_date_time("12:00"));
        assert!(!looks_like_date_time("30/"));
        assert!(!looks_like_date_time("/11 12"));
        assert!(!looks_like_date_time(""));
    }

    #[test]
    fn test_trailing_separator_is_not_a_separator() {
        // the final '.' is rejected, and no earlier separator exists
        assert!(!looks_like_date_time("Начало в 19."));
    }

    #[test]
    fn test_multiple_separators_accepted() {
        assert!(looks_like_date_time("30/11/2025 19:00"));
        assert!(looks_like_date_time("30.11.2025"));
    }

    #[test]
    fn test_date_time_key() {
        assert_eq!(date_time_key("30/11    12:00   Мариинский театр"), "30/11 12:00");
        assert_eq!(date_time_key("30.11 19:00"), "30.11 19:00");
        assert_eq!(date_time_key("  30/11  "), "30/11");
        assert_eq!(date_time_key(""), "");
    }

    #[test]
    fn test_date_time_key_fallback_collides() {
        // accepted imprecision: non date/time prefixes still form a key
        assert_eq!(date_time_key("Новая сцена 30/11"), "Новая сцена");
        assert_eq!(
            date_time_key("Новая сцена 1/12"),
            date_time_key("Новая сцена 30/11")
        );
    }

    #[test]
    fn test_has_venue_is_case_insensitive() {
        assert!(has_venue("МАРИИНСКИЙ-2"));
        assert!(has_venue("Большой зал филармонии"));
        assert!(has_venue("Историческая сцена"));
        assert!(!has_venue("30/11 12:00"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b   c "), "a b c");
    }
}
