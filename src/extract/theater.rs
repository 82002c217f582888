//! Venue-name recovery from the text surrounding a keyword.

use super::patterns::normalize_whitespace;

const WINDOW_BEFORE: usize = 50;
const WINDOW_AFTER: usize = 150;
const MAX_NAME_CHARS: usize = 100;

/// Keyword families tried against a whole block, in order.
const PRIMARY_MARKER: &str = "мариинский";
const SECOND_MARKER: &str = "бдт";
const GENERIC_MARKER: &str = "театр";

/// Char index of the first case-insensitive occurrence of `keyword_lower`.
fn find_ci(text: &str, keyword_lower: &str) -> Option<usize> {
    if keyword_lower.is_empty() {
        return None;
    }
    text.char_indices().enumerate().find_map(|(ci, (bi, _))| {
        let mut rest = text[bi..].chars().flat_map(char::to_lowercase);
        keyword_lower
            .chars()
            .all(|k| rest.next() == Some(k))
            .then_some(ci)
    })
}

/// Keep whole words while the result stays within `max` characters.
fn truncate_words(line: &str, max: usize) -> String {
    let mut result = String::new();
    let mut len = 0;
    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if result.is_empty() { word_len } else { word_len + 1 };
        if len + needed > max {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
        len += needed;
    }
    result
}

/// Venue name around the first occurrence of `keyword` in `text`.
///
/// Looks at `[idx - 50, idx + 150)` characters (clamped to the text and
/// narrowed so neither edge cuts through a word), returns
/// the first line of that window containing the keyword with whitespace
/// collapsed and cut to at most 100 characters on a word boundary. Empty when
/// the keyword does not occur.
pub fn extract_theater_name(text: &str, keyword: &str) -> String {
    let keyword_lower = keyword.to_lowercase();
    let Some(idx) = find_ci(text, &keyword_lower) else {
        return String::new();
    };

    let chars: Vec<char> = text.chars().collect();
    let keyword_end = idx + keyword_lower.chars().count();

    // both edges snap inward to whitespace
    let mut start = idx.saturating_sub(WINDOW_BEFORE);
    if start > 0 && !chars[start - 1].is_whitespace() {
        while start < idx && !chars[start].is_whitespace() {
            start += 1;
        }
    }
    let mut end = (idx + WINDOW_AFTER).min(chars.len());
    if end < chars.len() && !chars[end].is_whitespace() {
        while end > keyword_end && !chars[end - 1].is_whitespace() {
            end -= 1;
        }
    }
    let window: String = chars[start..end].iter().collect();

    window
        .split('\n')
        .find(|line| line.to_lowercase().contains(&keyword_lower))
        .map(|line| {
            let line = normalize_whitespace(line);
            if line.chars().count() > MAX_NAME_CHARS {
                truncate_words(&line, MAX_NAME_CHARS)
            } else {
                line
            }
        })
        .unwrap_or_default()
}

/// Venue names recoverable from a whole candidate block, in discovery order.
pub fn block_theater_names(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut names = Vec::new();

    if lower.contains(PRIMARY_MARKER) {
        names.push(extract_theater_name(text, PRIMARY_MARKER));
    }
    if lower.contains(SECOND_MARKER) {
        names.push(extract_theater_name(text, SECOND_MARKER));
    }
    if lower.contains(GENERIC_MARKER) && !lower.contains(PRIMARY_MARKER) {
        names.push(extract_theater_name(text, GENERIC_MARKER));
    }

    names.retain(|n| !n.is_empty());
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple() {
        let text = "Балет «Жизель»\nМариинский театр, Историческая сцена\n30/11 19:00";
        assert_eq!(
            extract_theater_name(text, "мариинский"),
            "Мариинский театр, Историческая сцена"
        );
    }

    #[test]
    fn test_extract_absent_keyword() {
        assert_eq!(extract_theater_name("30/11 19:00", "театр"), "");
    }

    #[test]
    fn test_extract_collapses_whitespace() {
        let text = "   Театр   имени\tВахтангова   ";
        assert_eq!(extract_theater_name(text, "театр"), "Театр имени Вахтангова");
    }

    #[test]
    fn test_window_clamped_at_both_ends() {
        let prefix = "x".repeat(10);
        let text = format!("{}театр", prefix);
        assert_eq!(extract_theater_name(&text, "ТЕАТР"), text);
    }

    #[test]
    fn test_truncation_respects_words_and_limit() {
        let words: Vec<String> = (0..40).map(|i| format!("слово{}", i)).collect();
        let text = format!("театр {}", words.join(" "));
        let name = extract_theater_name(&text, "театр");

        assert!(name.chars().count() <= 100);
        assert!(name.starts_with("театр слово0"));
        // every emitted token is a whole word from the source
        for token in name.split(' ') {
            assert!(token == "театр" || words.iter().any(|w| w == token), "{}", token);
        }
    }

    #[test]
    fn test_window_start_does_not_split_a_word() {
        let text = "Государственный академический ордена Ленина и Октябрьской \
                    Революции Мариинский театр оперы и балета";
        let name = extract_theater_name(text, "мариинский");
        assert_eq!(
            name,
            "ордена Ленина и Октябрьской Революции Мариинский театр оперы и балета"
        );
        for token in name.split(' ') {
            assert!(text.split_whitespace().any(|w| w == token), "{}", token);
        }
    }

    #[test]
    fn test_window_end_does_not_split_a_word() {
        // whitespace collapses, so the window line is short enough to skip truncation
        let text = format!("БДТ{}Большойзал", " ".repeat(145));
        assert_eq!(extract_theater_name(&text, "бдт"), "БДТ");
    }

    #[test]
    fn test_only_window_lines_considered() {
        let filler = "a".repeat(200);
        let text = format!("Дворец\n{}\nАлександринский театр", filler);
        // first occurrence of "театр" is far from the "Дворец" line
        assert_eq!(extract_theater_name(&text, "театр"), "Александринский театр");
    }

    #[test]
    fn test_block_theater_names_order() {
        let text = "Мариинский театр\nБДТ им. Товстоногова";
        assert_eq!(
            block_theater_names(text),
            vec!["Мариинский театр".to_string(), "БДТ им. Товстоногова".to_string()]
        );
    }

    #[test]
    fn test_generic_marker_only_without_primary() {
        let text = "Михайловский театр\n30/11 19:00";
        assert_eq!(block_theater_names(text), vec!["Михайловский театр".to_string()]);
        assert!(block_theater_names("30/11 19:00").is_empty());
    }
}
