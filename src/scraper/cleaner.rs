use chrono::{Datelike, NaiveDateTime, Weekday};

// ── Russian calendar names ────────────────────────────────────────────────────

/// Genitive month name as used in "30 ноября".
pub fn month_genitive(month: u32) -> &'static str {
    match month {
        1 => "января",
        2 => "февраля",
        3 => "марта",
        4 => "апреля",
        5 => "мая",
        6 => "июня",
        7 => "июля",
        8 => "августа",
        9 => "сентября",
        10 => "октября",
        11 => "ноября",
        12 => "декабря",
        _ => "",
    }
}

pub fn weekday_ru(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Понедельник",
        Weekday::Tue => "Вторник",
        Weekday::Wed => "Среда",
        Weekday::Thu => "Четверг",
        Weekday::Fri => "Пятница",
        Weekday::Sat => "Суббота",
        Weekday::Sun => "Воскресенье",
    }
}

// ── Formatters ────────────────────────────────────────────────────────────────

/// "30 ноября"
pub fn format_day_month(dt: &NaiveDateTime) -> String {
    format!("{} {}", dt.day(), month_genitive(dt.month()))
}

/// "30 ноября 2025"
pub fn format_date_with_year(dt: &NaiveDateTime) -> String {
    format!("{} {}", format_day_month(dt), dt.year())
}

/// "19:00"
pub fn format_time(dt: &NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

// ── Titles ────────────────────────────────────────────────────────────────────

/// The feed sometimes spells "ё" as "е"; the page never does.
pub fn titles_match(feed_title: &str, page_title: &str) -> bool {
    feed_title == page_title || feed_title.replace('е', "ё") == page_title
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_formatters() {
        let t = dt(2025, 11, 30, 9, 5);
        assert_eq!(format_day_month(&t), "30 ноября");
        assert_eq!(format_date_with_year(&t), "30 ноября 2025");
        assert_eq!(format_time(&t), "09:05");
        assert_eq!(weekday_ru(t.weekday()), "Воскресенье");
    }

    #[test]
    fn test_month_names_cover_year() {
        assert_eq!(month_genitive(1), "января");
        assert_eq!(month_genitive(5), "мая");
        assert_eq!(month_genitive(12), "декабря");
        assert_eq!(month_genitive(13), "");
    }

    #[test]
    fn test_titles_match() {
        assert!(titles_match("Идиот", "Идиот"));
        assert!(titles_match("Тетка", "Тётка"));
        assert!(!titles_match("Идиот", "Пиковая дама"));
    }
}
