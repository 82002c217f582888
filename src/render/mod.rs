//! Text output: Telegram MarkdownV2 and console frames.

use crate::models::{Show, ShowListing};
use std::fmt::Write;

const MARKDOWN_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

const FRAME_WIDTH: usize = 50;

/// Backslash-escape MarkdownV2 control characters after trimming.
pub fn escape_markdown(s: &str) -> String {
    let s = s.trim();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Inside `(...)` of an inline link only `)` and `\` are special.
fn escape_link_url(url: &str) -> String {
    url.replace('\\', "\\\\").replace(')', "\\)")
}

/// Cut to at most `limit` bytes on a char boundary, marking the cut.
pub fn truncate_message(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n…", &text[..end])
}

fn join_blocks<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join("\n")
}

// ── Markdown ──────────────────────────────────────────────────────────────────

pub fn show_markdown(show: &Show) -> String {
    let mut b = String::new();
    let _ = writeln!(b, "*{}*", escape_markdown(&show.title));
    for inf in &show.info {
        let status = if inf.can_buy { "✅ да" } else { "❌ нет" };
        let _ = writeln!(
            b,
            "• {}, {}, {} — {}",
            escape_markdown(&inf.date),
            escape_markdown(&inf.weekday),
            escape_markdown(&inf.time),
            status
        );
    }
    b
}

pub fn shows_markdown(shows: &[Show]) -> String {
    join_blocks(shows, show_markdown)
}

pub fn listing_markdown(listing: &ShowListing) -> String {
    let mut b = String::new();
    let _ = writeln!(b, "*{}*", escape_markdown(&listing.title));
    let status = if listing.purchasable {
        "✅ Билеты доступны"
    } else {
        "❌ Билеты недоступны"
    };
    let _ = writeln!(b, "{}", status);

    if !listing.sessions.is_empty() {
        b.push_str("\n*Опции покупки:*\n");
        for session in &listing.sessions {
            let _ = writeln!(b, "• {}", escape_markdown(&session.info));
            if !session.buy_link.is_empty() {
                let _ = writeln!(
                    b,
                    "  → [Купить билет]({})",
                    escape_link_url(&session.buy_link)
                );
            }
        }
    }
    b
}

pub fn listings_markdown(listings: &[ShowListing]) -> String {
    join_blocks(listings, listing_markdown)
}

// ── Console ───────────────────────────────────────────────────────────────────

pub fn show_console(show: &Show) -> String {
    let mut out = String::new();
    let rule = "─".repeat(FRAME_WIDTH);
    let _ = writeln!(out, "┌{}┐", rule);
    let _ = writeln!(out, "│ Спектакль: {:<width$}│", show.title, width = FRAME_WIDTH - 12);
    let _ = writeln!(out, "└{}┘", rule);

    for inf in &show.info {
        let status = if inf.can_buy { "да" } else { "нет" };
        let _ = writeln!(out, "Дата:        {}", inf.date);
        let _ = writeln!(out, "День недели: {}", inf.weekday);
        let _ = writeln!(out, "Время:       {}", inf.time);
        let _ = writeln!(out, "Билеты в продаже: {}", status);
        let _ = writeln!(out, "{}", "─".repeat(FRAME_WIDTH + 2));
    }
    out
}

pub fn listing_console(listing: &ShowListing) -> String {
    let mut out = String::new();
    let rule = "═".repeat(60);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Название балета: {}", listing.title);

    if listing.purchasable {
        let _ = writeln!(out, "✅ Билеты доступны для покупки");
        if !listing.sessions.is_empty() {
            let _ = writeln!(out, "\nОпции покупки:");
            for (i, session) in listing.sessions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, session.info);
                if !session.buy_link.is_empty() {
                    let _ = writeln!(out, "     Ссылка: {}", session.buy_link);
                }
            }
        }
    } else {
        let _ = writeln!(out, "❌ Билеты недоступны для покупки");
    }
    let _ = writeln!(out, "{}", rule);
    out
}
