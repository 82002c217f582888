use url::Url;

/// Absolute purchase URL for an `href` found on `page_url`.
///
/// Relative references are resolved against the page. Anything that fails to
/// parse yields an empty string; a bad link never fails the page.
pub fn resolve_buy_link(page_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }

    if let Ok(absolute) = Url::parse(href) {
        return absolute.to_string();
    }

    Url::parse(page_url.trim())
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative() {
        assert_eq!(
            resolve_buy_link("https://site.ru/show/x/", "/buy/123"),
            "https://site.ru/buy/123"
        );
    }

    #[test]
    fn test_path_relative() {
        assert_eq!(
            resolve_buy_link("https://site.ru/show/x/", "tickets?id=5"),
            "https://site.ru/show/x/tickets?id=5"
        );
    }

    #[test]
    fn test_absolute_kept() {
        assert_eq!(
            resolve_buy_link("https://site.ru/show/x/", " https://tickets.ru/e/1 "),
            "https://tickets.ru/e/1"
        );
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(resolve_buy_link("https://site.ru/", "   "), "");
        assert_eq!(resolve_buy_link("not a url", "/buy/1"), "");
        assert_eq!(resolve_buy_link("https://site.ru/", "http://[::1"), "");
    }
}
