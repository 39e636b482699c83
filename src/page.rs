//! Selector and pattern queries over fetched HTML bodies.
//!
//! Pure functions: parse the document, answer the query, never fail. A
//! malformed document, an invalid selector, or a missing element degrades to
//! `None`/empty so one unexpected page cannot abort a crawl.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};

/// Returns the `href` of the first anchor whose URL matches `pattern`.
#[must_use]
pub fn first_link_matching(body: &str, pattern: &Regex) -> Option<String> {
    let document = Html::parse_document(body);
    let anchors = Selector::parse("a[href]").ok()?;
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| pattern.is_match(href))
        .map(str::to_string)
}

/// Returns the deduplicated set of anchor `href`s matching `pattern`.
#[must_use]
pub fn all_links_matching(body: &str, pattern: &Regex) -> HashSet<String> {
    let document = Html::parse_document(body);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return HashSet::new();
    };
    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| pattern.is_match(href))
        .map(str::to_string)
        .collect()
}

/// Returns the trimmed text of the first element matching `selector`.
///
/// Invalid selectors and empty text both yield `None`.
#[must_use]
pub fn element_text(body: &str, selector: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const INDEX_BODY: &str = r#"
        <html><body>
          <a href="/podcast/ep-1">Episode 1</a>
          <a href="/podcast/ep-2">Episode 2</a>
          <a href="/podcast/ep-1">Episode 1 again</a>
          <a href="/about">About</a>
          <ul><li class="pager-last">28 &#8250;&#8250; Next</li></ul>
        </body></html>
    "#;

    const DETAIL_BODY: &str = r#"
        <html><body>
          <time datetime="2019-04-30">Apr. 30, 2019</time>
          <a href="http://cdn.example.com/show.mp3">listen</a>
          <a href="https://cdn.example.com/transcript.pdf">read</a>
          <a href="https://example.com/unrelated.html">other</a>
        </body></html>
    "#;

    #[test]
    fn test_first_link_matching_picks_first_in_document_order() {
        let pattern = Regex::new(r"^http://.*\.mp3$").unwrap();
        assert_eq!(
            first_link_matching(DETAIL_BODY, &pattern),
            Some("http://cdn.example.com/show.mp3".to_string())
        );
    }

    #[test]
    fn test_first_link_matching_none_when_absent() {
        let pattern = Regex::new(r"^http://.*\.flac$").unwrap();
        assert_eq!(first_link_matching(DETAIL_BODY, &pattern), None);
    }

    #[test]
    fn test_all_links_matching_dedupes_within_page() {
        let pattern = Regex::new("^/podcast/").unwrap();
        let links = all_links_matching(INDEX_BODY, &pattern);
        assert_eq!(links.len(), 2);
        assert!(links.contains("/podcast/ep-1"));
        assert!(links.contains("/podcast/ep-2"));
    }

    #[test]
    fn test_all_links_matching_ignores_non_matching() {
        let pattern = Regex::new("^/podcast/").unwrap();
        let links = all_links_matching(INDEX_BODY, &pattern);
        assert!(!links.contains("/about"));
    }

    #[test]
    fn test_element_text_extracts_and_trims() {
        assert_eq!(
            element_text(DETAIL_BODY, "time"),
            Some("Apr. 30, 2019".to_string())
        );
    }

    #[test]
    fn test_element_text_none_for_missing_element() {
        assert_eq!(element_text(DETAIL_BODY, "li.pager-last"), None);
    }

    #[test]
    fn test_element_text_none_for_invalid_selector() {
        assert_eq!(element_text(DETAIL_BODY, "li.."), None);
    }

    #[test]
    fn test_queries_degrade_on_malformed_html() {
        // html5ever recovers from almost anything; the contract is only that
        // nothing panics and missing data yields empty results.
        let soup = "<a href=<<<>>  <time>";
        let pattern = Regex::new(r"\.mp3$").unwrap();
        assert_eq!(first_link_matching(soup, &pattern), None);
        assert!(all_links_matching(soup, &pattern).is_empty());
        assert_eq!(element_text(soup, "time"), None);
    }

    #[test]
    fn test_pagination_marker_text_readable() {
        let text = element_text(INDEX_BODY, "li.pager-last").unwrap();
        assert!(text.starts_with("28"));
    }
}
