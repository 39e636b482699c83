//! Index crawling: page-count discovery and index URL enumeration.
//!
//! The crawler fetches index page 0, reads the pagination marker named by the
//! site adapter, and parses the page count out of its text. An absent marker
//! or a failed fetch means the page count is unknown and the crawl is empty;
//! neither is an error.

use tracing::{debug, instrument, warn};

use crate::fetch::HttpClient;
use crate::page;
use crate::site::SiteConfig;

/// Discovers how many index pages a site has and enumerates their URLs.
#[derive(Debug, Clone)]
pub struct IndexCrawler {
    client: HttpClient,
    site: SiteConfig,
}

impl IndexCrawler {
    /// Creates a crawler for one site.
    #[must_use]
    pub fn new(client: HttpClient, site: SiteConfig) -> Self {
        Self { client, site }
    }

    /// Fetches index page 0 and parses the total page count from the
    /// pagination marker.
    ///
    /// Returns `None` when the page cannot be fetched, the marker element is
    /// absent, or its text carries no integer. The caller treats `None` as an
    /// empty crawl.
    #[instrument(skip(self))]
    pub async fn determine_max_page(&self) -> Option<u32> {
        let url = self.site.index_url(0);
        let body = match self.client.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "cannot fetch first index page");
                return None;
            }
        };

        let marker = page::element_text(&body, &self.site.pagination_selector)?;
        let max_page = first_integer(&marker);
        debug!(marker = %marker, ?max_page, "parsed pagination marker");
        max_page
    }

    /// URLs of index pages `0..max_page`, in order.
    ///
    /// Pure function of the page count and the site template; `None` yields
    /// an empty sequence.
    #[must_use]
    pub fn page_urls(&self, max_page: Option<u32>) -> Vec<String> {
        match max_page {
            Some(max) => (0..max).map(|n| self.site.index_url(n)).collect(),
            None => Vec::new(),
        }
    }
}

/// Parses the first run of ASCII digits in `text` as a decimal integer.
///
/// Handles counts of any length; marker text like `"28 ›› Next"` yields 28
/// and `"128 ›› Next"` yields 128.
fn first_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn local_site(server: &MockServer) -> SiteConfig {
        SiteConfig {
            root_url: server.uri(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_first_integer_leading_token() {
        assert_eq!(first_integer("28 \u{203a}\u{203a} Next"), Some(28));
    }

    #[test]
    fn test_first_integer_three_digit_count_not_truncated() {
        assert_eq!(first_integer("128 \u{203a}\u{203a} Next"), Some(128));
    }

    #[test]
    fn test_first_integer_skips_leading_noise() {
        assert_eq!(first_integer("page 42 of many"), Some(42));
    }

    #[test]
    fn test_first_integer_none_without_digits() {
        assert_eq!(first_integer("last \u{bb}"), None);
    }

    #[test]
    fn test_page_urls_enumerates_in_order() {
        let crawler = IndexCrawler::new(HttpClient::new(), SiteConfig::default());
        let urls = crawler.page_urls(Some(3));
        assert_eq!(
            urls,
            vec![
                "https://www.sciencemag.org/podcasts?page=0",
                "https://www.sciencemag.org/podcasts?page=1",
                "https://www.sciencemag.org/podcasts?page=2",
            ]
        );
    }

    #[test]
    fn test_page_urls_empty_without_max_page() {
        let crawler = IndexCrawler::new(HttpClient::new(), SiteConfig::default());
        assert!(crawler.page_urls(None).is_empty());
    }

    #[tokio::test]
    async fn test_determine_max_page_reads_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<ul><li class="pager-last ellipsis last">28 &#8250;&#8250; Next</li></ul>"#,
            ))
            .mount(&server)
            .await;

        let crawler = IndexCrawler::new(HttpClient::new(), local_site(&server));
        assert_eq!(crawler.determine_max_page().await, Some(28));
    }

    #[tokio::test]
    async fn test_determine_max_page_none_without_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>no pager here</p>"))
            .mount(&server)
            .await;

        let crawler = IndexCrawler::new(HttpClient::new(), local_site(&server));
        assert_eq!(crawler.determine_max_page().await, None);
    }

    #[tokio::test]
    async fn test_determine_max_page_none_on_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let crawler = IndexCrawler::new(HttpClient::new(), local_site(&server));
        assert_eq!(crawler.determine_max_page().await, None);
    }
}
