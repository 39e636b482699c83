//! Site adapter: the selectors and URL patterns that tie the crawl engine
//! to one concrete site.
//!
//! Everything site-specific lives here so the crawler, resolver, and engine
//! stay site-agnostic and testable against synthetic documents. A config can
//! be loaded from a JSON file (`--site-config`) or built from the compiled-in
//! defaults for the Science Magazine podcast index.

use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors raised while loading or validating a site config.
#[derive(Debug, Error)]
pub enum SiteConfigError {
    /// Config file could not be read.
    #[error("cannot read site config {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("cannot parse site config {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A link pattern in the config is not a valid regex.
    #[error("invalid {field} pattern {pattern:?}: {source}")]
    Pattern {
        /// Which config field held the pattern.
        field: &'static str,
        /// The offending pattern string.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A CSS selector in the config does not parse.
    #[error("invalid {field} selector {selector:?}")]
    Selector {
        /// Which config field held the selector.
        field: &'static str,
        /// The offending selector string.
        selector: String,
    },
}

/// Patterns, selectors, and URL templates for one crawl target.
///
/// All fields default to the Science Magazine podcast layout, so a JSON
/// config only needs to override the fields that differ.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site root; relative detail links are joined against this.
    pub root_url: String,
    /// Path + query prefix for index pages; the 0-based page number is appended.
    pub index_path: String,
    /// Regex matched against `href` values to find detail-page links.
    pub detail_link_pattern: String,
    /// Regex matched against detail-page `href` values to find the audio asset.
    pub audio_pattern: String,
    /// Regex matched against detail-page `href` values to find the document asset.
    pub document_pattern: String,
    /// CSS selector for the "last page" pagination marker on index page 0.
    pub pagination_selector: String,
    /// CSS selector for the publish-date element on a detail page.
    pub date_selector: String,
    /// Prefix prepended to every derived filename stem.
    pub file_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://www.sciencemag.org".to_string(),
            index_path: "/podcasts?page=".to_string(),
            detail_link_pattern: "^/podcast/".to_string(),
            audio_pattern: r"^http://.*\.mp3$".to_string(),
            document_pattern: r"^https://.*\.pdf$".to_string(),
            pagination_selector: "li.pager-last".to_string(),
            date_selector: "time".to_string(),
            file_prefix: "Science-".to_string(),
        }
    }
}

impl SiteConfig {
    /// Loads a site config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SiteConfigError::Io`] if the file cannot be read and
    /// [`SiteConfigError::Parse`] if it is not valid config JSON.
    pub fn load(path: &Path) -> Result<Self, SiteConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| SiteConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SiteConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks that every pattern and selector in the config compiles.
    ///
    /// Run once at startup so a broken config is a structural error instead
    /// of silently producing empty crawls.
    ///
    /// # Errors
    ///
    /// Returns the first invalid pattern or selector found.
    pub fn validate(&self) -> Result<(), SiteConfigError> {
        for (field, pattern) in [
            ("detail_link", &self.detail_link_pattern),
            ("audio", &self.audio_pattern),
            ("document", &self.document_pattern),
        ] {
            Regex::new(pattern).map_err(|source| SiteConfigError::Pattern {
                field,
                pattern: pattern.clone(),
                source,
            })?;
        }
        for (field, selector) in [
            ("pagination", &self.pagination_selector),
            ("date", &self.date_selector),
        ] {
            if Selector::parse(selector).is_err() {
                return Err(SiteConfigError::Selector {
                    field,
                    selector: selector.clone(),
                });
            }
        }
        Ok(())
    }

    /// URL of the index page with the given 0-based number.
    #[must_use]
    pub fn index_url(&self, page: u32) -> String {
        format!("{}{}{page}", self.root_url, self.index_path)
    }

    /// Joins a possibly-relative `href` against the site root.
    ///
    /// Absolute links pass through unchanged. Falls back to plain
    /// concatenation when the root URL itself does not parse.
    #[must_use]
    pub fn absolutize(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        match Url::parse(&self.root_url).and_then(|root| root.join(href)) {
            Ok(joined) => joined.to_string(),
            Err(_) => format!("{}{href}", self.root_url),
        }
    }

    /// Compiled detail-link regex, or `None` if the pattern is invalid.
    ///
    /// Callers treat `None` as "no links match"; [`Self::validate`] is the
    /// place where an invalid pattern becomes a hard error.
    #[must_use]
    pub fn detail_link_regex(&self) -> Option<Regex> {
        Regex::new(&self.detail_link_pattern).ok()
    }

    /// Compiled audio-asset regex, or `None` if the pattern is invalid.
    #[must_use]
    pub fn audio_regex(&self) -> Option<Regex> {
        Regex::new(&self.audio_pattern).ok()
    }

    /// Compiled document-asset regex, or `None` if the pattern is invalid.
    #[must_use]
    pub fn document_regex(&self) -> Option<Regex> {
        Regex::new(&self.document_pattern).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn test_index_url_appends_page_number() {
        let site = SiteConfig::default();
        assert_eq!(
            site.index_url(0),
            "https://www.sciencemag.org/podcasts?page=0"
        );
        assert_eq!(
            site.index_url(27),
            "https://www.sciencemag.org/podcasts?page=27"
        );
    }

    #[test]
    fn test_absolutize_relative_href() {
        let site = SiteConfig::default();
        assert_eq!(
            site.absolutize("/podcast/episode-1"),
            "https://www.sciencemag.org/podcast/episode-1"
        );
    }

    #[test]
    fn test_absolutize_absolute_href_passthrough() {
        let site = SiteConfig::default();
        assert_eq!(
            site.absolutize("https://cdn.example.com/a.mp3"),
            "https://cdn.example.com/a.mp3"
        );
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let site = SiteConfig {
            audio_pattern: "[unclosed".to_string(),
            ..SiteConfig::default()
        };
        let err = site.validate().unwrap_err();
        assert!(matches!(err, SiteConfigError::Pattern { field: "audio", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_selector() {
        let site = SiteConfig {
            pagination_selector: "li..".to_string(),
            ..SiteConfig::default()
        };
        let err = site.validate().unwrap_err();
        assert!(matches!(
            err,
            SiteConfigError::Selector {
                field: "pagination",
                ..
            }
        ));
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"root_url": "http://localhost:9999"}"#).unwrap();

        let site = SiteConfig::load(&path).unwrap();
        assert_eq!(site.root_url, "http://localhost:9999");
        // Untouched fields keep their defaults.
        assert_eq!(site.file_prefix, "Science-");
        assert_eq!(site.index_url(2), "http://localhost:9999/podcasts?page=2");
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"no_such_field": true}"#).unwrap();

        assert!(matches!(
            SiteConfig::load(&path),
            Err(SiteConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            SiteConfig::load(Path::new("/nonexistent/site.json")),
            Err(SiteConfigError::Io { .. })
        ));
    }
}
