//! Error types for the download module.
//!
//! Every variant is a per-job failure: the engine catches these at the job
//! level, counts them, and never lets one abort sibling jobs.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while executing one download job.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport-level failure issuing the GET.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// HTTP error response (anything other than success).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response carried no `content-length`, so completeness of an
    /// existing file cannot be judged.
    #[error("missing content-length downloading {url}")]
    MissingContentLength {
        /// The URL whose response lacked the header.
        url: String,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing content-length error.
    pub fn missing_content_length(url: impl Into<String>) -> Self {
        Self::MissingContentLength { url: url.into() }
    }

    /// Creates an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = DownloadError::http_status("http://example.com/a.mp3", 404);
        assert_eq!(
            err.to_string(),
            "HTTP 404 downloading http://example.com/a.mp3"
        );
    }

    #[test]
    fn test_missing_content_length_display() {
        let err = DownloadError::missing_content_length("http://example.com/a.mp3");
        assert!(err.to_string().contains("missing content-length"));
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: DownloadError = FetchError::timeout("http://example.com/a.mp3").into();
        assert_eq!(err.to_string(), "timeout fetching http://example.com/a.mp3");
    }
}
