//! Error types for Stitchpress operations.
//!
//! This module defines the main error type [`StitchpressError`] which
//! represents all possible errors that can occur while fetching content,
//! assembling pages, downloading media, and aggregating print documents.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the build and print pipelines.
///
/// The build pipeline distinguishes fatal errors (missing configuration,
/// failed top-level fetches) from per-unit errors that are logged and
/// skipped; both travel through this enum, the caller decides which is
/// which.
#[derive(Error, Debug)]
pub enum StitchpressError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The CMS API answered with a non-success status.
    ///
    /// Returned for the content, listing, and media endpoints; carries the
    /// status code and the endpoint that was being fetched.
    #[error("CMS API returned {status} when fetching {endpoint}")]
    RemoteFetch { status: u16, endpoint: String },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Missing or malformed environment configuration.
    ///
    /// Fatal: raised before any network or filesystem work begins.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTML rewriting errors.
    ///
    /// Returned when the streaming rewriter rejects a template or a content
    /// fragment, typically due to a malformed selector or truncated markup.
    #[error("Failed to rewrite HTML: {0}")]
    HtmlRewrite(String),

    /// Template file could not be read.
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// JSON (de)serialization errors for API payloads and the manifest.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O errors for template reads and output writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for StitchpressError.
pub type Result<T> = std::result::Result<T, StitchpressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_fetch_display() {
        let err = StitchpressError::RemoteFetch { status: 503, endpoint: "pages".to_string() };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("pages"));
    }

    #[test]
    fn test_config_error_display() {
        let err = StitchpressError::Config("WP_API_URL must be set".to_string());
        assert!(err.to_string().contains("WP_API_URL"));
    }

    #[test]
    fn test_template_not_found_display() {
        let err = StitchpressError::TemplateNotFound(PathBuf::from("static/templates/template.html"));
        assert!(err.to_string().contains("template.html"));
    }
}
