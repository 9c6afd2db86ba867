//! Build configuration from the environment.
//!
//! The build needs three settings: the CMS API base URL (mandatory), the
//! output directory, and the template directory. The canonical site host is
//! derived from the API URL so absolute CMS links can be rewritten to
//! relative paths.

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::{Result, StitchpressError};

/// Environment variable naming the CMS API base URL. Mandatory.
pub const ENV_API_URL: &str = "WP_API_URL";
/// Environment variable overriding the output directory.
pub const ENV_BUILD_DIR: &str = "BUILD_DIR";
/// Environment variable overriding the template directory.
pub const ENV_TEMPLATES_DIR: &str = "TEMPLATES_DIR";

const DEFAULT_BUILD_DIR: &str = "build";
const DEFAULT_TEMPLATES_DIR: &str = "static/templates";

/// Settings for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Base URL of the headless CMS REST API, without a trailing slash.
    pub api_url: String,
    /// Directory the generated site is written to.
    pub build_dir: PathBuf,
    /// Directory holding the HTML templates.
    pub templates_dir: PathBuf,
    /// Canonical public host; absolute URLs on this host (with or without a
    /// leading `wordpress.` label) are rewritten to relative paths.
    pub site_host: String,
}

impl BuildConfig {
    /// Loads the configuration from the environment.
    ///
    /// A missing or empty `WP_API_URL` is a fatal configuration error; the
    /// other variables fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var(ENV_API_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StitchpressError::Config(format!("{} must be set to the CMS API base URL", ENV_API_URL)))?;

        let build_dir = env::var(ENV_BUILD_DIR).unwrap_or_else(|_| DEFAULT_BUILD_DIR.to_string());
        let templates_dir = env::var(ENV_TEMPLATES_DIR).unwrap_or_else(|_| DEFAULT_TEMPLATES_DIR.to_string());

        Self::new(api_url, build_dir.into(), templates_dir.into())
    }

    /// Creates a configuration from explicit values, deriving the site host
    /// from the API URL.
    pub fn new(api_url: String, build_dir: PathBuf, templates_dir: PathBuf) -> Result<Self> {
        let api_url = api_url.trim_end_matches('/').to_string();
        let site_host = site_host_of(&api_url)?;

        Ok(Self { api_url, build_dir, templates_dir, site_host })
    }
}

/// Derives the canonical public host from the API base URL.
///
/// The CMS is served from `wordpress.<host>` or from `<host>` directly; the
/// published site always lives on the bare `<host>`.
fn site_host_of(api_url: &str) -> Result<String> {
    let parsed = Url::parse(api_url).map_err(|e| StitchpressError::InvalidUrl(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| StitchpressError::InvalidUrl(format!("{} has no host", api_url)))?;

    Ok(host.strip_prefix("wordpress.").unwrap_or(host).to_string())
}
