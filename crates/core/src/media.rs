//! Media assets: metadata from the CMS and variant downloads.
//!
//! A [`MediaAsset`] describes one remote image and its resampled renditions.
//! Metadata is fetched once; the bytes of every variant are then downloaded
//! into a folder named after the asset's slug. A failed variant download is
//! logged and skipped without aborting its siblings.

use std::fs;
use std::path::Path;

use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Result;

/// Default extension when none can be inferred from the source URL.
const DEFAULT_EXTENSION: &str = ".png";

/// One resampled rendition of a media asset.
#[derive(Debug, Clone)]
pub struct Variant {
    /// Remote source URL for the bytes.
    pub url: String,
    /// Target filename inside the asset folder.
    pub filename: String,
    /// Size label as named by the CMS ("thumbnail", "medium", "full", ...).
    pub size: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Variant {
    /// Whether this variant can participate in responsive image markup.
    pub fn has_dimensions(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

/// One remote image and its ordered set of variants.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub id: u64,
    /// Filesystem-safe folder name for the downloaded files.
    pub slug: String,
    pub alt_text: String,
    pub mime_type: String,
    /// Download list: a synthesized `full` variant first, then each CMS size
    /// in upstream order.
    pub downloads: Vec<Variant>,
}

/// Raw media endpoint payload.
#[derive(Debug, Deserialize)]
pub(crate) struct MediaResponse {
    id: u64,
    slug: String,
    #[serde(default)]
    alt_text: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    media_details: Option<MediaDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaDetails {
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    /// Size label -> variant descriptor, in upstream order (serde_json is
    /// built with `preserve_order`).
    #[serde(default)]
    sizes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SizeEntry {
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl MediaAsset {
    pub(crate) fn from_response(response: MediaResponse) -> Self {
        let details = response.media_details.unwrap_or_default();
        let mut downloads = Vec::new();

        // Full-resolution variant, synthesized from the top-level fields.
        if let Some(url) = &response.source_url {
            downloads.push(Variant {
                url: url.clone(),
                filename: format!("full{}", file_extension(url)),
                size: "full".to_string(),
                width: details.width,
                height: details.height,
            });
        }

        for (size, value) in &details.sizes {
            let Ok(entry) = serde_json::from_value::<SizeEntry>(value.clone()) else {
                warn!(size = %size, "skipping malformed size entry");
                continue;
            };
            if let Some(url) = entry.source_url {
                downloads.push(Variant {
                    filename: format!("{}{}", size, file_extension(&url)),
                    size: size.clone(),
                    width: entry.width,
                    height: entry.height,
                    url,
                });
            }
        }

        Self {
            id: response.id,
            slug: response.slug,
            alt_text: response.alt_text,
            mime_type: response.mime_type,
            downloads,
        }
    }
}

/// Infers a lowercased file extension from a source URL.
pub(crate) fn file_extension(url: &str) -> String {
    let re = Regex::new(r"(?i)\.(png|jpg|jpeg|gif|webp)$").unwrap();
    match re.captures(url) {
        Some(caps) => format!(".{}", caps[1].to_lowercase()),
        None => DEFAULT_EXTENSION.to_string(),
    }
}

/// Downloads every variant of `asset` into `{build_dir}/assets/collection/{slug}`.
///
/// Returns `(downloaded, failed)` counts. A failed variant is logged and
/// skipped; it never aborts the sibling downloads or the build.
pub async fn download_variants(client: &Client, asset: &MediaAsset, build_dir: &Path) -> Result<(usize, usize)> {
    let folder = build_dir.join("assets").join("collection").join(&asset.slug);
    fs::create_dir_all(&folder)?;

    let mut downloaded = 0;
    let mut failed = 0;

    for variant in &asset.downloads {
        match fetch_bytes(client, &variant.url).await {
            Ok(bytes) => {
                fs::write(folder.join(&variant.filename), bytes)?;
                debug!(slug = %asset.slug, file = %variant.filename, "downloaded variant");
                downloaded += 1;
            }
            Err(e) => {
                warn!(slug = %asset.slug, url = %variant.url, error = %e, "variant download failed, skipping");
                failed += 1;
            }
        }
    }

    Ok((downloaded, failed))
}

async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
