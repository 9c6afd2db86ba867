//! Content fetching from the headless CMS API.
//!
//! Collections are paged through with a fixed page size until a short or
//! empty page signals exhaustion. The front page is a singular resource.
//! All requests are sequential; a non-success status surfaces as
//! [`StitchpressError::RemoteFetch`] and aborts the caller's unit of work.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::content::ContentItem;
use crate::media::{MediaAsset, MediaResponse};
use crate::{BuildConfig, Result, StitchpressError};

/// Fixed collection page size.
pub const PER_PAGE: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Stitchpress/1.0)";

/// Field filter for the media endpoint; everything else is dead weight.
const MEDIA_FIELDS: &str = "id,slug,alt_text,media_details,source_url,mime_type";

/// One page's worth of a collection request.
///
/// Pagination is factored over this trait so the stop condition can be
/// tested without a network.
pub(crate) trait PageRequest {
    async fn page(&self, number: usize) -> Result<Vec<ContentItem>>;
}

/// Accumulates pages until one comes back empty or short.
pub(crate) async fn paginate<R: PageRequest>(source: &R) -> Result<Vec<ContentItem>> {
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let batch = source.page(page).await?;
        let count = batch.len();
        items.extend(batch);
        if count == 0 || count < PER_PAGE {
            break;
        }
        page += 1;
    }

    Ok(items)
}

/// Client for the CMS content and media endpoints.
pub struct ContentFetcher {
    client: Client,
    api_url: String,
}

impl ContentFetcher {
    pub fn new(config: &BuildConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(StitchpressError::HttpError)?;

        Ok(Self { client, api_url: config.api_url.clone() })
    }

    /// The HTTP client, shared with the media downloader.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches the distinguished front-page resource.
    pub async fn front_page(&self) -> Result<ContentItem> {
        let url = format!("{}/frontpage", self.api_url);
        let response = self.client.get(&url).send().await?;
        Self::ensure_success(&response, "frontpage")?;

        Ok(response.json().await?)
    }

    /// Fetches a complete collection, transparently paging through it.
    pub async fn collection(&self, endpoint: &str) -> Result<Vec<ContentItem>> {
        let items = paginate(&CollectionPages { fetcher: self, endpoint }).await?;
        debug!(endpoint, count = items.len(), "collection fetched");

        Ok(items)
    }

    /// Fetches media metadata and prepares its download list.
    pub async fn media(&self, id: u64) -> Result<MediaAsset> {
        let endpoint = format!("media/{}", id);
        let url = format!("{}/{}?_fields={}", self.api_url, endpoint, MEDIA_FIELDS);
        let response = self.client.get(&url).send().await?;
        Self::ensure_success(&response, &endpoint)?;

        let raw: MediaResponse = response.json().await?;
        Ok(MediaAsset::from_response(raw))
    }

    fn ensure_success(response: &reqwest::Response, endpoint: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StitchpressError::RemoteFetch { status: status.as_u16(), endpoint: endpoint.to_string() })
        }
    }
}

struct CollectionPages<'a> {
    fetcher: &'a ContentFetcher,
    endpoint: &'a str,
}

impl PageRequest for CollectionPages<'_> {
    async fn page(&self, number: usize) -> Result<Vec<ContentItem>> {
        let url = format!(
            "{}/{}?per_page={}&page={}",
            self.fetcher.api_url, self.endpoint, PER_PAGE, number
        );
        let response = self.fetcher.client.get(&url).send().await?;
        ContentFetcher::ensure_success(&response, self.endpoint)?;

        Ok(response.json().await?)
    }
}
