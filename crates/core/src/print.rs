//! Selective print aggregation.
//!
//! Reassembles one printable document out of generated pages: resolve the
//! selection to a slug list (manifest order for "all"), fetch each page,
//! lift out its `<main>` region tagged with the slug, and concatenate in
//! fetch order. The result is rendered into an isolated document that loads
//! only the print stylesheets, for every selection shape alike.
//!
//! Repeated invocations with the same selection reuse the cached document;
//! the cache lock doubles as a single-flight guard, so a trigger that
//! arrives while an aggregation is in flight waits for it and then takes
//! the cached result instead of racing.

use std::borrow::Cow;
use std::path::PathBuf;

use lol_html::{HtmlRewriter, Settings, element};
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::manifest::{AssignmentEntry, MANIFEST_PATH, parse_manifest};
use crate::{Result, StitchpressError};

/// What the user asked to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintSelection {
    /// Every assignment page, in manifest order.
    All,
    /// An explicit slug list, in the given order.
    Slugs(Vec<String>),
    /// One page.
    Single(String),
}

/// Normalized cache key: an explicit slug list is order-insensitive for
/// caching purposes (the aggregate is refetched when the set differs).
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheKey {
    All,
    Slugs(Vec<String>),
    Single(String),
}

impl PrintSelection {
    fn cache_key(&self) -> CacheKey {
        match self {
            PrintSelection::All => CacheKey::All,
            PrintSelection::Slugs(slugs) => {
                let mut sorted = slugs.clone();
                sorted.sort();
                CacheKey::Slugs(sorted)
            }
            PrintSelection::Single(slug) => CacheKey::Single(slug.clone()),
        }
    }
}

/// The aggregated printable content.
#[derive(Debug, Clone)]
pub struct PrintDocument {
    /// Concatenated `<main>` regions, each carrying its slug as a class.
    pub body: String,
    /// Slugs included, in fetch order.
    pub slugs: Vec<String>,
}

impl PrintDocument {
    /// Renders the standalone isolated document: a minimal page that links
    /// only the print-relevant stylesheets, decoupling print layout from
    /// any host page.
    pub fn into_html(self) -> String {
        format!(
            concat!(
                "<!doctype html>\n<html lang=\"nl\">\n<head>\n<meta charset=\"utf-8\" />\n",
                "<title>Print</title>\n",
                "<link rel=\"stylesheet\" href=\"./styles/style.css\" />\n",
                "<link rel=\"stylesheet\" href=\"./styles/print.css\" />\n",
                "</head>\n<body class=\"print-all\">\n{}\n</body>\n</html>\n"
            ),
            self.body
        )
    }
}

/// Where the aggregator reads the deployed site from.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// The assignment manifest, in build order.
    async fn manifest(&self) -> Result<Vec<AssignmentEntry>>;
    /// The generated HTML of one page.
    async fn page(&self, slug: &str) -> Result<String>;
}

/// Reads a deployed site over HTTP.
pub struct HttpPageSource {
    client: Client,
    base: Url,
}

impl HttpPageSource {
    pub fn new(base: Url) -> Self {
        Self { client: Client::new(), base }
    }

    async fn fetch(&self, relative: &str) -> Result<String> {
        let url = self
            .base
            .join(relative)
            .map_err(|e| StitchpressError::InvalidUrl(e.to_string()))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StitchpressError::RemoteFetch { status: status.as_u16(), endpoint: relative.to_string() });
        }

        Ok(response.text().await?)
    }
}

impl PageSource for HttpPageSource {
    async fn manifest(&self) -> Result<Vec<AssignmentEntry>> {
        parse_manifest(&self.fetch(MANIFEST_PATH).await?)
    }

    async fn page(&self, slug: &str) -> Result<String> {
        self.fetch(&format!("{}.html", slug)).await
    }
}

/// Reads a built site directly from its output directory.
pub struct DirPageSource {
    root: PathBuf,
}

impl DirPageSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl PageSource for DirPageSource {
    async fn manifest(&self) -> Result<Vec<AssignmentEntry>> {
        parse_manifest(&std::fs::read_to_string(self.root.join(MANIFEST_PATH))?)
    }

    async fn page(&self, slug: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(format!("{}.html", slug)))?)
    }
}

/// Owns the page source and the "currently loaded print content" cache.
pub struct PrintController<S> {
    source: S,
    cache: Mutex<Option<(CacheKey, PrintDocument)>>,
}

impl<S: PageSource> PrintController<S> {
    pub fn new(source: S) -> Self {
        Self { source, cache: Mutex::new(None) }
    }

    /// Returns the printable document for a selection, aggregating only
    /// when the cached selection differs.
    pub async fn load(&self, selection: &PrintSelection) -> Result<PrintDocument> {
        // Held across the aggregation: concurrent triggers serialize here
        // and the late one finds the cache filled.
        let mut cache = self.cache.lock().await;

        let key = selection.cache_key();
        if let Some((cached_key, document)) = cache.as_ref()
            && *cached_key == key
        {
            debug!(?key, "reusing cached print content");
            return Ok(document.clone());
        }

        let document = self.aggregate(selection).await?;
        *cache = Some((key, document.clone()));

        Ok(document)
    }

    async fn aggregate(&self, selection: &PrintSelection) -> Result<PrintDocument> {
        let slugs = match selection {
            PrintSelection::All => self.source.manifest().await?.into_iter().map(|e| e.slug).collect(),
            PrintSelection::Slugs(slugs) => slugs.clone(),
            PrintSelection::Single(slug) => vec![slug.clone()],
        };

        let mut body = String::new();
        let mut included = Vec::new();
        for slug in &slugs {
            let html = self.source.page(slug).await?;
            match extract_main(&html, slug)? {
                Some(main) => {
                    body.push_str(&main);
                    included.push(slug.clone());
                }
                None => warn!(slug = %slug, "page has no <main> region, skipping"),
            }
        }

        Ok(PrintDocument { body, slugs: included })
    }
}

/// Pulls the `<main>` region out of a generated page and adds the slug to
/// its class list.
fn extract_main(html: &str, slug: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("main").unwrap();
    let Some(main) = document.select(&selector).next() else {
        return Ok(None);
    };

    Ok(Some(tag_with_class(&main.html(), slug)?))
}

fn tag_with_class(main_html: &str, slug: &str) -> Result<String> {
    let handlers: Vec<(Cow<'_, lol_html::Selector>, lol_html::ElementContentHandlers<'_>)> =
        vec![element!("main", |el| {
            let class = match el.get_attribute("class") {
                Some(existing) if !existing.is_empty() => format!("{} {}", existing, slug),
                _ => slug.to_string(),
            };
            el.set_attribute("class", &class).ok();
            Ok(())
        })];

    let mut output = Vec::new();
    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers: handlers, ..Settings::new() },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );
    rewriter
        .write(main_html.as_bytes())
        .map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))?;
    rewriter.end().map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))?;

    String::from_utf8(output).map_err(|e| StitchpressError::HtmlRewrite(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts every fetch.
    struct Counting {
        entries: Vec<AssignmentEntry>,
        manifest_fetches: AtomicUsize,
        page_fetches: AtomicUsize,
    }

    impl Counting {
        fn new(slugs: &[&str]) -> Self {
            Self {
                entries: slugs.iter().map(|s| AssignmentEntry::new(s, None)).collect(),
                manifest_fetches: AtomicUsize::new(0),
                page_fetches: AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for Counting {
        async fn manifest(&self) -> Result<Vec<AssignmentEntry>> {
            self.manifest_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.clone())
        }

        async fn page(&self, slug: &str) -> Result<String> {
            self.page_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "<html><body><main class=\"page\"><p>Content of {}</p></main></body></html>",
                slug
            ))
        }
    }

    #[tokio::test]
    async fn test_print_all_follows_manifest_order() {
        let controller = PrintController::new(Counting::new(&["b", "a", "c"]));
        let document = controller.load(&PrintSelection::All).await.unwrap();

        assert_eq!(document.slugs, vec!["b", "a", "c"]);
        let b = document.body.find("Content of b").unwrap();
        let a = document.body.find("Content of a").unwrap();
        let c = document.body.find("Content of c").unwrap();
        assert!(b < a && a < c);
    }

    #[tokio::test]
    async fn test_main_tagged_with_slug() {
        let controller = PrintController::new(Counting::new(&[]));
        let document = controller
            .load(&PrintSelection::Single("zomer".to_string()))
            .await
            .unwrap();

        assert!(document.body.contains("class=\"page zomer\""));
    }

    #[tokio::test]
    async fn test_repeat_selection_hits_cache() {
        let controller = PrintController::new(Counting::new(&["a", "b"]));

        controller.load(&PrintSelection::All).await.unwrap();
        controller.load(&PrintSelection::All).await.unwrap();

        assert_eq!(controller.source.manifest_fetches.load(Ordering::SeqCst), 1);
        assert_eq!(controller.source.page_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_changed_selection_refetches() {
        let controller = PrintController::new(Counting::new(&["a", "b"]));

        controller.load(&PrintSelection::All).await.unwrap();
        controller
            .load(&PrintSelection::Slugs(vec!["a".to_string()]))
            .await
            .unwrap();

        assert_eq!(controller.source.page_fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_slug_list_key_is_order_insensitive() {
        let controller = PrintController::new(Counting::new(&[]));

        let first = PrintSelection::Slugs(vec!["a".to_string(), "b".to_string()]);
        let second = PrintSelection::Slugs(vec!["b".to_string(), "a".to_string()]);
        controller.load(&first).await.unwrap();
        controller.load(&second).await.unwrap();

        assert_eq!(controller.source.page_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_page_without_main_is_skipped() {
        struct NoMain;
        impl PageSource for NoMain {
            async fn manifest(&self) -> Result<Vec<AssignmentEntry>> {
                Ok(vec![])
            }
            async fn page(&self, _slug: &str) -> Result<String> {
                Ok("<html><body><p>nothing</p></body></html>".to_string())
            }
        }

        let controller = PrintController::new(NoMain);
        let document = controller
            .load(&PrintSelection::Single("x".to_string()))
            .await
            .unwrap();

        assert!(document.body.is_empty());
        assert!(document.slugs.is_empty());
    }

    #[tokio::test]
    async fn test_dir_source_reads_build_output() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("assets/json")).unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_PATH),
            r#"[{"slug":"a","path":"./a.html","featured_image":null}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.html"),
            "<html><body><main><p>A</p></main></body></html>",
        )
        .unwrap();

        let controller = PrintController::new(DirPageSource::new(dir.path().to_path_buf()));
        let document = controller.load(&PrintSelection::All).await.unwrap();

        assert_eq!(document.slugs, vec!["a"]);
        assert!(document.body.contains("<p>A</p>"));
    }

    #[test]
    fn test_isolated_document_links_print_styles() {
        let document = PrintDocument { body: "<main class=\"a\">x</main>".to_string(), slugs: vec!["a".to_string()] };
        let html = document.into_html();

        assert!(html.contains("print.css"));
        assert!(html.contains("class=\"print-all\""));
        assert!(html.contains("<main class=\"a\">x</main>"));
    }
}
