//! Build orchestration: one sequential pass producing the static site.
//!
//! Order matters and is part of the contract: front page fetch, listing
//! fetch, each listed page in listing order (media download, assembly,
//! manifest entry), manifest write, and finally the front page assembly
//! with the collected assignment imagery. Manifest order and accent colors
//! therefore come out reproducibly.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::assemble::{AssignmentFeature, FRONT_PAGE_NAME, PageInput, assemble_page};
use crate::content::ContentItem;
use crate::fetch::ContentFetcher;
use crate::manifest::{AssignmentEntry, write_manifest};
use crate::media::{MediaAsset, download_variants};
use crate::report::BuildReport;
use crate::template::{accent_color, find_template};
use crate::{BuildConfig, Result};

/// Static source directories copied verbatim into the build.
const STATIC_DIRS: &[(&str, &str)] = &[
    ("static/styles", "styles"),
    ("static/scripts", "scripts"),
    ("static/images", "images"),
    ("static/fonts", "fonts"),
];

/// Runs the whole build pipeline.
///
/// Fatal errors: configuration problems and the two top-level fetches
/// (front page, page listing). Everything else is logged, recorded in the
/// report, and skipped.
pub async fn build_site(config: &BuildConfig) -> Result<BuildReport> {
    let _ = fs::remove_dir_all(&config.build_dir);
    fs::create_dir_all(&config.build_dir)?;

    copy_static_assets(&config.build_dir);

    let fetcher = ContentFetcher::new(config)?;
    let mut report = BuildReport::default();

    let front_page = fetcher.front_page().await?;
    let pages = fetcher.collection("pages").await?;

    let mut assignment_entries = Vec::new();
    let mut assignment_features: HashMap<String, AssignmentFeature> = HashMap::new();

    for page in pages.iter().filter(|p| p.id != front_page.id) {
        match process_page(config, &fetcher, page, &mut report).await {
            Ok(featured_image) => {
                if page.is_assignment() {
                    let image_slug = featured_image.as_ref().map(|a| a.slug.clone());
                    assignment_entries.push(AssignmentEntry::new(&page.slug, image_slug));

                    if let Some(image) = featured_image {
                        assignment_features.insert(
                            page.slug.clone(),
                            AssignmentFeature { image, color: accent_color(&page.class_list) },
                        );
                    }
                }
            }
            Err(e) => {
                warn!(slug = %page.slug, error = %e, "skipping page");
                report.skipped(&page.slug, e.to_string());
            }
        }
    }

    report.assignments = assignment_entries.len();
    match write_manifest(&config.build_dir, &assignment_entries) {
        Ok(_) => report.manifest_written = true,
        Err(e) => error!(error = %e, "failed to write assignments manifest"),
    }

    // The front page goes last so it can reference every assignment image.
    let front_input = PageInput {
        page_name: FRONT_PAGE_NAME,
        title: &front_page.title.rendered,
        body: &front_page.content.rendered,
        tags: &front_page.class_list,
        featured_image: None,
        assignment_features: Some(&assignment_features),
    };
    match assemble_to(config, FRONT_PAGE_NAME, &front_page.class_list, &front_input) {
        Ok(path) => report.built(FRONT_PAGE_NAME, path),
        Err(e) => {
            warn!(error = %e, "skipping front page");
            report.skipped(FRONT_PAGE_NAME, e.to_string());
        }
    }

    info!(
        built = report.built_count(),
        skipped = report.skipped_count(),
        assignments = report.assignments,
        "build finished"
    );

    Ok(report)
}

/// Handles one listed page: media download, template selection, assembly.
///
/// Returns the downloaded featured image so the caller can reuse it for the
/// manifest and the front-page grid.
async fn process_page(
    config: &BuildConfig, fetcher: &ContentFetcher, page: &ContentItem, report: &mut BuildReport,
) -> Result<Option<MediaAsset>> {
    let mut featured_image = None;
    if page.is_assignment() && let Some(media_id) = page.featured_media {
        info!(slug = %page.slug, media_id, "downloading featured image");
        let asset = fetcher.media(media_id).await?;
        let (downloaded, failed) = download_variants(fetcher.client(), &asset, &config.build_dir).await?;
        report.variants_downloaded += downloaded;
        report.variants_failed += failed;
        featured_image = Some(asset);
    }

    let input = PageInput {
        page_name: &page.slug,
        title: &page.title.rendered,
        body: &page.content.rendered,
        tags: &page.class_list,
        featured_image: featured_image.as_ref(),
        assignment_features: None,
    };
    let path = assemble_to(config, &page.slug, &page.class_list, &input)?;
    report.built(&page.slug, path);

    Ok(featured_image)
}

fn assemble_to(
    config: &BuildConfig, page_name: &str, tags: &[String], input: &PageInput<'_>,
) -> Result<std::path::PathBuf> {
    let template_path = find_template(&config.templates_dir, page_name, tags);
    let template = fs::read_to_string(&template_path)
        .map_err(|_| crate::StitchpressError::TemplateNotFound(template_path.clone()))?;

    let html = assemble_page(&template, input, &config.site_host)?;
    let output_path = config.build_dir.join(format!("{}.html", page_name));
    fs::write(&output_path, html)?;
    info!(path = %output_path.display(), "generated page");

    Ok(output_path)
}

/// Copies the static asset tree into the build directory. Missing sources
/// are logged and skipped; the original assets live outside this tool's
/// responsibility.
fn copy_static_assets(build_dir: &Path) {
    for (source, target) in STATIC_DIRS {
        if let Err(e) = copy_dir(Path::new(source), &build_dir.join(target)) {
            warn!(source, error = %e, "static assets not copied");
        }
    }

    if Path::new("static/404.html").exists()
        && let Err(e) = fs::copy("static/404.html", build_dir.join("404.html"))
    {
        warn!(error = %e, "404 page not copied");
    }
}

fn copy_dir(source: &Path, target: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walkdir yields paths under its root");
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)?;
        }
    }

    Ok(())
}
