mod echo;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use stitchpress_core::{
    BuildConfig, DirPageSource, HttpPageSource, PageStatus, PrintController, PrintSelection, build_site,
};
use tracing_subscriber::EnvFilter;
use url::Url;

use echo::{print_banner, print_info, print_step, print_success, print_warning};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a static site from a headless WordPress API
#[derive(Parser, Debug)]
#[command(name = "stitchpress")]
#[command(author = "Stitchpress Contributors")]
#[command(version = VERSION)]
#[command(about = "Build a static site from a headless WordPress API", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all content and generate the static site
    Build {
        /// CMS API base URL (overrides WP_API_URL)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,

        /// Output directory (overrides BUILD_DIR, default: build)
        #[arg(long, value_name = "DIR")]
        build_dir: Option<PathBuf>,

        /// Template directory (overrides TEMPLATES_DIR, default: static/templates)
        #[arg(long, value_name = "DIR")]
        templates_dir: Option<PathBuf>,
    },
    /// Aggregate assignment pages into one printable document
    Print {
        /// Built site: an output directory or a deployed base URL
        #[arg(long, value_name = "DIR_OR_URL", default_value = "build")]
        site: String,

        /// Print every assignment page, in manifest order
        #[arg(long, conflicts_with_all = ["slugs", "slug"])]
        all: bool,

        /// Comma-separated slug list, printed in the given order
        #[arg(long, value_delimiter = ',', value_name = "SLUGS", conflicts_with = "slug")]
        slugs: Vec<String>,

        /// Single page slug
        #[arg(value_name = "SLUG")]
        slug: Option<String>,

        /// Where to write the printable document
        #[arg(short, long, value_name = "FILE", default_value = "print.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    if args.verbose {
        print_banner();
    }

    match args.command {
        Command::Build { api_url, build_dir, templates_dir } => run_build(args.verbose, api_url, build_dir, templates_dir).await,
        Command::Print { site, all, slugs, slug, output } => run_print(site, all, slugs, slug, output).await,
    }
}

async fn run_build(
    verbose: bool, api_url: Option<String>, build_dir: Option<PathBuf>, templates_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match api_url {
        Some(url) => BuildConfig::new(
            url,
            build_dir.unwrap_or_else(|| PathBuf::from("build")),
            templates_dir.unwrap_or_else(|| PathBuf::from("static/templates")),
        )?,
        None => {
            let mut config = BuildConfig::from_env().context("could not load build configuration")?;
            if let Some(dir) = build_dir {
                config.build_dir = dir;
            }
            if let Some(dir) = templates_dir {
                config.templates_dir = dir;
            }
            config
        }
    };

    if verbose {
        print_step(1, 2, &format!("Building into {}", config.build_dir.display()));
    }

    let report = build_site(&config).await.context("build failed")?;

    for outcome in &report.pages {
        if let PageStatus::Skipped { reason } = &outcome.status {
            print_warning(&format!("skipped {}: {}", outcome.slug, reason));
        }
    }
    if report.variants_failed > 0 {
        print_warning(&format!("{} image variant(s) failed to download", report.variants_failed));
    }
    if !report.manifest_written {
        print_warning("assignments manifest was not written");
    }

    if verbose {
        print_step(2, 2, "Build finished");
    }
    print_success(&format!(
        "Generated {} page(s) ({} assignment(s), {} skipped)",
        report.built_count(),
        report.assignments,
        report.skipped_count()
    ));

    Ok(())
}

async fn run_print(
    site: String, all: bool, slugs: Vec<String>, slug: Option<String>, output: PathBuf,
) -> anyhow::Result<()> {
    let selection = if all {
        PrintSelection::All
    } else if !slugs.is_empty() {
        PrintSelection::Slugs(slugs)
    } else if let Some(slug) = slug {
        PrintSelection::Single(slug)
    } else {
        bail!("nothing selected: pass --all, --slugs, or a slug");
    };

    let document = if site.starts_with("http://") || site.starts_with("https://") {
        // Url::join needs the trailing slash to treat the base as a directory.
        let base = Url::parse(&format!("{}/", site.trim_end_matches('/'))).context("invalid site URL")?;
        PrintController::new(HttpPageSource::new(base)).load(&selection).await?
    } else {
        PrintController::new(DirPageSource::new(PathBuf::from(&site))).load(&selection).await?
    };

    if document.slugs.is_empty() {
        bail!("no printable content found for the requested selection");
    }

    print_info(&format!("aggregated {} page(s)", document.slugs.len()));

    fs::write(&output, document.into_html()).with_context(|| format!("failed to write {}", output.display()))?;
    print_success(&format!("Printable document written to {}", output.display()));

    Ok(())
}
