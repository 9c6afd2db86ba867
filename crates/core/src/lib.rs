pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod images;
pub mod manifest;
pub mod media;
pub mod print;
pub mod report;
pub mod site;
pub mod template;
pub mod text;

pub use assemble::{AssignmentFeature, FRONT_PAGE_NAME, PageInput, assemble_page};
pub use config::BuildConfig;
pub use content::{ASSIGNMENT_TAG, ContentItem};
pub use error::{Result, StitchpressError};
pub use fetch::{ContentFetcher, PER_PAGE};
pub use images::{grid_image_html, hero_image_html};
pub use manifest::{AssignmentEntry, MANIFEST_PATH, parse_manifest, write_manifest};
pub use media::{MediaAsset, Variant, download_variants};
pub use print::{DirPageSource, HttpPageSource, PageSource, PrintController, PrintDocument, PrintSelection};
pub use report::{BuildReport, PageOutcome, PageStatus};
pub use site::build_site;
pub use template::{accent_color, find_template};
pub use text::{capitalize_first, decode_entities, rewrite_cms_urls};
