//! Template selection and accent-color assignment.
//!
//! Templates are plain HTML files in the template directory. Selection is
//! by strict priority: the dedicated assignment template for
//! assignment-classified items, then a template named after the slug, then
//! the unconditional base template. "Exists" means "could be read"; a read
//! failure just falls through to the next candidate.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::content::ASSIGNMENT_TAG;

/// Template used for assignment-classified items.
pub const ASSIGNMENT_TEMPLATE: &str = "assignment.html";
/// Unconditional fallback template; must exist.
pub const BASE_TEMPLATE: &str = "template.html";

/// Accent color used when no tag qualifies.
pub const DEFAULT_COLOR: &str = "lilia";

/// Category names that never become accent colors.
const RESERVED_COLOR_WORDS: &[&str] = &["oefening", "inspired-by", "made-by"];

/// Returns the most specific readable template for a page.
pub fn find_template(templates_dir: &Path, slug: &str, tags: &[String]) -> PathBuf {
    if tags.iter().any(|t| t == ASSIGNMENT_TAG) {
        let candidate = templates_dir.join(ASSIGNMENT_TEMPLATE);
        if fs::read_to_string(&candidate).is_ok() {
            debug!(slug, template = %candidate.display(), "using assignment template");
            return candidate;
        }
    }

    let normalized = slug.to_lowercase().replace(' ', "-");
    let candidate = templates_dir.join(format!("{}.html", normalized));
    if fs::read_to_string(&candidate).is_ok() {
        debug!(slug, template = %candidate.display(), "using page-specific template");
        return candidate;
    }

    templates_dir.join(BASE_TEMPLATE)
}

/// Picks the accent-color token for a set of classification tags.
///
/// The first `category-<name>` tag whose name is not reserved wins, in the
/// content's own tag order; the token is lowercased. Deterministic by
/// construction.
pub fn accent_color(tags: &[String]) -> String {
    tags.iter()
        .filter_map(|tag| tag.strip_prefix("category-"))
        .find(|name| !name.is_empty() && !RESERVED_COLOR_WORDS.contains(&name.to_lowercase().as_str()))
        .map(|name| name.to_lowercase())
        .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}
