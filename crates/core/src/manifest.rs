//! The assignment manifest: an ordered JSON summary of assignment pages,
//! written at build time and read back by the print flow.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;

/// Manifest location relative to the build directory / site root.
pub const MANIFEST_PATH: &str = "assets/json/assignments.json";

/// One assignment page summary. Order in the manifest matches the order the
/// pages were processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub slug: String,
    /// Relative path of the generated page, e.g. `./zomer.html`.
    pub path: String,
    /// Slug of the downloaded featured image folder, if any.
    pub featured_image: Option<String>,
}

impl AssignmentEntry {
    pub fn new(slug: &str, featured_image: Option<String>) -> Self {
        Self {
            slug: slug.to_string(),
            path: format!("./{}.html", slug),
            featured_image,
        }
    }
}

/// Serializes the manifest to its fixed location under `build_dir`.
pub fn write_manifest(build_dir: &Path, entries: &[AssignmentEntry]) -> Result<PathBuf> {
    let path = build_dir.join(MANIFEST_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&path, serde_json::to_string_pretty(entries)?)?;
    info!(path = %path.display(), count = entries.len(), "wrote assignments manifest");

    Ok(path)
}

/// Parses manifest JSON, preserving entry order.
pub fn parse_manifest(json: &str) -> Result<Vec<AssignmentEntry>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            AssignmentEntry::new("b", Some("b-poster".to_string())),
            AssignmentEntry::new("c", None),
        ];

        let path = write_manifest(dir.path(), &entries).unwrap();
        assert!(path.ends_with(MANIFEST_PATH));

        let parsed = parse_manifest(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_entry_path_shape() {
        let entry = AssignmentEntry::new("zomer", None);
        assert_eq!(entry.path, "./zomer.html");
        assert_eq!(entry.featured_image, None);
    }

    #[test]
    fn test_parse_manifest_schema() {
        let json = r#"[{"slug":"a","path":"./a.html","featured_image":"a-img"},
                       {"slug":"b","path":"./b.html","featured_image":null}]"#;
        let parsed = parse_manifest(json).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].featured_image.as_deref(), Some("a-img"));
        assert_eq!(parsed[1].featured_image, None);
    }
}
