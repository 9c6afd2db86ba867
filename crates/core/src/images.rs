//! Responsive image markup for downloaded media assets.
//!
//! Two presentation modes share the same srcset machinery: "hero" figures
//! load eagerly with wide breakpoints, "grid" figures load lazily with
//! narrower breakpoints and are restricted to the smaller size labels.
//! Only variants with known width and height participate; a dimensionless
//! variant is still downloaded but never referenced here.

use crate::media::{MediaAsset, Variant};

const HERO_SIZES: &str = "(max-width: 768px) 100vw, (max-width: 1200px) 80vw, 1200px";
const GRID_SIZES_ATTR: &str = "(max-width: 35rem) 100vw, (max-width: 55rem) 50vw, 33vw";

/// Size labels suitable for grid display.
const GRID_LABELS: &[&str] = &["thumbnail", "medium", "medium_large"];

fn base_path(asset: &MediaAsset) -> String {
    format!("./assets/collection/{}", asset.slug)
}

/// Variants with known dimensions, sorted by ascending width.
fn qualifying(asset: &MediaAsset) -> Vec<&Variant> {
    let mut variants: Vec<&Variant> = asset.downloads.iter().filter(|v| v.has_dimensions()).collect();
    variants.sort_by_key(|v| v.width);
    variants
}

/// Builds the `srcset` attribute value: `{path} {width}w` pairs in
/// ascending width order.
fn srcset(base: &str, variants: &[&Variant]) -> String {
    variants
        .iter()
        .map(|v| format!("{}/{} {}w", base, v.filename, v.width.unwrap_or_default()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hero figure markup: eager loading, full srcset, `medium` preferred as
/// the primary source. Empty string when no variant qualifies.
pub fn hero_image_html(asset: &MediaAsset) -> String {
    let variants = qualifying(asset);
    let Some(default) = variants.iter().find(|v| v.size == "medium").or_else(|| variants.first()) else {
        return String::new();
    };
    let base = base_path(asset);

    format!(
        concat!(
            "<figure class=\"hero-image\">",
            "<img src=\"{base}/{file}\" srcset=\"{srcset}\" sizes=\"{sizes}\" alt=\"{alt}\" ",
            "width=\"{width}\" height=\"{height}\" loading=\"eager\" decoding=\"async\" />",
            "</figure>"
        ),
        base = base,
        file = default.filename,
        srcset = srcset(&base, &variants),
        sizes = HERO_SIZES,
        alt = asset.alt_text,
        width = default.width.unwrap_or_default(),
        height = default.height.unwrap_or_default(),
    )
}

/// Grid figure markup: lazy loading, restricted to the grid size labels
/// with `thumbnail` preferred. When no grid label qualifies, falls back to
/// the smallest available variant without a srcset. Empty string when the
/// asset has no usable variant at all.
pub fn grid_image_html(asset: &MediaAsset) -> String {
    let all = qualifying(asset);
    let grid: Vec<&Variant> = all
        .iter()
        .copied()
        .filter(|v| GRID_LABELS.contains(&v.size.as_str()))
        .collect();
    let base = base_path(asset);

    if grid.is_empty() {
        let Some(fallback) = all.first() else {
            return String::new();
        };
        return format!(
            concat!(
                "<figure class=\"grid-image\">",
                "<img src=\"{base}/{file}\" alt=\"{alt}\" ",
                "width=\"{width}\" height=\"{height}\" loading=\"lazy\" decoding=\"async\" />",
                "</figure>"
            ),
            base = base,
            file = fallback.filename,
            alt = asset.alt_text,
            width = fallback.width.unwrap_or_default(),
            height = fallback.height.unwrap_or_default(),
        );
    }

    let default = grid.iter().find(|v| v.size == "thumbnail").unwrap_or(&grid[0]);

    format!(
        concat!(
            "<figure class=\"grid-image\">",
            "<img src=\"{base}/{file}\" srcset=\"{srcset}\" sizes=\"{sizes}\" alt=\"{alt}\" ",
            "width=\"{width}\" height=\"{height}\" loading=\"lazy\" decoding=\"async\" />",
            "</figure>"
        ),
        base = base,
        file = default.filename,
        srcset = srcset(&base, &grid),
        sizes = GRID_SIZES_ATTR,
        alt = asset.alt_text,
        width = default.width.unwrap_or_default(),
        height = default.height.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(size: &str, width: Option<u32>, height: Option<u32>) -> Variant {
        Variant {
            url: format!("https://cms.example/up/img-{}.jpg", size),
            filename: format!("{}.jpg", size),
            size: size.to_string(),
            width,
            height,
        }
    }

    fn asset(downloads: Vec<Variant>) -> MediaAsset {
        MediaAsset {
            id: 1,
            slug: "poster".to_string(),
            alt_text: "A poster".to_string(),
            mime_type: "image/jpeg".to_string(),
            downloads,
        }
    }

    #[test]
    fn test_srcset_ascending_and_excludes_dimensionless() {
        let asset = asset(vec![
            variant("a", Some(100), Some(70)),
            variant("b", Some(400), Some(280)),
            variant("c", Some(200), Some(140)),
            variant("no-height", Some(900), None),
        ]);

        let html = hero_image_html(&asset);
        let srcset_start = html.find("srcset=\"").unwrap() + 8;
        let srcset_end = html[srcset_start..].find('"').unwrap() + srcset_start;
        let srcset = &html[srcset_start..srcset_end];

        assert_eq!(
            srcset,
            "./assets/collection/poster/a.jpg 100w, ./assets/collection/poster/c.jpg 200w, ./assets/collection/poster/b.jpg 400w"
        );
        assert!(!html.contains("no-height"));
    }

    #[test]
    fn test_hero_prefers_medium() {
        let asset = asset(vec![
            variant("thumbnail", Some(150), Some(105)),
            variant("medium", Some(300), Some(210)),
            variant("large", Some(1024), Some(716)),
        ]);

        let html = hero_image_html(&asset);
        assert!(html.contains("src=\"./assets/collection/poster/medium.jpg\""));
        assert!(html.contains("loading=\"eager\""));
        assert!(html.contains("class=\"hero-image\""));
    }

    #[test]
    fn test_hero_falls_back_to_smallest() {
        let asset = asset(vec![
            variant("large", Some(1024), Some(716)),
            variant("thumbnail", Some(150), Some(105)),
        ]);

        let html = hero_image_html(&asset);
        assert!(html.contains("src=\"./assets/collection/poster/thumbnail.jpg\""));
    }

    #[test]
    fn test_hero_empty_without_qualifying_variants() {
        let asset = asset(vec![variant("full", None, None)]);
        assert_eq!(hero_image_html(&asset), "");
    }

    #[test]
    fn test_grid_restricted_to_grid_labels() {
        let asset = asset(vec![
            variant("full", Some(2000), Some(1400)),
            variant("large", Some(1024), Some(716)),
            variant("medium", Some(300), Some(210)),
            variant("thumbnail", Some(150), Some(105)),
        ]);

        let html = grid_image_html(&asset);
        assert!(html.contains("src=\"./assets/collection/poster/thumbnail.jpg\""));
        assert!(html.contains("srcset=\"./assets/collection/poster/thumbnail.jpg 150w, ./assets/collection/poster/medium.jpg 300w\""));
        assert!(!html.contains("large.jpg"));
        assert!(html.contains("loading=\"lazy\""));
    }

    #[test]
    fn test_grid_fallback_without_grid_labels() {
        let asset = asset(vec![
            variant("full", Some(2000), Some(1400)),
            variant("large", Some(1024), Some(716)),
        ]);

        let html = grid_image_html(&asset);
        assert!(html.contains("src=\"./assets/collection/poster/large.jpg\""));
        assert!(!html.contains("srcset"));
    }

    #[test]
    fn test_grid_empty_without_any_usable_variant() {
        let asset = asset(vec![variant("full", Some(2000), None)]);
        assert_eq!(grid_image_html(&asset), "");
    }
}
