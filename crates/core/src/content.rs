//! Content items as delivered by the CMS API.
//!
//! The REST payload is normalized at the serde boundary: classification
//! tags arrive in several shapes upstream (array, map-like object, single
//! delimited string) and are canonicalized into an ordered `Vec<String>`
//! on ingestion so everything downstream sees one form.

use serde::{Deserialize, Deserializer};

/// Classification tag marking an item as an assignment ("oefening").
pub const ASSIGNMENT_TAG: &str = "category-oefening";

/// One remote document, fetched once per build and immutable afterward.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    /// Canonical ordered tag list; see [`deserialize_class_list`].
    #[serde(default, deserialize_with = "deserialize_class_list")]
    pub class_list: Vec<String>,
    /// Media reference id; the API sends `0` for "none".
    #[serde(default, deserialize_with = "deserialize_media_ref")]
    pub featured_media: Option<u64>,
}

/// A `{ "rendered": "..." }` wrapper, the shape WP uses for title and body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl ContentItem {
    /// Whether this item carries the assignment classification.
    pub fn is_assignment(&self) -> bool {
        self.class_list.iter().any(|t| t == ASSIGNMENT_TAG)
    }
}

/// Accepts the three tag-list shapes the API has been observed to send.
fn deserialize_class_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Map(serde_json::Map<String, serde_json::Value>),
        One(String),
    }

    let normalized = match Option::<RawTags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawTags::List(tags)) => tags,
        Some(RawTags::Map(map)) => map
            .values()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(RawTags::One(joined)) => joined.split_whitespace().map(str::to_string).collect(),
    };

    Ok(normalized)
}

fn deserialize_media_ref<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<u64>::deserialize(deserializer)?;
    Ok(id.filter(|&id| id != 0))
}
