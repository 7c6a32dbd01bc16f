use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat content row stored in the `copy` Postgres table.
/// One row per `(page, key, locale)`; upserts replace on that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Page identifier, e.g. `home`, `contacto`.
    pub page: String,
    /// Language code, e.g. `es`.
    pub locale: String,
    /// Dotted key path into the page document, e.g. `hero.button1Text`.
    pub key: String,
    /// Scalar text, or a JSON-serialized array/object for structured leaves.
    pub value: String,
    /// Editing-widget hint. Stored in the `type` column; no effect on the
    /// flat⇄nested transform.
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Identity that last wrote the row; stamped by the store at write time.
    pub owner: Option<String>,
    /// Stamped by the store at write time, not at edit time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// A record as produced by an edit, before the store stamps provenance.
    pub fn new(
        page: impl Into<String>,
        locale: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        kind: ContentKind,
    ) -> Self {
        Self {
            page: page.into(),
            locale: locale.into(),
            key: key.into(),
            value: value.into(),
            kind,
            owner: None,
            updated_at: None,
        }
    }
}

/// Classification hint selecting an editing widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Markdown,
    Image,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Markdown => "markdown",
            ContentKind::Image => "image",
        }
    }

    /// Decode the stored `type` column. Unknown values become `Text` so
    /// rows written by a newer editor still materialize.
    pub fn from_column(value: &str) -> Self {
        match value {
            "markdown" => ContentKind::Markdown,
            "image" => ContentKind::Image,
            _ => ContentKind::Text,
        }
    }
}

/// Classify a key when flattening a document back into records: `image`
/// iff the key mentions an image and is not the alt text for one.
/// `hero.image` → image, `hero.imageAlt` → text.
pub fn classify_kind(key: &str) -> ContentKind {
    if key.contains("image") && !key.contains("Alt") {
        ContentKind::Image
    } else {
        ContentKind::Text
    }
}
