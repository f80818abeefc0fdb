//! Book model – the finished manuscript handed over by the editor, plus the
//! per-export configuration.
//!
//! All types deserialise from the camelCase JSON the editor produces. Every
//! field is optional on the wire; missing values fall back to empty strings,
//! `None`, or the A4 page size.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A complete book ready for export. Never mutated during an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub title: String,
    pub author: String,
    /// Back-cover blurb.
    pub description: String,
    pub author_bio: Option<String>,
    pub author_image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub back_cover_image_url: Option<String>,
    /// Page order is array order.
    pub chapters: Vec<Chapter>,
    pub theme: Theme,
}

/// One chapter of the book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    /// Opaque identity; never used for ordering.
    pub id: String,
    /// May already carry a "Chapter N" / "Capítulo N" prefix.
    pub title: String,
    /// Body text; paragraphs are separated by newlines.
    pub content: String,
    /// Optional banner illustration.
    pub image_url: Option<String>,
}

/// Cosmetic theme chosen in the editor.
///
/// Advisory only: the PDF path draws with builtin serif/sans fonts and its
/// own palette, because arbitrary web fonts cannot be embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub heading_font: String,
    pub body_font: String,
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            heading_font: "Playfair Display".to_string(),
            body_font: "Merriweather".to_string(),
            primary_color: "#1e293b".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#111827".to_string(),
        }
    }
}

impl Book {
    /// Parse a book from editor JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid book JSON: {e}"))
    }

    /// The "About the Author" page is only emitted when there is something to
    /// show on it.
    pub fn has_author_page(&self) -> bool {
        non_blank(&self.author_bio).is_some() || non_blank(&self.author_image_url).is_some()
    }
}

/// Trimmed contents of an optional field, treating blank strings as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Trim size key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    Pocket,
    Letter,
    #[default]
    A4,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Pocket, PageSize::Letter, PageSize::A4];

    /// Parse a trim-size key. Unknown keys map to [`PageSize::A4`].
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "pocket" => PageSize::Pocket,
            "letter" => PageSize::Letter,
            "a4" => PageSize::A4,
            other => {
                log::debug!("Unknown page size {other:?}, using a4");
                PageSize::A4
            }
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            PageSize::Pocket => "pocket",
            PageSize::Letter => "letter",
            PageSize::A4 => "a4",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = Option::<String>::deserialize(deserializer)?;
        Ok(key.as_deref().map(PageSize::parse).unwrap_or_default())
    }
}

/// Options for a single export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub page_size: PageSize,
    /// Enlarge all margins by the bleed allowance.
    pub bleed: bool,
}

impl ExportConfig {
    pub fn new(page_size: PageSize, bleed: bool) -> Self {
        Self { page_size, bleed }
    }
}
