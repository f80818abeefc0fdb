//! Layout config – the intermediate representation between the page painter
//! and PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.
//!
//! Coordinates are millimetres from the top-left corner of the page. Text
//! `y` values are baselines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fonts::FontFamily;
use crate::images::LoadedImage;
use crate::page_format::PageFormat;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
    /// Decoded artwork referenced by [`PageItem::Image`], keyed by image id.
    #[serde(skip)]
    pub images: BTreeMap<String, LoadedImage>,
}

/// Which section opened a page. Body overflow pages keep `Chapter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    FrontCover,
    TitlePage,
    AuthorPage,
    Chapter,
    BackCover,
}

/// One page of content, painted in item order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub kind: PageKind,
    pub items: Vec<PageItem>,
}

/// RGBA, components in `0.0..=1.0`.
pub type Rgba = [f32; 4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    /// Filled rectangle; alpha below 1 is drawn translucent.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba,
    },
    /// Stroked rectangle outline.
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: f32,
        color: Rgba,
    },
    Text(TextRun),
    /// Image stretched to the given box.
    Image {
        image_id: String,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// What a piece of text is for. Rendering ignores it; tests and layout dumps
/// use it to find things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    CoverTitle,
    CoverShadow,
    CoverAuthor,
    Title,
    Byline,
    Heading,
    Bio,
    ChapterHeader,
    ChapterTitle,
    Body,
    Blurb,
    Imprint,
    Folio,
}

/// A single line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub font: FontFamily,
    /// Points.
    pub size: f32,
    pub color: Rgba,
    pub role: TextRole,
}

impl LayoutConfig {
    pub fn new(title: &str, format: &PageFormat) -> Self {
        Self {
            title: title.to_string(),
            page_width_mm: format.width,
            page_height_mm: format.height,
            pages: Vec::new(),
            images: BTreeMap::new(),
        }
    }

    /// Serialise to JSON (images are omitted).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Every text run with the given role, paired with its page index, in
    /// paint order.
    pub fn texts_with_role(&self, role: TextRole) -> impl Iterator<Item = (usize, &TextRun)> + '_ {
        self.pages.iter().flat_map(move |page| {
            page.items.iter().filter_map(move |item| match item {
                PageItem::Text(run) if run.role == role => Some((page.page_index, run)),
                _ => None,
            })
        })
    }

    pub fn pages_of_kind(&self, kind: PageKind) -> impl Iterator<Item = &PageLayout> + '_ {
        self.pages.iter().filter(move |p| p.kind == kind)
    }
}

impl PageLayout {
    pub fn new(page_index: usize, kind: PageKind) -> Self {
        Self {
            page_index,
            kind,
            items: Vec::new(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, PageItem::Image { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> + '_ {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(run) => Some(run),
            _ => None,
        })
    }
}
