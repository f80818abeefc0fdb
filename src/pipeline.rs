//! Pipeline – ties together format selection, painting and rendering into a
//! single export call.
//!
//! Sections are painted strictly in order (cover, title page, author page,
//! chapters, back cover) because each one continues from the page cursor the
//! previous one left behind. Image fetches happen inline, one per section.

use std::fs;
use std::path::{Path, PathBuf};

use crate::book::{Book, ExportConfig, PageSize};
use crate::images::{HttpImageLoader, ImageLoader};
use crate::layout_config::LayoutConfig;
use crate::page_format::PageFormat;
use crate::painter::{ChapterNumbering, Painter, PainterPolicy};
use crate::pagination::LayoutContext;
use crate::render::render_pdf;

/// A finished export, not yet saved.
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    /// `{slug}_{pageSize}.pdf`
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub layout: LayoutConfig,
}

impl ExportedPdf {
    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }
}

/// Lowercase the title and replace every character outside `[a-z0-9]` with
/// `_`. An empty title gives `"book"`.
pub fn slugify(title: &str) -> String {
    if title.is_empty() {
        return "book".to_string();
    }
    title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn output_file_name(title: &str, page_size: PageSize) -> String {
    format!("{}_{}.pdf", slugify(title), page_size.key())
}

/// Paint every section into a layout (no PDF rendering) – useful for testing.
pub fn compute_layout_config(
    book: &Book,
    config: &ExportConfig,
    policy: &PainterPolicy,
    loader: &dyn ImageLoader,
) -> LayoutConfig {
    let format = PageFormat::resolve(config);
    let mut ctx = LayoutContext::new(&book.title, format);
    let painter = Painter::new(book, policy, loader);

    painter.paint_front_cover(&mut ctx);
    painter.paint_title_page(&mut ctx);
    if book.has_author_page() {
        painter.paint_author_page(&mut ctx);
    }
    let mut numbering = ChapterNumbering::for_chapters(&book.chapters);
    for chapter in &book.chapters {
        painter.paint_chapter(&mut ctx, chapter, &mut numbering);
    }
    if policy.include_back_cover {
        painter.paint_back_cover(&mut ctx);
    }
    if policy.page_numbers {
        painter.stamp_folios(&mut ctx);
    }

    ctx.finish()
}

/// Full pipeline: book → PDF bytes.
pub fn export_book(
    book: &Book,
    config: &ExportConfig,
    policy: &PainterPolicy,
    loader: &dyn ImageLoader,
) -> Result<ExportedPdf, String> {
    let layout = compute_layout_config(book, config, policy, loader);
    let bytes = render_pdf(&layout)?;
    let file_name = output_file_name(&book.title, config.page_size);
    log::info!(
        "Rendered {file_name} ({} pages, {} bytes)",
        layout.pages.len(),
        bytes.len()
    );
    Ok(ExportedPdf {
        file_name,
        bytes,
        layout,
    })
}

/// Convenience: default policy, images fetched over HTTP.
pub fn export_book_default(book: &Book, config: &ExportConfig) -> Result<ExportedPdf, String> {
    export_book(book, config, &PainterPolicy::default(), &HttpImageLoader::new())
}

/// Save an export into `dir` under its file name, creating `dir` if needed.
pub fn write_export(export: &ExportedPdf, dir: &Path) -> Result<PathBuf, String> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Error creating output directory '{}': {e}", dir.display()))?;
    }
    let path = dir.join(&export.file_name);
    fs::write(&path, &export.bytes)
        .map_err(|e| format!("Error writing '{}': {e}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::NoImages;

    #[test]
    fn slug_rules() {
        assert_eq!(slugify("My, Book! 2024"), "my__book__2024");
        assert_eq!(slugify(""), "book");
        assert_eq!(slugify("  "), "__");
        assert_eq!(slugify("Año"), "a_o");
    }

    #[test]
    fn file_name_includes_size() {
        assert_eq!(output_file_name("Sea", PageSize::Pocket), "sea_pocket.pdf");
        assert_eq!(output_file_name("", PageSize::A4), "book_a4.pdf");
    }

    #[test]
    fn pipeline_basic() {
        let book = Book {
            title: "Hello".to_string(),
            author: "World".to_string(),
            ..Book::default()
        };
        let export = export_book(
            &book,
            &ExportConfig::default(),
            &PainterPolicy::default(),
            &NoImages,
        )
        .unwrap();
        assert_eq!(&export.bytes[0..5], b"%PDF-");
        assert_eq!(export.file_name, "hello_a4.pdf");
        // cover, title page, back cover
        assert_eq!(export.page_count(), 3);
    }
}
