//! # book-forge – structured manuscript → print-ready PDF
//!
//! This crate lays out a finished [`Book`](book::Book) (cover, title page,
//! optional author page, chapters, back cover) onto fixed-size pages and
//! renders the result as a PDF. The pipeline stages are:
//!
//! 1. **Format** – pick the trim size and apply bleed ([`page_format`])
//! 2. **Load** – fetch and decode artwork, failing soft ([`images`])
//! 3. **Paint** – wrap text and place every section on pages ([`painter`],
//!    [`pagination`], [`fonts`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! [`pipeline`] runs the stages in order and names the output file.

pub mod book;
pub mod fonts;
pub mod images;
pub mod layout_config;
pub mod manuscript;
pub mod page_format;
pub mod pagination;
pub mod painter;
pub mod pipeline;
pub mod render;
pub mod templates;

// Re-exports for convenience
pub use book::{Book, Chapter, ExportConfig, PageSize};
pub use painter::PainterPolicy;
pub use pipeline::{export_book, export_book_default, output_file_name, slugify, ExportedPdf};
