//! Pagination – the mutable layout state of one export.
//!
//! A [`LayoutContext`] owns the pages painted so far and the vertical cursor
//! on the current (last) page. It lives for exactly one export and is
//! consumed by [`LayoutContext::finish`].

use crate::images::LoadedImage;
use crate::layout_config::{LayoutConfig, PageItem, PageKind, PageLayout};
use crate::page_format::PageFormat;

pub struct LayoutContext {
    pub format: PageFormat,
    /// Current vertical write position on the current page, in millimetres.
    pub cursor_y: f32,
    layout: LayoutConfig,
}

impl LayoutContext {
    pub fn new(title: &str, format: PageFormat) -> Self {
        Self {
            format,
            cursor_y: format.margin_top,
            layout: LayoutConfig::new(title, &format),
        }
    }

    /// Start a blank page and reset the cursor to the top margin.
    pub fn new_page(&mut self, kind: PageKind) {
        let index = self.layout.pages.len();
        log::debug!("Page {} ({:?})", index + 1, kind);
        self.layout.pages.push(PageLayout::new(index, kind));
        self.cursor_y = self.format.margin_top;
    }

    /// Index of the current page; `None` before the first page.
    pub fn page_index(&self) -> Option<usize> {
        self.layout.pages.len().checked_sub(1)
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    /// Whether a line of `line_height` written at the cursor would cross
    /// the bottom margin.
    pub fn overflows(&self, line_height: f32) -> bool {
        self.cursor_y + line_height > self.format.content_bottom()
    }

    /// Break to a continuation page of the same kind if the next line does
    /// not fit. Returns true when a page was added.
    pub fn ensure_room(&mut self, line_height: f32) -> bool {
        if !self.overflows(line_height) {
            return false;
        }
        let kind = self
            .layout
            .pages
            .last()
            .map(|p| p.kind)
            .unwrap_or(PageKind::Chapter);
        self.new_page(kind);
        true
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor_y += dy;
    }

    /// Append an item to the current page, opening a chapter page if none
    /// exists yet.
    pub fn push(&mut self, item: PageItem) {
        if self.layout.pages.is_empty() {
            self.new_page(PageKind::Chapter);
        }
        if let Some(page) = self.layout.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Store decoded artwork and return the id to reference it by.
    pub fn register_image(&mut self, image: LoadedImage) -> String {
        let id = format!("img{}", self.layout.images.len() + 1);
        self.layout.images.insert(id.clone(), image);
        id
    }

    pub fn pages_mut(&mut self) -> &mut [PageLayout] {
        &mut self.layout.pages
    }

    pub fn finish(self) -> LayoutConfig {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontFamily;
    use crate::layout_config::{TextRole, TextRun};

    fn body(text: &str, y: f32) -> PageItem {
        PageItem::Text(TextRun {
            text: text.to_string(),
            x: 12.0,
            y,
            font: FontFamily::Serif,
            size: 11.0,
            color: [0.0, 0.0, 0.0, 1.0],
            role: TextRole::Body,
        })
    }

    #[test]
    fn single_page() {
        let mut ctx = LayoutContext::new("t", PageFormat::POCKET);
        ctx.new_page(PageKind::Chapter);
        for i in 0..10 {
            ctx.ensure_room(5.0);
            let y = ctx.cursor_y;
            ctx.push(body(&format!("line {i}"), y));
            ctx.advance(5.0);
        }
        assert_eq!(ctx.finish().pages.len(), 1);
    }

    #[test]
    fn multiple_pages() {
        let format = PageFormat::POCKET;
        let mut ctx = LayoutContext::new("t", format);
        ctx.new_page(PageKind::Chapter);
        let total = format.lines_per_page() * 2 + 3;
        for i in 0..total {
            ctx.ensure_room(format.line_height);
            let y = ctx.cursor_y;
            assert!(y + format.line_height <= format.content_bottom() + 1e-3);
            ctx.push(body(&format!("line {i}"), y));
            ctx.advance(format.line_height);
        }
        let layout = ctx.finish();
        assert_eq!(layout.pages.len(), 3);
        assert!(layout.pages.iter().all(|p| p.kind == PageKind::Chapter));
        assert_eq!(layout.texts_with_role(TextRole::Body).count(), total);
    }

    #[test]
    fn push_without_page_opens_one() {
        let mut ctx = LayoutContext::new("t", PageFormat::A4);
        assert_eq!(ctx.page_index(), None);
        ctx.push(body("x", 30.0));
        assert_eq!(ctx.page_index(), Some(0));
    }
}
