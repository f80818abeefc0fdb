//! Page-format catalog: trim sizes, margins and base typography.
//!
//! Lengths are millimetres, font sizes are points.

use serde::{Deserialize, Serialize};

use crate::book::{ExportConfig, PageSize};

/// Extra margin added on every side when bleed is requested.
pub const BLEED_MM: f32 = 5.0;

/// Points → millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Physical page geometry and base font sizes for one trim size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Left and right margin.
    pub margin_x: f32,
    pub body_font_size: f32,
    pub title_font_size: f32,
    pub chapter_header_font_size: f32,
    /// Vertical advance per body line.
    pub line_height: f32,
}

impl PageFormat {
    pub const POCKET: PageFormat = PageFormat {
        width: 127.0,
        height: 203.2,
        margin_top: 15.0,
        margin_bottom: 15.0,
        margin_x: 12.0,
        body_font_size: 11.0,
        title_font_size: 18.0,
        chapter_header_font_size: 12.0,
        line_height: 5.0,
    };

    pub const LETTER: PageFormat = PageFormat {
        width: 215.9,
        height: 279.4,
        margin_top: 25.4,
        margin_bottom: 25.4,
        margin_x: 25.4,
        body_font_size: 12.0,
        title_font_size: 24.0,
        chapter_header_font_size: 16.0,
        line_height: 7.0,
    };

    pub const A4: PageFormat = PageFormat {
        width: 210.0,
        height: 297.0,
        margin_top: 25.4,
        margin_bottom: 25.4,
        margin_x: 25.4,
        body_font_size: 12.0,
        title_font_size: 24.0,
        chapter_header_font_size: 16.0,
        line_height: 7.0,
    };

    pub fn lookup(size: PageSize) -> Self {
        match size {
            PageSize::Pocket => Self::POCKET,
            PageSize::Letter => Self::LETTER,
            PageSize::A4 => Self::A4,
        }
    }

    /// Look up by raw key; never fails, unknown keys give A4.
    pub fn lookup_key(key: &str) -> Self {
        Self::lookup(PageSize::parse(key))
    }

    /// Shrink the live area by [`BLEED_MM`] on all sides. The physical page
    /// size is unchanged.
    pub fn with_bleed(self, bleed: bool) -> Self {
        if !bleed {
            return self;
        }
        Self {
            margin_top: self.margin_top + BLEED_MM,
            margin_bottom: self.margin_bottom + BLEED_MM,
            margin_x: self.margin_x + BLEED_MM,
            ..self
        }
    }

    /// Format for an export, bleed applied.
    pub fn resolve(config: &ExportConfig) -> Self {
        Self::lookup(config.page_size).with_bleed(config.bleed)
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin_x
    }

    /// Lowest baseline a body line may sit on.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin_bottom
    }

    /// Number of body lines that fit on a fresh page.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.content_bottom() - self.margin_top;
        ((usable / self.line_height).floor() as usize).max(1)
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_formats_are_portrait() {
        for size in PageSize::ALL {
            let f = PageFormat::lookup(size);
            assert!(f.height > f.width, "{size} is not portrait");
        }
    }

    #[test]
    fn bleed_grows_every_margin_equally() {
        for size in PageSize::ALL {
            let plain = PageFormat::lookup(size);
            let bled = plain.with_bleed(true);
            for (after, before) in [
                (bled.margin_top, plain.margin_top),
                (bled.margin_bottom, plain.margin_bottom),
                (bled.margin_x, plain.margin_x),
            ] {
                assert!((after - before - BLEED_MM).abs() < 1e-4);
            }
            assert_eq!(bled.width, plain.width);
            assert_eq!(bled.height, plain.height);
        }
    }

    #[test]
    fn unknown_key_is_a4() {
        assert_eq!(PageFormat::lookup_key("folio"), PageFormat::A4);
        assert_eq!(PageFormat::lookup_key("pocket"), PageFormat::POCKET);
    }

    #[test]
    fn pocket_line_capacity() {
        // (203.2 - 15 - 15) / 5 = 34.64
        assert_eq!(PageFormat::POCKET.lines_per_page(), 34);
    }
}
