//! Font selection, text measurement and greedy word-wrap.
//!
//! Only the PDF builtin faces are used (Times for book text, Helvetica for
//! cover typography), so widths come from a per-face average advance rather
//! than parsed glyph tables. The estimate is deterministic, which keeps
//! pagination reproducible across machines.

use std::iter::Peekable;
use std::str::SplitWhitespace;

use serde::{Deserialize, Serialize};

use crate::page_format::PT_TO_MM;

/// The builtin faces the painter draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    Serif,
    SerifBold,
    SerifItalic,
    Sans,
    SansBold,
}

/// Average advance per character as a fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub serif: f32,
    pub serif_bold: f32,
    pub sans: f32,
    pub sans_bold: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            serif: 0.45,
            serif_bold: 0.5,
            sans: 0.5,
            sans_bold: 0.55,
        }
    }
}

impl FontMetrics {
    fn advance(&self, family: FontFamily) -> f32 {
        match family {
            FontFamily::Serif | FontFamily::SerifItalic => self.serif,
            FontFamily::SerifBold => self.serif_bold,
            FontFamily::Sans => self.sans,
            FontFamily::SansBold => self.sans_bold,
        }
    }

    /// Width of `text` in millimetres at `font_size` points.
    pub fn measure(&self, text: &str, font_size: f32, family: FontFamily) -> f32 {
        text.chars().count() as f32 * font_size * self.advance(family) * PT_TO_MM
    }

    /// Left x that centres `text` on a column starting at `left`.
    pub fn centered_x(
        &self,
        text: &str,
        font_size: f32,
        family: FontFamily,
        left: f32,
        column_width: f32,
    ) -> f32 {
        left + (column_width - self.measure(text, font_size, family)) / 2.0
    }
}

/// Lazy greedy word-wrap over one paragraph.
///
/// Words are packed onto a line while the line plus a space plus the next
/// word measures no wider than `max_width`. A word wider than `max_width` is
/// emitted alone on its own line.
pub struct WrappedLines<'a> {
    words: Peekable<SplitWhitespace<'a>>,
    max_width: f32,
    font_size: f32,
    family: FontFamily,
    metrics: &'a FontMetrics,
}

impl Iterator for WrappedLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut line = self.words.next()?.to_string();
        while let Some(word) = self.words.peek() {
            let candidate = format!("{line} {word}");
            if self.metrics.measure(&candidate, self.font_size, self.family) > self.max_width {
                break;
            }
            line = candidate;
            self.words.next();
        }
        Some(line)
    }
}

/// Word-wrap `text` to fit within `max_width` millimetres.
///
/// Whitespace (including newlines) only separates words here; callers split
/// paragraphs first with [`paragraphs`].
pub fn wrap_text<'a>(
    text: &'a str,
    max_width: f32,
    font_size: f32,
    family: FontFamily,
    metrics: &'a FontMetrics,
) -> WrappedLines<'a> {
    WrappedLines {
        words: text.split_whitespace().peekable(),
        max_width,
        font_size,
        family,
        metrics,
    }
}

/// Split chapter content into paragraphs on newline boundaries, dropping
/// blank ones.
pub fn paragraphs(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let m = FontMetrics::default();
        let w = m.measure("Hello", 16.0, FontFamily::Sans);
        // 5 chars × 16 × 0.5 pt = 40 pt
        assert!((w - 40.0 * PT_TO_MM).abs() < 1e-3);
    }

    #[test]
    fn word_wrap_basic() {
        let m = FontMetrics::default();
        let lines: Vec<_> = wrap_text("Hello world foo bar", 25.0, 16.0, FontFamily::Sans, &m).collect();
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn lines_fit_and_preserve_words() {
        let m = FontMetrics::default();
        let text = "It was a bright cold day in April, and the clocks were striking thirteen. \
                    Winston Smith, his chin nuzzled into his breast in an effort to escape the vile wind, \
                    slipped quickly through the glass doors of Victory Mansions.";
        let max = 60.0;
        let lines: Vec<_> = wrap_text(text, max, 12.0, FontFamily::Serif, &m).collect();
        for line in &lines {
            assert!(m.measure(line, 12.0, FontFamily::Serif) <= max, "too wide: {line:?}");
        }
        let rejoined = lines.join(" ");
        let original: Vec<_> = text.split_whitespace().collect();
        let wrapped: Vec<_> = rejoined.split_whitespace().collect();
        assert_eq!(original, wrapped);
    }

    #[test]
    fn oversized_word_sits_alone() {
        let m = FontMetrics::default();
        let lines: Vec<_> =
            wrap_text("a Pneumonoultramicroscopicsilicovolcanoconiosis b", 20.0, 12.0, FontFamily::Serif, &m)
                .collect();
        assert_eq!(
            lines,
            vec!["a", "Pneumonoultramicroscopicsilicovolcanoconiosis", "b"]
        );
    }

    #[test]
    fn empty_text_has_no_lines() {
        let m = FontMetrics::default();
        assert_eq!(wrap_text("   ", 50.0, 12.0, FontFamily::Serif, &m).count(), 0);
    }

    #[test]
    fn wrap_is_deterministic() {
        let m = FontMetrics::default();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let a: Vec<_> = wrap_text(text, 30.0, 11.0, FontFamily::Serif, &m).collect();
        let b: Vec<_> = wrap_text(text, 30.0, 11.0, FontFamily::Serif, &m).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn paragraphs_skip_blank_lines() {
        let content = "First para.\n\n  \nSecond para.\r\nThird.";
        let paras: Vec<_> = paragraphs(content).collect();
        assert_eq!(paras, vec!["First para.", "Second para.", "Third."]);
    }
}
