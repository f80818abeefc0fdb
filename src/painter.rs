//! Page painter – draws each section of the book into a [`LayoutContext`].
//!
//! Sections:
//! - front cover (full-bleed art or solid fallback, shadowed title, author band)
//! - title page
//! - optional "About the Author" page
//! - chapters (banner, numbered header, title, flowing body)
//! - optional back cover (blurb box, barcode block, imprint)
//!
//! Every optional field has a fallback rendering; nothing here fails.

use serde::{Deserialize, Serialize};

use crate::book::{non_blank, Book, Chapter};
use crate::fonts::{paragraphs, wrap_text, FontFamily, FontMetrics};
use crate::images::{ImageLoader, LoadedImage};
use crate::layout_config::{PageItem, PageKind, Rgba, TextRole, TextRun};
use crate::page_format::PT_TO_MM;
use crate::pagination::LayoutContext;

const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
const INK: Rgba = [0.1, 0.1, 0.1, 1.0];
const MUTED: Rgba = [0.4, 0.4, 0.4, 1.0];
const SHADOW: Rgba = [0.0, 0.0, 0.0, 0.3];
const BAND: Rgba = [0.0, 0.0, 0.0, 0.45];
const BLURB_BOX: Rgba = [0.0, 0.0, 0.0, 0.55];

const UNTITLED: &str = "Untitled";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Gap below a chapter banner.
const BANNER_GAP_MM: f32 = 8.0;
/// Cursor advance between the "Chapter N" line and the title.
const HEADER_GAP_MM: f32 = 10.0;
/// Extra space after each body paragraph, as a fraction of the line height.
const PARAGRAPH_GAP: f32 = 0.5;
/// Offset of each successive shadow copy of the cover title.
const SHADOW_STEP_MM: f32 = 0.35;
/// Baseline-to-baseline distance of title lines, as a multiple of the size.
const COVER_TITLE_LEADING: f32 = 1.25;
const TITLE_PAGE_LEADING: f32 = 1.3;
/// Space kept between the cover title and the author band.
const TITLE_CLEARANCE_MM: f32 = 4.0;
/// Step used when shrinking a title to fit its area.
const TITLE_SHRINK: f32 = 0.9;

/// Strategy flags selected once per export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PainterPolicy {
    /// Dark band behind the author name when the cover has artwork.
    pub draw_author_band: bool,
    pub include_back_cover: bool,
    /// Chapter banner width / height, clamped to 2:1 ..= 16:3.
    pub banner_aspect: f32,
    /// Offset copies drawn under the cover title, clamped to 2..=4.
    pub shadow_passes: u8,
    pub cover_fallback: Rgba,
    pub back_cover_fallback: Rgba,
    /// Small print at the foot of the back cover.
    pub imprint: String,
    /// Page numbers in the bottom margin of chapter pages.
    pub page_numbers: bool,
}

impl Default for PainterPolicy {
    fn default() -> Self {
        Self {
            draw_author_band: true,
            include_back_cover: true,
            banner_aspect: 2.0,
            shadow_passes: 3,
            cover_fallback: [0.12, 0.16, 0.27, 1.0],
            back_cover_fallback: [0.08, 0.09, 0.12, 1.0],
            imprint: "Independently published".to_string(),
            page_numbers: true,
        }
    }
}

impl PainterPolicy {
    pub fn banner_aspect(&self) -> f32 {
        if self.banner_aspect.is_finite() {
            self.banner_aspect.clamp(2.0, 16.0 / 3.0)
        } else {
            2.0
        }
    }

    pub fn shadow_passes(&self) -> u8 {
        self.shadow_passes.clamp(2, 4)
    }
}

// ---------------------------------------------------------------------------
// Chapter numbering
// ---------------------------------------------------------------------------

/// Titles containing any of these mark the book as Spanish.
const SPANISH_MARKERS: [&str; 3] = ["capítulo", "introducc", "pról"];
/// Titles containing any of these are front matter and never numbered.
const SPECIAL_MARKERS: [&str; 5] = ["intro", "prologue", "prólogo", "preface", "prefacio"];

/// Word used for numbered chapter headers, chosen once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWord {
    Chapter,
    Capitulo,
}

impl HeaderWord {
    /// "Capítulo" if any title looks Spanish, otherwise "Chapter".
    pub fn detect<'t>(titles: impl IntoIterator<Item = &'t str>) -> Self {
        let spanish = titles.into_iter().any(|title| {
            let lower = title.to_lowercase();
            SPANISH_MARKERS.iter().any(|m| lower.contains(m))
        });
        if spanish {
            HeaderWord::Capitulo
        } else {
            HeaderWord::Chapter
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeaderWord::Chapter => "Chapter",
            HeaderWord::Capitulo => "Capítulo",
        }
    }
}

/// Introductions, prologues and prefaces (English or Spanish).
pub fn is_special_section(title: &str) -> bool {
    let lower = title.to_lowercase();
    SPECIAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Header decision for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterHeader {
    /// Front matter: no header, not counted.
    Unnumbered,
    /// Counted chapter. `drawn` is false when the title already starts with
    /// the header word.
    Numbered {
        number: u32,
        label: String,
        drawn: bool,
    },
}

/// Running chapter counter for one document.
#[derive(Debug, Clone)]
pub struct ChapterNumbering {
    word: HeaderWord,
    count: u32,
}

impl ChapterNumbering {
    pub fn new(word: HeaderWord) -> Self {
        Self { word, count: 0 }
    }

    pub fn for_chapters(chapters: &[Chapter]) -> Self {
        Self::new(HeaderWord::detect(chapters.iter().map(|c| c.title.as_str())))
    }

    pub fn word(&self) -> HeaderWord {
        self.word
    }

    /// Decide the header for the next chapter in document order.
    pub fn header_for(&mut self, title: &str) -> ChapterHeader {
        if is_special_section(title) {
            return ChapterHeader::Unnumbered;
        }
        self.count += 1;
        let word = self.word.as_str();
        let drawn = !title
            .trim_start()
            .to_lowercase()
            .starts_with(&word.to_lowercase());
        ChapterHeader::Numbered {
            number: self.count,
            label: format!("{word} {}", self.count),
            drawn,
        }
    }
}

// ---------------------------------------------------------------------------
// Painter
// ---------------------------------------------------------------------------

pub struct Painter<'a> {
    book: &'a Book,
    policy: &'a PainterPolicy,
    loader: &'a dyn ImageLoader,
    metrics: FontMetrics,
}

impl<'a> Painter<'a> {
    pub fn new(book: &'a Book, policy: &'a PainterPolicy, loader: &'a dyn ImageLoader) -> Self {
        Self {
            book,
            policy,
            loader,
            metrics: FontMetrics::default(),
        }
    }

    pub fn paint_front_cover(&self, ctx: &mut LayoutContext) {
        ctx.new_page(PageKind::FrontCover);
        let f = ctx.format;

        let has_art = match self.loader.load(self.book.cover_image_url.as_deref()) {
            Some(img) => {
                self.place_image(ctx, img, 0.0, 0.0, f.width, f.height);
                true
            }
            None => {
                ctx.push(rect(0.0, 0.0, f.width, f.height, self.policy.cover_fallback));
                false
            }
        };

        let title = or_placeholder(&self.book.title, UNTITLED);
        let band_top = f.height * 0.78;
        let band_height = f.height * 0.14;
        let mut y = f.height * 0.25;
        let (size, lines) = self.fit_title(
            title,
            f.content_width(),
            f.title_font_size * 1.5,
            f.title_font_size,
            FontFamily::SansBold,
            COVER_TITLE_LEADING,
            band_top - TITLE_CLEARANCE_MM - y,
        );
        for line in &lines {
            let x = self.metrics.centered_x(
                line,
                size,
                FontFamily::SansBold,
                f.margin_x,
                f.content_width(),
            );
            for pass in (1..=self.policy.shadow_passes()).rev() {
                let offset = SHADOW_STEP_MM * pass as f32;
                ctx.push(PageItem::Text(TextRun {
                    text: line.clone(),
                    x: x + offset,
                    y: y + offset,
                    font: FontFamily::SansBold,
                    size,
                    color: SHADOW,
                    role: TextRole::CoverShadow,
                }));
            }
            ctx.push(PageItem::Text(TextRun {
                text: line.clone(),
                x,
                y,
                font: FontFamily::SansBold,
                size,
                color: WHITE,
                role: TextRole::CoverTitle,
            }));
            y += size * PT_TO_MM * COVER_TITLE_LEADING;
        }

        if has_art && self.policy.draw_author_band {
            ctx.push(rect(0.0, band_top, f.width, band_height, BAND));
        }
        let author = or_placeholder(&self.book.author, UNKNOWN_AUTHOR);
        let author_size = f.chapter_header_font_size * 1.25;
        let baseline = band_top + band_height / 2.0 + author_size * PT_TO_MM * 0.35;
        self.centered(ctx, author, baseline, FontFamily::Sans, author_size, WHITE, TextRole::CoverAuthor);
    }

    pub fn paint_title_page(&self, ctx: &mut LayoutContext) {
        ctx.new_page(PageKind::TitlePage);
        let f = ctx.format;

        let mut y = f.height * 0.35;
        let byline_gap = f.line_height * 1.5;
        let title = or_placeholder(&self.book.title, UNTITLED);
        let (size, lines) = self.fit_title(
            title,
            f.content_width(),
            f.title_font_size,
            f.body_font_size,
            FontFamily::SerifBold,
            TITLE_PAGE_LEADING,
            f.content_bottom() - byline_gap - y,
        );
        for line in &lines {
            self.centered(ctx, line, y, FontFamily::SerifBold, size, INK, TextRole::Title);
            y += size * PT_TO_MM * TITLE_PAGE_LEADING;
        }

        y += byline_gap;
        let byline = format!("by {}", or_placeholder(&self.book.author, UNKNOWN_AUTHOR));
        self.centered(
            ctx,
            &byline,
            y,
            FontFamily::SerifItalic,
            f.body_font_size + 2.0,
            INK,
            TextRole::Byline,
        );
    }

    /// "About the Author". Callers only invoke this when the book has a bio
    /// or portrait; either may still be missing.
    pub fn paint_author_page(&self, ctx: &mut LayoutContext) {
        ctx.new_page(PageKind::AuthorPage);
        let f = ctx.format;
        let column = f.content_width();

        if let Some(img) = self.loader.load(non_blank(&self.book.author_image_url)) {
            let side = (column * 0.4).min(50.0);
            let x = f.margin_x + (column - side) / 2.0;
            let y = ctx.cursor_y;
            ctx.push(PageItem::Frame {
                x: x - 1.5,
                y: y - 1.5,
                width: side + 3.0,
                height: side + 3.0,
                stroke: 0.5,
                color: MUTED,
            });
            // Fit inside the square without distorting the portrait.
            let aspect = img.aspect_ratio();
            let (w, h) = if aspect >= 1.0 {
                (side, side / aspect)
            } else {
                (side * aspect, side)
            };
            self.place_image(ctx, img, x + (side - w) / 2.0, y + (side - h) / 2.0, w, h);
            ctx.advance(side + 12.0);
        }

        let heading_size = f.chapter_header_font_size;
        ctx.advance(heading_size * PT_TO_MM);
        let y = ctx.cursor_y;
        self.centered(ctx, "About the Author", y, FontFamily::SerifBold, heading_size, INK, TextRole::Heading);
        ctx.advance(f.line_height * 1.5);

        if let Some(bio) = non_blank(&self.book.author_bio) {
            let narrow = column * 0.8;
            let left = f.margin_x + (column - narrow) / 2.0;
            for para in paragraphs(bio) {
                for line in wrap_text(para, narrow, f.body_font_size, FontFamily::Serif, &self.metrics) {
                    ctx.ensure_room(f.line_height);
                    let x = self.metrics.centered_x(&line, f.body_font_size, FontFamily::Serif, left, narrow);
                    let y = ctx.cursor_y;
                    ctx.push(PageItem::Text(TextRun {
                        text: line,
                        x,
                        y,
                        font: FontFamily::Serif,
                        size: f.body_font_size,
                        color: INK,
                        role: TextRole::Bio,
                    }));
                    ctx.advance(f.line_height);
                }
                ctx.advance(f.line_height * PARAGRAPH_GAP);
            }
        }
    }

    /// Paint one chapter starting on a fresh page and return the header
    /// decision that was applied.
    pub fn paint_chapter(
        &self,
        ctx: &mut LayoutContext,
        chapter: &Chapter,
        numbering: &mut ChapterNumbering,
    ) -> ChapterHeader {
        ctx.new_page(PageKind::Chapter);
        let f = ctx.format;
        let width = f.content_width();

        if let Some(img) = self.loader.load(chapter.image_url.as_deref()) {
            let height = width / self.policy.banner_aspect();
            let y = ctx.cursor_y;
            self.place_image(ctx, img, f.margin_x, y, width, height);
            ctx.advance(height + BANNER_GAP_MM);
        }

        let header = numbering.header_for(&chapter.title);
        if let ChapterHeader::Numbered {
            label, drawn: true, ..
        } = &header
        {
            let size = f.chapter_header_font_size;
            ctx.ensure_room(size * PT_TO_MM);
            ctx.advance(size * PT_TO_MM);
            let y = ctx.cursor_y;
            self.centered(ctx, label, y, FontFamily::Sans, size, MUTED, TextRole::ChapterHeader);
            ctx.advance(HEADER_GAP_MM);
        }

        let title_size = f.title_font_size;
        let title_lines: Vec<String> =
            wrap_text(&chapter.title, width, title_size, FontFamily::SerifBold, &self.metrics).collect();
        for line in &title_lines {
            ctx.ensure_room(title_size * PT_TO_MM);
            ctx.advance(title_size * PT_TO_MM);
            let y = ctx.cursor_y;
            self.centered(ctx, line, y, FontFamily::SerifBold, title_size, INK, TextRole::ChapterTitle);
            ctx.advance(title_size * PT_TO_MM * 0.3);
        }
        ctx.advance(f.line_height * 2.0);

        for para in paragraphs(&chapter.content) {
            for line in wrap_text(para, width, f.body_font_size, FontFamily::Serif, &self.metrics) {
                ctx.ensure_room(f.line_height);
                let y = ctx.cursor_y;
                ctx.push(PageItem::Text(TextRun {
                    text: line,
                    x: f.margin_x,
                    y,
                    font: FontFamily::Serif,
                    size: f.body_font_size,
                    color: INK,
                    role: TextRole::Body,
                }));
                ctx.advance(f.line_height);
            }
            ctx.advance(f.line_height * PARAGRAPH_GAP);
        }

        log::debug!(
            "Painted chapter {:?} ({:?}), now on page {}",
            chapter.title,
            header,
            ctx.page_count()
        );
        header
    }

    pub fn paint_back_cover(&self, ctx: &mut LayoutContext) {
        ctx.new_page(PageKind::BackCover);
        let f = ctx.format;

        match self.loader.load(self.book.back_cover_image_url.as_deref()) {
            Some(img) => self.place_image(ctx, img, 0.0, 0.0, f.width, f.height),
            None => ctx.push(rect(0.0, 0.0, f.width, f.height, self.policy.back_cover_fallback)),
        }

        let blurb = self.book.description.trim();
        if !blurb.is_empty() {
            let box_y = f.height * 0.18;
            let box_height = f.height * 0.45;
            ctx.push(rect(f.margin_x, box_y, f.content_width(), box_height, BLURB_BOX));

            let pad = 8.0;
            let column = f.content_width() - 2.0 * pad;
            let left = f.margin_x + pad;
            let limit = box_y + box_height - pad;
            let mut y = box_y + pad + f.body_font_size * PT_TO_MM;
            'blurb: for para in paragraphs(blurb) {
                for line in wrap_text(para, column, f.body_font_size, FontFamily::Serif, &self.metrics) {
                    if y > limit {
                        log::debug!("Back cover blurb truncated to fit its box");
                        break 'blurb;
                    }
                    let x = self.metrics.centered_x(&line, f.body_font_size, FontFamily::Serif, left, column);
                    ctx.push(PageItem::Text(TextRun {
                        text: line,
                        x,
                        y,
                        font: FontFamily::Serif,
                        size: f.body_font_size,
                        color: WHITE,
                        role: TextRole::Blurb,
                    }));
                    y += f.line_height;
                }
                y += f.line_height * PARAGRAPH_GAP;
            }
        }

        // Barcode block.
        let (bw, bh) = (38.0, 22.0);
        ctx.push(rect(
            f.width - f.margin_x - bw,
            f.content_bottom() - bh,
            bw,
            bh,
            WHITE,
        ));

        if !self.policy.imprint.trim().is_empty() {
            ctx.push(PageItem::Text(TextRun {
                text: self.policy.imprint.trim().to_string(),
                x: f.margin_x,
                y: f.content_bottom() - 2.0,
                font: FontFamily::Sans,
                size: 8.0,
                color: WHITE,
                role: TextRole::Imprint,
            }));
        }
    }

    /// Number every chapter page in the middle of its bottom margin.
    pub fn stamp_folios(&self, ctx: &mut LayoutContext) {
        let f = ctx.format;
        let size = 9.0;
        let y = f.height - f.margin_bottom / 2.0;
        for page in ctx.pages_mut() {
            if page.kind != PageKind::Chapter {
                continue;
            }
            let text = (page.page_index + 1).to_string();
            let x = self.metrics.centered_x(&text, size, FontFamily::Serif, 0.0, f.width);
            page.items.push(PageItem::Text(TextRun {
                text,
                x,
                y,
                font: FontFamily::Serif,
                size,
                color: MUTED,
                role: TextRole::Folio,
            }));
        }
    }

    /// Wrap a display title so that its lines, `leading` apart, take no more
    /// than `max_height` mm. The size shrinks from `size` towards `min_size`;
    /// lines that still do not fit are dropped.
    #[allow(clippy::too_many_arguments)]
    fn fit_title(
        &self,
        title: &str,
        width: f32,
        size: f32,
        min_size: f32,
        family: FontFamily,
        leading: f32,
        max_height: f32,
    ) -> (f32, Vec<String>) {
        let mut size = size;
        loop {
            let mut lines: Vec<String> =
                wrap_text(title, width, size, family, &self.metrics).collect();
            let step = size * PT_TO_MM * leading;
            if lines.len() as f32 * step <= max_height {
                return (size, lines);
            }
            if size <= min_size {
                let keep = ((max_height / step).floor().max(1.0)) as usize;
                log::debug!("Title cut to {keep} of {} lines", lines.len());
                lines.truncate(keep);
                return (size, lines);
            }
            size = (size * TITLE_SHRINK).max(min_size);
        }
    }

    fn place_image(&self, ctx: &mut LayoutContext, image: LoadedImage, x: f32, y: f32, width: f32, height: f32) {
        let image_id = ctx.register_image(image);
        ctx.push(PageItem::Image {
            image_id,
            x,
            y,
            width,
            height,
        });
    }

    /// One line centred across the content column.
    #[allow(clippy::too_many_arguments)]
    fn centered(
        &self,
        ctx: &mut LayoutContext,
        text: &str,
        y: f32,
        font: FontFamily,
        size: f32,
        color: Rgba,
        role: TextRole,
    ) {
        let f = ctx.format;
        let x = self
            .metrics
            .centered_x(text, size, font, f.margin_x, f.content_width());
        ctx.push(PageItem::Text(TextRun {
            text: text.to_string(),
            x,
            y,
            font,
            size,
            color,
            role,
        }));
    }
}

fn rect(x: f32, y: f32, width: f32, height: f32, color: Rgba) -> PageItem {
    PageItem::Rect {
        x,
        y,
        width,
        height,
        color,
    }
}

fn or_placeholder<'s>(value: &'s str, placeholder: &'s str) -> &'s str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}
