//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Only builtin fonts are used (Times for book text, Helvetica for cover
//! typography). Translucent fills go through extended graphics states, one
//! per distinct alpha value.

use std::collections::HashMap;

use printpdf::*;

use crate::fonts::FontFamily;
use crate::layout_config::*;

/// Millimetres → PDF points.
const MM_TO_PT: f32 = 2.834_646;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Per-document resources shared by all pages.
struct Resources {
    images: HashMap<String, ImageResource>,
    alphas: HashMap<u32, ExtendedGraphicsStateId>,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images that printpdf cannot embed are skipped with a `log::warn`.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>, String> {
    let page_w = Mm(config.page_width_mm);
    let page_h = Mm(config.page_height_mm);
    let page_h_pt = config.page_height_mm * MM_TO_PT;

    let title = if config.title.trim().is_empty() {
        "Untitled"
    } else {
        config.title.as_str()
    };
    let mut doc = PdfDocument::new(title);

    // ── Pre-register images and translucency states ───────────────────────
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let mut resources = Resources {
        images: HashMap::new(),
        alphas: HashMap::new(),
    };

    for (id, image) in &config.images {
        let raw = match RawImage::decode_from_bytes(&image.bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping image {id} — PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        resources.images.insert(
            id.clone(),
            ImageResource {
                xobj_id,
                px_width: image.px_width,
                px_height: image.px_height,
            },
        );
    }

    for page_layout in &config.pages {
        for item in &page_layout.items {
            let alpha = item_alpha(item);
            if alpha < 1.0 {
                resources.alphas.entry(alpha_key(alpha)).or_insert_with(|| {
                    doc.add_graphics_state(
                        ExtendedGraphicsState::default()
                            .with_current_fill_alpha(alpha)
                            .with_current_stroke_alpha(alpha),
                    )
                });
            }
        }
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::new();

    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for item in &page_layout.items {
            render_item(&mut ops, item, page_h_pt, &resources);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if bytes.is_empty() {
        return Err("PDF serialisation produced no output".to_string());
    }

    Ok(bytes)
}

fn item_alpha(item: &PageItem) -> f32 {
    let alpha = match item {
        PageItem::Rect { color, .. } | PageItem::Frame { color, .. } => color[3],
        PageItem::Text(run) => run.color[3],
        PageItem::Image { .. } => 1.0,
    };
    alpha.clamp(0.0, 1.0)
}

/// Alpha quantised to thousandths so equal alphas share one state.
fn alpha_key(alpha: f32) -> u32 {
    (alpha * 1000.0).round() as u32
}

fn builtin_font(family: FontFamily) -> BuiltinFont {
    match family {
        FontFamily::Serif => BuiltinFont::TimesRoman,
        FontFamily::SerifBold => BuiltinFont::TimesBold,
        FontFamily::SerifItalic => BuiltinFont::TimesItalic,
        FontFamily::Sans => BuiltinFont::Helvetica,
        FontFamily::SansBold => BuiltinFont::HelveticaBold,
    }
}

fn rgb(c: &Rgba) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Corners of a box given in page millimetres (top-left origin), converted
/// to PDF points (bottom-left origin).
fn corners(x: f32, y: f32, width: f32, height: f32, page_h_pt: f32) -> Vec<LinePoint> {
    let x1 = x * MM_TO_PT;
    let x2 = (x + width) * MM_TO_PT;
    let y_top = page_h_pt - y * MM_TO_PT;
    let y_bottom = page_h_pt - (y + height) * MM_TO_PT;
    vec![
        point(x1, y_bottom),
        point(x2, y_bottom),
        point(x2, y_top),
        point(x1, y_top),
    ]
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trade mark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0xFF; printpdf passes these
    // bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn render_item(ops: &mut Vec<Op>, item: &PageItem, page_h_pt: f32, res: &Resources) {
    let alpha = item_alpha(item);
    let translucent = if alpha < 1.0 {
        res.alphas.get(&alpha_key(alpha))
    } else {
        None
    };
    if let Some(gs) = translucent {
        ops.push(Op::SaveGraphicsState);
        ops.push(Op::LoadGraphicsState { gs: gs.clone() });
    }

    match item {
        PageItem::Rect {
            x,
            y,
            width,
            height,
            color,
        } => {
            ops.push(Op::SetFillColor { col: rgb(color) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: corners(*x, *y, *width, *height, page_h_pt),
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        PageItem::Frame {
            x,
            y,
            width,
            height,
            stroke,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: rgb(color) });
            ops.push(Op::SetOutlineThickness {
                pt: Pt(stroke * MM_TO_PT),
            });
            ops.push(Op::DrawLine {
                line: Line {
                    points: corners(*x, *y, *width, *height, page_h_pt),
                    is_closed: true,
                },
            });
        }
        PageItem::Text(run) => {
            if !run.text.is_empty() {
                let font = builtin_font(run.font);
                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(run.x * MM_TO_PT),
                        y: Pt(page_h_pt - run.y * MM_TO_PT),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(run.size),
                    font,
                });
                ops.push(Op::SetFillColor { col: rgb(&run.color) });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_winlatin(&run.text))],
                    font,
                });
                ops.push(Op::EndTextSection);
            }
        }
        PageItem::Image {
            image_id,
            x,
            y,
            width,
            height,
        } => match res.images.get(image_id) {
            Some(img) => {
                let width_pt = width * MM_TO_PT;
                let height_pt = height * MM_TO_PT;
                // At dpi=72 printpdf renders 1 px = 1 pt, so
                // scale = desired_pt / px_dim.
                let scale_x = if img.px_width > 0 {
                    width_pt / img.px_width as f32
                } else {
                    1.0
                };
                let scale_y = if img.px_height > 0 {
                    height_pt / img.px_height as f32
                } else {
                    1.0
                };
                ops.push(Op::UseXobject {
                    id: img.xobj_id.clone(),
                    transform: XObjectTransform {
                        translate_x: Some(Pt(x * MM_TO_PT)),
                        translate_y: Some(Pt(page_h_pt - (y + height) * MM_TO_PT)),
                        dpi: Some(72.0),
                        scale_x: Some(scale_x),
                        scale_y: Some(scale_y),
                        rotate: None,
                    },
                });
            }
            None => log::warn!("Image {image_id} was not embedded, leaving its area blank"),
        },
    }

    if translucent.is_some() {
        ops.push(Op::RestoreGraphicsState);
    }
}
