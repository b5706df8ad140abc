//! Layout pass for the export composition
//!
//! Mirrors the on-screen arrangement: a full-bleed background and, when a
//! quote is present, a centered overlay block holding the wrapped content
//! and a smaller attribution line.

use crate::rendering::font::Typeface;
use crate::rendering::MAX_SURFACE_SIDE;
use crate::{Quote, Size};

/// Overlay width relative to the container
pub const OVERLAY_WIDTH_RATIO: f32 = 0.85;
/// Inner padding of the overlay, logical units
pub const OVERLAY_PADDING: u32 = 24;
pub const CONTENT_FONT_SIZE: f32 = 22.0;
pub const CONTENT_LINE_HEIGHT: f32 = 1.4;
pub const AUTHOR_FONT_SIZE: f32 = 15.0;
/// Space between the last content line and the attribution, logical units
pub const AUTHOR_GAP: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn center_x(&self) -> i32 {
        self.x + (self.width / 2) as i32
    }

    pub fn center_y(&self) -> i32 {
        self.y + (self.height / 2) as i32
    }
}

/// One line of text positioned by the top-left of its glyph box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteOverlay {
    pub rect: Rect,
    pub lines: Vec<TextLine>,
    pub attribution: TextLine,
}

/// The fully positioned composition, in output pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionLayout {
    pub width: u32,
    pub height: u32,
    pub image: Rect,
    pub overlay: Option<QuoteOverlay>,
}

/// Lay out the composition for a `size` canvas multiplied by `scale`.
///
/// `size` and `scale` are clamped to [`MAX_SURFACE_SIDE`] first, so the
/// arithmetic below stays in range; the rasterizer rejects any surface
/// larger than that.
pub fn compose(size: Size, scale: u32, quote: Option<&Quote>, typeface: &Typeface) -> CompositionLayout {
    let scale = scale.min(MAX_SURFACE_SIDE);
    let width = size.width.min(MAX_SURFACE_SIDE) * scale;
    let height = size.height.min(MAX_SURFACE_SIDE) * scale;
    let s = scale as f32;

    let image = Rect {
        x: 0,
        y: 0,
        width,
        height,
    };

    let overlay = quote.map(|q| {
        let box_w = (width as f32 * OVERLAY_WIDTH_RATIO).round() as u32;
        let padding = OVERLAY_PADDING * scale;
        let inner_w = box_w.saturating_sub(padding * 2) as f32;

        let content_px = CONTENT_FONT_SIZE * s;
        let content_lh = (content_px * CONTENT_LINE_HEIGHT).round() as u32;
        let author_px = AUTHOR_FONT_SIZE * s;
        let author_lh = (author_px * CONTENT_LINE_HEIGHT).round() as u32;
        let gap = AUTHOR_GAP * scale;

        let wrapped = wrap_text(&q.content, inner_w, content_px, typeface);
        let box_h = (padding as u64 * 2 + wrapped.len() as u64 * content_lh as u64 + gap as u64 + author_lh as u64)
            .min(u32::MAX as u64) as u32;

        let rect = Rect {
            x: ((width - box_w.min(width)) / 2) as i32,
            y: ((height as i64 - box_h as i64) / 2) as i32,
            width: box_w,
            height: box_h,
        };

        let center = |text: &str, px: f32| {
            let w = typeface.measure(text, px).round() as i32;
            rect.center_x() - w / 2
        };

        let mut y = rect.y.saturating_add(padding as i32);
        let lines = wrapped
            .into_iter()
            .map(|text| {
                let line = TextLine {
                    x: center(&text, content_px),
                    y: y.saturating_add(((content_lh as f32 - content_px) / 2.0).round() as i32),
                    text,
                    size: content_px,
                };
                y = y.saturating_add(content_lh as i32);
                line
            })
            .collect();

        y = y.saturating_add(gap as i32);
        let author_text = format!("- {}", q.author);
        let attribution = TextLine {
            x: center(&author_text, author_px),
            y: y.saturating_add(((author_lh as f32 - author_px) / 2.0).round() as i32),
            text: author_text,
            size: author_px,
        };

        QuoteOverlay {
            rect,
            lines,
            attribution,
        }
    });

    CompositionLayout {
        width,
        height,
        image,
        overlay,
    }
}

/// Greedy word wrap to `max_width` pixels. A word wider than a full line
/// gets a line of its own.
pub fn wrap_text(text: &str, max_width: f32, px: f32, typeface: &Typeface) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.is_empty() {
            cur.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", cur, word);
        if typeface.measure(&candidate, px) > max_width {
            lines.push(std::mem::replace(&mut cur, word.to_string()));
        } else {
            cur = candidate;
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
