//! Paint commands for the export composition

use crate::rendering::layout::CompositionLayout;

pub const BACKDROP: (u8, u8, u8, u8) = (0, 0, 0, 255);
/// Semi-opaque dark panel behind the quote
pub const OVERLAY_FILL: (u8, u8, u8, u8) = (0, 0, 0, 153);
pub const CONTENT_COLOR: (u8, u8, u8, u8) = (255, 255, 255, 255);
pub const AUTHOR_COLOR: (u8, u8, u8, u8) = (220, 220, 220, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Alpha-blended fill; an opaque `rgba` replaces what is underneath.
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    /// The background image, cover-fit into the box.
    CoverImage {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        size: f32,
        rgba: (u8, u8, u8, u8),
    },
}

/// Flatten a layout into back-to-front paint order.
pub fn build_display_list(layout: &CompositionLayout) -> Vec<PaintCommand> {
    let mut cmds = vec![
        PaintCommand::SolidRect {
            x: 0,
            y: 0,
            width: layout.width,
            height: layout.height,
            rgba: BACKDROP,
        },
        PaintCommand::CoverImage {
            x: layout.image.x,
            y: layout.image.y,
            width: layout.image.width,
            height: layout.image.height,
        },
    ];

    if let Some(overlay) = &layout.overlay {
        cmds.push(PaintCommand::SolidRect {
            x: overlay.rect.x,
            y: overlay.rect.y,
            width: overlay.rect.width,
            height: overlay.rect.height,
            rgba: OVERLAY_FILL,
        });
        for line in &overlay.lines {
            cmds.push(PaintCommand::Text {
                x: line.x,
                y: line.y,
                text: line.text.clone(),
                size: line.size,
                rgba: CONTENT_COLOR,
            });
        }
        cmds.push(PaintCommand::Text {
            x: overlay.attribution.x,
            y: overlay.attribution.y,
            text: overlay.attribution.text.clone(),
            size: overlay.attribution.size,
            rgba: AUTHOR_COLOR,
        });
    }

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::font::Typeface;
    use crate::rendering::layout::compose;
    use crate::{Quote, Size};

    #[test]
    fn background_only_list() {
        let layout = compose(Size::new(430, 764), 1, None, &Typeface::none());
        let cmds = build_display_list(&layout);
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            PaintCommand::SolidRect { rgba, width, .. } => {
                assert_eq!(*rgba, BACKDROP);
                assert_eq!(*width, 430);
            }
            _ => panic!("unexpected"),
        }
        assert!(matches!(cmds[1], PaintCommand::CoverImage { .. }));
    }

    #[test]
    fn quote_adds_panel_then_text() {
        let q = Quote::new("Test quote", "Tester");
        let layout = compose(Size::new(430, 764), 1, Some(&q), &Typeface::none());
        let cmds = build_display_list(&layout);
        assert_eq!(cmds.len(), 5);
        assert!(matches!(cmds[2], PaintCommand::SolidRect { rgba: OVERLAY_FILL, .. }));
        match (&cmds[3], &cmds[4]) {
            (
                PaintCommand::Text { text: content, rgba: c1, .. },
                PaintCommand::Text { text: author, rgba: c2, .. },
            ) => {
                assert_eq!(content, "Test quote");
                assert_eq!(author, "- Tester");
                assert_eq!(*c1, CONTENT_COLOR);
                assert_eq!(*c2, AUTHOR_COLOR);
            }
            _ => panic!("unexpected"),
        }
    }
}
