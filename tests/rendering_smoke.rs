use statuz::rendering::layout::compose;
use statuz::rendering::paint::build_display_list;
use statuz::rendering::{PixelRasterizer, Rasterize, Typeface};
use statuz::{Error, Quote, Size};
use std::sync::Arc;

#[test]
fn smoke_rasterize_without_background() {
    let typeface = Arc::new(Typeface::none());
    let layout = compose(Size::new(256, 128), 1, Some(&Quote::new("Hi", "Me")), &typeface);
    let commands = build_display_list(&layout);
    let s = PixelRasterizer::new(typeface)
        .rasterize(256, 128, &commands, None)
        .unwrap();
    assert_eq!(s.width, 256);
    assert_eq!(s.height, 128);
    assert_eq!(&s.png_data[0..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn smoke_default_font_draws_quote_and_attribution() {
    let typeface = Arc::new(Typeface::load(None).unwrap());
    let layout = compose(Size::new(430, 764), 2, Some(&Quote::new("Stay hungry.", "Steve Jobs")), &typeface);
    let commands = build_display_list(&layout);
    let s = PixelRasterizer::new(typeface)
        .rasterize(860, 1528, &commands, None)
        .unwrap();
    let decoded = image::load_from_memory(&s.png_data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (860, 1528));
}

#[test]
fn smoke_bundled_font_paints_glyphs_inside_overlay() {
    let typeface = Arc::new(Typeface::bundled().unwrap());
    let layout = compose(Size::new(430, 764), 1, Some(&Quote::new("Stay hungry.", "Steve Jobs")), &typeface);
    let overlay = layout.overlay.clone().unwrap();
    let commands = build_display_list(&layout);
    let canvas = PixelRasterizer::new(typeface)
        .paint(430, 764, &commands, None)
        .unwrap();

    let rect = &overlay.rect;
    let split = overlay.attribution.y as u32;
    let (mut content_white, mut author_lit, mut author_max, mut outside_lit) = (0, 0, 0u8, 0);
    for (x, y, px) in canvas.enumerate_pixels() {
        let inside = (x as i32) >= rect.x
            && (x as i32) < rect.x + rect.width as i32
            && (y as i32) >= rect.y
            && (y as i32) < rect.y + rect.height as i32;
        let r = px.0[0];
        if !inside {
            if r > 0 {
                outside_lit += 1;
            }
        } else if y < split {
            if r > 225 {
                content_white += 1;
            }
        } else if r > 0 {
            author_lit += 1;
            author_max = author_max.max(r);
        }
    }

    assert!(content_white > 20, "only {} white content pixels", content_white);
    assert!(author_lit > 20, "only {} attribution pixels", author_lit);
    // the attribution is drawn in the lighter grey, never full white
    assert!(author_max <= 220, "attribution peaked at {}", author_max);
    assert_eq!(outside_lit, 0);
}

#[test]
fn smoke_zero_surface_is_a_render_error() {
    let err = PixelRasterizer::new(Arc::new(Typeface::none()))
        .rasterize(0, 10, &[], None)
        .unwrap_err();
    assert!(matches!(err, Error::RenderError(_)));
}
