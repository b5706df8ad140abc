//! Rasterizer: executes a display list onto an RGBA buffer and encodes PNG

use crate::rendering::font::Typeface;
use crate::rendering::paint::PaintCommand;
use crate::rendering::{Screenshot, MAX_SURFACE_SIDE};
use crate::{Error, Result};
use ab_glyph::PxScale;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Turns paint commands into a PNG screenshot.
pub trait Rasterize: Send + Sync {
    fn rasterize(
        &self,
        width: u32,
        height: u32,
        commands: &[PaintCommand],
        background: Option<&DynamicImage>,
    ) -> Result<Screenshot>;
}

/// CPU rasterizer built on `image` + `imageproc`.
pub struct PixelRasterizer {
    typeface: Arc<Typeface>,
    warned_no_font: AtomicBool,
}

impl PixelRasterizer {
    pub fn new(typeface: Arc<Typeface>) -> Self {
        Self {
            typeface,
            warned_no_font: AtomicBool::new(false),
        }
    }

    pub fn typeface(&self) -> &Arc<Typeface> {
        &self.typeface
    }

    /// Draw the commands without encoding.
    pub fn paint(
        &self,
        width: u32,
        height: u32,
        commands: &[PaintCommand],
        background: Option<&DynamicImage>,
    ) -> Result<RgbaImage> {
        if width == 0 || height == 0 || width > MAX_SURFACE_SIDE || height > MAX_SURFACE_SIDE {
            return Err(Error::RenderError(format!(
                "cannot rasterize a {}x{} surface",
                width, height
            )));
        }

        let mut canvas = RgbaImage::new(width, height);
        for cmd in commands {
            match cmd {
                PaintCommand::SolidRect { x, y, width, height, rgba } => {
                    fill_rect(&mut canvas, *x, *y, *width, *height, *rgba);
                }
                PaintCommand::CoverImage { x, y, width, height } => match background {
                    Some(src) => draw_cover(&mut canvas, *x, *y, *width, *height, src)?,
                    None => log::debug!("no background image; leaving backdrop"),
                },
                PaintCommand::Text { x, y, text, size, rgba } => match self.typeface.font() {
                    Some(font) => {
                        let (r, g, b, a) = *rgba;
                        draw_text_mut(
                            &mut canvas,
                            Rgba([r, g, b, a]),
                            *x,
                            *y,
                            PxScale::from(*size),
                            font,
                            text,
                        );
                    }
                    None => {
                        if !self.warned_no_font.swap(true, Ordering::Relaxed) {
                            log::warn!("no font loaded; skipping overlay text");
                        }
                    }
                },
            }
        }
        Ok(canvas)
    }
}

impl Rasterize for PixelRasterizer {
    fn rasterize(
        &self,
        width: u32,
        height: u32,
        commands: &[PaintCommand],
        background: Option<&DynamicImage>,
    ) -> Result<Screenshot> {
        let canvas = self.paint(width, height, commands, background)?;
        let png_data = encode_png(&canvas)?;
        Ok(Screenshot {
            width,
            height,
            png_data,
        })
    }
}

/// Fill the part of the rectangle that lies on the canvas, blending by alpha.
fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, rgba: (u8, u8, u8, u8)) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = (x as i64).clamp(0, cw);
    let y0 = (y as i64).clamp(0, ch);
    let x1 = (x as i64 + w as i64).clamp(0, cw);
    let y1 = (y as i64 + h as i64).clamp(0, ch);
    let color = Rgba([rgba.0, rgba.1, rgba.2, rgba.3]);

    for py in y0..y1 {
        for px in x0..x1 {
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            if rgba.3 == 255 {
                *pixel = color;
            } else {
                pixel.blend(&color);
            }
        }
    }
}

/// Source rectangle `(x, y, w, h)` that, scaled uniformly, covers a
/// `dst_w`×`dst_h` box while keeping the source centered.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    let scale = f64::max(dst_w as f64 / src_w as f64, dst_h as f64 / src_h as f64);
    let crop_w = ((dst_w as f64 / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((dst_h as f64 / scale).round() as u32).clamp(1, src_h);
    ((src_w - crop_w) / 2, (src_h - crop_h) / 2, crop_w, crop_h)
}

fn draw_cover(canvas: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, src: &DynamicImage) -> Result<()> {
    if src.width() == 0 || src.height() == 0 {
        return Err(Error::RenderError("background image has no pixels".into()));
    }
    if w == 0 || h == 0 {
        return Ok(());
    }
    let (cx, cy, cw, ch) = cover_crop(src.width(), src.height(), w, h);
    let cropped = imageops::crop_imm(src, cx, cy, cw, ch).to_image();
    let fitted = imageops::resize(&cropped, w, h, FilterType::Triangle);
    imageops::overlay(canvas, &fitted, x as i64, y as i64);
    Ok(())
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::paint::OVERLAY_FILL;

    fn split_source() -> DynamicImage {
        // left half red, right half blue
        let img = RgbaImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn cover_crop_keeps_center() {
        assert_eq!(cover_crop(1080, 1920, 430, 764), (0, 0, 1080, 1919));
        assert_eq!(cover_crop(200, 100, 50, 100), (75, 0, 50, 100));
        assert_eq!(cover_crop(100, 100, 200, 50), (0, 37, 100, 25));
    }

    #[test]
    fn cover_image_crops_instead_of_squashing() {
        let r = PixelRasterizer::new(Arc::new(Typeface::none()));
        let cmds = [PaintCommand::CoverImage { x: 0, y: 0, width: 50, height: 100 }];
        let canvas = r.paint(50, 100, &cmds, Some(&split_source())).unwrap();
        assert_eq!(canvas.get_pixel(5, 50).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(45, 50).0, [0, 0, 255, 255]);
    }

    #[test]
    fn translucent_rect_darkens() {
        let r = PixelRasterizer::new(Arc::new(Typeface::none()));
        let cmds = [
            PaintCommand::SolidRect { x: 0, y: 0, width: 10, height: 10, rgba: (255, 255, 255, 255) },
            PaintCommand::SolidRect { x: 2, y: 2, width: 100, height: 100, rgba: OVERLAY_FILL },
        ];
        let canvas = r.paint(10, 10, &cmds, None).unwrap();
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255, 255]);
        let inside = canvas.get_pixel(5, 5).0;
        assert!(inside[0] > 80 && inside[0] < 120, "got {:?}", inside);
        assert_eq!(inside[3], 255);
    }

    #[test]
    fn rasterize_emits_png() {
        let r = PixelRasterizer::new(Arc::new(Typeface::none()));
        let cmds = [PaintCommand::Text { x: 0, y: 0, text: "hi".into(), size: 12.0, rgba: (255, 255, 255, 255) }];
        let shot = r.rasterize(16, 8, &cmds, None).unwrap();
        assert_eq!((shot.width, shot.height), (16, 8));
        assert_eq!(&shot.png_data[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn zero_or_oversized_surface_is_an_error() {
        let r = PixelRasterizer::new(Arc::new(Typeface::none()));
        assert!(matches!(r.rasterize(0, 10, &[], None), Err(Error::RenderError(_))));
        assert!(matches!(
            r.rasterize(MAX_SURFACE_SIDE + 1, 10, &[], None),
            Err(Error::RenderError(_))
        ));
    }
}
