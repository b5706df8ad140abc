//! Rendering passes for the export composition: layout, paint, raster

pub mod font;
pub mod layout;
pub mod paint;
pub mod raster;

pub use font::Typeface;
pub use raster::{PixelRasterizer, Rasterize};

/// Largest export surface side, in pixels, after scaling.
pub const MAX_SURFACE_SIDE: u32 = 8192;

/// An encoded export bitmap.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}
