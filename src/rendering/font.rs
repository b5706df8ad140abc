//! Font loading and text measurement for the quote overlay

use crate::{Error, Result};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use std::path::{Path, PathBuf};

/// Probed in order when no font path is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// DejaVu Sans, used when neither a configured nor a system font loads.
/// License in `assets/fonts/LICENSE-DejaVu.txt`.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Average advance of a glyph relative to its pixel size, used without a font.
const ESTIMATED_ADVANCE: f32 = 0.55;

/// The face used for overlay text. [`Typeface::none`] is empty: text is
/// measured by estimate and not drawn.
pub struct Typeface {
    font: Option<FontVec>,
    origin: Option<PathBuf>,
}

impl Typeface {
    /// Load `explicit` when given (failure is an error), otherwise probe the
    /// well-known system locations and fall back to the bundled face.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let bytes = std::fs::read(path).map_err(|e| {
                Error::ConfigError(format!("Failed to read font {}: {}", path.display(), e))
            })?;
            let mut face = Self::from_bytes(bytes)?;
            face.origin = Some(path.to_path_buf());
            return Ok(face);
        }

        for candidate in SYSTEM_FONTS.iter().map(Path::new) {
            let Ok(bytes) = std::fs::read(candidate) else { continue };
            match Self::from_bytes(bytes) {
                Ok(mut face) => {
                    log::debug!("using system font {}", candidate.display());
                    face.origin = Some(candidate.to_path_buf());
                    return Ok(face);
                }
                Err(e) => log::debug!("skipping {}: {}", candidate.display(), e),
            }
        }

        log::debug!("no system font found; using the bundled face");
        Self::bundled()
    }

    /// The face compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_bytes(BUNDLED_FONT.to_vec())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| Error::ConfigError(format!("Invalid font data: {}", e)))?;
        Ok(Self {
            font: Some(font),
            origin: None,
        })
    }

    pub fn none() -> Self {
        Self {
            font: None,
            origin: None,
        }
    }

    pub fn font(&self) -> Option<&FontVec> {
        self.font.as_ref()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Horizontal advance of `text` at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        let Some(font) = &self.font else {
            return text.chars().count() as f32 * px * ESTIMATED_ADVANCE;
        };

        let scaled = font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("loaded", &self.font.is_some())
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_face_estimates_width() {
        let face = Typeface::none();
        assert!(face.font().is_none());
        let w = face.measure("abcd", 20.0);
        assert!((w - 44.0).abs() < 0.01);
    }

    #[test]
    fn explicit_missing_font_is_an_error() {
        let err = Typeface::load(Some(Path::new("/definitely/not/here.ttf"))).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn bundled_face_loads_and_measures() {
        let face = Typeface::bundled().unwrap();
        assert!(face.font().is_some());
        assert!(face.origin().is_none());
        let short = face.measure("it", 22.0);
        let long = face.measure("inventing it", 22.0);
        assert!(short > 0.0 && long > short);
    }

    #[test]
    fn probing_always_yields_a_font() {
        assert!(Typeface::load(None).unwrap().font().is_some());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(Typeface::from_bytes(vec![0, 1, 2, 3]).is_err());
    }
}
