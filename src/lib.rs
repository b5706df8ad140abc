//! Statuz
//!
//! Composes a randomly fetched background image with a randomly fetched
//! inspirational quote, lets callers cycle images and quotes by category,
//! and exports the composition as a PNG.
//!
//! # Features
//!
//! - **HTTP sources** (default, `http`): quote service and image CDN over `reqwest`
//! - **Native export**: layout, paint and raster passes replace the browser's
//!   DOM-to-canvas step, so exports work without a rendering host
//! - **Pluggable seams**: quote sources, image loaders, rasterizers and download
//!   sinks are traits, so tests drive everything in-process
//!
//! # Example
//!
//! ```no_run
//! use statuz::{AppConfig, Controller};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let controller = Controller::with_http_sources(config)?;
//! controller.mount().await?;
//! if let Some(download) = controller.export().await {
//!     println!("saved {}", download.location);
//! }
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod categories;
pub use categories::{Category, CATEGORIES};

pub mod quote;
pub use quote::{Quote, QuoteSource};

pub mod image_ref;
pub use image_ref::ImageRefGenerator;

pub mod image_load;
pub use image_load::{ImageElement, ImageLoader, LoadState};

pub mod state;
pub use state::ViewState;

// Layout / paint / raster passes used by the export pipeline
pub mod rendering;

pub mod export;
pub use export::{DataUrlSink, DirectorySink, Download, DownloadSink, ExportPipeline, Stage};

pub mod controller;
pub use controller::Controller;

/// Width/height pair in pixels (or logical units for export sizes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Export surface configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Logical export canvas, 9:16
    pub size: Size,
    /// Pixel multiplier applied to `size` and every layout constant
    pub scale: u32,
    /// Font used for the quote overlay; system fonts are probed when unset
    pub font_path: Option<PathBuf>,
    /// Where `DirectorySink` writes `quote-<ms>.png` files
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: Size::new(430, 764),
            scale: 1,
            font_path: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Configuration for the composer
///
/// The defaults point at the public quote API and image CDN and match the
/// packaging shell's identity.
///
/// # Examples
///
/// ```
/// let cfg = statuz::AppConfig::default();
/// assert_eq!(cfg.default_category, "technology");
/// assert_eq!(cfg.image_size.width, 1080);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display name of the application
    pub app_name: String,
    /// Application identifier contributed by the packaging shell
    pub app_id: String,
    /// User agent string sent with every request
    pub user_agent: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Quote API host; `/random?tags=<category>` is appended
    pub quote_api_base: String,
    /// Image CDN base; `/{width}/{height}` is appended
    pub image_base: String,
    /// Requested background dimensions
    pub image_size: Size,
    /// Category selected on mount
    pub default_category: String,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Statuz".to_string(),
            app_id: "com.statuz.app".to_string(),
            user_agent: format!("Statuz/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: 10_000,
            quote_api_base: "https://api.quotable.io".to_string(),
            image_base: "https://picsum.photos".to_string(),
            image_size: Size::new(1080, 1920),
            default_category: categories::DEFAULT_CATEGORY.to_string(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a (possibly partial) TOML document; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: AppConfig =
            toml::from_str(contents).map_err(|e| Error::ConfigError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values that would make requests or exports meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.image_size.width == 0 || self.image_size.height == 0 {
            return Err(Error::ConfigError("image_size must be non-zero".into()));
        }
        if self.export.size.width == 0 || self.export.size.height == 0 {
            return Err(Error::ConfigError("export.size must be non-zero".into()));
        }
        if self.export.scale == 0 {
            return Err(Error::ConfigError("export.scale must be at least 1".into()));
        }
        for (axis, side) in [("width", self.export.size.width), ("height", self.export.size.height)] {
            match side.checked_mul(self.export.scale) {
                Some(px) if px <= rendering::MAX_SURFACE_SIDE => {}
                _ => {
                    return Err(Error::ConfigError(format!(
                        "export {} {} x scale {} exceeds {} pixels",
                        axis,
                        side,
                        self.export.scale,
                        rendering::MAX_SURFACE_SIDE
                    )))
                }
            }
        }
        Category::parse(&self.default_category)
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        #[cfg(feature = "http")]
        for (key, value) in [
            ("quote_api_base", &self.quote_api_base),
            ("image_base", &self.image_base),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::ConfigError(format!("{} is not a URL: {}", key, e)))?;
        }

        Ok(())
    }

    /// The configured default category, falling back to the registry default.
    pub fn default_category(&self) -> Category {
        Category::parse(&self.default_category).unwrap_or_default()
    }
}
