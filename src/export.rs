//! Export pipeline: off-screen composition, rasterization and delivery.
//!
//! An export attaches an [`OffscreenContainer`] to the [`Stage`], waits for
//! the duplicated image to finish loading, rasterizes the composition on the
//! blocking pool, detaches the container and hands the PNG to a
//! [`DownloadSink`]. The container guard detaches on drop, so the stage is
//! clean after every outcome.

use crate::image_ref::MillisTokens;
use crate::rendering::layout::{compose, CompositionLayout};
use crate::rendering::paint::build_display_list;
use crate::rendering::{PixelRasterizer, Rasterize, Typeface};
use crate::{Error, ExportConfig, ImageElement, Quote, Result, Size};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// `quote-<unix-ms>.png`
pub fn export_filename(unix_ms: u64) -> String {
    format!("quote-{}.png", unix_ms)
}

/// The surface off-screen containers are attached to while an export runs.
#[derive(Debug, Default)]
pub struct Stage {
    next_id: AtomicU64,
    attached: Mutex<Vec<u64>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a container holding `layout` and a duplicate of `image`.
    pub fn attach(&self, layout: CompositionLayout, image: &ImageElement) -> OffscreenContainer<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
        log::debug!("attached off-screen container #{}", id);
        OffscreenContainer {
            stage: self,
            id,
            layout,
            image: image.clone(),
        }
    }

    /// Number of containers currently attached.
    pub fn attached_count(&self) -> usize {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn detach(&self, id: u64) {
        self.attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|a| *a != id);
        log::debug!("detached off-screen container #{}", id);
    }
}

/// An attached replica of the live composition. Detaches itself on drop.
pub struct OffscreenContainer<'a> {
    stage: &'a Stage,
    id: u64,
    layout: CompositionLayout,
    image: ImageElement,
}

impl OffscreenContainer<'_> {
    pub fn layout(&self) -> &CompositionLayout {
        &self.layout
    }

    pub fn image(&self) -> &ImageElement {
        &self.image
    }
}

impl Drop for OffscreenContainer<'_> {
    fn drop(&mut self) {
        self.stage.detach(self.id);
    }
}

/// Receipt for a delivered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    /// Where the bytes went (a path, or the sink's own description)
    pub location: String,
    pub bytes: usize,
}

/// Host-side receiver of the finished PNG.
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, filename: &str, png: &[u8]) -> Result<Download>;
}

/// Writes exports into a directory. Files appear atomically: bytes go to a
/// `.part` file that is renamed once complete. An existing file of the same
/// name is never replaced.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, png: &[u8]) -> Result<Download> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);
        if target.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            )));
        }
        let partial = self.dir.join(format!("{}.part", filename));
        if let Err(e) = std::fs::write(&partial, png).and_then(|_| std::fs::rename(&partial, &target)) {
            let _ = std::fs::remove_file(&partial);
            return Err(Error::Io(e));
        }
        Ok(Download {
            filename: filename.to_string(),
            location: target.display().to_string(),
            bytes: png.len(),
        })
    }
}

/// Writes each export as a `data:image/png;base64,...` line.
pub struct DataUrlSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> DataUrlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> DownloadSink for DataUrlSink<W> {
    fn deliver(&self, filename: &str, png: &[u8]) -> Result<Download> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "data:image/png;base64,{}", STANDARD.encode(png))?;
        out.flush()?;
        Ok(Download {
            filename: filename.to_string(),
            location: "data-url".to_string(),
            bytes: png.len(),
        })
    }
}

/// Builds the off-screen replica and turns it into a downloaded PNG.
pub struct ExportPipeline {
    size: Size,
    scale: u32,
    typeface: Arc<Typeface>,
    rasterizer: Arc<dyn Rasterize>,
    sink: Arc<dyn DownloadSink>,
    stage: Arc<Stage>,
    stamps: Mutex<MillisTokens>,
}

impl ExportPipeline {
    pub fn new(config: &ExportConfig, typeface: Arc<Typeface>, sink: Arc<dyn DownloadSink>) -> Self {
        let rasterizer = Arc::new(PixelRasterizer::new(Arc::clone(&typeface)));
        Self {
            size: config.size,
            scale: config.scale.max(1),
            typeface,
            rasterizer,
            sink,
            stage: Arc::new(Stage::new()),
            stamps: Mutex::new(MillisTokens::default()),
        }
    }

    /// Load the configured (or a system) font and build the pipeline.
    pub fn from_config(config: &ExportConfig, sink: Arc<dyn DownloadSink>) -> Result<Self> {
        let typeface = Typeface::load(config.font_path.as_deref())?;
        Ok(Self::new(config, Arc::new(typeface), sink))
    }

    /// Replace the rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterize>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn stage(&self) -> &Arc<Stage> {
        &self.stage
    }

    /// Output dimensions in pixels, saturating like [`compose`].
    pub fn output_size(&self) -> Size {
        Size::new(
            self.size.width.saturating_mul(self.scale),
            self.size.height.saturating_mul(self.scale),
        )
    }

    /// Export the composition of `image` and `quote`.
    pub async fn run(&self, image: &ImageElement, quote: Option<&Quote>) -> Result<Download> {
        let layout = compose(self.size, self.scale, quote, &self.typeface);
        let (width, height) = (layout.width, layout.height);

        let container = self.stage.attach(layout, image);
        let commands = build_display_list(container.layout());

        let pixels = container.image().loaded().await?;

        let rasterizer = Arc::clone(&self.rasterizer);
        let shot = tokio::task::spawn_blocking(move || {
            rasterizer.rasterize(width, height, &commands, Some(&*pixels))
        })
        .await
        .map_err(|e| Error::RenderError(format!("rasterizer task failed: {}", e)))??;

        drop(container);

        let stamp = self
            .stamps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next();
        let filename = export_filename(stamp);
        let download = self.sink.deliver(&filename, &shot.png_data)?;
        log::info!(
            "exported {} ({}x{}, {} bytes) to {}",
            download.filename,
            shot.width,
            shot.height,
            download.bytes,
            download.location
        );
        Ok(download)
    }
}
