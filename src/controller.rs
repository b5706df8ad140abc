//! The view state controller.
//!
//! Owns the [`ViewState`] and reacts to user actions: category changes and
//! "new quote" start quote fetches, "new background" swaps the image URL,
//! "randomize" does both, and "export" runs the export pipeline over a
//! snapshot of the live view.
//!
//! Fetches are not coordinated. When two overlap, whichever resolves last
//! sets the displayed quote.

use crate::export::{Download, ExportPipeline, Stage};
use crate::{AppConfig, Category, ImageElement, ImageLoader, ImageRefGenerator, QuoteSource, ViewState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Controller {
    state: Arc<Mutex<ViewState>>,
    quotes: Arc<dyn QuoteSource>,
    images: Arc<dyn ImageLoader>,
    image_refs: Mutex<ImageRefGenerator>,
    displayed: Mutex<Option<ImageElement>>,
    exporter: ExportPipeline,
}

/// Clears `is_exporting` however the export ends.
struct ExportingGuard<'a> {
    state: &'a Mutex<ViewState>,
}

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).is_exporting = false;
    }
}

impl Controller {
    /// Build a controller in its initial state: default category, base image
    /// URL, no quote, nothing loading.
    pub fn new(
        config: &AppConfig,
        quotes: Arc<dyn QuoteSource>,
        images: Arc<dyn ImageLoader>,
        exporter: ExportPipeline,
    ) -> Self {
        let image_refs = ImageRefGenerator::from_config(config);
        let state = ViewState::new(image_refs.initial(), config.default_category());
        Self {
            state: Arc::new(Mutex::new(state)),
            quotes,
            images,
            image_refs: Mutex::new(image_refs),
            displayed: Mutex::new(None),
            exporter,
        }
    }

    /// Controller wired to the HTTP quote service, the image CDN and a
    /// directory sink at `config.export.output_dir`.
    #[cfg(feature = "http")]
    pub fn with_http_sources(config: AppConfig) -> crate::Result<Self> {
        config.validate()?;
        let quotes = Arc::new(crate::quote::HttpQuoteSource::new(&config)?);
        let images = Arc::new(crate::image_load::HttpImageLoader::new(&config)?);
        let sink = Arc::new(crate::DirectorySink::new(config.export.output_dir.clone()));
        let exporter = ExportPipeline::from_config(&config.export, sink)?;
        Ok(Self::new(&config, quotes, images, exporter))
    }

    /// Start loading the displayed image and fetch the first quote.
    pub fn mount(&self) -> JoinHandle<()> {
        let url = lock(&self.state).image_url.clone();
        self.show_image(url);
        self.request_new_quote()
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        lock(&self.state).clone()
    }

    /// The image element currently displayed, if one was mounted.
    pub fn displayed_image(&self) -> Option<ImageElement> {
        lock(&self.displayed).clone()
    }

    pub fn stage(&self) -> &Arc<Stage> {
        self.exporter.stage()
    }

    /// Select `category` and fetch a quote for it.
    pub fn select_category(&self, category: Category) -> JoinHandle<()> {
        lock(&self.state).selected_category = category;
        log::debug!("category selected: {}", category);
        self.spawn_quote_fetch(category)
    }

    /// Fetch another quote for the current category.
    pub fn request_new_quote(&self) -> JoinHandle<()> {
        let category = lock(&self.state).selected_category;
        self.spawn_quote_fetch(category)
    }

    /// Swap in a fresh background URL. Quote state is untouched.
    pub fn request_new_image(&self) -> String {
        let url = lock(&self.image_refs).next();
        lock(&self.state).image_url = url.clone();
        self.show_image(url.clone());
        url
    }

    /// Pick a uniformly random category (repeats allowed), select it and swap the background.
    pub fn randomize(&self) -> JoinHandle<()> {
        let category = Category::random(&mut rand::thread_rng());
        self.request_new_image();
        self.select_category(category)
    }

    /// Export the current composition. Failures are logged and yield `None`,
    /// as does a call made while another export is running.
    pub async fn export(&self) -> Option<Download> {
        let quote = {
            let mut state = lock(&self.state);
            if state.is_exporting {
                log::debug!("export already in progress; ignoring");
                return None;
            }
            state.is_exporting = true;
            state.current_quote.clone()
        };
        let _busy = ExportingGuard { state: &self.state };

        let Some(image) = self.displayed_image() else {
            log::error!("export failed: no image element is displayed");
            return None;
        };

        match self.exporter.run(&image, quote.as_ref()).await {
            Ok(download) => Some(download),
            Err(e) => {
                log::error!("export failed: {}", e);
                None
            }
        }
    }

    fn show_image(&self, url: String) {
        let element = ImageElement::load(url, Arc::clone(&self.images));
        *lock(&self.displayed) = Some(element);
    }

    fn spawn_quote_fetch(&self, category: Category) -> JoinHandle<()> {
        lock(&self.state).begin_quote_fetch();
        let state = Arc::clone(&self.state);
        let quotes = Arc::clone(&self.quotes);
        tokio::spawn(async move {
            let outcome = match quotes.fetch(&category).await {
                Ok(quote) => {
                    log::debug!("quote for {}: {:?} by {}", category, quote.content, quote.author);
                    Some(quote)
                }
                Err(e) => {
                    log::warn!("quote fetch for {} failed: {}", category, e);
                    None
                }
            };
            lock(&state).finish_quote_fetch(outcome);
        })
    }
}
