//! Image elements with an awaitable load signal.
//!
//! An [`ImageElement`] pairs a source URL with a `watch` channel that moves
//! from `Pending` to either `Loaded` or `Failed` exactly once. Awaiting
//! [`ImageElement::loaded`] resolves on success and rejects on failure;
//! nothing polls.

use crate::{Error, Result};
use futures::future::BoxFuture;
use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::watch;

/// Load progress of an image element
#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Loaded(Arc<DynamicImage>),
    Failed(String),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}

/// Fetches and decodes image bytes for a URL.
pub trait ImageLoader: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DynamicImage>>;
}

/// A displayed image: source URL plus its load signal.
///
/// Cloning duplicates the element; the copy shares the signal, so it is
/// complete immediately when the original already finished loading.
#[derive(Debug, Clone)]
pub struct ImageElement {
    src: String,
    state: watch::Receiver<LoadState>,
}

impl ImageElement {
    /// Start loading `src` on the current tokio runtime.
    ///
    /// The load is abandoned once every clone of the element is dropped.
    pub fn load(src: impl Into<String>, loader: Arc<dyn ImageLoader>) -> Self {
        let src = src.into();
        let (tx, rx) = watch::channel(LoadState::Pending);
        let url = src.clone();
        tokio::spawn(async move {
            let fetched = tokio::select! {
                res = loader.fetch(&url) => res,
                _ = tx.closed() => {
                    log::debug!("image load abandoned: {}", url);
                    return;
                }
            };
            let outcome = match fetched {
                Ok(img) => {
                    log::debug!("image loaded: {} ({}x{})", url, img.width(), img.height());
                    LoadState::Loaded(Arc::new(img))
                }
                Err(e) => {
                    log::warn!("image failed to load: {}: {}", url, e);
                    LoadState::Failed(e.to_string())
                }
            };
            let _ = tx.send(outcome);
        });
        Self { src, state: rx }
    }

    /// An element whose pixels are already available.
    pub fn from_image(src: impl Into<String>, image: DynamicImage) -> Self {
        Self::settled(src, LoadState::Loaded(Arc::new(image)))
    }

    /// An element whose load already failed.
    pub fn failed(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::settled(src, LoadState::Failed(reason.into()))
    }

    fn settled(src: impl Into<String>, state: LoadState) -> Self {
        let (_tx, rx) = watch::channel(state);
        Self {
            src: src.into(),
            state: rx,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// True once the load settled either way.
    pub fn is_complete(&self) -> bool {
        !self.state.borrow().is_pending()
    }

    /// Suspend until the element finished loading pixel data.
    pub async fn loaded(&self) -> Result<Arc<DynamicImage>> {
        let mut rx = self.state.clone();
        let settled = rx
            .wait_for(|s| !s.is_pending())
            .await
            .map_err(|_| Error::ImageLoadError(format!("{}: loader went away", self.src)))?;
        match &*settled {
            LoadState::Loaded(img) => Ok(Arc::clone(img)),
            LoadState::Failed(reason) => {
                Err(Error::ImageLoadError(format!("{}: {}", self.src, reason)))
            }
            LoadState::Pending => Err(Error::Other("image load settled as pending".into())),
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpImageLoader;

#[cfg(feature = "http")]
mod http {
    use super::ImageLoader;
    use crate::{AppConfig, Error, Result};
    use futures::future::{BoxFuture, FutureExt};
    use image::DynamicImage;
    use reqwest::Client;
    use std::time::Duration;

    /// Loads images from the CDN and decodes them (PNG or JPEG).
    pub struct HttpImageLoader {
        client: Client,
    }

    impl HttpImageLoader {
        pub fn new(config: &AppConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| {
                    Error::InitializationError(format!("Failed to build HTTP client: {}", e))
                })?;
            Ok(Self { client })
        }

        async fn fetch_image(&self, url: &str) -> Result<DynamicImage> {
            let resp = self.client.get(url).send().await?.error_for_status()?;
            let bytes = resp.bytes().await?;
            image::load_from_memory(&bytes)
                .map_err(|e| Error::ParseError(format!("Failed to decode image from {}: {}", url, e)))
        }
    }

    impl ImageLoader for HttpImageLoader {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DynamicImage>> {
            self.fetch_image(url).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::FutureExt;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowLoader {
        delay: Duration,
        fail: bool,
    }

    impl ImageLoader for SlowLoader {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<DynamicImage>> {
            async move {
                tokio::time::sleep(self.delay).await;
                if self.fail {
                    Err(Error::NetworkError("boom".into()))
                } else {
                    Ok(DynamicImage::ImageRgba8(RgbaImage::new(4, 4)))
                }
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn loaded_waits_for_signal() {
        let loader = Arc::new(SlowLoader { delay: Duration::from_millis(30), fail: false });
        let el = ImageElement::load("mem://a", loader);
        assert!(!el.is_complete());
        let img = el.loaded().await.unwrap();
        assert_eq!(img.width(), 4);
        assert!(el.is_complete());
    }

    #[tokio::test]
    async fn duplicate_of_loaded_element_resolves_immediately() {
        let el = ImageElement::from_image("mem://b", DynamicImage::ImageRgba8(RgbaImage::new(2, 3)));
        let copy = el.clone();
        let img = tokio::time::timeout(Duration::from_millis(50), copy.loaded())
            .await
            .expect("should not suspend")
            .unwrap();
        assert_eq!(img.height(), 3);
        assert_eq!(copy.src(), "mem://b");
    }

    #[tokio::test]
    async fn failed_load_rejects() {
        let loader = Arc::new(SlowLoader { delay: Duration::from_millis(5), fail: true });
        let el = ImageElement::load("mem://c", loader);
        let err = el.loaded().await.unwrap_err();
        assert!(matches!(err, Error::ImageLoadError(_)));
        assert!(matches!(el.state(), LoadState::Failed(_)));
    }

    struct CountingLoader {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ImageLoader for CountingLoader {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<DynamicImage>> {
            async move {
                self.started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(40)).await;
                self.finished.fetch_add(1, Ordering::SeqCst);
                Ok(DynamicImage::ImageRgba8(RgbaImage::new(1, 1)))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn dropping_every_clone_abandons_the_load() {
        let loader = Arc::new(CountingLoader { started: AtomicUsize::new(0), finished: AtomicUsize::new(0) });
        let el = ImageElement::load("mem://gone", loader.clone());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(loader.started.load(Ordering::SeqCst), 1);

        drop(el);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(loader.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn a_surviving_clone_keeps_the_load_alive() {
        let loader = Arc::new(CountingLoader { started: AtomicUsize::new(0), finished: AtomicUsize::new(0) });
        let el = ImageElement::load("mem://kept", loader.clone());
        let copy = el.clone();
        drop(el);
        copy.loaded().await.unwrap();
        assert_eq!(loader.finished.load(Ordering::SeqCst), 1);
    }
}
