//! Quote records and the sources that produce them.

use crate::{Category, Result};
use futures::future::BoxFuture;
use serde::Deserialize;

/// A quote as returned by the quote service. Extra fields in the response are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
}

impl Quote {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }

    /// Parse a quote-service response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| crate::Error::ParseError(e.to_string()))
    }
}

/// Anything that can produce one quote for a category.
///
/// The controller only talks to this trait, so tests substitute in-process
/// sources for the HTTP one.
pub trait QuoteSource: Send + Sync {
    fn fetch<'a>(&'a self, category: &'a Category) -> BoxFuture<'a, Result<Quote>>;
}

#[cfg(feature = "http")]
pub use http::HttpQuoteSource;

#[cfg(feature = "http")]
mod http {
    use super::{Quote, QuoteSource};
    use crate::{AppConfig, Category, Error, Result};
    use futures::future::{BoxFuture, FutureExt};
    use reqwest::Client;
    use std::time::Duration;

    /// Quote source backed by `GET {base}/random?tags=<category>`.
    pub struct HttpQuoteSource {
        client: Client,
        base: url::Url,
    }

    impl HttpQuoteSource {
        pub fn new(config: &AppConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| {
                    Error::InitializationError(format!("Failed to build HTTP client: {}", e))
                })?;
            let base = url::Url::parse(&config.quote_api_base)
                .map_err(|e| Error::ConfigError(format!("quote_api_base: {}", e)))?;
            Ok(Self { client, base })
        }

        /// The request URL for `category`.
        pub fn request_url(&self, category: &Category) -> Result<url::Url> {
            let mut endpoint = self.base.clone();
            endpoint
                .path_segments_mut()
                .map_err(|_| Error::ConfigError("quote_api_base cannot be a base URL".into()))?
                .pop_if_empty()
                .push("random");
            endpoint
                .query_pairs_mut()
                .clear()
                .append_pair("tags", category.as_str());
            Ok(endpoint)
        }

        async fn fetch_quote(&self, category: &Category) -> Result<Quote> {
            let endpoint = self.request_url(category)?;
            log::debug!("fetching quote from {}", endpoint);

            let resp = self
                .client
                .get(endpoint.clone())
                .send()
                .await
                .map_err(|e| Error::NetworkError(format!("GET {} failed: {}", endpoint, e)))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(Error::NetworkError(format!(
                    "GET {} returned {}",
                    endpoint, status
                )));
            }

            let body = resp
                .text()
                .await
                .map_err(|e| Error::NetworkError(format!("Failed to read response body: {}", e)))?;
            Quote::from_json(&body)
        }
    }

    impl QuoteSource for HttpQuoteSource {
        fn fetch<'a>(&'a self, category: &'a Category) -> BoxFuture<'a, Result<Quote>> {
            self.fetch_quote(category).boxed()
        }
    }

}
