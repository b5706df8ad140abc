//! Cache-busting background URLs.

use crate::{AppConfig, Size};
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces image CDN URLs of the form `{base}/{w}/{h}?random=<token>`.
///
/// The token is the current Unix time in milliseconds, bumped when needed so
/// that every token is strictly greater than the one before it. Two calls in
/// the same millisecond still yield different URLs.
#[derive(Debug, Clone)]
pub struct ImageRefGenerator {
    base: String,
    size: Size,
    tokens: MillisTokens,
}

impl ImageRefGenerator {
    pub fn new(base: &str, size: Size) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            size,
            tokens: MillisTokens::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.image_base, config.image_size)
    }

    /// The untokenized URL shown before the first "new background" action.
    pub fn initial(&self) -> String {
        format!("{}/{}/{}", self.base, self.size.width, self.size.height)
    }

    /// A fresh URL that differs from every URL this generator returned before.
    pub fn next(&mut self) -> String {
        self.next_at(unix_millis())
    }

    fn next_at(&mut self, now_ms: u64) -> String {
        let token = self.tokens.next_at(now_ms);
        format!("{}?random={}", self.initial(), token)
    }
}

/// Wall-clock milliseconds, bumped so each value exceeds the previous one.
#[derive(Debug, Clone, Default)]
pub(crate) struct MillisTokens {
    last: u64,
}

impl MillisTokens {
    pub(crate) fn next(&mut self) -> u64 {
        self.next_at(unix_millis())
    }

    pub(crate) fn next_at(&mut self, now_ms: u64) -> u64 {
        let token = now_ms.max(self.last.saturating_add(1));
        self.last = token;
        token
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_url_has_fixed_dimensions() {
        let gen = ImageRefGenerator::from_config(&AppConfig::default());
        assert_eq!(gen.initial(), "https://picsum.photos/1080/1920");
    }

    #[test]
    fn consecutive_urls_differ_even_within_one_millisecond() {
        let mut gen = ImageRefGenerator::new("https://img.test/", Size::new(1080, 1920));
        let a = gen.next_at(1_000);
        let b = gen.next_at(1_000);
        let c = gen.next_at(999);
        assert_eq!(a, "https://img.test/1080/1920?random=1000");
        assert_eq!(b, "https://img.test/1080/1920?random=1001");
        assert_eq!(c, "https://img.test/1080/1920?random=1002");
    }

    #[test]
    fn real_clock_tokens_strictly_increase() {
        let mut gen = ImageRefGenerator::from_config(&AppConfig::default());
        let urls: Vec<String> = (0..50).map(|_| gen.next()).collect();
        for pair in urls.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }
}
