//! Fixed registry of quote topics.
//!
//! The registry parameterizes quote requests and populates the category
//! picker. It is static data: nothing here mutates.

use crate::{Error, Result};
use rand::Rng;
use std::fmt;

/// Ordered quote-tag slugs understood by the quote service.
pub static CATEGORIES: [&str; 49] = [
    "age",
    "athletics",
    "business",
    "change",
    "character",
    "competition",
    "courage",
    "creativity",
    "education",
    "ethics",
    "failure",
    "faith",
    "family",
    "famous-quotes",
    "film",
    "freedom",
    "friendship",
    "future",
    "generosity",
    "genius",
    "gratitude",
    "happiness",
    "health",
    "history",
    "honor",
    "humor",
    "imagination",
    "inspirational",
    "knowledge",
    "leadership",
    "life",
    "literature",
    "love",
    "mathematics",
    "motivational",
    "nature",
    "opportunity",
    "perseverance",
    "philosophy",
    "politics",
    "science",
    "self-help",
    "spirituality",
    "sports",
    "success",
    "technology",
    "time",
    "truth",
    "wisdom",
];

/// Category selected when nothing else was chosen.
pub const DEFAULT_CATEGORY: &str = "technology";

/// A category known to be in [`CATEGORIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category(&'static str);

impl Category {
    /// Look up `slug` in the registry.
    pub fn parse(slug: &str) -> Result<Self> {
        let wanted = slug.trim();
        CATEGORIES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(wanted))
            .map(|c| Category(*c))
            .ok_or_else(|| Error::UnknownCategory(slug.to_string()))
    }

    /// Uniform draw over the whole registry, independent of any current selection.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Category(CATEGORIES[rng.gen_range(0..CATEGORIES.len())])
    }

    /// Every category, in registry order.
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORIES.iter().map(|c| Category(*c))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Category(DEFAULT_CATEGORY)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_has_49_unique_entries() {
        let unique: HashSet<_> = CATEGORIES.iter().collect();
        assert_eq!(unique.len(), 49);
        assert!(CATEGORIES.contains(&DEFAULT_CATEGORY));
    }

    #[test]
    fn parse_accepts_known_and_rejects_unknown() {
        assert_eq!(Category::parse("Technology").unwrap().as_str(), "technology");
        assert!(matches!(
            Category::parse("cooking"),
            Err(Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn random_stays_inside_registry() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let c = Category::random(&mut rng);
            assert!(CATEGORIES.contains(&c.as_str()));
        }
        assert_eq!(Category::all().count(), 49);
    }
}
