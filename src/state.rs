//! The view's state container.

use crate::{Category, Quote};

/// Everything the composition renders from.
///
/// Owned by the [`Controller`](crate::Controller) behind a mutex; callers get
/// cloned snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub image_url: String,
    pub selected_category: Category,
    pub current_quote: Option<Quote>,
    /// True while at least one quote fetch is unsettled
    pub quote_loading: bool,
    pub is_exporting: bool,
    pending_quotes: usize,
}

impl ViewState {
    pub fn new(image_url: impl Into<String>, category: Category) -> Self {
        Self {
            image_url: image_url.into(),
            selected_category: category,
            current_quote: None,
            quote_loading: false,
            is_exporting: false,
            pending_quotes: 0,
        }
    }

    pub(crate) fn begin_quote_fetch(&mut self) {
        self.pending_quotes += 1;
        self.quote_loading = true;
    }

    /// Settle one fetch. `Some` replaces the quote wholesale, `None` keeps the prior one.
    pub(crate) fn finish_quote_fetch(&mut self, quote: Option<Quote>) {
        if let Some(q) = quote {
            self.current_quote = Some(q);
        }
        self.pending_quotes = self.pending_quotes.saturating_sub(1);
        self.quote_loading = self.pending_quotes > 0;
    }

    pub fn pending_quote_fetches(&self) -> usize {
        self.pending_quotes
    }
}
