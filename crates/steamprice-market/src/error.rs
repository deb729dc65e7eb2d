//! Failure reasons for market lookups

use thiserror::Error;

/// Errors from live market lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Buy-order lookups fail with one coarse reason; the responder
    /// channel reports nothing finer
    #[error("buy order lookup failed")]
    OrderLookup,
    /// The market has zero listings for the item. Callers usually treat
    /// this as an answered question, not an error
    #[error("no listings exist for the item")]
    EmptyListings,
    #[error("listings exist but none carry a converted price and fee")]
    NoListingPrices,
    #[error("response carried no listing data")]
    NoListingData,
    #[error("market reported an unsuccessful response")]
    Unsuccessful,
    #[error("market returned {status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// True for the empty-market case, which answers a lookup without
    /// producing a price
    pub fn is_empty_market(&self) -> bool {
        matches!(self, FetchError::EmptyListings)
    }
}
