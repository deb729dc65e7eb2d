//! Mock price source for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::FetchError;
use crate::source::{Cents, ItemId, PriceSource};

/// A price source that answers from scripts instead of the live market.
/// Each operation has its own script; once a script runs out its last
/// entry repeats. Calls are counted for assertions.
#[derive(Debug, Default)]
pub struct MockPriceSource {
    buy_orders: Vec<Result<Cents, FetchError>>,
    listings: Vec<Result<Cents, FetchError>>,
    buy_order_calls: AtomicUsize,
    listing_calls: AtomicUsize,
}

impl MockPriceSource {
    /// A source with no script at all; every call fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Both operations always answer with the same price
    pub fn constant(cents: Cents) -> Self {
        Self {
            buy_orders: vec![Ok(cents)],
            listings: vec![Ok(cents)],
            ..Self::default()
        }
    }

    /// Both operations always fail with the given reason
    pub fn failing(reason: FetchError) -> Self {
        Self {
            buy_orders: vec![Err(reason.clone())],
            listings: vec![Err(reason)],
            ..Self::default()
        }
    }

    /// Script the buy-order answers, in call order
    pub fn with_buy_orders(mut self, outcomes: Vec<Result<Cents, FetchError>>) -> Self {
        self.buy_orders = outcomes;
        self
    }

    /// Script the listing answers, in call order
    pub fn with_listings(mut self, outcomes: Vec<Result<Cents, FetchError>>) -> Self {
        self.listings = outcomes;
        self
    }

    /// How many buy-order lookups were made
    pub fn buy_order_calls(&self) -> usize {
        self.buy_order_calls.load(Ordering::SeqCst)
    }

    /// How many listing lookups were made
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// All lookups made, both operations together
    pub fn total_calls(&self) -> usize {
        self.buy_order_calls() + self.listing_calls()
    }

    fn next(
        script: &[Result<Cents, FetchError>],
        calls: &AtomicUsize,
    ) -> Result<Cents, FetchError> {
        let index = calls.fetch_add(1, Ordering::SeqCst);
        match script.get(index.min(script.len().saturating_sub(1))) {
            Some(outcome) => outcome.clone(),
            None => Err(FetchError::Network("no scripted answer".to_string())),
        }
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn highest_buy_order(&self, _item: &ItemId) -> Result<Cents, FetchError> {
        Self::next(&self.buy_orders, &self.buy_order_calls)
    }

    async fn lowest_listing_price(&self, _item: &ItemId) -> Result<Cents, FetchError> {
        Self::next(&self.listings, &self.listing_calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ItemId {
        ItemId::new(730, "AK-47 | Redline (Field-Tested)")
    }

    #[tokio::test]
    async fn constant_source_repeats_and_counts() {
        let source = MockPriceSource::constant(1500);

        assert_eq!(source.lowest_listing_price(&item()).await, Ok(1500));
        assert_eq!(source.lowest_listing_price(&item()).await, Ok(1500));
        assert_eq!(source.highest_buy_order(&item()).await, Ok(1500));

        assert_eq!(source.listing_calls(), 2);
        assert_eq!(source.buy_order_calls(), 1);
        assert_eq!(source.total_calls(), 3);
    }

    #[tokio::test]
    async fn script_runs_in_order_then_repeats_its_tail() {
        let source = MockPriceSource::new().with_listings(vec![
            Err(FetchError::Unsuccessful),
            Ok(900),
        ]);

        assert_eq!(
            source.lowest_listing_price(&item()).await,
            Err(FetchError::Unsuccessful)
        );
        assert_eq!(source.lowest_listing_price(&item()).await, Ok(900));
        assert_eq!(source.lowest_listing_price(&item()).await, Ok(900));
    }

    #[tokio::test]
    async fn unscripted_operation_fails() {
        let source = MockPriceSource::new();
        assert!(source.highest_buy_order(&item()).await.is_err());
    }
}
