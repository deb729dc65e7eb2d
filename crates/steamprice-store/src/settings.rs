//! Typed access to the shared settings keys
//!
//! Readers go back to the store on every call, so a settings change in
//! another process shows up on the next read.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::backend::{SharedStore, StoreExt};

/// Store keys read and written across the workspace
pub mod keys {
    /// Delay after a successful job, milliseconds
    pub const SUCCESS_DELAY_MS: &str = "realTimePricesFreqSuccess";
    /// Delay after a failed job, milliseconds
    pub const FAILURE_DELAY_MS: &str = "realTimePricesFreqFailure";
    /// Cross-process queue activity record
    pub const QUEUE_ACTIVITY: &str = "priceQueueActivity";
    /// Master switch for bulk price updates
    pub const ITEM_PRICING: &str = "itemPricing";
    /// Bulk price provider name
    pub const PRICING_PROVIDER: &str = "pricingProvider";
    /// Pricing mode within the selected provider
    pub const PRICING_MODE: &str = "pricingMode";
    /// Display currency code
    pub const CURRENCY: &str = "currency";
    /// Normalized item price table
    pub const PRICES: &str = "prices";
    /// Full exchange rate table
    pub const EXCHANGE_RATES: &str = "exchangeRates";
    /// Rate for the selected display currency
    pub const EXCHANGE_RATE: &str = "exchangeRate";
}

/// Fallbacks applied when a key is missing or unreadable
pub mod defaults {
    pub const SUCCESS_DELAY_MS: u64 = 3000;
    pub const FAILURE_DELAY_MS: u64 = 15000;
    pub const PRICING_PROVIDER: &str = "steam";
    pub const PRICING_MODE: &str = "starting_at";
    pub const CURRENCY: &str = "USD";
}

/// Typed reader for the consumed settings. A missing key falls back to its
/// default; so does a read error, with a warning, since a broken store must
/// not stop the queue.
#[derive(Debug, Clone)]
pub struct Settings {
    store: Arc<dyn SharedStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SharedStore> {
        &self.store
    }

    async fn get_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.store.get::<T>(key).await {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(error) => {
                warn!(key, %error, "settings read failed, using default");
                fallback
            }
        }
    }

    /// Wait between jobs after a success
    pub async fn success_delay(&self) -> Duration {
        let ms = self
            .get_or(keys::SUCCESS_DELAY_MS, defaults::SUCCESS_DELAY_MS)
            .await;
        Duration::from_millis(ms)
    }

    /// Wait between jobs after a failure
    pub async fn failure_delay(&self) -> Duration {
        let ms = self
            .get_or(keys::FAILURE_DELAY_MS, defaults::FAILURE_DELAY_MS)
            .await;
        Duration::from_millis(ms)
    }

    /// Whether bulk price updates are enabled at all
    pub async fn item_pricing_enabled(&self) -> bool {
        self.get_or(keys::ITEM_PRICING, true).await
    }

    pub async fn pricing_provider(&self) -> String {
        self.get_or(keys::PRICING_PROVIDER, defaults::PRICING_PROVIDER.to_string())
            .await
    }

    pub async fn pricing_mode(&self) -> String {
        self.get_or(keys::PRICING_MODE, defaults::PRICING_MODE.to_string())
            .await
    }

    pub async fn currency(&self) -> String {
        self.get_or(keys::CURRENCY, defaults::CURRENCY.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;

    fn settings() -> Settings {
        Settings::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn missing_keys_fall_back_to_defaults() {
        let settings = settings();

        assert_eq!(settings.success_delay().await, Duration::from_millis(3000));
        assert_eq!(settings.failure_delay().await, Duration::from_millis(15000));
        assert!(settings.item_pricing_enabled().await);
        assert_eq!(settings.pricing_provider().await, "steam");
        assert_eq!(settings.currency().await, "USD");
    }

    #[tokio::test]
    async fn stored_values_override_defaults() {
        let settings = settings();
        let store = settings.store();

        store.set(keys::SUCCESS_DELAY_MS, &500u64).await.unwrap();
        store.set(keys::ITEM_PRICING, &false).await.unwrap();
        store.set(keys::PRICING_PROVIDER, &"csgotrader").await.unwrap();

        assert_eq!(settings.success_delay().await, Duration::from_millis(500));
        assert!(!settings.item_pricing_enabled().await);
        assert_eq!(settings.pricing_provider().await, "csgotrader");
    }

    #[tokio::test]
    async fn wrong_shape_falls_back_with_warning() {
        let settings = settings();
        settings
            .store()
            .set_value(keys::SUCCESS_DELAY_MS, serde_json::json!("fast"))
            .await
            .unwrap();

        assert_eq!(settings.success_delay().await, Duration::from_millis(3000));
    }
}
