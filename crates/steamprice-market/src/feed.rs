//! Bulk price feeds
//!
//! One JSON document per provider at `{feed_base}/latest/{provider}.json`,
//! plus `exchange_rates.json`. A refresh normalizes the provider's own
//! shape into one price table and writes it to the shared store, where
//! every consumer reads the same keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use steamprice_store::{keys, SharedStore, Settings, StoreError, StoreExt};

use crate::config::MarketConfig;

/// Errors from feed refreshes
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("bulk pricing is disabled in settings")]
    Disabled,
    #[error("unknown pricing provider: {0}")]
    UnknownProvider(String),
    #[error("feed returned {status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed feed payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Normalized price entry, as stored under the `prices` key. `price` is
/// null when the provider has no amount for the selected mode; `doppler`
/// appears only for providers that price phases separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTag {
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doppler: Option<BTreeMap<String, Option<f64>>>,
}

/// Result of an exchange-rate refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RatesRefresh {
    /// Number of currencies in the table
    pub count: usize,
    /// Rate for the configured display currency, when the table has one
    pub selected: Option<f64>,
}

/// How a provider's feed document is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedShape {
    /// name → { <mode>: price, ... }
    ModeKeyed,
    /// name → price
    Flat,
    /// name → { price, doppler? }
    WithDoppler,
}

fn shape_for(provider: &str) -> Option<FeedShape> {
    match provider {
        "steam" | "bitskins" | "skincay" => Some(FeedShape::ModeKeyed),
        "lootfarm" | "csgotm" => Some(FeedShape::Flat),
        "csmoney" | "csgotrader" => Some(FeedShape::WithDoppler),
        _ => None,
    }
}

/// Feed key actually read for a pricing mode. Two bitskins mode names
/// predate the feed's own key names.
fn mode_key(mode: &str) -> &str {
    match mode {
        "bitskins" => "price",
        "instant_sale" => "instant_sale_price",
        other => other,
    }
}

fn normalize_prices(
    entries: &serde_json::Map<String, Value>,
    shape: FeedShape,
    mode: &str,
) -> BTreeMap<String, PriceTag> {
    let mut prices = BTreeMap::new();
    for (name, entry) in entries {
        let tag = match shape {
            FeedShape::ModeKeyed => {
                let price = entry.get(mode_key(mode)).and_then(Value::as_f64);
                if price.is_none() {
                    debug!(item = %name, mode, "no price for the selected mode");
                }
                PriceTag {
                    price,
                    doppler: None,
                }
            }
            FeedShape::Flat => PriceTag {
                price: entry.as_f64(),
                doppler: None,
            },
            FeedShape::WithDoppler => {
                let doppler = entry.get("doppler").and_then(Value::as_object).map(|phases| {
                    phases
                        .iter()
                        .map(|(phase, value)| (phase.clone(), value.as_f64()))
                        .collect()
                });
                PriceTag {
                    price: entry.get("price").and_then(Value::as_f64),
                    doppler,
                }
            }
        };
        prices.insert(name.clone(), tag);
    }
    prices
}

/// Fetches and normalizes the bulk feeds into the shared store
#[derive(Debug)]
pub struct PriceFeed {
    config: MarketConfig,
    client: reqwest::Client,
    settings: Settings,
}

impl PriceFeed {
    pub fn new(config: MarketConfig, store: Arc<dyn SharedStore>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            settings: Settings::new(store),
        }
    }

    fn feed_url(&self, document: &str) -> Result<reqwest::Url, FeedError> {
        let mut url = reqwest::Url::parse(&self.config.feed_base)
            .map_err(|e| FeedError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::Network("feed base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .push("latest")
            .push(document);
        Ok(url)
    }

    async fn fetch_document(&self, document: &str) -> Result<Value, FeedError> {
        let url = self.feed_url(document)?;
        debug!(%url, "fetching feed document");
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))
    }

    /// Refresh the normalized price table from the configured provider.
    /// Returns the number of items written.
    pub async fn refresh_prices(&self) -> Result<usize, FeedError> {
        if !self.settings.item_pricing_enabled().await {
            return Err(FeedError::Disabled);
        }
        let provider = self.settings.pricing_provider().await;
        let mode = self.settings.pricing_mode().await;
        let shape =
            shape_for(&provider).ok_or_else(|| FeedError::UnknownProvider(provider.clone()))?;

        let document = self.fetch_document(&format!("{provider}.json")).await?;
        let entries = document
            .as_object()
            .ok_or_else(|| FeedError::Malformed("feed root is not an object".to_string()))?;

        let prices = normalize_prices(entries, shape, &mode);
        let count = prices.len();
        self.settings.store().set(keys::PRICES, &prices).await?;
        info!(provider = %provider, items = count, "price table refreshed");
        Ok(count)
    }

    /// Refresh the exchange-rate table, and the single rate for the
    /// configured display currency alongside it.
    pub async fn refresh_exchange_rates(&self) -> Result<RatesRefresh, FeedError> {
        let document = self.fetch_document("exchange_rates.json").await?;
        let rates: BTreeMap<String, f64> =
            serde_json::from_value(document).map_err(|e| FeedError::Malformed(e.to_string()))?;

        self.settings.store().set(keys::EXCHANGE_RATES, &rates).await?;

        let currency = self.settings.currency().await;
        let selected = rates.get(&currency).copied();
        match selected {
            Some(rate) => self.settings.store().set(keys::EXCHANGE_RATE, &rate).await?,
            None => warn!(currency = %currency, "no exchange rate for the selected currency"),
        }

        info!(rates = rates.len(), currency = %currency, "exchange rates refreshed");
        Ok(RatesRefresh {
            count: rates.len(),
            selected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use steamprice_store::MemoryStore;

    fn entries(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(entries) => entries,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    #[test]
    fn mode_keyed_feed_reads_the_selected_mode() {
        let feed = entries(json!({
            "AK-47 | Redline (Field-Tested)": {"starting_at": 14.1, "highest_order": 12.9},
            "Chroma 2 Case": {"highest_order": 0.4},
        }));
        let prices = normalize_prices(&feed, FeedShape::ModeKeyed, "starting_at");

        assert_eq!(
            prices["AK-47 | Redline (Field-Tested)"],
            PriceTag { price: Some(14.1), doppler: None }
        );
        // No starting_at amount for the case, the entry still exists
        assert_eq!(
            prices["Chroma 2 Case"],
            PriceTag { price: None, doppler: None }
        );
    }

    #[test]
    fn bitskins_mode_names_alias_onto_feed_keys() {
        let feed = entries(json!({
            "P250 | Sand Dune (Field-Tested)": {"price": 0.03, "instant_sale_price": 0.01},
        }));

        let bitskins = normalize_prices(&feed, FeedShape::ModeKeyed, "bitskins");
        assert_eq!(bitskins["P250 | Sand Dune (Field-Tested)"].price, Some(0.03));

        let instant = normalize_prices(&feed, FeedShape::ModeKeyed, "instant_sale");
        assert_eq!(instant["P250 | Sand Dune (Field-Tested)"].price, Some(0.01));
    }

    #[test]
    fn flat_feed_takes_the_value_itself() {
        let feed = entries(json!({
            "Glock-18 | Candy Apple (Minimal Wear)": 0.21,
            "Broken Entry": "not a number",
        }));
        let prices = normalize_prices(&feed, FeedShape::Flat, "starting_at");

        assert_eq!(
            prices["Glock-18 | Candy Apple (Minimal Wear)"].price,
            Some(0.21)
        );
        assert_eq!(prices["Broken Entry"].price, None);
    }

    #[test]
    fn doppler_phases_come_through_with_gaps_as_null() {
        let feed = entries(json!({
            "★ Karambit | Doppler (Factory New)": {
                "price": 1100.0,
                "doppler": {"Phase 1": 1050.5, "Ruby": null},
            },
            "AWP | Dragon Lore (Field-Tested)": {"price": 8500.0},
        }));
        let prices = normalize_prices(&feed, FeedShape::WithDoppler, "starting_at");

        let karambit = &prices["★ Karambit | Doppler (Factory New)"];
        assert_eq!(karambit.price, Some(1100.0));
        let phases = karambit.doppler.as_ref().unwrap();
        assert_eq!(phases["Phase 1"], Some(1050.5));
        assert_eq!(phases["Ruby"], None);

        let awp = &prices["AWP | Dragon Lore (Field-Tested)"];
        assert_eq!(awp.price, Some(8500.0));
        assert!(awp.doppler.is_none());
    }

    #[test]
    fn doppler_is_dropped_from_the_wire_when_absent() {
        let tag = PriceTag { price: Some(1.5), doppler: None };
        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            json!({"price": 1.5})
        );
    }

    #[tokio::test]
    async fn refresh_respects_the_pricing_gate() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        store.set(keys::ITEM_PRICING, &false).await.unwrap();

        let feed = PriceFeed::new(MarketConfig::default(), store);
        assert!(matches!(
            feed.refresh_prices().await,
            Err(FeedError::Disabled)
        ));
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected_before_any_fetch() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        store.set(keys::PRICING_PROVIDER, &"nosuchsite").await.unwrap();

        let feed = PriceFeed::new(MarketConfig::default(), store);
        match feed.refresh_prices().await {
            Err(FeedError::UnknownProvider(provider)) => assert_eq!(provider, "nosuchsite"),
            other => panic!("expected UnknownProvider, got {other:?}"),
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access to the live feed
    async fn live_feed_roundtrip() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        store.set(keys::PRICING_PROVIDER, &"csgotrader").await.unwrap();

        let feed = PriceFeed::new(MarketConfig::default(), Arc::clone(&store));
        let count = feed.refresh_prices().await.unwrap();
        assert!(count > 0);

        let rates = feed.refresh_exchange_rates().await.unwrap();
        assert!(rates.count > 0);
    }
}
