//! Steam Community Market client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::config::MarketConfig;
use crate::error::FetchError;
use crate::orders::{OrderBook, OrderQuery};
use crate::source::{Cents, ItemId, PriceSource};
use crate::wallet::WalletContext;

/// Price overview summary for one item. Amounts are the market's own
/// preformatted display strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceOverview {
    #[serde(default)]
    pub lowest_price: Option<String>,
    #[serde(default)]
    pub median_price: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

/// Client for the community market's public price endpoints. Buy orders
/// need a privileged session and go through the [`OrderBook`] collaborator
/// instead of a direct request.
#[derive(Debug)]
pub struct SteamMarket {
    config: MarketConfig,
    client: reqwest::Client,
    wallet: Arc<dyn WalletContext>,
    orders: Arc<dyn OrderBook>,
}

impl SteamMarket {
    pub fn new(
        config: MarketConfig,
        wallet: Arc<dyn WalletContext>,
        orders: Arc<dyn OrderBook>,
    ) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            wallet,
            orders,
        }
    }

    fn listings_url(&self, item: &ItemId, currency_id: u32) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.config.community_base)
            .map_err(|e| FetchError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network("community base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .push("market")
            .push("listings")
            .push(&item.app_id.to_string())
            .push(&item.market_hash_name)
            .push("render")
            .push("");
        url.query_pairs_mut()
            .append_pair("query", "")
            .append_pair("start", "0")
            .append_pair("count", &self.config.listing_count.to_string())
            .append_pair("country", &self.config.country)
            .append_pair("language", &self.config.language)
            .append_pair("currency", &currency_id.to_string());
        Ok(url)
    }

    fn overview_url(&self, item: &ItemId, currency_id: u32) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.config.community_base)
            .map_err(|e| FetchError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Network("community base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .push("market")
            .push("priceoverview")
            .push("");
        url.query_pairs_mut()
            .append_pair("appid", &item.app_id.to_string())
            .append_pair("country", &self.config.country)
            .append_pair("currency", &currency_id.to_string())
            .append_pair("market_hash_name", &item.market_hash_name);
        Ok(url)
    }

    async fn fetch_json(&self, url: reqwest::Url) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    /// Point-in-time summary (lowest price, median, volume) from the
    /// market's overview endpoint.
    pub async fn price_overview(&self, item: &ItemId) -> Result<PriceOverview, FetchError> {
        let currency_id = self.wallet.currency_id();
        let url = self.overview_url(item, currency_id)?;
        debug!(item = %item, "fetching price overview");

        let body = self.fetch_json(url).await?;
        if body.is_null() || body.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(FetchError::Unsuccessful);
        }
        serde_json::from_value(body).map_err(|e| FetchError::Network(e.to_string()))
    }
}

/// Sum of the first listing that carries both a converted price and fee.
/// The page arrives cheapest-first; listings without converted amounts are
/// skipped rather than treated as zero.
fn price_from_listings(listings: &Value) -> Result<Cents, FetchError> {
    let entries = match listings {
        Value::Object(entries) => entries,
        // An empty market sometimes comes back as an empty array instead
        // of an empty object
        Value::Array(items) if items.is_empty() => return Err(FetchError::EmptyListings),
        _ => return Err(FetchError::NoListingData),
    };
    if entries.is_empty() {
        return Err(FetchError::EmptyListings);
    }
    for listing in entries.values() {
        let price = listing.get("converted_price").and_then(Value::as_u64);
        let fee = listing.get("converted_fee").and_then(Value::as_u64);
        if let (Some(price), Some(fee)) = (price, fee) {
            return Ok(price + fee);
        }
    }
    Err(FetchError::NoListingPrices)
}

#[async_trait]
impl PriceSource for SteamMarket {
    fn name(&self) -> &str {
        "steam-market"
    }

    async fn highest_buy_order(&self, item: &ItemId) -> Result<Cents, FetchError> {
        let query = OrderQuery {
            app_id: item.app_id,
            currency_id: self.wallet.currency_id(),
            market_hash_name: item.market_hash_name.clone(),
        };
        debug!(item = %item, "asking responder for highest buy order");
        self.orders
            .highest_buy_order(query)
            .await
            .map_err(|_| FetchError::OrderLookup)
    }

    async fn lowest_listing_price(&self, item: &ItemId) -> Result<Cents, FetchError> {
        let currency_id = self.wallet.currency_id();
        let url = self.listings_url(item, currency_id)?;
        debug!(item = %item, "fetching listings page");

        let body = self.fetch_json(url).await?;
        if body.is_null() || body.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(FetchError::Unsuccessful);
        }
        match body.get("listinginfo") {
            None | Some(Value::Null) => Err(FetchError::NoListingData),
            Some(listings) => price_from_listings(listings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::UnavailableOrders;
    use crate::wallet::StaticWallet;
    use serde_json::json;

    fn market() -> SteamMarket {
        SteamMarket::new(
            MarketConfig::default(),
            Arc::new(StaticWallet::usd()),
            Arc::new(UnavailableOrders),
        )
    }

    #[test]
    fn listings_url_encodes_the_item_name() {
        let market = market();
        let item = ItemId::new(730, "Glock-18 Fade (Factory New)");
        let url = market.listings_url(&item, 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://steamcommunity.com/market/listings/730/Glock-18%20Fade%20(Factory%20New)/render/\
             ?query=&start=0&count=3&country=US&language=english&currency=1"
        );
    }

    #[test]
    fn overview_url_carries_the_item_as_a_query_pair() {
        let market = market();
        let item = ItemId::new(730, "Glock-18 Fade (Factory New)");
        let url = market.overview_url(&item, 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://steamcommunity.com/market/priceoverview/\
             ?appid=730&country=US&currency=3&market_hash_name=Glock-18+Fade+%28Factory+New%29"
        );
    }

    #[test]
    fn overview_payload_parses_around_missing_fields() {
        let body = json!({
            "success": true,
            "lowest_price": "$14.99",
            "volume": "1,402",
        });
        let overview: PriceOverview = serde_json::from_value(body).unwrap();
        assert_eq!(overview.lowest_price.as_deref(), Some("$14.99"));
        assert_eq!(overview.median_price, None);
        assert_eq!(overview.volume.as_deref(), Some("1,402"));
    }

    #[test]
    fn first_listing_with_both_amounts_wins() {
        let listings = json!({
            "4000001": {"converted_price": 100, "converted_fee": 15},
            "4000002": {"converted_price": 200, "converted_fee": 30},
        });
        assert_eq!(price_from_listings(&listings), Ok(115));
    }

    #[test]
    fn listings_without_amounts_are_skipped() {
        let listings = json!({
            "4000001": {"price": 100},
            "4000002": {"converted_price": 200, "converted_fee": 30},
        });
        assert_eq!(price_from_listings(&listings), Ok(230));
    }

    #[test]
    fn no_usable_listing_is_its_own_failure() {
        let listings = json!({
            "4000001": {"price": 100},
            "4000002": {"converted_price": 200},
        });
        assert_eq!(
            price_from_listings(&listings),
            Err(FetchError::NoListingPrices)
        );
    }

    #[test]
    fn empty_market_is_reported_as_such() {
        assert_eq!(
            price_from_listings(&json!({})),
            Err(FetchError::EmptyListings)
        );
        assert_eq!(
            price_from_listings(&json!([])),
            Err(FetchError::EmptyListings)
        );
    }

    #[test]
    fn unusable_listing_payload_is_no_listing_data() {
        assert_eq!(
            price_from_listings(&json!("garbage")),
            Err(FetchError::NoListingData)
        );
    }

    #[tokio::test]
    async fn buy_orders_fail_coarsely_without_a_responder() {
        let market = market();
        let item = ItemId::new(730, "AK-47 | Redline (Field-Tested)");
        assert_eq!(
            market.highest_buy_order(&item).await,
            Err(FetchError::OrderLookup)
        );
    }

    #[tokio::test]
    #[ignore] // Requires network access to the live market
    async fn live_listings_lookup() {
        let market = market();
        let item = ItemId::new(730, "AK-47 | Redline (Field-Tested)");
        let cents = market.lowest_listing_price(&item).await.unwrap();
        assert!(cents > 0);
    }
}
