//! Market client configuration

use std::env;
use std::time::Duration;

/// Settings for the market clients
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Community market base URL
    pub community_base: String,
    /// Bulk price feed base URL
    pub feed_base: String,
    /// Country code sent with lookups
    pub country: String,
    /// Language sent with listing lookups
    pub language: String,
    /// How many listings one render call asks for
    pub listing_count: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            community_base: "https://steamcommunity.com".to_string(),
            feed_base: "https://prices.csgotrader.app".to_string(),
            country: "US".to_string(),
            language: "english".to_string(),
            listing_count: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            community_base: env::var("STEAMPRICE_COMMUNITY_URL")
                .unwrap_or(default.community_base),
            feed_base: env::var("STEAMPRICE_FEED_URL").unwrap_or(default.feed_base),
            country: env::var("STEAMPRICE_COUNTRY").unwrap_or(default.country),
            language: env::var("STEAMPRICE_LANGUAGE").unwrap_or(default.language),
            listing_count: env::var("STEAMPRICE_LISTING_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.listing_count),
            timeout: env::var("STEAMPRICE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
        }
    }
}
