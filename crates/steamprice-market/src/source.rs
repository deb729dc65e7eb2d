//! Price source trait and common types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FetchError;

/// Integer price in the wallet currency's minor unit
pub type Cents = u64;

/// One tradable item on the community market
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId {
    /// Steam application id (730 for CS2)
    pub app_id: u32,
    /// The market hash name, exactly as the market spells it
    pub market_hash_name: String,
}

impl ItemId {
    pub fn new(app_id: u32, market_hash_name: impl Into<String>) -> Self {
        Self {
            app_id,
            market_hash_name: market_hash_name.into(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.market_hash_name)
    }
}

/// Read access to live market prices. Amounts come back converted into the
/// ambient wallet currency.
#[async_trait]
pub trait PriceSource: Send + Sync + std::fmt::Debug {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Highest buy order currently standing for the item, in cents
    async fn highest_buy_order(&self, item: &ItemId) -> Result<Cents, FetchError>;

    /// Lowest listing price currently asked for the item, in cents.
    /// "Lowest" trusts the market's own cheapest-first page ordering.
    async fn lowest_listing_price(&self, item: &ItemId) -> Result<Cents, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_display_reads_as_app_and_name() {
        let item = ItemId::new(730, "AK-47 | Redline (Field-Tested)");
        assert_eq!(item.to_string(), "730/AK-47 | Redline (Field-Tested)");
    }
}
