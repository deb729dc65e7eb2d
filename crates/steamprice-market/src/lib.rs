//! # steamprice-market
//!
//! Clients for the Steam Community Market and for the bulk price feeds.
//!
//! ## Pieces
//!
//! | Piece | Role |
//! |-------|------|
//! | [`PriceSource`] | The two live-market questions: highest buy order, lowest listing |
//! | [`SteamMarket`] | Real client over the community market endpoints |
//! | [`OrderBook`] | Channel to the privileged session that can read buy orders |
//! | [`PriceFeed`] | Bulk provider feeds and exchange rates into the shared store |
//! | [`MockPriceSource`] | Scripted source for tests |
//!
//! ## Quick start
//!
//! ```rust
//! use steamprice_market::{ItemId, MockPriceSource, PriceSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = MockPriceSource::constant(1234);
//!     let item = ItemId::new(730, "AK-47 | Redline (Field-Tested)");
//!     let cents = source.lowest_listing_price(&item).await.unwrap();
//!     assert_eq!(cents, 1234);
//! }
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod mock;
pub mod orders;
pub mod source;
pub mod steam;
pub mod wallet;

pub use config::MarketConfig;
pub use error::FetchError;
pub use feed::{FeedError, PriceFeed, PriceTag, RatesRefresh};
pub use mock::MockPriceSource;
pub use orders::{
    order_channel, ChannelOrderBook, OrderBook, OrderError, OrderQuery, OrderReceiver,
    OrderRequest, UnavailableOrders,
};
pub use source::{Cents, ItemId, PriceSource};
pub use steam::{PriceOverview, SteamMarket};
pub use wallet::{StaticWallet, WalletContext};
