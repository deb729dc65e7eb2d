//! Price lookup jobs and the callbacks that receive their results.

use std::fmt;

use steamprice_market::{Cents, ItemId};

/// Identifies one asset inside an inventory or trade offer.
///
/// The market only needs the item name to price something, but the code
/// that asked for the price needs to know which concrete asset the answer
/// belongs to, so jobs carry this through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRef {
    pub asset_id: String,
    pub context_id: String,
}

impl AssetRef {
    pub fn new(asset_id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            context_id: context_id.into(),
        }
    }
}

/// Callback for buy order lookups keyed by item alone.
pub type OrderCallback = Box<dyn FnOnce(ItemId, Cents) + Send + 'static>;

/// Callback for listing page lookups, handed the listing row it was
/// requested for.
pub type ListingCallback = Box<dyn FnOnce(String, Cents) + Send + 'static>;

/// Callback for inventory and trade offer lookups, handed the asset the
/// price belongs to.
pub type AssetCallback = Box<dyn FnOnce(ItemId, Cents, AssetRef) + Send + 'static>;

/// Which market operation a job kind resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceOp {
    /// The best standing buy order, what an instant sale would pay.
    HighestBuyOrder,
    /// The cheapest live listing, what buying one right now would cost.
    LowestListing,
}

/// The kind of a queued job, used for cache keying and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    MyBuyOrder,
    MyListing,
    InventoryInstantSell,
    InventoryStartingAt,
    OfferHighestOrder,
    OfferStartingAt,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::MyBuyOrder => "my_buy_order",
            JobKind::MyListing => "my_listing",
            JobKind::InventoryInstantSell => "inventory_instant_sell",
            JobKind::InventoryStartingAt => "inventory_starting_at",
            JobKind::OfferHighestOrder => "offer_highest_order",
            JobKind::OfferStartingAt => "offer_starting_at",
        }
    }

    /// Maps the kind onto the market operation that answers it.
    pub fn operation(&self) -> SourceOp {
        match self {
            JobKind::MyBuyOrder | JobKind::InventoryInstantSell | JobKind::OfferHighestOrder => {
                SourceOp::HighestBuyOrder
            }
            JobKind::MyListing | JobKind::InventoryStartingAt | JobKind::OfferStartingAt => {
                SourceOp::LowestListing
            }
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued price lookup.
///
/// Every variant names the item to price and owns the callback that the
/// queue invokes once, on success only. Failed jobs retry and are
/// eventually dropped without their callback ever firing.
pub enum Job {
    /// Price check for one of the user's standing buy orders.
    MyBuyOrder {
        item: ItemId,
        on_complete: OrderCallback,
    },
    /// Price check for one of the user's own listings.
    MyListing {
        item: ItemId,
        listing_id: String,
        on_complete: ListingCallback,
    },
    /// What instantly selling an inventory asset would pay.
    InventoryInstantSell {
        item: ItemId,
        asset: AssetRef,
        on_complete: AssetCallback,
    },
    /// What listing an inventory asset at the cheapest spot would cost a buyer.
    InventoryStartingAt {
        item: ItemId,
        asset: AssetRef,
        on_complete: AssetCallback,
    },
    /// Highest buy order for an asset inside a trade offer.
    OfferHighestOrder {
        item: ItemId,
        asset: AssetRef,
        on_complete: AssetCallback,
    },
    /// Cheapest listing for an asset inside a trade offer.
    OfferStartingAt {
        item: ItemId,
        asset: AssetRef,
        on_complete: AssetCallback,
    },
}

impl Job {
    pub fn my_buy_order(
        item: ItemId,
        on_complete: impl FnOnce(ItemId, Cents) + Send + 'static,
    ) -> Self {
        Job::MyBuyOrder {
            item,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn my_listing(
        item: ItemId,
        listing_id: impl Into<String>,
        on_complete: impl FnOnce(String, Cents) + Send + 'static,
    ) -> Self {
        Job::MyListing {
            item,
            listing_id: listing_id.into(),
            on_complete: Box::new(on_complete),
        }
    }

    pub fn inventory_instant_sell(
        item: ItemId,
        asset: AssetRef,
        on_complete: impl FnOnce(ItemId, Cents, AssetRef) + Send + 'static,
    ) -> Self {
        Job::InventoryInstantSell {
            item,
            asset,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn inventory_starting_at(
        item: ItemId,
        asset: AssetRef,
        on_complete: impl FnOnce(ItemId, Cents, AssetRef) + Send + 'static,
    ) -> Self {
        Job::InventoryStartingAt {
            item,
            asset,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn offer_highest_order(
        item: ItemId,
        asset: AssetRef,
        on_complete: impl FnOnce(ItemId, Cents, AssetRef) + Send + 'static,
    ) -> Self {
        Job::OfferHighestOrder {
            item,
            asset,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn offer_starting_at(
        item: ItemId,
        asset: AssetRef,
        on_complete: impl FnOnce(ItemId, Cents, AssetRef) + Send + 'static,
    ) -> Self {
        Job::OfferStartingAt {
            item,
            asset,
            on_complete: Box::new(on_complete),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Job::MyBuyOrder { .. } => JobKind::MyBuyOrder,
            Job::MyListing { .. } => JobKind::MyListing,
            Job::InventoryInstantSell { .. } => JobKind::InventoryInstantSell,
            Job::InventoryStartingAt { .. } => JobKind::InventoryStartingAt,
            Job::OfferHighestOrder { .. } => JobKind::OfferHighestOrder,
            Job::OfferStartingAt { .. } => JobKind::OfferStartingAt,
        }
    }

    pub fn item(&self) -> &ItemId {
        match self {
            Job::MyBuyOrder { item, .. }
            | Job::MyListing { item, .. }
            | Job::InventoryInstantSell { item, .. }
            | Job::InventoryStartingAt { item, .. }
            | Job::OfferHighestOrder { item, .. }
            | Job::OfferStartingAt { item, .. } => item,
        }
    }

    /// Consumes the job and hands the price to its callback.
    pub fn complete(self, price: Cents) {
        match self {
            Job::MyBuyOrder { item, on_complete } => on_complete(item, price),
            Job::MyListing {
                listing_id,
                on_complete,
                ..
            } => on_complete(listing_id, price),
            Job::InventoryInstantSell {
                item,
                asset,
                on_complete,
            }
            | Job::InventoryStartingAt {
                item,
                asset,
                on_complete,
            }
            | Job::OfferHighestOrder {
                item,
                asset,
                on_complete,
            }
            | Job::OfferStartingAt {
                item,
                asset,
                on_complete,
            } => on_complete(item, price, asset),
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Job");
        d.field("kind", &self.kind().as_str());
        d.field("item", self.item());
        if let Job::MyListing { listing_id, .. } = self {
            d.field("listing_id", listing_id);
        }
        d.finish()
    }
}
