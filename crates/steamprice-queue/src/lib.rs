//! # steamprice-queue
//!
//! Serialized lookup queue for Steam Community Market prices.
//!
//! The market tolerates roughly one lookup every few seconds per client
//! before it starts refusing requests, so price checks cannot simply be
//! fired as they come up. This crate queues them instead: jobs run one at
//! a time in arrival order, each completed call waits out a pacing delay
//! before the next, failures go to the back of the line for a later
//! retry, repeated prices are answered from a cache without touching the
//! network, and an advisory record in the shared store keeps queues in
//! other processes from spending the same request budget.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use steamprice_market::MockPriceSource;
//! use steamprice_queue::{ItemId, Job, PriceQueue, QueueConfig};
//! use steamprice_store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(MockPriceSource::constant(1499));
//!     let store = Arc::new(MemoryStore::new());
//!     let queue = PriceQueue::new(source, store, QueueConfig::default());
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let item = ItemId::new(730, "AK-47 | Redline (Field-Tested)");
//!     queue
//!         .enqueue(Job::my_buy_order(item, move |_, cents| {
//!             tx.send(cents).ok();
//!         }))
//!         .await;
//!     queue.drain();
//!
//!     assert_eq!(rx.recv().await, Some(1499));
//! }
//! ```

pub mod cache;
pub mod config;
pub mod job;
pub mod queue;

pub use cache::{CacheKey, PriceCache};
pub use config::QueueConfig;
pub use job::{AssetCallback, AssetRef, Job, JobKind, ListingCallback, OrderCallback, SourceOp};
pub use queue::{DrainedCallback, FailReason, PriceQueue};

pub use steamprice_market::{Cents, ItemId};
