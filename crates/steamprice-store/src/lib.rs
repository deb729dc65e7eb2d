//! # steamprice-store
//!
//! Shared key/value store for queue coordination, pricing tables and user
//! settings. Key names match the wire names older frontends already use,
//! so any process pointed at the same backend reads the same state.
//!
//! Backends:
//! - In-memory (for tests and single-process runs)
//! - SQLite (shared between processes on one machine)

pub mod activity;
pub mod backend;
pub mod settings;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use activity::{claim_is_free, ActivityLedger, ActivityRecord};
pub use backend::{MemoryStore, SharedStore, StoreError, StoreExt};
pub use settings::{defaults, keys, Settings};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteStore};
