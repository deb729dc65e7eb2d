//! Subcommand implementations.

pub mod activity;
pub mod feed;
pub mod lookup;
pub mod overview;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use steamprice_store::{MemoryStore, SharedStore, SqliteStore};

/// Where the shared store lives. Commands that coordinate through the
/// store (queue activity, settings, price tables) flatten this in.
#[derive(Args, Debug)]
pub struct StoreOpts {
    /// Path to the sqlite store file
    #[arg(long, env = "STEAMPRICE_DB")]
    db: Option<PathBuf>,

    /// Keep everything in memory, nothing persisted
    #[arg(long, conflicts_with = "db")]
    memory: bool,
}

impl StoreOpts {
    pub async fn open(&self) -> Result<Arc<dyn SharedStore>> {
        if self.memory {
            return Ok(Arc::new(MemoryStore::new()));
        }

        let path = match &self.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        let store = SqliteStore::new(&url)
            .await
            .with_context(|| format!("opening store at {}", path.display()))?;
        Ok(Arc::new(store))
    }
}

fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("no data directory on this platform")?;
    Ok(base.join("steamprice").join("steamprice.db"))
}
