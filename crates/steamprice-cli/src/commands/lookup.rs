//! Lookup command - price items through the serialized queue
//!
//! Usage:
//! ```bash
//! steamprice lookup "AK-47 | Redline (Field-Tested)"
//! steamprice lookup --app-id 730 --currency-id 3 "AWP | Asiimov (Field-Tested)"
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use steamprice_market::{ItemId, MarketConfig, StaticWallet, SteamMarket, UnavailableOrders};
use steamprice_queue::{AssetRef, Job, PriceQueue, QueueConfig};
use steamprice_store::Settings;
use tokio::sync::mpsc;

use super::StoreOpts;

/// Arguments for the lookup command
#[derive(Args)]
pub struct LookupArgs {
    /// Market hash names to price, exactly as the market spells them
    #[arg(required = true)]
    items: Vec<String>,

    /// Steam application id
    #[arg(long, default_value_t = 730)]
    app_id: u32,

    /// Steam wallet currency id (1 = USD)
    #[arg(long, default_value_t = StaticWallet::USD)]
    currency_id: u32,

    /// Ask for the highest buy order instead of the lowest listing
    #[arg(long)]
    instant_sell: bool,

    #[command(flatten)]
    store: StoreOpts,
}

/// Run the lookup command
pub async fn run(args: LookupArgs) -> Result<()> {
    let store = args.store.open().await?;
    let settings = Settings::new(Arc::clone(&store));
    let config = QueueConfig::for_settings(&settings).await;

    let market = SteamMarket::new(
        MarketConfig::from_env(),
        Arc::new(StaticWallet::new(args.currency_id)),
        Arc::new(UnavailableOrders),
    );
    let queue = PriceQueue::new(Arc::new(market), store, config);

    if args.instant_sell {
        println!(
            "{} buy order lookups need a logged-in session channel; without one they retry and drop",
            "⚠".yellow().bold()
        );
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let total = args.items.len();
    for name in &args.items {
        let item = ItemId::new(args.app_id, name.clone());
        let tx = tx.clone();
        let job = if args.instant_sell {
            Job::inventory_instant_sell(item, AssetRef::default(), move |item, cents, _| {
                tx.send((item, cents)).ok();
            })
        } else {
            Job::inventory_starting_at(item, AssetRef::default(), move |item, cents, _| {
                tx.send((item, cents)).ok();
            })
        };
        queue.enqueue(job).await;
    }
    drop(tx);

    // Senders live inside the queued jobs, so the channel closes once
    // every job has either completed or been dropped.
    let printer = tokio::spawn(async move {
        let mut resolved = 0usize;
        while let Some((item, cents)) = rx.recv().await {
            resolved += 1;
            println!(
                "{}  {}",
                format!("{:>10}", format_cents(cents)).green().bold(),
                item.market_hash_name
            );
        }
        resolved
    });

    queue.run_until_drained().await;
    let resolved = printer.await?;

    if resolved < total {
        println!(
            "{} {} of {} items did not resolve",
            "⚠".yellow().bold(),
            total - resolved,
            total
        );
    }

    Ok(())
}

/// Render cents as a plain decimal amount
fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_render_with_two_decimal_places() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(1499), "14.99");
        assert_eq!(format_cents(40000), "400.00");
    }
}
