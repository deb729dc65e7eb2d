//! Feed command - pull bulk price tables and exchange rates into the store
//!
//! Usage:
//! ```bash
//! steamprice feed prices --provider csgotrader --mode starting_at
//! steamprice feed rates --currency EUR
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use steamprice_market::{MarketConfig, PriceFeed};
use steamprice_store::{keys, StoreExt};

use super::StoreOpts;

/// Arguments for the feed command
#[derive(Args)]
pub struct FeedArgs {
    #[command(flatten)]
    store: StoreOpts,

    #[command(subcommand)]
    command: FeedCommand,
}

#[derive(Subcommand)]
pub enum FeedCommand {
    /// Fetch the provider price table into the store
    #[command(name = "prices")]
    Prices {
        /// Provider to pull (persisted as the pricingProvider setting)
        #[arg(long)]
        provider: Option<String>,

        /// Pricing mode within the provider (persisted as pricingMode)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Fetch the exchange rate table into the store
    #[command(name = "rates")]
    Rates {
        /// Display currency code (persisted as the currency setting)
        #[arg(long)]
        currency: Option<String>,
    },
}

/// Run the feed command
pub async fn run(args: FeedArgs) -> Result<()> {
    let store = args.store.open().await?;
    let feed = PriceFeed::new(MarketConfig::from_env(), store.clone());

    match args.command {
        FeedCommand::Prices { provider, mode } => {
            if let Some(provider) = &provider {
                store
                    .set(keys::PRICING_PROVIDER, provider)
                    .await
                    .context("persisting provider setting")?;
            }
            if let Some(mode) = &mode {
                store
                    .set(keys::PRICING_MODE, mode)
                    .await
                    .context("persisting mode setting")?;
            }

            let count = feed.refresh_prices().await.context("refreshing prices")?;
            println!("{} stored {} item prices", "✓".green().bold(), count);
        }
        FeedCommand::Rates { currency } => {
            if let Some(currency) = &currency {
                store
                    .set(keys::CURRENCY, currency)
                    .await
                    .context("persisting currency setting")?;
            }

            let rates = feed
                .refresh_exchange_rates()
                .await
                .context("refreshing exchange rates")?;
            println!(
                "{} stored {} exchange rates",
                "✓".green().bold(),
                rates.count
            );
            match rates.selected {
                Some(rate) => println!("  {} {}", "Selected rate:".dimmed(), rate),
                None => println!(
                    "{} configured currency has no rate in the table",
                    "⚠".yellow().bold()
                ),
            }
        }
    }

    Ok(())
}
