//! Overview command - one-shot price overview for a single item
//!
//! Usage:
//! ```bash
//! steamprice overview "AK-47 | Redline (Field-Tested)"
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use steamprice_market::{ItemId, MarketConfig, StaticWallet, SteamMarket, UnavailableOrders};

/// Arguments for the overview command
#[derive(Args)]
pub struct OverviewArgs {
    /// Market hash name, exactly as the market spells it
    item: String,

    /// Steam application id
    #[arg(long, default_value_t = 730)]
    app_id: u32,

    /// Steam wallet currency id (1 = USD)
    #[arg(long, default_value_t = StaticWallet::USD)]
    currency_id: u32,
}

/// Run the overview command
pub async fn run(args: OverviewArgs) -> Result<()> {
    let market = SteamMarket::new(
        MarketConfig::from_env(),
        Arc::new(StaticWallet::new(args.currency_id)),
        Arc::new(UnavailableOrders),
    );

    let item = ItemId::new(args.app_id, args.item.clone());
    let overview = market
        .price_overview(&item)
        .await
        .with_context(|| format!("price overview for {item}"))?;

    println!("{}", args.item.bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Lowest").fg(Color::Cyan),
            Cell::new("Median").fg(Color::Cyan),
            Cell::new("Volume").fg(Color::Cyan),
        ]);
    table.add_row(vec![
        Cell::new(overview.lowest_price.as_deref().unwrap_or("-")).fg(Color::Green),
        Cell::new(overview.median_price.as_deref().unwrap_or("-")),
        Cell::new(overview.volume.as_deref().unwrap_or("-")).fg(Color::Yellow),
    ]);

    println!("{table}");

    Ok(())
}
