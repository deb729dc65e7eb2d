//! Activity command - show the shared queue activity record
//!
//! Usage:
//! ```bash
//! steamprice activity
//! steamprice activity --json
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use steamprice_store::ActivityLedger;

use super::StoreOpts;

/// Arguments for the activity command
#[derive(Args)]
pub struct ActivityArgs {
    /// Output the raw record as JSON (no formatting)
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    store: StoreOpts,
}

/// Run the activity command
pub async fn run(args: ActivityArgs) -> Result<()> {
    let store = args.store.open().await?;
    let ledger = ActivityLedger::new(store, "cli");

    let record = ledger
        .current()
        .await
        .context("reading the activity record")?;

    if args.json {
        match &record {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => println!("null"),
        }
        return Ok(());
    }

    println!("{}", "Queue activity".bold().cyan());
    println!();

    let Some(record) = record else {
        println!("{} no queue has recorded a dispatch yet", "ℹ".blue().bold());
        return Ok(());
    };

    let age = Utc::now().signed_duration_since(record.last_used);
    let freshness = ActivityLedger::DEFAULT_FRESHNESS;
    let claim = match age.to_std() {
        Ok(age) if age > freshness => "stale, any queue may run".green(),
        _ => "fresh, queues elsewhere back off for now".yellow(),
    };

    println!(
        "  {} {} ({}s ago)",
        "Last used:".dimmed(),
        record.last_used.format("%Y-%m-%d %H:%M:%S UTC"),
        age.num_seconds()
    );
    println!("  {} {}", "Used at:".dimmed(), record.used_at);
    println!("  {} {}", "Claim:".dimmed(), claim);

    Ok(())
}
