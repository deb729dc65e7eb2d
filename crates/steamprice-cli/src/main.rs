//! steamprice CLI - throttled price lookups against the community market
//!
//! # Usage
//!
//! ```bash
//! # Price items through the serialized queue
//! steamprice lookup "AK-47 | Redline (Field-Tested)" "AWP | Asiimov (Field-Tested)"
//!
//! # One-shot market overview for a single item
//! steamprice overview "AK-47 | Redline (Field-Tested)"
//!
//! # Pull the bulk price feed and exchange rates into the store
//! steamprice feed prices --provider csgotrader
//! steamprice feed rates --currency EUR
//!
//! # Show which queue last used the shared request budget
//! steamprice activity
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{activity, feed, lookup, overview};

/// steamprice - paced Steam Community Market price lookups
///
/// Lookups run through a serialized queue that spaces out requests,
/// retries failures and backs off while a queue in another process is
/// using the shared request budget.
#[derive(Parser)]
#[command(
    name = "steamprice",
    version,
    about = "Throttled price lookups for the Steam Community Market",
    long_about = "Prices items on the Steam Community Market without tripping its\n\
                  rate limiting. Lookups go through a single-flight queue with\n\
                  pacing delays, retry and cross-process coordination; bulk\n\
                  price tables come from the provider feeds."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price items through the serialized queue
    #[command(name = "lookup")]
    Lookup(lookup::LookupArgs),

    /// One-shot price overview for a single item
    #[command(name = "overview")]
    Overview(overview::OverviewArgs),

    /// Bulk price feed and exchange rates
    #[command(name = "feed")]
    Feed(feed::FeedArgs),

    /// Show the shared queue activity record
    #[command(name = "activity")]
    Activity(activity::ActivityArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Lookup(args) => lookup::run(args).await,
        Commands::Overview(args) => overview::run(args).await,
        Commands::Feed(args) => feed::run(args).await,
        Commands::Activity(args) => activity::run(args).await,
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();
}
