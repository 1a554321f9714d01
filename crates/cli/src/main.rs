//! AmlWatch CLI - Main entry point

use amlwatch_cli::{commands, AppContext};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "amlwatch")]
#[command(about = "AmlWatch - AML transaction risk evaluation", long_about = None)]
struct Cli {
    /// Risk configuration file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transaction history log (JSONL)
    #[arg(long, default_value = "./data/history.jsonl")]
    history: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single transaction
    Evaluate {
        /// Entity (account/user) ID
        entity: String,
        /// Transaction amount
        amount: Decimal,
        /// Currency code
        currency: String,
        /// Country
        country: String,
        /// Transaction time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Append the transaction and its flag to the history log
        #[arg(long)]
        record: bool,
    },

    /// Evaluate a JSONL file of transactions in order, recording each one
    Replay {
        /// Input file, one evaluation context per line
        input: PathBuf,
    },

    /// Flagged transactions per day
    Summary,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so verdict JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut ctx = AppContext::open(cli.config.as_deref(), &cli.history)?;

    match cli.command {
        Commands::Evaluate {
            entity,
            amount,
            currency,
            country,
            at,
            record,
        } => {
            let timestamp = at.unwrap_or_else(Utc::now);
            commands::evaluate(&mut ctx, &entity, amount, &currency, &country, timestamp, record)
                .await?;
        }

        Commands::Replay { input } => {
            commands::replay(&mut ctx, &input).await?;
        }

        Commands::Summary => {
            commands::summary(&ctx)?;
        }

        Commands::Config => {
            commands::config(&ctx)?;
        }
    }

    Ok(())
}
