use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::{BACKFILL_CONCURRENCY, BACKFILL_START_YEAR, UPDATE_CONCURRENCY};

#[derive(Parser)]
#[command(name = "msesync")]
#[command(about = "Macedonian Stock Exchange data sync CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch full trading history, year by year
    Backfill {
        /// Instrument codes to backfill
        #[arg(required_unless_present = "all")]
        codes: Vec<String>,

        /// Backfill every instrument in the market summary instead
        #[arg(long, conflicts_with = "codes")]
        all: bool,

        /// First calendar year to request
        #[arg(long, default_value_t = BACKFILL_START_YEAR)]
        from_year: i32,

        /// Instruments fetched in parallel
        #[arg(long, default_value_t = BACKFILL_CONCURRENCY)]
        concurrency: usize,

        /// Soft deadline for the whole run, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Fetch the gap since each archive's last trading day
    Update {
        /// Instruments updated in parallel
        #[arg(long, default_value_t = UPDATE_CONCURRENCY)]
        concurrency: usize,

        /// Soft deadline for the whole run, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Rebuild the market summary and issuer names from the archives
    Resync,
    /// Show what is archived on disk
    Status {
        /// Instrument codes to show in detail
        codes: Vec<String>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Backfill {
            codes,
            all: _,
            from_year,
            concurrency,
            timeout_secs,
        } => {
            commands::backfill::run(codes, from_year, concurrency, timeout_secs);
        }
        Commands::Update {
            concurrency,
            timeout_secs,
        } => {
            commands::update::run(concurrency, timeout_secs);
        }
        Commands::Resync => {
            commands::resync::run();
        }
        Commands::Status { codes } => {
            commands::status::run(codes);
        }
    }
}
