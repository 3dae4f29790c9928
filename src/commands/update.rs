use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::RunReport;
use crate::services::{self, DataStore, MseClient, UpdateOptions};

pub fn run(concurrency: usize, timeout_secs: Option<u64>) {
    let store = DataStore::from_env();

    println!("🚀 Updating archives in {}", store.root().display());

    let options = UpdateOptions {
        concurrency,
        run_timeout: timeout_secs.map(Duration::from_secs),
    };

    let report = match run_update(store.clone(), options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Update failed: {}", e);
            std::process::exit(1);
        }
    };
    if report.outcomes().is_empty() {
        println!("⚠️  No archives found in {}. Run 'backfill' first.", store.stocks_dir().display());
        return;
    }
    super::print_run_report(&report);

    match services::resync(&store) {
        Ok(stats) => {
            println!(
                "🔄 Market summary rebuilt: {} instruments, {} issuer names refreshed",
                stats.instruments, stats.issuers_renamed
            );
        }
        Err(e) => {
            eprintln!("❌ Market summary resync failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_update(store: DataStore, options: UpdateOptions) -> Result<RunReport> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = MseClient::new(true)?;
        services::update_all(client, store, options).await
    })
}
