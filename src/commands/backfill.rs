use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::RunReport;
use crate::services::{self, BackfillOptions, DataStore, InstrumentTarget, MseClient};

pub fn run(codes: Vec<String>, from_year: i32, concurrency: usize, timeout_secs: Option<u64>) {
    let store = DataStore::from_env();

    // an empty list means --all; the CLI rejects mixing codes with the flag
    let targets = match services::resolve_targets(&store, &codes) {
        Ok(targets) => targets,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if targets.is_empty() {
        eprintln!("❌ Nothing to backfill");
        std::process::exit(1);
    }

    println!(
        "🚀 Backfilling {} instrument(s) from {} into {}",
        targets.len(),
        from_year,
        store.root().display()
    );

    let options = BackfillOptions {
        from_year,
        concurrency,
        run_timeout: timeout_secs.map(Duration::from_secs),
        ..Default::default()
    };

    let report = match run_backfill(store.clone(), targets, options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Backfill failed: {}", e);
            std::process::exit(1);
        }
    };
    super::print_run_report(&report);

    // the summary follows every archive-writing run, partial failures included
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

fn run_backfill(
    store: DataStore,
    targets: Vec<InstrumentTarget>,
    options: BackfillOptions,
) -> Result<RunReport> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let client = MseClient::new(true)?;
        Ok(services::backfill_instruments(client, store, targets, options).await)
    })
}
