pub mod backfill;
pub mod resync;
pub mod status;
pub mod update;

use crate::models::{RunReport, SyncOutcome};

/// Print the run tally plus one line per failed instrument. Partial
/// failures are reported here but never change the exit code.
pub(crate) fn print_run_report(report: &RunReport) {
    println!(
        "\n📊 Run summary: ✅ {} updated ({} new records), ➖ {} no new data, ❌ {} failed",
        report.updated(),
        report.inserted_total(),
        report.no_new_data(),
        report.failed()
    );
    for (code, outcome) in report.outcomes() {
        if let SyncOutcome::Failed { reason } = outcome {
            println!("   ❌ {}: {}", code, reason);
        }
    }
}
