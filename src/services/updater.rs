//! Incremental update: fetch only the gap since each archive's last
//! trading day.
//!
//! The archive itself is the cursor. There is no separate progress state to
//! corrupt, and a failed instrument simply retries naturally on the next
//! scheduled run because its last archived day has not moved.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::constants::UPDATE_CONCURRENCY;
use crate::error::{AppError, Result};
use crate::models::{RunReport, SyncOutcome};
use crate::services::merge::merge;
use crate::services::mse::HistorySource;
use crate::services::store::DataStore;

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Instruments updated in parallel
    pub concurrency: usize,
    /// Soft deadline for the whole run; instruments not yet started when it
    /// passes are skipped, in-flight ones finish
    pub run_timeout: Option<Duration>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            concurrency: UPDATE_CONCURRENCY,
            run_timeout: None,
        }
    }
}

/// Update every archived instrument and tally per-instrument outcomes.
pub async fn update_all<S>(
    source: S,
    store: DataStore,
    options: UpdateOptions,
) -> Result<RunReport>
where
    S: HistorySource + Clone + 'static,
{
    let codes = store.list_archive_codes()?;
    if codes.is_empty() {
        warn!(
            stocks_dir = %store.stocks_dir().display(),
            "no archives to update; run a backfill first"
        );
        return Ok(RunReport::new());
    }

    let today = Utc::now().date_naive();
    let concurrency = options.concurrency.max(1);
    let started = Instant::now();
    let mut report = RunReport::new();

    info!(
        instruments = codes.len(),
        concurrency = concurrency,
        today = %today,
        "starting incremental update"
    );

    for (index, chunk) in codes.chunks(concurrency).enumerate() {
        if let Some(timeout) = options.run_timeout {
            if started.elapsed() >= timeout {
                let first_skipped = index * concurrency;
                warn!(
                    skipped = codes.len() - first_skipped,
                    "run deadline reached; skipping instruments that have not started"
                );
                for code in &codes[first_skipped..] {
                    report.record(
                        code.clone(),
                        SyncOutcome::Failed {
                            reason: "run deadline reached before start".to_string(),
                        },
                    );
                }
                break;
            }
        }

        let mut tasks = Vec::new();
        for code in chunk {
            let source = source.clone();
            let store = store.clone();
            let code = code.clone();
            tasks.push(tokio::spawn(async move {
                match update_instrument(&source, &store, &code, today).await {
                    Ok(outcome) => outcome,
                    Err(e) => SyncOutcome::Failed {
                        reason: e.to_string(),
                    },
                }
            }));
        }

        let results = join_all(tasks).await;
        for (code, result) in chunk.iter().zip(results) {
            match result {
                Ok(outcome) => report.record(code.clone(), outcome),
                Err(e) => {
                    error!(code = %code, error = %e, "update task join error");
                    report.record(
                        code.clone(),
                        SyncOutcome::Failed {
                            reason: format!("task join error: {}", e),
                        },
                    );
                }
            }
        }
    }

    info!(
        updated = report.updated(),
        no_new_data = report.no_new_data(),
        failed = report.failed(),
        inserted = report.inserted_total(),
        "incremental update complete"
    );
    Ok(report)
}

/// Update one instrument: fetch `[last archived day + 1, today]`, merge,
/// and persist only when the window actually returned rows.
pub async fn update_instrument<S: HistorySource>(
    source: &S,
    store: &DataStore,
    code: &str,
    today: NaiveDate,
) -> Result<SyncOutcome> {
    let mut archive = match store.load_archive(code)? {
        Some(archive) => archive,
        None => return Err(AppError::NotFound(format!("no archive for {}", code))),
    };

    let last = match archive.last_date() {
        Some(last) => last,
        None => {
            warn!(code = code, "archive has no records; it needs a backfill, not an update");
            return Ok(SyncOutcome::NoHistory);
        }
    };

    if last >= today {
        debug!(code = code, last = %last, "archive already current");
        return Ok(SyncOutcome::NoData);
    }

    let from = last
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInput(format!("no day after {}", last)))?;
    let rows = source.fetch_range(code, from, today).await?;
    if rows.is_empty() {
        debug!(code = code, from = %from, to = %today, "no trades since last archived day");
        return Ok(SyncOutcome::NoData);
    }

    let (merged, inserted) = merge(&archive.history, &rows);
    archive.set_history(merged);
    store.save_archive(&archive)?;
    info!(code = code, inserted = inserted, "archive extended");
    Ok(SyncOutcome::Updated { inserted })
}
