//! Full-history backfill.
//!
//! Each instrument is fetched year by year from the configured start year
//! through the current one, oldest first so that a re-fetched day keeps the
//! freshest values. Years stay sequential within an instrument; instruments
//! run in fixed-size parallel batches. One bad year window never forfeits
//! the other years, and one bad instrument never aborts its siblings.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{Datelike, Utc};
use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::constants::{BACKFILL_CONCURRENCY, BACKFILL_START_YEAR, REQUEST_DELAY_MS};
use crate::error::{AppError, Result};
use crate::models::{RunReport, StockArchive, SyncOutcome};
use crate::services::merge::merge;
use crate::services::mse::HistorySource;
use crate::services::store::DataStore;
use crate::services::translit::transliterate;

/// An instrument to backfill: exchange code plus the listing name as
/// published (usually Cyrillic).
#[derive(Debug, Clone)]
pub struct InstrumentTarget {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// First calendar year to request
    pub from_year: i32,
    /// Instruments fetched in parallel
    pub concurrency: usize,
    /// Pause between consecutive year requests of one instrument
    pub request_delay: Duration,
    /// Soft deadline for the whole run; instruments not yet started when it
    /// passes are skipped, in-flight ones finish
    pub run_timeout: Option<Duration>,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            from_year: BACKFILL_START_YEAR,
            concurrency: BACKFILL_CONCURRENCY,
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            run_timeout: None,
        }
    }
}

/// Resolve which instruments a backfill run covers. With no explicit codes
/// the market summary is the listing of record; explicit codes are
/// uppercased, deduplicated and looked up there for their display names.
pub fn resolve_targets(store: &DataStore, codes: &[String]) -> Result<Vec<InstrumentTarget>> {
    let summary = store.load_summary()?;

    if codes.is_empty() {
        if summary.is_empty() {
            return Err(AppError::Config(format!(
                "no market summary at {}; pass instrument codes explicitly",
                store.summary_path().display()
            )));
        }
        return Ok(summary
            .into_iter()
            .map(|row| InstrumentTarget {
                code: row.code,
                name: row.name,
            })
            .collect());
    }

    // A repeated code would schedule the same archive twice in one batch,
    // with both tasks renaming over the same temp file.
    let requested: BTreeSet<String> = codes
        .iter()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .collect();

    let mut targets = Vec::new();
    for code in requested {
        let name = summary
            .iter()
            .find(|row| row.code == code)
            .map(|row| row.name.clone())
            .unwrap_or_default();
        if name.is_empty() {
            debug!(code = %code, "code not in market summary; archive starts unnamed");
        }
        targets.push(InstrumentTarget { code, name });
    }
    Ok(targets)
}

/// Backfill a batch of instruments and tally per-instrument outcomes.
pub async fn backfill_instruments<S>(
    source: S,
    store: DataStore,
    targets: Vec<InstrumentTarget>,
    options: BackfillOptions,
) -> RunReport
where
    S: HistorySource + Clone + 'static,
{
    let concurrency = options.concurrency.max(1);
    let started = Instant::now();
    let mut report = RunReport::new();

    info!(
        instruments = targets.len(),
        concurrency = concurrency,
        from_year = options.from_year,
        "starting backfill run"
    );

    for (index, chunk) in targets.chunks(concurrency).enumerate() {
        if let Some(timeout) = options.run_timeout {
            if started.elapsed() >= timeout {
                let first_skipped = index * concurrency;
                warn!(
                    skipped = targets.len() - first_skipped,
                    "run deadline reached; skipping instruments that have not started"
                );
                for target in &targets[first_skipped..] {
                    report.record(
                        target.code.clone(),
                        SyncOutcome::Failed {
                            reason: "run deadline reached before start".to_string(),
                        },
                    );
                }
                break;
            }
        }

        let mut tasks = Vec::new();
        for target in chunk {
            let source = source.clone();
            let store = store.clone();
            let target = target.clone();
            let options = options.clone();
            tasks.push(tokio::spawn(async move {
                match backfill_instrument(&source, &store, &target, &options).await {
                    Ok(outcome) => outcome,
                    Err(e) => SyncOutcome::Failed {
                        reason: e.to_string(),
                    },
                }
            }));
        }

        let results = join_all(tasks).await;
        for (target, result) in chunk.iter().zip(results) {
            match result {
                Ok(outcome) => report.record(target.code.clone(), outcome),
                Err(e) => {
                    error!(code = %target.code, error = %e, "backfill task join error");
                    report.record(
                        target.code.clone(),
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
        "backfill run complete"
    );
    report
}

/// Backfill a single instrument: walk its year windows oldest first, merge
/// everything fetched into the archive, and persist once at the end.
pub async fn backfill_instrument<S: HistorySource>(
    source: &S,
    store: &DataStore,
    target: &InstrumentTarget,
    options: &BackfillOptions,
) -> Result<SyncOutcome> {
    let to_year = Utc::now().year();
    if options.from_year > to_year {
        return Err(AppError::InvalidInput(format!(
            "start year {} is in the future",
            options.from_year
        )));
    }

    let mut archive = store
        .load_archive(&target.code)?
        .unwrap_or_else(|| StockArchive::new(&target.code, ""));
    if !target.name.is_empty() {
        let latin = transliterate(&target.name);
        if latin != target.name {
            archive.company_name_original = Some(target.name.clone());
        }
        archive.company_name = latin;
    }

    let mut fetched = Vec::new();
    let mut failed_years = 0usize;
    for year in options.from_year..=to_year {
        match source.fetch_year(&target.code, year).await {
            Ok(rows) if rows.is_empty() => {
                debug!(code = %target.code, year = year, "no trades in year window");
            }
            Ok(rows) => {
                debug!(code = %target.code, year = year, rows = rows.len(), "year window fetched");
                fetched.extend(rows);
            }
            Err(e) => {
                warn!(code = %target.code, year = year, error = %e, "year window failed; continuing");
                failed_years += 1;
            }
        }
        if year < to_year {
            sleep(options.request_delay).await;
        }
    }

    if fetched.is_empty() {
        if failed_years > 0 {
            return Ok(SyncOutcome::Failed {
                reason: format!("{} year window(s) failed and none returned data", failed_years),
            });
        }
        if archive.history.is_empty() {
            info!(code = %target.code, "instrument has no published history");
            return Ok(SyncOutcome::NoHistory);
        }
        return Ok(SyncOutcome::NoData);
    }

    let (merged, inserted) = merge(&archive.history, &fetched);
    archive.set_history(merged);
    store.save_archive(&archive)?;
    info!(
        code = %target.code,
        records = archive.history.len(),
        inserted = inserted,
        failed_years = failed_years,
        "archive backfilled"
    );
    Ok(SyncOutcome::Updated { inserted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyRecord;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct ScriptedSource {
        years: Arc<HashMap<(String, i32), Vec<DailyRecord>>>,
        failing: Arc<HashSet<String>>,
    }

    #[async_trait]
    impl HistorySource for ScriptedSource {
        async fn fetch_year(&self, code: &str, year: i32) -> Result<Vec<DailyRecord>> {
            if self.failing.contains(code) {
                return Err(AppError::Network(format!("scripted outage for {}", code)));
            }
            Ok(self
                .years
                .get(&(code.to_string(), year))
                .cloned()
                .unwrap_or_default())
        }

        async fn fetch_range(
            &self,
            _code: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<DailyRecord>> {
            Ok(Vec::new())
        }
    }

    fn record(year: i32, month: u32, day: u32, price: f64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            last_transaction_price: price,
            max_price: Some(price),
            min_price: Some(price),
            average_price: price,
            percent_change: None,
            quantity: 100,
            turnover_best_mkd: price * 100.0,
            total_turnover_mkd: price * 100.0,
        }
    }

    fn target(code: &str) -> InstrumentTarget {
        InstrumentTarget {
            code: code.to_string(),
            name: String::new(),
        }
    }

    fn fast_options(from_year: i32) -> BackfillOptions {
        BackfillOptions {
            from_year,
            concurrency: 2,
            request_delay: Duration::ZERO,
            run_timeout: None,
        }
    }

    #[tokio::test]
    async fn walks_year_windows_into_a_sorted_archive() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let mut years = HashMap::new();
        years.insert(
            ("ALK".to_string(), this_year - 1),
            vec![record(this_year - 1, 6, 10, 101.0), record(this_year - 1, 2, 5, 100.0)],
        );
        years.insert(
            ("ALK".to_string(), this_year),
            vec![record(this_year, 1, 15, 102.0)],
        );
        let source = ScriptedSource {
            years: Arc::new(years),
            ..Default::default()
        };

        let outcome = backfill_instrument(
            &source,
            &store,
            &target("ALK"),
            &fast_options(this_year - 1),
        )
        .await
        .unwrap();
        assert_eq!(outcome, SyncOutcome::Updated { inserted: 3 });

        let archive = store.load_archive("ALK").unwrap().unwrap();
        let dates: Vec<NaiveDate> = archive.history.iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(archive.history.len(), 3);
        assert_eq!(
            archive.first_trade_date,
            NaiveDate::from_ymd_opt(this_year - 1, 2, 5)
        );
    }

    #[tokio::test]
    async fn failures_stay_scoped_to_their_instrument() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let mut years = HashMap::new();
        years.insert(("AAA".to_string(), this_year), vec![record(this_year, 3, 1, 10.0)]);
        years.insert(("CCC".to_string(), this_year), vec![record(this_year, 3, 1, 30.0)]);
        let source = ScriptedSource {
            years: Arc::new(years),
            failing: Arc::new(HashSet::from(["BBB".to_string()])),
        };

        let report = backfill_instruments(
            source,
            store.clone(),
            vec![target("AAA"), target("BBB"), target("CCC")],
            fast_options(this_year),
        )
        .await;

        assert_eq!(report.updated(), 2);
        assert_eq!(report.failed(), 1);
        assert!(store.load_archive("AAA").unwrap().is_some());
        assert!(store.load_archive("BBB").unwrap().is_none());
        assert!(store.load_archive("CCC").unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_windows_are_not_failures() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let mut existing = StockArchive::new("ALK", "Alkaloid AD Skopje");
        existing.set_history(vec![record(this_year - 1, 5, 20, 99.0)]);
        store.save_archive(&existing).unwrap();

        let source = ScriptedSource::default();
        let outcome = backfill_instrument(
            &source,
            &store,
            &target("ALK"),
            &fast_options(this_year),
        )
        .await
        .unwrap();

        assert_eq!(outcome, SyncOutcome::NoData);
        let unchanged = store.load_archive("ALK").unwrap().unwrap();
        assert_eq!(unchanged.history, existing.history);
    }

    #[tokio::test]
    async fn never_traded_instruments_write_nothing() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let source = ScriptedSource::default();
        let outcome = backfill_instrument(
            &source,
            &store,
            &target("ZZZ"),
            &fast_options(this_year),
        )
        .await
        .unwrap();

        assert_eq!(outcome, SyncOutcome::NoHistory);
        assert!(store.load_archive("ZZZ").unwrap().is_none());
    }

    #[tokio::test]
    async fn later_year_windows_refresh_overlapping_dates() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        // the same date shows up in both windows with different values; the
        // chronologically later window is fetched last and must win
        let mut years = HashMap::new();
        years.insert(
            ("ALK".to_string(), this_year - 1),
            vec![record(this_year, 1, 10, 100.0)],
        );
        years.insert(
            ("ALK".to_string(), this_year),
            vec![record(this_year, 1, 10, 105.0)],
        );
        let source = ScriptedSource {
            years: Arc::new(years),
            ..Default::default()
        };

        backfill_instrument(&source, &store, &target("ALK"), &fast_options(this_year - 1))
            .await
            .unwrap();

        let archive = store.load_archive("ALK").unwrap().unwrap();
        assert_eq!(archive.history.len(), 1);
        assert_eq!(archive.history[0].last_transaction_price, 105.0);
    }

    #[tokio::test]
    async fn deadline_skips_instruments_that_have_not_started() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let mut options = fast_options(this_year);
        options.run_timeout = Some(Duration::ZERO);

        let report = backfill_instruments(
            ScriptedSource::default(),
            store,
            vec![target("AAA"), target("BBB")],
            options,
        )
        .await;

        assert_eq!(report.failed(), 2);
        assert_eq!(report.updated(), 0);
    }

    #[tokio::test]
    async fn cyrillic_listing_names_are_transliterated() {
        let this_year = Utc::now().year();
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let mut years = HashMap::new();
        years.insert(("ALK".to_string(), this_year), vec![record(this_year, 2, 1, 25_200.0)]);
        let source = ScriptedSource {
            years: Arc::new(years),
            ..Default::default()
        };

        let target = InstrumentTarget {
            code: "ALK".to_string(),
            name: "Алкалоид АД Скопје".to_string(),
        };
        backfill_instrument(&source, &store, &target, &fast_options(this_year))
            .await
            .unwrap();

        let archive = store.load_archive("ALK").unwrap().unwrap();
        assert_eq!(archive.company_name, "Alkaloid AD Skopje");
        assert_eq!(
            archive.company_name_original.as_deref(),
            Some("Алкалоид АД Скопје")
        );
    }

    #[test]
    fn explicit_codes_are_deduplicated() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let codes = vec![
            "alk".to_string(),
            "ALK ".to_string(),
            "kmb".to_string(),
            "ALK".to_string(),
        ];
        let targets = resolve_targets(&store, &codes).unwrap();

        let resolved: Vec<&str> = targets.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(resolved, vec!["ALK", "KMB"]);
    }

    #[test]
    fn summary_universe_keeps_never_traded_instruments() {
        let dir = tempdir().unwrap();
        let store = DataStore::new(dir.path());

        std::fs::write(
            store.summary_path(),
            r#"[
                {"code":"ALK","name":"Alkaloid AD Skopje","price":25200.0,
                 "change_pct":0.71,"volume":120,"turnover":3021600.0,
                 "date":"2024-12-30"},
                {"code":"RMDEN21","name":"RM Denacionalizacija 21","price":0.0,
                 "change_pct":0.0,"volume":0,"turnover":0.0,"date":""}
            ]"#,
        )
        .unwrap();

        let targets = resolve_targets(&store, &[]).unwrap();
        let resolved: Vec<&str> = targets.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(resolved, vec!["ALK", "RMDEN21"]);
    }
}
