//! Rebuild the market summary and refresh issuer display names from the
//! archives.
//!
//! The summary is a projection of the archives' last records; it is never
//! edited in place and never fetched from the site. Running this after any
//! archive write keeps the three persisted files consistent with each
//! other, and running it twice in a row changes nothing.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{StockArchive, SummaryRow};
use crate::services::store::DataStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResyncStats {
    /// Snapshot rows written to the market summary
    pub instruments: usize,
    /// Issuer directory entries whose display name changed
    pub issuers_renamed: usize,
}

/// Rebuild `market_summary.json` from the archives on disk, then bring the
/// issuer directory's display names in line with it.
pub fn resync(store: &DataStore) -> Result<ResyncStats> {
    let codes = store.list_archive_codes()?;

    let mut rows = Vec::new();
    for code in &codes {
        let archive = match store.load_archive(code) {
            Ok(Some(archive)) => archive,
            Ok(None) => continue,
            Err(e) => {
                warn!(code = %code, error = %e, "skipping unreadable archive");
                continue;
            }
        };
        match snapshot_row(&archive) {
            Some(row) => rows.push(row),
            None => debug!(code = %code, "archive has no records; no summary row"),
        }
    }
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    store.save_summary(&rows)?;

    let issuers_renamed = refresh_issuer_names(store, &rows)?;

    info!(
        instruments = rows.len(),
        issuers_renamed = issuers_renamed,
        "market summary resynced"
    );
    Ok(ResyncStats {
        instruments: rows.len(),
        issuers_renamed,
    })
}

/// Derive one snapshot row from an archive's most recent record, or `None`
/// for an archive that has never traded.
fn snapshot_row(archive: &StockArchive) -> Option<SummaryRow> {
    let mut history = archive.history.clone();
    history.sort_by_key(|r| r.date);
    let latest = history.last()?;
    let previous = history.len().checked_sub(2).and_then(|i| history.get(i));

    // days without a closing transaction fall back to the average price
    let price = if latest.last_transaction_price != 0.0 {
        latest.last_transaction_price
    } else {
        latest.average_price
    };

    // the exchange's own figure wins; derivation needs a non-zero previous close
    let change_pct = match latest.percent_change {
        Some(pct) => pct,
        None => previous
            .filter(|prev| prev.last_transaction_price > 0.0)
            .map(|prev| {
                (price - prev.last_transaction_price) / prev.last_transaction_price * 100.0
            })
            .unwrap_or(0.0),
    };

    Some(SummaryRow {
        code: archive.company_code.clone(),
        name: archive.company_name.clone(),
        price,
        change_pct,
        volume: latest.quantity,
        turnover: latest.total_turnover_mkd,
        date: Some(latest.date),
    })
}

/// Overwrite issuer display names on code match, leaving every other field
/// exactly as scraped. Instruments without a directory entry and entries
/// without an archive both pass through untouched.
fn refresh_issuer_names(store: &DataStore, rows: &[SummaryRow]) -> Result<usize> {
    let mut issuers = match store.load_issuers()? {
        Some(issuers) => issuers,
        None => {
            debug!("no issuer directory; skipping name refresh");
            return Ok(0);
        }
    };

    let mut renamed = 0;
    for issuer in issuers.iter_mut() {
        if let Some(row) = rows.iter().find(|row| row.code == issuer.code) {
            if !row.name.is_empty() && issuer.name != row.name {
                issuer.name = row.name.clone();
                renamed += 1;
            }
        }
    }
    if renamed > 0 {
        store.save_issuers(&issuers)?;
    }
    Ok(renamed)
}
