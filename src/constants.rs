//! Shared constants for the MSE synchronization pipeline.
//!
//! The exchange publishes trading history through a per-symbol form endpoint
//! that accepts at most one calendar year per request, so full-history
//! backfills walk year windows and incremental updates fetch the gap since
//! the last archived trading day.

/// Base URL of the symbol history endpoint. The instrument code is appended
/// as the final path segment.
pub const MSE_HISTORY_URL: &str = "https://www.mse.mk/mk/stats/symbolhistory";

/// First calendar year requested by a full backfill. The exchange has no
/// electronic records before this.
pub const BACKFILL_START_YEAR: i32 = 2002;

/// Number of instruments backfilled in parallel.
pub const BACKFILL_CONCURRENCY: usize = 5;

/// Number of instruments updated in parallel during incremental runs.
/// Updates issue a single request per instrument, so they can run wider
/// than backfills.
pub const UPDATE_CONCURRENCY: usize = 10;

/// Pause between consecutive year requests for one instrument, to stay
/// polite with the exchange site.
pub const REQUEST_DELAY_MS: u64 = 50;

/// HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Number of cells a history table row must have to be usable. The site
/// renders date, last transaction price, max, min, average, percent change,
/// quantity, best turnover and total turnover in that order.
pub const HISTORY_ROW_CELLS: usize = 9;

/// Earliest plausible year for a parsed trading date. The exchange opened
/// in the mid-1990s; anything earlier is a mis-parsed cell.
pub const EARLIEST_TRADE_YEAR: i32 = 1994;

/// Trading dates further than this many days in the future are rejected as
/// mis-parsed.
pub const MAX_FUTURE_DAYS: i64 = 366;

/// Subdirectory of the data directory holding one JSON archive per
/// instrument.
pub const STOCKS_SUBDIR: &str = "stocks";

/// File name of the market-wide snapshot derived from the archives.
pub const MARKET_SUMMARY_FILE: &str = "market_summary.json";

/// File name of the issuer directory whose display names are kept in sync
/// with the archives.
pub const ISSUERS_FILE: &str = "issuers.json";
