use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one instrument, as published in the exchange's
/// symbol history table.
///
/// # Amount Format
/// The site renders amounts in Macedonian locale (`.` thousands separator,
/// `,` decimal comma). All values here are already normalized; prices and
/// turnovers are denominated in MKD.
///
/// Days without trades in a price band leave the max/min cells empty, and
/// older archives carry `null` percent changes, so those fields stay
/// optional end to end. A plain `0` is a real value, not an absence marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Trading date (the exchange publishes one row per date)
    pub date: NaiveDate,

    /// Price of the last transaction of the day, in MKD
    pub last_transaction_price: f64,

    /// Highest transaction price, absent on days without banded trades
    pub max_price: Option<f64>,

    /// Lowest transaction price, absent on days without banded trades
    pub min_price: Option<f64>,

    /// Volume-weighted average price, in MKD
    pub average_price: f64,

    /// Percent change versus the prior trading day, when the exchange
    /// published one
    pub percent_change: Option<f64>,

    /// Traded quantity (number of securities)
    pub quantity: u64,

    /// Turnover on the BEST platform, in MKD
    pub turnover_best_mkd: f64,

    /// Total turnover denominated in MKD
    pub total_turnover_mkd: f64,
}
