use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DailyRecord;

/// Full trading history of one instrument, persisted as
/// `stocks/{CODE}.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockArchive {
    /// Instrument code on the exchange (e.g. `ALK`, `KMB`)
    pub company_code: String,

    /// Issuer display name, transliterated to Latin script
    pub company_name: String,

    /// Original Cyrillic name when it differs from the display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name_original: Option<String>,

    /// Sector classification, when known from the issuer directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Daily records sorted ascending by date, one per trading day
    pub history: Vec<DailyRecord>,

    /// Date of the oldest archived record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_trade_date: Option<NaiveDate>,
}

impl StockArchive {
    /// Create an empty archive for an instrument
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            company_code: code.to_string(),
            company_name: name.to_string(),
            company_name_original: None,
            sector: None,
            history: Vec::new(),
            first_trade_date: None,
        }
    }

    /// Replace the history and refresh the derived first-trade date.
    /// Callers pass records already sorted ascending by date.
    pub fn set_history(&mut self, history: Vec<DailyRecord>) {
        self.first_trade_date = history.first().map(|r| r.date);
        self.history = history;
    }

    /// Most recent record, robust to archives written unsorted by older
    /// tooling
    pub fn latest(&self) -> Option<&DailyRecord> {
        self.history.iter().max_by_key(|r| r.date)
    }

    /// Date of the most recent record
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.latest().map(|r| r.date)
    }
}
