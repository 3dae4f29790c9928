use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-instrument snapshot row in `market_summary.json`, derived from the
/// last record of the instrument's archive. The summary is a pure
/// projection: it is rebuilt from the archives and never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Instrument code
    pub code: String,

    /// Issuer display name carried over from the archive
    pub name: String,

    /// Latest price: last transaction price, falling back to the average
    /// price when no closing transaction was recorded
    pub price: f64,

    /// Percent change versus the prior trading day
    pub change_pct: f64,

    /// Traded quantity on the latest trading day
    pub volume: u64,

    /// Total turnover on the latest trading day, in MKD
    pub turnover: f64,

    /// Date of the latest archived trading day. Summaries written by older
    /// tooling carry an empty string here for instruments that never
    /// traded; those rows load with no date.
    #[serde(with = "summary_date", default)]
    pub date: Option<NaiveDate>,
}

/// Custom serde module for the summary `date` field: an ISO date string,
/// with `""` standing in for a never-traded instrument.
mod summary_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
