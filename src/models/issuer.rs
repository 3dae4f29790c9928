use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Link to a published issuer report (prospectus, financials, notices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLink {
    pub title: String,
    pub url: String,
    pub date: String,
}

/// Entry in `issuers.json`, the issuer directory scraped from the exchange's
/// profile pages.
///
/// The directory is maintained by a separate scraper; the sync pipeline only
/// refreshes `name` from the archives. Every other field, including ones this
/// version does not know about, must survive a rewrite byte-for-value, which
/// is what the flattened `extra` map is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    pub code: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(rename = "reportLinks", default)]
    pub report_links: Vec<ReportLink>,

    /// Fields added by other tools, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
