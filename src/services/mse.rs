//! HTTP adapter for the exchange's symbol history pages.
//!
//! The site has no JSON API for history: each instrument exposes a form
//! endpoint that accepts `FromDate`/`ToDate`/`Code` as an urlencoded POST
//! and replies with an HTML page whose `#resultsTable` holds one row per
//! trading day. The endpoint serves at most one calendar year per request,
//! which is why callers fetch in year windows.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use isahc::{config::Configurable, prelude::*, HttpClient};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::constants::{HISTORY_ROW_CELLS, HTTP_TIMEOUT_SECS, MSE_HISTORY_URL};
use crate::error::{AppError, Result};
use crate::models::DailyRecord;
use crate::services::locale;

/// Read-only access to an instrument's published trading history.
///
/// Implementations hold no mutable state, so one value can serve any number
/// of concurrent instrument jobs. An `Ok` with zero records is a normal
/// answer (holidays, suspended listings, pre-listing years), not an error.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch every trading day of one calendar year. Issues exactly one
    /// request.
    async fn fetch_year(&self, code: &str, year: i32) -> Result<Vec<DailyRecord>>;

    /// Fetch every trading day in `[from, to]`, bounded to one calendar
    /// year by the site. Issues exactly one request.
    async fn fetch_range(&self, code: &str, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<DailyRecord>>;
}

#[derive(Clone)]
pub struct MseClient {
    client: HttpClient,
    base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
}

#[async_trait]
impl HistorySource for MseClient {
    async fn fetch_year(&self, code: &str, year: i32) -> Result<Vec<DailyRecord>> {
        let from = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::InvalidInput(format!("year {} out of range", year)))?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| AppError::InvalidInput(format!("year {} out of range", year)))?;
        self.fetch_window(code, from, to).await
    }

    async fn fetch_range(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>> {
        self.fetch_window(code, from, to).await
    }
}

impl MseClient {
    pub fn new(random_agent: bool) -> Result<Self> {
        Self::with_base_url(MSE_HISTORY_URL, random_agent)
    }

    pub fn with_base_url(base_url: &str, random_agent: bool) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0".to_string(),
        ];

        Ok(MseClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agents,
            random_agent,
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn fetch_window(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>> {
        let url = format!("{}/{}", self.base_url, code);
        let body = form_body(code, from, to);
        let user_agent = self.get_user_agent();
        debug!(code = code, url = %url, body = %body, "requesting history window");

        let request = isahc::Request::builder()
            .uri(&url)
            .method("POST")
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "mk-MK,mk;q=0.9,en;q=0.8")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("User-Agent", user_agent.as_str())
            .body(body)
            .map_err(|e| AppError::Network(format!("Request build error: {}", e)))?;

        let mut response = self.client.send_async(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "history request for {} [{} .. {}] failed with status {}",
                code, from, to, status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Response body error: {}", e)))?;

        let scan = scan_history_table(&text)?;
        if scan.dropped > 0 {
            warn!(
                code = code,
                dropped = scan.dropped,
                "dropped malformed history rows"
            );
        }
        if scan.records.is_empty() {
            // the page title tells an error page apart from a quiet window
            debug!(
                code = code,
                from = %from,
                to = %to,
                page_title = scan.page_title.as_deref().unwrap_or(""),
                "window returned no trades"
            );
        }
        Ok(scan.records)
    }
}

/// Request dates use the site's day-first format without zero padding,
/// e.g. `1.1.2024`.
fn format_request_date(date: NaiveDate) -> String {
    format!("{}.{}.{}", date.day(), date.month(), date.year())
}

fn form_body(code: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "FromDate={}&ToDate={}&Code={}",
        format_request_date(from),
        format_request_date(to),
        code
    )
}

/// A table row after classification. Rows are classified exactly once, at
/// this boundary; downstream code only ever sees well-formed records.
enum RawRow {
    Record(DailyRecord),
    Malformed { reason: String },
}

struct TableScan {
    records: Vec<DailyRecord>,
    dropped: usize,
    page_title: Option<String>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::Parse(format!("invalid selector {}: {}", css, e)))
}

fn scan_history_table(html: &str) -> Result<TableScan> {
    let document = Html::parse_document(html);
    let row_selector = selector("table#resultsTable tbody tr")?;
    let cell_selector = selector("td")?;
    let title_selector = selector("title")?;

    let page_title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string());

    let mut records = Vec::new();
    let mut dropped = 0;
    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        match classify_row(&cells) {
            RawRow::Record(record) => records.push(record),
            RawRow::Malformed { reason } => {
                debug!(reason = %reason, "skipping history row");
                dropped += 1;
            }
        }
    }

    Ok(TableScan {
        records,
        dropped,
        page_title,
    })
}

fn classify_row(cells: &[String]) -> RawRow {
    if cells.len() < HISTORY_ROW_CELLS {
        return RawRow::Malformed {
            reason: format!("expected {} cells, found {}", HISTORY_ROW_CELLS, cells.len()),
        };
    }

    let date = match locale::parse_date(&cells[0]) {
        Ok(date) => date,
        Err(e) => return RawRow::Malformed { reason: e.to_string() },
    };

    RawRow::Record(DailyRecord {
        date,
        last_transaction_price: locale::parse_amount(&cells[1]),
        max_price: locale::parse_amount_opt(&cells[2]),
        min_price: locale::parse_amount_opt(&cells[3]),
        average_price: locale::parse_amount(&cells[4]),
        percent_change: locale::parse_amount_opt(&cells[5]),
        quantity: locale::parse_quantity(&cells[6]),
        turnover_best_mkd: locale::parse_amount(&cells[7]),
        total_turnover_mkd: locale::parse_amount(&cells[8]),
    })
}
