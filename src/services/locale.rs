//! Macedonian-locale parsing for scraped table cells.
//!
//! The exchange renders amounts with `.` as the thousands separator and `,`
//! as the decimal comma (`1.234,56`), and dates day-first (`31.12.2024`,
//! occasionally slash-separated). Everything downstream works on normalized
//! `f64` amounts and ISO dates, so this module is the only place locale
//! rules live.

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::constants::{EARLIEST_TRADE_YEAR, MAX_FUTURE_DAYS};
use crate::error::{AppError, Result};

/// Parse a locale-formatted amount, treating empty or malformed cells as
/// zero. Use [`parse_amount_opt`] for fields where absence is meaningful.
pub fn parse_amount(raw: &str) -> f64 {
    parse_amount_opt(raw).unwrap_or(0.0)
}

/// Parse a locale-formatted amount, keeping absence observable: empty and
/// malformed cells come back as `None`, a literal `0,00` as `Some(0.0)`.
pub fn parse_amount_opt(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace('.', "").replace(',', ".");
    normalized.parse::<f64>().ok()
}

/// Parse a traded quantity. Quantities are whole securities; the site still
/// formats them with thousands separators.
pub fn parse_quantity(raw: &str) -> u64 {
    parse_amount(raw).max(0.0).round() as u64
}

/// Parse a day-first date cell (`5.3.2024`, `05.03.2024` or `05/03/2024`).
///
/// Dates that are not valid calendar days, or that fall outside the
/// plausible trading range, are rejected so that a silent format change on
/// the site (say, to month-first) surfaces as dropped rows instead of
/// corrupt archives.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed
        .split(|c| c == '.' || c == '/')
        .map(str::trim)
        .collect();
    if parts.len() != 3 {
        return Err(AppError::Parse(format!("unrecognized date cell: {:?}", raw)));
    }

    let day: u32 = parts[0]
        .parse()
        .map_err(|_| AppError::Parse(format!("bad day in date cell: {:?}", raw)))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| AppError::Parse(format!("bad month in date cell: {:?}", raw)))?;
    let year: i32 = parts[2]
        .parse()
        .map_err(|_| AppError::Parse(format!("bad year in date cell: {:?}", raw)))?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Parse(format!("impossible calendar date: {:?}", raw)))?;

    if date.year() < EARLIEST_TRADE_YEAR {
        return Err(AppError::Parse(format!(
            "trading date {} predates the exchange",
            date
        )));
    }
    let horizon = Utc::now().date_naive() + Duration::days(MAX_FUTURE_DAYS);
    if date > horizon {
        return Err(AppError::Parse(format!(
            "trading date {} is implausibly far in the future",
            date
        )));
    }

    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousand_separated_amounts() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("12.345.678,90"), 12_345_678.90);
        assert_eq!(parse_amount("4.190"), 4190.0);
        assert_eq!(parse_amount("0,00"), 0.0);
        assert_eq!(parse_amount("-2,31"), -2.31);
    }

    #[test]
    fn empty_and_malformed_amounts_fall_back_to_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
    }

    #[test]
    fn optional_amounts_keep_absence_observable() {
        assert_eq!(parse_amount_opt(""), None);
        assert_eq!(parse_amount_opt("garbage"), None);
        assert_eq!(parse_amount_opt("0,00"), Some(0.0));
        assert_eq!(parse_amount_opt("23.456,00"), Some(23_456.0));
    }

    #[test]
    fn quantities_are_whole_numbers() {
        assert_eq!(parse_quantity("1.234"), 1234);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("-5"), 0);
    }

    #[test]
    fn parses_day_first_dates() {
        assert_eq!(parse_date("05.03.2024").unwrap(), date(2024, 3, 5));
        assert_eq!(parse_date("5.3.2024").unwrap(), date(2024, 3, 5));
        assert_eq!(parse_date("05/03/2024").unwrap(), date(2024, 3, 5));
        assert_eq!(parse_date("31.12.2002").unwrap(), date(2002, 12, 31));
    }

    #[test]
    fn rejects_impossible_and_implausible_dates() {
        assert!(parse_date("31.02.2024").is_err());
        // month-first would put month 13 in the month slot
        assert!(parse_date("05.13.2024").is_err());
        assert!(parse_date("01.01.1901").is_err());
        assert!(parse_date("01.01.2190").is_err());
        assert!(parse_date("2024-03-05").is_err());
        assert!(parse_date("").is_err());
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
