//! Price history from Yahoo Finance.
//!
//! Requests cover whole calendar days: `start` from midnight UTC, `end` up to
//! its last second. Only the date and the two close columns are kept, which is
//! all the month-end resampler reads.

use crate::error::{DataError, Result};
use crate::resample::{PriceField, monthly_price_points};
use chrono::{DateTime, NaiveDate, NaiveTime};
use ff3_model::PricePoint;
use polars::prelude::*;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

const SECONDS_PER_DAY: i64 = 86_400;

/// Yahoo Finance quote provider with a politeness delay between requests.
pub struct YahooQuoteProvider {
    connector: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider that waits one second after each request.
    ///
    /// # Errors
    /// [`DataError::YahooApi`] if the HTTP connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_secs(1))
    }

    /// Create a provider with a custom delay after each request.
    ///
    /// # Errors
    /// [`DataError::YahooApi`] if the HTTP connector cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            connector: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Daily closes for `symbol` between two dates, inclusive.
    ///
    /// Returns columns `date` (Date), `close` and `adjusted_close`.
    ///
    /// # Errors
    /// * [`DataError::InvalidDateRange`] if `start` is after `end`.
    /// * [`DataError::InvalidSymbol`] for a blank symbol.
    /// * [`DataError::MissingData`] if Yahoo returns no quotes.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DataFrame> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        let (from, to) = request_bounds(start, end)?;

        debug!(symbol, %start, %end, "requesting quote history");
        let response = self.connector.get_quote_history(symbol, from, to).await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;
        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let daily = daily_frame(
            quotes
                .iter()
                .map(|q| (q.timestamp, q.close, q.adjclose)),
        )?;
        debug!(symbol, rows = daily.height(), "fetched quote history");
        sleep(self.rate_limit_delay).await;

        Ok(daily)
    }

    /// Month-end prices for `symbol`, ready for the return series builder.
    ///
    /// # Errors
    /// As [`fetch_daily`](Self::fetch_daily), plus resampling failures.
    pub async fn fetch_monthly(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> Result<Vec<PricePoint>> {
        let daily = self.fetch_daily(symbol, start, end).await?;
        monthly_price_points(&daily, field)
    }
}

/// Request window covering every second of `start` through `end`.
fn request_bounds(start: NaiveDate, end: NaiveDate) -> Result<(OffsetDateTime, OffsetDateTime)> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp();
    let to_offset = |seconds: i64| {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|e| DataError::TimeConversion(e.to_string()))
    };
    Ok((
        to_offset(midnight(start))?,
        to_offset(midnight(end) + SECONDS_PER_DAY - 1)?,
    ))
}

/// Build the daily frame from `(unix seconds, close, adjusted close)` rows.
fn daily_frame(rows: impl Iterator<Item = (i64, f64, f64)>) -> Result<DataFrame> {
    let mut dates = Vec::new();
    let mut closes = Vec::new();
    let mut adjusted = Vec::new();
    for (timestamp, close, adjclose) in rows {
        let date = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| DataError::TimeConversion(format!("timestamp {timestamp}")))?
            .date_naive();
        dates.push(date);
        closes.push(close);
        adjusted.push(adjclose);
    }

    Ok(DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("close".into(), closes),
        Column::new("adjusted_close".into(), adjusted),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_request_bounds_cover_whole_days() {
        let (from, to) = request_bounds(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(from.unix_timestamp(), 1_706_745_600);
        assert_eq!(to.unix_timestamp(), 1_709_251_199);
    }

    #[test]
    fn test_request_bounds_single_day() {
        let (from, to) = request_bounds(date(2024, 2, 29), date(2024, 2, 29)).unwrap();
        assert_eq!(to.unix_timestamp() - from.unix_timestamp(), SECONDS_PER_DAY - 1);
    }

    #[test]
    fn test_reversed_range() {
        let result = request_bounds(date(2024, 3, 1), date(2024, 2, 1));
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_daily_frame_feeds_resampler() {
        // NSE sessions open at 03:45 UTC
        let rows = vec![
            (1_706_067_900, 3800.0, 3750.0), // 2024-01-24
            (1_706_672_700, 3820.0, 3770.0), // 2024-01-31
            (1_709_178_300, 4000.0, 3955.0), // 2024-02-29
        ];
        let daily = daily_frame(rows.into_iter()).unwrap();
        assert_eq!(daily.get_column_names(), vec!["date", "close", "adjusted_close"]);

        let monthly = monthly_price_points(&daily, PriceField::AdjustedClose).unwrap();
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].date, date(2024, 1, 31));
        assert_eq!(monthly[0].price, 3770.0);
        assert_eq!(monthly[1].date, date(2024, 2, 29));
        assert_eq!(monthly[1].price, 3955.0);
    }

    #[tokio::test]
    async fn test_blank_symbol() {
        let provider = YahooQuoteProvider::with_rate_limit(Duration::ZERO).unwrap();
        let result = provider
            .fetch_daily("  ", date(2024, 1, 1), date(2024, 2, 1))
            .await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access to Yahoo Finance"]
    async fn test_fetch_monthly() {
        let provider = YahooQuoteProvider::new().unwrap();
        let prices = provider
            .fetch_monthly("TCS.NS", date(2023, 1, 1), date(2023, 12, 31), PriceField::Close)
            .await
            .unwrap();
        assert_eq!(prices.len(), 12);
        assert!(prices.windows(2).all(|w| w[0].date < w[1].date));
    }
}
