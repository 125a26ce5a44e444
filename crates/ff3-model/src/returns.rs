//! Return Series Builder
//!
//! Converts a month-end price series into simple monthly returns
//! `r_i = p_i / p_{i-1} - 1`, each tagged with the [`PeriodKey`] of the later
//! price. The first price yields no observation.

use crate::error::{ModelError, Result, Stage};
use crate::period::PeriodKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single month-end price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date; only year and month are used.
    pub date: NaiveDate,
    /// Last observed price of the month.
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Simple return of the asset over one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    /// Month the return was realized in.
    pub period: PeriodKey,
    /// Decimal simple return.
    pub asset_return: f64,
}

/// Build the monthly return series from ordered month-end prices.
///
/// # Errors
/// * [`ModelError::InsufficientData`] with fewer than two prices.
/// * [`ModelError::DataIntegrity`] if a price is non-finite or non-positive, or
///   if two prices fall in the same month or are out of order.
pub fn build_return_series(prices: &[PricePoint]) -> Result<Vec<ReturnObservation>> {
    if prices.len() < 2 {
        return Err(ModelError::InsufficientData {
            stage: Stage::ReturnSeries,
            required: 2,
            actual: prices.len(),
        });
    }

    let periods = prices
        .iter()
        .map(|point| {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(ModelError::integrity(
                    Stage::ReturnSeries,
                    format!("price {} on {} is not a positive number", point.price, point.date),
                ));
            }
            PeriodKey::from_date(&point.date).ok_or_else(|| {
                ModelError::integrity(
                    Stage::ReturnSeries,
                    format!("date {} is outside the supported range", point.date),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut series = Vec::with_capacity(prices.len() - 1);
    for (pair, keys) in prices.windows(2).zip(periods.windows(2)) {
        let (previous, current) = (keys[0], keys[1]);
        if current <= previous {
            return Err(ModelError::integrity(
                Stage::ReturnSeries,
                format!(
                    "period {current} follows {previous}; prices must be one per month in ascending order"
                ),
            ));
        }
        series.push(ReturnObservation {
            period: current,
            asset_return: pair[1].price / pair[0].price - 1.0,
        });
    }

    debug!(
        prices = prices.len(),
        returns = series.len(),
        "built monthly return series"
    );
    Ok(series)
}
