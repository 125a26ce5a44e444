//! Month-end resampling of daily price histories.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ff3_model::PricePoint;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days from 0001-01-01 (CE day 1) to the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Which price column feeds the return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    /// Unadjusted close
    #[default]
    Close,
    /// Split and dividend adjusted close
    AdjustedClose,
}

impl PriceField {
    /// Column name in a quote table.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::AdjustedClose => "adjusted_close",
        }
    }
}

/// Keep the last observation of each calendar month.
///
/// The input needs a `date` column of type `Date` and the column named by
/// `field`. Rows with a null price are ignored. The output has columns `date`
/// and `price`, one row per month in ascending order.
pub fn monthly_closes(quotes: &DataFrame, field: PriceField) -> Result<DataFrame> {
    for name in ["date", field.column()] {
        if quotes.column(name).is_err() {
            return Err(DataError::Parse(format!("quote table has no '{name}' column")));
        }
    }
    let dtype = quotes.column("date")?.dtype().clone();
    if dtype != DataType::Date {
        return Err(DataError::Parse(format!(
            "'date' column must have type date, found {dtype}"
        )));
    }

    let monthly = quotes
        .clone()
        .lazy()
        .filter(col(field.column()).is_not_null())
        .sort(["date"], SortMultipleOptions::default())
        .group_by_stable([
            col("date").dt().year().alias("year"),
            col("date").dt().month().alias("month"),
        ])
        .agg([
            col("date").last(),
            col(field.column()).cast(DataType::Float64).last().alias("price"),
        ])
        .select([col("date"), col("price")])
        .collect()?;

    debug!(
        daily_rows = quotes.height(),
        monthly_rows = monthly.height(),
        field = field.column(),
        "resampled to month end"
    );
    Ok(monthly)
}

/// Convert a `date`, `price` table into price points.
pub fn to_price_points(monthly: &DataFrame) -> Result<Vec<PricePoint>> {
    let dates = monthly.column("date")?.cast(&DataType::Int32)?;
    let prices = monthly.column("price")?.cast(&DataType::Float64)?;

    dates
        .i32()?
        .into_iter()
        .zip(prices.f64()?)
        .enumerate()
        .map(|(row, pair)| match pair {
            (Some(days), Some(price)) => {
                let date = NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                    .ok_or_else(|| DataError::Parse(format!("date out of range at row {row}")))?;
                Ok(PricePoint::new(date, price))
            }
            _ => Err(DataError::Parse(format!("missing date or price at row {row}"))),
        })
        .collect()
}

/// [`monthly_closes`] followed by [`to_price_points`].
pub fn monthly_price_points(quotes: &DataFrame, field: PriceField) -> Result<Vec<PricePoint>> {
    to_price_points(&monthly_closes(quotes, field)?)
}
