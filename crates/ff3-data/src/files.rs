//! Offline price and factor files.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use ff3_model::PricePoint;
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: f64,
}

/// Read a `date,close` CSV file (ISO dates) into price points in file order.
///
/// Prices may be daily; resample with [`price_frame`] and
/// [`monthly_price_points`](crate::monthly_price_points) before estimation.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<Vec<PricePoint>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let points = reader
        .deserialize::<PriceRecord>()
        .map(|record| record.map(|r| PricePoint::new(r.date, r.close)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if points.is_empty() {
        return Err(DataError::Parse(format!("{} contains no prices", path.display())));
    }
    debug!(path = %path.display(), rows = points.len(), "loaded price file");
    Ok(points)
}

/// Build a `date`, `close` quote table from price points.
pub fn price_frame(points: &[PricePoint]) -> Result<DataFrame> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let closes: Vec<f64> = points.iter().map(|p| p.price).collect();
    Ok(DataFrame::new(vec![
        Column::new("date".into(), dates),
        Column::new("close".into(), closes),
    ])?)
}

/// Read a Fama-French factor table from CSV.
///
/// Columns are kept as they appear in the file; header mapping and percent
/// conversion happen in [`normalize_factor_table`](ff3_model::normalize_factor_table).
pub fn load_factor_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("factor file {} not found", path.display()),
        )));
    }

    let table = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "loaded factor table"
    );
    Ok(table)
}
