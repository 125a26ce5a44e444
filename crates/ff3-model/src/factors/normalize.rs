//! Factor Table Normalizer
//!
//! Reads the six percent-denominated factor columns of a raw factor table,
//! divides each by 100 and binds it to its canonical field. Every column is
//! named explicitly; nothing is applied blindly across the table.
//!
//! The transform is not idempotent: feeding decimal data through it again
//! divides by 100 a second time.

use super::registry::Factor;
use crate::error::{ModelError, Result};
use crate::period::PeriodKey;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Divisor converting percent units to decimal units.
const PERCENT: f64 = 100.0;

/// Tolerance for the `mkt_er == rm - rf` consistency check (one basis point).
const MARKET_EXCESS_TOLERANCE: f64 = 1e-4;

/// Header names of the raw factor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorColumns {
    /// Period identifier column (YYYYMM integer or YYYY-MM text)
    pub period: String,
    /// SMB in percent
    pub smb: String,
    /// HML in percent
    pub hml: String,
    /// WML in percent
    pub wml: String,
    /// Market return in percent
    pub rm: String,
    /// Risk-free rate in percent
    pub rf: String,
    /// Market minus risk-free in percent
    pub mkt_er: String,
}

impl Default for FactorColumns {
    fn default() -> Self {
        Self {
            period: "Month".to_string(),
            smb: "SMB %".to_string(),
            hml: "HML %".to_string(),
            wml: "WML %".to_string(),
            rm: "MF %".to_string(),
            rf: "RF %".to_string(),
            mkt_er: "MF-RF %".to_string(),
        }
    }
}

impl FactorColumns {
    /// Raw header for each percent-valued factor.
    pub fn percent_columns(&self) -> [(Factor, &str); 6] {
        [
            (Factor::Smb, self.smb.as_str()),
            (Factor::Hml, self.hml.as_str()),
            (Factor::Wml, self.wml.as_str()),
            (Factor::MarketReturn, self.rm.as_str()),
            (Factor::RiskFree, self.rf.as_str()),
            (Factor::MarketExcess, self.mkt_er.as_str()),
        ]
    }
}

/// One month of factor returns in decimal units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorObservation {
    /// Month of the observation
    pub period: PeriodKey,
    /// Small-minus-big
    pub smb: f64,
    /// High-minus-low
    pub hml: f64,
    /// Winners-minus-losers
    pub wml: f64,
    /// Market return
    pub rm: f64,
    /// Risk-free rate
    pub rf: f64,
    /// Market return minus risk-free rate
    #[serde(rename = "mkt_er")]
    pub mkt_excess: f64,
}

/// Normalize a raw percent factor table into decimal observations.
///
/// # Errors
/// [`ModelError::Schema`] if any expected column is absent, has a non-numeric
/// type, holds a missing or non-finite value, or if a period cannot be parsed.
pub fn normalize_factor_table(
    table: &DataFrame,
    columns: &FactorColumns,
) -> Result<Vec<FactorObservation>> {
    for (_, name) in columns.percent_columns() {
        let column = lookup(table, name)?;
        if !is_numeric(column.dtype()) {
            return Err(ModelError::Schema(format!(
                "column '{name}' has non-numeric type {}",
                column.dtype()
            )));
        }
    }

    let periods = read_periods(table, &columns.period)?;

    let decimal = table
        .clone()
        .lazy()
        .select([
            percent_to_decimal(&columns.smb, Factor::Smb),
            percent_to_decimal(&columns.hml, Factor::Hml),
            percent_to_decimal(&columns.wml, Factor::Wml),
            percent_to_decimal(&columns.rm, Factor::MarketReturn),
            percent_to_decimal(&columns.rf, Factor::RiskFree),
            percent_to_decimal(&columns.mkt_er, Factor::MarketExcess),
        ])
        .collect()?;

    let smb = decimal_values(&decimal, Factor::Smb, &columns.smb)?;
    let hml = decimal_values(&decimal, Factor::Hml, &columns.hml)?;
    let wml = decimal_values(&decimal, Factor::Wml, &columns.wml)?;
    let rm = decimal_values(&decimal, Factor::MarketReturn, &columns.rm)?;
    let rf = decimal_values(&decimal, Factor::RiskFree, &columns.rf)?;
    let mkt_er = decimal_values(&decimal, Factor::MarketExcess, &columns.mkt_er)?;

    let observations: Vec<FactorObservation> = periods
        .into_iter()
        .enumerate()
        .map(|(row, period)| FactorObservation {
            period,
            smb: smb[row],
            hml: hml[row],
            wml: wml[row],
            rm: rm[row],
            rf: rf[row],
            mkt_excess: mkt_er[row],
        })
        .collect();

    let inconsistent = observations
        .iter()
        .filter(|obs| (obs.rm - obs.rf - obs.mkt_excess).abs() > MARKET_EXCESS_TOLERANCE)
        .count();
    if inconsistent > 0 {
        warn!(
            rows = inconsistent,
            "market excess column disagrees with market minus risk-free"
        );
    }

    debug!(rows = observations.len(), "normalized factor table");
    Ok(observations)
}

fn percent_to_decimal(raw: &str, factor: Factor) -> Expr {
    (col(raw).cast(DataType::Float64) / lit(PERCENT)).alias(factor.name())
}

fn lookup<'a>(table: &'a DataFrame, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .map_err(|_| ModelError::Schema(format!("missing column '{name}'")))
}

const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

fn decimal_values(decimal: &DataFrame, factor: Factor, raw: &str) -> Result<Vec<f64>> {
    decimal
        .column(factor.name())?
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ModelError::Schema(format!(
                "column '{raw}' has a missing or non-numeric value at row {row}"
            ))),
        })
        .collect()
}

fn read_periods(table: &DataFrame, name: &str) -> Result<Vec<PeriodKey>> {
    let column = lookup(table, name)?;
    let invalid = |row: usize, value: String| {
        ModelError::Schema(format!(
            "column '{name}' has invalid period '{value}' at row {row}"
        ))
    };

    match column.dtype() {
        dtype if dtype.is_integer() => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                raw.and_then(PeriodKey::from_yyyymm).ok_or_else(|| {
                    invalid(row, raw.map_or_else(|| "null".to_string(), |v| v.to_string()))
                })
            })
            .collect(),
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                raw.and_then(|text| text.parse().ok())
                    .ok_or_else(|| invalid(row, raw.unwrap_or("null").to_string()))
            })
            .collect(),
        other => Err(ModelError::Schema(format!(
            "period column '{name}' has unsupported type {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn raw_table() -> DataFrame {
        df! {
            "Month" => [202001i64, 202002, 202003],
            "SMB %" => [1.5, -2.0, 0.25],
            "HML %" => [-0.5, 3.0, 1.0],
            "WML %" => [0.1, 0.2, 0.3],
            "MF %" => [2.5, -4.0, 1.5],
            "RF %" => [0.5, 0.5, 0.5],
            "MF-RF %" => [2.0, -4.5, 1.0],
        }
        .unwrap()
    }

    #[test]
    fn test_values_divided_by_hundred() {
        let table = raw_table();
        let observations = normalize_factor_table(&table, &FactorColumns::default()).unwrap();

        assert_eq!(observations.len(), 3);
        let first = &observations[0];
        assert_eq!(first.period, PeriodKey::new(2020, 1).unwrap());
        assert_abs_diff_eq!(first.smb, 0.015, epsilon = 1e-15);
        assert_abs_diff_eq!(first.hml, -0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(first.wml, 0.001, epsilon = 1e-15);
        assert_abs_diff_eq!(first.rm, 0.025, epsilon = 1e-15);
        assert_abs_diff_eq!(first.rf, 0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(first.mkt_excess, 0.02, epsilon = 1e-15);
    }

    #[test]
    fn test_every_value_matches_raw_over_hundred() {
        let table = raw_table();
        let columns = FactorColumns::default();
        let observations = normalize_factor_table(&table, &columns).unwrap();

        let raw_smb: Vec<f64> = table
            .column("SMB %")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        for (obs, raw) in observations.iter().zip(raw_smb) {
            assert_eq!(obs.smb, raw / 100.0);
        }
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = raw_table().drop("HML %").unwrap();
        let err = normalize_factor_table(&table, &FactorColumns::default()).unwrap_err();
        assert!(matches!(err, ModelError::Schema(ref msg) if msg.contains("HML %")));
    }

    #[test]
    fn test_non_numeric_column_is_schema_error() {
        let mut table = raw_table();
        table
            .replace("WML %", Series::new("WML %".into(), ["a", "b", "c"]))
            .unwrap();
        let err = normalize_factor_table(&table, &FactorColumns::default()).unwrap_err();
        assert!(matches!(err, ModelError::Schema(ref msg) if msg.contains("non-numeric")));
    }

    #[rstest]
    #[case::null([Some(1.0), None, Some(2.0)])]
    #[case::nan([Some(1.0), Some(f64::NAN), Some(2.0)])]
    #[case::infinite([Some(1.0), Some(f64::INFINITY), Some(2.0)])]
    fn test_missing_or_non_finite_cell_is_schema_error(#[case] rf: [Option<f64>; 3]) {
        let mut table = raw_table();
        table
            .replace("RF %", Series::new("RF %".into(), rf.to_vec()))
            .unwrap();
        let err = normalize_factor_table(&table, &FactorColumns::default()).unwrap_err();
        assert!(
            matches!(err, ModelError::Schema(ref msg) if msg.contains("'RF %'") && msg.contains("row 1"))
        );
    }

    #[test]
    fn test_text_periods_parsed() {
        let mut table = raw_table();
        table
            .replace(
                "Month",
                Series::new("Month".into(), ["2020-01", "2020-02", "2020-03"]),
            )
            .unwrap();
        let observations = normalize_factor_table(&table, &FactorColumns::default()).unwrap();
        assert_eq!(observations[2].period, PeriodKey::new(2020, 3).unwrap());
    }

    #[test]
    fn test_invalid_period_rejected() {
        let mut table = raw_table();
        table
            .replace("Month", Series::new("Month".into(), [202001i64, 202013, 202003]))
            .unwrap();
        let err = normalize_factor_table(&table, &FactorColumns::default()).unwrap_err();
        assert!(matches!(err, ModelError::Schema(ref msg) if msg.contains("row 1")));
    }

    #[test]
    fn test_custom_column_names() {
        let table = df! {
            "date" => ["2021/06"],
            "size" => [1.0],
            "value" => [2.0],
            "mom" => [3.0],
            "mkt" => [4.0],
            "rf" => [0.5],
            "mkt_rf" => [3.5],
        }
        .unwrap();
        let columns = FactorColumns {
            period: "date".to_string(),
            smb: "size".to_string(),
            hml: "value".to_string(),
            wml: "mom".to_string(),
            rm: "mkt".to_string(),
            rf: "rf".to_string(),
            mkt_er: "mkt_rf".to_string(),
        };
        let observations = normalize_factor_table(&table, &columns).unwrap();
        assert_abs_diff_eq!(observations[0].mkt_excess, 0.035, epsilon = 1e-15);
    }
}
