//! CSV and JSON export of FF3 results.

use ff3_model::{AlignedRow, FactorModelEstimate, RegressionResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Infer the format from a file extension; `.json` maps to pretty JSON.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(Self::Csv),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::PrettyJson),
            _ => Err(ExportError::InvalidFormat(format!(
                "cannot infer export format from {}",
                path.display()
            ))),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn to_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::PrettyJson => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    })
}

/// One coefficient with its inference statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientRecord {
    /// Canonical factor name (`mkt_er`, `smb`, `hml`).
    pub factor: String,

    /// Fitted coefficient.
    pub estimate: f64,

    /// Standard error.
    pub std_error: f64,

    /// t-statistic.
    pub t_stat: f64,

    /// Two-sided p-value.
    pub p_value: f64,

    /// Lower confidence bound.
    pub conf_lower: f64,

    /// Upper confidence bound.
    pub conf_upper: f64,
}

/// Coefficient table of a fitted regression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoefficientTable(pub Vec<CoefficientRecord>);

impl From<&RegressionResult> for CoefficientTable {
    fn from(regression: &RegressionResult) -> Self {
        Self(
            regression
                .coefficients
                .iter()
                .map(|(factor, c)| CoefficientRecord {
                    factor: factor.name().to_string(),
                    estimate: c.estimate,
                    std_error: c.std_error,
                    t_stat: c.t_stat,
                    p_value: c.p_value,
                    conf_lower: c.conf_lower,
                    conf_upper: c.conf_upper,
                })
                .collect(),
        )
    }
}

impl Exporter for CoefficientTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(&self.0),
            _ => to_json(&self.0, format),
        }
    }
}

/// Aligned regression rows, as produced by the join of returns and factors.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDataset(pub Vec<AlignedRow>);

/// Aligned row with the period rendered as `YYYY-MM`.
#[derive(Debug, Serialize)]
struct AlignedRecord {
    period: String,
    asset_return: f64,
    smb: f64,
    hml: f64,
    rm: f64,
    rf: f64,
    mkt_er: f64,
    stock_excess_return: f64,
}

impl From<&AlignedRow> for AlignedRecord {
    fn from(row: &AlignedRow) -> Self {
        Self {
            period: row.period.to_string(),
            asset_return: row.asset_return,
            smb: row.smb,
            hml: row.hml,
            rm: row.rm,
            rf: row.rf,
            mkt_er: row.mkt_excess,
            stock_excess_return: row.stock_excess_return,
        }
    }
}

impl Exporter for AlignedDataset {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let records: Vec<AlignedRecord> = self.0.iter().map(AlignedRecord::from).collect();
        match format {
            ExportFormat::Csv => to_csv(&records),
            _ => to_json(&records, format),
        }
    }
}

/// Flattened estimate for CSV export.
#[derive(Debug, Serialize)]
struct MetricRecord {
    metric: &'static str,
    value: f64,
}

fn metric_records(estimate: &FactorModelEstimate) -> Vec<MetricRecord> {
    let regression = &estimate.regression;
    let annualized = &estimate.annualized;
    let metric = |metric: &'static str, value: f64| MetricRecord { metric, value };

    vec![
        metric("n_obs", estimate.window.n_obs as f64),
        metric("beta_mkt", regression.beta_mkt()),
        metric("beta_smb", regression.beta_smb()),
        metric("beta_hml", regression.beta_hml()),
        metric("r_squared", regression.r_squared),
        metric("adj_r_squared", regression.adj_r_squared),
        metric("f_statistic", regression.f_statistic),
        metric("f_p_value", regression.f_p_value),
        metric("residual_std_error", regression.residual_std_error),
        metric("annualized_market_excess", annualized.market_excess),
        metric("annualized_smb", annualized.smb),
        metric("annualized_hml", annualized.hml),
        metric("annualized_risk_free", annualized.risk_free),
        metric("expected_return", estimate.expected_return.total),
    ]
}

impl Exporter for FactorModelEstimate {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(metric_records(self)),
            _ => to_json(self, format),
        }
    }
}
