//! JSON reports for FF3 estimates.

use chrono::{DateTime, Utc};
use ff3_model::FactorModelEstimate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required builder field not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A timestamped report for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Symbol being analyzed.
    pub symbol: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Months in the regression window.
    pub observations: usize,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(symbol: String, observations: usize, contents: serde_json::Value) -> Self {
        Self {
            symbol,
            timestamp: Utc::now(),
            observations,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_to(&self, path: &std::path::Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    observations: Option<usize>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the number of observations.
    pub const fn observations(mut self, observations: usize) -> Self {
        self.observations = Some(observations);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Use a full estimate as the report contents.
    pub fn estimate(self, estimate: &FactorModelEstimate) -> Result<Self, ReportError> {
        let contents = serde_json::to_value(estimate)?;
        Ok(self.observations(estimate.window.n_obs).contents(contents))
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let symbol = self.symbol.ok_or(ReportError::MissingField("symbol"))?;
        Ok(Report::new(
            symbol,
            self.observations.unwrap_or(0),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}
