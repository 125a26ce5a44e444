//! Pipeline configuration.

use crate::error::{ModelError, Result};
use crate::factors::FactorColumns;
use crate::regression::OlsConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`ThreeFactorModel`](crate::ThreeFactorModel) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Compounding periods per year used by the annualizer (default: 12)
    pub periods_per_year: u32,
    /// Coverage of the coefficient confidence intervals (default: 0.95)
    pub confidence_level: f64,
    /// Raw factor table headers
    pub columns: FactorColumns,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 12,
            confidence_level: 0.95,
            columns: FactorColumns::default(),
        }
    }
}

impl PipelineConfig {
    /// Check value ranges.
    ///
    /// # Errors
    /// [`ModelError::InvalidConfig`] for a zero `periods_per_year`, a
    /// confidence level outside `(0, 1)`, or an empty column name.
    pub fn validate(&self) -> Result<()> {
        if self.periods_per_year == 0 {
            return Err(ModelError::InvalidConfig(
                "periods_per_year must be positive".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "confidence_level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.columns.period.is_empty()
            || self
                .columns
                .percent_columns()
                .iter()
                .any(|(_, name)| name.is_empty())
        {
            return Err(ModelError::InvalidConfig(
                "factor column names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Estimator settings derived from this configuration.
    pub const fn ols(&self) -> OlsConfig {
        OlsConfig {
            confidence_level: self.confidence_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.columns.smb, "SMB %");
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(0, 0.95)]
    #[case(12, 0.0)]
    #[case(12, 1.0)]
    #[case(12, f64::NAN)]
    fn test_invalid_values(#[case] periods_per_year: u32, #[case] confidence_level: f64) {
        let config = PipelineConfig {
            periods_per_year,
            confidence_level,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_column_name() {
        let mut config = PipelineConfig::default();
        config.columns.rf = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"periods_per_year": 4, "columns": {"rf": "RF"}}"#).unwrap();
        assert_eq!(config.periods_per_year, 4);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.columns.rf, "RF");
        assert_eq!(config.columns.hml, "HML %");
    }
}
