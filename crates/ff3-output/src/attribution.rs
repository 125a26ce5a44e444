//! Expected return attribution.
//!
//! Breaks the annualized expected return into the risk-free base and each
//! factor's `beta x annualized premium` contribution.

use ff3_model::{FactorModelEstimate, SampleWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contribution of one factor to the expected return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorContribution {
    /// Factor label (e.g. `Mkt-RF`).
    pub factor_name: String,

    /// Fitted loading on the factor.
    pub beta: f64,

    /// Annualized factor premium over the window.
    pub annualized_premium: f64,

    /// `beta * annualized_premium`.
    pub contribution: f64,

    /// Share of the total expected return, in percent.
    pub contribution_pct: f64,
}

impl FactorContribution {
    /// Create a new factor contribution.
    pub fn new(factor_name: String, beta: f64, annualized_premium: f64, total: f64) -> Self {
        let contribution = beta * annualized_premium;
        Self {
            factor_name,
            beta,
            annualized_premium,
            contribution,
            contribution_pct: share_pct(contribution, total),
        }
    }
}

fn share_pct(part: f64, total: f64) -> f64 {
    if total.abs() > 1e-10 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Expected return of one asset split into its additive terms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpectedReturnAttribution {
    /// Ticker of the asset.
    pub symbol: String,

    /// Regression window.
    pub window: SampleWindow,

    /// Annualized risk-free rate.
    pub risk_free: f64,

    /// Per-factor contributions in design matrix order.
    pub factors: Vec<FactorContribution>,

    /// Annualized expected return.
    pub total: f64,
}

impl ExpectedReturnAttribution {
    /// Attribute the expected return of an estimate.
    pub fn from_estimate(symbol: impl Into<String>, estimate: &FactorModelEstimate) -> Self {
        let total = estimate.expected_return.total;
        let premia = estimate.annualized.premia();
        let factors = estimate
            .regression
            .betas()
            .iter()
            .map(|(factor, beta)| {
                let premium = premia.get(factor).copied().unwrap_or(f64::NAN);
                FactorContribution::new(factor.label().to_string(), *beta, premium, total)
            })
            .collect();

        Self {
            symbol: symbol.into(),
            window: estimate.window,
            risk_free: estimate.expected_return.risk_free,
            factors,
            total,
        }
    }

    /// Sum of the factor contributions.
    pub fn factor_return(&self) -> f64 {
        self.factors.iter().map(|f| f.contribution).sum()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nExpected Return Attribution: {}\n", self.symbol));
        output.push_str(&format!(
            "Period: {} to {}\n",
            self.window.start, self.window.end
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>12} {:>12}\n",
            "Factor", "Beta", "Premium", "Contribution", "% of Total"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>11.2}% {:>11.2}%\n",
            "Risk-free",
            "",
            "",
            self.risk_free * 100.0,
            share_pct(self.risk_free, self.total)
        ));
        for factor in &self.factors {
            output.push_str(&format!(
                "{:<20} {:>12.4} {:>11.2}% {:>11.2}% {:>11.2}%\n",
                factor.factor_name,
                factor.beta,
                factor.annualized_premium * 100.0,
                factor.contribution * 100.0,
                factor.contribution_pct
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>11.2}%\n",
            "Expected Return",
            "",
            "",
            self.total * 100.0
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Expected Return Attribution: {}\n\n", self.symbol));
        output.push_str(&format!(
            "**Period:** {} to {}\n\n",
            self.window.start, self.window.end
        ));

        output.push_str("| Factor | Beta | Premium | Contribution | % of Total |\n");
        output.push_str("|--------|------|---------|--------------|------------|\n");
        output.push_str(&format!(
            "| Risk-free | | | {:.2}% | {:.2}% |\n",
            self.risk_free * 100.0,
            share_pct(self.risk_free, self.total)
        ));
        for factor in &self.factors {
            output.push_str(&format!(
                "| {} | {:.4} | {:.2}% | {:.2}% | {:.2}% |\n",
                factor.factor_name,
                factor.beta,
                factor.annualized_premium * 100.0,
                factor.contribution * 100.0,
                factor.contribution_pct
            ));
        }

        output.push_str(&format!(
            "\n**Expected Return:** {:.2}%\n",
            self.total * 100.0
        ));
        output
    }
}

impl fmt::Display for ExpectedReturnAttribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected return {:.2}% (risk-free {:.2}%, factors {:.2}%)",
            self.symbol,
            self.total * 100.0,
            self.risk_free * 100.0,
            self.factor_return() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::fixtures;

    #[test]
    fn test_contributions_sum_to_total() {
        let estimate = fixtures::estimate();
        let attribution = ExpectedReturnAttribution::from_estimate("TCS.NS", &estimate);

        assert_eq!(attribution.factors.len(), 3);
        assert!((attribution.risk_free + attribution.factor_return() - attribution.total).abs() < 1e-12);

        let market = &attribution.factors[0];
        assert_eq!(market.factor_name, "Mkt-RF");
        assert!((market.contribution - 1.1117 * 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_contribution_pct() {
        let contribution = FactorContribution::new("SMB".to_string(), 0.5, 0.04, 0.1);
        assert!((contribution.contribution - 0.02).abs() < 1e-12);
        assert!((contribution.contribution_pct - 20.0).abs() < 1e-9);

        let zero_total = FactorContribution::new("SMB".to_string(), 0.5, 0.04, 0.0);
        assert_eq!(zero_total.contribution_pct, 0.0);
    }

    #[test]
    fn test_tables() {
        let attribution = ExpectedReturnAttribution::from_estimate("TCS.NS", &fixtures::estimate());

        let ascii = attribution.to_ascii_table();
        assert!(ascii.contains("Expected Return Attribution: TCS.NS"));
        assert!(ascii.contains("Risk-free"));
        assert!(ascii.contains("HML"));

        let markdown = attribution.to_markdown();
        assert!(markdown.contains("| Factor | Beta |"));
        assert!(markdown.contains("**Expected Return:**"));
    }
}
