//! Factor Registry
//!
//! Names and descriptions of the fields carried by a Fama-French factor table,
//! and a container that binds one value to each regression factor by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields of a normalized factor observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Market return minus the risk-free rate
    MarketExcess,
    /// Small-minus-big size premium
    Smb,
    /// High-minus-low value premium
    Hml,
    /// Winners-minus-losers momentum premium
    Wml,
    /// Market return
    MarketReturn,
    /// Risk-free rate
    RiskFree,
}

/// Regressors of the three-factor model, in design matrix column order.
pub const REGRESSORS: [Factor; 3] = [Factor::MarketExcess, Factor::Smb, Factor::Hml];

impl Factor {
    /// Canonical field name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MarketExcess => "mkt_er",
            Self::Smb => "smb",
            Self::Hml => "hml",
            Self::Wml => "wml",
            Self::MarketReturn => "rm",
            Self::RiskFree => "rf",
        }
    }

    /// Short label used in reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MarketExcess => "Mkt-RF",
            Self::Smb => "SMB",
            Self::Hml => "HML",
            Self::Wml => "WML",
            Self::MarketReturn => "Mkt",
            Self::RiskFree => "RF",
        }
    }

    /// What the factor measures.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::MarketExcess => "Market return in excess of the risk-free rate",
            Self::Smb => "Small-cap minus large-cap portfolio return",
            Self::Hml => "High minus low book-to-market portfolio return",
            Self::Wml => "Past winners minus past losers portfolio return",
            Self::MarketReturn => "Broad market portfolio return",
            Self::RiskFree => "Risk-free rate for the period",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per regression factor, addressed by name.
///
/// Used for coefficients and their diagnostics so that reordering the design
/// matrix columns can never swap which beta belongs to which factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorLoadings<T> {
    /// Market excess return
    pub market: T,
    /// SMB
    pub smb: T,
    /// HML
    pub hml: T,
}

impl<T> FactorLoadings<T> {
    /// Create loadings from the three named values.
    pub const fn new(market: T, smb: T, hml: T) -> Self {
        Self { market, smb, hml }
    }

    /// Build loadings by evaluating `f` for each regressor.
    pub fn from_fn(mut f: impl FnMut(Factor) -> T) -> Self {
        Self {
            market: f(Factor::MarketExcess),
            smb: f(Factor::Smb),
            hml: f(Factor::Hml),
        }
    }

    /// Value bound to `factor`, or `None` for a factor that is not a regressor.
    pub const fn get(&self, factor: Factor) -> Option<&T> {
        match factor {
            Factor::MarketExcess => Some(&self.market),
            Factor::Smb => Some(&self.smb),
            Factor::Hml => Some(&self.hml),
            Factor::Wml | Factor::MarketReturn | Factor::RiskFree => None,
        }
    }

    /// Apply `f` to every value.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> FactorLoadings<U> {
        FactorLoadings {
            market: f(&self.market),
            smb: f(&self.smb),
            hml: f(&self.hml),
        }
    }

    /// Pairs of regressor and value in design matrix order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, &T)> {
        [
            (Factor::MarketExcess, &self.market),
            (Factor::Smb, &self.smb),
            (Factor::Hml, &self.hml),
        ]
        .into_iter()
    }
}
