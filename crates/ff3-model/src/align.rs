//! Aligner
//!
//! Inner join of the monthly return series and the normalized factor table on
//! [`PeriodKey`]. Output rows follow the order of the return series; periods
//! missing from either side are dropped.

use crate::error::{ModelError, Result, Stage};
use crate::excess::stock_excess_return;
use crate::factors::FactorObservation;
use crate::period::PeriodKey;
use crate::returns::ReturnObservation;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One month present in both the return series and the factor table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// Month of the observation
    pub period: PeriodKey,
    /// Asset simple return
    pub asset_return: f64,
    /// Small-minus-big
    pub smb: f64,
    /// High-minus-low
    pub hml: f64,
    /// Market return
    pub rm: f64,
    /// Risk-free rate
    pub rf: f64,
    /// Market return minus risk-free rate
    #[serde(rename = "mkt_er")]
    pub mkt_excess: f64,
    /// Asset return minus risk-free rate
    pub stock_excess_return: f64,
}

impl AlignedRow {
    /// Join one return observation with the factor observation of the same month.
    pub fn new(ret: &ReturnObservation, factors: &FactorObservation) -> Self {
        Self {
            period: ret.period,
            asset_return: ret.asset_return,
            smb: factors.smb,
            hml: factors.hml,
            rm: factors.rm,
            rf: factors.rf,
            mkt_excess: factors.mkt_excess,
            stock_excess_return: stock_excess_return(ret.asset_return, factors.rf),
        }
    }
}

/// Inner-join returns and factors on period.
///
/// # Errors
/// * [`ModelError::DataIntegrity`] if either input repeats a period.
/// * [`ModelError::InsufficientOverlap`] if no period appears in both.
pub fn align(
    returns: &[ReturnObservation],
    factors: &[FactorObservation],
) -> Result<Vec<AlignedRow>> {
    let mut seen = HashSet::with_capacity(returns.len());
    if let Some(dup) = returns.iter().find(|obs| !seen.insert(obs.period)) {
        return Err(ModelError::integrity(
            Stage::Alignment,
            format!("duplicate period {} in return series", dup.period),
        ));
    }

    let mut by_period: HashMap<PeriodKey, &FactorObservation> =
        HashMap::with_capacity(factors.len());
    for obs in factors {
        if by_period.insert(obs.period, obs).is_some() {
            return Err(ModelError::integrity(
                Stage::Alignment,
                format!("duplicate period {} in factor table", obs.period),
            ));
        }
    }

    let rows: Vec<AlignedRow> = returns
        .iter()
        .filter_map(|ret| by_period.get(&ret.period).map(|f| AlignedRow::new(ret, f)))
        .collect();

    if rows.is_empty() {
        return Err(ModelError::InsufficientOverlap {
            return_periods: returns.len(),
            factor_periods: factors.len(),
        });
    }

    let dropped = returns.len() - rows.len();
    if dropped > 0 {
        warn!(dropped, "return months without a factor row were dropped");
    }
    debug!(
        returns = returns.len(),
        factors = factors.len(),
        aligned = rows.len(),
        "aligned return series with factor table"
    );
    Ok(rows)
}
