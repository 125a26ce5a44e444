//! End-to-end tests for the three-factor pipeline.

use approx::assert_abs_diff_eq;
use chrono::{Datelike, NaiveDate};
use ff3_model::{ModelError, PipelineConfig, PricePoint, Stage, ThreeFactorModel, annualize};
use polars::prelude::*;

struct Synthetic {
    prices: Vec<PricePoint>,
    factors: DataFrame,
}

/// Monthly factor rows (percent units) starting January 2015.
struct FactorRows {
    months: Vec<i64>,
    smb: Vec<f64>,
    hml: Vec<f64>,
    rm: Vec<f64>,
    rf: Vec<f64>,
}

impl FactorRows {
    fn generate(n: usize) -> Self {
        let mut rows = Self {
            months: Vec::with_capacity(n),
            smb: Vec::with_capacity(n),
            hml: Vec::with_capacity(n),
            rm: Vec::with_capacity(n),
            rf: Vec::with_capacity(n),
        };
        for i in 0..n {
            let t = i as f64;
            rows.months.push(yyyymm(i));
            rows.smb.push(1.5 * (0.9 * t).sin());
            rows.hml.push(2.0 * (0.4 * t + 1.0).cos());
            rows.rm.push(0.8 + 4.0 * (1.7 * t + 0.3).sin());
            rows.rf.push(0.3 + 0.05 * (0.2 * t).cos());
        }
        rows
    }

    fn frame(&self) -> DataFrame {
        let mkt_er: Vec<f64> = self.rm.iter().zip(&self.rf).map(|(m, f)| m - f).collect();
        df! {
            "Month" => self.months.clone(),
            "SMB %" => self.smb.clone(),
            "HML %" => self.hml.clone(),
            "WML %" => vec![0.0; self.months.len()],
            "MF %" => self.rm.clone(),
            "RF %" => self.rf.clone(),
            "MF-RF %" => mkt_er,
        }
        .unwrap()
    }
}

fn yyyymm(offset: usize) -> i64 {
    let months = 2015 * 12 + offset as i64;
    (months / 12) * 100 + months % 12 + 1
}

fn month_end(offset: usize) -> NaiveDate {
    // offset 0 is December 2014, the base month preceding the factor table
    let months = 2014 * 12 + 11 + offset as i32;
    NaiveDate::from_ymd_opt(months / 12, (months % 12) as u32 + 1, 28).unwrap()
}

/// Prices whose monthly returns are `rf + 1.2*mkt_er + 0.3*smb - 0.4*hml`.
fn synthetic(n: usize) -> Synthetic {
    let rows = FactorRows::generate(n);
    let mut price = 100.0;
    let mut prices = vec![PricePoint::new(month_end(0), price)];
    for i in 0..n {
        let rf = rows.rf[i] / 100.0;
        let mkt_er = (rows.rm[i] - rows.rf[i]) / 100.0;
        let asset_return =
            rf + 1.2 * mkt_er + 0.3 * rows.smb[i] / 100.0 - 0.4 * rows.hml[i] / 100.0;
        price *= 1.0 + asset_return;
        prices.push(PricePoint::new(month_end(i + 1), price));
    }
    Synthetic {
        prices,
        factors: rows.frame(),
    }
}

#[test]
fn test_recovers_generating_betas() {
    let data = synthetic(60);
    let estimate = ThreeFactorModel::new()
        .estimate(&data.prices, &data.factors)
        .unwrap();

    assert_eq!(estimate.window.n_obs, 60);
    assert_eq!(estimate.window.start.to_string(), "2015-01");
    assert_eq!(estimate.window.end.to_string(), "2019-12");

    let regression = &estimate.regression;
    assert_abs_diff_eq!(regression.beta_mkt(), 1.2, epsilon = 1e-8);
    assert_abs_diff_eq!(regression.beta_smb(), 0.3, epsilon = 1e-8);
    assert_abs_diff_eq!(regression.beta_hml(), -0.4, epsilon = 1e-8);
    assert_abs_diff_eq!(regression.r_squared, 1.0, epsilon = 1e-10);
    assert_eq!(regression.df_resid, 57);
}

#[test]
fn test_expected_return_composition() {
    let data = synthetic(60);
    let estimate = ThreeFactorModel::new()
        .estimate(&data.prices, &data.factors)
        .unwrap();

    let annualized = estimate.annualized;
    let regression = &estimate.regression;
    let expected = annualized.risk_free
        + regression.beta_mkt() * annualized.market_excess
        + regression.beta_smb() * annualized.smb
        + regression.beta_hml() * annualized.hml;
    assert_abs_diff_eq!(estimate.expected_return(), expected, epsilon = 1e-12);

    let rows = FactorRows::generate(60);
    let rf: Vec<f64> = rows.rf.iter().map(|r| r / 100.0).collect();
    assert_abs_diff_eq!(
        annualized.risk_free,
        annualize("rf", &rf, 12).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_unmatched_months_are_dropped() {
    let data = synthetic(60);
    // Only the first 40 factor months are available
    let factors = data.factors.head(Some(40));
    let estimate = ThreeFactorModel::new().estimate(&data.prices, &factors).unwrap();
    assert_eq!(estimate.window.n_obs, 40);
    assert_abs_diff_eq!(estimate.regression.beta_mkt(), 1.2, epsilon = 1e-8);
}

#[test]
fn test_constant_growth_with_zero_factors_is_singular() {
    let prices: Vec<PricePoint> = (0..=60)
        .map(|i| PricePoint::new(month_end(i), 100.0 * 1.01_f64.powi(i as i32)))
        .collect();
    let months: Vec<i64> = (0..60).map(yyyymm).collect();
    let zeros = vec![0.0; 60];
    let factors = df! {
        "Month" => months,
        "SMB %" => zeros.clone(),
        "HML %" => zeros.clone(),
        "WML %" => zeros.clone(),
        "MF %" => zeros.clone(),
        "RF %" => zeros.clone(),
        "MF-RF %" => zeros,
    }
    .unwrap();

    let err = ThreeFactorModel::new().estimate(&prices, &factors).unwrap_err();
    assert!(matches!(err, ModelError::SingularDesignMatrix { rank: 0, columns: 3, .. }));
    assert_eq!(err.stage(), Stage::Regression);
}

#[test]
fn test_three_observations_is_insufficient() {
    let data = synthetic(3);
    let err = ThreeFactorModel::new()
        .estimate(&data.prices, &data.factors)
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::InsufficientData {
            stage: Stage::Regression,
            required: 4,
            actual: 3,
        }
    ));
}

#[test]
fn test_disjoint_months_fail_alignment() {
    let data = synthetic(12);
    let later: Vec<PricePoint> = data
        .prices
        .iter()
        .map(|p| PricePoint::new(p.date.with_year(p.date.year() + 20).unwrap(), p.price))
        .collect();
    let err = ThreeFactorModel::new()
        .estimate(&later, &data.factors)
        .unwrap_err();
    assert!(matches!(err, ModelError::InsufficientOverlap { .. }));
    assert_eq!(err.stage(), Stage::Alignment);
}

#[test]
fn test_missing_factor_column() {
    let data = synthetic(12);
    let factors = data.factors.drop("HML %").unwrap();
    let err = ThreeFactorModel::new()
        .estimate(&data.prices, &factors)
        .unwrap_err();
    assert!(matches!(err, ModelError::Schema(_)));
    assert_eq!(err.stage(), Stage::FactorTable);
}

#[test]
fn test_invalid_config_rejected() {
    let config = PipelineConfig {
        periods_per_year: 0,
        ..Default::default()
    };
    assert!(matches!(
        ThreeFactorModel::with_config(config),
        Err(ModelError::InvalidConfig(_))
    ));
}

#[test]
fn test_estimate_is_deterministic() {
    let data = synthetic(36);
    let model = ThreeFactorModel::new();
    let first = model.estimate(&data.prices, &data.factors).unwrap();
    let second = model.estimate(&data.prices, &data.factors).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_estimate_serializes() {
    let data = synthetic(24);
    let estimate = ThreeFactorModel::new()
        .estimate(&data.prices, &data.factors)
        .unwrap();
    let json = serde_json::to_value(&estimate).unwrap();
    assert_eq!(json["window"]["n_obs"], 24);
    assert!(json["regression"]["coefficients"]["market"]["estimate"].is_number());
    assert!(json["expected_return"]["total"].is_number());
}
