//! Offline estimation from price and factor files.

use approx::assert_abs_diff_eq;
use ff3_data::{PriceField, load_factor_csv, load_price_csv, monthly_price_points, price_frame};
use ff3_model::ThreeFactorModel;
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;

const MONTHS: usize = 30;

fn factor_row(i: usize) -> (f64, f64, f64, f64) {
    let t = i as f64;
    let smb = (1.3 * t).sin();
    let hml = 1.5 * (0.7 * t + 0.4).cos();
    let rm = 0.5 + 3.0 * (2.1 * t).sin();
    let rf = 0.25;
    (smb, hml, rm, rf)
}

fn write_files() -> (NamedTempFile, NamedTempFile) {
    let mut factors = String::from("Month,SMB %,HML %,WML %,MF %,RF %,MF-RF %\n");
    // Daily rows: a mid-month quote that must be ignored plus the month-end close
    let mut prices = String::from("date,close\n2019-12-31,50.0\n");
    let mut price = 50.0;

    for i in 0..MONTHS {
        let (smb, hml, rm, rf) = factor_row(i);
        let year = 2020 + i / 12;
        let month = i % 12 + 1;
        writeln!(factors, "{year}{month:02},{smb},{hml},0.0,{rm},{rf},{}", rm - rf).unwrap();

        let asset_return =
            rf / 100.0 + 0.9 * (rm - rf) / 100.0 - 0.2 * smb / 100.0 + 0.5 * hml / 100.0;
        writeln!(prices, "{year}-{month:02}-10,{}", price * 3.0).unwrap();
        price *= 1.0 + asset_return;
        writeln!(prices, "{year}-{month:02}-25,{price}").unwrap();
    }

    let mut factor_file = NamedTempFile::new().unwrap();
    factor_file.write_all(factors.as_bytes()).unwrap();
    let mut price_file = NamedTempFile::new().unwrap();
    price_file.write_all(prices.as_bytes()).unwrap();
    (price_file, factor_file)
}

#[test]
fn test_estimate_from_files() {
    let (price_file, factor_file) = write_files();

    let daily = load_price_csv(price_file.path()).unwrap();
    assert_eq!(daily.len(), 2 * MONTHS + 1);

    let monthly = monthly_price_points(&price_frame(&daily).unwrap(), PriceField::Close).unwrap();
    assert_eq!(monthly.len(), MONTHS + 1);

    let factors = load_factor_csv(factor_file.path()).unwrap();
    let estimate = ThreeFactorModel::new().estimate(&monthly, &factors).unwrap();

    assert_eq!(estimate.window.n_obs, MONTHS);
    assert_abs_diff_eq!(estimate.regression.beta_mkt(), 0.9, epsilon = 1e-6);
    assert_abs_diff_eq!(estimate.regression.beta_smb(), -0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(estimate.regression.beta_hml(), 0.5, epsilon = 1e-6);
}
