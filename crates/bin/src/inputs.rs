//! Inputs for a run: configuration, the factor table and monthly prices.
//!
//! Prices come from Yahoo Finance unless a `date,close` file is given with
//! `--prices`. Either way they are resampled to the last observation of each
//! month before reaching the model.

use chrono::{Months, NaiveDate, Utc};
use clap::Args;
use ff3::PipelineConfig;
use ff3::data::{
    DataError, PriceField, YahooQuoteProvider, load_price_csv, monthly_price_points, price_frame,
};
use ff3::model::PricePoint;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Length of the default price window.
const DEFAULT_WINDOW_MONTHS: u32 = 60;

/// Error type for loading run inputs.
#[derive(Debug, thiserror::Error)]
pub(crate) enum InputError {
    /// Price or factor source failure.
    #[error(transparent)]
    Data(#[from] DataError),
    /// Configuration file could not be read.
    #[error("Cannot read config {path}: {source}")]
    ConfigIo {
        /// Config file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// Configuration file is not valid JSON for the pipeline.
    #[error("Invalid config {path}: {source}")]
    ConfigParse {
        /// Config file
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
    /// Requested window is empty or out of range.
    #[error("Invalid window: {0}")]
    Window(String),
    /// Progress display template error.
    #[error("Progress template error: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

/// Data source flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct DataArgs {
    /// Ticker symbol (e.g. TCS.NS)
    #[arg(long)]
    pub(crate) symbol: String,

    /// Fama-French factor table (CSV)
    #[arg(long)]
    pub(crate) factors: PathBuf,

    /// First day of the price window (YYYY-MM-DD) [default: five years before --end]
    #[arg(long)]
    pub(crate) start: Option<NaiveDate>,

    /// Last day of the price window (YYYY-MM-DD) [default: today]
    #[arg(long)]
    pub(crate) end: Option<NaiveDate>,

    /// Read prices from a date,close CSV instead of Yahoo Finance
    #[arg(long)]
    pub(crate) prices: Option<PathBuf>,

    /// Use split and dividend adjusted closes
    #[arg(long)]
    pub(crate) adjusted: bool,

    /// Pipeline configuration (JSON)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Coverage of the coefficient confidence intervals, overrides --config
    #[arg(long)]
    pub(crate) confidence_level: Option<f64>,

    /// Compounding periods per year, overrides --config
    #[arg(long)]
    pub(crate) periods_per_year: Option<u32>,
}

impl DataArgs {
    /// Price window, filling in defaults relative to `today`.
    pub(crate) fn window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), InputError> {
        let end = self.end.unwrap_or(today);
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_months(Months::new(DEFAULT_WINDOW_MONTHS))
                .ok_or_else(|| InputError::Window(format!("no date five years before {end}")))?,
        };
        if start > end {
            return Err(InputError::Window(format!("start {start} is after end {end}")));
        }
        Ok((start, end))
    }

    const fn price_field(&self) -> PriceField {
        if self.adjusted {
            PriceField::AdjustedClose
        } else {
            PriceField::Close
        }
    }
}

/// Pipeline configuration from `--config` with flag overrides applied.
pub(crate) fn pipeline_config(args: &DataArgs) -> Result<PipelineConfig, InputError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(level) = args.confidence_level {
        config.confidence_level = level;
    }
    if let Some(periods) = args.periods_per_year {
        config.periods_per_year = periods;
    }
    Ok(config)
}

/// Load the pipeline configuration, or the defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig, InputError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| InputError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| InputError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded pipeline config");
    Ok(config)
}

/// Month-end prices for the requested symbol and window.
pub(crate) async fn load_prices(args: &DataArgs) -> Result<Vec<PricePoint>, InputError> {
    match &args.prices {
        Some(path) => prices_from_file(args, path),
        None => prices_from_yahoo(args).await,
    }
}

fn prices_from_file(args: &DataArgs, path: &Path) -> Result<Vec<PricePoint>, InputError> {
    if args.adjusted {
        warn!("--adjusted is ignored with --prices; the file's close column is used");
    }
    let mut points = load_price_csv(path)?;

    // A file is used whole unless the window is given explicitly
    if args.start.is_some() || args.end.is_some() {
        let (start, end) = args.window(Utc::now().date_naive())?;
        points.retain(|p| p.date >= start && p.date <= end);
    }
    Ok(monthly_price_points(&price_frame(&points)?, PriceField::Close)?)
}

async fn prices_from_yahoo(args: &DataArgs) -> Result<Vec<PricePoint>, InputError> {
    let (start, end) = args.window(Utc::now().date_naive())?;
    let provider = YahooQuoteProvider::new()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching {} prices from {start} to {end}...", args.symbol));

    match provider
        .fetch_monthly(&args.symbol, start, end, args.price_field())
        .await
    {
        Ok(prices) => {
            spinner.finish_with_message(format!(
                "Fetched {} month-end prices for {}",
                prices.len(),
                args.symbol
            ));
            Ok(prices)
        }
        Err(e) => {
            spinner.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args() -> DataArgs {
        DataArgs {
            symbol: "TCS.NS".to_string(),
            factors: PathBuf::from("factors.csv"),
            start: None,
            end: None,
            prices: None,
            adjusted: false,
            config: None,
            confidence_level: None,
            periods_per_year: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_window_is_five_years() {
        let (start, end) = args().window(date(2024, 3, 31)).unwrap();
        assert_eq!(end, date(2024, 3, 31));
        assert_eq!(start, date(2019, 3, 31));
    }

    #[test]
    fn test_explicit_window() {
        let mut args = args();
        args.start = Some(date(2020, 1, 1));
        args.end = Some(date(2021, 1, 1));
        assert_eq!(
            args.window(date(2024, 1, 1)).unwrap(),
            (date(2020, 1, 1), date(2021, 1, 1))
        );
    }

    #[test]
    fn test_reversed_window() {
        let mut args = args();
        args.start = Some(date(2022, 1, 1));
        args.end = Some(date(2021, 1, 1));
        assert!(matches!(args.window(date(2024, 1, 1)), Err(InputError::Window(_))));
    }

    #[test]
    fn test_load_config() {
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"confidence_level": 0.9}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.confidence_level, 0.9);
        assert_eq!(config.periods_per_year, 12);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"confidence_level": 0.9, "periods_per_year": 4}"#)
            .unwrap();

        let mut args = args();
        args.config = Some(file.path().to_path_buf());
        args.confidence_level = Some(0.99);
        let config = pipeline_config(&args).unwrap();
        assert_eq!(config.confidence_level, 0.99);
        assert_eq!(config.periods_per_year, 4);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(InputError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_prices_from_file_resampled_and_filtered() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"date,close\n2023-12-29,9.0\n2024-01-10,10.0\n2024-01-31,11.0\n2024-02-29,12.0\n",
        )
        .unwrap();

        let mut args = args();
        let whole = prices_from_file(&args, file.path()).unwrap();
        assert_eq!(whole.len(), 3);
        assert_eq!(whole[1].price, 11.0);

        args.start = Some(date(2024, 1, 1));
        args.end = Some(date(2024, 2, 29));
        let filtered = prices_from_file(&args, file.path()).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].date, date(2024, 1, 31));
    }
}
