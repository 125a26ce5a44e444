//! FF3 CLI binary.
//!
//! Estimates Fama-French three-factor loadings and the implied annual
//! expected return for a single stock.

mod inputs;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use ff3::data::load_factor_csv;
use ff3::model::AlignedRow;
use ff3::output::{
    AlignedDataset, ExpectedReturnAttribution, ExportFormat, Exporter, RegressionSummary,
    ReportBuilder,
};
use ff3::{FactorModelEstimate, ModelError, ThreeFactorModel};
use inputs::{DataArgs, load_prices, pipeline_config};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "ff3")]
#[command(about = "FF3: Fama-French three-factor expected returns", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline stages at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the three-factor regression and report the expected return
    Estimate {
        #[command(flatten)]
        data: DataArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the estimate to a .csv or .json file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print or export the aligned return and factor rows
    Dataset {
        #[command(flatten)]
        data: DataArgs,

        /// Write the rows to a .csv or .json file instead of printing
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Terminal tables
    Text,
    /// Markdown tables
    Markdown,
    /// JSON report
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Estimate {
            data,
            format,
            export,
        } => {
            let text = format == OutputFormat::Text;
            let model = model(&data)?;
            let rows = aligned_rows(&model, &data, text).await?;

            step(text, "Fitting three-factor regression...");
            let estimate = model.estimate_aligned(&rows).map_err(stage_error)?;
            done(text, &format!(" ✓ ({} months)", estimate.window.n_obs));

            match format {
                OutputFormat::Text => print_text(&data.symbol, &estimate),
                OutputFormat::Markdown => print_markdown(&data.symbol, &estimate),
                OutputFormat::Json => {
                    let report = ReportBuilder::new()
                        .symbol(data.symbol.as_str())
                        .estimate(&estimate)?
                        .build()?;
                    println!("{}", report.to_json()?);
                }
            }

            if let Some(path) = export {
                export_estimate(&estimate, &path)?;
                info!(path = %path.display(), "estimate exported");
                if text {
                    println!("Estimate written to {}", path.display());
                }
            }
        }

        Commands::Dataset { data, export } => {
            let rows = aligned_rows(&model(&data)?, &data, export.is_some()).await?;
            let dataset = AlignedDataset(rows);
            match export {
                Some(path) => {
                    dataset.export_to_file(&path, ExportFormat::from_path(&path)?)?;
                    println!("{} rows written to {}", dataset.0.len(), path.display());
                }
                None => print!("{}", dataset.export_to_string(ExportFormat::Csv)?),
            }
        }
    }

    Ok(())
}

fn model(data: &DataArgs) -> Result<ThreeFactorModel, Box<dyn std::error::Error>> {
    let config = pipeline_config(data)?;
    Ok(ThreeFactorModel::with_config(config).map_err(stage_error)?)
}

/// Load prices and factors, then join them into regression rows.
async fn aligned_rows(
    model: &ThreeFactorModel,
    data: &DataArgs,
    progress: bool,
) -> Result<Vec<AlignedRow>, Box<dyn std::error::Error>> {
    if progress {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║{:^62}║", format!("Fama-French 3-Factor Model: {}", data.symbol));
        println!("╚══════════════════════════════════════════════════════════════╝\n");
    }

    let prices = load_prices(data).await?;
    done(progress, &format!("Month-end prices: {}", prices.len()));

    step(progress, "Loading factor table...");
    let factors = load_factor_csv(&data.factors)?;
    done(progress, &format!(" ✓ ({} rows)", factors.height()));

    step(progress, "Aligning returns with factors...");
    let rows = model.aligned_rows(&prices, &factors).map_err(stage_error)?;
    done(progress, &format!(" ✓ ({} matched months)", rows.len()));

    Ok(rows)
}

fn step(enabled: bool, message: &str) {
    if enabled {
        print!("{message}");
        // Progress output is best effort
        let _ = std::io::stdout().flush();
    }
}

fn done(enabled: bool, message: &str) {
    if enabled {
        println!("{message}");
    }
}

fn stage_error(err: ModelError) -> String {
    format!("{} stage failed: {}", err.stage(), err)
}

fn print_text(symbol: &str, estimate: &FactorModelEstimate) {
    print!("{}", RegressionSummary::from_estimate(symbol, estimate).to_ascii_table());
    print!(
        "{}",
        ExpectedReturnAttribution::from_estimate(symbol, estimate).to_ascii_table()
    );

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  Expected annual return: {:.2}%  (as of {})",
        estimate.expected_return() * 100.0,
        Utc::now().date_naive()
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

fn print_markdown(symbol: &str, estimate: &FactorModelEstimate) {
    println!("{}", RegressionSummary::from_estimate(symbol, estimate).to_markdown());
    print!("{}", ExpectedReturnAttribution::from_estimate(symbol, estimate).to_markdown());
}

fn export_estimate(estimate: &FactorModelEstimate, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    estimate.export_to_file(path, ExportFormat::from_path(path)?)?;
    Ok(())
}
