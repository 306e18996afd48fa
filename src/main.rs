use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use gho_tidy::transform::constant_columns;
use gho_tidy::{IndicatorRecord, PipelineConfig, SourceClient};

#[derive(Parser)]
#[command(name = "gho-tidy")]
#[command(author, version, about = "WHO GHO indicator to tidy CSV pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all indicators, join GDP and write the output tables
    Run {
        /// Directory for df_probability.csv and df_guidelines.csv [default: csv]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// World Bank GDP export (wide CSV) [default: csv/wbi_gdp/gdp.csv]
        #[arg(long)]
        gdp_csv: Option<PathBuf>,

        /// Save raw indicator responses to this directory
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Fetch a single indicator and summarize its columns
    Inspect {
        /// GHO indicator code
        #[arg(short, long)]
        indicator: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            output_dir,
            gdp_csv,
            raw_dir,
            verbose,
        } => {
            setup_logging(verbose);
            run_pipeline(output_dir, gdp_csv, raw_dir).await
        }
        Commands::Inspect { indicator, verbose } => {
            setup_logging(verbose);
            inspect_indicator(&indicator).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Overlay the CLI path flags on the default configuration
fn pipeline_config(
    output_dir: Option<PathBuf>,
    gdp_csv: Option<PathBuf>,
    raw_dir: Option<PathBuf>,
) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    PipelineConfig {
        output_dir: output_dir.unwrap_or_else(|| defaults.output_dir.clone()),
        gdp_csv: gdp_csv.unwrap_or_else(|| defaults.gdp_csv.clone()),
        raw_dir,
        ..defaults
    }
}

async fn run_pipeline(
    output_dir: Option<PathBuf>,
    gdp_csv: Option<PathBuf>,
    raw_dir: Option<PathBuf>,
) -> Result<()> {
    let config = pipeline_config(output_dir, gdp_csv, raw_dir);

    let result = gho_tidy::run(&config).await?;

    info!("Probability table written to {:?}", result.probability_path);
    info!("Guidelines table written to {:?}", result.guidelines_path);
    if let Some(manifest_path) = result.manifest_path {
        info!("Manifest written to {:?}", manifest_path);
    }

    Ok(())
}

async fn inspect_indicator(code: &str) -> Result<()> {
    let config = PipelineConfig::default();
    let client = SourceClient::new(&config.api_base)?;

    info!("Fetching indicator {}", code);
    let payload = client.fetch_indicator(code).await?;
    let table = IndicatorRecord::flatten_all(&payload.response.value)
        .with_context(|| format!("Failed to flatten indicator {}", code))?;
    let constant = constant_columns(&table)?;

    println!("Indicator {}", code);
    println!("==================");
    println!("Records: {}", table.height());
    println!("Columns: {}", table.width());
    println!();

    println!("Columns");
    println!("-------");
    for column in table.get_columns() {
        let name = column.name().to_string();
        let marker = if constant.contains(&name) { " (constant)" } else { "" };
        println!(
            "{} [{}]: {} nulls{}",
            name,
            column.dtype(),
            column.null_count(),
            marker
        );
    }

    println!();
    println!("Constant columns dropped during normalization: {}", constant.len());

    Ok(())
}
