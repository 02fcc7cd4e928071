use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sales_forecast::config::{GeneratorConfig, PipelineConfig, SeasonalityMode};
use sales_forecast::dashboard::Dashboard;
use sales_forecast::data::{write_csv, DataLoader, TimeSeriesData};
use sales_forecast::generator::SyntheticSalesGenerator;
use sales_forecast::views::{ForecastTable, ForecastViews};
use sales_forecast::{forecast_series, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synthetic retail sales and decomposable forecasts
#[derive(Debug, Parser)]
#[command(name = "sales-forecast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a synthetic Date,Sales CSV file
    Generate {
        #[arg(long, default_value = "2018-01-01")]
        start: NaiveDate,
        #[arg(long, default_value = "2022-12-31")]
        end: NaiveDate,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, short, default_value = "sales_sample.csv")]
        output: PathBuf,
    },
    /// Fit the batch model and print the tail of the forecast
    Forecast {
        /// Date,Sales CSV; synthetic data is generated when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// JSON pipeline configuration
        #[arg(long, short)]
        config: Option<PathBuf>,
        #[arg(long)]
        horizon: Option<usize>,
        #[arg(long)]
        mode: Option<SeasonalityMode>,
        #[arg(long)]
        changepoint_prior_scale: Option<f64>,
        /// Number of trailing rows to print
        #[arg(long, default_value_t = 5)]
        tail: usize,
        /// Write the chart views as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Interactive dashboard reading commands from stdin
    Dashboard {
        /// Date,Sales CSV; synthetic data is generated when omitted
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

fn load_or_generate(input: Option<&PathBuf>, generator: &GeneratorConfig) -> Result<TimeSeriesData> {
    match input {
        Some(path) => {
            info!(path = %path.display(), "loading sales data");
            DataLoader::from_csv(path)
        }
        None => SyntheticSalesGenerator::new(generator.clone())?.generate_series(),
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            start,
            end,
            seed,
            output,
        } => {
            let records = SyntheticSalesGenerator::new(GeneratorConfig::new(start, end, seed))?
                .generate()?;
            write_csv(&records, &output)?;
            println!(
                "Generated {} days of sales from {} to {} into {}",
                records.len(),
                start,
                end,
                output.display()
            );
        }
        Commands::Forecast {
            input,
            config,
            horizon,
            mode,
            changepoint_prior_scale,
            tail,
            json,
        } => {
            let mut pipeline = match config {
                Some(path) => PipelineConfig::from_json_file(path)?,
                None => PipelineConfig::default(),
            };
            if let Some(days) = horizon {
                pipeline.horizon_days = days;
            }
            if let Some(mode) = mode {
                pipeline.model.seasonality_mode = mode;
            }
            if let Some(scale) = changepoint_prior_scale {
                pipeline.model.changepoint_prior_scale = scale;
            }
            pipeline.validate()?;

            let series = load_or_generate(input.as_ref(), &pipeline.generator)?;
            let frame = forecast_series(&series, &pipeline.model, pipeline.horizon_days)?;

            if let Some(path) = json {
                let views = ForecastViews::build(&series, &frame);
                serde_json::to_writer_pretty(BufWriter::new(File::create(&path)?), &views)?;
                info!(path = %path.display(), "wrote chart views");
            }

            println!("--- Sample Forecast (last {} days) ---", tail);
            print!("{}", ForecastTable::new(frame.tail(tail)));
        }
        Commands::Dashboard { input } => {
            let series = load_or_generate(input.as_ref(), &GeneratorConfig::default())?;
            let mut dashboard = Dashboard::new(series);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            dashboard.run(stdin.lock(), &mut stdout)?;
        }
    }

    Ok(())
}
