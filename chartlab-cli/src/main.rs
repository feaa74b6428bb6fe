//! ChartLab CLI: grade, detect, sample and config commands.
//!
//! Commands:
//! - `grade`: grade a JSON grading request, optionally with candles from CSV
//! - `detect`: print the swing points detected on a candle file
//! - `sample`: generate a reproducible practice chart
//! - `exams`: list the exam catalog
//! - `config`: print the default grading config as TOML

use anyhow::{bail, Context, Result};
use chartlab_core::analysis::SwingDetector;
use chartlab_core::data::{random_candles, PracticeSeeds};
use chartlab_core::domain::{Candle, CandleSeries, Timeframe};
use chartlab_core::grading::{catalog, GradingRequest};
use chartlab_core::{Grader, GradingConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chartlab",
    about = "ChartLab CLI — grade chart-annotation exams"
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a grading request (JSON) and print the result as JSON.
    Grade {
        /// Path to the grading request JSON.
        #[arg(long)]
        request: PathBuf,

        /// Path to a TOML grading config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Candle file (CSV or JSON) replacing the request's candles.
        #[arg(long)]
        candles: Option<PathBuf>,
    },
    /// Detect swing points on a candle file and print them as JSON.
    Detect {
        /// Candle file: CSV with time,open,high,low,close or a JSON array.
        #[arg(long)]
        candles: PathBuf,

        /// Chart timeframe: 1h, 4h, 1d, 1w, 1m.
        #[arg(long, default_value = "1h")]
        timeframe: Timeframe,

        /// Minor-pass lookback.
        #[arg(long, default_value_t = 3)]
        lookback: usize,

        /// Minimum swing amplitude as a fraction of the price range.
        #[arg(long, default_value_t = 0.05)]
        threshold: f64,

        /// Report major swings only.
        #[arg(long, default_value_t = false)]
        major_only: bool,
    },
    /// Generate a synthetic practice chart.
    Sample {
        /// Number of candles.
        #[arg(long, default_value_t = 50)]
        count: usize,

        /// Chart timeframe: 1h, 4h, 1d, 1w, 1m.
        #[arg(long, default_value = "1h")]
        timeframe: Timeframe,

        /// Random seed (master seed when --symbol is given).
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Derive the chart seed from this symbol and --chart.
        #[arg(long)]
        symbol: Option<String>,

        /// Practice chart number (with --symbol).
        #[arg(long, default_value_t = 1)]
        chart: u32,

        /// Starting price.
        #[arg(long, default_value_t = 100.0)]
        base_price: f64,

        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
    },
    /// List exam types with their sections.
    Exams,
    /// Print the default grading config as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Grade {
            request,
            config,
            candles,
        } => run_grade(&request, config.as_deref(), candles.as_deref()),
        Commands::Detect {
            candles,
            timeframe,
            lookback,
            threshold,
            major_only,
        } => run_detect(&candles, timeframe, lookback, threshold, major_only),
        Commands::Sample {
            count,
            timeframe,
            seed,
            symbol,
            chart,
            base_price,
            format,
        } => run_sample(count, timeframe, seed, symbol.as_deref(), chart, base_price, format),
        Commands::Exams => run_exams(),
        Commands::Config => run_config(),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_grade(request_path: &Path, config_path: Option<&Path>, candles_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => GradingConfig::from_file(path)?,
        None => GradingConfig::default(),
    };
    let grader = Grader::new(config)?;

    let content = std::fs::read_to_string(request_path)
        .with_context(|| format!("failed to read {}", request_path.display()))?;
    let mut request: GradingRequest = serde_json::from_str(&content)
        .with_context(|| format!("invalid grading request {}", request_path.display()))?;

    if let Some(path) = candles_path {
        request.candles = load_candles(path)?;
    }

    let result = grader.grade(&request)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_detect(
    candles_path: &Path,
    timeframe: Timeframe,
    lookback: usize,
    threshold: f64,
    major_only: bool,
) -> Result<()> {
    if lookback == 0 {
        bail!("--lookback must be at least 1");
    }
    let series = load_candles(candles_path)?;
    let detector = SwingDetector::new(lookback, threshold).with_minor(!major_only);
    let points = detector.detect(&series, timeframe);
    info!(
        highs = points.highs.len(),
        lows = points.lows.len(),
        candles = series.len(),
        "detection complete"
    );
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

fn run_sample(
    count: usize,
    timeframe: Timeframe,
    seed: u64,
    symbol: Option<&str>,
    chart: u32,
    base_price: f64,
    format: OutputFormat,
) -> Result<()> {
    let series = match symbol {
        Some(symbol) => PracticeSeeds::new(seed).chart(symbol, timeframe, chart, count, base_price)?,
        None => random_candles(count, base_price, timeframe, seed)?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for candle in series.candles() {
                writer.serialize(candle)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn run_exams() -> Result<()> {
    println!("{:<24} {:<14} {:<40}", "Exam", "Difficulty", "Sections");
    println!("{}", "-".repeat(78));
    for info in catalog() {
        let sections: Vec<&str> = info.sections.iter().map(|s| s.tag()).collect();
        println!(
            "{:<24} {:<14} {:<40}",
            info.exam_type.tag(),
            format!("{:?}", info.difficulty).to_lowercase(),
            sections.join(", ")
        );
    }
    Ok(())
}

fn run_config() -> Result<()> {
    print!("{}", GradingConfig::default().to_toml()?);
    Ok(())
}

/// CSV (`time,open,high,low,close` header) or a JSON array, by extension.
fn load_candles(path: &Path) -> Result<CandleSeries> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let candles: Vec<Candle> = if is_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("invalid candle JSON {}", path.display()))?
    } else {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        reader
            .deserialize()
            .collect::<Result<_, _>>()
            .with_context(|| format!("invalid candle CSV {}", path.display()))?
    };

    CandleSeries::new(candles).with_context(|| format!("invalid candles in {}", path.display()))
}
