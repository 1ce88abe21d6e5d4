use anyhow::{Context, Result};
use clap::Parser;
use regreport::{
    charts::PngRenderer,
    config::ReportConfig,
    pipeline::{run_report, FatalError},
};
use std::{path::PathBuf, process::ExitCode, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "regreport")]
#[command(about = "Chart report over a company registrations CSV")]
struct Args {
    /// Input CSV file (overrides the config file)
    input: Option<PathBuf>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for chart images and summary.json
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Field delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Charts required for the run to count as a success
    #[arg(long)]
    expected_charts: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<ReportConfig> {
        let mut cfg = match &self.config {
            Some(path) => ReportConfig::from_yaml_file(path)?,
            None => ReportConfig::default(),
        };
        if let Some(input) = self.input {
            cfg.input_path = input;
        }
        if let Some(output) = self.output {
            cfg.output_dir = output;
        }
        if let Some(d) = self.delimiter {
            cfg.delimiter = d;
        }
        if let Some(n) = self.expected_charts {
            cfg.expected_chart_count = n;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_level = if args.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{0},regreport={0}", default_level)));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) resolve config ───────────────────────────────────────────
    let config = args.into_config().context("Failed to build report config")?;
    info!("Input: {}", config.input_path.display());
    info!("Output directory: {}", config.output_dir.display());

    // ─── 3) run ──────────────────────────────────────────────────────
    let start = Instant::now();
    let mut renderer = PngRenderer::new(&config.output_dir);
    let report = match run_report(&config, &mut renderer) {
        Ok(report) => report,
        Err(e) => {
            match &e {
                FatalError::Load(_) => error!("Error loading dataset: {}", e),
                FatalError::Derive(_) => error!("Error processing dates: {}", e),
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    // ─── 4) summary file ─────────────────────────────────────────────
    match report.write_json(&config.output_dir) {
        Ok(path) => info!("Summary written to {}", path.display()),
        Err(e) => warn!("Could not write summary: {:#}", e),
    }

    info!(
        charts = report.charts_generated,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(ExitCode::SUCCESS)
}
