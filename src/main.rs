use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use voxalyzer::config::AnalysisConfig;
use voxalyzer::pipeline::{self, FAILURE_HINT};

/// Voxalyzer - acoustic speech report tool
///
/// Analyzes one speech recording (WAV, or the audio track of an MP4/M4A)
/// and prints eight acoustic measurements: mean pitch, F1-F3, jitter,
/// shimmer, HNR, and the low/high spectral energy ratio.
#[derive(Parser, Debug)]
#[command(name = "voxalyzer")]
#[command(version = "0.1.0")]
#[command(about = "Acoustic speech report tool", long_about = None)]
struct Args {
    /// Input recording (wav, mp4, or m4a)
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// Also write the eight metrics as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Lowest pitch the tracker considers, Hz
    #[arg(long, default_value_t = 75.0)]
    pitch_floor: f64,

    /// Highest pitch the tracker considers, Hz
    #[arg(long, default_value_t = 600.0)]
    pitch_ceiling: f64,

    /// Formant search ceiling, Hz
    #[arg(long, default_value_t = 5500.0)]
    max_formant: f64,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            anyhow::bail!("Input file does not exist: {:?}", self.input_file);
        }
        if !self.input_file.is_file() {
            anyhow::bail!("Input path is not a file: {:?}", self.input_file);
        }
        self.config().validate()
    }

    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            pitch_floor: self.pitch_floor,
            pitch_ceiling: self.pitch_ceiling,
            max_formant_hz: self.max_formant,
            ..AnalysisConfig::default()
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("Analysis failed: {err:#}");
        eprintln!("{FAILURE_HINT}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let config = args.config();

    println!("Voxalyzer v0.1.0 - Acoustic Speech Report");
    println!("Input: {:?}", args.input_file);
    println!("Analyzing at {} Hz...", config.analysis_sample_rate);

    let report = pipeline::process_file(&args.input_file, &config)?;

    println!();
    print!("{}", report.render_text());

    if let Some(path) = &args.json {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write JSON report to {:?}", path))?;
        println!("\nJSON report written to {:?}", path);
    }

    Ok(())
}
