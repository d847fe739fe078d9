use anyhow::Result;
use clap::Parser;

use voxalyzer::config::AnalysisConfig;
use voxalyzer::ui;

/// Launch the interactive analysis window.
#[derive(Parser, Debug)]
#[command(name = "studio", about = "Voxalyzer studio - drop a recording, read the report")]
struct Args {
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

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AnalysisConfig {
        pitch_floor: args.pitch_floor,
        pitch_ceiling: args.pitch_ceiling,
        max_formant_hz: args.max_formant,
        ..AnalysisConfig::default()
    };
    config.validate()?;

    ui::launch_ui(config)
}
