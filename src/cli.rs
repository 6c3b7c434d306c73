use clap::Parser;
use culvert_scour::charts::ChartKind;
use std::path::PathBuf;

/// Reduce culvert scour experiment measurements to outlet and threshold velocities
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding the measurement CSV files
    #[arg(default_value = ".")]
    pub data_dir: PathBuf,

    /// TOML file overriding the built-in experiment configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write chart data files into this directory
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Chart to write, may be repeated
    #[arg(long = "chart", value_enum, default_values_t = [ChartKind::Discharge])]
    pub charts: Vec<ChartKind>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Hide the file loading progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn get_args() -> Args {
    Args::parse()
}
