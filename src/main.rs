use anyhow::Result;
use culvert_scour::config::ExperimentConfig;
use culvert_scour::pipeline::{RunOptions, run};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::get_args;

fn main() -> Result<()> {
    let args = get_args();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Configuration
    let config = match &args.config {
        Some(path) => ExperimentConfig::from_file(path)?,
        None => ExperimentConfig::default(),
    };

    println!("\nExperiment Configuration:");
    println!("  Data directory: {}", args.data_dir.display());
    println!("  Files: {}<h|Q><condition>{}", config.base_filename, config.file_extension);
    println!("  Conditions: {}", config.conditions.len());
    println!("  Pipe diameter: {} in", config.pipe_diameter_in);
    println!("  Length scale ratio: {}\n", config.length_scale_ratio);

    let options = RunOptions {
        charts_dir: args.charts_dir,
        charts: args.charts,
        show_progress: !args.no_progress,
    };

    let mut stdout = std::io::stdout().lock();
    let outcome = run(&config, &args.data_dir, &options, &mut stdout)?;

    for path in &outcome.chart_files {
        info!("Chart data written to {}", path.display());
    }
    Ok(())
}
