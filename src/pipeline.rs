use crate::analysis::discharge::{MeanDischarge, reduce_discharge};
use crate::analysis::thresholds::{ThresholdSet, select_thresholds};
use crate::analysis::velocity::{VelocityReport, compute_velocities, outlet_depths};
use crate::charts::{ChartKind, ChartOutput, build_chart};
use crate::config::{DepthSource, ExperimentConfig};
use crate::io::chart_data::{chart_file_name, create_chart_writer, write_figure};
use crate::report::write_report;
use crate::store::{DataStore, LoadReport};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory chart-data files are written to; no charts when unset.
    pub charts_dir: Option<PathBuf>,
    pub charts: Vec<ChartKind>,
    pub show_progress: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub load_report: LoadReport,
    pub discharges: Vec<MeanDischarge>,
    pub velocities: VelocityReport,
    pub thresholds: ThresholdSet,
    pub chart_files: Vec<PathBuf>,
}

fn load_progress_bar(show: bool) -> Result<ProgressBar> {
    if !show {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn save_chart(output: &ChartOutput, dir: &Path, stamp: &NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(chart_file_name(output.figure.kind, stamp));
    let mut wtr = create_chart_writer(&path)
        .with_context(|| format!("Failed to create chart file: {:?}", path))?;
    let rows = write_figure(&mut wtr, &output.figure)
        .with_context(|| format!("Failed to write chart file: {:?}", path))?;
    info!("Chart '{}' saved to {:?} ({} rows)", output.figure.kind, path, rows);
    Ok(path)
}

/// Runs one experiment end to end and writes the summary to `out`.
///
/// Charts are built from the tables as loaded, before zero discharge
/// samples are dropped.
pub fn run<W: Write>(
    config: &ExperimentConfig,
    data_dir: &Path,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunOutcome> {
    config.validate().context("Invalid experiment configuration")?;

    let pb = load_progress_bar(options.show_progress)?;
    let (mut store, load_report) = DataStore::load(config, data_dir, &pb);

    let stamp = Local::now().naive_local();
    let mut chart_files = Vec::new();
    let mut depth_averages = HashMap::new();

    if let Some(dir) = &options.charts_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create charts directory: {:?}", dir))?;
        for &kind in &options.charts {
            let output = build_chart(kind, &store, config)
                .with_context(|| format!("Failed to build '{}' chart", kind))?;
            chart_files.push(save_chart(&output, dir, &stamp)?);
            if kind == ChartKind::WaterDepth {
                depth_averages = output.averages;
            }
        }
    }

    if config.depths == DepthSource::Measured && depth_averages.is_empty() {
        depth_averages = build_chart(ChartKind::WaterDepth, &store, config)
            .context("Failed to average measured water depths")?
            .averages;
    }

    let discharges = reduce_discharge(&mut store, config).context("Failed to reduce discharge")?;
    let depths = outlet_depths(config, &depth_averages)?;
    let velocities = compute_velocities(&discharges, &depths, config)
        .context("Failed to compute outlet velocities")?;
    let thresholds = select_thresholds(&velocities.prototype_fps, &config.thresholds)?;

    write_report(
        out,
        &discharges,
        &velocities,
        &thresholds,
        config.units.lpm_per_cms,
    )
    .context("Failed to write report")?;

    Ok(RunOutcome {
        load_report,
        discharges,
        velocities,
        thresholds,
        chart_files,
    })
}
