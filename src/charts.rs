//! Diagnostic time-series figures.
//!
//! Each figure has one subplot per condition. Figures are plain data; the
//! `io::chart_data` module writes them out for plotting elsewhere. Two of the
//! kinds also hand back the per-table averages they compute.

use crate::config::{Condition, ExperimentConfig, TableKey};
use crate::error::ScourResult;
use crate::io::table::{Table, mean};
use crate::store::DataStore;
use clap::ValueEnum;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChartKind {
    /// Raw discharge against sample index.
    Discharge,
    /// Discharge samples inside the configured index window.
    DischargeWindow,
    /// Sensor to water surface distance over time.
    Distance,
    /// Smoothed sensor distance with the rock bed reference.
    DistanceMa,
    /// Water depth at the culvert outlet over time.
    WaterDepth,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Discharge => "discharge",
            ChartKind::DischargeWindow => "discharge_window",
            ChartKind::Distance => "distance",
            ChartKind::DistanceMa => "distance_ma",
            ChartKind::WaterDepth => "water_depth",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Mean,
    Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalLine {
    pub label: String,
    pub y: f64,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subplot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub lines: Vec<HorizontalLine>,
}

impl Subplot {
    fn new(title: String, x_label: &str, y_label: &str) -> Self {
        Subplot {
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            lines: Vec::new(),
        }
    }

    fn add_mean(&mut self, y: f64, label: String) {
        self.lines.push(HorizontalLine {
            label,
            y,
            kind: LineKind::Mean,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: ChartKind,
    pub subplots: Vec<Subplot>,
}

#[derive(Debug, Clone)]
pub struct ChartOutput {
    pub figure: Figure,
    /// Averages computed while building the figure. Only filled by
    /// `DischargeWindow` and `WaterDepth`.
    pub averages: HashMap<TableKey, f64>,
}

// Pulls (x column, y column) out of a table, warning when either is absent
fn paired_columns(
    table: &Table,
    x: &str,
    y: &str,
    key: &TableKey,
    config: &ExperimentConfig,
) -> Option<(Vec<f64>, Vec<f64>)> {
    if !(table.has_column(x) && table.has_column(y)) {
        warn!(
            "Columns '{}' or '{}' not found in {}",
            x,
            y,
            config.file_name(key)
        );
        return None;
    }
    Some((table.column(x)?, table.column(y)?))
}

/// Builds one figure of the requested kind from the tables in `store`.
///
/// A table missing from the store is an error; a table missing a column
/// leaves that subplot empty.
pub fn build_chart(
    kind: ChartKind,
    store: &DataStore,
    config: &ExperimentConfig,
) -> ScourResult<ChartOutput> {
    let mut subplots = Vec::with_capacity(config.conditions.len());
    let mut averages = HashMap::new();

    for condition in &config.conditions {
        let subplot = match kind {
            ChartKind::Discharge => discharge_subplot(store, config, condition)?,
            ChartKind::DischargeWindow => {
                let (subplot, avg) = discharge_window_subplot(store, config, condition)?;
                if let Some(avg) = avg {
                    averages.insert(TableKey::discharge(condition), avg);
                }
                subplot
            }
            ChartKind::Distance => distance_subplot(store, config, condition, false)?,
            ChartKind::DistanceMa => distance_subplot(store, config, condition, true)?,
            ChartKind::WaterDepth => {
                let (subplot, avg) = water_depth_subplot(store, config, condition)?;
                if let Some(avg) = avg {
                    averages.insert(TableKey::depth(condition), avg);
                }
                subplot
            }
        };
        subplots.push(subplot);
    }

    Ok(ChartOutput {
        figure: Figure { kind, subplots },
        averages,
    })
}

fn discharge_subplot(
    store: &DataStore,
    config: &ExperimentConfig,
    condition: &Condition,
) -> ScourResult<Subplot> {
    let key = TableKey::discharge(condition);
    let table = store.get(&key)?;
    let columns = &config.columns;
    let mut subplot = Subplot::new(
        format!("Discharge Q Over Time ({})", key),
        "Time Steps",
        "Discharge Q",
    );

    if let Some((_, discharge)) =
        paired_columns(table, &columns.time, &columns.discharge, &key, config)
    {
        let avg = mean(discharge.iter().copied());
        subplot.series.push(Series {
            label: key.to_string(),
            points: discharge
                .into_iter()
                .enumerate()
                .map(|(i, q)| (i as f64, q))
                .collect(),
        });
        subplot.add_mean(avg, format!("Avg: {:.4}", avg));
    }
    Ok(subplot)
}

fn discharge_window_subplot(
    store: &DataStore,
    config: &ExperimentConfig,
    condition: &Condition,
) -> ScourResult<(Subplot, Option<f64>)> {
    let key = TableKey::discharge(condition);
    let table = store.get(&key)?;
    let columns = &config.columns;
    let window = config.charts.window_start..=config.charts.window_end;
    let mut subplot = Subplot::new(
        format!("Discharge Q Over Time ({})", key),
        "Time Steps",
        "Discharge Q",
    );

    let Some((_, discharge)) =
        paired_columns(table, &columns.time, &columns.discharge, &key, config)
    else {
        return Ok((subplot, None));
    };

    let points: Vec<(f64, f64)> = discharge
        .into_iter()
        .enumerate()
        .filter(|(i, _)| window.contains(i))
        .map(|(i, q)| (i as f64, q))
        .collect();

    if points.is_empty() {
        warn!("No data left after filtering for {}. Skipping plot.", key);
        return Ok((subplot, None));
    }

    let avg = mean(points.iter().map(|(_, q)| *q));
    subplot.series.push(Series {
        label: key.to_string(),
        points,
    });
    subplot.add_mean(avg, format!("Avg: {:.4}", avg));
    Ok((subplot, Some(avg)))
}

fn distance_subplot(
    store: &DataStore,
    config: &ExperimentConfig,
    condition: &Condition,
    smoothed: bool,
) -> ScourResult<Subplot> {
    let key = TableKey::depth(condition);
    let table = store.get(&key)?;
    let columns = &config.columns;
    let y_column = if smoothed {
        &columns.distance_ma
    } else {
        &columns.distance
    };
    let mut subplot = Subplot::new(
        format!("Distance between Sensor to Water Surface (Q{})", condition),
        "Time",
        y_column,
    );

    if let Some((time, distance)) = paired_columns(table, &columns.time, y_column, &key, config) {
        let avg = mean(distance.iter().copied());
        subplot.series.push(Series {
            label: format!("Q{}", condition),
            points: time.into_iter().zip(distance).collect(),
        });
        if smoothed {
            subplot.add_mean(avg, format!("Avg: {:.4} [m]", avg));
            let rocks = config.charts.rock_distance_m;
            subplot.lines.push(HorizontalLine {
                label: format!("Distance b/w sensor to rocks: {} [m]", rocks),
                y: rocks,
                kind: LineKind::Reference,
            });
        } else {
            subplot.add_mean(avg, format!("Avg: {:.4}", avg));
        }
    }
    Ok(subplot)
}

fn water_depth_subplot(
    store: &DataStore,
    config: &ExperimentConfig,
    condition: &Condition,
) -> ScourResult<(Subplot, Option<f64>)> {
    let key = TableKey::depth(condition);
    let table = store.get(&key)?;
    let columns = &config.columns;
    let mut subplot = Subplot::new(
        format!("Water depth at culvert outlet (Q{})", condition),
        "Time",
        &columns.water_depth,
    );

    let Some((time, depth)) =
        paired_columns(table, &columns.time, &columns.water_depth, &key, config)
    else {
        return Ok((subplot, None));
    };

    let avg = mean(depth.iter().copied());
    subplot.series.push(Series {
        label: key.to_string(),
        points: time.into_iter().zip(depth).collect(),
    });
    subplot.add_mean(avg, format!("Avg: {:.4} [m]", avg));
    Ok((subplot, Some(avg)))
}
