use crate::analysis::velocity::FlowCorrection;
use crate::error::{ScourError, ScourResult};
use crate::geometry::{SegmentFormula, pipe_radius};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Which physical quantity a measurement file records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Variant {
    #[serde(rename = "h")]
    Depth,
    #[serde(rename = "Q")]
    Discharge,
}

impl Variant {
    /// Tag used in file names and table labels.
    pub fn tag(&self) -> &'static str {
        match self {
            Variant::Depth => "h",
            Variant::Discharge => "Q",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One labelled experimental trial, e.g. the 150 L/min run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Condition(String);

impl Condition {
    pub fn new(label: impl Into<String>) -> Self {
        Condition(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Store key for one measurement table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub variant: Variant,
    pub condition: Condition,
}

impl TableKey {
    pub fn new(variant: Variant, condition: Condition) -> Self {
        TableKey { variant, condition }
    }

    pub fn discharge(condition: &Condition) -> Self {
        TableKey::new(Variant::Discharge, condition.clone())
    }

    pub fn depth(condition: &Condition) -> Self {
        TableKey::new(Variant::Depth, condition.clone())
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.variant.tag(), self.condition)
    }
}

// Configuration structure for column name mapping
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub time: String,
    pub discharge: String,
    pub water_depth: String,
    pub distance: String,
    pub distance_ma: String,
}

impl ColumnConfig {
    pub fn new() -> Self {
        ColumnConfig {
            time: "Time".to_string(),
            discharge: "Discharge".to_string(),
            water_depth: "Water_depth".to_string(),
            distance: "Distance".to_string(),
            distance_ma: "Distance_MA".to_string(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig::new()
    }
}

// Unit conversion constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UnitConversions {
    /// Meters per inch.
    pub inch_to_m: f64,
    /// L/min per m^3/s.
    pub lpm_per_cms: f64,
    /// Inches per meter, used for the manually read level rises.
    pub inches_per_m: f64,
    /// Feet per meter.
    pub ft_per_m: f64,
}

impl Default for UnitConversions {
    fn default() -> Self {
        UnitConversions {
            inch_to_m: 0.0254,
            lpm_per_cms: 60000.0,
            inches_per_m: 39.3701,
            ft_per_m: 3.28084,
        }
    }
}

/// Where the per-condition water depth at the culvert outlet comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepthSource {
    /// Depths read by eye during the run, one per condition, in meters.
    Observed { depths_m: Vec<f64> },
    /// Mean of the water-depth column of each depth table.
    Measured,
}

impl Default for DepthSource {
    fn default() -> Self {
        DepthSource::Observed {
            depths_m: vec![0.025, 0.037, 0.045, 0.05, 0.055, 0.06],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Condition positions for scour onset, complete scour and RCP movement.
    pub indices: [usize; 3],
    /// Reference RCP movement velocity from the ODOT chart, ft/s.
    pub odot_reference_fps: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            indices: [1, 4, 5],
            odot_reference_fps: 12.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// First sample index kept by the windowed discharge chart.
    pub window_start: usize,
    /// Last sample index kept by the windowed discharge chart (inclusive).
    pub window_end: usize,
    /// Distance between the depth sensor and the rock bed, m.
    pub rock_distance_m: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            window_start: 2000,
            window_end: 4000,
            rock_distance_m: 0.359,
        }
    }
}

/// Everything that describes one experimental run.
///
/// Built once at startup and passed by reference to each stage; nothing in
/// the pipeline mutates it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub base_filename: String,
    pub file_extension: String,
    pub variants: Vec<Variant>,
    pub conditions: Vec<Condition>,
    pub pipe_diameter_in: f64,
    /// Prototype to model length ratio.
    pub length_scale_ratio: f64,
    pub segment_formula: SegmentFormula,
    pub depths: DepthSource,
    pub flow_correction: FlowCorrection,
    pub units: UnitConversions,
    pub thresholds: ThresholdConfig,
    pub charts: ChartConfig,
    pub columns: ColumnConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            base_filename: "Case07_".to_string(),
            file_extension: ".csv".to_string(),
            variants: vec![Variant::Depth, Variant::Discharge],
            conditions: ["50", "100", "150", "200", "250", "300"]
                .into_iter()
                .map(Condition::new)
                .collect(),
            pipe_diameter_in: 4.0,
            length_scale_ratio: 12.0,
            segment_formula: SegmentFormula::Standard,
            depths: DepthSource::default(),
            flow_correction: FlowCorrection::None,
            units: UnitConversions::default(),
            thresholds: ThresholdConfig::default(),
            charts: ChartConfig::default(),
            columns: ColumnConfig::new(),
        }
    }
}

impl ExperimentConfig {
    /// Preset for the 1-inch culvert runs, where part of the inlet flow
    /// leaves upward through the bed and is subtracted before the outlet.
    /// The eye-read depths of the 4-inch runs do not fit this barrel, so
    /// depths come from the depth sensor tables.
    pub fn one_inch_pipe() -> Self {
        ExperimentConfig {
            pipe_diameter_in: 1.0,
            depths: DepthSource::Measured,
            flow_correction: FlowCorrection::upward_seepage_1in(),
            ..ExperimentConfig::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: ExperimentConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Checks that every per-condition list lines up with `conditions`.
    pub fn validate(&self) -> ScourResult<()> {
        let expected = self.conditions.len();
        if let DepthSource::Observed { depths_m } = &self.depths {
            if depths_m.len() != expected {
                return Err(ScourError::LengthMismatch {
                    what: "observed depth list",
                    expected,
                    actual: depths_m.len(),
                });
            }
        }
        if let Some(actual) = self.flow_correction.table_len() {
            if actual != expected {
                return Err(ScourError::LengthMismatch {
                    what: "upward seepage table",
                    expected,
                    actual,
                });
            }
        }
        for &index in &self.thresholds.indices {
            if index >= expected {
                return Err(ScourError::ThresholdIndex {
                    index,
                    len: expected,
                });
            }
        }
        Ok(())
    }

    pub fn pipe_radius_m(&self) -> f64 {
        pipe_radius(self.pipe_diameter_in, self.units.inch_to_m)
    }

    /// File name for one table, e.g. `Case07_Q150.csv`.
    pub fn file_name(&self, key: &TableKey) -> String {
        format!(
            "{}{}{}{}",
            self.base_filename,
            key.variant.tag(),
            key.condition,
            self.file_extension
        )
    }

    /// Every (variant, condition) pair, variant-major.
    pub fn table_keys(&self) -> Vec<TableKey> {
        self.variants
            .iter()
            .flat_map(|variant| {
                self.conditions
                    .iter()
                    .map(move |condition| TableKey::new(*variant, condition.clone()))
            })
            .collect()
    }
}
