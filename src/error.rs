use crate::config::TableKey;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read one measurement file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

// Pipe geometry precondition violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Water depth {depth} m lies outside a pipe of radius {radius} m")]
    DepthOutOfRange { depth: f64, radius: f64 },

    #[error("Pipe radius must be positive, got {0}")]
    InvalidRadius(f64),
}

#[derive(Error, Debug)]
pub enum ScourError {
    #[error("No table loaded for {0}")]
    MissingTable(TableKey),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("{what} has {actual} entries but {expected} conditions are configured")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Threshold index {index} is out of range for {len} conditions")]
    ThresholdIndex { index: usize, len: usize },

    #[error("Measured depth source needs a water-depth average for {0}")]
    MissingDepth(TableKey),
}

pub type ScourResult<T> = Result<T, ScourError>;
