//! Flow area of a partially filled horizontal circular pipe.

use crate::error::GeometryError;
use serde::Deserialize;
use std::f64::consts::PI;

/// Area convention for the lower (less than half full) branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFormula {
    /// Circular segment area `R^2 / 2 * (theta - sin theta)`.
    #[default]
    Standard,
    /// `R^2 * (theta - sin theta)`, as used in the early reduction runs.
    /// Twice the true segment area and discontinuous at half full; only
    /// useful for reproducing those numbers.
    Unhalved,
}

fn check_inputs(h: f64, r: f64) -> Result<(), GeometryError> {
    if r <= 0.0 || !r.is_finite() {
        return Err(GeometryError::InvalidRadius(r));
    }
    if !(0.0..=2.0 * r).contains(&h) {
        return Err(GeometryError::DepthOutOfRange {
            depth: h,
            radius: r,
        });
    }
    Ok(())
}

/// Wetted cross-sectional area for water depth `h` in a pipe of radius `r`.
///
/// Precondition: `0 <= h <= 2r`. Depths outside the pipe would feed an
/// out-of-range argument to `acos`; they are rejected instead of clamped.
///
/// [`SegmentFormula::Standard`] gives half the below-centre area the early
/// reduction runs used; pass [`SegmentFormula::Unhalved`] to reproduce them.
pub fn wetted_area(h: f64, r: f64, formula: SegmentFormula) -> Result<f64, GeometryError> {
    check_inputs(h, r)?;

    let area = if h < r {
        let theta = 2.0 * ((r - h) / r).acos();
        match formula {
            SegmentFormula::Standard => r.powi(2) / 2.0 * (theta - theta.sin()),
            SegmentFormula::Unhalved => r.powi(2) * (theta - theta.sin()),
        }
    } else {
        let theta = 2.0 * ((h - r) / r).acos();
        PI * r.powi(2) - r.powi(2) / 2.0 * (theta - theta.sin())
    };
    Ok(area)
}

/// Elementwise [`wetted_area`]; fails on the first depth outside the pipe.
pub fn wetted_areas(
    depths: &[f64],
    r: f64,
    formula: SegmentFormula,
) -> Result<Vec<f64>, GeometryError> {
    depths.iter().map(|&h| wetted_area(h, r, formula)).collect()
}

/// Pipe radius in meters for a diameter given in inches.
pub fn pipe_radius(diameter_in: f64, inch_to_m: f64) -> f64 {
    inch_to_m * diameter_in / 2.0
}
