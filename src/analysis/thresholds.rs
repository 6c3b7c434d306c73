//! Scour threshold velocities at prototype scale.

use crate::config::ThresholdConfig;
use crate::error::{ScourError, ScourResult};

/// Three observed thresholds plus the ODOT chart reference, all ft/s at
/// prototype scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    pub scour_onset_fps: f64,
    pub complete_scour_fps: f64,
    pub rcp_movement_fps: f64,
    pub odot_reference_fps: f64,
}

impl ThresholdSet {
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [
            (
                "First threshold Velocity, v1 (Start scour)",
                self.scour_onset_fps,
            ),
            (
                "Second threshold Velocity, v2 (Complete scour)",
                self.complete_scour_fps,
            ),
            (
                "Third threshold Velocity, v3 (RCP movement)",
                self.rcp_movement_fps,
            ),
        ]
    }
}

/// Picks the threshold conditions out of the prototype velocities by their
/// configured positions.
pub fn select_thresholds(
    prototype_fps: &[f64],
    config: &ThresholdConfig,
) -> ScourResult<ThresholdSet> {
    let pick = |index: usize| {
        prototype_fps
            .get(index)
            .copied()
            .ok_or(ScourError::ThresholdIndex {
                index,
                len: prototype_fps.len(),
            })
    };
    let [onset, complete, rcp] = config.indices;

    Ok(ThresholdSet {
        scour_onset_fps: pick(onset)?,
        complete_scour_fps: pick(complete)?,
        rcp_movement_fps: pick(rcp)?,
        odot_reference_fps: config.odot_reference_fps,
    })
}
