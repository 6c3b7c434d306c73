use crate::analysis::discharge::MeanDischarge;
use crate::analysis::thresholds::ThresholdSet;
use crate::analysis::velocity::VelocityReport;
use crate::config::TableKey;
use std::io::{self, Write};

fn format_series(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{}", v)).collect();
    format!("[{}]", parts.join(", "))
}

fn to_lpm(flows_cms: &[f64], lpm_per_cms: f64) -> Vec<f64> {
    flows_cms.iter().map(|q| q * lpm_per_cms).collect()
}

fn format_discharges(discharges: &[MeanDischarge]) -> String {
    let parts: Vec<String> = discharges
        .iter()
        .map(|d| format!("{}: {}", TableKey::discharge(&d.condition), d.lpm))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Prints the run summary as `< label > value [unit]` lines: inlet flow,
/// upward flow (when corrected), outlet flow, model and prototype velocity,
/// then the threshold block. Values print at full precision so two runs can
/// be diffed line by line.
pub fn write_report<W: Write>(
    out: &mut W,
    discharges: &[MeanDischarge],
    velocities: &VelocityReport,
    thresholds: &ThresholdSet,
    lpm_per_cms: f64,
) -> io::Result<()> {
    writeln!(
        out,
        "< Flume inlet Flowrate > {} [L/min]",
        format_discharges(discharges)
    )?;
    if let Some(upward) = &velocities.upward_flow_cms {
        writeln!(
            out,
            "< Upward Flowrate > {} [L/min]",
            format_series(&to_lpm(upward, lpm_per_cms))
        )?;
    }
    writeln!(
        out,
        "< Flowrate at Culvert outlet > {} [L/min]",
        format_series(&to_lpm(&velocities.outlet_flow_cms, lpm_per_cms))
    )?;
    writeln!(
        out,
        "< [Model Scale] Velocity at Culvert outlet > {} [ft/s]",
        format_series(&velocities.model_fps)
    )?;
    writeln!(
        out,
        "< [Prototype Scale] Velocity at Culvert outlet > {} [ft/s]",
        format_series(&velocities.prototype_fps)
    )?;

    for (description, velocity) in thresholds.entries() {
        writeln!(
            out,
            "< [Prototype Scale] {} > {} [ft/s]",
            description, velocity
        )?;
    }
    writeln!(
        out,
        "< [Prototype Scale] Threshold Velocity in ODOT chart (RCP movement) > {} [ft/s]",
        thresholds.odot_reference_fps
    )?;
    Ok(())
}
