//! End-to-end runs over fixture CSV files written to a temp directory.

use culvert_scour::charts::ChartKind;
use culvert_scour::config::{Condition, DepthSource, ExperimentConfig, TableKey};
use culvert_scour::error::ScourError;
use culvert_scour::geometry::SegmentFormula;
use culvert_scour::pipeline::{RunOptions, run};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONDITIONS: [&str; 6] = ["50", "100", "150", "200", "250", "300"];

#[derive(Debug, Deserialize)]
struct ExpectedRow {
    condition: String,
    area_m2: f64,
    model_fps: f64,
    prototype_fps: f64,
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "culvert_scour_it_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Discharge tables whose non-zero samples average to the condition label,
/// with zero transients at both ends, plus a depth table per condition.
fn write_case07(dir: &Path, skip: &[&str]) {
    for label in CONDITIONS {
        let q: f64 = label.parse().unwrap();
        if !skip.contains(&format!("Q{}", label).as_str()) {
            let body = format!(
                "Time,Discharge\n0,0\n1,{}\n2,{}\n3,0\n",
                q - 1.0,
                q + 1.0
            );
            std::fs::write(dir.join(format!("Case07_Q{}.csv", label)), body).unwrap();
        }
        if !skip.contains(&format!("h{}", label).as_str()) {
            let depth = q / 20000.0;
            let body = format!(
                "Time,Water_depth,Distance,Distance_MA\n0,{},0.33,0.331\n60,{},0.32,0.321\nbroken,row,with,too,many\n",
                depth - 0.001,
                depth + 0.001
            );
            std::fs::write(dir.join(format!("Case07_h{}.csv", label)), body).unwrap();
        }
    }
}

fn load_expected() -> Vec<ExpectedRow> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/case07_expected.csv");
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.deserialize::<ExpectedRow>().map(|row| row.unwrap()).collect()
}

/// Values printed on one `< label > value [unit]` report line.
fn report_values(line: &str) -> Vec<f64> {
    let body = line.split(" > ").nth(1).unwrap();
    let body = body.rsplit_once(" [").unwrap().0;
    body.trim_matches(|c| c == '[' || c == ']' || c == '{' || c == '}')
        .split(", ")
        .map(|part| part.rsplit(": ").next().unwrap().parse().unwrap())
        .collect()
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    let tol = 1e-9 * expected.abs();
    assert!(
        (actual - expected).abs() <= tol,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

#[test]
fn test_case07_matches_golden_velocities() {
    let dir = scratch_dir("golden");
    write_case07(&dir, &[]);

    let config = ExperimentConfig::default();
    let mut out = Vec::new();
    let outcome = run(&config, &dir, &RunOptions::default(), &mut out).unwrap();

    let expected = load_expected();
    assert_eq!(expected.len(), 6);
    for (i, row) in expected.iter().enumerate() {
        assert_eq!(outcome.velocities.conditions[i].label(), row.condition);
        assert_close(outcome.velocities.areas_m2[i], row.area_m2, "area");
        assert_close(outcome.velocities.model_fps[i], row.model_fps, "model velocity");
        assert_close(
            outcome.velocities.prototype_fps[i],
            row.prototype_fps,
            "prototype velocity",
        );
    }

    // thresholds are conditions 100, 250 and 300
    assert_close(outcome.thresholds.scour_onset_fps, expected[1].prototype_fps, "v1");
    assert_close(outcome.thresholds.complete_scour_fps, expected[4].prototype_fps, "v2");
    assert_close(outcome.thresholds.rcp_movement_fps, expected[5].prototype_fps, "v3");
    assert_eq!(outcome.thresholds.odot_reference_fps, 12.0);

    let report = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(
        lines[0],
        "< Flume inlet Flowrate > {Q50: 50, Q100: 100, Q150: 150, Q200: 200, Q250: 250, Q300: 300} [L/min]"
    );
    let printed = report_values(lines[3]);
    for (value, row) in printed.iter().zip(&expected) {
        assert_close(*value, row.prototype_fps, "printed prototype velocity");
    }
    assert!(lines[4].starts_with("< [Prototype Scale] First threshold Velocity, v1 (Start scour) > "));
    assert_close(report_values(lines[4])[0], expected[1].prototype_fps, "printed v1");
}

#[test]
fn test_unhalved_segment_reproduces_early_runs() {
    let dir = scratch_dir("unhalved");
    write_case07(&dir, &[]);

    let config = ExperimentConfig {
        segment_formula: SegmentFormula::Unhalved,
        ..ExperimentConfig::default()
    };
    let outcome = run(&config, &dir, &RunOptions::default(), &mut Vec::new()).unwrap();

    let expected_model = [
        0.88201011556666,
        1.0243583097272042,
        1.1833379244129458,
        1.3765204416862873,
        3.051449238341886,
        3.291871129302383,
    ];
    for (actual, expected) in outcome.velocities.model_fps.iter().zip(expected_model) {
        assert_close(*actual, expected, "model velocity");
    }
}

#[test]
fn test_discharge_tables_are_narrowed_and_means_exclude_zeros() {
    let dir = scratch_dir("means");
    write_case07(&dir, &[]);

    let outcome = run(
        &ExperimentConfig::default(),
        &dir,
        &RunOptions::default(),
        &mut Vec::new(),
    )
    .unwrap();
    let means: Vec<f64> = outcome.discharges.iter().map(|d| d.lpm).collect();
    assert_eq!(means, vec![50.0, 100.0, 150.0, 200.0, 250.0, 300.0]);
    assert_eq!(outcome.load_report.loaded, 12);
    assert!(outcome.load_report.failures.is_empty());
}

#[test]
fn test_missing_file_is_reported_and_later_lookup_fails() {
    let dir = scratch_dir("missing");
    write_case07(&dir, &["Q150"]);

    let err = run(
        &ExperimentConfig::default(),
        &dir,
        &RunOptions::default(),
        &mut Vec::new(),
    )
    .unwrap_err();

    let missing = TableKey::discharge(&Condition::new("150"));
    match err.downcast_ref::<ScourError>() {
        Some(ScourError::MissingTable(key)) => assert_eq!(key, &missing),
        other => panic!("expected missing table error, got {:?} ({:#})", other, err),
    }
}

#[test]
fn test_missing_depth_file_does_not_stop_other_loads() {
    // observed depths never read the depth tables, so the run completes
    let dir = scratch_dir("missing_depth");
    write_case07(&dir, &["h50"]);

    let outcome = run(
        &ExperimentConfig::default(),
        &dir,
        &RunOptions::default(),
        &mut Vec::new(),
    )
    .unwrap();
    assert_eq!(outcome.load_report.loaded, 11);
    let missing: Vec<_> = outcome.load_report.missing().collect();
    assert_eq!(missing, vec![&TableKey::depth(&Condition::new("50"))]);
}

#[test]
fn test_measured_depths_use_water_depth_averages() {
    let dir = scratch_dir("measured");
    write_case07(&dir, &[]);

    let config = ExperimentConfig {
        depths: DepthSource::Measured,
        ..ExperimentConfig::default()
    };
    let outcome = run(&config, &dir, &RunOptions::default(), &mut Vec::new()).unwrap();
    let expected: Vec<f64> = CONDITIONS
        .iter()
        .map(|c| c.parse::<f64>().unwrap() / 20000.0)
        .collect();
    for (actual, expected) in outcome.velocities.depths_m.iter().zip(&expected) {
        assert!((actual - expected).abs() < 1e-12);
    }
}

#[test]
fn test_depth_outside_barrel_aborts_run() {
    let dir = scratch_dir("domain");
    write_case07(&dir, &[]);

    let config = ExperimentConfig {
        pipe_diameter_in: 1.0,
        ..ExperimentConfig::default()
    };
    let err = run(&config, &dir, &RunOptions::default(), &mut Vec::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScourError>(),
        Some(ScourError::Geometry(_))
    ));
}

#[test]
fn test_one_inch_preset_prints_upward_flow() {
    let dir = scratch_dir("one_inch");
    write_case07(&dir, &[]);

    let mut out = Vec::new();
    let outcome = run(
        &ExperimentConfig::one_inch_pipe(),
        &dir,
        &RunOptions::default(),
        &mut out,
    )
    .unwrap();
    assert!(outcome.velocities.upward_flow_cms.is_some());

    let report = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[1].starts_with("< Upward Flowrate > ["));
    let upward = report_values(lines[1]);
    assert_eq!(upward.len(), 6);
    assert_close(upward[0], 25.907986009687544, "upward flow Q50");
    assert_close(upward[1], 30.479983540808885, "upward flow Q100");
}

#[test]
fn test_charts_are_written_before_zero_filtering() {
    let dir = scratch_dir("charts");
    write_case07(&dir, &[]);
    let charts_dir = dir.join("charts");

    let options = RunOptions {
        charts_dir: Some(charts_dir.clone()),
        charts: vec![ChartKind::Discharge, ChartKind::WaterDepth],
        show_progress: false,
    };
    let outcome = run(&ExperimentConfig::default(), &dir, &options, &mut Vec::new()).unwrap();
    assert_eq!(outcome.chart_files.len(), 2);

    let discharge_chart = std::fs::read_to_string(&outcome.chart_files[0]).unwrap();
    let point_rows = discharge_chart
        .lines()
        .filter(|l| l.contains(",point,"))
        .count();
    // four samples per condition, zeros included
    assert_eq!(point_rows, 24);
    assert!(discharge_chart.starts_with("subplot,series,kind,x,y,x_label,y_label\n"));

    let name = outcome.chart_files[1].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("water_depth_"));
    assert!(outcome.chart_files.iter().all(|p| p.starts_with(&charts_dir)));
}
