use crate::charts::{ChartKind, Figure, LineKind};
use chrono::NaiveDateTime;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

// One long-format chart row
#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    subplot: &'a str,
    series: &'a str,
    kind: &'a str,
    x: Option<f64>,
    y: f64,
    x_label: &'a str,
    y_label: &'a str,
}

/// `<kind>_<YYYYmmddHHMM>.csv`
pub fn chart_file_name(kind: ChartKind, stamp: &NaiveDateTime) -> String {
    format!("{}_{}.csv", kind.name(), stamp.format("%Y%m%d%H%M"))
}

// Create CSV writer; the header comes from the first serialized row
pub fn create_chart_writer(path: &Path) -> Result<Writer<File>, csv::Error> {
    WriterBuilder::new().has_headers(true).from_path(path)
}

/// Writes every point and horizontal line of `figure`, returning the number
/// of data rows written. Each row carries its subplot's axis labels.
pub fn write_figure<W: std::io::Write>(
    wtr: &mut Writer<W>,
    figure: &Figure,
) -> Result<usize, csv::Error> {
    let mut rows = 0;
    for subplot in &figure.subplots {
        for series in &subplot.series {
            for &(x, y) in &series.points {
                wtr.serialize(ChartRow {
                    subplot: &subplot.title,
                    series: &series.label,
                    kind: "point",
                    x: Some(x),
                    y,
                    x_label: &subplot.x_label,
                    y_label: &subplot.y_label,
                })?;
                rows += 1;
            }
        }
        for line in &subplot.lines {
            let kind = match line.kind {
                LineKind::Mean => "mean",
                LineKind::Reference => "reference",
            };
            wtr.serialize(ChartRow {
                subplot: &subplot.title,
                series: &line.label,
                kind,
                x: None,
                y: line.y,
                x_label: &subplot.x_label,
                y_label: &subplot.y_label,
            })?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{HorizontalLine, Series, Subplot};
    use chrono::NaiveDate;

    #[test]
    fn test_file_name_carries_kind_and_minute_stamp() {
        let stamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 7, 42)
            .unwrap();
        assert_eq!(
            chart_file_name(ChartKind::DischargeWindow, &stamp),
            "discharge_window_202405011307.csv"
        );
    }

    #[test]
    fn test_write_figure_long_format() {
        let figure = Figure {
            kind: ChartKind::Discharge,
            subplots: vec![Subplot {
                title: "Q50".to_string(),
                x_label: "Time Steps".to_string(),
                y_label: "Discharge Q".to_string(),
                series: vec![Series {
                    label: "Q50".to_string(),
                    points: vec![(0.0, 1.5), (1.0, 2.5)],
                }],
                lines: vec![HorizontalLine {
                    label: "Avg: 2.0000".to_string(),
                    y: 2.0,
                    kind: LineKind::Mean,
                }],
            }],
        };

        let mut wtr = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
        let rows = write_figure(&mut wtr, &figure).unwrap();
        assert_eq!(rows, 3);

        let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines[0], "subplot,series,kind,x,y,x_label,y_label");
        assert_eq!(lines[1], "Q50,Q50,point,0.0,1.5,Time Steps,Discharge Q");
        assert_eq!(lines[3], "Q50,Avg: 2.0000,mean,,2.0,Time Steps,Discharge Q");
    }
}
