use crate::error::LoadError;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};

/// Row-major table of named numeric columns.
///
/// Cells that do not parse as numbers are stored as NaN and ignored by
/// [`Table::mean`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from literal rows. Rows whose width does not match the
    /// header are dropped, as they are when loading.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<f64>>) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row; returns false (and drops it) on a width mismatch.
    pub fn push_row(&mut self, row: Vec<f64>) -> bool {
        if row.len() != self.columns.len() {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Keeps only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[f64]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Mean of a column, or `None` if the column does not exist.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        Some(mean(self.rows.iter().map(|row| row[idx])))
    }
}

/// Arithmetic mean skipping NaN cells. NaN when nothing is left.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as f64
}

fn parse_cell(field: &str) -> f64 {
    field.parse::<f64>().unwrap_or(f64::NAN)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Loads a comma-delimited file with a header row.
///
/// Rows with the wrong number of fields are skipped with a warning. A
/// missing file is reported as [`LoadError::NotFound`], anything else that
/// stops the read as [`LoadError::Read`].
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source: e.into(),
            }
        }
    })?;
    let buffered_reader = BufReader::new(file);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buffered_reader);

    let read_error = |source: csv::Error| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = rdr
        .headers()
        .map_err(read_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = Table::new(headers);
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(read_error(e)),
            Err(e) => {
                warn!("Skipping unreadable row in {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        let line = line_of(&record);
        let row: Vec<f64> = record.iter().map(parse_cell).collect();
        if !table.push_row(row) {
            warn!(
                "Skipping line {} in {}: expected {} fields, saw {}",
                line,
                path.display(),
                table.columns().len(),
                record.len()
            );
            skipped += 1;
        }
    }

    debug!(
        "Loaded {} rows from {} ({} skipped)",
        table.len(),
        path.display(),
        skipped
    );
    Ok(table)
}
