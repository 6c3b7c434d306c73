use crate::config::{ExperimentConfig, TableKey};
use crate::error::{LoadError, ScourError, ScourResult};
use crate::io::table::{Table, load_table};
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Every measurement table of one run, keyed by variant and condition.
#[derive(Debug, Default)]
pub struct DataStore {
    tables: HashMap<TableKey, Table>,
}

/// Outcome of loading a batch of files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub failures: Vec<(TableKey, LoadError)>,
}

impl LoadReport {
    pub fn missing(&self) -> impl Iterator<Item = &TableKey> {
        self.failures
            .iter()
            .filter(|(_, e)| e.is_not_found())
            .map(|(key, _)| key)
    }
}

impl DataStore {
    pub fn new() -> Self {
        DataStore {
            tables: HashMap::new(),
        }
    }

    /// Loads every table the configuration names from `data_dir`.
    ///
    /// A file that cannot be read is reported and left out of the store;
    /// the rest of the batch still loads.
    pub fn load(config: &ExperimentConfig, data_dir: &Path, pb: &ProgressBar) -> (Self, LoadReport) {
        let mut store = DataStore::new();
        let mut report = LoadReport::default();

        let keys = config.table_keys();
        pb.set_length(keys.len() as u64);

        for key in keys {
            let file_name = config.file_name(&key);
            pb.set_message(file_name.clone());
            match load_table(&data_dir.join(&file_name)) {
                Ok(table) => {
                    store.insert(key, table);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push((key, e));
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "Loaded {} of {} tables from {}",
            report.loaded,
            report.loaded + report.failures.len(),
            data_dir.display()
        );
        (store, report)
    }

    pub fn insert(&mut self, key: TableKey, table: Table) {
        self.tables.insert(key, table);
    }

    pub fn contains(&self, key: &TableKey) -> bool {
        self.tables.contains_key(key)
    }

    pub fn get(&self, key: &TableKey) -> ScourResult<&Table> {
        self.tables
            .get(key)
            .ok_or_else(|| ScourError::MissingTable(key.clone()))
    }

    pub fn get_mut(&mut self, key: &TableKey) -> ScourResult<&mut Table> {
        self.tables
            .get_mut(key)
            .ok_or_else(|| ScourError::MissingTable(key.clone()))
    }
}
