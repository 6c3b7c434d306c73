use crate::config::{Condition, ExperimentConfig, TableKey};
use crate::error::ScourResult;
use crate::store::DataStore;
use tracing::{debug, warn};

/// Mean inlet discharge of one condition, L/min.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanDischarge {
    pub condition: Condition,
    pub lpm: f64,
}

/// Drops zero discharge samples from each condition's table and averages
/// the rest.
///
/// The filtered table replaces the original in `store`. Zero readings are
/// valve or sensor transients. A table with nothing left after filtering
/// yields NaN, and so does a table without the discharge column; both are
/// logged and the remaining conditions are still processed. A discharge
/// table absent from the store is an error.
pub fn reduce_discharge(
    store: &mut DataStore,
    config: &ExperimentConfig,
) -> ScourResult<Vec<MeanDischarge>> {
    let column = &config.columns.discharge;
    let mut means = Vec::with_capacity(config.conditions.len());

    for condition in &config.conditions {
        let key = TableKey::discharge(condition);
        let table = store.get_mut(&key)?;

        let lpm = match table.column_index(column) {
            Some(idx) => {
                let before = table.len();
                table.retain_rows(|row| row[idx] != 0.0);
                debug!(
                    "{}: kept {} of {} discharge samples",
                    key,
                    table.len(),
                    before
                );
                table.mean(column).unwrap_or(f64::NAN)
            }
            None => {
                warn!(
                    "Column '{}' not found in {}",
                    column,
                    config.file_name(&key)
                );
                f64::NAN
            }
        };

        if lpm.is_nan() {
            warn!("No valid discharge samples for {}; mean is undefined", key);
        }
        means.push(MeanDischarge {
            condition: condition.clone(),
            lpm,
        });
    }

    Ok(means)
}
