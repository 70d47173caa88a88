use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::path::PathBuf;

use crate::history::error::HistoryError;

const TIME_COLUMN: &str = "time";

/// One CSV row keyed by column name.
pub type DischargeRecord = Map<String, Value>;

/// Reads per-battery discharge CSVs from a flat folder.
pub struct HistoryStore {
    base: PathBuf,
}

impl HistoryStore {
    pub fn new(base: PathBuf) -> Self {
        HistoryStore { base }
    }

    fn battery_path(&self, battery_id: &str) -> PathBuf {
        self.base.join(format!("B00{}_discharge.csv", battery_id))
    }

    /// All rows for a battery, ascending by `time`.
    pub fn load(&self, battery_id: &str) -> Result<Vec<DischargeRecord>, HistoryError> {
        if battery_id.is_empty() || !battery_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(HistoryError::NotFound(battery_id.to_string()));
        }

        let path = self.battery_path(battery_id);
        if !path.is_file() {
            return Err(HistoryError::NotFound(battery_id.to_string()));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let time_idx = headers
            .iter()
            .position(|h| h.trim() == TIME_COLUMN)
            .ok_or(HistoryError::MissingColumn(TIME_COLUMN))?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let time = record
                .get(time_idx)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            let row: DischargeRecord = headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.trim().to_string(), cell_value(cell)))
                .collect();
            rows.push((time, row));
        }

        rows.sort_by(|a, b| compare_time(a.0, b.0));
        log::debug!("Loaded {} rows from {}", rows.len(), path.display());

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}

// unparseable times go last
fn compare_time(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const HEADER: &str = "cycle,ambient_temperature,capacity,voltage_measured,current_measured,temperature_measured,current_load,voltage_load,time\n";

    fn store_with(files: &[(&str, &str)]) -> (TempDir, HistoryStore) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let store = HistoryStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn rows_are_sorted_by_time() {
        let csv = format!(
            "{HEADER}1,24,1.85,3.97,-2.01,24.6,-1.99,2.35,35.7\n1,24,1.85,4.19,-0.004,24.3,-0.0006,0.0,0.0\n1,24,1.85,4.18,-2.0,24.3,-1.99,3.06,16.7\n"
        );
        let (_dir, store) = store_with(&[("B0005_discharge.csv", &csv)]);

        let rows = store.load("05").unwrap();
        let times: Vec<f64> = rows.iter().map(|r| r["time"].as_f64().unwrap()).collect();
        assert_eq!(times, vec![0.0, 16.7, 35.7]);
    }

    #[test]
    fn cells_keep_their_json_types() {
        let csv = format!("{HEADER}3,24,1.85,4.19,-0.004,24.3,-0.0006,,0.0\n");
        let (_dir, store) = store_with(&[("B0006_discharge.csv", &csv)]);

        let rows = store.load("06").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cycle"], json!(3));
        assert_eq!(rows[0]["capacity"], json!(1.85));
        assert_eq!(rows[0]["voltage_load"], Value::Null);
        assert_eq!(rows[0].len(), 9);
    }

    #[test]
    fn unparseable_times_sort_last() {
        let csv = "cycle,time\n1,n/a\n1,20.0\n1,10.0\n";
        let (_dir, store) = store_with(&[("B0018_discharge.csv", csv)]);

        let rows = store.load("18").unwrap();
        assert_eq!(rows[0]["time"], json!(10.0));
        assert_eq!(rows[1]["time"], json!(20.0));
        assert_eq!(rows[2]["time"], json!("n/a"));
    }

    #[test]
    fn unknown_battery_is_not_found() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(store.load("999"), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn path_like_ids_are_not_found() {
        let (_dir, store) = store_with(&[("B0005_discharge.csv", HEADER)]);
        assert!(matches!(store.load("../05"), Err(HistoryError::NotFound(_))));
        assert!(matches!(store.load(""), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn missing_time_column_is_reported() {
        let (_dir, store) = store_with(&[("B0007_discharge.csv", "cycle,capacity\n1,1.8\n")]);
        assert!(matches!(
            store.load("07"),
            Err(HistoryError::MissingColumn("time"))
        ));
    }
}
