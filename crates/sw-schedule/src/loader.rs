//! CSV loader for delayed-task seeds.
//!
//! # CSV format
//!
//! One row per task.  `data` is a JSON document (quoted as a CSV field) and
//! may be left empty.
//!
//! ```csv
//! name,zone,fire_at,data
//! refill_towers,W1N1,10,
//! resign_controller,W1N1,1500,"{""text"":""outpost""}"
//! ```
//!
//! Rows are returned in file order; [`DelayedTaskRegistry::restore`]
//! preserves that order among tasks sharing a fire tick.
//!
//! [`DelayedTaskRegistry::restore`]: crate::DelayedTaskRegistry::restore

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use sw_core::{Tick, ZoneName};

use crate::{DelayPayload, DelayedTask, ScheduleError, ScheduleResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DelayedRecord {
    name:    String,
    zone:    String,
    fire_at: u64,
    #[serde(default)]
    data:    String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load delayed-task seeds from a CSV file.
pub fn load_delayed_csv(path: &Path) -> ScheduleResult<Vec<DelayedTask>> {
    let file = std::fs::File::open(path)?;
    load_delayed_reader(file)
}

/// Like [`load_delayed_csv`] but accepts any `Read` source.
pub fn load_delayed_reader<R: Read>(reader: R) -> ScheduleResult<Vec<DelayedTask>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut tasks = Vec::new();

    for (line, result) in csv_reader.deserialize::<DelayedRecord>().enumerate() {
        let rec = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        if rec.name.trim().is_empty() {
            return Err(ScheduleError::Parse(format!("row {}: empty task name", line + 1)));
        }
        let data = if rec.data.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&rec.data)
                .map_err(|e| ScheduleError::Parse(format!("row {}: bad data: {e}", line + 1)))?
        };
        tasks.push(DelayedTask::new(
            rec.name,
            DelayPayload { zone: ZoneName::new(rec.zone), data },
            Tick(rec.fire_at),
        ));
    }

    Ok(tasks)
}
