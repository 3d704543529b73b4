//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `assignments.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AssignmentRow, OutputResult, TickSummaryRow};

/// Writes swarm output to two CSV files.
pub struct CsvWriter {
    assignments: Writer<File>,
    summaries:   Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut assignments = Writer::from_path(dir.join("assignments.csv"))?;
        assignments.write_record(["tick", "zone", "job", "kind", "agent"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "delayed_fired",
            "assignments",
            "turns",
            "standby",
            "flips",
            "finished",
            "errors",
            "pending_jobs",
        ])?;

        Ok(Self { assignments, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()> {
        for row in rows {
            self.assignments.write_record(&[
                row.tick.to_string(),
                row.zone.clone(),
                row.job.clone(),
                row.kind.to_string(),
                row.agent.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.delayed_fired.to_string(),
            row.assignments.to_string(),
            row.turns.to_string(),
            row.standby.to_string(),
            row.flips.to_string(),
            row.finished.to_string(),
            row.errors.to_string(),
            row.pending_jobs.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.assignments.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
