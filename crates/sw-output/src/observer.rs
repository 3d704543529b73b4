//! `SwarmOutputObserver<W>` — bridges `SwarmObserver` to an `OutputWriter`.

use tracing::warn;

use sw_core::Tick;
use sw_sim::{SwarmObserver, TickReport};
use sw_task::Assignment;

use crate::row::{AssignmentRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SwarmObserver`] that writes assignments and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Assignments are buffered and written as one batch when the tick ends.
/// Errors from the writer are stored internally because `SwarmObserver`
/// methods have no return value.  After `swarm.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SwarmOutputObserver<W: OutputWriter> {
    writer:     W,
    pending:    Vec<AssignmentRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SwarmOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pending: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any) after `swarm.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  Needed after `run_ticks`, which never reaches
    /// `on_run_end`.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SwarmObserver for SwarmOutputObserver<W> {
    fn on_assignment(&mut self, tick: Tick, assignment: &Assignment) {
        self.pending.push(AssignmentRow {
            tick:  tick.0,
            zone:  assignment.zone.to_string(),
            job:   assignment.job.to_string(),
            kind:  assignment.tag.as_str(),
            agent: assignment.agent.0,
        });
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        if !self.pending.is_empty() {
            let rows = std::mem::take(&mut self.pending);
            let result = self.writer.write_assignments(&rows);
            self.store_err(result);
        }
        let row = TickSummaryRow {
            tick:          report.tick.0,
            delayed_fired: report.delayed.fired as u64,
            assignments:   report.assignments as u64,
            turns:         report.turns as u64,
            standby:       report.standby as u64,
            flips:         report.flips as u64,
            finished:      report.finished as u64,
            errors:        report.errors as u64,
            pending_jobs:  report.pending_jobs as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
