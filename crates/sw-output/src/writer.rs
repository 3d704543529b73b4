//! The `OutputWriter` trait implemented by backend writers.

use crate::{AssignmentRow, OutputResult, TickSummaryRow};

/// Sink for swarm output rows.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`SwarmOutputObserver::take_error`][crate::SwarmOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of assignments.
    fn write_assignments(&mut self, rows: &[AssignmentRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
