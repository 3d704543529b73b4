//! `sw-output` — swarm output writers for the rust_swarm core.
//!
//! | Backend | Files created                             |
//! |---------|-------------------------------------------|
//! | CSV     | `assignments.csv`, `tick_summaries.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SwarmOutputObserver`], which implements `sw_sim::SwarmObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sw_output::{CsvWriter, SwarmOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SwarmOutputObserver::new(writer);
//! swarm.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SwarmOutputObserver;
pub use row::{AssignmentRow, TickSummaryRow};
pub use writer::OutputWriter;
