//! `sw-task` — what needs doing, and who does it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`job`]        | `Job`, `JobKind`, `JobTag`, `Requirement`, `NewJob`, `JobPatch` |
//! | [`queue`]      | `JobQueue` — one zone, one domain, priority ordered           |
//! | [`board`]      | `TaskBoard` — the three queues of a zone                      |
//! | [`dispatcher`] | `Dispatcher::reconcile`, `Assignment`                         |
//! | [`error`]      | `TaskError`, `TaskResult<T>`                                  |
//!
//! # Ordering
//!
//! Jobs sort by `(priority, insertion)`.  A smaller priority number runs
//! first; a job without a priority sorts after every prioritized job.  Jobs
//! with equal priority keep insertion order.
//!
//! # Consistency
//!
//! For every job, `assigned` equals the number of agents whose `assigned`
//! reference names it, and `0 <= assigned <= need`.  Every mutation that
//! drops a job releases the agents referencing it in the same call.

pub mod board;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod queue;

#[cfg(test)]
mod tests;

pub use board::TaskBoard;
pub use dispatcher::{Assignment, Dispatcher};
pub use error::{TaskError, TaskResult};
pub use job::{Job, JobKind, JobPatch, JobSelector, JobTag, NewJob, Requirement};
pub use queue::{AddOptions, JobQueue, UpdateOptions};
