//! Swarm observer trait and the per-tick report.

use sw_behavior::{AgentTurn, FinishedJob};
use sw_core::{AgentId, Tick};
use sw_schedule::DrainReport;
use sw_task::Assignment;

/// Counters for one [`Swarm::step`][crate::Swarm::step].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick:         Tick,
    pub delayed:      DrainReport,
    /// New agent/job matches made by the dispatcher.
    pub assignments:  usize,
    /// Agents that ran a turn.
    pub turns:        usize,
    /// Turns spent on standby.
    pub standby:      usize,
    /// Source/target flips.
    pub flips:        usize,
    /// Jobs dropped as complete or invalid.
    pub finished:     usize,
    /// Agent turns that failed (unknown zone and the like).
    pub errors:       usize,
    /// Path-cache entries pruned at the end of the tick.
    pub pruned_paths: usize,
    /// Jobs left on every board after the tick.
    pub pending_jobs: usize,
}

impl TickReport {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            delayed:      DrainReport::default(),
            assignments:  0,
            turns:        0,
            standby:      0,
            flips:        0,
            finished:     0,
            errors:       0,
            pruned_paths: 0,
            pending_jobs: 0,
        }
    }
}

/// Callbacks invoked by [`Swarm::step`][crate::Swarm::step] and
/// [`Swarm::run`][crate::Swarm::run].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — finished-job counter
///
/// ```rust,ignore
/// struct Finished(usize);
///
/// impl SwarmObserver for Finished {
///     fn on_job_finished(&mut self, _tick: Tick, _agent: AgentId, _job: &FinishedJob) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SwarmObserver {
    /// Called at the very start of each tick, before delayed tasks fire.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every match the dispatcher makes.
    fn on_assignment(&mut self, _tick: Tick, _assignment: &Assignment) {}

    /// Called after each agent turn.
    fn on_agent_turn(&mut self, _tick: Tick, _turn: &AgentTurn) {}

    /// Called when `agent`'s strategy finished its job and the job was
    /// dropped.
    fn on_job_finished(&mut self, _tick: Tick, _agent: AgentId, _job: &FinishedJob) {}

    /// Called at the end of each tick, after the snapshot flush.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called once after the final tick of [`Swarm::run`][crate::Swarm::run].
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`SwarmObserver`] that does nothing.
pub struct NoopObserver;

impl SwarmObserver for NoopObserver {}
