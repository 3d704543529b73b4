//! Plain data row types written by output backends.

/// One agent matched to one job by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRow {
    pub tick:   u64,
    pub zone:   String,
    /// `domain#key`, e.g. `work#3`.
    pub job:    String,
    pub kind:   &'static str,
    pub agent:  u32,
}

/// Counters of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    pub delayed_fired: u64,
    pub assignments:   u64,
    pub turns:         u64,
    pub standby:       u64,
    pub flips:         u64,
    pub finished:      u64,
    pub errors:        u64,
    pub pending_jobs:  u64,
}
