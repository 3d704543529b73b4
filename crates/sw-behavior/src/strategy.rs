//! The `JobStrategy` trait and the registry that maps job tags to strategies.

use std::collections::HashMap;

use sw_task::{Job, JobTag};

use crate::{BehaviorError, BehaviorResult, PhaseContext};

/// Per-kind job logic.
///
/// Every phase gets the agent's [`PhaseContext`] and a copy of the job it is
/// working on.  A phase returns `true` when it is finished:
///
/// - `prepare` returning `true` marks the agent ready for this job;
/// - `source` returning `true` switches the agent to the target phase;
/// - `target` returning `true` switches it back to the source phase.
///
/// Strategies whose jobs need no resources report `has_source() == false`;
/// their agents stay in the target phase.
pub trait JobStrategy: Send + Sync {
    /// One-off setup before the first source/target phase.
    ///
    /// Default: ready immediately.
    fn prepare(&self, _ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        true
    }

    fn has_source(&self) -> bool {
        true
    }

    /// Acquire what the target phase needs.
    ///
    /// Default: nothing to acquire.
    fn source(&self, _ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        true
    }

    /// Do the work.
    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool;
}

/// `JobTag -> strategy` table.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<JobTag, Box<dyn JobStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with every built-in strategy.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for (tag, strategy) in crate::builtin::all() {
            reg.strategies.insert(tag, strategy);
        }
        reg
    }

    /// Add a strategy; a second strategy for the same tag is an error.
    pub fn register(&mut self, tag: JobTag, strategy: impl JobStrategy + 'static) -> BehaviorResult<()> {
        if self.strategies.contains_key(&tag) {
            return Err(BehaviorError::DuplicateStrategy(tag));
        }
        self.strategies.insert(tag, Box::new(strategy));
        Ok(())
    }

    /// Add or replace the strategy for `tag`.
    pub fn replace(&mut self, tag: JobTag, strategy: impl JobStrategy + 'static) {
        self.strategies.insert(tag, Box::new(strategy));
    }

    pub fn get(&self, tag: JobTag) -> Option<&dyn JobStrategy> {
        self.strategies.get(&tag).map(|s| s.as_ref())
    }

    pub fn contains(&self, tag: JobTag) -> bool {
        self.strategies.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
