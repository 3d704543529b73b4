//! `DelayedTaskRegistry` — tick-keyed one-shot callbacks.
//!
//! Tasks live in a `BTreeMap<Tick, Vec<DelayedTask>>`, so draining is a walk
//! over the due prefix of the map and firing order is `(fire_at, insertion)`.
//!
//! The registry is generic over the zone type `Z` it hands to callbacks and
//! over shared state `S` lent to every callback alongside the zone.  The
//! swarm uses its own `Zone` record and its agent store, so a callback can
//! update or remove jobs and release their agents; tests use whatever is
//! convenient.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, error, warn};

use sw_core::{Tick, ZoneName};

use crate::{DelayPayload, DelayedTask, ScheduleError, ScheduleResult};

/// Error type callbacks may return.  Failures are logged, never propagated.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// A named delayed callback.
pub type DelayedCallback<Z, S = ()> =
    Box<dyn Fn(Resolved<'_, Z>, &mut S, &DelayedTask, &mut Rearm) -> Result<(), CallbackError> + Send + Sync>;

/// The zone named by a task's payload, as found at fire time.
pub enum Resolved<'a, Z> {
    Zone(&'a mut Z),
    /// The zone no longer exists.
    NotFound(&'a ZoneName),
}

impl<Z> Resolved<'_, Z> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolved::Zone(_))
    }
}

// ── Rearm ─────────────────────────────────────────────────────────────────────

/// Handle through which a firing callback schedules follow-up tasks.
///
/// Fire times are clamped to `now + 1`, so a task can never fire twice in
/// the same drain.
pub struct Rearm {
    now:     Tick,
    pending: Vec<DelayedTask>,
}

impl Rearm {
    fn new(now: Tick) -> Self {
        Self { now, pending: Vec::new() }
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn schedule(&mut self, name: impl Into<String>, payload: DelayPayload, fire_at: Tick) {
        let fire_at = fire_at.max(self.now.next());
        self.pending.push(DelayedTask::new(name, payload, fire_at));
    }

    /// Schedule `task` again, `delay` ticks from now.
    pub fn repeat(&mut self, task: &DelayedTask, delay: u64) {
        self.schedule(task.name.clone(), task.payload.clone(), self.now + delay);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ── DrainReport ───────────────────────────────────────────────────────────────

/// What one [`DelayedTaskRegistry::drain_due`] call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub fired:        usize,
    /// Fired with [`Resolved::NotFound`].
    pub missing_zone: usize,
    pub failed:       usize,
    pub rearmed:      usize,
}

// ── DelayedTaskRegistry ───────────────────────────────────────────────────────

pub struct DelayedTaskRegistry<Z, S = ()> {
    tasks:     BTreeMap<Tick, Vec<DelayedTask>>,
    callbacks: HashMap<String, DelayedCallback<Z, S>>,
    sealed:    bool,
    total:     usize,
}

impl<Z, S> Default for DelayedTaskRegistry<Z, S> {
    fn default() -> Self {
        Self { tasks: BTreeMap::new(), callbacks: HashMap::new(), sealed: false, total: 0 }
    }
}

impl<Z, S> DelayedTaskRegistry<Z, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `callback` to `name`.  Only allowed before [`seal`](Self::seal).
    pub fn register_callback<F>(&mut self, name: impl Into<String>, callback: F) -> ScheduleResult<()>
    where
        F: Fn(Resolved<'_, Z>, &mut S, &DelayedTask, &mut Rearm) -> Result<(), CallbackError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.sealed {
            return Err(ScheduleError::RegistrationClosed(name));
        }
        if self.callbacks.contains_key(&name) {
            return Err(ScheduleError::DuplicateCallback(name));
        }
        self.callbacks.insert(name, Box::new(callback));
        Ok(())
    }

    /// End the initialization phase.
    ///
    /// Fails with [`ScheduleError::UnboundTasks`] if any pending task names a
    /// callback that was never registered; the registry then stays open so
    /// the missing callbacks can still be added.
    pub fn seal(&mut self) -> ScheduleResult<()> {
        let mut unbound: Vec<String> = self
            .pending()
            .filter(|t| !self.callbacks.contains_key(&t.name))
            .map(|t| t.name.clone())
            .collect();
        if !unbound.is_empty() {
            unbound.sort();
            unbound.dedup();
            return Err(ScheduleError::UnboundTasks(unbound));
        }
        self.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn has_callback(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Queue a one-shot task.  After sealing, `name` must be registered.
    pub fn schedule(
        &mut self,
        name:    impl Into<String>,
        payload: DelayPayload,
        fire_at: Tick,
    ) -> ScheduleResult<()> {
        self.push(DelayedTask::new(name, payload, fire_at))
    }

    /// Re-queue tasks read back from a snapshot or seed file, keeping their
    /// order.  Stops at the first task with an unknown callback once sealed.
    pub fn restore(&mut self, tasks: impl IntoIterator<Item = DelayedTask>) -> ScheduleResult<()> {
        for task in tasks {
            self.push(task)?;
        }
        Ok(())
    }

    fn push(&mut self, task: DelayedTask) -> ScheduleResult<()> {
        if self.sealed && !self.callbacks.contains_key(&task.name) {
            return Err(ScheduleError::UnknownCallback(task.name));
        }
        self.tasks.entry(task.fire_at).or_default().push(task);
        self.total += 1;
        Ok(())
    }

    /// Fire and remove every task with `fire_at <= now`.
    ///
    /// Each callback receives the zone named by its payload, or
    /// [`Resolved::NotFound`] when `zones` has no such entry, plus `shared`.
    /// Callback failures are logged and counted; the drain always completes.
    pub fn drain_due(
        &mut self,
        now:    Tick,
        zones:  &mut BTreeMap<ZoneName, Z>,
        shared: &mut S,
    ) -> ScheduleResult<DrainReport> {
        if !self.sealed {
            return Err(ScheduleError::NotSealed);
        }
        let mut report = DrainReport::default();

        while let Some(entry) = self.tasks.first_entry() {
            if *entry.key() > now {
                break;
            }
            let due = entry.remove();
            self.total -= due.len();

            for task in due {
                let Some(callback) = self.callbacks.get(&task.name) else {
                    // Unreachable once sealed; kept so a bad restore can't panic.
                    warn!(task = %task.name, "dropping delayed task without callback");
                    report.failed += 1;
                    continue;
                };
                let mut rearm = Rearm::new(now);
                let resolved = match zones.get_mut(&task.payload.zone) {
                    Some(zone) => Resolved::Zone(zone),
                    None => {
                        report.missing_zone += 1;
                        Resolved::NotFound(&task.payload.zone)
                    }
                };
                report.fired += 1;
                debug!(task = %task.name, zone = %task.payload.zone, fire_at = %task.fire_at, "firing delayed task");
                if let Err(e) = callback(resolved, shared, &task, &mut rearm) {
                    error!(task = %task.name, zone = %task.payload.zone, error = %e, "delayed callback failed");
                    report.failed += 1;
                }

                for follow_up in rearm.pending {
                    match self.push(follow_up) {
                        Ok(()) => report.rearmed += 1,
                        Err(e) => {
                            error!(task = %task.name, error = %e, "rearm rejected");
                            report.failed += 1;
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// All pending tasks in firing order.
    pub fn pending(&self) -> impl Iterator<Item = &DelayedTask> + '_ {
        self.tasks.values().flatten()
    }

    /// Earliest pending fire time.
    pub fn next_fire_at(&self) -> Option<Tick> {
        self.tasks.keys().next().copied()
    }

    /// Drop every pending task (callbacks stay bound).
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.total = 0;
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
