//! `JobQueue` — the jobs of one domain in one zone.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use sw_agent::{Agent, AgentStore};
use sw_core::{AgentId, JobDomain, JobKey, JobRef, ZoneName};

use crate::{Job, JobKind, JobPatch, JobSelector, NewJob, TaskError, TaskResult};

/// Options of [`JobQueue::add_job`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Ask the next reconcile to pull agents off lower-priority jobs for
    /// this one.
    pub dispatch: bool,
}

impl AddOptions {
    pub fn dispatch() -> Self {
        Self { dispatch: true }
    }
}

/// Options of [`JobQueue::update_job`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub add_when_not_found: bool,
    /// Same as [`AddOptions::dispatch`], applied to the updated job.
    pub dispatch:           bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { add_when_not_found: true, dispatch: false }
    }
}

#[derive(Debug)]
pub struct JobQueue {
    zone:     ZoneName,
    domain:   JobDomain,
    /// Sorted by `Job::order_key`.
    jobs:     Vec<Job>,
    next_key: JobKey,
    next_seq: u64,
    /// Jobs that asked for preemption, in request order.
    dispatch: Vec<JobKey>,
}

impl JobQueue {
    pub fn new(zone: ZoneName, domain: JobDomain) -> Self {
        Self { zone, domain, jobs: Vec::new(), next_key: JobKey(0), next_seq: 0, dispatch: Vec::new() }
    }

    pub fn zone(&self) -> &ZoneName {
        &self.zone
    }

    pub fn domain(&self) -> JobDomain {
        self.domain
    }

    #[inline]
    fn job_ref(&self, key: JobKey) -> JobRef {
        JobRef::new(self.domain, key)
    }

    fn check_domain(&self, job: &JobKind) -> TaskResult<()> {
        if job.domain() != self.domain {
            return Err(TaskError::WrongDomain {
                kind:     job.tag().as_str(),
                expected: job.domain(),
                actual:   self.domain,
            });
        }
        Ok(())
    }

    fn position_for(&self, order: (bool, u32, u64)) -> usize {
        self.jobs.partition_point(|j| j.order_key() <= order)
    }

    // ── Producers ─────────────────────────────────────────────────────────

    /// Insert a job in priority order and return its key.
    pub fn add_job(&mut self, new: NewJob, opts: AddOptions) -> TaskResult<JobKey> {
        self.check_domain(&new.kind)?;
        let key = self.next_key;
        self.next_key = key.next();
        let job = new.into_job(key, self.next_seq);
        self.next_seq += 1;

        let at = self.position_for(job.order_key());
        debug!(zone = %self.zone, job = %self.job_ref(key), kind = %job.tag(), priority = ?job.priority, need = job.need, "job added");
        self.jobs.insert(at, job);
        if opts.dispatch {
            self.dispatch.push(key);
        }
        Ok(key)
    }

    /// Merge `patch` into the job with the same kind tag and requirement tag
    /// and return its new position.
    ///
    /// Lowering `need` below `assigned` releases the most recently added
    /// agents on that job.  Without a match the job is created when
    /// `opts.add_when_not_found` is set.
    pub fn update_job(
        &mut self,
        patch:  JobPatch,
        opts:   UpdateOptions,
        agents: &mut AgentStore,
    ) -> TaskResult<usize> {
        self.check_domain(&patch.kind)?;
        let tag = patch.kind.tag();
        let Some(idx) = self
            .jobs
            .iter()
            .position(|j| j.same_identity(tag, patch.requirement_tag.as_deref()))
        else {
            if !opts.add_when_not_found {
                return Err(TaskError::NotFound(format!("{tag} job in {}", self.zone)));
            }
            let key = self.add_job(patch.into_new_job(), AddOptions { dispatch: opts.dispatch })?;
            return self.position_of(key).ok_or_else(|| TaskError::NotFound(key.to_string()));
        };

        let mut job = self.jobs.remove(idx);
        job.kind = patch.kind;
        if let Some(p) = patch.priority {
            job.priority = Some(p);
        }
        if let (Some(units), Some(req)) = (patch.requirement_units, job.requirement.as_mut()) {
            req.units = units;
        }
        if let Some(roles) = patch.roles {
            job.roles = roles;
        }
        if let Some(need) = patch.need {
            job.need = need;
        }
        let key = job.key;

        // Shed agents beyond the new need, and any whose role is no longer
        // eligible.
        let job_ref = self.job_ref(key);
        let mut holders: Vec<AgentId> = agents.assigned_to(&self.zone, job_ref).map(|a| a.id).collect();
        holders.sort_unstable_by(|a, b| b.cmp(a));
        let mut kept = holders.len() as u32;
        for id in holders {
            let Some(agent) = agents.get_mut(id) else { continue };
            if kept > job.need || !job.accepts(agent.role) {
                debug!(zone = %self.zone, job = %job_ref, agent = %id, "released by update");
                if job.requirement_tag().is_some_and(|t| agent.has_capability(t)) {
                    job.requirement_assigned = job.requirement_assigned.saturating_sub(1);
                }
                agent.release_job();
                job.assigned = job.assigned.saturating_sub(1);
                kept -= 1;
            }
        }

        let at = self.position_for(job.order_key());
        self.jobs.insert(at, job);
        if opts.dispatch && !self.dispatch.contains(&key) {
            self.dispatch.push(key);
        }
        Ok(at)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn get_job(&self, key: JobKey) -> Option<&Job> {
        self.jobs.iter().find(|j| j.key == key)
    }

    pub fn get_job_mut(&mut self, key: JobKey) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.key == key)
    }

    /// Index of `key` in queue order.
    pub fn position_of(&self, key: JobKey) -> Option<usize> {
        self.jobs.iter().position(|j| j.key == key)
    }

    pub fn has_job(&self, selector: impl Into<JobSelector>) -> bool {
        let selector = selector.into();
        self.jobs.iter().any(|j| selector.matches(j))
    }

    /// Jobs in queue order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Job> + '_ {
        self.jobs.iter()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Remove every job `selector` matches and release the agents that
    /// referenced them.  Returns the removed keys.
    pub fn remove_job(
        &mut self,
        selector: impl Into<JobSelector>,
        agents:   &mut AgentStore,
    ) -> TaskResult<Vec<JobKey>> {
        let selector = selector.into();
        let removed: Vec<JobKey> = self.jobs.iter().filter(|j| selector.matches(j)).map(|j| j.key).collect();
        if removed.is_empty() {
            return Err(TaskError::NotFound(format!("{selector} in {} {}", self.zone, self.domain)));
        }
        self.jobs.retain(|j| !selector.matches(j));
        self.dispatch.retain(|k| !removed.contains(k));

        let refs: Vec<JobRef> = removed.iter().map(|&k| self.job_ref(k)).collect();
        for agent in agents.iter_mut() {
            if agent.zone == self.zone && agent.assigned.is_some_and(|r| refs.contains(&r)) {
                agent.release_job();
            }
        }
        info!(zone = %self.zone, domain = %self.domain, ?removed, "jobs removed");
        Ok(removed)
    }

    /// Remove everything, releasing all agents on this queue.
    pub fn clear(&mut self, agents: &mut AgentStore) {
        for agent in agents.iter_mut() {
            if agent.zone == self.zone && agent.assigned.is_some_and(|r| r.domain == self.domain) {
                agent.release_job();
            }
        }
        self.jobs.clear();
        self.dispatch.clear();
    }

    // ── Bookkeeping ───────────────────────────────────────────────────────

    /// Match `agent` to `key`.
    pub fn assign(&mut self, key: JobKey, agent: &mut Agent) -> TaskResult<()> {
        if agent.zone != self.zone {
            return Err(TaskError::ForeignAgent(agent.id));
        }
        if agent.assigned.is_some() {
            return Err(TaskError::Busy(agent.id));
        }
        let domain = self.domain;
        let job = self
            .get_job_mut(key)
            .ok_or_else(|| TaskError::NotFound(JobRef::new(domain, key).to_string()))?;
        if !job.accepts(agent.role) {
            return Err(TaskError::RoleMismatch { role: agent.role, key });
        }
        if job.is_full() {
            return Err(TaskError::CapacityExceeded(key));
        }
        job.assigned += 1;
        if job.requirement_tag().is_some_and(|t| agent.has_capability(t)) {
            job.requirement_assigned += 1;
        }
        agent.assigned = Some(JobRef::new(domain, key));
        agent.working = false;
        agent.standing = false;
        Ok(())
    }

    /// Undo `agent`'s assignment if it points into this queue.
    pub fn release(&mut self, agent: &mut Agent) -> bool {
        let Some(r) = agent.assigned.filter(|r| r.domain == self.domain) else {
            return false;
        };
        if agent.zone != self.zone {
            return false;
        }
        if let Some(job) = self.get_job_mut(r.key) {
            job.assigned = job.assigned.saturating_sub(1);
            if job.requirement_tag().is_some_and(|t| agent.has_capability(t)) {
                job.requirement_assigned = job.requirement_assigned.saturating_sub(1);
            }
        }
        agent.release_job();
        true
    }

    /// Recount `assigned` from the agent store.
    ///
    /// Agents referencing a key that no longer exists are released, and
    /// agents beyond a job's need are released newest first.  Returns how
    /// many agents were touched.
    pub fn sync(&mut self, agents: &mut AgentStore) -> usize {
        for job in &mut self.jobs {
            job.assigned = 0;
            job.requirement_assigned = 0;
        }
        let mut repaired = 0;
        // Newest agents last, so over-capacity trimming keeps the oldest.
        for agent in agents.iter_mut() {
            let Some(r) = agent.assigned else { continue };
            if agent.zone != self.zone || r.domain != self.domain {
                continue;
            }
            match self.jobs.iter_mut().find(|j| j.key == r.key) {
                Some(job) if !job.is_full() && job.accepts(agent.role) => {
                    job.assigned += 1;
                    if job.requirement_tag().is_some_and(|t| agent.has_capability(t)) {
                        job.requirement_assigned += 1;
                    }
                }
                Some(_) => {
                    warn!(zone = %self.zone, agent = %agent.id, job = %r, "agent over job capacity released");
                    agent.release_job();
                    repaired += 1;
                }
                None => {
                    debug!(zone = %self.zone, agent = %agent.id, job = %r, "dangling job reference released");
                    agent.release_job();
                    repaired += 1;
                }
            }
        }
        repaired
    }

    /// Drain pending preemption requests.
    pub fn take_dispatch_requests(&mut self) -> Vec<JobKey> {
        std::mem::take(&mut self.dispatch)
    }

    pub fn has_dispatch_requests(&self) -> bool {
        !self.dispatch.is_empty()
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Rebuild a queue from persisted job documents.
    ///
    /// Entries that fail to decode or belong to another domain are logged
    /// and skipped.  Returns the queue and the number of skipped entries.
    pub fn from_snapshot(zone: ZoneName, domain: JobDomain, entries: Vec<Value>) -> (Self, usize) {
        let mut queue = JobQueue::new(zone, domain);
        let mut skipped = 0;
        let mut seen = BTreeSet::new();
        for entry in entries {
            match serde_json::from_value::<Job>(entry) {
                Ok(job) if job.kind.domain() == domain && !seen.insert(job.key) => {
                    warn!(zone = %queue.zone, %domain, job = %job.key, "skipping duplicate job key");
                    skipped += 1;
                }
                Ok(job) if job.kind.domain() == domain => {
                    if job.key >= queue.next_key {
                        queue.next_key = job.key.next();
                    }
                    queue.next_seq = queue.next_seq.max(job.seq + 1);
                    queue.jobs.push(job);
                }
                Ok(job) => {
                    warn!(zone = %queue.zone, %domain, job = %job.key, kind = %job.tag(), "skipping job from another domain");
                    skipped += 1;
                }
                Err(e) => {
                    warn!(zone = %queue.zone, %domain, error = %e, "skipping malformed job");
                    skipped += 1;
                }
            }
        }
        queue.jobs.sort_by_key(|j| j.order_key());
        (queue, skipped)
    }

    /// Persisted form of every job, in queue order.
    pub fn to_snapshot(&self) -> Vec<Value> {
        self.jobs
            .iter()
            .filter_map(|j| match serde_json::to_value(j) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(zone = %self.zone, job = %self.job_ref(j.key), error = %e, "job not persisted");
                    None
                }
            })
            .collect()
    }
}
