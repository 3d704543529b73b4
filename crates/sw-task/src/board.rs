//! `TaskBoard` — the three job queues of one zone.

use std::collections::BTreeMap;

use serde_json::Value;

use sw_agent::{Agent, AgentStore};
use sw_core::{JobDomain, JobKey, JobRef, ZoneName};

use crate::queue::{AddOptions, UpdateOptions};
use crate::{Job, JobPatch, JobQueue, JobSelector, NewJob, TaskError, TaskResult};

#[derive(Debug)]
pub struct TaskBoard {
    zone:             ZoneName,
    work:             JobQueue,
    transport:        JobQueue,
    center_transport: JobQueue,
}

impl TaskBoard {
    pub fn new(zone: impl Into<ZoneName>) -> Self {
        let zone = zone.into();
        Self {
            work:             JobQueue::new(zone.clone(), JobDomain::Work),
            transport:        JobQueue::new(zone.clone(), JobDomain::Transport),
            center_transport: JobQueue::new(zone.clone(), JobDomain::CenterTransport),
            zone,
        }
    }

    pub fn zone(&self) -> &ZoneName {
        &self.zone
    }

    pub fn queue(&self, domain: JobDomain) -> &JobQueue {
        match domain {
            JobDomain::Work            => &self.work,
            JobDomain::Transport       => &self.transport,
            JobDomain::CenterTransport => &self.center_transport,
        }
    }

    pub fn queue_mut(&mut self, domain: JobDomain) -> &mut JobQueue {
        match domain {
            JobDomain::Work            => &mut self.work,
            JobDomain::Transport       => &mut self.transport,
            JobDomain::CenterTransport => &mut self.center_transport,
        }
    }

    /// Queues in reconcile order.
    pub fn queues_mut(&mut self) -> [&mut JobQueue; 3] {
        [&mut self.work, &mut self.transport, &mut self.center_transport]
    }

    // ── Routing by kind ───────────────────────────────────────────────────

    /// Add `new` to the queue of its kind's domain.
    pub fn add_job(&mut self, new: NewJob, opts: AddOptions) -> TaskResult<JobRef> {
        let domain = new.kind.domain();
        let key = self.queue_mut(domain).add_job(new, opts)?;
        Ok(JobRef::new(domain, key))
    }

    pub fn update_job(
        &mut self,
        patch:  JobPatch,
        opts:   UpdateOptions,
        agents: &mut AgentStore,
    ) -> TaskResult<usize> {
        let domain = patch.kind.domain();
        self.queue_mut(domain).update_job(patch, opts, agents)
    }

    // ── Routing by reference ──────────────────────────────────────────────

    pub fn get(&self, job: JobRef) -> Option<&Job> {
        self.queue(job.domain).get_job(job.key)
    }

    pub fn contains(&self, job: JobRef) -> bool {
        self.get(job).is_some()
    }

    pub fn has_job(&self, domain: JobDomain, selector: impl Into<JobSelector>) -> bool {
        self.queue(domain).has_job(selector)
    }

    /// Remove one job and release its agents.
    pub fn remove(&mut self, job: JobRef, agents: &mut AgentStore) -> TaskResult<()> {
        self.queue_mut(job.domain).remove_job(job.key, agents).map(|_| ())
    }

    pub fn remove_job(
        &mut self,
        domain:   JobDomain,
        selector: impl Into<JobSelector>,
        agents:   &mut AgentStore,
    ) -> TaskResult<Vec<JobKey>> {
        self.queue_mut(domain).remove_job(selector, agents)
    }

    /// Match `agent` to `job`.
    pub fn assign(&mut self, job: JobRef, agent: &mut Agent) -> TaskResult<()> {
        self.queue_mut(job.domain).assign(job.key, agent)
    }

    /// Release `agent` from whatever job it holds on this board.
    pub fn release(&mut self, agent: &mut Agent) -> bool {
        match agent.assigned {
            Some(r) => self.queue_mut(r.domain).release(agent),
            None => false,
        }
    }

    pub fn sync(&mut self, agents: &mut AgentStore) -> usize {
        self.queues_mut().into_iter().map(|q| q.sync(agents)).sum()
    }

    pub fn job_count(&self) -> usize {
        JobDomain::ALL.iter().map(|&d| self.queue(d).len()).sum()
    }

    /// Jobs of every queue, domain by domain.
    pub fn iter(&self) -> impl Iterator<Item = (JobDomain, &Job)> + '_ {
        JobDomain::ALL
            .into_iter()
            .flat_map(move |d| self.queue(d).iter().map(move |j| (d, j)))
    }

    /// Find the job an agent points at, or `NotFound`.
    pub fn job_of(&self, agent: &Agent) -> TaskResult<&Job> {
        let r = agent
            .assigned
            .ok_or_else(|| TaskError::NotFound(format!("assignment of {}", agent.id)))?;
        self.get(r).ok_or_else(|| TaskError::NotFound(r.to_string()))
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    pub fn to_snapshot(&self) -> BTreeMap<JobDomain, Vec<Value>> {
        JobDomain::ALL.into_iter().map(|d| (d, self.queue(d).to_snapshot())).collect()
    }

    /// Rebuild a board; returns it with the number of skipped entries.
    pub fn from_snapshot(zone: impl Into<ZoneName>, mut queues: BTreeMap<JobDomain, Vec<Value>>) -> (Self, usize) {
        let zone = zone.into();
        let mut skipped = 0;
        let mut load = |domain: JobDomain| {
            let (q, s) = JobQueue::from_snapshot(zone.clone(), domain, queues.remove(&domain).unwrap_or_default());
            skipped += s;
            q
        };
        let work = load(JobDomain::Work);
        let transport = load(JobDomain::Transport);
        let center_transport = load(JobDomain::CenterTransport);
        (Self { zone, work, transport, center_transport }, skipped)
    }
}
