//! `Dispatcher` — matches idle agents of a zone to its jobs.
//!
//! # Algorithm (per queue, in domain order)
//!
//! 1. `sync` the queue against the agent store.
//! 2. For each pending dispatch request, count the idle agents that can
//!    fill the requesting job.  Slots they cannot cover are taken from
//!    agents holding jobs of strictly lower priority, lowest first, and
//!    those agents move straight to the requesting job.
//! 3. Walk the queue in order.  For each job with a deficit, first fill the
//!    open requirement slots with idle tagged agents, then fill the
//!    remaining unreserved slots with any idle eligible agent.  Candidates
//!    are taken in agent insertion order.

use tracing::debug;

use sw_agent::{Agent, AgentStore};
use sw_core::{AgentId, JobRef, ZoneName};

use crate::{JobQueue, JobTag, TaskBoard, TaskError};

/// One agent matched to one job by a reconcile pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub zone:  ZoneName,
    pub job:   JobRef,
    pub tag:   JobTag,
    pub agent: AgentId,
}

pub struct Dispatcher;

impl Dispatcher {
    /// Reconcile every queue of `board` with the agents of its zone.
    pub fn reconcile(board: &mut TaskBoard, agents: &mut AgentStore) -> Vec<Assignment> {
        let mut out = Vec::new();
        for queue in board.queues_mut() {
            Self::reconcile_queue(queue, agents, &mut out);
        }
        out
    }

    /// Reconcile a single queue, appending new matches to `out`.
    pub fn reconcile_queue(queue: &mut JobQueue, agents: &mut AgentStore, out: &mut Vec<Assignment>) {
        queue.sync(agents);
        Self::preempt(queue, agents, out);

        let zone = queue.zone().clone();
        let keys: Vec<_> = queue.iter().filter(|j| j.deficit() > 0).map(|j| j.key).collect();
        for key in keys {
            let Some(job) = queue.get_job(key) else { continue };
            let idle: Vec<(AgentId, bool)> = agents
                .in_zone(&zone)
                .filter(|a| a.is_idle() && job.accepts(a.role))
                .map(|a| (a.id, job.requirement_tag().is_some_and(|t| a.has_capability(t))))
                .collect();
            if idle.is_empty() {
                continue;
            }

            // Requirement slots first, then whatever is not reserved.
            let reserved = job.requirement_deficit().min(job.deficit());
            let tagged: Vec<AgentId> = idle.iter().filter(|(_, t)| *t).map(|(id, _)| *id).take(reserved as usize).collect();
            let open_after = job.deficit() - tagged.len() as u32;
            let reserved_after = reserved - tagged.len() as u32;
            let general: Vec<AgentId> = idle
                .iter()
                .map(|(id, _)| *id)
                .filter(|id| !tagged.contains(id))
                .take(open_after.saturating_sub(reserved_after) as usize)
                .collect();
            let tag = job.tag();

            for id in tagged.into_iter().chain(general) {
                let Some(agent) = agents.get_mut(id) else { continue };
                match queue.assign(key, agent) {
                    Ok(()) => {
                        let job_ref = JobRef::new(queue.domain(), key);
                        debug!(zone = %zone, job = %job_ref, kind = %tag, agent = %id, "assigned");
                        out.push(Assignment { zone: zone.clone(), job: job_ref, tag, agent: id });
                    }
                    Err(TaskError::CapacityExceeded(_)) => break,
                    Err(e) => debug!(zone = %zone, agent = %id, error = %e, "assignment rejected"),
                }
            }
        }
    }

    /// Move agents from lower-priority jobs onto jobs that asked for
    /// preemption.
    ///
    /// Idle eligible agents are counted first; only the slots they cannot
    /// cover are taken from donors.  Taken agents are assigned to the
    /// requesting job directly.
    fn preempt(queue: &mut JobQueue, agents: &mut AgentStore, out: &mut Vec<Assignment>) {
        let zone = queue.zone().clone();
        for key in queue.take_dispatch_requests() {
            let Some(job) = queue.get_job(key) else { continue };
            if job.deficit() == 0 {
                continue;
            }
            let requirement = job.requirement_tag().map(str::to_owned);
            let carries = |a: &Agent| requirement.as_deref().is_some_and(|t| a.has_capability(t));

            let (mut idle_tagged, mut idle_plain) = (0u32, 0u32);
            for a in agents.in_zone(&zone).filter(|a| a.is_idle() && job.accepts(a.role)) {
                if carries(a) {
                    idle_tagged += 1;
                } else {
                    idle_plain += 1;
                }
            }
            let reserved = job.requirement_deficit().min(job.deficit());
            let open = job.deficit() - reserved;
            let tagged_left = idle_tagged.saturating_sub(reserved);
            let mut want_tagged = reserved.saturating_sub(idle_tagged);
            let mut want_open = open.saturating_sub(idle_plain + tagged_left);
            if want_tagged + want_open == 0 {
                continue;
            }

            // Lowest priority first; newest holder first within a donor.
            let donors: Vec<_> = queue.jobs().iter().rev().filter(|d| job.outranks(d)).map(|d| d.key).collect();
            let mut victims = Vec::new();
            'donors: for donor in donors {
                let donor_ref = JobRef::new(queue.domain(), donor);
                let holders: Vec<(AgentId, bool)> = agents
                    .assigned_to(&zone, donor_ref)
                    .filter(|a| job.accepts(a.role))
                    .map(|a| (a.id, carries(a)))
                    .collect();
                for (id, tagged) in holders.into_iter().rev() {
                    if tagged && want_tagged > 0 {
                        want_tagged -= 1;
                    } else if want_open > 0 {
                        want_open -= 1;
                    } else {
                        continue;
                    }
                    victims.push(id);
                    if want_tagged + want_open == 0 {
                        break 'donors;
                    }
                }
            }

            let tag = job.tag();
            let job_ref = JobRef::new(queue.domain(), key);
            for id in victims {
                let Some(agent) = agents.get_mut(id) else { continue };
                debug!(zone = %zone, agent = %id, from = ?agent.assigned, to = %job_ref, "preempted");
                queue.release(agent);
                match queue.assign(key, agent) {
                    Ok(()) => out.push(Assignment { zone: zone.clone(), job: job_ref, tag, agent: id }),
                    Err(e) => debug!(zone = %zone, agent = %id, error = %e, "preempted agent not reassigned"),
                }
            }
        }
    }
}
