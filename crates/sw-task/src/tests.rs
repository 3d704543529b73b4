//! Unit tests for sw-task.

use sw_agent::{AgentBuilder, AgentStore};
use sw_core::{AgentId, ObjectId, Role};

use crate::{JobKind, NewJob};

// ── Helpers ───────────────────────────────────────────────────────────────────

const ZONE: &str = "W1N1";

fn build(site: u32) -> JobKind {
    JobKind::Build { site: ObjectId(site) }
}

fn build_job(site: u32) -> NewJob {
    NewJob::new(build(site))
}

/// Insert a spawned (dispatchable) agent.
fn worker(agents: &mut AgentStore, role: Role) -> AgentId {
    agents.insert(AgentBuilder::new(role, ZONE).spawned())
}

fn tagged_worker(agents: &mut AgentStore, tag: &str) -> AgentId {
    agents.insert(AgentBuilder::new(Role::Worker, ZONE).spawned().capability(tag))
}

// ── Job ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod job {
    use serde_json::json;
    use sw_core::{JobDomain, ObjectId, Role};

    use crate::{Job, JobKind, JobTag, NewJob};

    #[test]
    fn kind_tag_and_domain() {
        assert_eq!(JobKind::FillExtensions.tag(), JobTag::FillExtensions);
        assert_eq!(JobKind::FillExtensions.domain(), JobDomain::Transport);
        let shuttle = JobKind::Shuttle { from: ObjectId(1), to: ObjectId(2), amount: 100 };
        assert_eq!(shuttle.domain(), JobDomain::CenterTransport);
        assert!(JobTag::ALL.iter().filter(|t| t.domain() == JobDomain::Work).count() == 5);
    }

    #[test]
    fn default_roles_follow_domain() {
        let job = NewJob::new(JobKind::FillExtensions).into_job(sw_core::JobKey(0), 0);
        assert_eq!(job.roles, vec![Role::Manager]);
        let custom = NewJob::new(JobKind::FillExtensions).roles([Role::Worker]).into_job(sw_core::JobKey(1), 1);
        assert!(custom.accepts(Role::Worker));
        assert!(!custom.accepts(Role::Manager));
    }

    #[test]
    fn serializes_with_type_tag() {
        let job = NewJob::new(JobKind::FillTower { tower: ObjectId(7) }).priority(2).into_job(sw_core::JobKey(3), 0);
        let v = serde_json::to_value(&job).unwrap();
        assert_eq!(v["type"], json!("fill_tower"));
        assert_eq!(v["tower"], json!(7));
        assert_eq!(v["key"], json!(3));
        let back: Job = serde_json::from_value(v).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn outranks_treats_unprioritized_as_lowest() {
        let a = NewJob::new(JobKind::FillExtensions).priority(1).into_job(sw_core::JobKey(0), 0);
        let b = NewJob::new(JobKind::FillExtensions).priority(4).into_job(sw_core::JobKey(1), 1);
        let c = NewJob::new(JobKind::FillExtensions).into_job(sw_core::JobKey(2), 2);
        assert!(a.outranks(&b));
        assert!(!b.outranks(&a));
        assert!(b.outranks(&c));
        assert!(!c.outranks(&c));
        assert!(!a.outranks(&a));
    }

    #[test]
    fn requirement_deficit_is_capped_by_need() {
        let mut job = NewJob::new(JobKind::FillExtensions).need(2).requirement("heavy", 5).into_job(sw_core::JobKey(0), 0);
        assert_eq!(job.requirement_deficit(), 2);
        job.requirement_assigned = 1;
        assert_eq!(job.requirement_deficit(), 1);
    }
}

// ── JobQueue ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use super::*;
    use sw_agent::Lifecycle;
    use sw_core::{JobDomain, JobKey, JobRef, ZoneName};

    use crate::{AddOptions, JobPatch, JobQueue, JobTag, TaskError, UpdateOptions};

    fn work_queue() -> JobQueue {
        JobQueue::new(ZoneName::new(ZONE), JobDomain::Work)
    }

    fn order(q: &JobQueue) -> Vec<u32> {
        q.iter().map(|j| j.key.0).collect()
    }

    #[test]
    fn priority_order_with_fifo_ties_and_unprioritized_last() {
        let mut q = work_queue();
        let a = q.add_job(build_job(1).priority(5), AddOptions::default()).unwrap();
        let b = q.add_job(build_job(2), AddOptions::default()).unwrap();
        let c = q.add_job(build_job(3).priority(1), AddOptions::default()).unwrap();
        let d = q.add_job(build_job(4).priority(5), AddOptions::default()).unwrap();
        let e = q.add_job(build_job(5), AddOptions::default()).unwrap();
        assert_eq!(order(&q), vec![c.0, a.0, d.0, b.0, e.0]);
        let lowest_first: Vec<u32> = q.iter().rev().map(|j| j.key.0).collect();
        assert_eq!(lowest_first, vec![e.0, b.0, d.0, a.0, c.0]);
    }

    #[test]
    fn wrong_domain_is_rejected() {
        let mut q = work_queue();
        let err = q.add_job(NewJob::new(JobKind::FillExtensions), AddOptions::default()).unwrap_err();
        assert!(matches!(err, TaskError::WrongDomain { expected: JobDomain::Transport, actual: JobDomain::Work, .. }));
    }

    #[test]
    fn update_merges_and_resorts() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        q.add_job(NewJob::new(JobKind::Upgrade { controller: ObjectId(1) }).priority(3), AddOptions::default()).unwrap();
        let b = q.add_job(build_job(9).priority(5), AddOptions::default()).unwrap();

        let pos = q.update_job(JobPatch::new(build(10)).priority(1).need(4), UpdateOptions::default(), &mut agents).unwrap();
        assert_eq!(pos, 0);
        let job = q.get_job(b).unwrap();
        assert_eq!(job.priority, Some(1));
        assert_eq!(job.need, 4);
        assert_eq!(job.kind, build(10));
        assert_eq!(q.position_of(b), Some(0));
    }

    #[test]
    fn update_missing_job() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let err = q.update_job(JobPatch::new(build(1)), UpdateOptions::default(), &mut agents).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
        assert!(!q.has_job(JobTag::Build));

        let pos = q.update_job(JobPatch::new(build(1)).need(2), UpdateOptions::upsert(), &mut agents).unwrap();
        assert_eq!(pos, 0);
        assert!(q.has_job(JobTag::Build));
        assert_eq!(q.iter().next().unwrap().need, 2);
    }

    #[test]
    fn update_distinguishes_requirement_tags() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let plain = q.add_job(build_job(1), AddOptions::default()).unwrap();
        let heavy = q.add_job(build_job(1).requirement("heavy", 1), AddOptions::default()).unwrap();

        q.update_job(JobPatch::new(build(1)).requirement("heavy", 2).need(3), UpdateOptions::default(), &mut agents)
            .unwrap();
        assert_eq!(q.get_job(plain).unwrap().need, 1);
        let h = q.get_job(heavy).unwrap();
        assert_eq!(h.need, 3);
        assert_eq!(h.requirement.as_ref().unwrap().units, 2);
    }

    #[test]
    fn lowering_need_releases_newest_agents() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let key = q.add_job(build_job(1).need(3), AddOptions::default()).unwrap();
        let ids: Vec<_> = (0..3).map(|_| worker(&mut agents, Role::Worker)).collect();
        for &id in &ids {
            q.assign(key, agents.get_mut(id).unwrap()).unwrap();
        }
        q.update_job(JobPatch::new(build(1)).need(1), UpdateOptions::default(), &mut agents).unwrap();
        assert_eq!(q.get_job(key).unwrap().assigned, 1);
        assert!(agents.get(ids[0]).unwrap().assigned.is_some());
        assert!(agents.get(ids[1]).unwrap().assigned.is_none());
        assert!(agents.get(ids[2]).unwrap().assigned.is_none());
    }

    #[test]
    fn remove_releases_agents() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let key = q.add_job(build_job(1).need(2), AddOptions::default()).unwrap();
        let other = q.add_job(build_job(2), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        let b = worker(&mut agents, Role::Builder);
        q.assign(key, agents.get_mut(a).unwrap()).unwrap();
        q.assign(other, agents.get_mut(b).unwrap()).unwrap();
        {
            let agent = agents.get_mut(a).unwrap();
            agent.lifecycle = Lifecycle::Prepared;
            agent.prepared_for = agent.assigned;
            agent.working = true;
        }

        let removed = q.remove_job(key, &mut agents).unwrap();
        assert_eq!(removed, vec![key]);
        assert!(!q.has_job(key));
        let agent = agents.get(a).unwrap();
        assert_eq!(agent.assigned, None);
        assert_eq!(agent.lifecycle, Lifecycle::Unprepared);
        assert!(!agent.working);
        assert_eq!(agents.get(b).unwrap().assigned, Some(JobRef::new(JobDomain::Work, other)));
    }

    #[test]
    fn remove_by_tag_takes_every_match() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        q.add_job(build_job(1), AddOptions::default()).unwrap();
        q.add_job(build_job(2), AddOptions::default()).unwrap();
        let up = q.add_job(NewJob::new(JobKind::Upgrade { controller: ObjectId(5) }), AddOptions::default()).unwrap();
        let removed = q.remove_job(JobTag::Build, &mut agents).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(order(&q), vec![up.0]);
        assert!(matches!(q.remove_job(JobTag::Build, &mut agents), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn assign_checks() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let key = q.add_job(build_job(1), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        let b = worker(&mut agents, Role::Worker);
        let m = worker(&mut agents, Role::Manager);
        let far = agents.insert(AgentBuilder::new(Role::Worker, "W9N9").spawned());

        assert!(matches!(q.assign(key, agents.get_mut(m).unwrap()), Err(TaskError::RoleMismatch { .. })));
        assert!(matches!(q.assign(key, agents.get_mut(far).unwrap()), Err(TaskError::ForeignAgent(_))));
        q.assign(key, agents.get_mut(a).unwrap()).unwrap();
        assert!(matches!(q.assign(key, agents.get_mut(a).unwrap()), Err(TaskError::Busy(_))));
        assert!(matches!(q.assign(key, agents.get_mut(b).unwrap()), Err(TaskError::CapacityExceeded(_))));
        assert!(matches!(q.assign(JobKey(99), agents.get_mut(b).unwrap()), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn release_decrements_counts() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let key = q.add_job(build_job(1).need(2).requirement("heavy", 1), AddOptions::default()).unwrap();
        let a = tagged_worker(&mut agents, "heavy");
        q.assign(key, agents.get_mut(a).unwrap()).unwrap();
        assert_eq!(q.get_job(key).unwrap().requirement_assigned, 1);
        assert!(q.release(agents.get_mut(a).unwrap()));
        let job = q.get_job(key).unwrap();
        assert_eq!((job.assigned, job.requirement_assigned), (0, 0));
        assert!(!q.release(agents.get_mut(a).unwrap()));
    }

    #[test]
    fn sync_repairs_external_changes() {
        let mut q = work_queue();
        let mut agents = AgentStore::new();
        let key = q.add_job(build_job(1).need(2), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        let b = worker(&mut agents, Role::Worker);
        q.assign(key, agents.get_mut(a).unwrap()).unwrap();
        q.assign(key, agents.get_mut(b).unwrap()).unwrap();

        // One holder vanishes, another agent points at a key that never existed.
        agents.remove(a);
        let c = worker(&mut agents, Role::Worker);
        agents.get_mut(c).unwrap().assigned = Some(JobRef::new(JobDomain::Work, JobKey(42)));

        assert_eq!(q.sync(&mut agents), 1);
        assert_eq!(q.get_job(key).unwrap().assigned, 1);
        assert_eq!(agents.get(c).unwrap().assigned, None);
    }
}

// ── TaskBoard ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod board {
    use super::*;
    use sw_core::JobDomain;

    use crate::{AddOptions, JobTag, TaskBoard};

    #[test]
    fn routes_by_kind() {
        let mut board = TaskBoard::new(ZONE);
        let w = board.add_job(build_job(1), AddOptions::default()).unwrap();
        let t = board.add_job(NewJob::new(JobKind::FillExtensions), AddOptions::default()).unwrap();
        assert_eq!(w.domain, JobDomain::Work);
        assert_eq!(t.domain, JobDomain::Transport);
        assert_eq!(board.job_count(), 2);
        assert!(board.has_job(JobDomain::Transport, JobTag::FillExtensions));
        assert!(!board.has_job(JobDomain::Work, JobTag::FillExtensions));
        assert_eq!(board.get(t).unwrap().tag(), JobTag::FillExtensions);
    }

    #[test]
    fn release_routes_to_the_agent_queue() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let t = board.add_job(NewJob::new(JobKind::FillExtensions), AddOptions::default()).unwrap();
        let m = worker(&mut agents, Role::Manager);
        board.assign(t, agents.get_mut(m).unwrap()).unwrap();
        assert_eq!(board.job_of(agents.get(m).unwrap()).unwrap().key, t.key);
        assert!(board.release(agents.get_mut(m).unwrap()));
        assert_eq!(board.get(t).unwrap().assigned, 0);
        assert!(board.job_of(agents.get(m).unwrap()).is_err());
    }

    #[test]
    fn remove_releases_agents() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let job = board.add_job(build_job(3), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        board.assign(job, agents.get_mut(a).unwrap()).unwrap();
        board.remove(job, &mut agents).unwrap();
        assert!(!board.contains(job));
        assert!(agents.get(a).unwrap().assigned.is_none());
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatcher {
    use super::*;
    use sw_core::JobDomain;

    use crate::{AddOptions, Dispatcher, TaskBoard};

    #[test]
    fn fills_in_insertion_order_and_is_idempotent() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let job = board.add_job(build_job(1).need(2), AddOptions::default()).unwrap();
        let ids: Vec<_> = (0..3).map(|_| worker(&mut agents, Role::Worker)).collect();

        let first = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(first.iter().map(|a| a.agent).collect::<Vec<_>>(), vec![ids[0], ids[1]]);
        assert!(first.iter().all(|a| a.job == job));
        assert_eq!(board.get(job).unwrap().assigned, 2);
        assert!(agents.get(ids[2]).unwrap().assigned.is_none());

        assert!(Dispatcher::reconcile(&mut board, &mut agents).is_empty());
    }

    #[test]
    fn spawning_agents_wait() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        board.add_job(build_job(1), AddOptions::default()).unwrap();
        agents.insert(AgentBuilder::new(Role::Worker, ZONE));
        assert!(Dispatcher::reconcile(&mut board, &mut agents).is_empty());
    }

    #[test]
    fn roles_select_the_queue() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let work = board.add_job(build_job(1), AddOptions::default()).unwrap();
        let haul = board.add_job(NewJob::new(JobKind::FillExtensions), AddOptions::default()).unwrap();
        let m = worker(&mut agents, Role::Manager);
        worker(&mut agents, Role::Harvester);

        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].agent, m);
        assert_eq!(got[0].job, haul);
        assert_eq!(board.get(work).unwrap().assigned, 0);
    }

    #[test]
    fn higher_priority_is_served_first() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let low = board.add_job(build_job(1).priority(9), AddOptions::default()).unwrap();
        let high = board.add_job(build_job(2).priority(1), AddOptions::default()).unwrap();
        worker(&mut agents, Role::Worker);
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].job, high);
        assert_eq!(board.get(low).unwrap().assigned, 0);
    }

    #[test]
    fn requirement_slots_are_reserved() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let job = board.add_job(build_job(1).need(3).requirement("heavy", 1), AddOptions::default()).unwrap();
        for _ in 0..3 {
            worker(&mut agents, Role::Worker);
        }
        assert_eq!(Dispatcher::reconcile(&mut board, &mut agents).len(), 2);
        assert_eq!(board.get(job).unwrap().requirement_deficit(), 1);

        let heavy = tagged_worker(&mut agents, "heavy");
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].agent, heavy);
        let j = board.get(job).unwrap();
        assert_eq!((j.assigned, j.requirement_assigned), (3, 1));
    }

    #[test]
    fn tagged_agents_fill_requirement_before_order() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        board.add_job(build_job(1).need(2).requirement("heavy", 1), AddOptions::default()).unwrap();
        let plain0 = worker(&mut agents, Role::Worker);
        let plain1 = worker(&mut agents, Role::Worker);
        let heavy = tagged_worker(&mut agents, "heavy");

        let got: Vec<_> = Dispatcher::reconcile(&mut board, &mut agents).into_iter().map(|a| a.agent).collect();
        assert_eq!(got, vec![heavy, plain0]);
        assert!(agents.get(plain1).unwrap().assigned.is_none());
    }

    #[test]
    fn dispatch_preempts_lower_priority() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let low = board.add_job(build_job(1).priority(5).need(2), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        let b = worker(&mut agents, Role::Worker);
        Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(board.get(low).unwrap().assigned, 2);

        let urgent = board.add_job(build_job(2).priority(1), AddOptions::dispatch()).unwrap();
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].agent, b);
        assert_eq!(got[0].job, urgent);
        assert_eq!(agents.get(a).unwrap().assigned, Some(low));
        assert_eq!(board.get(low).unwrap().assigned, 1);

        assert!(Dispatcher::reconcile(&mut board, &mut agents).is_empty());
    }

    #[test]
    fn dispatch_takes_idle_agents_before_working_ones() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let low = board.add_job(build_job(1).priority(5), AddOptions::default()).unwrap();
        let busy = worker(&mut agents, Role::Worker);
        Dispatcher::reconcile(&mut board, &mut agents);
        agents.get_mut(busy).unwrap().working = true;
        let idle = worker(&mut agents, Role::Worker);

        let urgent = board.add_job(build_job(2).priority(1), AddOptions::dispatch()).unwrap();
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!((got[0].agent, got[0].job), (idle, urgent));
        let b = agents.get(busy).unwrap();
        assert_eq!(b.assigned, Some(low));
        assert!(b.working);
        assert_eq!(board.get(low).unwrap().assigned, 1);
    }

    #[test]
    fn dispatch_takes_tagged_holder_for_requirement_slot() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let low = board.add_job(build_job(1).priority(5).need(2), AddOptions::default()).unwrap();
        let heavy = tagged_worker(&mut agents, "heavy");
        let plain = worker(&mut agents, Role::Worker);
        Dispatcher::reconcile(&mut board, &mut agents);

        let urgent = board
            .add_job(build_job(2).priority(1).requirement("heavy", 1), AddOptions::dispatch())
            .unwrap();
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!((got[0].agent, got[0].job), (heavy, urgent));
        assert_eq!(agents.get(plain).unwrap().assigned, Some(low));
        let j = board.get(urgent).unwrap();
        assert_eq!((j.assigned, j.requirement_assigned), (1, 1));
    }

    #[test]
    fn without_dispatch_new_job_waits() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        board.add_job(build_job(1).priority(5), AddOptions::default()).unwrap();
        worker(&mut agents, Role::Worker);
        Dispatcher::reconcile(&mut board, &mut agents);
        let urgent = board.add_job(build_job(2).priority(1), AddOptions::default()).unwrap();
        assert!(Dispatcher::reconcile(&mut board, &mut agents).is_empty());
        assert_eq!(board.get(urgent).unwrap().assigned, 0);
    }

    #[test]
    fn vanished_agent_is_replaced() {
        let mut board = TaskBoard::new(ZONE);
        let mut agents = AgentStore::new();
        let job = board.add_job(build_job(1), AddOptions::default()).unwrap();
        let a = worker(&mut agents, Role::Worker);
        Dispatcher::reconcile(&mut board, &mut agents);
        agents.remove(a);
        let b = worker(&mut agents, Role::Worker);
        let got = Dispatcher::reconcile(&mut board, &mut agents);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].agent, b);
        assert_eq!(board.get(job).unwrap().assigned, 1);
        assert_eq!(got[0].job.domain, JobDomain::Work);
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use serde_json::json;
    use sw_core::{JobDomain, ZoneName};

    use super::*;
    use crate::{AddOptions, JobQueue, TaskBoard};

    #[test]
    fn board_round_trip_keeps_order_and_keys() {
        let mut board = TaskBoard::new(ZONE);
        board.add_job(build_job(1).priority(3), AddOptions::default()).unwrap();
        board.add_job(build_job(2).priority(1), AddOptions::default()).unwrap();
        board.add_job(NewJob::new(JobKind::FillExtensions), AddOptions::default()).unwrap();

        let (mut restored, skipped) = TaskBoard::from_snapshot(ZONE, board.to_snapshot());
        assert_eq!(skipped, 0);
        let keys = |b: &TaskBoard| b.queue(JobDomain::Work).iter().map(|j| j.key).collect::<Vec<_>>();
        assert_eq!(keys(&restored), keys(&board));

        let next = restored.add_job(build_job(3), AddOptions::default()).unwrap();
        assert_eq!(next.key.0, 2);
    }

    #[test]
    fn every_job_kind_is_persisted() {
        let mut q = JobQueue::new(ZoneName::new(ZONE), JobDomain::Work);
        q.add_job(build_job(1), AddOptions::default()).unwrap();
        q.add_job(NewJob::new(JobKind::Sign { controller: ObjectId(2), text: "ours".into() }), AddOptions::default())
            .unwrap();
        q.add_job(build_job(3).requirement("heavy", 1).need(2), AddOptions::default()).unwrap();
        let entries = q.to_snapshot();
        assert_eq!(entries.len(), q.len());
        assert_eq!(entries[1]["text"], json!("ours"));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let entries = vec![
            json!({"key": 0, "type": "build", "site": 4, "priority": 2, "requirement": null, "need": 1, "roles": ["worker"]}),
            json!({"key": 1, "type": "teleport", "priority": 1, "requirement": null, "need": 1, "roles": ["worker"]}),
            json!({"key": 2, "type": "build", "site": 5, "priority": null, "requirement": null, "roles": ["worker"]}),
            json!({"key": 3, "type": "fill_extensions", "priority": null, "requirement": null, "need": 1, "roles": ["manager"]}),
            json!({"key": 0, "type": "build", "site": 6, "priority": 1, "requirement": null, "need": 1, "roles": ["worker"]}),
        ];
        let (q, skipped) = JobQueue::from_snapshot(ZoneName::new(ZONE), JobDomain::Work, entries);
        assert_eq!(skipped, 4);
        assert_eq!(q.len(), 1);
        assert_eq!(q.iter().next().unwrap().kind, build(4));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    use super::*;
    use sw_core::JobRef;

    use crate::{AddOptions, Dispatcher, JobPatch, JobSelector, TaskBoard, UpdateOptions};

    #[derive(Clone, Debug)]
    enum Op {
        AddJob { need: u32, priority: Option<u32>, units: Option<u32>, dispatch: bool },
        Spawn { role: usize, tagged: bool },
        RemoveJob(usize),
        DropAgent(usize),
        SetNeed(u32),
        Reconcile,
    }

    const ROLES: [Role; 4] = [Role::Worker, Role::Builder, Role::Manager, Role::Harvester];

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..4, proptest::option::of(0u32..4), proptest::option::of(0u32..3), any::<bool>())
                .prop_map(|(need, priority, units, dispatch)| Op::AddJob { need, priority, units, dispatch }),
            (0usize..ROLES.len(), any::<bool>()).prop_map(|(role, tagged)| Op::Spawn { role, tagged }),
            (0usize..8).prop_map(Op::RemoveJob),
            (0usize..8).prop_map(Op::DropAgent),
            (0u32..4).prop_map(Op::SetNeed),
            Just(Op::Reconcile),
        ]
    }

    fn check_counts(board: &TaskBoard, agents: &AgentStore) -> Result<(), TestCaseError> {
        for (domain, job) in board.iter() {
            let r = JobRef::new(domain, job.key);
            let holders = agents.iter().filter(|a| a.assigned == Some(r)).count() as u32;
            prop_assert_eq!(job.assigned, holders);
            prop_assert!(job.assigned <= job.need);
            prop_assert!(job.requirement_assigned <= job.assigned);
        }
        Ok(())
    }

    fn check_references(board: &TaskBoard, agents: &AgentStore) -> Result<(), TestCaseError> {
        for agent in agents.iter() {
            if let Some(r) = agent.assigned {
                prop_assert!(board.contains(r), "agent {} references missing {}", agent.id, r);
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn dispatcher_keeps_queue_and_agents_consistent(ops in proptest::collection::vec(op(), 1..40)) {
            let mut board = TaskBoard::new(ZONE);
            let mut agents = AgentStore::new();
            let mut site = 0;

            for op in ops {
                match op {
                    Op::AddJob { need, priority, units, dispatch } => {
                        site += 1;
                        let mut job = build_job(site).need(need);
                        if let Some(p) = priority {
                            job = job.priority(p);
                        }
                        if let Some(u) = units {
                            job = job.requirement("heavy", u);
                        }
                        board.add_job(job, AddOptions { dispatch }).unwrap();
                    }
                    Op::Spawn { role, tagged } => {
                        let mut b = AgentBuilder::new(ROLES[role], ZONE).spawned();
                        if tagged {
                            b = b.capability("heavy");
                        }
                        agents.insert(b);
                    }
                    Op::RemoveJob(i) => {
                        let keys: Vec<_> = board.queue(sw_core::JobDomain::Work).iter().map(|j| j.key).collect();
                        if !keys.is_empty() {
                            let key = keys[i % keys.len()];
                            board.remove_job(sw_core::JobDomain::Work, JobSelector::Key(key), &mut agents).unwrap();
                        }
                    }
                    Op::DropAgent(i) => {
                        let ids = agents.ids();
                        if !ids.is_empty() {
                            agents.remove(ids[i % ids.len()]);
                        }
                    }
                    Op::SetNeed(need) => {
                        let _ = board.update_job(JobPatch::new(build(0)).need(need), UpdateOptions::default(), &mut agents);
                    }
                    Op::Reconcile => {
                        Dispatcher::reconcile(&mut board, &mut agents);
                        check_counts(&board, &agents)?;
                    }
                }
                check_references(&board, &agents)?;
            }

            Dispatcher::reconcile(&mut board, &mut agents);
            check_counts(&board, &agents)?;
            prop_assert!(Dispatcher::reconcile(&mut board, &mut agents).is_empty());
        }
    }
}
