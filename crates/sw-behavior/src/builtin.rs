//! Built-in strategies, one per `JobKind`.
//!
//! | Strategy           | Source                     | Target                                   |
//! |--------------------|----------------------------|------------------------------------------|
//! | `UpgradeStrategy`  | energy                     | upgrade the controller until empty       |
//! | `BuildStrategy`    | energy                     | build; complete when the site is gone    |
//! | `RepairStrategy`   | energy                     | repair; complete at full hits            |
//! | `SignStrategy`     | none                       | sign once, complete                      |
//! | `DefendStrategy`   | none                       | attack; complete when the hostile is gone |
//! | `FillExtensionsStrategy` | energy               | fill extensions; complete when all full  |
//! | `FillTowerStrategy`| energy                     | fill the tower; complete when full       |
//! | `SupplyStrategy`   | withdraw from `from`       | deliver to `to`, complete                |
//! | `ShuttleStrategy`  | withdraw from `from`       | deliver to `to`, complete; parks first   |
//!
//! Energy comes from the nearest non-empty storage or container, else the
//! nearest source.

use sw_core::{Action, ActionStatus, ObjectId, ObjectKind, WorldObject};
use sw_task::{Job, JobKind, JobTag};

use crate::{JobStrategy, PhaseContext};

/// Marker holding the object an agent is drawing energy from.
pub const SOURCE_MARKER: &str = "source";
/// Marker holding the extension an agent is filling.
pub const FILL_MARKER: &str = "fill";

/// Range for upgrade/build/repair actions.
const WORK_RANGE: u32 = 3;

/// Every built-in strategy with its tag.
pub fn all() -> Vec<(JobTag, Box<dyn JobStrategy>)> {
    vec![
        (JobTag::Upgrade, Box::new(UpgradeStrategy)),
        (JobTag::Build, Box::new(BuildStrategy)),
        (JobTag::Repair, Box::new(RepairStrategy)),
        (JobTag::Sign, Box::new(SignStrategy)),
        (JobTag::Defend, Box::new(DefendStrategy)),
        (JobTag::FillExtensions, Box::new(FillExtensionsStrategy)),
        (JobTag::FillTower, Box::new(FillTowerStrategy)),
        (JobTag::Supply, Box::new(SupplyStrategy)),
        (JobTag::Shuttle, Box::new(ShuttleStrategy)),
    ]
}

// ── Shared phases ─────────────────────────────────────────────────────────────

fn nearest_energy(ctx: &PhaseContext<'_>) -> Option<WorldObject> {
    let has_energy = |o: &WorldObject| o.stored > 0;
    ctx.find_nearest(ObjectKind::Storage, &has_energy)
        .or_else(|| ctx.find_nearest(ObjectKind::Container, &has_energy))
        .or_else(|| ctx.find_nearest(ObjectKind::Source, &has_energy))
}

/// Fill up on energy.  `true` once the agent is full, or carries something
/// and nothing is left to draw from.
fn gather_energy(ctx: &mut PhaseContext<'_>) -> bool {
    let cargo = ctx.cargo();
    if cargo.is_full() {
        return true;
    }
    let remembered = ctx
        .marker(SOURCE_MARKER)
        .and_then(|id| ctx.object(id))
        .filter(|o| o.kind.is_energy_source() && o.stored > 0);
    let Some(obj) = remembered.or_else(|| nearest_energy(ctx)) else {
        return !cargo.is_empty();
    };
    ctx.set_marker(SOURCE_MARKER, obj.id);

    let action = match obj.kind {
        ObjectKind::Source => Action::Harvest(obj.id),
        _ => Action::Withdraw(obj.id, None),
    };
    match ctx.act_at(obj.pos, 1, action) {
        Some(ActionStatus::Ok) => ctx.cargo().is_full(),
        Some(ActionStatus::NotEnoughResources | ActionStatus::InvalidTarget) => {
            ctx.remove_marker(SOURCE_MARKER);
            false
        }
        _ => false,
    }
}

/// Spend carried energy on `obj` with `action` from `WORK_RANGE`.
///
/// `true` once the agent is empty.
fn spend_energy(ctx: &mut PhaseContext<'_>, obj: &WorldObject, action: Action) -> bool {
    if ctx.cargo().is_empty() {
        return true;
    }
    match ctx.act_at(obj.pos, WORK_RANGE, action) {
        Some(ActionStatus::InvalidTarget) => {
            ctx.invalidate();
            false
        }
        Some(ActionStatus::NotEnoughResources) => true,
        _ => ctx.cargo().is_empty(),
    }
}

/// Withdraw up to `amount` from `from`.  `true` once something is carried.
fn load_from(ctx: &mut PhaseContext<'_>, from: ObjectId, amount: u32) -> bool {
    let cargo = ctx.cargo();
    if !cargo.is_empty() {
        return true;
    }
    let Some(obj) = ctx.object(from) else {
        ctx.invalidate();
        return false;
    };
    let want = amount.min(cargo.free());
    match ctx.act_at(obj.pos, 1, Action::Withdraw(from, Some(want))) {
        Some(ActionStatus::Ok) => true,
        Some(ActionStatus::NotEnoughResources | ActionStatus::InvalidTarget) => {
            ctx.invalidate();
            false
        }
        _ => false,
    }
}

/// Deliver everything carried to `to`; the job is complete on success.
fn unload_into(ctx: &mut PhaseContext<'_>, to: ObjectId) -> bool {
    if ctx.cargo().is_empty() {
        return true;
    }
    let Some(obj) = ctx.object(to) else {
        ctx.invalidate();
        return false;
    };
    match ctx.act_at(obj.pos, 1, Action::Transfer(to, None)) {
        Some(ActionStatus::Ok | ActionStatus::Full) => {
            ctx.complete();
            false
        }
        Some(ActionStatus::InvalidTarget) => {
            ctx.invalidate();
            false
        }
        _ => false,
    }
}

// ── Work ──────────────────────────────────────────────────────────────────────

pub struct UpgradeStrategy;

impl JobStrategy for UpgradeStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        gather_energy(ctx)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Upgrade { controller } = job.kind else { return false };
        let Some(obj) = ctx.object(controller) else {
            ctx.invalidate();
            return false;
        };
        spend_energy(ctx, &obj, Action::Upgrade(controller))
    }
}

pub struct BuildStrategy;

impl JobStrategy for BuildStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        gather_energy(ctx)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Build { site } = job.kind else { return false };
        // A finished site disappears from the world.
        let Some(obj) = ctx.object(site) else {
            ctx.complete();
            return false;
        };
        spend_energy(ctx, &obj, Action::Build(site))
    }
}

pub struct RepairStrategy;

impl JobStrategy for RepairStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        gather_energy(ctx)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Repair { structure } = job.kind else { return false };
        let Some(obj) = ctx.object(structure) else {
            ctx.invalidate();
            return false;
        };
        if !obj.is_damaged() {
            ctx.complete();
            return false;
        }
        spend_energy(ctx, &obj, Action::Repair(structure))
    }
}

pub struct SignStrategy;

impl JobStrategy for SignStrategy {
    fn has_source(&self) -> bool {
        false
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Sign { controller, text } = &job.kind else { return false };
        let Some(obj) = ctx.object(*controller) else {
            ctx.invalidate();
            return false;
        };
        match ctx.act_at(obj.pos, 1, Action::Sign(*controller, text.clone())) {
            Some(ActionStatus::Ok) => ctx.complete(),
            Some(ActionStatus::InvalidTarget) => ctx.invalidate(),
            _ => {}
        }
        false
    }
}

pub struct DefendStrategy;

impl JobStrategy for DefendStrategy {
    fn has_source(&self) -> bool {
        false
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Defend { target } = job.kind else { return false };
        let Some(obj) = ctx.object(target) else {
            ctx.complete();
            return false;
        };
        if let Some(ActionStatus::InvalidTarget) = ctx.act_at(obj.pos, 1, Action::Attack(target)) {
            ctx.complete();
        }
        false
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

pub struct FillExtensionsStrategy;

impl JobStrategy for FillExtensionsStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        gather_energy(ctx)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        if ctx.cargo().is_empty() {
            return true;
        }
        let remembered = ctx
            .marker(FILL_MARKER)
            .and_then(|id| ctx.object(id))
            .filter(|o| o.free_capacity() > 0);
        let Some(ext) = remembered.or_else(|| ctx.find_nearest(ObjectKind::Extension, &|o: &WorldObject| o.free_capacity() > 0))
        else {
            ctx.complete();
            return false;
        };
        ctx.set_marker(FILL_MARKER, ext.id);
        if let Some(ActionStatus::Ok | ActionStatus::Full) = ctx.act_at(ext.pos, 1, Action::Transfer(ext.id, None)) {
            ctx.remove_marker(FILL_MARKER);
        }
        ctx.cargo().is_empty()
    }
}

pub struct FillTowerStrategy;

impl JobStrategy for FillTowerStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, _job: &Job) -> bool {
        gather_energy(ctx)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::FillTower { tower } = job.kind else { return false };
        let Some(obj) = ctx.object(tower) else {
            ctx.invalidate();
            return false;
        };
        if obj.free_capacity() == 0 {
            ctx.complete();
            return false;
        }
        if ctx.cargo().is_empty() {
            return true;
        }
        ctx.act_at(obj.pos, 1, Action::Transfer(tower, None));
        ctx.cargo().is_empty()
    }
}

pub struct SupplyStrategy;

impl JobStrategy for SupplyStrategy {
    fn source(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Supply { from, amount, .. } = job.kind else { return false };
        load_from(ctx, from, amount)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Supply { to, .. } = job.kind else { return false };
        unload_into(ctx, to)
    }
}

// ── Center transport ──────────────────────────────────────────────────────────

/// Moves energy between two adjacent core structures.  The agent parks
/// next to `from` before its first transfer and then stays put.
pub struct ShuttleStrategy;

impl JobStrategy for ShuttleStrategy {
    fn prepare(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Shuttle { from, .. } = job.kind else { return false };
        let Some(obj) = ctx.object(from) else {
            ctx.invalidate();
            return false;
        };
        ctx.approach(obj.pos, 1)
    }

    fn source(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Shuttle { from, amount, .. } = job.kind else { return false };
        load_from(ctx, from, amount)
    }

    fn target(&self, ctx: &mut PhaseContext<'_>, job: &Job) -> bool {
        let JobKind::Shuttle { to, .. } = job.kind else { return false };
        unload_into(ctx, to)
    }
}
