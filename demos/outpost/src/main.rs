//! outpost — smallest end-to-end run of the rust_swarm core.
//!
//! One 30×30 zone with a source, a controller and a construction site.
//! Four workers split an upgrade job and a build job; a delayed task read
//! from an embedded JSON seed queues a sign job at tick 20.  Assignments and
//! per-tick counters are written to `output/outpost/*.csv`, and the swarm
//! state is snapshotted to `output/outpost/snapshot.json` after every tick,
//! so a second run resumes where the first one stopped.
//!
//! Set `RUST_LOG=debug` for per-agent logging.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sw_agent::{AgentBuilder, AgentStore};
use sw_core::{AgentId, ObjectId, ObjectKind, Position, Role, SwarmConfig, Tile, World, ZoneName};
use sw_output::{CsvWriter, SwarmOutputObserver};
use sw_path::{AStarRouter, TerrainGrid};
use sw_schedule::{CallbackError, DelayedTask, Rearm, Resolved};
use sw_sim::{GridWorld, JsonFileRepository, SwarmBuilder, Zone};
use sw_task::{AddOptions, JobKind, NewJob};

// ── Constants ─────────────────────────────────────────────────────────────────

const ZONE:       &str = "W1N1";
const OUTPUT_DIR: &str = "output/outpost";

const CONFIG_TOML: &str = "\
seed           = 42
total_ticks    = 150
standby_spread = 2

[movement]
reuse_limit     = 10
max_stuck_ticks = 3
";

const DELAYED_JSON: &str = r#"[
  { "name": "queue_sign", "payload": { "zone": "W1N1", "data": { "text": "outpost" } }, "fire_at": 20 }
]"#;

// ── World ─────────────────────────────────────────────────────────────────────

struct Landmarks {
    source:     ObjectId,
    controller: ObjectId,
    site:       ObjectId,
}

/// A plain grid with a swamp band and a wall that has a two-cell gap.
fn build_world() -> Result<(GridWorld, Landmarks)> {
    let mut terrain = TerrainGrid::new(30, 30);
    for x in 0..30 {
        terrain.set(Position::new(x, 14), Tile::Swamp);
        if !(13..15).contains(&x) {
            terrain.set(Position::new(x, 18), Tile::Wall);
        }
    }

    let mut world = GridWorld::new();
    world.add_zone(ZONE, terrain)?;
    let source = world.add_object(ZONE, ObjectKind::Source, Position::new(5, 5))?;
    world.set_store(source, 3_000, 3_000);
    let controller = world.add_object(ZONE, ObjectKind::Controller, Position::new(24, 24))?;
    let site = world.add_object(ZONE, ObjectKind::ConstructionSite, Position::new(15, 8))?;
    world.set_hits(site, 0, 100);

    Ok((world, Landmarks { source, controller, site }))
}

/// Delayed-task callback: queue a sign job carrying the payload's `text`.
fn queue_sign(
    controller: ObjectId,
) -> impl Fn(Resolved<'_, Zone>, &mut AgentStore, &DelayedTask, &mut Rearm) -> Result<(), CallbackError>
+ Send
+ Sync
+ 'static {
    move |zone: Resolved<'_, Zone>, _agents: &mut AgentStore, task: &DelayedTask, _rearm: &mut Rearm| {
        let Resolved::Zone(zone) = zone else {
            return Ok(());
        };
        let text = task.payload.data.get("text").and_then(|v| v.as_str()).ok_or("sign task without text")?;
        zone.board.add_job(
            NewJob::new(JobKind::Sign { controller, text: text.to_owned() }),
            AddOptions::dispatch(),
        )?;
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== outpost — rust_swarm core ===");

    // 1. Configuration and seeds.
    let config = SwarmConfig::from_toml_str(CONFIG_TOML)?;
    let seeds: Vec<DelayedTask> = serde_json::from_str(DELAYED_JSON).context("parsing delayed-task seed")?;
    println!("Ticks: {}  |  Seed: {}  |  Delayed tasks: {}", config.total_ticks, config.seed, seeds.len());

    // 2. World.
    let (world, marks) = build_world()?;
    println!("World: {} objects, source {:?}", world.objects().count(), marks.source);

    // 3. Swarm.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let repository = JsonFileRepository::new(Path::new(OUTPUT_DIR).join("snapshot.json"));
    let mut swarm = SwarmBuilder::new(config, AStarRouter::default(), world)
        .zone(ZONE, Position::new(15, 12))
        .agent(AgentBuilder::new(Role::Worker, ZONE).spawned())
        .agent(AgentBuilder::new(Role::Worker, ZONE).spawned())
        .agent(AgentBuilder::new(Role::Worker, ZONE).spawned())
        .agent(AgentBuilder::new(Role::Worker, ZONE).spawned())
        .callback("queue_sign", queue_sign(marks.controller))
        .delayed_tasks(seeds)
        .repository(Box::new(repository))
        .build()?;

    // 4. Place agents; queue the initial jobs on a fresh start only.
    let resumed = swarm.tick.0 > 0;
    for (i, id) in swarm.agents.ids().into_iter().enumerate() {
        swarm.world.place_agent(id, ZONE, Position::new(8 + i as i32, 10))?;
    }
    if !resumed {
        let board = &mut swarm
            .zone_mut(&ZoneName::new(ZONE))
            .context("zone missing after build")?
            .board;
        board.add_job(
            NewJob { need: 2, ..NewJob::new(JobKind::Upgrade { controller: marks.controller }) },
            AddOptions::default(),
        )?;
        board.add_job(NewJob::new(JobKind::Build { site: marks.site }), AddOptions::default())?;
    }
    info!(resumed, tick = %swarm.tick, "starting run");

    // 5. Run.
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = SwarmOutputObserver::new(writer);
    let t0 = Instant::now();
    swarm.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Run complete in {:.3} s at tick {}", elapsed.as_secs_f64(), swarm.tick);
    let zone = swarm.zone(&ZoneName::new(ZONE)).context("zone missing after run")?;
    println!("Open jobs: {}", zone.board.job_count());
    println!();
    println!("{:<8} {:<10} {:<12} {:<10}", "Agent", "Role", "Job", "Position");
    println!("{}", "-".repeat(42));
    for agent in swarm.agents.iter() {
        let job = agent.assigned.map(|j| j.to_string()).unwrap_or_else(|| "-".into());
        let pos = describe_position(&swarm.world, agent.id);
        println!("{:<8} {:<10} {:<12} {:<10}", agent.id.0, agent.role.as_str(), job, pos);
    }

    Ok(())
}

fn describe_position(world: &GridWorld, agent: AgentId) -> String {
    match world.position_of(agent) {
        Some(pos) => format!("{},{}", pos.x, pos.y),
        None => "-".into(),
    }
}
