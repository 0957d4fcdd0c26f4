//! salvo-replay: run a projectile scenario headless and check it replays
//! identically.
//!
//! Usage:
//!   salvo-replay run --scenario duel.json [--ticks 200] [--snapshots out.jsonl]
//!   salvo-replay verify --scenario duel.json

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use log::{debug, info};
use serde::Deserialize;

use salvo_core::events::ProjectileEvent;
use salvo_core::types::Position;
use salvo_core::weapons::{WeaponId, WeaponStats, WeaponTable};
use salvo_sim::battlefield::{FeatureSpec, StructureSpec, UnitSpec};
use salvo_sim::{Aim, Battlefield, FireOrder, ObjectId, ProjectileEngine, SimConfig};
use salvo_terrain::HeightField;

/// Scenario file. Objects are referenced by their index in spawn order:
/// units first, then structures, then features.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    config: SimConfig,
    weapons: Vec<WeaponStats>,
    #[serde(default)]
    terrain: TerrainSpec,
    #[serde(default)]
    units: Vec<UnitSpec>,
    #[serde(default)]
    structures: Vec<StructureSpec>,
    #[serde(default)]
    features: Vec<FeatureSpec>,
    #[serde(default)]
    alliances: Vec<(u8, u8)>,
    #[serde(default)]
    observer: Option<u8>,
    #[serde(default)]
    orders: Vec<OrderSpec>,
    #[serde(default = "default_ticks")]
    ticks: u64,
}

fn default_ticks() -> u64 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TerrainSpec {
    width: u32,
    height: u32,
    level: i16,
}

impl Default for TerrainSpec {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            level: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderSpec {
    /// Tick before which the order is issued.
    #[serde(default)]
    tick: u64,
    weapon: u32,
    player: u8,
    #[serde(default)]
    source: Option<usize>,
    #[serde(default)]
    muzzle: Option<Position>,
    #[serde(default)]
    target: Option<usize>,
    #[serde(default)]
    point: Option<Position>,
    #[serde(default)]
    min_angle: f64,
}

/// Outcome of one run.
struct RunResult {
    snapshots: Vec<String>,
    fired: usize,
    impacts: usize,
    misses: usize,
    destroyed: usize,
    live_at_end: usize,
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "verify" => cmd_verify(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "salvo-replay: SALVO projectile scenario runner\n\
         \n\
         Commands:\n\
         \n\
         run       Run a scenario and print a summary\n\
         \n\
           --scenario <path>   Scenario JSON file\n\
           --ticks <N>         Override the scenario's tick count\n\
           --snapshots <path>  Write one JSON snapshot per tick (optional)\n\
         \n\
         verify    Run a scenario twice and compare every snapshot\n\
         \n\
           --scenario <path>   Scenario JSON file\n\
         \n\
         Examples:\n\
         \n\
           salvo-replay run --scenario duel.json --snapshots duel.jsonl\n\
           salvo-replay verify --scenario barrage.json\n"
    );
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn load_scenario(args: &[String]) -> Scenario {
    let Some(path) = parse_flag(args, "--scenario").map(PathBuf::from) else {
        eprintln!("Error: --scenario <path> is required");
        process::exit(1);
    };
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(1);
        }
    }
}

// --- Run command ---

fn cmd_run(args: &[String]) {
    let mut scenario = load_scenario(args);
    if let Some(ticks) = parse_flag(args, "--ticks").and_then(|t| t.parse().ok()) {
        scenario.ticks = ticks;
    }

    let result = run_scenario(&scenario);
    println!("Ticks:      {}", scenario.ticks);
    println!("Fired:      {}", result.fired);
    println!("Impacts:    {}", result.impacts);
    println!("Misses:     {}", result.misses);
    println!("Destroyed:  {}", result.destroyed);
    println!("Still live: {}", result.live_at_end);

    if let Some(path) = parse_flag(args, "--snapshots").map(PathBuf::from) {
        let written = fs::File::create(&path).and_then(|mut file| {
            for line in &result.snapshots {
                writeln!(file, "{line}")?;
            }
            Ok(())
        });
        if let Err(e) = written {
            eprintln!("Error writing {}: {e}", path.display());
            process::exit(1);
        }
        println!("Snapshots written to {}", path.display());
    }
}

// --- Verify command ---

fn cmd_verify(args: &[String]) {
    let scenario = load_scenario(args);
    let first = run_scenario(&scenario);
    let second = run_scenario(&scenario);

    let diverged = first
        .snapshots
        .iter()
        .zip(&second.snapshots)
        .position(|(a, b)| a != b);
    match diverged {
        None if first.snapshots.len() == second.snapshots.len() => {
            println!(
                "OK: {} ticks replayed identically (seed {})",
                first.snapshots.len(),
                scenario.config.seed
            );
        }
        None => {
            eprintln!("FAIL: runs produced a different number of snapshots");
            process::exit(2);
        }
        Some(tick) => {
            eprintln!("FAIL: snapshots diverged at tick {}", tick + 1);
            process::exit(2);
        }
    }
}

fn run_scenario(scenario: &Scenario) -> RunResult {
    let mut weapons = WeaponTable::new();
    for stats in &scenario.weapons {
        weapons.insert(stats.clone());
    }
    let terrain = HeightField::flat(
        scenario.terrain.width,
        scenario.terrain.height,
        scenario.terrain.level,
    );

    let mut field = Battlefield::new();
    let mut objects: Vec<ObjectId> = Vec::new();
    objects.extend(scenario.units.iter().map(|spec| field.spawn_unit(spec)));
    objects.extend(
        scenario
            .structures
            .iter()
            .map(|spec| field.spawn_structure(spec)),
    );
    objects.extend(scenario.features.iter().map(|spec| field.spawn_feature(spec)));
    for &(a, b) in &scenario.alliances {
        field.set_alliance(a, b);
    }
    field.set_observer(scenario.observer);

    let mut engine = ProjectileEngine::new(scenario.config.clone(), weapons);
    info!(
        "scenario: {} objects, {} weapons, {} orders, {} ticks, seed {}",
        objects.len(),
        engine.weapons().len(),
        scenario.orders.len(),
        scenario.ticks,
        engine.config().seed
    );
    let mut result = RunResult {
        snapshots: Vec::new(),
        fired: 0,
        impacts: 0,
        misses: 0,
        destroyed: 0,
        live_at_end: 0,
    };

    for tick in 0..scenario.ticks {
        for spec in scenario.orders.iter().filter(|o| o.tick == tick) {
            let Some(order) = build_order(spec, &objects) else {
                eprintln!("Warning: order at tick {tick} references an unknown object");
                continue;
            };
            if engine.fire(&mut field, &terrain, order).is_some() {
                result.fired += 1;
            }
        }

        let snap = engine.tick(&mut field, &terrain);
        for event in &snap.events {
            match event {
                ProjectileEvent::Impact { .. } => result.impacts += 1,
                ProjectileEvent::Miss { .. } => result.misses += 1,
                ProjectileEvent::Destroyed { .. } => result.destroyed += 1,
                _ => {}
            }
        }
        let reaped = field.reap_dead();
        if !reaped.is_empty() {
            debug!("tick {}: removed {} destroyed objects", tick + 1, reaped.len());
        }
        result
            .snapshots
            .push(serde_json::to_string(&snap).unwrap_or_default());
    }

    result.live_at_end = engine.live_count();
    result
}

fn build_order(spec: &OrderSpec, objects: &[ObjectId]) -> Option<FireOrder> {
    let aim = match (spec.target, spec.point) {
        (Some(index), _) => Aim::Target(*objects.get(index)?),
        (None, Some(point)) => Aim::Point(point),
        (None, None) => return None,
    };
    let mut order = FireOrder::new(WeaponId(spec.weapon), spec.player, aim)
        .with_min_angle(spec.min_angle);
    if let Some(index) = spec.source {
        order = order.from_source(*objects.get(index)?);
    }
    if let Some(muzzle) = spec.muzzle {
        order = order.from_muzzle(muzzle);
    }
    Some(order)
}
