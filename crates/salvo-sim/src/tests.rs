//! Scenario tests for the projectile engine: flight, collision, impact,
//! area effects, and bookkeeping against a live battlefield.

use glam::DVec3;

use salvo_core::constants::{LINE_OF_FIRE_MINIMUM, TICK_MS};
use salvo_core::enums::*;
use salvo_core::events::ProjectileEvent;
use salvo_core::state::ProjectileSnapshot;
use salvo_core::types::{PlayerId, Position, ProjectileId, Spacetime, Velocity};
use salvo_core::weapons::{TargetMask, WeaponCues, WeaponId, WeaponStats, WeaponTable};
use salvo_terrain::HeightField;

use crate::battlefield::{Battlefield, UnitSpec};
use crate::config::SimConfig;
use crate::damage::DamageRequest;
use crate::engine::{Aim, FireOrder, ProjectileEngine};
use crate::error::FireError;
use crate::projectile::Projectile;
use crate::world::{CombatWorld, ObjectId, ObjectView, UnitCost};

// ---- Shared helpers ----

/// A projectile with nothing set, for unit tests of single systems.
pub(crate) fn blank_projectile(id: ProjectileId) -> Projectile {
    Projectile {
        id,
        weapon: WeaponId(0),
        player: 0,
        motion: MotionModel::Direct,
        state: ProjectileState::InFlight,
        source: None,
        destination: None,
        src: Position::default(),
        dst: Position::default(),
        born: 0,
        previous: Spacetime::default(),
        current: Spacetime::default(),
        expected_damage: 0,
        direct: true,
        damaged: Vec::new(),
        ballistic: None,
        travelled: 0.0,
        heading: DVec3::X,
        visible: false,
    }
}

/// An empty combat world.
#[derive(Default)]
pub(crate) struct StubWorld;

impl CombatWorld for StubWorld {
    fn object(&self, _id: ObjectId) -> Option<ObjectView> {
        None
    }
    fn objects_in_radius(&self, _center: &Position, _radius: f64) -> Vec<ObjectId> {
        Vec::new()
    }
    fn is_ally(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b
    }
    fn apply_damage(&mut self, _id: ObjectId, _request: &DamageRequest) -> Option<f64> {
        None
    }
    fn apply_electronic(&mut self, _id: ObjectId, _strength: u32, _attacker: PlayerId) -> bool {
        false
    }
    fn add_expected_damage(&mut self, _id: ObjectId, _amount: i64, _direct: bool) {}
    fn grant_experience(&mut self, _id: ObjectId, _amount: f64) {}
    fn fire_support_sensor(&self, _id: ObjectId) -> Option<ObjectId> {
        None
    }
    fn unit_cost(&self, _id: ObjectId) -> Option<UnitCost> {
        None
    }
}

struct Armoury {
    cannon: WeaponId,
    heavy_cannon: WeaponId,
    mortar: WeaponId,
    rail: WeaponId,
    flamer: WeaponId,
    missile: WeaponId,
    cruise: WeaponId,
    zapper: WeaponId,
    needle: WeaponId,
    long_gun: WeaponId,
    lob: WeaponId,
}

fn armoury() -> (WeaponTable, Armoury) {
    let mut table = WeaponTable::new();
    let cannon = table.insert(WeaponStats {
        name: "cannon".into(),
        flight_speed: 2000.0,
        long_range: 2000.0,
        damage: 50,
        effect: WeaponEffect::AntiTank,
        cues: WeaponCues {
            fire: Some("cannon_fire".into()),
            impact: Some("cannon_hit".into()),
            miss: Some("cannon_miss".into()),
        },
        ..WeaponStats::default()
    });
    let heavy_cannon = table.insert(WeaponStats {
        name: "heavy cannon".into(),
        flight_speed: 2000.0,
        long_range: 3000.0,
        damage: 500,
        effect: WeaponEffect::AntiTank,
        ..WeaponStats::default()
    });
    let mortar = table.insert(WeaponStats {
        name: "mortar".into(),
        movement: MotionModel::Indirect,
        flight_speed: 1500.0,
        long_range: 3000.0,
        damage: 80,
        effect: WeaponEffect::ArtilleryRound,
        subclass: WeaponSubclass::Mortar,
        radius: 150.0,
        radius_damage: 40,
        radius_life: 500,
        no_friendly_fire: true,
        ..WeaponStats::default()
    });
    let rail = table.insert(WeaponStats {
        name: "rail".into(),
        flight_speed: 20_000.0,
        long_range: 6000.0,
        damage: 30,
        effect: WeaponEffect::AntiTank,
        subclass: WeaponSubclass::Energy,
        penetrate: true,
        ..WeaponStats::default()
    });
    let flamer = table.insert(WeaponStats {
        name: "flamer".into(),
        flight_speed: 1000.0,
        long_range: 1200.0,
        damage: 10,
        effect: WeaponEffect::Flamer,
        class: WeaponClass::Heat,
        subclass: WeaponSubclass::Flame,
        periodic_damage: 60,
        periodic_radius: 100.0,
        periodic_duration: 2000,
        ..WeaponStats::default()
    });
    let missile = table.insert(WeaponStats {
        name: "missile".into(),
        movement: MotionModel::HomingDirect,
        flight_speed: 1500.0,
        long_range: 5000.0,
        damage: 70,
        effect: WeaponEffect::AntiTank,
        subclass: WeaponSubclass::Missile,
        targets: TargetMask {
            ground: true,
            air: true,
        },
        ..WeaponStats::default()
    });
    let cruise = table.insert(WeaponStats {
        name: "cruise".into(),
        movement: MotionModel::HomingIndirect,
        flight_speed: 800.0,
        long_range: 8000.0,
        damage: 100,
        effect: WeaponEffect::ArtilleryRound,
        subclass: WeaponSubclass::Missile,
        ..WeaponStats::default()
    });
    let zapper = table.insert(WeaponStats {
        name: "zapper".into(),
        flight_speed: 2000.0,
        long_range: 2000.0,
        damage: 50,
        effect: WeaponEffect::AntiTank,
        subclass: WeaponSubclass::Electronic,
        ..WeaponStats::default()
    });
    let needle = table.insert(WeaponStats {
        name: "needle".into(),
        flight_speed: 50_000.0,
        long_range: 6000.0,
        damage: 20,
        effect: WeaponEffect::AntiTank,
        ..WeaponStats::default()
    });

    // 1500 units per tick: range runs out a third of the way into tick two.
    let long_gun = table.insert(WeaponStats {
        name: "long gun".into(),
        flight_speed: 15_000.0,
        long_range: 2000.0,
        damage: 50,
        effect: WeaponEffect::AntiTank,
        ..WeaponStats::default()
    });
    // Too slow to reach most targets at its nominal speed.
    let lob = table.insert(WeaponStats {
        name: "lob".into(),
        movement: MotionModel::Indirect,
        flight_speed: 400.0,
        long_range: 3000.0,
        damage: 10,
        effect: WeaponEffect::ArtilleryRound,
        subclass: WeaponSubclass::Mortar,
        ..WeaponStats::default()
    });

    (
        table,
        Armoury {
            cannon,
            heavy_cannon,
            mortar,
            rail,
            flamer,
            missile,
            cruise,
            zapper,
            needle,
            long_gun,
            lob,
        },
    )
}

fn tank(player: PlayerId, x: f64, y: f64) -> UnitSpec {
    UnitSpec {
        player,
        position: Position::new(x, y, 0.0),
        velocity: Velocity::default(),
        radius: 32.0,
        height: 40.0,
        body: 200,
        armour_kinetic: 0,
        armour_heat: 0,
        armor: ArmorClass::Tracked,
        airborne: false,
        resistance: 0,
        power: 100.0,
        points: 100.0,
    }
}

struct Arena {
    engine: ProjectileEngine,
    field: Battlefield,
    terrain: HeightField,
    arms: Armoury,
}

impl Arena {
    fn new(seed: u64) -> Self {
        let (table, arms) = armoury();
        Self {
            engine: ProjectileEngine::new(
                SimConfig {
                    seed,
                    ..Default::default()
                },
                table,
            ),
            field: Battlefield::new(),
            terrain: HeightField::flat(64, 64, 0),
            arms,
        }
    }

    fn spawn(&mut self, spec: UnitSpec) -> ObjectId {
        self.field.spawn_unit(&spec)
    }

    fn fire_at(&mut self, weapon: WeaponId, shooter: ObjectId, target: ObjectId) -> ProjectileId {
        let player = self.field.owner_of(shooter).unwrap();
        let order = FireOrder::new(weapon, player, Aim::Target(target)).from_source(shooter);
        self.engine
            .fire(&mut self.field, &self.terrain, order)
            .expect("shot should be created")
    }

    fn tick(&mut self) -> ProjectileSnapshot {
        self.engine.tick(&mut self.field, &self.terrain)
    }

    /// Run `ticks` ticks and collect every event.
    fn run(&mut self, ticks: usize) -> Vec<ProjectileEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick().events);
        }
        events
    }

    fn body(&self, id: ObjectId) -> u32 {
        self.field.body_of(id).unwrap()
    }
}

fn count<F: Fn(&ProjectileEvent) -> bool>(events: &[ProjectileEvent], f: F) -> usize {
    events.iter().filter(|e| f(e)).count()
}

// ---- Determinism ----

fn volley_snapshots(seed: u64) -> Vec<String> {
    let mut arena = Arena::new(seed);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let targets: Vec<ObjectId> = (0..4)
        .map(|i| arena.spawn(tank(1, 2200.0 + 150.0 * i as f64, 1200.0)))
        .collect();

    let mut snapshots = Vec::new();
    for (i, target) in targets.iter().enumerate() {
        let weapon = if i % 2 == 0 {
            arena.arms.mortar
        } else {
            arena.arms.cannon
        };
        arena.fire_at(weapon, gun, *target);
    }
    for _ in 0..40 {
        let snap = arena.tick();
        snapshots.push(serde_json::to_string(&snap).unwrap());
    }
    snapshots
}

#[test]
fn test_determinism_same_seed() {
    let a = volley_snapshots(12345);
    let b = volley_snapshots(12345);
    assert_eq!(a, b, "Snapshots diverged with same seed");
}

// ---- Direct fire ----

#[test]
fn test_direct_hit_damages_target() {
    let mut arena = Arena::new(1);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2000.0, 1000.0));

    let shot = arena.fire_at(arena.arms.cannon, gun, target);
    assert_eq!(
        arena.field.expected_damage_of(target).unwrap().direct,
        60,
        "expected damage booked at fire time"
    );

    let events = arena.run(8);
    // 50 anti-tank against tracked armour is 60.
    assert_eq!(arena.body(target), 140);
    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::Impact { cue, .. } if cue.as_deref() == Some("cannon_hit"))),
        1
    );
    let score = arena.engine.score(0);
    assert_eq!(score.shots_on_target, 1);
    assert_eq!(score.hits, 1);
    assert_eq!(score.misses, 0);

    assert!(arena.engine.projectile(shot).is_none());
    assert_eq!(arena.engine.live_count(), 0);
    assert_eq!(arena.engine.last_attacker(), Some(gun));
    assert_eq!(arena.field.expected_damage_of(target).unwrap().direct, 0);
}

#[test]
fn test_fire_event_and_snapshot_pair() {
    let mut arena = Arena::new(2);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 3000.0, 1000.0));

    let shot = arena.fire_at(arena.arms.cannon, gun, target);
    let snap = arena.tick();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        ProjectileEvent::Fired { projectile, cue, .. } if *projectile == shot && cue.as_deref() == Some("cannon_fire")
    )));

    let view = snap.projectiles.iter().find(|p| p.id == shot).unwrap();
    assert_eq!(view.state, ProjectileState::InFlight);
    assert_eq!(view.previous.time, 0);
    assert_eq!(view.current.time, 100);
    assert!((view.current.pos.x - 1200.0).abs() < 1.0);
}

#[test]
fn test_allies_do_not_block_shots() {
    let mut arena = Arena::new(3);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let friend = arena.spawn(tank(0, 1500.0, 1000.0));
    let target = arena.spawn(tank(1, 2000.0, 1000.0));

    arena.fire_at(arena.arms.cannon, gun, target);
    arena.run(8);
    assert_eq!(arena.body(friend), 200);
    assert_eq!(arena.body(target), 140);
}

#[test]
fn test_high_speed_shot_does_not_tunnel() {
    let mut arena = Arena::new(4);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let small = arena.spawn(UnitSpec {
        radius: 8.0,
        height: 16.0,
        ..tank(1, 4000.0, 1000.0)
    });

    arena.fire_at(arena.arms.needle, gun, small);
    // 5000 units per tick: the whole 3000 unit flight is inside one segment.
    let events = arena.run(1);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Impact { .. })), 1);
    assert!(arena.body(small) < 200);
}

#[test]
fn test_range_exhaustion_is_a_miss() {
    let mut arena = Arena::new(5);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let order = FireOrder::new(
        arena.arms.cannon,
        0,
        Aim::Point(Position::new(1000.0, 5000.0, 0.0)),
    )
    .from_source(gun);
    arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let events = arena.run(9);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Miss { .. })), 0);

    // Long range 2000 at 2000 units/s runs out after one second.
    let events = arena.run(1);
    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::Miss { cue, .. } if cue.as_deref() == Some("cannon_miss"))),
        1
    );
    let score = arena.engine.score(0);
    assert_eq!(score.shots_off_target, 1);
    assert_eq!(score.misses, 1);
    assert_eq!(arena.engine.live_count(), 0);
}

#[test]
fn test_range_runs_out_inside_a_tick() {
    let mut arena = Arena::new(20);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 3500.0, 1000.0));

    arena.fire_at(arena.arms.long_gun, gun, target);
    let events = arena.run(3);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Impact { .. })), 0);
    assert_eq!(arena.body(target), 200, "target is past maximum range");

    let miss = events
        .iter()
        .find_map(|e| match e {
            ProjectileEvent::Miss { position, .. } => Some(*position),
            _ => None,
        })
        .expect("range exhaustion should be a miss");
    // Stops where the 2000 units run out, not at the end of the tick.
    assert!((miss.x - 3000.0).abs() < 10.0, "stopped at {miss:?}");
    assert_eq!(arena.engine.score(0).misses, 1);
    assert_eq!(arena.engine.live_count(), 0);
}

#[test]
fn test_hit_inside_range_on_the_exhausting_tick() {
    let mut arena = Arena::new(21);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2800.0, 1000.0));

    // Tick two covers 1500..3000 units; the target sits at 1768, inside range.
    arena.fire_at(arena.arms.long_gun, gun, target);
    let events = arena.run(3);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Impact { .. })), 1);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Miss { .. })), 0);
    assert_eq!(arena.body(target), 140);
}

#[test]
fn test_slow_lob_rises_and_lands_on_the_aim_point() {
    let mut arena = Arena::new(22);
    let muzzle = Position::new(1000.0, 1000.0, LINE_OF_FIRE_MINIMUM);
    // The aim point is raised by the line-of-fire minimum, level with the muzzle.
    let order = FireOrder::new(
        arena.arms.lob,
        0,
        Aim::Point(Position::new(3000.0, 1000.0, 0.0)),
    )
    .from_muzzle(muzzle);
    let shot = arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let solution = arena.engine.projectile(shot).unwrap().ballistic.unwrap();
    let speed = solution.vx.hypot(solution.vz);
    assert!(speed > 400.0 * 1.1, "speed should be raised to reach, got {speed}");

    let mut peak = muzzle.z;
    let mut landing = None;
    for tick in 1..=40u32 {
        let snap = arena.tick();
        if let Some(view) = snap.projectiles.iter().find(|p| p.id == shot) {
            peak = peak.max(view.current.pos.z);
        }
        let miss = snap.events.iter().find_map(|e| match e {
            ProjectileEvent::Miss { position, .. } => Some(*position),
            _ => None,
        });
        if let Some(position) = miss {
            landing = Some((tick * TICK_MS, position));
            break;
        }
    }
    let (landed_at, position) = landing.expect("lob never came down");

    assert!(peak > muzzle.z + 100.0, "arc should rise, peak {peak}");
    let per_tick = solution.vx * TICK_MS as f64 / 1000.0;
    assert!(
        (position.x - 3000.0).abs() <= per_tick,
        "landed at {position:?}, {per_tick} per tick"
    );
    assert!((position.y - 1000.0).abs() < 1.0);
    let flight_ms = solution.flight_time * 1000.0;
    assert!(
        (landed_at as f64 - flight_ms).abs() <= (TICK_MS + 10) as f64,
        "landed at {landed_at} ms, flight {flight_ms} ms"
    );
}

#[test]
fn test_shot_into_ground_misses() {
    let mut arena = Arena::new(6);
    let order = FireOrder::new(
        arena.arms.cannon,
        0,
        Aim::Point(Position::new(1500.0, 1000.0, -200.0)),
    )
    .from_muzzle(Position::new(1000.0, 1000.0, 100.0));
    arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let events = arena.run(5);
    let miss = events
        .iter()
        .find_map(|e| match e {
            ProjectileEvent::Miss { position, .. } => Some(*position),
            _ => None,
        })
        .expect("should hit the ground");
    // Line from z 100 to z -195 over 500 units meets the ground near x = 1169.
    assert!((miss.x - 1169.0).abs() < 10.0, "ground hit at {miss:?}");
    assert!(miss.z.abs() < 5.0);
}

#[test]
fn test_out_of_bounds_is_terminated() {
    let mut arena = Arena::new(7);
    let order = FireOrder::new(
        arena.arms.heavy_cannon,
        0,
        Aim::Point(Position::new(-5000.0, 100.0, 50.0)),
    )
    .from_muzzle(Position::new(100.0, 100.0, 50.0));
    arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let events = arena.run(2);
    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::OutOfBounds { .. })),
        1
    );
    assert_eq!(arena.engine.live_count(), 0);
}

// ---- Penetration ----

#[test]
fn test_penetration_continues_through_first_target() {
    let mut arena = Arena::new(8);
    let first = arena.spawn(tank(1, 1500.0, 1000.0));
    let second = arena.spawn(tank(1, 2500.0, 1000.0));
    let order = FireOrder::new(
        arena.arms.rail,
        0,
        Aim::Point(Position::new(1500.0, 1000.0, 25.0)),
    )
    .from_muzzle(Position::new(500.0, 1000.0, 40.0));
    let shot = arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let snap = arena.tick();
    let continuation = snap
        .events
        .iter()
        .find_map(|e| match e {
            ProjectileEvent::Penetrated {
                projectile,
                continuation,
            } if *projectile == shot => Some(*continuation),
            _ => None,
        })
        .expect("rail should pass through the first tank");
    // 30 anti-tank against tracked armour is 36.
    assert_eq!(arena.body(first), 164);
    assert_eq!(arena.body(second), 200);

    let child = arena.engine.projectile(continuation).unwrap();
    assert!(child.has_damaged(first));
    assert_eq!(child.state, ProjectileState::InFlight);
    assert!(child.current.time < 100);

    arena.run(1);
    assert_eq!(arena.body(first), 164, "never hit twice");
    assert_eq!(arena.body(second), 164);
}

// ---- Area effects ----

#[test]
fn test_splash_spares_primary_and_friends() {
    let mut arena = Arena::new(9);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2500.0, 1000.0));
    let neighbour = arena.spawn(tank(1, 2560.0, 1000.0));
    let friend = arena.spawn(tank(0, 2500.0, 1080.0));

    arena.fire_at(arena.arms.mortar, gun, target);
    let events = arena.run(20);

    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Impact { .. })), 1);
    // Direct: 80 artillery against tracked is 68. Splash never repeats on the target.
    assert_eq!(arena.body(target), 132);
    // Splash: 40 at 85 percent.
    assert_eq!(arena.body(neighbour), 166);
    assert_eq!(arena.body(friend), 200);
    // The impact area has expired.
    assert_eq!(arena.engine.live_count(), 0);
}

#[test]
fn test_burning_area_damages_over_time() {
    let mut arena = Arena::new(10);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 1600.0, 1000.0));
    let friend = arena.spawn(tank(0, 1620.0, 1040.0));

    arena.fire_at(arena.arms.flamer, gun, target);
    arena.run(7);
    let after_hit = arena.body(target);
    assert!(after_hit < 200);

    arena.run(10);
    let burning = arena.body(target);
    assert!(burning < after_hit, "area should keep burning");

    // Area lasts two seconds from impact.
    arena.run(20);
    let burnt_out = arena.body(target);
    arena.run(10);
    assert_eq!(arena.body(target), burnt_out);
    assert_eq!(arena.body(friend), 200);
    assert_eq!(arena.engine.live_count(), 0);
}

// ---- Homing ----

#[test]
fn test_destination_death_releases_expected_damage() {
    let mut arena = Arena::new(11);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 4000.0, 1000.0));

    let shot = arena.fire_at(arena.arms.missile, gun, target);
    arena.tick();
    assert_eq!(arena.field.expected_damage_of(target).unwrap().direct, 84);

    // Something else destroys the target mid-flight.
    let kill = DamageRequest {
        damage: 10_000,
        class: WeaponClass::Kinetic,
        subclass: WeaponSubclass::Cannon,
        at_time: 100,
        per_second: false,
        min_damage: 100,
    };
    arena.field.apply_damage(target, &kill);
    arena.tick();

    assert_eq!(arena.field.expected_damage_of(target).unwrap().direct, 0);
    assert_eq!(arena.engine.projectile(shot).unwrap().destination, None);
    arena.field.reap_dead();

    let events = arena.run(60);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Miss { .. })), 1);
    assert_eq!(arena.engine.score(0).misses, 1);
}

#[test]
fn test_target_killed_before_first_step_is_a_miss() {
    let mut arena = Arena::new(19);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2000.0, 1000.0));

    arena.fire_at(arena.arms.cannon, gun, target);
    arena.field.apply_damage(
        target,
        &DamageRequest {
            damage: 10_000,
            class: WeaponClass::Kinetic,
            subclass: WeaponSubclass::Cannon,
            at_time: 0,
            per_second: false,
            min_damage: 100,
        },
    );

    let events = arena.run(12);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Impact { .. })), 0);
    assert_eq!(count(&events, |e| matches!(e, ProjectileEvent::Miss { .. })), 1);
    assert_eq!(arena.engine.score(0).hits, 0);
    assert_eq!(arena.field.expected_damage_of(target).unwrap().direct, 0);
    assert_eq!(arena.engine.live_count(), 0);
}

#[test]
fn test_homing_follows_moving_target() {
    let mut arena = Arena::new(12);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 3000.0, 1000.0));
    arena
        .field
        .set_velocity(target, Velocity::new(0.0, 100.0, 0.0));

    arena.fire_at(arena.arms.missile, gun, target);
    let mut hit = false;
    for tick in 1..=30 {
        let y = 1000.0 + 10.0 * tick as f64;
        arena.field.move_object(target, Position::new(3000.0, y, 0.0));
        let snap = arena.tick();
        if snap
            .events
            .iter()
            .any(|e| matches!(e, ProjectileEvent::Impact { .. }))
        {
            hit = true;
            break;
        }
    }
    assert!(hit, "homing shot should catch a slow mover");
    assert!(arena.body(target) < 200);
}

#[test]
fn test_terrain_following_reaches_target() {
    let mut arena = Arena::new(13);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 3000.0, 1000.0));

    let shot = arena.fire_at(arena.arms.cruise, gun, target);
    let mut peak: f64 = 0.0;
    let mut hit = false;
    for _ in 0..100 {
        let snap = arena.tick();
        if let Some(view) = snap.projectiles.iter().find(|p| p.id == shot) {
            peak = peak.max(view.current.pos.z);
        }
        if snap
            .events
            .iter()
            .any(|e| matches!(e, ProjectileEvent::Impact { .. }))
        {
            hit = true;
            break;
        }
    }
    assert!(hit, "cruise shot never arrived");
    assert!(peak > 150.0, "should climb to cruise altitude, peak {peak}");
    assert!(arena.body(target) < 200);
}

// ---- Damage bookkeeping ----

#[test]
fn test_kill_awards_experience_to_shooter_and_sensor() {
    let mut arena = Arena::new(14);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let sensor = arena.spawn(tank(0, 900.0, 900.0));
    let target = arena.spawn(tank(1, 2000.0, 1000.0));
    arena.field.set_fire_support(gun, sensor);

    arena.fire_at(arena.arms.heavy_cannon, gun, target);
    let events = arena.run(8);

    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::Destroyed { player: 0, .. })),
        1
    );
    assert_eq!(arena.engine.score(0).kills, 1);
    assert_eq!(arena.field.experience_of(gun), Some(100.0));
    assert_eq!(arena.field.experience_of(sensor), Some(100.0));
    assert_eq!(arena.field.reap_dead(), vec![target]);
}

#[test]
fn test_electronic_hit_captures() {
    let mut arena = Arena::new(15);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(UnitSpec {
        resistance: 50,
        ..tank(1, 2000.0, 1000.0)
    });

    arena.fire_at(arena.arms.zapper, gun, target);
    let events = arena.run(8);

    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::Captured { player: 0, .. })),
        1
    );
    assert_eq!(arena.field.owner_of(target), Some(0));
    assert_eq!(arena.body(target), 200, "electronic hits do no body damage");
    assert_eq!(arena.engine.score(0).captures, 1);
}

// ---- Fire validation ----

#[test]
fn test_fire_rejects_bad_requests() {
    let mut arena = Arena::new(16);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2000.0, 1000.0));

    let unknown = FireOrder::new(WeaponId(99), 0, Aim::Target(target)).from_source(gun);
    assert_eq!(
        arena
            .engine
            .try_fire(&mut arena.field, &arena.terrain, unknown),
        Err(FireError::UnknownWeapon(WeaponId(99)))
    );

    let nowhere = FireOrder::new(arena.arms.cannon, 0, Aim::Target(target));
    assert_eq!(
        arena
            .engine
            .try_fire(&mut arena.field, &arena.terrain, nowhere),
        Err(FireError::NoOrigin)
    );

    arena.field.apply_damage(
        target,
        &DamageRequest {
            damage: 10_000,
            class: WeaponClass::Kinetic,
            subclass: WeaponSubclass::Cannon,
            at_time: 0,
            per_second: false,
            min_damage: 100,
        },
    );
    let dead = FireOrder::new(arena.arms.cannon, 0, Aim::Target(target)).from_source(gun);
    assert!(arena
        .engine
        .fire(&mut arena.field, &arena.terrain, dead)
        .is_none());
    assert_eq!(arena.engine.live_count(), 0);
    assert_eq!(arena.engine.score(0).shots_on_target, 0);
}

#[test]
fn test_indirect_fire_respects_min_angle() {
    let mut arena = Arena::new(17);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 2500.0, 1000.0));

    let min_angle = 50f64.to_radians();
    let order = FireOrder::new(arena.arms.mortar, 0, Aim::Target(target))
        .from_source(gun)
        .with_min_angle(min_angle);
    let shot = arena
        .engine
        .fire(&mut arena.field, &arena.terrain, order)
        .unwrap();

    let solution = arena.engine.projectile(shot).unwrap().ballistic.unwrap();
    assert!(solution.launch_angle() >= min_angle - 1e-9);
    assert!(solution.vz >= 0.0);
}

#[test]
fn test_visibility_follows_observer() {
    let mut arena = Arena::new(18);
    let gun = arena.spawn(tank(1, 1000.0, 1000.0));
    let target = arena.spawn(tank(0, 3000.0, 1000.0));
    arena.field.set_observer(Some(0));

    // Hidden shooter, but the shot is aimed at the observer's unit.
    arena.fire_at(arena.arms.cannon, gun, target);
    let snap = arena.tick();
    assert_eq!(
        count(&snap.events, |e| matches!(e, ProjectileEvent::BecameVisible { .. })),
        1
    );
    assert!(snap.projectiles.iter().all(|p| p.visible));
}

#[test]
fn test_visible_at_fire_announces_once() {
    let mut arena = Arena::new(23);
    let gun = arena.spawn(tank(0, 1000.0, 1000.0));
    let target = arena.spawn(tank(1, 3000.0, 1000.0));
    arena.field.set_observer(Some(0));

    // The observer owns the shooter.
    let seen = arena.fire_at(arena.arms.cannon, gun, target);
    let hinted = arena
        .engine
        .fire(
            &mut arena.field,
            &arena.terrain,
            FireOrder::new(
                arena.arms.cannon,
                1,
                Aim::Point(Position::new(1000.0, 3000.0, 0.0)),
            )
            .from_muzzle(Position::new(1000.0, 2000.0, 40.0))
            .visible(true),
        )
        .unwrap();

    let snap = arena.tick();
    for shot in [seen, hinted] {
        assert_eq!(
            count(&snap.events, |e| matches!(e, ProjectileEvent::BecameVisible { projectile } if *projectile == shot)),
            1
        );
    }

    let events = arena.run(5);
    assert_eq!(
        count(&events, |e| matches!(e, ProjectileEvent::BecameVisible { .. })),
        0
    );
}

#[test]
fn test_future_fire_time_is_clamped_to_now() {
    let mut arena = Arena::new(24);
    let muzzle = Position::new(1000.0, 1000.0, 40.0);
    let aim = Aim::Point(Position::new(3000.0, 1000.0, 0.0));

    let early = FireOrder::new(arena.arms.cannon, 0, aim)
        .from_muzzle(muzzle)
        .at_time(500);
    let shot = arena
        .engine
        .fire(&mut arena.field, &arena.terrain, early)
        .unwrap();
    assert_eq!(arena.engine.projectile(shot).unwrap().born, 0);

    let snap = arena.tick();
    let view = snap.projectiles.iter().find(|p| p.id == shot).unwrap();
    assert!(view.previous.time < view.current.time);
    assert_eq!(view.current.time, 100);

    // A time in the past is kept.
    let late = FireOrder::new(arena.arms.cannon, 0, aim)
        .from_muzzle(muzzle)
        .at_time(40);
    let shot = arena
        .engine
        .fire(&mut arena.field, &arena.terrain, late)
        .unwrap();
    assert_eq!(arena.engine.projectile(shot).unwrap().born, 40);
}
