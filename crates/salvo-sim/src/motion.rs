//! Motion models: where a shot is at a given time.
//!
//! Direct and indirect shots are closed-form in the time since launch, so a
//! skipped tick never changes where they end up. Homing shots integrate one
//! step per tick from their previous position.

use glam::{DVec2, DVec3};

use salvo_core::constants::GRAVITY;
use salvo_core::enums::MotionModel;
use salvo_core::types::{GameTime, Position, Rotation, Velocity};
use salvo_core::weapons::WeaponStats;
use salvo_terrain::TerrainQuery;

use crate::config::HomingTuning;
use crate::geometry;
use crate::projectile::Projectile;
use crate::world::CombatWorld;

/// Move `proj` to game time `now`. Updates the aim point and distance flown
/// and returns the new position and orientation.
pub fn advance(
    proj: &mut Projectile,
    stats: &WeaponStats,
    world: &dyn CombatWorld,
    terrain: &dyn TerrainQuery,
    tuning: &HomingTuning,
    now: GameTime,
) -> (Position, Rotation) {
    match proj.motion {
        MotionModel::Direct => direct(proj, stats, now),
        MotionModel::Indirect => match proj.ballistic {
            Some(_) => indirect(proj, now),
            None => direct(proj, stats, now),
        },
        MotionModel::HomingDirect | MotionModel::HomingIndirect => {
            homing(proj, stats, world, terrain, tuning, now)
        }
    }
}

fn seconds_since(from: GameTime, now: GameTime) -> f64 {
    now.saturating_sub(from) as f64 / 1000.0
}

fn direct(proj: &mut Projectile, stats: &WeaponStats, now: GameTime) -> (Position, Rotation) {
    let elapsed = seconds_since(proj.born, now);
    let delta = proj.src.delta_to(&proj.dst);
    let target_distance = proj.src.horizontal_range_to(&proj.dst).max(1.0);
    let current_distance = elapsed * stats.flight_speed;

    proj.travelled = current_distance;
    let pos = proj.src.offset(&delta, current_distance / target_distance);
    let rot = Rotation {
        direction: proj.src.direction_to(&proj.dst),
        pitch: delta.z.atan2(target_distance),
        roll: 0.0,
    };
    (pos, rot)
}

fn indirect(proj: &mut Projectile, now: GameTime) -> (Position, Rotation) {
    let Some(ballistic) = proj.ballistic else {
        return (proj.current.pos, proj.current.rot);
    };
    let elapsed = seconds_since(proj.born, now);
    let delta = proj.src.delta_to(&proj.dst);
    let target_distance = proj.src.horizontal_range_to(&proj.dst).max(1.0);
    let current_distance = elapsed * ballistic.vx;

    proj.travelled = current_distance;
    let t = current_distance / target_distance;
    let pos = Position::new(
        proj.src.x + delta.x * t,
        proj.src.y + delta.y * t,
        proj.src.z + ballistic.height_at(elapsed),
    );
    let rot = Rotation {
        direction: proj.src.direction_to(&proj.dst),
        pitch: (ballistic.vz - elapsed * GRAVITY).atan2(ballistic.vx),
        roll: 0.0,
    };
    (pos, rot)
}

/// Lead point for a moving target. The target's speed counts for at most
/// `lead_fraction` of the shot's speed.
pub fn lead_point(
    target: &Position,
    velocity: &Velocity,
    own: &Position,
    speed: f64,
    lead_fraction: f64,
) -> Position {
    let target_speed = velocity.horizontal_speed();
    if target_speed <= 0.0 || speed <= 0.0 {
        return *target;
    }
    let cap = speed * lead_fraction;
    let scale = if target_speed > cap {
        cap / target_speed
    } else {
        1.0
    };
    let (vx, vy) = (velocity.x * scale, velocity.y * scale);

    let mut tti = own.horizontal_range_to(target) / speed;
    for _ in 0..2 {
        let pred = Position::new(target.x + vx * tti, target.y + vy * tti, target.z);
        tti = own.horizontal_range_to(&pred) / speed;
    }
    Position::new(target.x + vx * tti, target.y + vy * tti, target.z)
}

fn homing(
    proj: &mut Projectile,
    stats: &WeaponStats,
    world: &dyn CombatWorld,
    terrain: &dyn TerrainQuery,
    tuning: &HomingTuning,
    now: GameTime,
) -> (Position, Rotation) {
    let pos = proj.previous.pos;
    let step = stats.flight_speed * seconds_since(proj.previous.time, now);

    if let Some(view) = proj
        .destination
        .and_then(|id| world.object(id))
        .filter(|view| view.alive)
    {
        let centre = geometry::center_of(&view);
        let mut aim = lead_point(
            &centre,
            &view.velocity,
            &pos,
            stats.flight_speed,
            tuning.lead_speed_fraction,
        );
        let (width, height) = terrain.extent();
        aim.x = aim.x.clamp(0.0, (width - 1.0).max(0.0));
        aim.y = aim.y.clamp(0.0, (height - 1.0).max(0.0));
        proj.dst = aim;
    }

    let delta = match proj.motion {
        MotionModel::HomingIndirect => terrain_following_step(proj, terrain, tuning, step),
        // Lost its target: keep flying straight on.
        _ if proj.destination.is_none() => proj.heading,
        _ => pos.delta_to(&proj.dst).to_dvec3(),
    };
    let dir = delta.try_normalize().unwrap_or(proj.heading);
    proj.heading = dir;
    proj.travelled += step;

    let new_pos = Position::from_dvec3(pos.to_dvec3() + dir * step);
    let rot = Rotation {
        direction: dir.y.atan2(dir.x),
        pitch: dir.z.atan2(DVec2::new(dir.x, dir.y).length()),
        roll: 0.0,
    };
    (new_pos, rot)
}

/// Movement vector for one step of a terrain-following shot.
///
/// Cruises inside an altitude band above the ground and descends onto the
/// aim point as it closes in. Without a target it dives into the ground.
fn terrain_following_step(
    proj: &Projectile,
    terrain: &dyn TerrainQuery,
    tuning: &HomingTuning,
    step: f64,
) -> DVec3 {
    let pos = proj.previous.pos;
    let dst = proj.dst;
    let flat = DVec2::new(dst.x - pos.x, dst.y - pos.y);
    let horizontal = flat.length();
    let heading = flat.normalize_or_zero();

    if proj.destination.is_none() {
        let ground = terrain.height_at(pos.x, pos.y);
        return DVec3::new(flat.x, flat.y, ground - 1.0 - pos.z);
    }

    let ahead = DVec2::new(pos.x, pos.y) + heading * step * 2.0;
    let ground = terrain
        .height_at(pos.x, pos.y)
        .max(terrain.height_at(ahead.x, ahead.y));
    let band_min = ground + (horizontal / 4.0).min(tuning.height_min);
    let band_max = dst.z.max(ground + tuning.height_max).max(band_min);
    let cruise = pos.z.clamp(band_min, band_max);

    let blend = if horizontal > 0.0 {
        (step / horizontal).min(1.0)
    } else {
        1.0
    };
    let along = heading * step.min(horizontal);
    let mut next_z = cruise + (dst.z - cruise) * blend;

    for _ in 0..tuning.altitude_retries {
        let dir = DVec3::new(along.x, along.y, next_z - pos.z).normalize_or_zero();
        let end = Position::from_dvec3(pos.to_dvec3() + dir * step);
        if terrain.segment_intersection(&pos, &end).is_none() {
            break;
        }
        next_z += step / 4.0 + 1.0;
    }

    DVec3::new(along.x, along.y, next_z - pos.z)
}
