//! In-flight system: moves a shot and finds the first thing it hits.

use salvo_core::constants::COLLISION_TIME_SCALE;
use salvo_core::enums::ProjectileState;
use salvo_core::events::ProjectileEvent;
use salvo_core::types::{GameTime, Position, Spacetime};
use salvo_core::weapons::WeaponStats;

use crate::collision;
use crate::geometry;
use crate::motion;
use crate::projectile::Projectile;
use crate::world::ObjectId;

use super::{sorted_candidates, StepContext};

pub fn run(proj: &mut Projectile, stats: &WeaponStats, ctx: &mut StepContext<'_>) {
    let travelled_before = proj.travelled;
    let (pos, rot) = motion::advance(
        proj,
        stats,
        &*ctx.world,
        ctx.terrain,
        &ctx.config.homing,
        ctx.now,
    );
    proj.current = Spacetime::new(pos, rot, ctx.now);
    update_visibility(proj, ctx);

    // Nothing past the point where range runs out can be hit.
    let exhausted_at = range_exhausted_at(proj, travelled_before, stats.max_travel());
    let deadline = exhausted_at.unwrap_or(proj.current.time);

    let hit = earliest_collision(proj, stats, ctx).filter(|&(_, time)| time <= deadline);
    if let Some((target, time)) = hit {
        settle_at(proj, travelled_before, time);
        proj.set_destination(ctx.world, target);
        proj.state = ProjectileState::Impact;
        return;
    }

    if let Some(time) = exhausted_at {
        settle_at(proj, travelled_before, time);
        proj.set_destination(ctx.world, None);
        proj.state = ProjectileState::Impact;
    }
}

/// Game time within this tick's segment at which the distance flown first
/// reaches `max`, or `None` while the shot is still in range.
fn range_exhausted_at(proj: &Projectile, travelled_before: f64, max: f64) -> Option<GameTime> {
    if proj.travelled < max {
        return None;
    }
    let prev = proj.previous.time;
    let span = proj.current.time.saturating_sub(prev);
    let gained = proj.travelled - travelled_before;
    let fraction = if gained > 0.0 {
        ((max - travelled_before) / gained).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(prev + (span as f64 * fraction).floor() as GameTime)
}

/// Pulls the current sample and the distance flown back to `time`.
fn settle_at(proj: &mut Projectile, travelled_before: f64, time: GameTime) {
    let prev = proj.previous;
    let span = proj.current.time.saturating_sub(prev.time);
    if span > 0 {
        let t = time.saturating_sub(prev.time) as f64 / span as f64;
        proj.travelled = travelled_before + (proj.travelled - travelled_before) * t;
    }
    proj.current = Spacetime::interpolate(&prev, &proj.current, time);
    if proj.current.time == proj.previous.time {
        // Keep the interpolation pair strictly ordered.
        proj.previous.time = proj.previous.time.saturating_sub(1);
    }
}

fn update_visibility(proj: &mut Projectile, ctx: &mut StepContext<'_>) {
    if proj.visible {
        return;
    }
    let seen = [proj.source, proj.destination]
        .into_iter()
        .flatten()
        .any(|id| ctx.world.observer_sees(id));
    if seen {
        proj.visible = true;
        ctx.events
            .push(ProjectileEvent::BecameVisible { projectile: proj.id });
    }
}

/// First object or terrain crossing along this tick's segment. `None` as
/// the target means the terrain.
fn earliest_collision(
    proj: &Projectile,
    stats: &WeaponStats,
    ctx: &StepContext<'_>,
) -> Option<(Option<ObjectId>, GameTime)> {
    let prev = proj.previous;
    let cur = proj.current;
    let span = cur.time.saturating_sub(prev.time) as i64;

    let mid = Position::new(
        (prev.pos.x + cur.pos.x) / 2.0,
        (prev.pos.y + cur.pos.y) / 2.0,
        (prev.pos.z + cur.pos.z) / 2.0,
    );
    let reach = ctx.config.neighbour_range + prev.pos.horizontal_range_to(&cur.pos) / 2.0;

    let mut best: Option<(Option<ObjectId>, GameTime)> = None;
    for id in sorted_candidates(&*ctx.world, &mid, reach) {
        if proj.has_damaged(id) || proj.source == Some(id) {
            continue;
        }
        let Some(view) = ctx.world.object(id) else {
            continue;
        };
        if !view.alive || !view.damageable || !stats.targets.covers(view.airborne) {
            continue;
        }
        if proj.destination != Some(id) && ctx.world.is_ally(view.player, proj.player) {
            continue;
        }

        let centre = geometry::center_of(&view).to_grid();
        let start = prev.pos.to_grid().relative_to(&centre);
        let end = cur.pos.to_grid().relative_to(&centre);
        let half_height = (geometry::effective_height(&view) / 2.0).ceil().max(1.0) as i32;

        let Some(fraction) = collision::collision_time(
            start,
            end,
            &geometry::envelope_of(&view),
            half_height,
        ) else {
            continue;
        };
        let time = prev.time + (span * fraction / COLLISION_TIME_SCALE) as GameTime;
        if best.map_or(true, |(_, t)| time < t) {
            best = Some((Some(id), time));
        }
    }

    if let Some(t) = ctx.terrain.segment_intersection(&prev.pos, &cur.pos) {
        let time = prev.time + (span as f64 * t).floor() as GameTime;
        if best.map_or(true, |(_, bt)| time < bt) {
            best = Some((None, time));
        }
    }

    best
}
