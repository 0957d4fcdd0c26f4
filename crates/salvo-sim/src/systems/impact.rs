//! Impact system: resolves what a shot hit, applies direct and splash
//! damage, and spawns penetration continuations.

use rand::Rng;

use salvo_core::constants::{PENETRATION_RANGE_FACTOR, TILE_UNITS};
use salvo_core::enums::ProjectileState;
use salvo_core::events::ProjectileEvent;
use salvo_core::weapons::WeaponStats;

use crate::damage::{calc_damage, DamageRequest};
use crate::geometry;
use crate::projectile::Projectile;
use crate::world::{ObjectId, ObjectView};

use super::{deal_damage, sorted_candidates, StepContext};

/// Extra search distance so large footprints whose centre lies outside the
/// blast radius are still considered.
const SPLASH_SEARCH_PAD: f64 = (TILE_UNITS * 2) as f64;

/// Resolve the impact. Returns a continuation if the shot passed through.
pub fn run(
    proj: &mut Projectile,
    stats: &WeaponStats,
    ctx: &mut StepContext<'_>,
) -> Option<Projectile> {
    *ctx.last_attacker = proj.source;
    let position = proj.current.pos;

    let target = proj
        .destination
        .and_then(|id| ctx.world.object(id))
        .filter(|view| view.alive);

    let mut continuation = None;
    match target {
        None => {
            proj.set_destination(ctx.world, None);
            ctx.score.player_mut(proj.player).misses += 1;
            ctx.events.push(ProjectileEvent::Miss {
                projectile: proj.id,
                position,
                cue: stats.cues.miss.clone(),
            });
        }
        Some(view) => {
            ctx.score.player_mut(proj.player).hits += 1;
            ctx.events.push(ProjectileEvent::Impact {
                projectile: proj.id,
                target: view.id.to_bits().get(),
                position,
                cue: stats.cues.impact.clone(),
            });

            if stats.subclass.is_electronic() {
                electronic_hit(proj, stats, &view, ctx);
            } else {
                if stats.penetrate
                    && view.kind.is_penetrable()
                    && proj.travelled < stats.long_range * PENETRATION_RANGE_FACTOR
                {
                    proj.mark_damaged(view.id);
                    continuation = Some(continuation_of(proj));
                }
                direct_hit(proj, stats, &view, ctx);
            }
            proj.set_destination(ctx.world, None);
        }
    }

    if stats.radius > 0.0 {
        splash(proj, stats, target.map(|view| view.id), ctx);
    }

    if stats.has_area_effect() {
        proj.state = ProjectileState::PostImpact;
        proj.born = proj.current.time;
    } else {
        proj.state = ProjectileState::Inactive;
    }
    continuation
}

fn direct_hit(
    proj: &mut Projectile,
    stats: &WeaponStats,
    view: &ObjectView,
    ctx: &mut StepContext<'_>,
) {
    let damage = calc_damage(
        stats.damage,
        stats.effect,
        view.armor,
        &ctx.config.damage_modifiers,
    );
    let request = DamageRequest {
        damage,
        class: stats.class,
        subclass: stats.subclass,
        at_time: proj.current.time,
        per_second: false,
        min_damage: stats.min_damage,
    };
    if let Some(relative) = deal_damage(proj, view, &request, ctx) {
        if relative >= 0.0 {
            proj.mark_damaged(view.id);
        }
    }
}

fn electronic_hit(
    proj: &Projectile,
    stats: &WeaponStats,
    view: &ObjectView,
    ctx: &mut StepContext<'_>,
) {
    let strength = calc_damage(
        stats.damage,
        stats.effect,
        view.armor,
        &ctx.config.damage_modifiers,
    );
    if !ctx.world.apply_electronic(view.id, strength, proj.player) {
        return;
    }
    ctx.score.player_mut(proj.player).captures += 1;
    ctx.events.push(ProjectileEvent::Captured {
        target: view.id.to_bits().get(),
        player: proj.player,
    });
    crate::experience::award(
        ctx.world,
        ctx.config,
        proj.source,
        proj.player,
        view,
        1.0,
    );
}

/// A fresh shot continuing from the impact point with the same launch data.
fn continuation_of(parent: &Projectile) -> Projectile {
    Projectile {
        state: ProjectileState::InFlight,
        destination: None,
        expected_damage: 0,
        previous: parent.current,
        current: parent.current,
        ..parent.clone()
    }
}

/// Damage everything in the blast radius except the object struck directly.
fn splash(
    proj: &Projectile,
    stats: &WeaponStats,
    primary: Option<ObjectId>,
    ctx: &mut StepContext<'_>,
) {
    let centre = proj.current.pos;
    let candidates = sorted_candidates(&*ctx.world, &centre, stats.radius + SPLASH_SEARCH_PAD);
    for id in candidates {
        if primary == Some(id) {
            continue;
        }
        let Some(view) = ctx.world.object(id) else {
            continue;
        };
        if !view.alive || !view.damageable || !stats.targets.covers(view.airborne) {
            continue;
        }
        if stats.no_friendly_fire && ctx.world.is_ally(view.player, proj.player) {
            continue;
        }
        if !geometry::within_blast(&view, &centre, stats.radius) {
            continue;
        }
        if ctx.rng.gen_range(0..100) >= stats.radius_hit_chance {
            continue;
        }

        let damage = calc_damage(
            stats.radius_damage,
            stats.effect,
            view.armor,
            &ctx.config.damage_modifiers,
        );
        let request = DamageRequest {
            damage,
            class: stats.class,
            subclass: stats.subclass,
            at_time: proj.current.time,
            per_second: false,
            min_damage: stats.min_damage,
        };
        deal_damage(proj, &view, &request, ctx);
    }
}
