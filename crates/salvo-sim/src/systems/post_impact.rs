//! Post-impact system: keeps an impact area alive and burns whatever
//! stands in it.

use salvo_core::enums::ProjectileState;
use salvo_core::weapons::WeaponStats;

use crate::damage::{calc_damage, DamageRequest};
use crate::projectile::Projectile;

use super::{deal_damage, sorted_candidates, StepContext};

pub fn run(proj: &mut Projectile, stats: &WeaponStats, ctx: &mut StepContext<'_>) {
    let age = proj.age(ctx.now);
    if age > stats.radius_life && age > stats.periodic_duration {
        proj.state = ProjectileState::Inactive;
        return;
    }

    if stats.periodic_duration > 0 && age <= stats.periodic_duration {
        burn(proj, stats, ctx);
    }
}

/// Apply one tick of periodic damage inside the area.
fn burn(proj: &Projectile, stats: &WeaponStats, ctx: &mut StepContext<'_>) {
    *ctx.last_attacker = proj.source;
    let centre = proj.current.pos;

    for id in sorted_candidates(&*ctx.world, &centre, stats.periodic_radius) {
        let Some(view) = ctx.world.object(id) else {
            continue;
        };
        if !view.alive || view.airborne || !view.damageable {
            continue;
        }
        if ctx.world.is_ally(view.player, proj.player) {
            continue;
        }

        let damage = calc_damage(
            stats.periodic_damage,
            stats.periodic_effect,
            view.armor,
            &ctx.config.damage_modifiers,
        );
        let request = DamageRequest {
            damage,
            class: stats.periodic_class,
            subclass: stats.periodic_subclass,
            at_time: ctx.now,
            per_second: true,
            min_damage: stats.min_damage,
        };
        deal_damage(proj, &view, &request, ctx);
    }
}
