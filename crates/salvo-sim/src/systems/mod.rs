//! Per-tick projectile systems.
//!
//! Systems are free functions over one projectile and a `StepContext`. They
//! do not own state; everything shared across shots lives in the engine and
//! is lent to them through the context.

pub mod cleanup;
pub mod impact;
pub mod in_flight;
pub mod post_impact;
pub mod snapshot;

use rand_chacha::ChaCha8Rng;

use salvo_core::enums::ProjectileState;
use salvo_core::events::ProjectileEvent;
use salvo_core::types::GameTime;
use salvo_core::weapons::WeaponStats;
use salvo_terrain::TerrainQuery;

use crate::config::SimConfig;
use crate::damage::DamageRequest;
use crate::experience::{self, ScoreState};
use crate::projectile::Projectile;
use crate::world::{CombatWorld, ObjectId, ObjectView};

/// Everything a projectile step may read or change besides the projectile itself.
pub struct StepContext<'a> {
    pub world: &'a mut dyn CombatWorld,
    pub terrain: &'a dyn TerrainQuery,
    pub config: &'a SimConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub score: &'a mut ScoreState,
    pub events: &'a mut Vec<ProjectileEvent>,
    pub last_attacker: &'a mut Option<ObjectId>,
    pub now: GameTime,
}

/// Advance one projectile by one tick.
///
/// States fall through: a shot that hits this tick resolves its impact and
/// starts its area effect in the same step. Returns a continuation to be
/// registered when a penetrating shot passes through its target.
pub fn step(
    proj: &mut Projectile,
    stats: &WeaponStats,
    ctx: &mut StepContext<'_>,
) -> Option<Projectile> {
    proj.previous = proj.current;
    cleanup::refresh_references(proj, ctx.world);
    if !cleanup::enforce_bounds(proj, ctx) {
        return None;
    }

    if proj.state == ProjectileState::InFlight {
        in_flight::run(proj, stats, ctx);
    }

    let mut continuation = None;
    if proj.state == ProjectileState::Impact {
        continuation = impact::run(proj, stats, ctx);
    }

    if proj.state == ProjectileState::PostImpact {
        post_impact::run(proj, stats, ctx);
    }

    continuation
}

/// Apply one damage request to `view` and book the outcome: experience for
/// the shooter, and a kill if it was destroyed.
pub(crate) fn deal_damage(
    proj: &Projectile,
    view: &ObjectView,
    request: &DamageRequest,
    ctx: &mut StepContext<'_>,
) -> Option<f64> {
    let relative = ctx.world.apply_damage(view.id, request)?;
    experience::award(
        ctx.world,
        ctx.config,
        proj.source,
        proj.player,
        view,
        relative,
    );
    if relative < 0.0 {
        ctx.score.player_mut(proj.player).kills += 1;
        ctx.events.push(ProjectileEvent::Destroyed {
            target: view.id.to_bits().get(),
            player: proj.player,
        });
    }
    Some(relative)
}

/// Candidates around `center`, in a stable order.
pub(crate) fn sorted_candidates(
    world: &dyn CombatWorld,
    center: &salvo_core::types::Position,
    radius: f64,
) -> Vec<ObjectId> {
    let mut ids = world.objects_in_radius(center, radius);
    ids.sort_by_key(|id| id.to_bits());
    ids.dedup();
    ids
}
