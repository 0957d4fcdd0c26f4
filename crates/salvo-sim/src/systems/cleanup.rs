//! Cleanup system: drops references to dead entities and terminates shots
//! that leave the world.

use log::warn;

use salvo_core::enums::ProjectileState;
use salvo_core::events::ProjectileEvent;

use crate::projectile::Projectile;
use crate::world::{CombatWorld, ObjectId};

use super::StepContext;

fn is_alive(world: &dyn CombatWorld, id: ObjectId) -> bool {
    world.object(id).is_some_and(|view| view.alive)
}

/// Clear the source and destination if they died, and forget dead entries
/// of the damaged set.
pub fn refresh_references(proj: &mut Projectile, world: &mut dyn CombatWorld) {
    if proj.source.is_some_and(|id| !is_alive(&*world, id)) {
        proj.source = None;
    }
    if proj.destination.is_some_and(|id| !is_alive(&*world, id)) {
        proj.set_destination(world, None);
    }
    let view: &dyn CombatWorld = &*world;
    proj.damaged.retain(|id| is_alive(view, *id));
}

/// Terminate a shot found outside the world. Returns false if it was removed.
pub fn enforce_bounds(proj: &mut Projectile, ctx: &mut StepContext<'_>) -> bool {
    let pos = proj.current.pos;
    if ctx.terrain.contains(pos.x, pos.y) {
        return true;
    }

    warn!(
        "projectile {} left the world at ({:.0}, {:.0}), removing",
        proj.id, pos.x, pos.y
    );
    proj.set_destination(ctx.world, None);
    proj.state = ProjectileState::Inactive;
    ctx.events
        .push(ProjectileEvent::OutOfBounds { projectile: proj.id });
    false
}
