//! Semantic events emitted by the projectile subsystem for presentation.
//!
//! Combat objects are referenced by their raw entity bits so this crate
//! stays independent of the ECS.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, Position, ProjectileId};
use crate::weapons::WeaponId;

/// Raw bits of a combat entity handle.
pub type ObjectBits = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProjectileEvent {
    /// A shot left the muzzle.
    Fired {
        projectile: ProjectileId,
        weapon: WeaponId,
        player: PlayerId,
        cue: Option<String>,
    },
    /// A shot became visible to the observing player.
    BecameVisible { projectile: ProjectileId },
    /// A shot struck an object.
    Impact {
        projectile: ProjectileId,
        target: ObjectBits,
        position: Position,
        cue: Option<String>,
    },
    /// A shot hit terrain or ran out of range.
    Miss {
        projectile: ProjectileId,
        position: Position,
        cue: Option<String>,
    },
    /// A penetrating shot spawned a continuation.
    Penetrated {
        projectile: ProjectileId,
        continuation: ProjectileId,
    },
    /// An object was destroyed by this subsystem's damage.
    Destroyed { target: ObjectBits, player: PlayerId },
    /// An electronic weapon took over an object.
    Captured { target: ObjectBits, player: PlayerId },
    /// A shot was force-terminated outside the world bounds.
    OutOfBounds { projectile: ProjectileId },
}
