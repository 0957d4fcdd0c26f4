//! The combat world as seen by the projectile subsystem.
//!
//! Combat entities (units, structures, features) are owned elsewhere. The
//! subsystem reads them through `ObjectView` snapshots and talks back through
//! the narrow `CombatWorld` interface: damage dispatch, expected-damage
//! ledger, experience, and capture.

use salvo_core::enums::{ArmorClass, EntityKind};
use salvo_core::types::{PlayerId, Position, Velocity};

use crate::damage::DamageRequest;

/// Non-owning identity of a combat entity.
pub type ObjectId = hecs::Entity;

/// Ground footprint of a combat entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    /// Stationary objects occupy whole tiles.
    Tiles { width: u32, breadth: u32 },
    /// Mobile units are circles of this radius.
    Radius(f64),
}

/// Everything the subsystem reads about a combat entity in one tick.
#[derive(Debug, Clone, Copy)]
pub struct ObjectView {
    pub id: ObjectId,
    pub kind: EntityKind,
    pub player: PlayerId,
    /// Base position; `z` is the bottom of the object.
    pub position: Position,
    pub velocity: Velocity,
    pub alive: bool,
    pub footprint: Footprint,
    /// Body height in world units.
    pub height: f64,
    /// A flying mover that is currently in the air.
    pub airborne: bool,
    pub damageable: bool,
    pub armor: ArmorClass,
}

/// Purchase cost of a unit, compared when scaling experience.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCost {
    pub power: f64,
    pub points: f64,
}

pub trait CombatWorld {
    /// Snapshot of an entity, or None if it no longer exists.
    fn object(&self, id: ObjectId) -> Option<ObjectView>;

    /// Entities whose base lies within horizontal `radius` of `center`.
    fn objects_in_radius(&self, center: &Position, radius: f64) -> Vec<ObjectId>;

    /// Whether two players are allied. A player is always its own ally.
    fn is_ally(&self, a: PlayerId, b: PlayerId) -> bool;

    /// Muzzle position of `id`'s weapon in `slot`.
    fn muzzle_position(&self, id: ObjectId, _slot: Option<usize>) -> Option<Position> {
        let view = self.object(id)?;
        Some(Position::new(
            view.position.x,
            view.position.y,
            view.position.z + view.height,
        ))
    }

    /// Dispatch damage to the entity's own damage routine. Returns the signed
    /// relative damage (negative: destroyed), or None if the entity is gone.
    fn apply_damage(&mut self, id: ObjectId, request: &DamageRequest) -> Option<f64>;

    /// Reduce capture resistance. Returns true if the entity changed hands.
    fn apply_electronic(&mut self, id: ObjectId, strength: u32, attacker: PlayerId) -> bool;

    /// Adjust the damage the entity expects from shots already in flight.
    fn add_expected_damage(&mut self, id: ObjectId, amount: i64, direct: bool);

    fn grant_experience(&mut self, id: ObjectId, amount: f64);

    /// Sensor unit directing fire for `id`, if any.
    fn fire_support_sensor(&self, id: ObjectId) -> Option<ObjectId>;

    fn unit_cost(&self, id: ObjectId) -> Option<UnitCost>;

    /// Whether the observing player can see the entity.
    fn observer_sees(&self, _id: ObjectId) -> bool {
        false
    }
}
