//! The projectile record.

use glam::DVec3;

use salvo_core::enums::{MotionModel, ProjectileState};
use salvo_core::types::{GameTime, PlayerId, Position, ProjectileId, Spacetime};
use salvo_core::weapons::WeaponId;

use crate::trajectory::BallisticSolution;
use crate::world::{CombatWorld, ObjectId};

/// A shot in flight or the lingering area it left behind.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub weapon: WeaponId,
    pub player: PlayerId,
    pub motion: MotionModel,
    pub state: ProjectileState,

    /// Firing entity. Cleared when it dies.
    pub source: Option<ObjectId>,
    /// Intended target. Cleared when it dies or a shot misses.
    pub destination: Option<ObjectId>,

    /// Launch position.
    pub src: Position,
    /// Aim point. Homing shots move it every tick.
    pub dst: Position,
    /// Launch time. Reset to the impact time when an area effect starts.
    pub born: GameTime,

    pub previous: Spacetime,
    pub current: Spacetime,

    /// Damage this shot is expected to do to `destination`.
    pub expected_damage: u32,
    /// Whether the expected damage is booked as direct or indirect.
    pub direct: bool,
    /// Objects already hit by this shot or the shots it continued from.
    pub damaged: Vec<ObjectId>,

    pub ballistic: Option<BallisticSolution>,
    /// Distance flown so far.
    pub travelled: f64,
    /// Unit direction of the last homing step.
    pub heading: DVec3,
    pub visible: bool,
}

impl Projectile {
    /// Age in milliseconds since `born`.
    pub fn age(&self, now: GameTime) -> GameTime {
        now.saturating_sub(self.born)
    }

    pub fn has_damaged(&self, id: ObjectId) -> bool {
        self.damaged.contains(&id)
    }

    pub fn mark_damaged(&mut self, id: ObjectId) {
        if !self.has_damaged(id) {
            self.damaged.push(id);
        }
    }

    /// Retarget the shot, moving its expected damage from the old
    /// destination to the new one.
    pub fn set_destination(&mut self, world: &mut dyn CombatWorld, target: Option<ObjectId>) {
        if self.destination == target {
            return;
        }
        let amount = self.expected_damage as i64;
        if let Some(old) = self.destination {
            world.add_expected_damage(old, -amount, self.direct);
        }
        self.destination = target;
        if let Some(new) = target {
            world.add_expected_damage(new, amount, self.direct);
        }
    }
}
