//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// How a projectile moves. Resolved once at fire time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionModel {
    /// Straight line from origin through the aim point.
    #[default]
    Direct,
    /// Ballistic parabola.
    Indirect,
    /// Re-aims each tick at the predicted position of a moving target.
    HomingDirect,
    /// As `HomingDirect`, holding an altitude band above terrain.
    HomingIndirect,
}

impl MotionModel {
    /// Direct-fire models hit whatever crosses their line; ballistic ones lob over it.
    pub fn is_direct(self) -> bool {
        !matches!(self, MotionModel::Indirect)
    }
}

/// Projectile lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    #[default]
    InFlight,
    Impact,
    /// Area effects (splash visuals, periodic damage) still running.
    PostImpact,
    /// Finished; removed at the next registry sweep.
    Inactive,
}

/// Runtime kind of a combat entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Mobile unit. Circular footprint, penetrable.
    Unit,
    /// Built structure. Rectangular footprint.
    Structure,
    /// Terrain feature (trees, wrecks, boulders). Rectangular footprint.
    Feature,
}

impl EntityKind {
    /// Whether a penetrating weapon continues past this kind of object.
    pub fn is_penetrable(self) -> bool {
        matches!(self, EntityKind::Unit)
    }
}

/// Weapon effect, the row of the damage-modifier table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponEffect {
    AntiPersonnel,
    #[default]
    AntiTank,
    BunkerBuster,
    ArtilleryRound,
    Flamer,
    AntiAircraft,
}

impl WeaponEffect {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Armor class of a target, the column of the damage-modifier table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorClass {
    #[default]
    Wheeled,
    Tracked,
    Legged,
    Hover,
    Lift,
    SoftStructure,
    MediumStructure,
    HardStructure,
    Bunker,
    Feature,
}

impl ArmorClass {
    pub const COUNT: usize = 10;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Damage class, selects which armour value absorbs the hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    #[default]
    Kinetic,
    Heat,
}

/// Damage subclass of a weapon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponSubclass {
    MachineGun,
    #[default]
    Cannon,
    Mortar,
    Howitzer,
    Rocket,
    Missile,
    Flame,
    Energy,
    /// Reduces a target's capture resistance instead of its body.
    Electronic,
    /// Disables; deals no damage.
    Emp,
}

impl WeaponSubclass {
    pub fn is_electronic(self) -> bool {
        matches!(self, WeaponSubclass::Electronic)
    }
}
