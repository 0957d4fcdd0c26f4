//! Weapon stats and the stable-id weapon table.
//!
//! Stats are read-only once loaded. Cue identifiers are opaque strings handed
//! to the presentation layer untouched.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DISTANCE_EXTENSION, DEFAULT_MIN_DAMAGE_PERCENT};
use crate::enums::*;

/// Stable weapon identifier (index into the weapon table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

/// Which categories of target a weapon can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMask {
    pub ground: bool,
    pub air: bool,
}

impl Default for TargetMask {
    fn default() -> Self {
        Self {
            ground: true,
            air: false,
        }
    }
}

impl TargetMask {
    pub fn covers(&self, airborne: bool) -> bool {
        if airborne {
            self.air
        } else {
            self.ground
        }
    }
}

/// Opaque audio/visual cue identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponCues {
    #[serde(default)]
    pub fire: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub miss: Option<String>,
}

/// Every tunable the projectile subsystem reads from a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    /// Shots per minute. Informational for the attacker's own logic.
    #[serde(default)]
    pub fire_rate: u32,
    /// Nominal flight speed (units/s).
    pub flight_speed: f64,
    #[serde(default)]
    pub movement: MotionModel,
    /// Long range (units).
    pub long_range: f64,
    /// Percent of long range a shot may travel before it counts as a miss.
    #[serde(default = "default_distance_extension")]
    pub distance_extension: u32,
    pub damage: u32,
    #[serde(default = "default_min_damage")]
    pub min_damage: u32,
    #[serde(default)]
    pub effect: WeaponEffect,
    #[serde(default)]
    pub class: WeaponClass,
    #[serde(default)]
    pub subclass: WeaponSubclass,

    // --- Splash ---
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub radius_damage: u32,
    /// Percent chance each object inside the radius is hit.
    #[serde(default = "default_radius_hit_chance")]
    pub radius_hit_chance: u32,
    /// Visual lifetime of the impact area (ms).
    #[serde(default)]
    pub radius_life: u32,

    // --- Periodic damage ---
    #[serde(default)]
    pub periodic_damage: u32,
    #[serde(default)]
    pub periodic_radius: f64,
    /// Duration of the burning area (ms).
    #[serde(default)]
    pub periodic_duration: u32,
    #[serde(default = "default_periodic_effect")]
    pub periodic_effect: WeaponEffect,
    #[serde(default = "default_periodic_class")]
    pub periodic_class: WeaponClass,
    #[serde(default = "default_periodic_subclass")]
    pub periodic_subclass: WeaponSubclass,

    #[serde(default)]
    pub penetrate: bool,
    #[serde(default)]
    pub targets: TargetMask,
    #[serde(default)]
    pub no_friendly_fire: bool,
    #[serde(default)]
    pub cues: WeaponCues,
}

fn default_distance_extension() -> u32 {
    DEFAULT_DISTANCE_EXTENSION
}
fn default_min_damage() -> u32 {
    DEFAULT_MIN_DAMAGE_PERCENT
}
fn default_radius_hit_chance() -> u32 {
    100
}
fn default_periodic_effect() -> WeaponEffect {
    WeaponEffect::Flamer
}
fn default_periodic_class() -> WeaponClass {
    WeaponClass::Heat
}
fn default_periodic_subclass() -> WeaponSubclass {
    WeaponSubclass::Flame
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            name: String::new(),
            fire_rate: 0,
            flight_speed: 1000.0,
            movement: MotionModel::Direct,
            long_range: 1024.0,
            distance_extension: DEFAULT_DISTANCE_EXTENSION,
            damage: 10,
            min_damage: DEFAULT_MIN_DAMAGE_PERCENT,
            effect: WeaponEffect::default(),
            class: WeaponClass::default(),
            subclass: WeaponSubclass::default(),
            radius: 0.0,
            radius_damage: 0,
            radius_hit_chance: default_radius_hit_chance(),
            radius_life: 0,
            periodic_damage: 0,
            periodic_radius: 0.0,
            periodic_duration: 0,
            periodic_effect: default_periodic_effect(),
            periodic_class: default_periodic_class(),
            periodic_subclass: default_periodic_subclass(),
            penetrate: false,
            targets: TargetMask::default(),
            no_friendly_fire: false,
            cues: WeaponCues::default(),
        }
    }
}

impl WeaponStats {
    /// Whether an impact leaves an area behind (splash or burning ground).
    pub fn has_area_effect(&self) -> bool {
        self.radius > 0.0 || self.periodic_duration > 0
    }

    /// Maximum distance a shot may travel before it is treated as a miss.
    pub fn max_travel(&self) -> f64 {
        self.long_range * self.distance_extension as f64 / 100.0
    }
}

/// Weapon stats indexed by `WeaponId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponTable {
    weapons: Vec<WeaponStats>,
}

impl WeaponTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON array of weapon stats.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let weapons: Vec<WeaponStats> = serde_json::from_str(json)?;
        Ok(Self { weapons })
    }

    /// Append a weapon and return its id.
    pub fn insert(&mut self, stats: WeaponStats) -> WeaponId {
        self.weapons.push(stats);
        WeaponId(self.weapons.len() as u32 - 1)
    }

    pub fn get(&self, id: WeaponId) -> Option<&WeaponStats> {
        self.weapons.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}
