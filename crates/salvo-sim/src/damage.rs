//! Damage model: effect/armor modifiers, per-kind damage routines, and the
//! shared armour/experience absorption core.

use serde::{Deserialize, Serialize};

use salvo_core::constants::{
    DEFAULT_DAMAGE_MODIFIER, EXPERIENCE_PER_LEVEL, EXP_REDUCE_DAMAGE, MAX_EXPERIENCE_LEVEL,
    MS_PER_SEC, TICK_MS,
};
use salvo_core::enums::{ArmorClass, EntityKind, WeaponClass, WeaponEffect, WeaponSubclass};
use salvo_core::types::GameTime;

/// Percent modifiers indexed by `[effect][armor class]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageModifiers {
    pub table: Vec<Vec<u32>>,
}

impl Default for DamageModifiers {
    fn default() -> Self {
        // Columns: wheeled, tracked, legged, hover, lift,
        //          soft, medium, hard, bunker, feature.
        let table = vec![
            vec![125, 50, 150, 100, 100, 40, 25, 20, 15, 40], // anti-personnel
            vec![100, 120, 75, 110, 90, 50, 40, 30, 25, 50],  // anti-tank
            vec![40, 40, 40, 40, 40, 150, 180, 200, 250, 100], // bunker buster
            vec![100, 85, 120, 100, 50, 60, 50, 40, 40, 50],  // artillery
            vec![110, 60, 150, 120, 40, 30, 25, 15, 10, 20],  // flamer
            vec![40, 40, 40, 40, 150, 20, 20, 20, 20, 20],    // anti-aircraft
        ];
        Self { table }
    }
}

impl DamageModifiers {
    /// Modifier percentage for an effect against an armor class.
    pub fn get(&self, effect: WeaponEffect, armor: ArmorClass) -> u32 {
        self.table
            .get(effect.index())
            .and_then(|row| row.get(armor.index()))
            .copied()
            .unwrap_or(DEFAULT_DAMAGE_MODIFIER)
    }
}

/// Raw damage scaled by the effect/armor modifier.
pub fn calc_damage(
    base: u32,
    effect: WeaponEffect,
    armor: ArmorClass,
    modifiers: &DamageModifiers,
) -> u32 {
    (base as u64 * modifiers.get(effect, armor) as u64 / 100) as u32
}

/// One application of damage to one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub damage: u32,
    pub class: WeaponClass,
    pub subclass: WeaponSubclass,
    pub at_time: GameTime,
    /// `damage` is a per-second rate, applied once per tick.
    pub per_second: bool,
    /// Percent of damage that always gets through armour.
    pub min_damage: u32,
}

/// Body points, armour, and per-tick bookkeeping shared by every entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Hull {
    pub body: u32,
    pub max_body: u32,
    pub armour_kinetic: u32,
    pub armour_heat: u32,
    periodic_time: GameTime,
    periodic_applied: u32,
}

impl Hull {
    pub fn new(max_body: u32, armour_kinetic: u32, armour_heat: u32) -> Self {
        Self {
            body: max_body,
            max_body: max_body.max(1),
            armour_kinetic,
            armour_heat,
            periodic_time: 0,
            periodic_applied: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body > 0
    }

    fn armour(&self, class: WeaponClass) -> u32 {
        match class {
            WeaponClass::Kinetic => self.armour_kinetic,
            WeaponClass::Heat => self.armour_heat,
        }
    }

    /// Absorb a damage request. Returns the damage dealt relative to max body,
    /// negative if the hull was destroyed.
    ///
    /// Per-second requests only apply the part of the rate not yet applied
    /// this tick, so overlapping burning areas do not stack.
    pub fn absorb(&mut self, request: &DamageRequest, experience_level: u8) -> f64 {
        if request.subclass == WeaponSubclass::Emp || !self.is_alive() {
            return 0.0;
        }

        let mut damage = request.damage;
        let mut armour = self.armour(request.class);

        if request.per_second {
            if self.periodic_time != request.at_time {
                self.periodic_time = request.at_time;
                self.periodic_applied = 0;
            }
            let delta = damage.saturating_sub(self.periodic_applied);
            if delta == 0 {
                return 0.0;
            }
            self.periodic_applied += delta;
            damage = delta * TICK_MS / MS_PER_SEC;
            armour = armour * TICK_MS / MS_PER_SEC;
        }

        let level = experience_level.min(MAX_EXPERIENCE_LEVEL) as u32;
        damage = damage * (100 - EXP_REDUCE_DAMAGE * level) / 100;

        let floor = damage * request.min_damage.min(100) / 100;
        let actual = damage.saturating_sub(armour).max(floor).max(1);

        if actual >= self.body {
            let relative = self.body as f64 / self.max_body as f64;
            self.body = 0;
            -relative
        } else {
            self.body -= actual;
            actual as f64 / self.max_body as f64
        }
    }
}

/// Per-kind damage routine. Each entity kind owns how it takes damage.
pub trait DamageTarget: Send + Sync {
    fn kind(&self) -> EntityKind;

    fn armor_class(&self) -> ArmorClass;

    fn hull(&self) -> &Hull;

    fn take_damage(&mut self, request: &DamageRequest) -> f64;

    fn is_alive(&self) -> bool {
        self.hull().is_alive()
    }

    fn is_damageable(&self) -> bool {
        true
    }

    /// Reduce capture resistance. True if the entity is captured.
    fn resist_electronic(&mut self, _strength: u32) -> bool {
        false
    }

    fn experience(&self) -> f64 {
        0.0
    }

    fn gain_experience(&mut self, _amount: f64) {}
}

/// Capture resistance. A zero maximum means immune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resistance {
    pub current: u32,
    pub max: u32,
}

impl Resistance {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    fn resist(&mut self, strength: u32) -> bool {
        if self.max == 0 || strength == 0 {
            return false;
        }
        self.current = self.current.saturating_sub(strength);
        if self.current == 0 {
            // Fresh owner starts at full resistance.
            self.current = self.max;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitHull {
    pub hull: Hull,
    pub armor: ArmorClass,
    pub resistance: Resistance,
    pub experience: f64,
}

impl UnitHull {
    pub fn new(hull: Hull, armor: ArmorClass) -> Self {
        Self {
            hull,
            armor,
            resistance: Resistance::new(0),
            experience: 0.0,
        }
    }

    pub fn with_resistance(mut self, resistance: u32) -> Self {
        self.resistance = Resistance::new(resistance);
        self
    }

    pub fn level(&self) -> u8 {
        ((self.experience / EXPERIENCE_PER_LEVEL) as u32).min(MAX_EXPERIENCE_LEVEL as u32) as u8
    }
}

impl DamageTarget for UnitHull {
    fn kind(&self) -> EntityKind {
        EntityKind::Unit
    }

    fn armor_class(&self) -> ArmorClass {
        self.armor
    }

    fn hull(&self) -> &Hull {
        &self.hull
    }

    fn take_damage(&mut self, request: &DamageRequest) -> f64 {
        let level = self.level();
        self.hull.absorb(request, level)
    }

    fn resist_electronic(&mut self, strength: u32) -> bool {
        self.resistance.resist(strength)
    }

    fn experience(&self) -> f64 {
        self.experience
    }

    fn gain_experience(&mut self, amount: f64) {
        self.experience += amount.max(0.0);
    }
}

#[derive(Debug, Clone)]
pub struct StructureHull {
    pub hull: Hull,
    pub armor: ArmorClass,
    pub resistance: Resistance,
}

impl StructureHull {
    pub fn new(hull: Hull, armor: ArmorClass) -> Self {
        Self {
            hull,
            armor,
            resistance: Resistance::new(0),
        }
    }

    pub fn with_resistance(mut self, resistance: u32) -> Self {
        self.resistance = Resistance::new(resistance);
        self
    }
}

impl DamageTarget for StructureHull {
    fn kind(&self) -> EntityKind {
        EntityKind::Structure
    }

    fn armor_class(&self) -> ArmorClass {
        self.armor
    }

    fn hull(&self) -> &Hull {
        &self.hull
    }

    fn take_damage(&mut self, request: &DamageRequest) -> f64 {
        self.hull.absorb(request, 0)
    }

    fn resist_electronic(&mut self, strength: u32) -> bool {
        self.resistance.resist(strength)
    }
}

/// Terrain features: trees, boulders, wrecks.
#[derive(Debug, Clone)]
pub struct FeatureHull {
    pub hull: Hull,
    pub damageable: bool,
}

impl FeatureHull {
    pub fn new(hull: Hull, damageable: bool) -> Self {
        Self { hull, damageable }
    }
}

impl DamageTarget for FeatureHull {
    fn kind(&self) -> EntityKind {
        EntityKind::Feature
    }

    fn armor_class(&self) -> ArmorClass {
        ArmorClass::Feature
    }

    fn hull(&self) -> &Hull {
        &self.hull
    }

    fn take_damage(&mut self, request: &DamageRequest) -> f64 {
        if !self.damageable {
            return 0.0;
        }
        self.hull.absorb(request, 0)
    }

    fn is_damageable(&self) -> bool {
        self.damageable
    }
}
