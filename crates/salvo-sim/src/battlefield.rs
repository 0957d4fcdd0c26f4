//! Battlefield: an ECS-backed combat world.
//!
//! Holds units, structures, and features as hecs entities and implements
//! `CombatWorld` over them. A uniform grid indexes entity positions for
//! radius queries.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::warn;
use serde::{Deserialize, Serialize};

use salvo_core::constants::{MAX_PLAYERS, TILE_UNITS};
use salvo_core::enums::ArmorClass;
use salvo_core::types::{PlayerId, Position, Velocity};

use crate::damage::{
    DamageRequest, DamageTarget, FeatureHull, Hull, StructureHull, UnitHull,
};
use crate::world::{CombatWorld, Footprint, ObjectId, ObjectView, UnitCost};

// --- Components ---

/// The entity's own damage routine.
pub struct Body(pub Box<dyn DamageTarget>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub PlayerId);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub footprint: Footprint,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Airborne(pub bool);

/// Damage other players' shots in flight are expected to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedDamage {
    pub direct: i64,
    pub indirect: i64,
}

/// Sensor directing this entity's fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireSupport(pub Entity);

// --- Spawn descriptions ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpec {
    pub player: PlayerId,
    pub position: Position,
    #[serde(default)]
    pub velocity: Velocity,
    #[serde(default = "default_unit_radius")]
    pub radius: f64,
    #[serde(default = "default_unit_height")]
    pub height: f64,
    pub body: u32,
    #[serde(default)]
    pub armour_kinetic: u32,
    #[serde(default)]
    pub armour_heat: u32,
    #[serde(default)]
    pub armor: ArmorClass,
    #[serde(default)]
    pub airborne: bool,
    /// Capture resistance; zero is immune.
    #[serde(default)]
    pub resistance: u32,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSpec {
    pub player: PlayerId,
    pub position: Position,
    #[serde(default = "default_tiles")]
    pub width: u32,
    #[serde(default = "default_tiles")]
    pub breadth: u32,
    #[serde(default = "default_structure_height")]
    pub height: f64,
    pub body: u32,
    #[serde(default)]
    pub armour_kinetic: u32,
    #[serde(default)]
    pub armour_heat: u32,
    #[serde(default = "default_structure_armor")]
    pub armor: ArmorClass,
    #[serde(default)]
    pub resistance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub position: Position,
    #[serde(default = "default_tiles")]
    pub width: u32,
    #[serde(default = "default_tiles")]
    pub breadth: u32,
    #[serde(default = "default_structure_height")]
    pub height: f64,
    pub body: u32,
    #[serde(default = "default_true")]
    pub damageable: bool,
}

fn default_unit_radius() -> f64 {
    32.0
}
fn default_unit_height() -> f64 {
    40.0
}
fn default_tiles() -> u32 {
    1
}
fn default_structure_height() -> f64 {
    64.0
}
fn default_structure_armor() -> ArmorClass {
    ArmorClass::MediumStructure
}
fn default_true() -> bool {
    true
}

/// Owner of features.
pub const NEUTRAL_PLAYER: PlayerId = u8::MAX;

// --- Spatial index ---

/// Uniform grid over entity base positions.
#[derive(Debug, Default)]
struct SpatialIndex {
    cells: HashMap<(i32, i32), Vec<Entity>>,
}

impl SpatialIndex {
    const CELL_SIZE: f64 = (TILE_UNITS * 4) as f64;

    fn cell_of(pos: &Position) -> (i32, i32) {
        (
            (pos.x / Self::CELL_SIZE).floor() as i32,
            (pos.y / Self::CELL_SIZE).floor() as i32,
        )
    }

    fn insert(&mut self, entity: Entity, pos: &Position) {
        self.cells.entry(Self::cell_of(pos)).or_default().push(entity);
    }

    fn remove(&mut self, entity: Entity, pos: &Position) {
        let cell = Self::cell_of(pos);
        if let Some(list) = self.cells.get_mut(&cell) {
            list.retain(|e| *e != entity);
            if list.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    fn query(&self, center: &Position, radius: f64) -> Vec<Entity> {
        let radius = radius.max(0.0);
        let (x0, y0) = Self::cell_of(&Position::new(center.x - radius, center.y - radius, 0.0));
        let (x1, y1) = Self::cell_of(&Position::new(center.x + radius, center.y + radius, 0.0));
        let mut found = Vec::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(list) = self.cells.get(&(cx, cy)) {
                    found.extend_from_slice(list);
                }
            }
        }
        found
    }
}

// --- Battlefield ---

pub struct Battlefield {
    world: World,
    index: SpatialIndex,
    teams: [u8; MAX_PLAYERS],
    observer: Option<PlayerId>,
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new()
    }
}

impl Battlefield {
    pub fn new() -> Self {
        let mut teams = [0u8; MAX_PLAYERS];
        for (player, team) in teams.iter_mut().enumerate() {
            *team = player as u8;
        }
        Self {
            world: World::new(),
            index: SpatialIndex::default(),
            teams,
            observer: None,
        }
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn spawn_unit(&mut self, spec: &UnitSpec) -> Entity {
        let hull = UnitHull::new(
            Hull::new(spec.body, spec.armour_kinetic, spec.armour_heat),
            spec.armor,
        )
        .with_resistance(spec.resistance);
        let entity = self.world.spawn((
            Body(Box::new(hull)),
            Owner(spec.player),
            spec.position,
            spec.velocity,
            Shape {
                footprint: Footprint::Radius(spec.radius),
                height: spec.height,
            },
            Airborne(spec.airborne),
            ExpectedDamage::default(),
            UnitCost {
                power: spec.power,
                points: spec.points,
            },
        ));
        self.index.insert(entity, &spec.position);
        entity
    }

    pub fn spawn_structure(&mut self, spec: &StructureSpec) -> Entity {
        let hull = StructureHull::new(
            Hull::new(spec.body, spec.armour_kinetic, spec.armour_heat),
            spec.armor,
        )
        .with_resistance(spec.resistance);
        let entity = self.world.spawn((
            Body(Box::new(hull)),
            Owner(spec.player),
            spec.position,
            Velocity::default(),
            Shape {
                footprint: Footprint::Tiles {
                    width: spec.width,
                    breadth: spec.breadth,
                },
                height: spec.height,
            },
            Airborne(false),
            ExpectedDamage::default(),
        ));
        self.index.insert(entity, &spec.position);
        entity
    }

    pub fn spawn_feature(&mut self, spec: &FeatureSpec) -> Entity {
        let hull = FeatureHull::new(Hull::new(spec.body, 0, 0), spec.damageable);
        let entity = self.world.spawn((
            Body(Box::new(hull)),
            Owner(NEUTRAL_PLAYER),
            spec.position,
            Velocity::default(),
            Shape {
                footprint: Footprint::Tiles {
                    width: spec.width,
                    breadth: spec.breadth,
                },
                height: spec.height,
            },
            Airborne(false),
        ));
        self.index.insert(entity, &spec.position);
        entity
    }

    /// Put `b` on `a`'s team.
    pub fn set_alliance(&mut self, a: PlayerId, b: PlayerId) {
        let Some(&team) = self.teams.get(a as usize) else {
            return;
        };
        if let Some(slot) = self.teams.get_mut(b as usize) {
            *slot = team;
        }
    }

    /// Player whose view decides projectile visibility.
    pub fn set_observer(&mut self, observer: Option<PlayerId>) {
        self.observer = observer;
    }

    pub fn set_fire_support(&mut self, unit: Entity, sensor: Entity) {
        if let Err(e) = self.world.insert_one(unit, FireSupport(sensor)) {
            warn!("fire support for {unit:?} ignored: {e}");
        }
    }

    /// Move an entity, keeping the spatial index current.
    pub fn move_object(&mut self, entity: Entity, to: Position) {
        let Ok(mut pos) = self.world.get::<&mut Position>(entity) else {
            return;
        };
        let from = *pos;
        *pos = to;
        drop(pos);
        self.index.remove(entity, &from);
        self.index.insert(entity, &to);
    }

    pub fn set_velocity(&mut self, entity: Entity, velocity: Velocity) {
        if let Ok(mut vel) = self.world.get::<&mut Velocity>(entity) {
            *vel = velocity;
        }
    }

    /// Despawn every destroyed entity and return their handles.
    pub fn reap_dead(&mut self) -> Vec<Entity> {
        let dead: Vec<(Entity, Position)> = self
            .world
            .query::<(&Body, &Position)>()
            .iter()
            .filter(|(_, (body, _))| !body.0.is_alive())
            .map(|(entity, (_, pos))| (entity, *pos))
            .collect();

        let mut reaped = Vec::with_capacity(dead.len());
        for (entity, pos) in dead {
            self.index.remove(entity, &pos);
            if self.world.despawn(entity).is_ok() {
                reaped.push(entity);
            }
        }
        reaped.sort_by_key(|e| e.to_bits());
        reaped
    }

    pub fn body_of(&self, entity: Entity) -> Option<u32> {
        self.world
            .get::<&Body>(entity)
            .ok()
            .map(|body| body.0.hull().body)
    }

    pub fn experience_of(&self, entity: Entity) -> Option<f64> {
        self.world
            .get::<&Body>(entity)
            .ok()
            .map(|body| body.0.experience())
    }

    pub fn expected_damage_of(&self, entity: Entity) -> Option<ExpectedDamage> {
        self.world.get::<&ExpectedDamage>(entity).ok().map(|e| *e)
    }

    pub fn owner_of(&self, entity: Entity) -> Option<PlayerId> {
        self.world.get::<&Owner>(entity).ok().map(|owner| owner.0)
    }
}

impl CombatWorld for Battlefield {
    fn object(&self, id: ObjectId) -> Option<ObjectView> {
        let body = self.world.get::<&Body>(id).ok()?;
        let owner = self.world.get::<&Owner>(id).ok()?;
        let position = *self.world.get::<&Position>(id).ok()?;
        let shape = *self.world.get::<&Shape>(id).ok()?;
        let velocity = self
            .world
            .get::<&Velocity>(id)
            .map(|v| *v)
            .unwrap_or_default();
        let airborne = self
            .world
            .get::<&Airborne>(id)
            .map(|a| a.0)
            .unwrap_or(false);

        Some(ObjectView {
            id,
            kind: body.0.kind(),
            player: owner.0,
            position,
            velocity,
            alive: body.0.is_alive(),
            footprint: shape.footprint,
            height: shape.height,
            airborne,
            damageable: body.0.is_damageable(),
            armor: body.0.armor_class(),
        })
    }

    fn objects_in_radius(&self, center: &Position, radius: f64) -> Vec<ObjectId> {
        let mut found: Vec<ObjectId> = self
            .index
            .query(center, radius)
            .into_iter()
            .filter(|entity| {
                self.world
                    .get::<&Position>(*entity)
                    .is_ok_and(|pos| pos.horizontal_range_to(center) <= radius)
            })
            .collect();
        found.sort_by_key(|e| e.to_bits());
        found
    }

    fn is_ally(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }
        match (self.teams.get(a as usize), self.teams.get(b as usize)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    fn apply_damage(&mut self, id: ObjectId, request: &DamageRequest) -> Option<f64> {
        let mut body = self.world.get::<&mut Body>(id).ok()?;
        Some(body.0.take_damage(request))
    }

    fn apply_electronic(&mut self, id: ObjectId, strength: u32, attacker: PlayerId) -> bool {
        let captured = match self.world.get::<&mut Body>(id) {
            Ok(mut body) => body.0.resist_electronic(strength),
            Err(_) => false,
        };
        if captured {
            if let Ok(mut owner) = self.world.get::<&mut Owner>(id) {
                owner.0 = attacker;
            }
        }
        captured
    }

    fn add_expected_damage(&mut self, id: ObjectId, amount: i64, direct: bool) {
        if let Ok(mut expected) = self.world.get::<&mut ExpectedDamage>(id) {
            if direct {
                expected.direct += amount;
            } else {
                expected.indirect += amount;
            }
        }
    }

    fn grant_experience(&mut self, id: ObjectId, amount: f64) {
        if let Ok(mut body) = self.world.get::<&mut Body>(id) {
            body.0.gain_experience(amount);
        }
    }

    fn fire_support_sensor(&self, id: ObjectId) -> Option<ObjectId> {
        let sensor = self.world.get::<&FireSupport>(id).ok()?.0;
        self.world.contains(sensor).then_some(sensor)
    }

    fn unit_cost(&self, id: ObjectId) -> Option<UnitCost> {
        self.world.get::<&UnitCost>(id).ok().map(|cost| *cost)
    }

    fn observer_sees(&self, id: ObjectId) -> bool {
        let Some(observer) = self.observer else {
            return false;
        };
        self.owner_of(id)
            .is_some_and(|owner| self.is_ally(owner, observer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salvo_core::enums::{WeaponClass, WeaponSubclass};

    fn tank(player: PlayerId, x: f64, y: f64) -> UnitSpec {
        UnitSpec {
            player,
            position: Position::new(x, y, 0.0),
            velocity: Velocity::default(),
            radius: 32.0,
            height: 40.0,
            body: 100,
            armour_kinetic: 0,
            armour_heat: 0,
            armor: ArmorClass::Tracked,
            airborne: false,
            resistance: 0,
            power: 100.0,
            points: 100.0,
        }
    }

    #[test]
    fn test_radius_query_uses_index_and_distance() {
        let mut field = Battlefield::new();
        let near = field.spawn_unit(&tank(0, 100.0, 100.0));
        let far = field.spawn_unit(&tank(0, 3000.0, 100.0));
        let edge = field.spawn_unit(&tank(0, 600.0, 100.0));

        let found = field.objects_in_radius(&Position::new(100.0, 100.0, 0.0), 500.0);
        assert!(found.contains(&near));
        assert!(found.contains(&edge));
        assert!(!found.contains(&far));

        field.move_object(far, Position::new(200.0, 100.0, 0.0));
        let found = field.objects_in_radius(&Position::new(100.0, 100.0, 0.0), 500.0);
        assert!(found.contains(&far));
    }

    #[test]
    fn test_alliances() {
        let mut field = Battlefield::new();
        assert!(field.is_ally(2, 2));
        assert!(!field.is_ally(0, 1));
        field.set_alliance(0, 1);
        assert!(field.is_ally(0, 1));
        assert!(field.is_ally(1, 0));
        assert!(!field.is_ally(NEUTRAL_PLAYER, 0));
    }

    #[test]
    fn test_damage_dispatch_and_reap() {
        let mut field = Battlefield::new();
        let unit = field.spawn_unit(&tank(1, 0.0, 0.0));
        let request = DamageRequest {
            damage: 500,
            class: WeaponClass::Kinetic,
            subclass: WeaponSubclass::Cannon,
            at_time: 0,
            per_second: false,
            min_damage: 33,
        };
        let relative = field.apply_damage(unit, &request).unwrap();
        assert!(relative < 0.0);
        assert_eq!(field.object(unit).map(|v| v.alive), Some(false));

        assert_eq!(field.reap_dead(), vec![unit]);
        assert!(field.object(unit).is_none());
        assert!(field
            .objects_in_radius(&Position::default(), 100.0)
            .is_empty());
    }

    #[test]
    fn test_fire_support_on_reaped_unit_is_ignored() {
        let mut field = Battlefield::new();
        let sensor = field.spawn_unit(&tank(0, 0.0, 0.0));
        let unit = field.spawn_unit(&tank(0, 50.0, 0.0));
        let kill = DamageRequest {
            damage: 500,
            class: WeaponClass::Kinetic,
            subclass: WeaponSubclass::Cannon,
            at_time: 0,
            per_second: false,
            min_damage: 33,
        };
        field.apply_damage(unit, &kill);
        assert_eq!(field.reap_dead(), vec![unit]);

        field.set_fire_support(unit, sensor);
        assert_eq!(field.fire_support_sensor(unit), None);

        field.set_fire_support(sensor, sensor);
        assert_eq!(field.fire_support_sensor(sensor), Some(sensor));
    }

    #[test]
    fn test_capture_changes_owner() {
        let mut field = Battlefield::new();
        let spec = UnitSpec {
            resistance: 10,
            ..tank(1, 0.0, 0.0)
        };
        let unit = field.spawn_unit(&spec);
        assert!(field.apply_electronic(unit, 20, 3));
        assert_eq!(field.owner_of(unit), Some(3));
    }

    #[test]
    fn test_observer_visibility() {
        let mut field = Battlefield::new();
        let mine = field.spawn_unit(&tank(0, 0.0, 0.0));
        let theirs = field.spawn_unit(&tank(1, 0.0, 0.0));
        assert!(!field.observer_sees(mine));
        field.set_observer(Some(0));
        assert!(field.observer_sees(mine));
        assert!(!field.observer_sees(theirs));
    }
}
