//! Projectile engine, the entry point of the subsystem.
//!
//! `ProjectileEngine` owns every live shot, the seeded RNG, and the score
//! tallies. The combat world and terrain are lent to it per call, so the
//! engine itself stays headless and deterministic.

use glam::DVec3;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use salvo_core::constants::LINE_OF_FIRE_MINIMUM;
use salvo_core::enums::{MotionModel, ProjectileState};
use salvo_core::events::ProjectileEvent;
use salvo_core::state::{ProjectileSnapshot, ScoreView};
use salvo_core::types::{
    GameTime, PlayerId, Position, ProjectileId, Rotation, SimTime, Spacetime,
};
use salvo_core::weapons::{WeaponId, WeaponTable};
use salvo_terrain::TerrainQuery;

use crate::config::SimConfig;
use crate::damage::calc_damage;
use crate::error::FireError;
use crate::experience::ScoreState;
use crate::geometry;
use crate::projectile::Projectile;
use crate::registry::Registry;
use crate::systems::{self, StepContext};
use crate::trajectory;
use crate::world::{CombatWorld, ObjectId};

/// What a shot is fired at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aim {
    /// A bare point on the map.
    Point(Position),
    /// A combat entity; the aim point follows its exposed body.
    Target(ObjectId),
}

/// A request to create a shot.
#[derive(Debug, Clone, PartialEq)]
pub struct FireOrder {
    pub weapon: WeaponId,
    pub player: PlayerId,
    pub aim: Aim,
    pub source: Option<ObjectId>,
    /// Muzzle position for shots without a source.
    pub muzzle: Option<Position>,
    /// Visible to the observer from the start.
    pub visible: bool,
    pub slot: Option<usize>,
    /// Minimum launch elevation for indirect fire (radians).
    pub min_angle: f64,
    /// Launch time; defaults to the current game time. Later times are
    /// clamped to it.
    pub fire_time: Option<GameTime>,
}

impl FireOrder {
    pub fn new(weapon: WeaponId, player: PlayerId, aim: Aim) -> Self {
        Self {
            weapon,
            player,
            aim,
            source: None,
            muzzle: None,
            visible: false,
            slot: None,
            min_angle: 0.0,
            fire_time: None,
        }
    }

    pub fn from_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn from_muzzle(mut self, muzzle: Position) -> Self {
        self.muzzle = Some(muzzle);
        self
    }

    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_min_angle(mut self, min_angle: f64) -> Self {
        self.min_angle = min_angle;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn at_time(mut self, time: GameTime) -> Self {
        self.fire_time = Some(time);
        self
    }
}

pub struct ProjectileEngine {
    registry: Registry,
    weapons: WeaponTable,
    config: SimConfig,
    time: SimTime,
    rng: ChaCha8Rng,
    score: ScoreState,
    events: Vec<ProjectileEvent>,
    last_attacker: Option<ObjectId>,
}

impl ProjectileEngine {
    pub fn new(config: SimConfig, weapons: WeaponTable) -> Self {
        Self {
            registry: Registry::new(),
            weapons,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            time: SimTime::default(),
            score: ScoreState::default(),
            events: Vec::new(),
            last_attacker: None,
        }
    }

    /// Fire a shot, logging and dropping requests that cannot be honoured.
    pub fn fire(
        &mut self,
        world: &mut dyn CombatWorld,
        terrain: &dyn TerrainQuery,
        order: FireOrder,
    ) -> Option<ProjectileId> {
        match self.try_fire(world, terrain, order) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("fire request rejected: {err}");
                None
            }
        }
    }

    /// Create and register a shot.
    pub fn try_fire(
        &mut self,
        world: &mut dyn CombatWorld,
        terrain: &dyn TerrainQuery,
        order: FireOrder,
    ) -> Result<ProjectileId, FireError> {
        let stats = self
            .weapons
            .get(order.weapon)
            .ok_or(FireError::UnknownWeapon(order.weapon))?;
        if stats.flight_speed.is_nan() || stats.flight_speed <= 0.0 {
            return Err(FireError::UnusableWeapon(order.weapon));
        }
        // A shot cannot start in the future; its first step would run backwards.
        let fire_time = order
            .fire_time
            .map_or(self.time.now, |t| t.min(self.time.now));

        let muzzle = match order.source {
            Some(source) => world
                .muzzle_position(source, order.slot)
                .ok_or(FireError::UnknownSource(source))?,
            None => order.muzzle.ok_or(FireError::NoOrigin)?,
        };

        let (target, dst, expected_damage) = match order.aim {
            Aim::Target(id) => {
                let view = world
                    .object(id)
                    .filter(|view| view.alive)
                    .ok_or(FireError::DeadTarget(id))?;
                // Aim somewhere into the part of the body visible from the muzzle.
                let max_height = geometry::effective_height(&view);
                let exposed = geometry::exposed_height(terrain, &muzzle, &view);
                let min_height =
                    (max_height + 2.0 * LINE_OF_FIRE_MINIMUM - exposed).clamp(0.0, max_height);
                let spread = max_height - min_height;
                let height = if spread > 0.0 {
                    min_height + self.rng.gen_range(0.0..spread)
                } else {
                    min_height
                };
                let dst = Position::new(view.position.x, view.position.y, view.position.z + height);
                let expected = calc_damage(
                    stats.damage,
                    stats.effect,
                    view.armor,
                    &self.config.damage_modifiers,
                );
                (Some(id), dst, expected)
            }
            Aim::Point(point) => (
                None,
                Position::new(point.x, point.y, point.z + LINE_OF_FIRE_MINIMUM),
                0,
            ),
        };

        let ballistic = (stats.movement == MotionModel::Indirect).then(|| {
            trajectory::solve_jittered(
                muzzle.horizontal_range_to(&dst),
                dst.z - muzzle.z,
                stats.flight_speed,
                order.min_angle,
                &mut self.rng,
                self.config.speed_jitter,
            )
        });

        let heading = muzzle
            .delta_to(&dst)
            .to_dvec3()
            .try_normalize()
            .unwrap_or(DVec3::X);
        let rot = Rotation {
            direction: muzzle.direction_to(&dst),
            pitch: match ballistic {
                Some(solution) => solution.launch_angle(),
                None => heading.z.asin(),
            },
            roll: 0.0,
        };
        let start = Spacetime::new(muzzle, rot, fire_time);
        let visible = order.visible || order.source.is_some_and(|id| world.observer_sees(id));

        let mut proj = Projectile {
            id: ProjectileId::new(0, 0),
            weapon: order.weapon,
            player: order.player,
            motion: stats.movement,
            state: ProjectileState::InFlight,
            source: order.source,
            destination: None,
            src: muzzle,
            dst,
            born: fire_time,
            previous: start,
            current: start,
            expected_damage,
            direct: stats.movement.is_direct(),
            damaged: Vec::new(),
            ballistic,
            travelled: 0.0,
            heading,
            visible,
        };
        proj.set_destination(world, target);

        let tally = self.score.player_mut(order.player);
        if target.is_some() {
            tally.shots_on_target += 1;
        } else {
            tally.shots_off_target += 1;
        }

        let cue = stats.cues.fire.clone();
        let id = self.registry.insert(|id| Projectile { id, ..proj });
        self.events.push(ProjectileEvent::Fired {
            projectile: id,
            weapon: order.weapon,
            player: order.player,
            cue,
        });
        if visible {
            self.events
                .push(ProjectileEvent::BecameVisible { projectile: id });
        }
        debug!(
            "fired {id} weapon {:?} player {} at ({:.0}, {:.0}, {:.0})",
            order.weapon, order.player, dst.x, dst.y, dst.z
        );
        Ok(id)
    }

    /// Step every live shot to the current game time.
    ///
    /// Shots are processed in registration order. Continuations spawned
    /// during the pass wait until the next pass. Inactive shots are removed
    /// at the end.
    pub fn update_all(&mut self, world: &mut dyn CombatWorld, terrain: &dyn TerrainQuery) {
        let now = self.time.now;
        for id in self.registry.ids() {
            let Some(proj) = self.registry.get_mut(id) else {
                continue;
            };
            if proj.state == ProjectileState::Inactive {
                continue;
            }
            let Some(stats) = self.weapons.get(proj.weapon) else {
                warn!("projectile {id} has unknown weapon {:?}, removing", proj.weapon);
                proj.set_destination(world, None);
                proj.state = ProjectileState::Inactive;
                continue;
            };

            let mut ctx = StepContext {
                world: &mut *world,
                terrain,
                config: &self.config,
                rng: &mut self.rng,
                score: &mut self.score,
                events: &mut self.events,
                last_attacker: &mut self.last_attacker,
                now,
            };
            let continuation = systems::step(proj, stats, &mut ctx);

            if let Some(template) = continuation {
                let parent = template.id;
                let child = self.registry.insert(|id| Projectile { id, ..template });
                debug!("{parent} passed through its target, continuing as {child}");
                self.events.push(ProjectileEvent::Penetrated {
                    projectile: parent,
                    continuation: child,
                });
            }
        }
        self.registry.sweep_inactive();
    }

    /// Advance one tick, update every shot, and return the resulting snapshot.
    pub fn tick(
        &mut self,
        world: &mut dyn CombatWorld,
        terrain: &dyn TerrainQuery,
    ) -> ProjectileSnapshot {
        self.time.advance();
        self.update_all(world, terrain);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.registry, &self.time, events, &self.score)
    }

    /// Current state without consuming pending events.
    pub fn snapshot(&self) -> ProjectileSnapshot {
        systems::snapshot::build_snapshot(
            &self.registry,
            &self.time,
            self.events.clone(),
            &self.score,
        )
    }

    /// Take events emitted since the last tick.
    pub fn drain_events(&mut self) -> Vec<ProjectileEvent> {
        std::mem::take(&mut self.events)
    }

    /// Source of the most recently resolved impact or burning area.
    pub fn last_attacker(&self) -> Option<ObjectId> {
        self.last_attacker
    }

    pub fn score(&self, player: PlayerId) -> ScoreView {
        self.score.player(player)
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.registry.get(id)
    }

    pub fn live_count(&self) -> usize {
        self.registry.len()
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn weapons(&self) -> &WeaponTable {
        &self.weapons
    }
}
