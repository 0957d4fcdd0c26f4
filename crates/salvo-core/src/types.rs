//! Fundamental geometric and simulation types.

use std::f64::consts::{PI, TAU};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::TICK_MS;

/// Game time in milliseconds since the simulation started.
pub type GameTime = u32;

/// Index of a player (owner of shots and combat entities).
pub type PlayerId = u8;

/// 3D position in world units. x = East, y = North, z = Up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 3D velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Integer position used by the swept collision test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Orientation in radians. `direction` is measured from +x toward +y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub direction: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// A timestamped position/orientation sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacetime {
    pub pos: Position,
    pub rot: Rotation,
    pub time: GameTime,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed game time in milliseconds.
    pub now: GameTime,
}

/// Stable handle of a projectile in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId {
    pub index: u32,
    pub generation: u32,
}

impl ProjectileId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}g{}", self.index, self.generation)
    }
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Range to another position (3D distance).
    pub fn range_to(&self, other: &Position) -> f64 {
        (other.to_dvec3() - self.to_dvec3()).length()
    }

    /// Horizontal range (ignoring altitude).
    pub fn horizontal_range_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Direction to another position in radians (from +x toward +y).
    pub fn direction_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Offset by `delta` scaled by `t`.
    pub fn offset(&self, delta: &Position, t: f64) -> Position {
        Position::new(self.x + delta.x * t, self.y + delta.y * t, self.z + delta.z * t)
    }

    /// Component-wise difference `other - self`.
    pub fn delta_to(&self, other: &Position) -> Position {
        Position::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn from_dvec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Round to the integer grid used by the collision test.
    pub fn to_grid(self) -> GridPoint {
        GridPoint::new(self.x.round() as i32, self.y.round() as i32, self.z.round() as i32)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Horizontal speed (ignoring vertical component).
    pub fn horizontal_speed(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl GridPoint {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise difference `self - origin`.
    pub fn relative_to(&self, origin: &GridPoint) -> GridPoint {
        GridPoint::new(
            self.x.wrapping_sub(origin.x),
            self.y.wrapping_sub(origin.y),
            self.z.wrapping_sub(origin.z),
        )
    }
}

impl Spacetime {
    pub fn new(pos: Position, rot: Rotation, time: GameTime) -> Self {
        Self { pos, rot, time }
    }

    /// Linear interpolation between two samples at game time `time`.
    /// Heading turns along the shorter arc. Samples with equal times return `b`.
    pub fn interpolate(a: &Spacetime, b: &Spacetime, time: GameTime) -> Spacetime {
        if a.time == b.time {
            return *b;
        }
        let t = (time as f64 - a.time as f64) / (b.time as f64 - a.time as f64);
        let lerp = |x: f64, y: f64| x + (y - x) * t;
        Spacetime {
            pos: Position::from_dvec3(a.pos.to_dvec3().lerp(b.pos.to_dvec3(), t)),
            rot: Rotation {
                direction: a.rot.direction + shortest_turn(a.rot.direction, b.rot.direction) * t,
                pitch: lerp(a.rot.pitch, b.rot.pitch),
                roll: lerp(a.rot.roll, b.rot.roll),
            },
            time,
        }
    }
}

/// Signed turn from heading `from` to heading `to`, wrapped into [-pi, pi].
fn shortest_turn(from: f64, to: f64) -> f64 {
    (to - from + PI).rem_euclid(TAU) - PI
}

impl SimTime {
    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.now += TICK_MS;
    }
}
