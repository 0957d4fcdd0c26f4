//! Presentation snapshot: the interpolatable projectile state after each tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::ProjectileEvent;
use crate::types::{PlayerId, ProjectileId, SimTime, Spacetime};
use crate::weapons::WeaponId;

/// Complete projectile state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub time: SimTime,
    pub projectiles: Vec<ProjectileView>,
    pub events: Vec<ProjectileEvent>,
    pub scores: BTreeMap<PlayerId, ScoreView>,
}

/// One live projectile with its interpolation pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub weapon: WeaponId,
    pub player: PlayerId,
    pub state: ProjectileState,
    pub visible: bool,
    pub previous: Spacetime,
    pub current: Spacetime,
}

/// Per-player shot and outcome tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub shots_on_target: u32,
    pub shots_off_target: u32,
    pub hits: u32,
    pub misses: u32,
    pub kills: u32,
    pub captures: u32,
}
