//! Simulation configuration.
//!
//! Every field has a default, so a scenario file only names what it changes.

use serde::{Deserialize, Serialize};

use salvo_core::constants::{
    DEFAULT_EXPERIENCE_MODIFIER, HOMING_ALTITUDE_RETRIES, HOMING_HEIGHT_MAX, HOMING_HEIGHT_MIN,
    HOMING_LEAD_SPEED_FRACTION, MAX_PLAYERS, NEIGHBOUR_RANGE, SPEED_JITTER,
};
use salvo_core::types::PlayerId;

use crate::damage::DamageModifiers;

/// Tuning for terrain-following and target-tracking shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomingTuning {
    pub height_min: f64,
    pub height_max: f64,
    pub altitude_retries: u32,
    pub lead_speed_fraction: f64,
}

impl Default for HomingTuning {
    fn default() -> Self {
        Self {
            height_min: HOMING_HEIGHT_MIN,
            height_max: HOMING_HEIGHT_MAX,
            altitude_retries: HOMING_ALTITUDE_RETRIES,
            lead_speed_fraction: HOMING_LEAD_SPEED_FRACTION,
        }
    }
}

/// Configuration for a projectile simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Relative ballistic speed jitter.
    pub speed_jitter: f64,
    /// Search radius for collision candidates around a moving shot.
    pub neighbour_range: f64,
    pub homing: HomingTuning,
    /// Per-player experience gain, percent.
    pub experience_modifiers: Vec<u32>,
    pub damage_modifiers: DamageModifiers,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            speed_jitter: SPEED_JITTER,
            neighbour_range: NEIGHBOUR_RANGE,
            homing: HomingTuning::default(),
            experience_modifiers: vec![DEFAULT_EXPERIENCE_MODIFIER; MAX_PLAYERS],
            damage_modifiers: DamageModifiers::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Experience modifier for `player`, percent.
    pub fn experience_modifier(&self, player: PlayerId) -> u32 {
        self.experience_modifiers
            .get(player as usize)
            .copied()
            .unwrap_or(DEFAULT_EXPERIENCE_MODIFIER)
    }
}
