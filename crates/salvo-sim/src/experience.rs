//! Experience awards and per-player score tallies.

use std::collections::BTreeMap;

use salvo_core::constants::{EXPERIENCE_PER_BODY, QUALITY_RATIO_MAX, QUALITY_RATIO_MIN};
use salvo_core::enums::EntityKind;
use salvo_core::state::ScoreView;
use salvo_core::types::PlayerId;

use crate::config::SimConfig;
use crate::world::{CombatWorld, ObjectId, ObjectView, UnitCost};

/// Per-player tallies.
#[derive(Debug, Clone, Default)]
pub struct ScoreState {
    players: BTreeMap<PlayerId, ScoreView>,
}

impl ScoreState {
    pub fn player_mut(&mut self, player: PlayerId) -> &mut ScoreView {
        self.players.entry(player).or_default()
    }

    pub fn player(&self, player: PlayerId) -> ScoreView {
        self.players.get(&player).copied().unwrap_or_default()
    }

    pub fn to_views(&self) -> BTreeMap<PlayerId, ScoreView> {
        self.players.clone()
    }
}

/// How much a unit-on-unit hit is worth: the mean of the clamped victim to
/// attacker cost ratios. Missing costs count as an even match.
pub fn quality_factor(attacker: Option<UnitCost>, victim: Option<UnitCost>) -> f64 {
    let (Some(attacker), Some(victim)) = (attacker, victim) else {
        return 1.0;
    };
    let ratio = |v: f64, a: f64| {
        if a <= 0.0 {
            QUALITY_RATIO_MAX
        } else {
            (v / a).clamp(QUALITY_RATIO_MIN, QUALITY_RATIO_MAX)
        }
    };
    (ratio(victim.power, attacker.power) + ratio(victim.points, attacker.points)) / 2.0
}

/// Credit the shooter (and its directing sensor) for `relative` damage to
/// `target`. Hits on features earn nothing.
pub fn award(
    world: &mut dyn CombatWorld,
    config: &SimConfig,
    source: Option<ObjectId>,
    player: PlayerId,
    target: &ObjectView,
    relative: f64,
) {
    if target.kind == EntityKind::Feature {
        return;
    }
    let Some(source) = source else {
        return;
    };
    let Some(attacker) = world.object(source) else {
        return;
    };

    let quality = if attacker.kind == EntityKind::Unit && target.kind == EntityKind::Unit {
        quality_factor(world.unit_cost(source), world.unit_cost(target.id))
    } else {
        1.0
    };
    let modifier = config.experience_modifier(player) as f64 / 100.0;
    let amount = relative.abs() * EXPERIENCE_PER_BODY * modifier * quality;
    if amount <= 0.0 {
        return;
    }

    let sensor = world.fire_support_sensor(source);
    match attacker.kind {
        EntityKind::Unit => {
            world.grant_experience(source, amount);
            if let Some(sensor) = sensor {
                world.grant_experience(sensor, amount);
            }
        }
        EntityKind::Structure => {
            if let Some(sensor) = sensor {
                world.grant_experience(sensor, amount);
            }
        }
        EntityKind::Feature => {}
    }
}
