//! Snapshot system: builds the presentation view of all live projectiles.
//!
//! This system is read-only.

use salvo_core::events::ProjectileEvent;
use salvo_core::state::{ProjectileSnapshot, ProjectileView};
use salvo_core::types::SimTime;

use crate::experience::ScoreState;
use crate::registry::Registry;

pub fn build_snapshot(
    registry: &Registry,
    time: &SimTime,
    events: Vec<ProjectileEvent>,
    score: &ScoreState,
) -> ProjectileSnapshot {
    ProjectileSnapshot {
        time: *time,
        projectiles: registry
            .iter()
            .map(|proj| ProjectileView {
                id: proj.id,
                weapon: proj.weapon,
                player: proj.player,
                state: proj.state,
                visible: proj.visible,
                previous: proj.previous,
                current: proj.current,
            })
            .collect(),
        events,
        scores: score.to_views(),
    }
}
