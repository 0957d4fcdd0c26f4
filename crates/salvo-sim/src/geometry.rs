//! Collision envelopes and target heights for combat entities.

use salvo_core::constants::{EXPOSURE_PROBE_STEPS, TILE_UNITS};
use salvo_core::types::Position;
use salvo_terrain::TerrainQuery;

use crate::world::{Footprint, ObjectView};

/// Horizontal collision envelope, centred on the object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Rect { half_x: i32, half_y: i32 },
    Circle { radius: i32 },
}

/// Envelope of an entity: rectangular for tile footprints, circular for units.
pub fn envelope_of(view: &ObjectView) -> Envelope {
    match view.footprint {
        Footprint::Tiles { width, breadth } => Envelope::Rect {
            half_x: (width.max(1) as i32 * TILE_UNITS) / 2,
            half_y: (breadth.max(1) as i32 * TILE_UNITS) / 2,
        },
        Footprint::Radius(radius) => Envelope::Circle {
            radius: radius.round().max(1.0) as i32,
        },
    }
}

/// Height a shot aims into. Never below one unit.
pub fn effective_height(view: &ObjectView) -> f64 {
    view.height.max(1.0)
}

/// Centre of the target's body.
pub fn center_of(view: &ObjectView) -> Position {
    Position::new(
        view.position.x,
        view.position.y,
        view.position.z + effective_height(view) / 2.0,
    )
}

/// How much of the target's height is visible from `muzzle` over the terrain.
///
/// Probes aim heights from the target's base upwards; the exposed part is
/// everything above the lowest height with a clear line.
pub fn exposed_height(terrain: &dyn TerrainQuery, muzzle: &Position, view: &ObjectView) -> f64 {
    let max_height = effective_height(view);
    for step in 0..=EXPOSURE_PROBE_STEPS {
        let h = max_height * step as f64 / EXPOSURE_PROBE_STEPS as f64;
        let aim = Position::new(view.position.x, view.position.y, view.position.z + h);
        if terrain.segment_intersection(muzzle, &aim).is_none() {
            return max_height - h;
        }
    }
    0.0
}

/// Splash reach test: a sphere for units, the native footprint for stationary objects.
pub fn within_blast(view: &ObjectView, center: &Position, radius: f64) -> bool {
    match view.footprint {
        Footprint::Radius(_) => {
            let body = center_of(view);
            body.range_to(center) <= radius
        }
        Footprint::Tiles { width, breadth } => {
            let half_x = (width.max(1) as i32 * TILE_UNITS) as f64 / 2.0;
            let half_y = (breadth.max(1) as i32 * TILE_UNITS) as f64 / 2.0;
            let dx = ((center.x - view.position.x).abs() - half_x).max(0.0);
            let dy = ((center.y - view.position.y).abs() - half_y).max(0.0);
            dx * dx + dy * dy <= radius * radius
        }
    }
}
