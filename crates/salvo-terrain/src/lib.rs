//! Terrain system for SALVO.
//!
//! Heightmap storage, height queries, and segment-vs-terrain
//! intersection for projectile flight.

pub use salvo_core as core;

pub mod grid;
pub mod intersect;

use salvo_core::types::Position;

// Re-export key types for convenience.
pub use grid::{FieldHeader, HeightField};
pub use intersect::{has_line_of_sight, segment_intersection};

/// Terrain queries the projectile subsystem consumes.
pub trait TerrainQuery {
    /// Ground height at (x, y). Positions off the map read the nearest edge.
    fn height_at(&self, x: f64, y: f64) -> f64;

    /// Fractional time in [0, 1] at which `from → to` crosses the terrain.
    fn segment_intersection(&self, from: &Position, to: &Position) -> Option<f64>;

    /// Whether (x, y) lies inside the world bounds.
    fn contains(&self, x: f64, y: f64) -> bool;

    /// World extent (width, height).
    fn extent(&self) -> (f64, f64);
}

impl TerrainQuery for HeightField {
    fn height_at(&self, x: f64, y: f64) -> f64 {
        self.clamped_height_at(x, y)
    }

    fn segment_intersection(&self, from: &Position, to: &Position) -> Option<f64> {
        intersect::segment_intersection(self, from, to)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        HeightField::contains(self, x, y)
    }

    fn extent(&self) -> (f64, f64) {
        (self.header.world_width(), self.header.world_height())
    }
}
