//! Segment-vs-terrain intersection.
//!
//! Uses stepped ray traversal along the segment, then bisects the first
//! crossing interval to find the fractional time the segment enters the ground.

use salvo_core::types::Position;

use crate::grid::HeightField;

/// Horizontal sample interval for the traversal (world units).
const SAMPLE_INTERVAL: f64 = 32.0;

/// Bisection passes used to refine a crossing.
const REFINE_STEPS: u32 = 12;

/// Fractional time in [0, 1] at which the segment `from → to` first goes
/// below the terrain surface, or None if it stays above ground.
///
/// Samples outside the field read the nearest edge height.
pub fn segment_intersection(field: &HeightField, from: &Position, to: &Position) -> Option<f64> {
    let below = |t: f64| {
        let x = from.x + (to.x - from.x) * t;
        let y = from.y + (to.y - from.y) * t;
        let z = from.z + (to.z - from.z) * t;
        z < field.clamped_height_at(x, y)
    };

    if below(0.0) {
        return Some(0.0);
    }

    let horiz_dist = from.horizontal_range_to(to);
    let num_samples = ((horiz_dist / SAMPLE_INTERVAL).ceil() as usize).max(1);

    let mut prev_t = 0.0;
    for i in 1..=num_samples {
        let t = i as f64 / num_samples as f64;
        if below(t) {
            // Refine between the last clear sample and this one.
            let mut lo = prev_t;
            let mut hi = t;
            for _ in 0..REFINE_STEPS {
                let mid = (lo + hi) * 0.5;
                if below(mid) {
                    hi = mid;
                } else {
                    lo = mid;
                }
            }
            return Some(hi);
        }
        prev_t = t;
    }

    None
}

/// Check line-of-sight between two points.
pub fn has_line_of_sight(field: &HeightField, from: &Position, to: &Position) -> bool {
    segment_intersection(field, from, to).is_none()
}
