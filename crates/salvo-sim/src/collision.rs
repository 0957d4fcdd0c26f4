//! Swept segment-vs-envelope collision in integer world units.
//!
//! Coordinates are relative to the target's centre. Results are fractions of
//! the segment expressed on a fixed scale of `COLLISION_TIME_SCALE`, so the
//! same inputs give the same answer on every machine.

use salvo_core::constants::COLLISION_TIME_SCALE;
use salvo_core::types::GridPoint;

use crate::geometry::Envelope;

const FULL: Interval = Interval {
    begin: 0,
    end: COLLISION_TIME_SCALE,
};

const EMPTY: Interval = Interval { begin: 0, end: 0 };

/// Half-open parameter interval on the collision time scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub begin: i64,
    pub end: i64,
}

impl Interval {
    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    pub fn intersect(self, other: Interval) -> Interval {
        Interval {
            begin: self.begin.max(other.begin),
            end: self.end.min(other.end),
        }
    }
}

/// Interval during which a coordinate moving from `a1` to `a2` stays within `[-half, half]`.
pub fn axis_interval(a1: i32, a2: i32, half: i32) -> Interval {
    let (mut a1, mut a2) = (a1 as i64, a2 as i64);
    let half = half as i64;
    if a1 > a2 {
        a1 = -a1;
        a2 = -a2;
    }

    if a1 > half || a2 < -half {
        return EMPTY;
    }
    if a1 == a2 {
        return FULL;
    }

    let span = a2 - a1;
    let begin = if a1 >= -half {
        0
    } else {
        COLLISION_TIME_SCALE * (-half - a1) / span
    };
    let end = if a2 <= half {
        COLLISION_TIME_SCALE
    } else {
        COLLISION_TIME_SCALE * (half - a1) / span
    };
    Interval { begin, end }
}

/// Interval during which the point moving from `(x1, y1)` to `(x2, y2)` is inside the disk.
pub fn disk_interval(x1: i32, y1: i32, x2: i32, y2: i32, radius: i32) -> Interval {
    let (x1, y1) = (x1 as i64, y1 as i64);
    let dx = x2 as i64 - x1;
    let dy = y2 as i64 - y1;
    let r = radius as i64;

    let a = (dx * dx + dy * dy) as i128;
    let b = (x1 * dx + y1 * dy) as i128;
    let c = (x1 * x1 + y1 * y1 - r * r) as i128;
    let d = b * b - a * c;

    if d < 0 {
        return EMPTY;
    }
    if a == 0 {
        return if c < 0 { FULL } else { EMPTY };
    }

    let root = isqrt(d);
    let scale = COLLISION_TIME_SCALE as i128;
    let begin = (scale * (-b - root) / a).max(0);
    let end = (scale * (-b + root) / a).min(scale);
    Interval {
        begin: begin as i64,
        end: end as i64,
    }
}

/// Overlap interval of a segment with an envelope of the given half-height.
pub fn collision_interval(
    start: GridPoint,
    end: GridPoint,
    envelope: &Envelope,
    half_height: i32,
) -> Interval {
    let z = axis_interval(start.z, end.z, half_height);
    if z.is_empty() {
        return z;
    }

    match *envelope {
        Envelope::Rect { half_x, half_y } => z
            .intersect(axis_interval(start.x, end.x, half_x))
            .intersect(axis_interval(start.y, end.y, half_y)),
        Envelope::Circle { radius } => {
            z.intersect(disk_interval(start.x, start.y, end.x, end.y, radius))
        }
    }
}

/// Earliest fraction in `[0, COLLISION_TIME_SCALE)` at which the segment
/// enters the envelope, or None if it never does.
pub fn collision_time(
    start: GridPoint,
    end: GridPoint,
    envelope: &Envelope,
    half_height: i32,
) -> Option<i64> {
    let interval = collision_interval(start, end, envelope, half_height);
    if interval.is_empty() {
        None
    } else {
        Some(interval.begin.max(0))
    }
}

fn isqrt(n: i128) -> i128 {
    if n <= 0 {
        return 0;
    }
    let mut x = (n as f64).sqrt() as i128;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    const TANK: Envelope = Envelope::Circle { radius: 32 };
    const BUNKER: Envelope = Envelope::Rect {
        half_x: 64,
        half_y: 64,
    };

    #[test]
    fn test_miss_wide() {
        let start = GridPoint::new(-500, 200, 0);
        let end = GridPoint::new(500, 200, 0);
        assert_eq!(collision_time(start, end, &TANK, 16), None);
        assert_eq!(collision_time(start, end, &BUNKER, 16), None);
    }

    #[test]
    fn test_pass_through_centre_contains_midpoint() {
        // Passes the centre exactly half-way along the segment.
        let start = GridPoint::new(-512, 0, 0);
        let end = GridPoint::new(512, 0, 0);
        let interval = collision_interval(start, end, &TANK, 16);
        assert!(!interval.is_empty());
        assert!(interval.begin <= 512 && 512 < interval.end, "{interval:?}");

        // Entry at x = -32, i.e. 480 / 1024 of the way.
        assert_eq!(collision_time(start, end, &TANK, 16), Some(480));
        assert_eq!(collision_time(start, end, &BUNKER, 16), Some(448));
    }

    #[test]
    fn test_segment_starting_inside_hits_at_zero() {
        let start = GridPoint::new(5, -3, 2);
        let end = GridPoint::new(400, 0, 2);
        assert_eq!(collision_time(start, end, &TANK, 16), Some(0));
        assert_eq!(collision_time(start, end, &BUNKER, 16), Some(0));
    }

    #[test]
    fn test_stationary_point() {
        let inside = GridPoint::new(10, 10, 0);
        assert_eq!(collision_time(inside, inside, &TANK, 16), Some(0));

        let outside = GridPoint::new(100, 0, 0);
        assert_eq!(collision_time(outside, outside, &TANK, 16), None);
    }

    #[test]
    fn test_passes_overhead() {
        let start = GridPoint::new(-300, 0, 40);
        let end = GridPoint::new(300, 0, 40);
        assert_eq!(collision_time(start, end, &TANK, 16), None);
    }

    #[test]
    fn test_plunging_shot_enters_top() {
        // Falls straight down onto the roof: z from 100 to -100 with half height 20.
        let start = GridPoint::new(0, 0, 100);
        let end = GridPoint::new(0, 0, -100);
        let time = collision_time(start, end, &BUNKER, 20).unwrap();
        assert_eq!(time, 1024 * 80 / 200);
    }

    #[test]
    fn test_axis_interval_reversed_direction() {
        // Moving from +200 to -200 enters [-50, 50] at 150 / 400.
        let interval = axis_interval(200, -200, 50);
        assert_eq!(interval.begin, 1024 * 150 / 400);
        assert_eq!(interval.end, 1024 * 250 / 400);
    }

    #[test]
    fn test_high_speed_segment_cannot_tunnel() {
        // One tick covers 20 000 units; the thin target is still found.
        let start = GridPoint::new(-10_000, 1, 0);
        let end = GridPoint::new(10_000, 1, 0);
        let time = collision_time(start, end, &Envelope::Circle { radius: 4 }, 8).unwrap();
        assert!(time > 505 && time < 512, "entry fraction {time}");
    }

    #[test]
    fn test_large_coordinates_do_not_overflow() {
        let start = GridPoint::new(-2_000_000, -2_000_000, 0);
        let end = GridPoint::new(2_000_000, 2_000_000, 0);
        let interval = collision_interval(start, end, &TANK, 16);
        assert!(!interval.is_empty());
        assert!(interval.begin <= 512 && 512 <= interval.end);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(1 << 80), 1 << 40);
    }
}
