//! Ballistic solver for indirect fire.
//!
//! Given the horizontal and vertical offset to the aim point and the muzzle
//! speed, finds launch velocity components that land the shell on the aim
//! point under constant gravity. The low arc is always preferred.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use salvo_core::constants::GRAVITY;

/// Shortest flight time the solver will return (seconds).
pub const MIN_FLIGHT_TIME: f64 = 0.001;

/// Steepest minimum elevation honoured (radians).
const MAX_MIN_ANGLE: f64 = 1.55;

/// Launch velocity components and the resulting flight time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallisticSolution {
    /// Horizontal speed along the line to the aim point.
    pub vx: f64,
    /// Initial vertical speed.
    pub vz: f64,
    pub flight_time: f64,
}

impl BallisticSolution {
    /// Elevation of the launch vector (radians).
    pub fn launch_angle(&self) -> f64 {
        self.vz.atan2(self.vx)
    }

    pub fn launch_speed(&self) -> f64 {
        (self.vx * self.vx + self.vz * self.vz).sqrt()
    }

    /// Height above the launch point after `t` seconds.
    pub fn height_at(&self, t: f64) -> f64 {
        (self.vz - t * GRAVITY / 2.0) * t
    }
}

/// Solve for a trajectory covering `dx` horizontally and `dz` vertically.
///
/// If `speed` cannot reach the aim point, the minimum speed that can is used
/// instead. A trajectory flatter than `min_angle` is re-solved at exactly
/// `min_angle` so it still lands on the aim point.
pub fn solve(dx: f64, dz: f64, speed: f64, min_angle: f64) -> BallisticSolution {
    let g = GRAVITY;
    let dx = dx.abs();

    let mut a = speed * speed - dz * g;
    let b = g * g * (dx * dx + dz * dz);
    let mut c = a * a - b;
    let min_a = b.sqrt();
    if c < 0.0 || a < min_a {
        // Out of range: take the minimum-energy trajectory.
        a = min_a;
        c = 0.0;
    }

    let mut t = ((2.0 * (a - c.sqrt())).max(0.0).sqrt() / g).max(MIN_FLIGHT_TIME);
    let mut vx = dx / t;
    let mut vz = dz / t + g * t / 2.0;

    if vz < 0.0 {
        // Aim point is below: drop it from a level launch.
        t = (-2.0 * dz / g).sqrt().max(MIN_FLIGHT_TIME);
        vz = 0.0;
        vx = dx / t;
    }

    let min_angle = min_angle.clamp(0.0, MAX_MIN_ANGLE);
    if min_angle > 0.0 && vz.atan2(vx) < min_angle {
        let tan = min_angle.tan();
        let apex = dx * tan - dz;
        if apex > 0.0 {
            t = (2.0 * apex / g).sqrt().max(MIN_FLIGHT_TIME);
            vx = dx / t;
        }
        vz = vx * tan;
    }

    BallisticSolution {
        vx,
        vz,
        flight_time: t,
    }
}

/// Speed multiplier in `[1 - spread, 1 + spread]`.
pub fn jitter_factor(rng: &mut ChaCha8Rng, spread: f64) -> f64 {
    if spread <= 0.0 {
        return 1.0;
    }
    1.0 + rng.gen_range(-spread..=spread)
}

/// `solve` with the muzzle speed perturbed by a seeded jitter.
pub fn solve_jittered(
    dx: f64,
    dz: f64,
    speed: f64,
    min_angle: f64,
    rng: &mut ChaCha8Rng,
    spread: f64,
) -> BallisticSolution {
    solve(dx, dz, speed * jitter_factor(rng, spread), min_angle)
}
