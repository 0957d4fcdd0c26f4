//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 10;

/// Milliseconds per tick.
pub const TICK_MS: u32 = 1000 / TICK_RATE;

/// Milliseconds per second, used when scaling per-second rates.
pub const MS_PER_SEC: u32 = 1000;

/// World units per terrain tile.
pub const TILE_UNITS: i32 = 128;

/// Gravity in world units per second squared.
pub const GRAVITY: f64 = 1000.0;

// --- Collision ---

/// Fixed-point scale of the collision tester's fractional time.
pub const COLLISION_TIME_SCALE: i64 = 1024;

/// Radius searched for collision candidates around a projectile each tick.
pub const NEIGHBOUR_RANGE: f64 = (TILE_UNITS * 4) as f64;

/// Height added above the aim point when firing at a bare position.
pub const LINE_OF_FIRE_MINIMUM: f64 = 5.0;

/// Vertical step used when probing how much of a target is exposed.
pub const EXPOSURE_PROBE_STEPS: u32 = 8;

// --- Trajectory ---

/// Relative deterministic jitter applied to ballistic launch speed (±5%).
pub const SPEED_JITTER: f64 = 0.05;

// --- Homing ---

/// Lowest clearance a terrain-following shot keeps over the ground.
pub const HOMING_HEIGHT_MIN: f64 = 200.0;

/// Highest cruise clearance of a terrain-following shot.
pub const HOMING_HEIGHT_MAX: f64 = 450.0;

/// Attempts to raise the aim altitude when a terrain crash is predicted.
pub const HOMING_ALTITUDE_RETRIES: u32 = 10;

/// Fraction of flight speed a homing prediction leads a moving target by.
pub const HOMING_LEAD_SPEED_FRACTION: f64 = 0.75;

// --- Range ---

/// Default distance extension, percent of long range a shot may travel.
pub const DEFAULT_DISTANCE_EXTENSION: u32 = 100;

/// A continuation may only spawn while the parent has flown less than this × long range.
pub const PENETRATION_RANGE_FACTOR: f64 = 1.25;

// --- Damage ---

/// Damage reduction per experience level (percent).
pub const EXP_REDUCE_DAMAGE: u32 = 6;

/// Highest experience level that reduces incoming damage.
pub const MAX_EXPERIENCE_LEVEL: u8 = 8;

/// Default percentage of raw damage that always gets through armour.
pub const DEFAULT_MIN_DAMAGE_PERCENT: u32 = 33;

/// Default modifier percentage for an effect/armor pair without an entry.
pub const DEFAULT_DAMAGE_MODIFIER: u32 = 100;

// --- Experience ---

/// Default experience gain modifier per player (percent).
pub const DEFAULT_EXPERIENCE_MODIFIER: u32 = 100;

/// Clamp applied to the attacker/victim cost ratios of the quality factor.
pub const QUALITY_RATIO_MIN: f64 = 0.5;
pub const QUALITY_RATIO_MAX: f64 = 2.0;

/// Maximum number of players with individual experience modifiers.
pub const MAX_PLAYERS: usize = 16;

/// Experience awarded for dealing one full body's worth of damage.
pub const EXPERIENCE_PER_BODY: f64 = 100.0;

/// Experience points per level of damage reduction.
pub const EXPERIENCE_PER_LEVEL: f64 = 200.0;
