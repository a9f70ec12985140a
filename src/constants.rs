//! Centralised driving and world-generation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::DriveConfig`] mirrors these as runtime-overridable fields;
//! this file remains the **authoritative default** source.
//!
//! Units: distances are world pixels, speeds are pixels/second, durations are
//! seconds, angles are radians (0 = +x, positive = clockwise on screen).

// ── Vehicle: Motion ───────────────────────────────────────────────────────────

/// Forward top speed with no boost or nitro.
pub const BASE_MAX_SPEED: f32 = 800.0;

/// Throttle / brake rate (px/s²).
///
/// At 600 the car reaches base top speed from rest in ~1.33 s.
pub const ACCELERATION: f32 = 600.0;

/// Steering rate (rad/s) while above [`STEER_MIN_SPEED`].
pub const TURN_SPEED: f32 = 3.5;

/// Multiplier applied to the effective top speed while the boost button is held.
pub const BOOST_MULTIPLIER: f32 = 1.5;

/// Multiplicative per-frame drag applied when neither throttle nor brake is held.
///
/// Frame-rate sensitive: at 60 Hz a car at 800 px/s coasts to the
/// [`STOP_SPEED_THRESHOLD`] snap in ~250 frames.
pub const COAST_DRAG: f32 = 0.98;

/// Below this magnitude a coasting car snaps to exactly zero speed.
pub const STOP_SPEED_THRESHOLD: f32 = 5.0;

/// Steering input is ignored unless `|speed|` exceeds this.
pub const STEER_MIN_SPEED: f32 = 10.0;

/// Drift only engages above this `|speed|`.
pub const DRIFT_MIN_SPEED: f32 = 100.0;

/// Grip blend coefficient with normal traction.
pub const GRIP_NORMAL: f32 = 0.2;

/// Grip blend coefficient while drifting (mostly sliding).
pub const GRIP_DRIFT: f32 = 0.05;

/// Collision circle radius of the car.
pub const VEHICLE_RADIUS: f32 = 30.0;

/// Spawn heading: facing up the screen.
pub const SPAWN_HEADING: f32 = -std::f32::consts::FRAC_PI_2;

// ── Vehicle: Emission ─────────────────────────────────────────────────────────

/// Per-frame probability of a boost exhaust puff while boost is held.
pub const BOOST_SMOKE_CHANCE: f32 = 0.3;

/// Distance behind the car centre where boost exhaust is emitted.
pub const BOOST_EXHAUST_OFFSET: f32 = 30.0;

/// Per-frame probability of tyre smoke (one puff per rear tyre) while drifting.
pub const DRIFT_SMOKE_CHANCE: f32 = 0.9;

/// Distance behind the car centre of the rear axle.
pub const REAR_AXLE_OFFSET: f32 = 25.0;

/// Lateral distance of each rear tyre from the centre line.
pub const REAR_TYRE_SPREAD: f32 = 15.0;

// ── Vehicle: Collision ────────────────────────────────────────────────────────

/// Broad-phase box half-extent: objects farther than this on either axis are
/// never tested with the exact circle check.
pub const BROAD_PHASE_REACH: f32 = 100.0;

/// Velocity/speed factor applied on every contact (reverse and halve).
pub const BOUNCE_FACTOR: f32 = -0.5;

// ── Nitro ─────────────────────────────────────────────────────────────────────

/// Nitro top speed (three times the base).
pub const NITRO_MAX_SPEED: f32 = BASE_MAX_SPEED * 3.0;

/// Seconds the nitro stays at full strength.
pub const NITRO_ACTIVE_DURATION: f32 = 2.0;

/// Seconds over which the nitro top speed fades linearly back to base.
pub const NITRO_FADE_DURATION: f32 = 5.0;

/// Lower bound (inclusive) of the random recharge time drawn on activation.
pub const NITRO_COOLDOWN_MIN: f32 = 10.0;

/// Upper bound (exclusive) of the random recharge time drawn on activation.
pub const NITRO_COOLDOWN_MAX: f32 = 30.0;

// ── World: Layout ─────────────────────────────────────────────────────────────

/// Edge length of one ground tile.
pub const TILE_SIZE: f32 = 256.0;

/// Tiles per map side; map extent is `TILE_SIZE * TILE_COUNT` on both axes.
pub const TILE_COUNT: u32 = 100;

/// Radius around the spawn point kept free of obstacles.
pub const SAFE_RADIUS: f32 = 500.0;

/// Candidate placements attempted by the single-pass sampler.
pub const OBJECT_ATTEMPTS: usize = 2000;

/// Random roads added on top of the two guaranteed crossing roads.
pub const EXTRA_ROADS: usize = 12;

/// Road thickness.
pub const ROAD_WIDTH: f32 = 160.0;

/// Random road length range `[min, max)`.
pub const ROAD_LENGTH_MIN: f32 = 1500.0;
pub const ROAD_LENGTH_MAX: f32 = 6000.0;

/// Roll at or below this → tree.
pub const TREE_THRESHOLD: f32 = 0.70;

/// Roll at or below this (and above [`TREE_THRESHOLD`]) → stone; above → house.
pub const STONE_THRESHOLD: f32 = 0.95;

/// Object render scale range `[min, max)`.
pub const OBJECT_SCALE_MIN: f32 = 0.5;
pub const OBJECT_SCALE_MAX: f32 = 1.0;

/// Collision radius at scale 1.0, per object type.
pub const TREE_BASE_RADIUS: f32 = 40.0;
pub const STONE_BASE_RADIUS: f32 = 30.0;
pub const HOUSE_BASE_RADIUS: f32 = 90.0;

// ── Smoke ─────────────────────────────────────────────────────────────────────

/// Half-width of the uniform angular jitter applied to each puff.
pub const SMOKE_JITTER: f32 = 0.25;

/// Initial puff speed range `[min, max)`.
pub const SMOKE_SPEED_MIN: f32 = 0.0;
pub const SMOKE_SPEED_MAX: f32 = 20.0;

/// Initial puff radius range `[min, max)`.
pub const SMOKE_SIZE_MIN: f32 = 5.0;
pub const SMOKE_SIZE_MAX: f32 = 10.0;

/// Per-update life decrement range `[min, max)`; a puff lives 25–100 updates.
pub const SMOKE_DECAY_MIN: f32 = 0.01;
pub const SMOKE_DECAY_MAX: f32 = 0.04;

/// Per-update velocity damping (frame-rate sensitive).
pub const SMOKE_DAMPING: f32 = 0.95;

/// Radius growth (px/s).
pub const SMOKE_GROWTH: f32 = 10.0;

// ── Session ───────────────────────────────────────────────────────────────────

/// Upper bound on the frame delta fed to the simulation.
///
/// A backgrounded window can deliver multi-second deltas; capping keeps the
/// car from tunnelling through obstacles on resume.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Hard ceiling on the delta any core update will integrate, whatever the
/// caller passes.  Keeps `turn_speed * dt` and `velocity * dt` finite.
pub const MAX_STEP_DT: f32 = 10.0;

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Divisor turning px/s into the displayed km/h figure.
pub const SPEEDOMETER_DIVISOR: f32 = 10.0;

pub const HUD_FONT_SIZE: f32 = 22.0;
