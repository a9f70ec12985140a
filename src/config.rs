//! Runtime driving configuration loaded from `assets/drive.toml`.
//!
//! [`DriveConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`], grouped into sections.  At startup,
//! [`load_drive_config`] reads `assets/drive.toml` and overwrites the defaults
//! with any values present in the file.  Missing keys fall back to the
//! compile-time defaults, so a minimal TOML can override just the values you
//! care about:
//!
//! ```toml
//! [vehicle]
//! turn_speed = 4.0
//!
//! [session]
//! seed = 42
//! ```
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by the `Default` impls below.

use crate::constants::*;
use crate::error::{validate_positive, validate_range, validate_unit, DriveResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Path read by [`load_drive_config`], relative to the working directory.
pub const CONFIG_PATH: &str = "assets/drive.toml";

/// Environment variable that overrides `[session].seed`.
pub const SEED_ENV_VAR: &str = "DRIFTFIELD_SEED";

/// Runtime-tunable driving, world and effect configuration.
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub vehicle: VehicleTuning,
    pub nitro: NitroTuning,
    pub world: WorldGenConfig,
    pub smoke: SmokeTuning,
    pub session: SessionConfig,
}

/// Static handling constants for the car.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub base_max_speed: f32,
    pub acceleration: f32,
    pub turn_speed: f32,
    pub boost_multiplier: f32,
    pub coast_drag: f32,
    pub stop_speed_threshold: f32,
    pub steer_min_speed: f32,
    pub drift_min_speed: f32,
    pub grip_normal: f32,
    pub grip_drift: f32,
    pub radius: f32,
    pub broad_phase_reach: f32,
    pub boost_smoke_chance: f32,
    pub drift_smoke_chance: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            base_max_speed: BASE_MAX_SPEED,
            acceleration: ACCELERATION,
            turn_speed: TURN_SPEED,
            boost_multiplier: BOOST_MULTIPLIER,
            coast_drag: COAST_DRAG,
            stop_speed_threshold: STOP_SPEED_THRESHOLD,
            steer_min_speed: STEER_MIN_SPEED,
            drift_min_speed: DRIFT_MIN_SPEED,
            grip_normal: GRIP_NORMAL,
            grip_drift: GRIP_DRIFT,
            radius: VEHICLE_RADIUS,
            broad_phase_reach: BROAD_PHASE_REACH,
            boost_smoke_chance: BOOST_SMOKE_CHANCE,
            drift_smoke_chance: DRIFT_SMOKE_CHANCE,
        }
    }
}

/// Nitro phase durations and recharge range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct NitroTuning {
    pub max_speed: f32,
    pub active_duration: f32,
    pub fade_duration: f32,
    pub cooldown_min: f32,
    pub cooldown_max: f32,
}

impl Default for NitroTuning {
    fn default() -> Self {
        Self {
            max_speed: NITRO_MAX_SPEED,
            active_duration: NITRO_ACTIVE_DURATION,
            fade_duration: NITRO_FADE_DURATION,
            cooldown_min: NITRO_COOLDOWN_MIN,
            cooldown_max: NITRO_COOLDOWN_MAX,
        }
    }
}

/// Parameters for the one-shot world generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    pub tile_size: f32,
    pub tile_count: u32,
    pub safe_radius: f32,
    pub object_attempts: usize,
    pub extra_roads: usize,
    pub road_width: f32,
    pub road_length_min: f32,
    pub road_length_max: f32,
    pub tree_threshold: f32,
    pub stone_threshold: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub tree_radius: f32,
    pub stone_radius: f32,
    pub house_radius: f32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            tile_count: TILE_COUNT,
            safe_radius: SAFE_RADIUS,
            object_attempts: OBJECT_ATTEMPTS,
            extra_roads: EXTRA_ROADS,
            road_width: ROAD_WIDTH,
            road_length_min: ROAD_LENGTH_MIN,
            road_length_max: ROAD_LENGTH_MAX,
            tree_threshold: TREE_THRESHOLD,
            stone_threshold: STONE_THRESHOLD,
            scale_min: OBJECT_SCALE_MIN,
            scale_max: OBJECT_SCALE_MAX,
            tree_radius: TREE_BASE_RADIUS,
            stone_radius: STONE_BASE_RADIUS,
            house_radius: HOUSE_BASE_RADIUS,
        }
    }
}

impl WorldGenConfig {
    /// Map extent on each axis.
    pub fn map_size(&self) -> f32 {
        self.tile_size * self.tile_count as f32
    }
}

/// Smoke puff randomisation ranges and ageing rates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmokeTuning {
    pub jitter: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub decay_min: f32,
    pub decay_max: f32,
    pub damping: f32,
    pub growth: f32,
}

impl Default for SmokeTuning {
    fn default() -> Self {
        Self {
            jitter: SMOKE_JITTER,
            speed_min: SMOKE_SPEED_MIN,
            speed_max: SMOKE_SPEED_MAX,
            size_min: SMOKE_SIZE_MIN,
            size_max: SMOKE_SIZE_MAX,
            decay_min: SMOKE_DECAY_MIN,
            decay_max: SMOKE_DECAY_MAX,
            damping: SMOKE_DAMPING,
            growth: SMOKE_GROWTH,
        }
    }
}

/// Per-run settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed RNG seed; `None` draws one from entropy.
    pub seed: Option<u64>,
    pub max_frame_dt: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl DriveConfig {
    /// Parse a TOML document and validate the result.
    pub fn from_toml_str(contents: &str) -> DriveResult<Self> {
        let config: DriveConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would divide by zero, panic inside `gen_range`, or
    /// make the motion model diverge.
    pub fn validate(&self) -> DriveResult<()> {
        let v = &self.vehicle;
        validate_positive("vehicle.base_max_speed", v.base_max_speed)?;
        validate_positive("vehicle.acceleration", v.acceleration)?;
        validate_positive("vehicle.turn_speed", v.turn_speed)?;
        validate_positive("vehicle.boost_multiplier", v.boost_multiplier)?;
        validate_unit("vehicle.coast_drag", v.coast_drag)?;
        validate_unit("vehicle.grip_normal", v.grip_normal)?;
        validate_unit("vehicle.grip_drift", v.grip_drift)?;
        validate_positive("vehicle.radius", v.radius)?;
        validate_positive("vehicle.broad_phase_reach", v.broad_phase_reach)?;
        validate_unit("vehicle.boost_smoke_chance", v.boost_smoke_chance)?;
        validate_unit("vehicle.drift_smoke_chance", v.drift_smoke_chance)?;

        let n = &self.nitro;
        validate_positive("nitro.max_speed", n.max_speed)?;
        validate_positive("nitro.active_duration", n.active_duration)?;
        validate_positive("nitro.fade_duration", n.fade_duration)?;
        validate_range("nitro.cooldown", n.cooldown_min, n.cooldown_max)?;

        let w = &self.world;
        validate_positive("world.tile_size", w.tile_size)?;
        validate_positive("world.tile_count", w.tile_count as f32)?;
        validate_positive("world.road_width", w.road_width)?;
        validate_range("world.road_length", w.road_length_min, w.road_length_max)?;
        validate_range("world.scale", w.scale_min, w.scale_max)?;
        validate_unit("world.tree_threshold", w.tree_threshold)?;
        validate_unit("world.stone_threshold", w.stone_threshold)?;
        if w.stone_threshold < w.tree_threshold {
            validate_range("world.type_thresholds", w.tree_threshold, w.stone_threshold)?;
        }
        validate_positive("world.tree_radius", w.tree_radius)?;
        validate_positive("world.stone_radius", w.stone_radius)?;
        validate_positive("world.house_radius", w.house_radius)?;

        let s = &self.smoke;
        validate_range("smoke.speed", s.speed_min, s.speed_max)?;
        validate_range("smoke.size", s.size_min, s.size_max)?;
        validate_range("smoke.decay", s.decay_min, s.decay_max)?;
        validate_positive("smoke.decay_min", s.decay_min)?;
        validate_unit("smoke.damping", s.damping)?;

        validate_positive("session.max_frame_dt", self.session.max_frame_dt)?;
        Ok(())
    }

    /// Seed for this run: env override, then config, then entropy.
    pub fn resolve_seed(&self) -> u64 {
        if let Some(seed) = std::env::var(SEED_ENV_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            return seed;
        }
        self.session.seed.unwrap_or_else(rand::random::<u64>)
    }
}

/// Startup system: attempt to load `assets/drive.toml` and overwrite the
/// `DriveConfig` resource with the values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the game.  A missing file is not an error.
pub fn load_drive_config(mut config: ResMut<DriveConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match DriveConfig::from_toml_str(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded drive config from {CONFIG_PATH}");
            }
            Err(e) => {
                warn!("Rejected {CONFIG_PATH}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}
