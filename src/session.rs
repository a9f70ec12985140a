//! Session orchestration: one world, one vehicle, one effects store.
//!
//! ## Frame order
//!
//! | Step | Who | Mutates |
//! |------|-----|---------|
//! | 1 | `keyboard_to_input_system` | [`DriveInput`] |
//! | 2 | [`Session::tick`] → `Vehicle::update` | vehicle (reads world, emits smoke) |
//! | 3 | [`Session::tick`] → `Effects::update` | particles |
//! | 4 | rendering / HUD systems | nothing in the session |
//!
//! The frame delta from Bevy's [`Time`] is sanitised and capped at
//! `session.max_frame_dt` before it reaches the simulation.

use crate::config::{load_drive_config, DriveConfig};
use crate::effects::Effects;
use crate::input::{keyboard_to_input_system, DriveInput};
use crate::vehicle::{sanitize_dt, Vehicle};
use crate::world::{GenerationReport, World};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Everything that changes during a run.
#[derive(Resource, Debug, Clone)]
pub struct Session {
    pub world: World,
    pub vehicle: Vehicle,
    pub effects: Effects,
    /// Seed every random stream in this session was derived from.
    pub seed: u64,
    pub report: GenerationReport,
    rng: StdRng,
    max_frame_dt: f32,
    frames: u64,
}

impl Session {
    /// Generate the world and place the car at its centre.
    pub fn new(config: &DriveConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = World::new(config.world);
        let report = world.generate(&mut rng);
        let vehicle = Vehicle::spawn(world.spawn_point(), config.vehicle, config.nitro);
        let effects = Effects::new(config.smoke, rng.gen());

        Self {
            world,
            vehicle,
            effects,
            seed,
            report,
            rng,
            max_frame_dt: config.session.max_frame_dt,
            frames: 0,
        }
    }

    /// The delta actually simulated for a raw frame delta.
    pub fn effective_dt(&self, raw_dt: f32) -> f32 {
        sanitize_dt(raw_dt).min(self.max_frame_dt)
    }

    /// Advance one frame: vehicle first, then particles.  Returns the delta
    /// that was simulated.
    pub fn tick(&mut self, raw_dt: f32, input: &DriveInput) -> f32 {
        let dt = self.effective_dt(raw_dt);
        self.vehicle
            .update(dt, input, &self.world, &mut self.effects, &mut self.rng);
        self.effects.update(dt);
        self.frames += 1;
        dt
    }

    /// Frames simulated so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Config loading, session creation and the per-frame simulation step.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DriveConfig>()
            .init_resource::<DriveInput>()
            .add_systems(Startup, (load_drive_config, start_session_system).chain())
            .add_systems(Update, (keyboard_to_input_system, session_tick_system).chain());
    }
}

/// Startup system: build the [`Session`] from the loaded config.
pub fn start_session_system(mut commands: Commands, config: Res<DriveConfig>) {
    let seed = config.resolve_seed();
    info!("Starting session with seed {seed}");
    commands.insert_resource(Session::new(&config, seed));
}

/// Feed Bevy's frame delta and the current input into the session.
pub fn session_tick_system(time: Res<Time>, input: Res<DriveInput>, mut session: ResMut<Session>) {
    let raw = time.delta_secs();
    let dt = session.tick(raw, &input);
    if dt < raw {
        debug!("Frame delta {raw:.3}s capped to {dt:.3}s");
    }
}
