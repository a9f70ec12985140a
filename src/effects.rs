//! Smoke particles: tyre smoke while drifting and exhaust puffs while boosting.
//!
//! ## Design
//!
//! [`Effects`] owns the only particle store.  Producers never touch it
//! directly; they go through the [`SmokeSink`] insertion trait, which keeps
//! the vehicle decoupled from the store and lets tests count emissions with a
//! recording sink.
//!
//! Ageing is deliberately mixed-rate: position and size integrate with `dt`,
//! while life decay and velocity damping are applied once per update.  A puff
//! therefore lives a fixed number of frames regardless of frame rate.
//!
//! Rendering reads [`Effects::particles`] each frame (see
//! [`crate::rendering`]); it never mutates the store.

use crate::config::SmokeTuning;
use crate::vehicle::sanitize_dt;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Insertion point for smoke emission requests.
pub trait SmokeSink {
    /// Request one puff at `(x, y)` drifting along `angle` (radians).
    fn create_smoke(&mut self, x: f32, y: f32, angle: f32);
}

/// One decaying smoke puff.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Emission direction after jitter (radians).
    pub angle: f32,
    /// Remaining life in `[0, 1]`; 1 = just born.  Removed at ≤ 0.
    pub life: f32,
    /// Life lost per update.
    pub decay: f32,
    /// Current render radius.
    pub size: f32,
}

impl Particle {
    /// Build a puff travelling along `angle` at `speed`.
    pub fn new(position: Vec2, angle: f32, speed: f32, size: f32, decay: f32) -> Self {
        Self {
            position,
            velocity: Vec2::from_angle(angle) * speed,
            angle,
            life: 1.0,
            decay,
            size,
        }
    }

    /// Advance one frame.  `dt` is sanitised the same way the vehicle's is.
    pub fn update(&mut self, dt: f32, tuning: &SmokeTuning) {
        let dt = sanitize_dt(dt);
        self.position += self.velocity * dt;
        self.life -= self.decay;
        self.size += tuning.growth * dt;
        self.velocity *= tuning.damping;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Render opacity: half of the remaining life.
    pub fn alpha(&self) -> f32 {
        (self.life * 0.5).clamp(0.0, 0.5)
    }
}

/// Owner of every live smoke particle.
#[derive(Debug, Clone)]
pub struct Effects {
    particles: Vec<Particle>,
    tuning: SmokeTuning,
    rng: StdRng,
}

impl Effects {
    pub fn new(tuning: SmokeTuning, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            tuning,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Age every particle and drop the expired ones.
    ///
    /// Survivors keep their relative order.
    pub fn update(&mut self, dt: f32) {
        let tuning = self.tuning;
        for particle in &mut self.particles {
            particle.update(dt, &tuning);
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl SmokeSink for Effects {
    fn create_smoke(&mut self, x: f32, y: f32, angle: f32) {
        let t = self.tuning;
        let jitter = if t.jitter > 0.0 {
            self.rng.gen_range(-t.jitter..t.jitter)
        } else {
            0.0
        };
        let speed = self.rng.gen_range(t.speed_min..t.speed_max);
        let size = self.rng.gen_range(t.size_min..t.size_max);
        let decay = self.rng.gen_range(t.decay_min..t.decay_max);
        self.particles
            .push(Particle::new(Vec2::new(x, y), angle + jitter, speed, size, decay));
    }
}
