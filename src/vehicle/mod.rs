//! Player vehicle: kinematic state, motion model, nitro and collision.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`nitro`] | Nitro phase machine and its independent recharge counter |
//! | [`motion`] | The per-frame [`Vehicle::update`] pipeline (throttle, boost, steering, grip blend, smoke) |
//! | [`collision`] | Circle-vs-circle push-out and bounce against world obstacles |
//!
//! The vehicle keeps two notions of motion: a scalar `speed` along `heading`
//! and a held `velocity` vector.  Each frame the velocity is blended toward
//! `heading * speed`; position integrates the blended velocity, so low grip
//! leaves the car sliding along its old direction.

pub mod collision;
pub mod motion;
pub mod nitro;

pub use collision::push_out;
pub use motion::sanitize_dt;
pub use nitro::{Nitro, NitroPhase};

use crate::config::{NitroTuning, VehicleTuning};
use crate::constants::SPAWN_HEADING;
use bevy::prelude::*;

/// The player-controlled car.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub position: Vec2,
    /// Facing direction (radians, 0 = +x), independent of `velocity`.
    pub heading: f32,
    /// Signed speed along `heading`; negative = reversing.
    pub speed: f32,
    /// Held velocity that carries drift momentum.
    pub velocity: Vec2,
    pub nitro: Nitro,
    pub is_drifting: bool,
    pub is_boosting: bool,
    pub tuning: VehicleTuning,
    pub nitro_tuning: NitroTuning,
    /// Forward speed cap computed during the last update.
    max_speed: f32,
}

impl Vehicle {
    /// A car at rest at `position`, facing `heading`.
    pub fn new(
        position: Vec2,
        heading: f32,
        tuning: VehicleTuning,
        nitro_tuning: NitroTuning,
    ) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            velocity: Vec2::ZERO,
            nitro: Nitro::default(),
            is_drifting: false,
            is_boosting: false,
            tuning,
            nitro_tuning,
            max_speed: tuning.base_max_speed,
        }
    }

    /// A car at the spawn point facing up the screen.
    pub fn spawn(position: Vec2, tuning: VehicleTuning, nitro_tuning: NitroTuning) -> Self {
        Self::new(position, SPAWN_HEADING, tuning, nitro_tuning)
    }

    /// Unit vector along `heading`.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Unit vector pointing to the car's right (screen coordinates, y down).
    pub fn right(&self) -> Vec2 {
        self.forward().perp()
    }

    /// Forward speed cap in effect after the last update (nitro and boost
    /// applied).  Reverse is capped at half of this.
    pub fn effective_max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Current grip blend coefficient.
    pub fn grip(&self) -> f32 {
        if self.is_drifting {
            self.tuning.grip_drift
        } else {
            self.tuning.grip_normal
        }
    }

    /// World-space points of the two rear tyres `(left, right)`.
    pub fn rear_tyres(&self) -> (Vec2, Vec2) {
        use crate::constants::{REAR_AXLE_OFFSET, REAR_TYRE_SPREAD};
        let axle = self.position - self.forward() * REAR_AXLE_OFFSET;
        let lateral = self.right() * REAR_TYRE_SPREAD;
        (axle - lateral, axle + lateral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn car(heading: f32) -> Vehicle {
        Vehicle::new(Vec2::ZERO, heading, VehicleTuning::default(), NitroTuning::default())
    }

    #[test]
    fn spawn_faces_up_the_screen_at_rest() {
        let v = Vehicle::spawn(
            Vec2::new(5.0, 6.0),
            VehicleTuning::default(),
            NitroTuning::default(),
        );
        assert_eq!(v.heading, -FRAC_PI_2);
        assert_eq!(v.speed, 0.0);
        assert_eq!(v.velocity, Vec2::ZERO);
        assert!(v.nitro.is_ready());
    }

    #[test]
    fn right_is_clockwise_from_forward() {
        let v = car(0.0);
        // Facing +x with y pointing down, the right-hand side is +y.
        assert!((v.right() - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn rear_tyres_sit_behind_and_either_side() {
        let v = car(0.0);
        let (left, right) = v.rear_tyres();
        assert!((left - Vec2::new(-25.0, -15.0)).length() < 1e-4);
        assert!((right - Vec2::new(-25.0, 15.0)).length() < 1e-4);
    }
}
