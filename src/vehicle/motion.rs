//! Per-frame vehicle update.
//!
//! ## Pipeline (in order, once per frame)
//!
//! 1. Nitro activation: from `Ready`, set speed to nitro top speed and snap
//!    velocity to `heading * speed` with no grip blend.
//! 2. Nitro phase / recharge transitions.
//! 3. Effective top speed from the nitro phase.
//! 4. Throttle, brake, or coast (multiplicative drag with a stop snap).
//! 5. Boost: scale the top speed; occasionally puff exhaust from the rear.
//! 6. Clamp speed to `[-max / 2, max]`.
//! 7. Steering (above a minimum speed; inverted while reversing).
//! 8. Drift flag.
//! 9. Grip blend of held velocity toward the heading, then integrate position.
//! 10. Tyre smoke while drifting.
//! 11. Obstacle collision (see [`super::collision`]).

use super::Vehicle;
use crate::constants::{BOOST_EXHAUST_OFFSET, MAX_STEP_DT};
use crate::effects::SmokeSink;
use crate::input::DriveInput;
use crate::world::ObstacleQuery;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Non-finite or negative frame deltas become 0; finite ones are capped at
/// [`MAX_STEP_DT`].
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_STEP_DT)
    } else {
        0.0
    }
}

/// Wrap an angle into `[-π, π)` so heading precision survives long sessions.
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

impl Vehicle {
    /// Advance the car by one frame.
    ///
    /// `obstacles` is only read; `smoke` only receives emission requests.
    pub fn update<Q, S, R>(
        &mut self,
        dt: f32,
        input: &DriveInput,
        obstacles: &Q,
        smoke: &mut S,
        rng: &mut R,
    ) where
        Q: ObstacleQuery + ?Sized,
        S: SmokeSink + ?Sized,
        R: Rng,
    {
        let dt = sanitize_dt(dt);

        if input.nos {
            self.activate_nitro(rng);
        }
        self.nitro.tick(dt, &self.nitro_tuning);

        let mut max_speed = self
            .nitro
            .max_speed(self.tuning.base_max_speed, &self.nitro_tuning);

        self.apply_throttle(dt, input);

        self.is_boosting = input.boost;
        if self.is_boosting {
            max_speed *= self.tuning.boost_multiplier;
            if rng.gen::<f32>() < self.tuning.boost_smoke_chance {
                let exhaust = self.position - self.forward() * BOOST_EXHAUST_OFFSET;
                smoke.create_smoke(exhaust.x, exhaust.y, self.heading + PI);
            }
        }

        self.max_speed = max_speed;
        self.clamp_speed();
        self.steer(dt, input);

        self.is_drifting = input.drift && self.speed.abs() > self.tuning.drift_min_speed;
        self.blend_velocity();
        self.position += self.velocity * dt;

        if self.is_drifting && rng.gen::<f32>() < self.tuning.drift_smoke_chance {
            let (left, right) = self.rear_tyres();
            let away = self.heading + PI;
            smoke.create_smoke(left.x, left.y, away);
            smoke.create_smoke(right.x, right.y, away);
        }

        self.resolve_collisions(obstacles);
    }

    /// Fire nitro if ready: instant jump to nitro top speed along the heading,
    /// bypassing the grip blend.
    pub fn activate_nitro<R: Rng>(&mut self, rng: &mut R) -> bool {
        if !self.nitro.try_activate(&self.nitro_tuning, rng) {
            return false;
        }
        self.speed = self.nitro_tuning.max_speed;
        self.velocity = self.forward() * self.speed;
        true
    }

    fn apply_throttle(&mut self, dt: f32, input: &DriveInput) {
        if input.coasting() {
            self.speed *= self.tuning.coast_drag;
            if self.speed.abs() < self.tuning.stop_speed_threshold {
                self.speed = 0.0;
            }
        } else if input.up {
            self.speed += self.tuning.acceleration * dt;
        } else {
            self.speed -= self.tuning.acceleration * dt;
        }
    }

    /// Keep speed inside `[-max / 2, max]`.
    fn clamp_speed(&mut self) {
        let max = self.max_speed;
        if self.speed > max {
            self.speed = max;
        }
        if self.speed < -max / 2.0 {
            self.speed = -max / 2.0;
        }
    }

    fn steer(&mut self, dt: f32, input: &DriveInput) {
        if self.speed.abs() <= self.tuning.steer_min_speed {
            return;
        }
        // Reversing flips the wheel so "left" always swings the nose left.
        let dir = self.speed.signum();
        let step = self.tuning.turn_speed * dt * dir;
        if input.left {
            self.heading -= step;
        }
        if input.right {
            self.heading += step;
        }
        self.heading = wrap_angle(self.heading);
    }

    fn blend_velocity(&mut self) {
        let ideal = self.forward() * self.speed;
        let grip = self.grip();
        self.velocity = self.velocity * (1.0 - grip) + ideal * grip;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NitroTuning, VehicleTuning};
    use crate::world::WorldObject;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records every emission request instead of spawning particles.
    #[derive(Default)]
    struct RecordingSink {
        puffs: Vec<(Vec2, f32)>,
    }

    impl SmokeSink for RecordingSink {
        fn create_smoke(&mut self, x: f32, y: f32, angle: f32) {
            self.puffs.push((Vec2::new(x, y), angle));
        }
    }

    const NO_OBSTACLES: &[WorldObject] = &[];
    const DT: f32 = 0.016;

    fn car(heading: f32) -> Vehicle {
        Vehicle::new(Vec2::ZERO, heading, VehicleTuning::default(), NitroTuning::default())
    }

    fn step(v: &mut Vehicle, input: DriveInput, sink: &mut RecordingSink, rng: &mut StdRng) {
        v.update(DT, &input, NO_OBSTACLES, sink, rng);
    }

    fn held(f: impl FnOnce(&mut DriveInput)) -> DriveInput {
        let mut input = DriveInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn throttle_from_rest_rises_toward_base_max() {
        let mut v = car(0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        let up = held(|i| i.up = true);

        let mut previous = v.speed;
        for _ in 0..(1.0 / DT) as usize {
            step(&mut v, up, &mut sink, &mut rng);
            assert!(v.speed > previous, "speed must rise every frame");
            assert!(v.speed <= v.tuning.base_max_speed);
            previous = v.speed;
        }
        assert!(v.speed > 500.0);
    }

    #[test]
    fn throttle_saturates_at_base_max() {
        let mut v = car(0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..300 {
            step(&mut v, held(|i| i.up = true), &mut sink, &mut rng);
        }
        assert_eq!(v.speed, v.tuning.base_max_speed);
    }

    #[test]
    fn reverse_is_capped_at_half_max() {
        let mut v = car(0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..300 {
            step(&mut v, held(|i| i.down = true), &mut sink, &mut rng);
        }
        assert_eq!(v.speed, -v.tuning.base_max_speed / 2.0);
    }

    #[test]
    fn coasting_decays_geometrically_then_snaps_to_zero() {
        let mut v = car(0.0);
        v.speed = 500.0;
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);

        let mut frames = 0;
        while v.speed != 0.0 {
            let before = v.speed;
            step(&mut v, DriveInput::default(), &mut sink, &mut rng);
            frames += 1;
            if v.speed != 0.0 {
                assert!((v.speed - before * v.tuning.coast_drag).abs() < 1e-3);
                assert!(v.speed >= v.tuning.stop_speed_threshold);
            }
            assert!(frames < 300, "speed never snapped to zero");
        }
        // 500 · 0.98ⁿ < 5 first holds at n = 228.
        assert!((225..=232).contains(&frames), "took {frames} frames");
    }

    #[test]
    fn boost_raises_the_cap() {
        let mut v = car(0.0);
        v.speed = 1000.0;
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);

        let input = DriveInput {
            up: true,
            boost: true,
            ..Default::default()
        };
        step(&mut v, input, &mut sink, &mut rng);
        assert!(v.speed > v.tuning.base_max_speed);
        assert_eq!(v.effective_max_speed(), v.tuning.base_max_speed * v.tuning.boost_multiplier);

        step(&mut v, held(|i| i.up = true), &mut sink, &mut rng);
        assert_eq!(v.speed, v.tuning.base_max_speed);
    }

    #[test]
    fn boost_exhaust_leaves_the_rear_pointing_backwards() {
        let mut v = car(0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            step(&mut v, held(|i| i.boost = true), &mut sink, &mut rng);
        }
        assert!(!sink.puffs.is_empty());
        // ~30 % chance per frame: 50 frames should be well short of saturation.
        assert!(sink.puffs.len() < 40);
        for (pos, angle) in &sink.puffs {
            assert!((*pos - Vec2::new(-30.0, 0.0)).length() < 1e-4);
            assert!((angle - PI).abs() < 1e-6);
        }
    }

    #[test]
    fn nitro_activation_is_instant_and_unblended() {
        let heading = 0.3;
        let mut v = car(heading);
        v.velocity = Vec2::new(0.0, 200.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);

        let input = DriveInput {
            up: true,
            nos: true,
            ..Default::default()
        };
        step(&mut v, input, &mut sink, &mut rng);

        let nos = v.nitro_tuning.max_speed;
        assert_eq!(v.speed, nos);
        let expected = Vec2::new(heading.cos(), heading.sin()) * nos;
        assert!((v.velocity - expected).length() < 1e-2, "velocity {:?}", v.velocity);
        assert_eq!(v.nitro.phase().label(), "active");
        assert_eq!(v.effective_max_speed(), nos);
    }

    #[test]
    fn nitro_cannot_refire_during_recharge() {
        let mut v = car(0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(v.activate_nitro(&mut rng));
        v.speed = 0.0;
        assert!(!v.activate_nitro(&mut rng));
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn steering_needs_minimum_speed() {
        let mut v = car(0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        step(&mut v, held(|i| i.left = true), &mut sink, &mut rng);
        assert_eq!(v.heading, 0.0);
    }

    #[test]
    fn steering_inverts_in_reverse() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();

        let mut forward = car(0.0);
        forward.speed = 200.0;
        let input = DriveInput {
            up: true,
            left: true,
            ..Default::default()
        };
        step(&mut forward, input, &mut sink, &mut rng);
        assert!(forward.heading < 0.0, "forward + left turns counter-clockwise");

        let mut backward = car(0.0);
        backward.speed = -200.0;
        let input = DriveInput {
            down: true,
            left: true,
            ..Default::default()
        };
        step(&mut backward, input, &mut sink, &mut rng);
        assert!(backward.heading > 0.0, "reverse + left swings the heading the other way");
        assert!((backward.heading - v_turn_step()).abs() < 1e-5);
    }

    fn v_turn_step() -> f32 {
        VehicleTuning::default().turn_speed * DT
    }

    #[test]
    fn drift_requires_speed_above_threshold() {
        let mut v = car(0.0);
        v.speed = 90.0;
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        let input = DriveInput {
            up: true,
            drift: true,
            ..Default::default()
        };
        step(&mut v, input, &mut sink, &mut rng);
        // 90 + 600·0.016 = 99.6 → still below 100.
        assert!(!v.is_drifting);
        assert!(sink.puffs.is_empty());
    }

    #[test]
    fn drifting_uses_low_grip_and_emits_tyre_smoke() {
        let mut v = car(0.0);
        v.speed = 500.0;
        v.velocity = Vec2::new(0.0, 500.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(9);
        let drift = held(|i| i.drift = true);

        step(&mut v, drift, &mut sink, &mut rng);
        assert!(v.is_drifting);
        assert_eq!(v.grip(), v.tuning.grip_drift);
        // Coasting: 500 → 490; velocity = (0, 500)·0.95 + (490, 0)·0.05.
        assert!((v.velocity - Vec2::new(24.5, 475.0)).length() < 1e-3);

        for _ in 0..9 {
            step(&mut v, drift, &mut sink, &mut rng);
        }
        assert!(v.is_drifting);
        assert!(!sink.puffs.is_empty());
        assert_eq!(sink.puffs.len() % 2, 0, "tyres always emit in pairs");
        for (_, angle) in &sink.puffs {
            assert!((angle - PI).abs() < 1e-6);
        }
    }

    #[test]
    fn normal_grip_converges_faster_than_drift() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();

        let mut gripping = car(0.0);
        gripping.speed = 500.0;
        gripping.velocity = Vec2::new(0.0, 500.0);
        step(&mut gripping, held(|i| i.up = true), &mut sink, &mut rng);

        let mut sliding = gripping.clone();
        sliding.speed = 500.0;
        sliding.velocity = Vec2::new(0.0, 500.0);
        sliding.position = Vec2::ZERO;
        let input = DriveInput {
            up: true,
            drift: true,
            ..Default::default()
        };
        step(&mut sliding, input, &mut sink, &mut rng);

        assert!(gripping.velocity.y < sliding.velocity.y);
    }

    #[test]
    fn position_integrates_blended_velocity() {
        let mut v = car(0.0);
        v.speed = 400.0;
        v.velocity = Vec2::new(400.0, 0.0);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        step(&mut v, held(|i| i.up = true), &mut sink, &mut rng);
        // speed 409.6, velocity 400·0.8 + 409.6·0.2 = 401.92
        assert!((v.position.x - 401.92 * DT).abs() < 1e-3);
    }

    #[test]
    fn speed_never_exceeds_effective_cap() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut sink = RecordingSink::default();
        let mut v = car(0.0);

        for frame in 0..5000 {
            let input = DriveInput {
                up: rng.gen_bool(0.6),
                down: rng.gen_bool(0.2),
                left: rng.gen_bool(0.3),
                right: rng.gen_bool(0.3),
                drift: rng.gen_bool(0.3),
                boost: rng.gen_bool(0.3),
                nos: rng.gen_bool(0.01),
            };
            let dt = if frame % 500 == 0 {
                5.0
            } else {
                rng.gen_range(0.0..0.05)
            };
            v.update(dt, &input, NO_OBSTACLES, &mut sink, &mut rng);

            let cap = v.effective_max_speed();
            assert!(v.speed <= cap + 1e-3, "frame {frame}: {} > {cap}", v.speed);
            assert!(v.speed >= -cap / 2.0 - 1e-3, "frame {frame}: {} < {}", v.speed, -cap / 2.0);
        }
    }

    #[test]
    fn degenerate_dt_is_ignored_and_huge_dt_stays_finite() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = RecordingSink::default();
        let all = DriveInput {
            up: true,
            left: true,
            drift: true,
            boost: true,
            nos: true,
            ..Default::default()
        };

        let mut v = car(0.0);
        v.update(f32::NAN, &all, NO_OBSTACLES, &mut sink, &mut rng);
        v.update(f32::INFINITY, &all, NO_OBSTACLES, &mut sink, &mut rng);
        v.update(-1.0, &all, NO_OBSTACLES, &mut sink, &mut rng);
        assert_eq!(v.position, Vec2::ZERO);

        for dt in [1.0e9, 1.0e38, f32::MAX] {
            v.update(dt, &all, NO_OBSTACLES, &mut sink, &mut rng);
            assert!(v.position.is_finite(), "dt {dt}: position {:?}", v.position);
            assert!(v.velocity.is_finite(), "dt {dt}: velocity {:?}", v.velocity);
            assert!(v.speed.is_finite());
            assert!(v.heading.is_finite(), "dt {dt}: heading {}", v.heading);
            assert!(v.heading >= -PI && v.heading <= PI);
        }

        // A later ordinary frame still steers normally.
        let before = v.heading;
        v.update(DT, &all, NO_OBSTACLES, &mut sink, &mut rng);
        assert!(v.heading.is_finite());
        assert_ne!(v.heading, before);
    }

    #[test]
    fn sanitize_dt_passes_positive_finite_only() {
        assert_eq!(sanitize_dt(0.016), 0.016);
        assert_eq!(sanitize_dt(-0.5), 0.0);
        assert_eq!(sanitize_dt(f32::NAN), 0.0);
        assert_eq!(sanitize_dt(f32::NEG_INFINITY), 0.0);
        assert_eq!(sanitize_dt(f32::MAX), MAX_STEP_DT);
        assert_eq!(sanitize_dt(MAX_STEP_DT * 0.5), MAX_STEP_DT * 0.5);
    }
}
