//! Vehicle-vs-obstacle collision.
//!
//! Broad phase: a box of half-size `broad_phase_reach` around the car's
//! *current* position, re-tested for each candidate so an earlier push in the
//! same frame can bring an obstacle into or out of range.  Candidates come
//! from [`ObstacleQuery::obstacles_near`] with a doubled reach to cover that
//! drift.  Narrow phase: circle vs circle.  Every overlapping obstacle is
//! resolved independently in query order: the car is pushed out along the
//! centre-to-centre normal by the penetration depth, and speed plus both
//! velocity components are multiplied by [`BOUNCE_FACTOR`].  There is no
//! iterative solver, so pushes from several obstacles simply add up.

use super::Vehicle;
use crate::constants::BOUNCE_FACTOR;
use crate::world::{ObstacleQuery, WorldObject};
use bevy::prelude::*;

/// Displacement that separates a circle at `position` with `radius` from
/// `obstacle`, or `None` when they do not overlap.
///
/// Coincident centres push along +x (angle 0).
pub fn push_out(position: Vec2, radius: f32, obstacle: &WorldObject) -> Option<Vec2> {
    let delta = position - obstacle.position;
    let dist = delta.length();
    let min_dist = radius + obstacle.radius;
    if dist >= min_dist {
        return None;
    }
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    Some(normal * (min_dist - dist))
}

fn within_box(a: Vec2, b: Vec2, reach: f32) -> bool {
    let d = (a - b).abs();
    d.x <= reach && d.y <= reach
}

impl Vehicle {
    /// Push out of and bounce off every overlapping obstacle.  Returns the
    /// number of contacts resolved this frame.
    pub fn resolve_collisions<Q: ObstacleQuery + ?Sized>(&mut self, obstacles: &Q) -> usize {
        let radius = self.tuning.radius;
        let reach = self.tuning.broad_phase_reach;
        let mut contacts = 0;
        for obstacle in obstacles.obstacles_near(self.position, reach * 2.0) {
            if !within_box(self.position, obstacle.position, reach) {
                continue;
            }
            if let Some(push) = push_out(self.position, radius, obstacle) {
                self.position += push;
                self.speed *= BOUNCE_FACTOR;
                self.velocity *= BOUNCE_FACTOR;
                contacts += 1;
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NitroTuning, VehicleTuning, WorldGenConfig};
    use crate::world::ObjectKind;

    fn car_at(position: Vec2) -> Vehicle {
        Vehicle::new(position, 0.0, VehicleTuning::default(), NitroTuning::default())
    }

    /// A stone whose collision radius is exactly `radius`.
    fn obstacle(position: Vec2, radius: f32) -> WorldObject {
        let config = WorldGenConfig::default();
        let mut obj = WorldObject::new(position, ObjectKind::Stone, 0.0, 1.0, &config);
        obj.radius = radius;
        obj
    }

    #[test]
    fn overlap_resolves_to_exact_tangency_and_halved_reversed_motion() {
        let mut v = car_at(Vec2::ZERO);
        v.speed = 100.0;
        v.velocity = Vec2::new(100.0, 20.0);
        let rock = [obstacle(Vec2::new(50.0, 0.0), 30.0)];

        assert_eq!(v.resolve_collisions(&rock[..]), 1);

        let dist = v.position.distance(rock[0].position);
        assert!((dist - 60.0).abs() < 1e-4, "distance {dist}");
        assert!((v.position - Vec2::new(-10.0, 0.0)).length() < 1e-4);
        assert_eq!(v.speed, -50.0);
        assert_eq!(v.velocity, Vec2::new(-50.0, -10.0));
    }

    #[test]
    fn diagonal_overlap_pushes_along_the_normal() {
        let mut v = car_at(Vec2::ZERO);
        let rock = [obstacle(Vec2::new(30.0, 40.0), 40.0)];
        v.resolve_collisions(&rock[..]);
        let dist = v.position.distance(rock[0].position);
        assert!((dist - 70.0).abs() < 1e-3);
        // Pushed directly away from the obstacle centre.
        let dir = (v.position - rock[0].position).normalize();
        assert!((dir - Vec2::new(-0.6, -0.8)).length() < 1e-4);
    }

    #[test]
    fn coincident_centres_push_along_positive_x() {
        let mut v = car_at(Vec2::new(100.0, 100.0));
        v.speed = 40.0;
        let rock = [obstacle(Vec2::new(100.0, 100.0), 20.0)];

        assert_eq!(v.resolve_collisions(&rock[..]), 1);
        assert!(v.position.is_finite());
        assert!((v.position - Vec2::new(150.0, 100.0)).length() < 1e-4);
        assert_eq!(v.speed, -20.0);
    }

    #[test]
    fn exact_tangency_is_not_a_contact() {
        let mut v = car_at(Vec2::ZERO);
        v.speed = 100.0;
        let rock = [obstacle(Vec2::new(60.0, 0.0), 30.0)];
        assert_eq!(v.resolve_collisions(&rock[..]), 0);
        assert_eq!(v.speed, 100.0);
    }

    #[test]
    fn broad_phase_skips_obstacles_outside_the_box() {
        let mut v = car_at(Vec2::ZERO);
        v.speed = 100.0;
        // Huge radius would overlap, but the centre is beyond the 100-unit box.
        let rock = [obstacle(Vec2::new(0.0, 150.0), 200.0)];
        assert_eq!(v.resolve_collisions(&rock[..]), 0);
        assert_eq!(v.position, Vec2::ZERO);
    }

    #[test]
    fn simultaneous_contacts_resolve_additively() {
        let mut v = car_at(Vec2::ZERO);
        v.speed = 200.0;
        v.velocity = Vec2::new(200.0, 0.0);
        let rocks = [
            obstacle(Vec2::new(0.0, 50.0), 30.0),
            obstacle(Vec2::new(0.0, -50.0), 30.0),
        ];
        assert_eq!(v.resolve_collisions(&rocks[..]), 2);
        assert_eq!(v.speed, 50.0);
        assert_eq!(v.velocity, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn broad_phase_follows_the_pushed_position() {
        let first = obstacle(Vec2::new(20.0, 0.0), 20.0);
        // 105 units away: outside the box at the start of the frame, inside
        // it once `first` has pushed the car 30 units toward it.
        let far = obstacle(Vec2::new(-105.0, 0.0), 80.0);

        let mut v = car_at(Vec2::ZERO);
        v.speed = 100.0;
        assert_eq!(v.resolve_collisions(&[first, far][..]), 2);
        assert!((v.position - Vec2::new(5.0, 0.0)).length() < 1e-4);
        assert_eq!(v.speed, 25.0);

        // In the other order `far` is tested before the push and skipped.
        let mut v = car_at(Vec2::ZERO);
        v.speed = 100.0;
        assert_eq!(v.resolve_collisions(&[far, first][..]), 1);
        assert!((v.position - Vec2::new(-30.0, 0.0)).length() < 1e-4);
        assert_eq!(v.speed, -50.0);
    }

    #[test]
    fn push_out_reports_none_when_clear() {
        let rock = obstacle(Vec2::new(100.0, 0.0), 10.0);
        assert_eq!(push_out(Vec2::ZERO, 30.0, &rock), None);
    }
}
