//! Broad-phase obstacle lookup.
//!
//! The vehicle only asks "which obstacles could be touching me?" through
//! [`ObstacleQuery`].  The shipped implementation is a flat scan with an
//! axis-aligned box reject, which is fast enough for a few thousand static
//! objects.  A grid or quadtree can implement the same trait without any
//! change on the vehicle side.

use super::{World, WorldObject};
use bevy::prelude::*;

/// Spatial query over static obstacles.
pub trait ObstacleQuery {
    /// Every obstacle whose centre lies within `reach` of `point` on both
    /// axes.  Results are a conservative superset; callers run the exact
    /// circle test themselves.
    fn obstacles_near(&self, point: Vec2, reach: f32) -> Vec<&WorldObject>;
}

impl ObstacleQuery for [WorldObject] {
    fn obstacles_near(&self, point: Vec2, reach: f32) -> Vec<&WorldObject> {
        self.iter()
            .filter(|obj| {
                let d = (point - obj.position).abs();
                d.x <= reach && d.y <= reach
            })
            .collect()
    }
}

impl ObstacleQuery for Vec<WorldObject> {
    fn obstacles_near(&self, point: Vec2, reach: f32) -> Vec<&WorldObject> {
        self.as_slice().obstacles_near(point, reach)
    }
}

impl ObstacleQuery for World {
    fn obstacles_near(&self, point: Vec2, reach: f32) -> Vec<&WorldObject> {
        self.objects.obstacles_near(point, reach)
    }
}
