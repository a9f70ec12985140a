//! Static world layout: roads and scattered obstacles.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`generator`] | One-shot single-pass rejection sampler that fills a [`World`] |
//! | [`query`] | [`ObstacleQuery`] broad-phase trait used by vehicle collision |
//!
//! Everything here is immutable once generated; the vehicle only reads it.

pub mod generator;
pub mod query;

pub use generator::{GenerationReport, Rejection};
pub use query::ObstacleQuery;

use crate::config::WorldGenConfig;
use bevy::prelude::*;

/// Obstacle category.  Determines collision radius and sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Tree,
    Stone,
    House,
}

impl ObjectKind {
    /// Name of the sprite asset (`assets/<name>.png`).
    pub fn asset_name(self) -> &'static str {
        match self {
            ObjectKind::Tree => "tree",
            ObjectKind::Stone => "stone",
            ObjectKind::House => "house",
        }
    }

    /// Collision radius at scale 1.0.
    pub fn base_radius(self, config: &WorldGenConfig) -> f32 {
        match self {
            ObjectKind::Tree => config.tree_radius,
            ObjectKind::Stone => config.stone_radius,
            ObjectKind::House => config.house_radius,
        }
    }

    /// Whether a new object of this kind may overlap an existing `other`.
    ///
    /// Only a tree may be placed over a stone; every other pair must be clear.
    pub fn may_overlap(self, other: ObjectKind) -> bool {
        self == ObjectKind::Tree && other == ObjectKind::Stone
    }

    /// Houses are always drawn axis-aligned.
    pub fn rotates(self) -> bool {
        self != ObjectKind::House
    }
}

/// One placed obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldObject {
    pub position: Vec2,
    pub kind: ObjectKind,
    /// Render rotation (radians); always 0 for houses.
    pub angle: f32,
    /// Render scale relative to the sprite's pixel size.
    pub scale: f32,
    /// Collision circle radius.
    pub radius: f32,
}

impl WorldObject {
    pub fn new(
        position: Vec2,
        kind: ObjectKind,
        angle: f32,
        scale: f32,
        config: &WorldGenConfig,
    ) -> Self {
        Self {
            position,
            kind,
            angle: if kind.rotates() { angle } else { 0.0 },
            scale,
            radius: kind.base_radius(config) * scale,
        }
    }

    /// True when the two collision circles strictly overlap.
    pub fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        self.position.distance_squared(position) < (self.radius + radius).powi(2)
    }
}

/// Informational road direction; geometry is fully described by the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadOrientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned road rectangle: `origin` is the top-left corner, `size` the
/// width/height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSegment {
    pub origin: Vec2,
    pub size: Vec2,
    pub orientation: RoadOrientation,
}

impl RoadSegment {
    pub fn new(origin: Vec2, size: Vec2, orientation: RoadOrientation) -> Self {
        Self {
            origin,
            size,
            orientation,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// True when a circle strictly overlaps the rectangle.
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.origin, self.origin + self.size);
        closest.distance_squared(center) < radius * radius
    }
}

/// The generated map: fixed dimensions, roads and obstacles.
#[derive(Debug, Clone)]
pub struct World {
    pub config: WorldGenConfig,
    pub width: f32,
    pub height: f32,
    pub roads: Vec<RoadSegment>,
    pub objects: Vec<WorldObject>,
}

impl World {
    /// An empty map sized from the tile grid.
    pub fn new(config: WorldGenConfig) -> Self {
        let size = config.map_size();
        Self {
            config,
            width: size,
            height: size,
            roads: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Where the vehicle starts: the map centre.
    pub fn spawn_point(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Drop all roads and objects so [`World::generate`] can run again.
    pub fn clear(&mut self) {
        self.roads.clear();
        self.objects.clear();
    }

    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }
}
