//! Single-pass world generation.
//!
//! ## Pipeline
//!
//! 1. Two full-length roads crossing at the spawn point (one per axis).
//! 2. `extra_roads` random segments: random orientation, length in
//!    `[road_length_min, road_length_max)`, random offset inside the map.
//! 3. `object_attempts` candidate obstacles at uniform positions.  Each
//!    candidate is tested once and skipped on the first conflict:
//!    - inside the spawn safe radius,
//!    - its circle overlaps a road rectangle,
//!    - its circle overlaps an already placed object, unless the candidate is
//!      a tree and the placed object a stone.
//!
//! Rejected candidates are never retried, so the final object count is below
//! `object_attempts` and depends entirely on the RNG stream.

use super::{ObjectKind, RoadOrientation, RoadSegment, World, WorldObject};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Why a candidate obstacle was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    SafeZone,
    Road,
    Object,
}

/// Outcome counters for one [`World::generate`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub roads: usize,
    pub placed: usize,
    pub rejected_safe_zone: usize,
    pub rejected_road: usize,
    pub rejected_object: usize,
}

impl GenerationReport {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::SafeZone => self.rejected_safe_zone += 1,
            Rejection::Road => self.rejected_road += 1,
            Rejection::Object => self.rejected_object += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected_safe_zone + self.rejected_road + self.rejected_object
    }
}

/// Uniform sample in `[0, span)`, or 0 when the span is empty.
fn offset_within(rng: &mut impl Rng, span: f32) -> f32 {
    if span > 0.0 {
        rng.gen_range(0.0..span)
    } else {
        0.0
    }
}

/// Map a uniform roll in `[0, 1)` to an object kind using the cumulative
/// thresholds.
pub fn kind_for_roll(roll: f32, tree_threshold: f32, stone_threshold: f32) -> ObjectKind {
    if roll <= tree_threshold {
        ObjectKind::Tree
    } else if roll <= stone_threshold {
        ObjectKind::Stone
    } else {
        ObjectKind::House
    }
}

/// First placement rule a candidate breaks, if any.
///
/// `kind` is the candidate's own type; it decides whether an overlap with an
/// existing object is exempt.
pub fn placement_conflict(
    position: Vec2,
    radius: f32,
    kind: ObjectKind,
    spawn: Vec2,
    safe_radius: f32,
    roads: &[RoadSegment],
    objects: &[WorldObject],
) -> Option<Rejection> {
    if position.distance_squared(spawn) < safe_radius * safe_radius {
        return Some(Rejection::SafeZone);
    }
    if roads.iter().any(|road| road.intersects_circle(position, radius)) {
        return Some(Rejection::Road);
    }
    let blocked = objects
        .iter()
        .any(|existing| existing.overlaps(position, radius) && !kind.may_overlap(existing.kind));
    if blocked {
        return Some(Rejection::Object);
    }
    None
}

impl World {
    /// Lay out roads, then scatter obstacles.  Appends to the current
    /// contents; call [`World::clear`] first to regenerate.
    pub fn generate(&mut self, rng: &mut impl Rng) -> GenerationReport {
        let mut report = GenerationReport::default();

        self.generate_roads(rng);
        report.roads = self.roads.len();

        let cfg = self.config;
        let spawn = self.spawn_point();

        for _ in 0..cfg.object_attempts {
            let position = Vec2::new(
                rng.gen_range(0.0..self.width),
                rng.gen_range(0.0..self.height),
            );

            if position.distance_squared(spawn) < cfg.safe_radius * cfg.safe_radius {
                report.record(Rejection::SafeZone);
                continue;
            }

            let kind = kind_for_roll(rng.gen::<f32>(), cfg.tree_threshold, cfg.stone_threshold);
            let angle = rng.gen_range(0.0..TAU);
            let scale = rng.gen_range(cfg.scale_min..cfg.scale_max);
            let candidate = WorldObject::new(position, kind, angle, scale, &cfg);

            match placement_conflict(
                candidate.position,
                candidate.radius,
                candidate.kind,
                spawn,
                cfg.safe_radius,
                &self.roads,
                &self.objects,
            ) {
                Some(rejection) => report.record(rejection),
                None => {
                    self.objects.push(candidate);
                    report.placed += 1;
                }
            }
        }

        info!(
            "World generated: {} roads, {} objects placed, {} rejected \
             (safe zone {}, road {}, overlap {})",
            report.roads,
            report.placed,
            report.rejected(),
            report.rejected_safe_zone,
            report.rejected_road,
            report.rejected_object
        );
        report
    }

    fn generate_roads(&mut self, rng: &mut impl Rng) {
        let cfg = self.config;
        let spawn = self.spawn_point();
        let w = cfg.road_width;

        self.roads.push(RoadSegment::new(
            Vec2::new(0.0, spawn.y - w * 0.5),
            Vec2::new(self.width, w),
            RoadOrientation::Horizontal,
        ));
        self.roads.push(RoadSegment::new(
            Vec2::new(spawn.x - w * 0.5, 0.0),
            Vec2::new(w, self.height),
            RoadOrientation::Vertical,
        ));

        for _ in 0..cfg.extra_roads {
            let length = rng
                .gen_range(cfg.road_length_min..cfg.road_length_max)
                .min(self.width.min(self.height));
            let road = if rng.gen_bool(0.5) {
                RoadSegment::new(
                    Vec2::new(
                        offset_within(rng, self.width - length),
                        offset_within(rng, self.height - w),
                    ),
                    Vec2::new(length, w),
                    RoadOrientation::Horizontal,
                )
            } else {
                RoadSegment::new(
                    Vec2::new(
                        offset_within(rng, self.width - w),
                        offset_within(rng, self.height - length),
                    ),
                    Vec2::new(w, length),
                    RoadOrientation::Vertical,
                )
            };
            self.roads.push(road);
        }
    }
}
