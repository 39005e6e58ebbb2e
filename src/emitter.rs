//! Spawn shapes for fresh and recycled agents.
//!
//! A [`SpawnShape`] decides where a slot lands when it is (re)initialized and
//! which way it starts moving. The population never grows: shapes only
//! place agents into existing slots.
//!
//! | Shape | Description |
//! |-------|-------------|
//! | [`SpawnShape::Sphere`] | Uniform inside a ball |
//! | [`SpawnShape::Shell`] | On a sphere surface, heading inward or outward |
//! | [`SpawnShape::Box`] | Uniform inside an axis-aligned box |
//! | [`SpawnShape::Point`] | At a point, heading inside a cone |
//!
//! # Example
//!
//! ```ignore
//! let lifecycle = Lifecycle::new().spawn(SpawnShape::Shell {
//!     center: Vec3::ZERO,
//!     radius: 0.9,
//!     inward: true,
//! });
//! ```

use crate::spawn::SpawnContext;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Where and how an agent is placed when its slot is (re)initialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpawnShape {
    /// Uniform inside a sphere.
    Sphere {
        /// Sphere center.
        center: Vec3,
        /// Sphere radius.
        radius: f32,
    },

    /// On the surface of a sphere.
    ///
    /// With `inward` set, agents start moving toward the center, which
    /// reads as the swarm "breathing in" from the edges.
    Shell {
        /// Sphere center.
        center: Vec3,
        /// Sphere radius.
        radius: f32,
        /// Head toward the center instead of a random direction.
        inward: bool,
    },

    /// Uniform within an axis-aligned box.
    Box {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },

    /// From a single point into a cone.
    Point {
        /// Spawn position.
        position: Vec3,
        /// Cone axis.
        direction: Vec3,
        /// Cone half-angle in radians.
        spread: f32,
    },
}

impl Default for SpawnShape {
    fn default() -> Self {
        SpawnShape::Sphere {
            center: Vec3::ZERO,
            radius: 0.6,
        }
    }
}

impl SpawnShape {
    /// Sample a spawn position and unit heading.
    pub fn sample(&self, ctx: &mut SpawnContext) -> (Vec3, Vec3) {
        match self {
            SpawnShape::Sphere { center, radius } => {
                (*center + ctx.random_in_sphere(*radius), ctx.random_direction())
            }
            SpawnShape::Shell {
                center,
                radius,
                inward,
            } => {
                let offset = ctx.random_on_sphere(*radius);
                let heading = if *inward {
                    (-offset).try_normalize().unwrap_or_else(|| ctx.random_direction())
                } else {
                    ctx.random_direction()
                };
                (*center + offset, heading)
            }
            SpawnShape::Box { min, max } => {
                let position = Vec3::new(
                    ctx.random_range(min.x.min(max.x), min.x.max(max.x)),
                    ctx.random_range(min.y.min(max.y), min.y.max(max.y)),
                    ctx.random_range(min.z.min(max.z), min.z.max(max.z)),
                );
                (position, ctx.random_direction())
            }
            SpawnShape::Point {
                position,
                direction,
                spread,
            } => (*position, ctx.random_in_cone(*direction, *spread)),
        }
    }

    /// Furthest distance from the origin a spawned agent can land.
    pub fn reach(&self) -> f32 {
        match self {
            SpawnShape::Sphere { center, radius } | SpawnShape::Shell { center, radius, .. } => {
                center.length() + radius.abs()
            }
            SpawnShape::Box { min, max } => min.abs().max(max.abs()).length(),
            SpawnShape::Point { position, .. } => position.length(),
        }
    }

    /// Whether every numeric parameter is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            SpawnShape::Sphere { center, radius } | SpawnShape::Shell { center, radius, .. } => {
                center.is_finite() && radius.is_finite()
            }
            SpawnShape::Box { min, max } => min.is_finite() && max.is_finite(),
            SpawnShape::Point {
                position,
                direction,
                spread,
            } => position.is_finite() && direction.is_finite() && spread.is_finite(),
        }
    }
}
