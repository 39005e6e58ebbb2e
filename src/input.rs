//! Host pointer input.
//!
//! The host may pass a pointer with each tick. Agents within its radius are
//! pulled toward it ([`PointerMode::Attract`]) or pushed away
//! ([`PointerMode::Repel`]), with a linear falloff to zero at the edge.
//!
//! ```ignore
//! // Cursor in normalized device coordinates, mapped onto the z = 0 plane
//! let pointer = PointerInput::from_ndc(Vec2::new(0.2, -0.4), config.bounds).repel();
//! sim.tick_with(dt, Some(&pointer));
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Whether the pointer pulls or pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerMode {
    #[default]
    Attract,
    Repel,
}

impl PointerMode {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            PointerMode::Attract => 1.0,
            PointerMode::Repel => -1.0,
        }
    }
}

/// A pointer position affecting nearby agents for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// World-space position.
    pub position: Vec3,
    /// Attract or repel.
    pub mode: PointerMode,
    /// Effect radius; no force at or beyond it.
    pub radius: f32,
    /// Force at the center, as a multiple of `max_force`.
    pub strength: f32,
}

impl PointerInput {
    /// An attracting pointer at a 3D position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            mode: PointerMode::Attract,
            radius: 0.3,
            strength: 1.0,
        }
    }

    /// A pointer on the z = 0 plane.
    pub fn from_2d(position: Vec2) -> Self {
        Self::new(position.extend(0.0))
    }

    /// A pointer given in normalized device coordinates (-1..1), scaled to
    /// the simulation bounds on the z = 0 plane.
    pub fn from_ndc(ndc: Vec2, bounds: f32) -> Self {
        Self::from_2d(ndc.clamp(Vec2::splat(-1.0), Vec2::ONE) * bounds)
    }

    /// Switch to repelling.
    pub fn repel(mut self) -> Self {
        self.mode = PointerMode::Repel;
        self
    }

    /// Set the effect radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the center strength.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Steering force on an agent at `position`, capped to `max_force`.
    ///
    /// Zero outside the radius, at the exact pointer position, or when any
    /// input is not finite.
    pub fn force_at(&self, position: Vec3, max_force: f32) -> Vec3 {
        if !(self.position.is_finite() && self.radius.is_finite() && self.strength.is_finite()) {
            return Vec3::ZERO;
        }
        let offset = self.position - position;
        let dist = offset.length();
        if dist >= self.radius || dist <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let falloff = 1.0 - dist / self.radius;
        let force = offset / dist * self.mode.sign() * self.strength * falloff * max_force;
        force.clamp_length_max(max_force)
    }
}
