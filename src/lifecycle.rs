//! Agent lifecycle configuration.
//!
//! Agents never die in the allocation sense. Each one ages, fades, and when
//! `age >= max_age` its slot is recycled in place with a fresh position,
//! personality and lifetime. The population therefore stays at
//! `max_particles` for the simulator's whole life.
//!
//! # Lifecycle Fields
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `age` | `f32` | Time since spawn/recycle (seconds) |
//! | `max_age` | `f32` | Sampled from the lifetime range at spawn |
//! | `energy` | `f32` | Visibility, fades toward [`MIN_ENERGY`] when enabled |
//! | `size` | `f32` | Visual size, follows energy when enabled |
//!
//! # Example
//!
//! ```ignore
//! let lifecycle = Lifecycle::new()
//!     .lifetime_range(8.0..20.0)
//!     .fade_out()
//!     .shrink_out()
//!     .spawn(SpawnShape::Shell { center: Vec3::ZERO, radius: 0.9, inward: true });
//! ```

use crate::emitter::SpawnShape;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Lowest energy an agent can have. Keeps every agent visible.
pub const MIN_ENERGY: f32 = 0.1;

/// Highest energy an agent can have.
pub const MAX_ENERGY: f32 = 1.0;

/// Lifecycle configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifecycle {
    /// Shortest lifetime in seconds.
    pub min_lifetime: f32,
    /// Longest lifetime in seconds.
    pub max_lifetime: f32,
    /// Fade energy toward [`MIN_ENERGY`] as the agent ages.
    pub fade_out: bool,
    /// Scale visual size with energy.
    pub shrink_out: bool,
    /// Base visual size at full energy.
    pub base_size: f32,
    /// How far spawn colors drift from the tag tint (0-1).
    pub color_variation: f32,
    /// Where fresh and recycled agents appear.
    pub spawn: SpawnShape,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            min_lifetime: 12.0,
            max_lifetime: 30.0,
            fade_out: true,
            shrink_out: true,
            base_size: 1.0,
            color_variation: 0.15,
            spawn: SpawnShape::default(),
        }
    }
}

impl Lifecycle {
    /// Create the default lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Give every agent the same lifetime.
    pub fn lifetime(mut self, seconds: f32) -> Self {
        self.min_lifetime = seconds;
        self.max_lifetime = seconds;
        self
    }

    /// Sample each agent's lifetime uniformly from `range`.
    pub fn lifetime_range(mut self, range: Range<f32>) -> Self {
        self.min_lifetime = range.start;
        self.max_lifetime = range.end;
        self
    }

    /// Fade energy as the agent ages.
    pub fn fade_out(mut self) -> Self {
        self.fade_out = true;
        self
    }

    /// Keep energy constant for the agent's whole life.
    pub fn constant_energy(mut self) -> Self {
        self.fade_out = false;
        self
    }

    /// Shrink visual size with energy.
    pub fn shrink_out(mut self) -> Self {
        self.shrink_out = true;
        self
    }

    /// Set the base visual size.
    pub fn base_size(mut self, size: f32) -> Self {
        self.base_size = size;
        self
    }

    /// Set the spawn shape.
    pub fn spawn(mut self, shape: SpawnShape) -> Self {
        self.spawn = shape;
        self
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    /// Energy of an agent spawned with `initial` energy at `age` of `max_age`.
    ///
    /// Always within [`MIN_ENERGY`, `MAX_ENERGY`].
    pub fn energy_at(&self, initial: f32, age: f32, max_age: f32) -> f32 {
        let energy = if self.fade_out && max_age > 0.0 {
            let remaining = 1.0 - (age / max_age).clamp(0.0, 1.0);
            // Ease-out so agents stay bright for most of their life
            initial * (1.0 - (1.0 - remaining).powi(3))
        } else {
            initial
        };
        if energy.is_finite() {
            energy.clamp(MIN_ENERGY, MAX_ENERGY)
        } else {
            MIN_ENERGY
        }
    }

    /// Visual size for an agent with `energy` and `influence`.
    pub fn size_for(&self, energy: f32, influence: f32) -> f32 {
        let influence_scale = 0.75 + 0.5 * influence.clamp(0.0, 1.0);
        if self.shrink_out {
            self.base_size * influence_scale * (0.4 + 0.6 * energy)
        } else {
            self.base_size * influence_scale
        }
    }

    /// Check the lifecycle for values that would break the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_lifetime.is_finite()
            && self.max_lifetime.is_finite()
            && self.min_lifetime > 0.0
            && self.min_lifetime <= self.max_lifetime)
        {
            return Err(ConfigError::InvalidLifetime {
                min: self.min_lifetime,
                max: self.max_lifetime,
            });
        }
        if !(self.base_size.is_finite() && self.base_size > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "lifecycle.base_size",
                value: self.base_size,
            });
        }
        if !self.spawn.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "lifecycle.spawn",
                value: f32::NAN,
            });
        }
        Ok(())
    }
}
