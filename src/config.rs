//! Swarm configuration.
//!
//! [`SwarmConfig`] is the construction contract for
//! [`SwarmSimulator`](crate::SwarmSimulator). Every field has a default, so a
//! host only sets what it cares about, either through the `with_*` builder
//! methods or by loading JSON:
//!
//! ```ignore
//! let config = SwarmConfig::from_json(r#"{ "max_particles": 1500, "max_speed": 0.3 }"#)?;
//! let sim = SwarmSimulator::new(config)?;
//! ```
//!
//! [`SwarmConfig::validate`] runs at construction; a bad combination fails
//! there instead of degrading the simulation later.

use crate::error::ConfigError;
use crate::lifecycle::Lifecycle;
use crate::quality::QualityConfig;
use serde::{Deserialize, Serialize};

/// Global multipliers for each steering contribution.
///
/// These are combined with the per-tag [`TagProfile`](crate::TagProfile)
/// weights: `effective = global * tag`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub wander: f32,
    /// Pointer attraction/repulsion.
    pub pointer: f32,
    /// Soft inward steering near the boundary.
    pub containment: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            separation: 1.5,
            alignment: 1.0,
            cohesion: 1.0,
            wander: 1.0,
            pointer: 1.0,
            containment: 1.0,
        }
    }
}

impl RuleWeights {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("separation", self.separation),
            ("alignment", self.alignment),
            ("cohesion", self.cohesion),
            ("wander", self.wander),
            ("pointer", self.pointer),
            ("containment", self.containment),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Full simulator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Fixed population size.
    pub max_particles: usize,
    /// Radius inside which neighbors push each other apart.
    pub separation_distance: f32,
    /// Radius inside which neighbors match velocity.
    pub alignment_distance: f32,
    /// Radius inside which neighbors pull toward their centroid.
    pub cohesion_distance: f32,
    /// Speed cap (units per second).
    pub max_speed: f32,
    /// Cap on every steering contribution and on the summed acceleration.
    pub max_force: f32,
    /// Global rule weights.
    pub weights: RuleWeights,
    /// Spatial grid cell size. Must be at least the largest behavior radius.
    pub cell_size: f32,
    /// Radius of the bounding sphere agents are kept inside.
    pub bounds: f32,
    /// Fraction of `bounds` where soft inward steering starts.
    pub soft_boundary: f32,
    /// Fraction of outward radial speed kept when an agent hits the boundary.
    pub boundary_damping: f32,
    /// Largest delta time a single tick will integrate (seconds).
    pub max_delta: f32,
    /// Aging, fading and respawn placement.
    pub lifecycle: Lifecycle,
    /// Adaptive quality governor settings.
    pub quality: QualityConfig,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            separation_distance: 0.05,
            alignment_distance: 0.1,
            cohesion_distance: 0.12,
            max_speed: 0.2,
            max_force: 0.06,
            weights: RuleWeights::default(),
            cell_size: 0.12,
            bounds: 1.0,
            soft_boundary: 0.85,
            boundary_damping: 0.5,
            max_delta: 1.0 / 15.0,
            lifecycle: Lifecycle::default(),
            quality: QualityConfig::default(),
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SwarmConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Set the population size.
    pub fn with_max_particles(mut self, count: usize) -> Self {
        self.max_particles = count;
        self
    }

    /// Set the three behavior radii at once.
    pub fn with_radii(mut self, separation: f32, alignment: f32, cohesion: f32) -> Self {
        self.separation_distance = separation;
        self.alignment_distance = alignment;
        self.cohesion_distance = cohesion;
        self
    }

    /// Set speed and force caps.
    pub fn with_limits(mut self, max_speed: f32, max_force: f32) -> Self {
        self.max_speed = max_speed;
        self.max_force = max_force;
        self
    }

    /// Set the global rule weights.
    pub fn with_weights(mut self, weights: RuleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the spatial grid cell size.
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the bounding sphere radius.
    pub fn with_bounds(mut self, bounds: f32) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the delta-time clamp.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Set the lifecycle.
    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Set the quality governor configuration.
    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    /// Seed the RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Largest of the three behavior radii. Neighbor queries use this.
    pub fn max_radius(&self) -> f32 {
        self.separation_distance
            .max(self.alignment_distance)
            .max(self.cohesion_distance)
    }

    /// Population target for the quality governor.
    pub fn target_population(&self) -> usize {
        self.quality.target_population.unwrap_or(self.max_particles)
    }

    /// Check every option. Called by the simulator constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_particles == 0 {
            return Err(ConfigError::NoParticles);
        }

        let positive = [
            ("separation_distance", self.separation_distance),
            ("alignment_distance", self.alignment_distance),
            ("cohesion_distance", self.cohesion_distance),
            ("max_speed", self.max_speed),
            ("max_force", self.max_force),
            ("cell_size", self.cell_size),
            ("bounds", self.bounds),
            ("soft_boundary", self.soft_boundary),
            ("max_delta", self.max_delta),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.boundary_damping) {
            return Err(ConfigError::NotPositive {
                name: "boundary_damping",
                value: self.boundary_damping,
            });
        }

        self.weights.validate()?;

        let radius = self.max_radius();
        if self.cell_size < radius {
            return Err(ConfigError::CellTooSmall {
                cell_size: self.cell_size,
                radius,
            });
        }

        self.lifecycle.validate()?;
        let reach = self.lifecycle.spawn.reach();
        if reach > self.bounds {
            return Err(ConfigError::SpawnOutsideBounds {
                reach,
                bounds: self.bounds,
            });
        }
        self.quality.validate()?;
        Ok(())
    }
}
