//! Adaptive quality governor.
//!
//! A slow feedback loop that nudges render scale and effect intensity so the
//! host can hold its frame budget. It runs on its own cadence, independent
//! of the tick rate: [`AdaptiveQualityController::observe`] evaluates at most
//! once per `interval_secs` of monotonic time.
//!
//! Above `target * (1 + tolerance)` both multipliers decay; below
//! `target * (1 - tolerance)` they grow. Growth is slower than decay, so the
//! governor backs off quickly and recovers gently. Inside the band nothing
//! changes, so repeated evaluation at a steady population is idempotent.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Inclusive range a multiplier is kept inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let ok = self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidQualityBounds {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Governor settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Minimum seconds between evaluations.
    pub interval_secs: f32,
    /// Population the governor aims for. `None` uses `max_particles`.
    pub target_population: Option<usize>,
    /// Relative half-width of the dead band around the target.
    pub tolerance: f32,
    /// Multiplier applied above the band, in (0, 1).
    pub decay: f32,
    /// Multiplier applied below the band, in (1, 2 - decay).
    pub growth: f32,
    pub render_scale: Bounds,
    pub effect_intensity: Bounds,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1.0,
            target_population: None,
            tolerance: 0.2,
            decay: 0.95,
            growth: 1.02,
            render_scale: Bounds::new(0.5, 1.0),
            effect_intensity: Bounds::new(0.3, 1.0),
        }
    }
}

impl QualityConfig {
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.interval_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval_secs.is_finite() || self.interval_secs < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "quality.interval_secs",
                value: self.interval_secs,
            });
        }
        if !self.tolerance.is_finite() || !(0.0..1.0).contains(&self.tolerance) {
            return Err(ConfigError::NotPositive {
                name: "quality.tolerance",
                value: self.tolerance,
            });
        }

        // growth - 1 < 1 - decay
        let max_growth = 2.0 - self.decay;
        let decay_ok = self.decay > 0.0 && self.decay < 1.0;
        let growth_ok = self.growth > 1.0 && self.growth < max_growth;
        if !(decay_ok && growth_ok) {
            return Err(ConfigError::InvalidQualityGain {
                decay: self.decay,
                growth: self.growth,
                max_growth,
            });
        }

        self.render_scale.validate("render_scale")?;
        self.effect_intensity.validate("effect_intensity")?;
        Ok(())
    }
}

/// Current multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityState {
    pub render_scale: f32,
    pub effect_intensity: f32,
    pub target_population: usize,
}

/// Direction of a quality change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityDirection {
    Decrease,
    Increase,
}

/// A change made by one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityAdjustment {
    pub direction: QualityDirection,
    pub population: usize,
    pub previous: QualityState,
    pub current: QualityState,
}

/// Feedback governor over [`QualityState`].
#[derive(Debug, Clone)]
pub struct AdaptiveQualityController {
    config: QualityConfig,
    state: QualityState,
    last_evaluation: Option<Instant>,
}

impl AdaptiveQualityController {
    /// Start at full quality.
    pub fn new(config: QualityConfig, target_population: usize) -> Self {
        let state = QualityState {
            render_scale: config.render_scale.max,
            effect_intensity: config.effect_intensity.max,
            target_population,
        };
        Self {
            config,
            state,
            last_evaluation: None,
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    pub fn state(&self) -> QualityState {
        self.state
    }

    /// Evaluate if at least one interval has passed since the last
    /// evaluation. The first call always evaluates.
    pub fn observe(&mut self, population: usize, now: Instant) -> Option<QualityAdjustment> {
        if let Some(last) = self.last_evaluation {
            if now.saturating_duration_since(last) < self.config.interval() {
                return None;
            }
        }
        self.last_evaluation = Some(now);
        self.evaluate(population)
    }

    /// Run one evaluation regardless of cadence.
    pub fn evaluate(&mut self, population: usize) -> Option<QualityAdjustment> {
        let target = self.state.target_population as f32;
        let population_f = population as f32;

        let (direction, gain) = if population_f > target * (1.0 + self.config.tolerance) {
            (QualityDirection::Decrease, self.config.decay)
        } else if population_f < target * (1.0 - self.config.tolerance) {
            (QualityDirection::Increase, self.config.growth)
        } else {
            return None;
        };

        let previous = self.state;
        self.state.render_scale = self.config.render_scale.clamp(previous.render_scale * gain);
        self.state.effect_intensity = self
            .config
            .effect_intensity
            .clamp(previous.effect_intensity * gain);

        if self.state == previous {
            // pinned at a bound
            return None;
        }
        Some(QualityAdjustment {
            direction,
            population,
            previous,
            current: self.state,
        })
    }
}
