//! Auxiliary coherence field.
//!
//! A fixed-size array of complex samples that drifts under three effects
//! each step:
//!
//! - **Decay**: every sample is multiplied by `coherence` (< 1)
//! - **Rotation**: every sample turns by its own phase angle, scaled by `dt`
//! - **Noise**: each component receives an independent uniform kick in
//!   `[-noise, noise]`
//!
//! Rotation preserves magnitude and decay is geometric, so the magnitude of
//! any sample stays below `|z0| + noise * sqrt(2) / (1 - coherence)` no matter
//! how long the field runs.
//!
//! The field shares nothing with the swarm except the frame clock; hosts
//! read it through [`CoherenceField::samples`] or the flat
//! [`CoherenceField::as_floats`] view, e.g. to drive a shader uniform.
//!
//! ```ignore
//! let mut field = CoherenceField::new(FieldConfig::new(256).with_noise(0.02), Some(7))?;
//! field.step(dt);
//! queue.write_buffer(&buffer, 0, bytemuck::cast_slice(field.samples()));
//! ```

use crate::error::ConfigError;
use crate::spawn::SpawnContext;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::f32::consts::SQRT_2;

/// Configuration for a [`CoherenceField`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of complex samples.
    pub samples: usize,
    /// Per-step decay multiplier in [0, 1).
    pub coherence: f32,
    /// Half-width of the uniform per-component noise.
    pub noise: f32,
    /// Base angular speed in radians per second. Each sample turns at
    /// between 0.5x and 1.5x this rate.
    pub phase_speed: f32,
}

impl FieldConfig {
    /// A field with `samples` samples and default dynamics.
    ///
    /// Default values:
    /// - `coherence`: 0.98
    /// - `noise`: 0.01
    /// - `phase_speed`: 0.5
    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            coherence: 0.98,
            noise: 0.01,
            phase_speed: 0.5,
        }
    }

    /// Set the decay multiplier.
    pub fn with_coherence(mut self, coherence: f32) -> Self {
        self.coherence = coherence;
        self
    }

    /// Set the noise amplitude.
    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    /// Set the base phase speed.
    pub fn with_phase_speed(mut self, phase_speed: f32) -> Self {
        self.phase_speed = phase_speed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::NotPositive {
                name: "field.samples",
                value: 0.0,
            });
        }
        if !self.coherence.is_finite() || !(0.0..1.0).contains(&self.coherence) {
            return Err(ConfigError::NotPositive {
                name: "field.coherence",
                value: self.coherence,
            });
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "field.noise",
                value: self.noise,
            });
        }
        if !self.phase_speed.is_finite() {
            return Err(ConfigError::NotPositive {
                name: "field.phase_speed",
                value: self.phase_speed,
            });
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// One complex sample, laid out as two `f32`s.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct FieldSample {
    pub re: f32,
    pub im: f32,
}

impl FieldSample {
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.re.hypot(self.im)
    }

    #[inline]
    fn rotate(self, cos: f32, sin: f32) -> Self {
        Self {
            re: self.re * cos - self.im * sin,
            im: self.re * sin + self.im * cos,
        }
    }
}

/// Decaying stochastic complex field.
#[derive(Debug, Clone)]
pub struct CoherenceField {
    config: FieldConfig,
    samples: Vec<FieldSample>,
    /// Angular speed multiplier per sample.
    rates: Vec<f32>,
    initial_magnitude: f32,
    ctx: SpawnContext,
    steps: u64,
    disposed: bool,
}

impl CoherenceField {
    /// Create a field with samples seeded inside the noise amplitude.
    pub fn new(config: FieldConfig, seed: Option<u64>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut ctx = SpawnContext::new(seed, 1.0);

        let samples: Vec<FieldSample> = (0..config.samples)
            .map(|_| FieldSample {
                re: ctx.random_range(-config.noise, config.noise),
                im: ctx.random_range(-config.noise, config.noise),
            })
            .collect();
        let rates = (0..config.samples)
            .map(|_| ctx.random_range(0.5, 1.5))
            .collect();
        let initial_magnitude = samples
            .iter()
            .map(FieldSample::magnitude)
            .fold(0.0, f32::max);

        tracing::debug!(samples = config.samples, coherence = config.coherence, "coherence field created");

        Ok(Self {
            config,
            samples,
            rates,
            initial_magnitude,
            ctx,
            steps: 0,
            disposed: false,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Advance the field by `dt` seconds. No-op after [`dispose`](Self::dispose)
    /// or for a non-finite `dt`.
    pub fn step(&mut self, dt: f32) {
        if self.disposed || !dt.is_finite() {
            return;
        }
        let c = self.config.coherence;
        let noise = self.config.noise;
        let base_angle = self.config.phase_speed * dt;

        for (sample, rate) in self.samples.iter_mut().zip(&self.rates) {
            let (sin, cos) = (base_angle * rate).sin_cos();
            let mut next = FieldSample {
                re: sample.re * c,
                im: sample.im * c,
            }
            .rotate(cos, sin);
            next.re += self.ctx.random_range(-noise, noise);
            next.im += self.ctx.random_range(-noise, noise);
            *sample = next;
        }
        self.steps += 1;
    }

    #[inline]
    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    /// Interleaved `re, im` pairs.
    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.samples)
    }

    /// Upper bound on any sample's magnitude for the lifetime of the field.
    pub fn magnitude_bound(&self) -> f32 {
        self.initial_magnitude + self.config.noise * SQRT_2 / (1.0 - self.config.coherence)
    }

    /// Mean sample magnitude; 0 for an empty (disposed) field.
    pub fn mean_magnitude(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(FieldSample::magnitude).sum::<f32>() / self.samples.len() as f32
    }

    /// Number of steps taken.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Free the sample buffers. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.samples = Vec::new();
        self.rates = Vec::new();
        self.disposed = true;
        tracing::debug!(steps = self.steps, "coherence field disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        assert!(CoherenceField::new(FieldConfig::new(0), None).is_err());
        assert!(CoherenceField::new(FieldConfig::new(8).with_coherence(1.0), None).is_err());
        assert!(CoherenceField::new(FieldConfig::new(8).with_noise(-0.1), None).is_err());
    }

    #[test]
    fn test_magnitude_stays_bounded() {
        let config = FieldConfig::new(128).with_coherence(0.9).with_noise(0.05).with_phase_speed(3.0);
        let mut field = CoherenceField::new(config, Some(5)).unwrap();
        let bound = field.magnitude_bound();
        for _ in 0..5_000 {
            field.step(1.0 / 60.0);
            for sample in field.samples() {
                assert!(sample.re.is_finite() && sample.im.is_finite());
                assert!(sample.magnitude() <= bound + 1e-5);
            }
        }
    }

    #[test]
    fn test_rotation_preserves_magnitude_without_noise() {
        let config = FieldConfig::new(4).with_coherence(0.5).with_noise(0.0);
        let mut field = CoherenceField::new(config, Some(1)).unwrap();
        field.samples[0] = FieldSample { re: 1.0, im: 0.0 };
        field.step(0.25);
        assert!((field.samples()[0].magnitude() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_float_view_is_interleaved() {
        let field = CoherenceField::new(FieldConfig::new(16), Some(2)).unwrap();
        let floats = field.as_floats();
        assert_eq!(floats.len(), 32);
        assert_eq!(floats[2], field.samples()[1].re);
        assert_eq!(floats[3], field.samples()[1].im);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut field = CoherenceField::new(FieldConfig::new(16), Some(3)).unwrap();
        field.dispose();
        field.dispose();
        assert!(field.is_disposed());
        assert!(field.samples().is_empty());
        field.step(0.1);
        assert_eq!(field.steps(), 0);
        assert_eq!(field.mean_magnitude(), 0.0);
    }
}
