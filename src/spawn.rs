//! Spawn context for agent initialization.
//!
//! Wraps the RNG used for spawning and recycling agents, with helpers for
//! the common sampling patterns (points in volumes, directions, tints).

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Random source plus sampling helpers.
///
/// Seeded from the configuration when a seed is given, otherwise from OS
/// entropy. Output is generative; two unseeded runs differ.
///
/// ```ignore
/// let mut ctx = SpawnContext::new(Some(42), 1.0);
/// let position = ctx.random_in_sphere(0.5);
/// let heading = ctx.random_direction();
/// ```
#[derive(Debug, Clone)]
pub struct SpawnContext {
    /// Simulation bounds (radius of the bounding sphere).
    pub bounds: f32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a spawn context.
    pub fn new(seed: Option<u64>, bounds: f32) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { bounds, rng }
    }

    /// Derive an independent context (different stream, same bounds).
    pub fn fork(&mut self) -> Self {
        Self {
            bounds: self.bounds,
            rng: SmallRng::seed_from_u64(self.rng.gen()),
        }
    }

    /// Access the underlying RNG.
    #[inline]
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Position helpers ==========

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Distribution is uniform throughout the volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        // Cube root for uniform volume distribution
        let r = radius * self.rng.gen::<f32>().cbrt();
        self.random_direction() * r
    }

    /// Random point on the surface of a sphere of given radius.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        self.random_direction() * radius
    }

    /// Random point inside a cube of given half-size, centered at origin.
    pub fn random_in_cube(&mut self, half_size: f32) -> Vec3 {
        Vec3::new(
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
            self.random_range(-half_size, half_size),
        )
    }

    // ========== Direction helpers ==========

    /// Random unit vector, uniform on the unit sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        // Uniform z and azimuth gives an area-uniform distribution
        let z: f32 = self.rng.gen_range(-1.0..=1.0);
        let theta = self.rng.gen_range(0.0..TAU);
        let s = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(s * theta.cos(), s * theta.sin(), z)
    }

    /// Random direction inside a cone of half-angle `spread` around `axis`.
    pub fn random_in_cone(&mut self, axis: Vec3, spread: f32) -> Vec3 {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let spread = spread.clamp(0.0, PI);
        let cos_max = spread.cos();
        let z = self.random_range(cos_max, 1.0);
        let theta = self.rng.gen_range(0.0..TAU);
        let s = (1.0 - z * z).max(0.0).sqrt();
        let local = Vec3::new(s * theta.cos(), s * theta.sin(), z);
        let (b1, b2) = axis.any_orthonormal_pair();
        b1 * local.x + b2 * local.y + axis * local.z
    }

    // ========== Color helpers ==========

    /// Tint `base` toward a random hue by `amount` (0 = unchanged).
    pub fn vary_color(&mut self, base: Vec3, amount: f32) -> Vec3 {
        let hue = self.rng.gen::<f32>();
        base.lerp(hsv_to_rgb(hue, 0.45, 1.0), amount.clamp(0.0, 1.0))
    }
}

/// Convert HSV to RGB.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}
