//! Ambient scene: swarm, coherence field and activation network on one
//! clock.
//!
//! The three simulations do not exchange state. The scene only makes sure
//! they advance by the same clamped delta each frame, so a host that wants
//! all of them drives a single object:
//!
//! ```ignore
//! let mut scene = AmbientScene::new(
//!     SwarmConfig::default(),
//!     FieldConfig::new(256),
//!     ActivationNetwork::ring(12)?,
//! )?;
//! loop {
//!     let stats = scene.frame(pointer.as_ref());
//!     renderer.upload(scene.swarm().output().as_bytes(), scene.field().as_floats());
//! }
//! ```

use crate::config::SwarmConfig;
use crate::error::ConfigError;
use crate::field::{CoherenceField, FieldConfig};
use crate::input::PointerInput;
use crate::network::ActivationNetwork;
use crate::simulation::{SwarmSimulator, TickStats};
use crate::time::{clamp_delta, FrameClock};

/// Swarm, field and network sharing a [`FrameClock`].
#[derive(Debug)]
pub struct AmbientScene {
    swarm: SwarmSimulator,
    field: CoherenceField,
    network: ActivationNetwork,
    clock: FrameClock,
}

impl AmbientScene {
    /// Build the swarm and field. The field draws its seed from the swarm
    /// seed so a seeded scene is fully seeded.
    pub fn new(
        swarm: SwarmConfig,
        field: FieldConfig,
        network: ActivationNetwork,
    ) -> Result<Self, ConfigError> {
        let clock = FrameClock::new(swarm.max_delta);
        let field_seed = swarm.seed.map(|s| s.wrapping_add(1));
        Ok(Self {
            swarm: SwarmSimulator::new(swarm)?,
            field: CoherenceField::new(field, field_seed)?,
            network,
            clock,
        })
    }

    /// Read the clock and advance everything by the elapsed time.
    pub fn frame(&mut self, pointer: Option<&PointerInput>) -> TickStats {
        let dt = self.clock.update();
        self.advance(dt, pointer)
    }

    /// Advance everything by `dt` (clamped to the swarm's `max_delta`),
    /// bypassing the clock.
    pub fn advance(&mut self, dt: f32, pointer: Option<&PointerInput>) -> TickStats {
        let dt = clamp_delta(dt, self.swarm.config().max_delta);
        let stats = self.swarm.tick_with(dt, pointer);
        self.field.step(dt);
        self.network.step();
        stats
    }

    pub fn swarm(&self) -> &SwarmSimulator {
        &self.swarm
    }

    pub fn swarm_mut(&mut self) -> &mut SwarmSimulator {
        &mut self.swarm
    }

    pub fn field(&self) -> &CoherenceField {
        &self.field
    }

    pub fn network(&self) -> &ActivationNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut ActivationNetwork {
        &mut self.network
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Dispose the swarm and field. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.swarm.dispose();
        self.field.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> AmbientScene {
        AmbientScene::new(
            SwarmConfig::new().with_max_particles(32).with_seed(4),
            FieldConfig::new(16),
            ActivationNetwork::ring(4).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_advance_steps_everything_once() {
        let mut scene = scene();
        let stats = scene.advance(1.0 / 60.0, None);
        assert_eq!(stats.tick, 1);
        assert_eq!(scene.swarm().tick_count(), 1);
        assert_eq!(scene.field().steps(), 1);
        assert_eq!(scene.network().steps(), 1);
    }

    #[test]
    fn test_advance_shares_clamped_delta() {
        let mut scene = scene();
        let stats = scene.advance(5.0, None);
        assert_eq!(stats.dt, scene.swarm().config().max_delta);
    }

    #[test]
    fn test_frame_uses_fixed_clock() {
        let mut scene = scene();
        scene.clock_mut().set_fixed_delta(Some(1.0 / 30.0));
        let stats = scene.frame(None);
        assert!((stats.dt - 1.0 / 30.0).abs() < 1e-6);
        assert_eq!(scene.clock().frame(), 1);
    }

    #[test]
    fn test_invalid_swarm_config_rejected() {
        let result = AmbientScene::new(
            SwarmConfig::new().with_max_particles(0),
            FieldConfig::new(16),
            ActivationNetwork::ring(2).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dispose() {
        let mut scene = scene();
        scene.dispose();
        scene.dispose();
        assert!(scene.swarm().is_disposed());
        assert!(scene.field().is_disposed());
    }
}
