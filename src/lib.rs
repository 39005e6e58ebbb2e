//! # bioswarm - ambient swarm simulation core
//!
//! A CPU particle swarm for ambient background visuals: thousands of agents
//! flocking inside a bounding sphere, each with a behavior personality, a
//! finite life and a fading energy. The crate produces a flat, GPU-ready
//! buffer every tick; drawing it is up to the host.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bioswarm::prelude::*;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SwarmConfig::new()
//!         .with_max_particles(1500)
//!         .with_limits(0.2, 0.06)
//!         .with_lifecycle(Lifecycle::new().lifetime_range(8.0..20.0));
//!
//!     let mut sim = SwarmSimulator::new(config)?;
//!     loop {
//!         let stats = sim.tick(1.0 / 60.0);
//!         queue.write_buffer(&particles, 0, sim.output().as_bytes());
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Agents
//!
//! The population is fixed at construction. Agents live in one contiguous
//! arena and are addressed by slot index; when an agent's age passes its
//! lifetime the slot is respawned in place with a new position, personality
//! and lifetime. Hosts that care about slot reuse watch
//! [`Agent::generation`].
//!
//! ### Steering
//!
//! Each tick every agent sums six contributions, each capped to `max_force`:
//!
//! | Contribution | Source |
//! |--------------|--------|
//! | Separation, alignment, cohesion | neighbors from the [`SpatialIndex`] |
//! | Wander | random jitter scaled by personality |
//! | Pointer | optional [`PointerInput`] from the host |
//! | Containment | soft inward push near the boundary |
//!
//! Global [`RuleWeights`] are multiplied by the agent's [`TagProfile`], so a
//! [`BehaviorTag::Follower`] flocks tightly while a [`BehaviorTag::Maverick`]
//! mostly wanders.
//!
//! ### Spatial Hashing
//!
//! Neighbor queries go through a uniform grid keyed by Morton code and
//! rebuilt every tick with a radix sort. `cell_size` must be at least the
//! largest behavior radius; [`SwarmConfig::validate`] rejects anything else.
//!
//! ### Auxiliary Simulations
//!
//! [`CoherenceField`] and [`ActivationNetwork`] are independent of the swarm.
//! [`AmbientScene`] runs all three off one [`FrameClock`].
//!
//! ## Errors and Logging
//!
//! Only construction fails. Numerical trouble inside a tick is repaired in
//! place and counted in [`TickStats::numeric_faults`]. Diagnostics go through
//! `tracing`; install a subscriber to see them.

pub mod agent;
pub mod behavior;
pub mod config;
mod emitter;
pub mod error;
pub mod field;
pub mod input;
pub mod lifecycle;
pub mod network;
pub mod output;
pub mod quality;
pub mod rules;
mod scene;
mod simulation;
mod spawn;
pub mod spatial;
pub mod time;

pub use bytemuck;
pub use glam::{Vec2, Vec3};

pub use agent::{Agent, AgentStore};
pub use behavior::{BehaviorTag, TagProfile};
pub use config::{RuleWeights, SwarmConfig};
pub use emitter::SpawnShape;
pub use error::{ConfigError, ConsumerError, NetworkError};
pub use field::{CoherenceField, FieldConfig, FieldSample};
pub use input::{PointerInput, PointerMode};
pub use lifecycle::Lifecycle;
pub use network::{ActivationNetwork, NetworkBuilder};
pub use output::{AgentRecord, FrameConsumer, OutputBuffer};
pub use quality::{AdaptiveQualityController, Bounds, QualityAdjustment, QualityConfig, QualityState};
pub use scene::AmbientScene;
pub use simulation::{SwarmSimulator, TickStats};
pub use spatial::{SpatialConfig, SpatialIndex};
pub use spawn::SpawnContext;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use bioswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::behavior::BehaviorTag;
    pub use crate::config::{RuleWeights, SwarmConfig};
    pub use crate::emitter::SpawnShape;
    pub use crate::error::{ConfigError, ConsumerError};
    pub use crate::field::{CoherenceField, FieldConfig};
    pub use crate::input::{PointerInput, PointerMode};
    pub use crate::lifecycle::Lifecycle;
    pub use crate::network::{ActivationNetwork, NetworkBuilder};
    pub use crate::output::{AgentRecord, FrameConsumer};
    pub use crate::quality::QualityConfig;
    pub use crate::scene::AmbientScene;
    pub use crate::simulation::{SwarmSimulator, TickStats};
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3};
}
