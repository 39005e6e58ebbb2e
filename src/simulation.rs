//! Swarm simulator.
//!
//! [`SwarmSimulator`] owns the agent arena, the spatial index, every per-tick
//! scratch buffer and the quality governor. One call to
//! [`tick`](SwarmSimulator::tick) runs the whole pipeline:
//!
//! 1. clamp `dt` to `[0, max_delta]`
//! 2. snapshot positions and velocities, rebuild the spatial index
//! 3. per agent: gather neighbors from the snapshot, evaluate the steering
//!    rules, integrate, enforce the bounding sphere
//! 4. age agents and recycle expired slots in place
//! 5. flush the output buffer and hand it to attached consumers
//! 6. let the quality governor observe on its own cadence
//!
//! Neighbor reads come from the snapshot, so an agent never sees a neighbor
//! that has already moved this tick and the result does not depend on
//! iteration order.
//!
//! Buffers are sized at construction and reused; a steady-state tick does
//! not allocate.

use crate::agent::{Agent, AgentStore};
use crate::config::SwarmConfig;
use crate::error::ConfigError;
use crate::input::PointerInput;
use crate::output::{FrameConsumer, OutputBuffer};
use crate::quality::{AdaptiveQualityController, QualityState};
use crate::rules::{self, limit, Neighbor, SteeringParams};
use crate::spatial::{SpatialConfig, SpatialIndex, MAX_GRID_RESOLUTION};
use crate::spawn::SpawnContext;
use crate::time::clamp_delta;
use glam::Vec3;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Tick number, starting at 1. Zero for a tick after dispose.
    pub tick: u64,
    /// Delta actually integrated, after clamping.
    pub dt: f32,
    /// Slots recycled this tick.
    pub recycled: usize,
    /// Rule contributions or integration results discarded as non-finite.
    pub numeric_faults: u32,
    /// Total neighbors within the largest behavior radius, over all agents.
    pub neighbors_seen: usize,
}

/// Fixed-population swarm.
pub struct SwarmSimulator {
    config: SwarmConfig,
    params: SteeringParams,
    store: AgentStore,
    index: SpatialIndex,
    /// Previous-tick positions, indexed by slot.
    positions: Vec<Vec3>,
    /// Previous-tick velocities, indexed by slot.
    velocities: Vec<Vec3>,
    candidates: Vec<u32>,
    neighbors: Vec<Neighbor>,
    /// Wander jitter source, separate from the spawn RNG.
    jitter: SpawnContext,
    output: OutputBuffer,
    consumers: Vec<Box<dyn FrameConsumer>>,
    quality: AdaptiveQualityController,
    tick: u64,
    disposed: bool,
}

impl SwarmSimulator {
    /// Validate `config` and spawn `max_particles` agents.
    pub fn new(config: SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.max_particles;
        let mut ctx = SpawnContext::new(config.seed, config.bounds);
        let jitter = ctx.fork();
        let store = AgentStore::new(count, config.lifecycle.clone(), ctx, config.max_speed);

        // Widen cells when the grid would exceed its resolution cap.
        let cell_size = config
            .cell_size
            .max(2.0 * config.bounds / MAX_GRID_RESOLUTION as f32);
        let index = SpatialIndex::with_capacity(SpatialConfig::for_extent(cell_size, config.bounds), count);

        let quality = AdaptiveQualityController::new(config.quality.clone(), config.target_population());

        let mut sim = Self {
            params: SteeringParams::from(&config),
            store,
            index,
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            candidates: Vec::with_capacity(64),
            neighbors: Vec::with_capacity(64),
            jitter,
            output: OutputBuffer::with_capacity(count),
            consumers: Vec::new(),
            quality,
            tick: 0,
            disposed: false,
            config,
        };
        sim.output.flush(sim.store.agents());

        debug!(
            agents = count,
            cell_size,
            grid = sim.index.config().grid_resolution,
            seeded = sim.config.seed.is_some(),
            "swarm simulator created"
        );
        Ok(sim)
    }

    /// Advance one tick without pointer input.
    pub fn tick(&mut self, dt: f32) -> TickStats {
        self.tick_with(dt, None)
    }

    /// Advance one tick. `dt` is clamped to `[0, max_delta]`; a non-finite
    /// `dt` integrates nothing but still ages by zero and flushes output.
    pub fn tick_with(&mut self, dt: f32, pointer: Option<&PointerInput>) -> TickStats {
        if self.disposed {
            return TickStats::default();
        }
        let dt = clamp_delta(dt, self.config.max_delta);
        self.tick += 1;

        self.positions.clear();
        self.velocities.clear();
        for agent in self.store.agents() {
            self.positions.push(agent.position);
            self.velocities.push(agent.velocity);
        }
        self.index.rebuild(self.positions.iter().copied());

        let radius = self.config.max_radius();
        let bounds = self.config.bounds;
        let damping = self.config.boundary_damping;
        let mut faults = 0;
        let mut neighbors_seen = 0;

        let agents = self.store.agents_mut();
        for (i, agent) in agents.iter_mut().enumerate() {
            let origin = self.positions[i];
            self.index.query_into(origin, radius, &mut self.candidates);

            self.neighbors.clear();
            for &j in &self.candidates {
                let j = j as usize;
                if j == i {
                    continue;
                }
                let n = Neighbor::new(origin, self.positions[j], self.velocities[j]);
                if n.distance <= radius {
                    self.neighbors.push(n);
                }
            }
            neighbors_seen += self.neighbors.len();

            let jitter = self.jitter.random_direction();
            let steering = rules::steer(
                agent,
                &self.neighbors,
                jitter,
                pointer,
                &self.config.weights,
                &self.params,
            );
            faults += steering.faults;
            agent.acceleration = steering.acceleration;

            if !integrate(agent, dt, &self.params, bounds, damping) {
                faults += 1;
            }
        }

        let recycled = self.store.advance_lifecycle(dt);

        self.output.flush(self.store.agents());
        self.notify_consumers();

        if let Some(change) = self.quality.observe(self.store.len(), Instant::now()) {
            info!(
                direction = ?change.direction,
                population = change.population,
                render_scale = change.current.render_scale,
                effect_intensity = change.current.effect_intensity,
                "quality adjusted"
            );
        }

        trace!(tick = self.tick, dt, recycled, faults, neighbors_seen, "tick");

        TickStats {
            tick: self.tick,
            dt,
            recycled,
            numeric_faults: faults,
            neighbors_seen,
        }
    }

    fn notify_consumers(&mut self) {
        if self.consumers.is_empty() {
            return;
        }
        let records = self.output.records();
        self.consumers.retain_mut(|consumer| match consumer.consume(records) {
            Ok(()) => true,
            Err(err) => {
                warn!(consumer = consumer.name(), error = %err, "detaching frame consumer");
                false
            }
        });
    }

    /// Receive the output buffer after every tick until the consumer fails.
    pub fn attach_consumer(&mut self, consumer: Box<dyn FrameConsumer>) {
        debug!(consumer = consumer.name(), "frame consumer attached");
        self.consumers.push(consumer);
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    /// Set an agent's age. The next tick recycles it if `age >= max_age`.
    pub fn force_age(&mut self, index: usize, age: f32) {
        self.store.force_age(index, age);
    }

    pub fn agents(&self) -> &[Agent] {
        self.store.agents()
    }

    pub fn population(&self) -> usize {
        self.store.len()
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn quality(&self) -> QualityState {
        self.quality.state()
    }

    pub fn quality_controller(&self) -> &AdaptiveQualityController {
        &self.quality
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Release every buffer and detach all consumers. Later ticks do
    /// nothing. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.store.release();
        self.index.release();
        self.positions = Vec::new();
        self.velocities = Vec::new();
        self.candidates = Vec::new();
        self.neighbors = Vec::new();
        self.output.release();
        self.consumers.clear();
        self.disposed = true;
        debug!(ticks = self.tick, "swarm simulator disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl std::fmt::Debug for SwarmSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmSimulator")
            .field("agents", &self.store.len())
            .field("tick", &self.tick)
            .field("consumers", &self.consumers.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Semi-implicit Euler step plus hard containment. Returns `false` when the
/// step produced a non-finite state and was rolled back.
fn integrate(agent: &mut Agent, dt: f32, params: &SteeringParams, bounds: f32, damping: f32) -> bool {
    let mut velocity = limit(agent.velocity + agent.acceleration * dt, params.max_speed);
    let mut position = agent.position + velocity * dt;

    let finite = velocity.is_finite() && position.is_finite();
    if !finite {
        velocity = Vec3::ZERO;
        position = agent.position;
    }

    let r = position.length();
    if r > bounds {
        let normal = position / r;
        position = normal * bounds;
        let outward = velocity.dot(normal);
        if outward > 0.0 {
            velocity -= normal * outward * (1.0 + damping);
        }
    }

    agent.position = position;
    agent.velocity = velocity;
    finite
}
