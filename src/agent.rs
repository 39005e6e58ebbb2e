//! Agent state and the fixed-size agent arena.
//!
//! All agents live in one contiguous `Vec<Agent>`. An agent's slot index is
//! its id: the spatial index and the output buffer refer to agents by slot,
//! and recycling reuses the slot in place.

use crate::behavior::BehaviorTag;
use crate::lifecycle::{Lifecycle, MAX_ENERGY};
use crate::spawn::SpawnContext;
use glam::Vec3;

/// One simulated entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Stable id, equal to the slot index.
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Steering applied during the last tick. Reset at the start of each tick.
    pub acceleration: Vec3,
    pub tag: BehaviorTag,
    /// Current energy in [`MIN_ENERGY`](crate::lifecycle::MIN_ENERGY), 1.0.
    pub energy: f32,
    /// Energy the agent was spawned with.
    pub spawn_energy: f32,
    /// Static influence in 0..=1, fixed for the agent's life.
    pub influence: f32,
    /// Seconds since spawn or last recycle.
    pub age: f32,
    /// Age at which the slot is recycled.
    pub max_age: f32,
    /// Visual size.
    pub size: f32,
    /// RGB color.
    pub color: Vec3,
    /// Number of times this slot has been recycled.
    pub generation: u32,
}

impl Agent {
    /// Whether the agent has reached the end of its life.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }

    /// Whether position and velocity are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Owns every agent plus the RNG and lifecycle used to (re)spawn them.
#[derive(Debug, Clone)]
pub struct AgentStore {
    agents: Vec<Agent>,
    lifecycle: Lifecycle,
    ctx: SpawnContext,
    max_speed: f32,
}

impl AgentStore {
    /// Spawn `count` agents.
    pub fn new(count: usize, lifecycle: Lifecycle, ctx: SpawnContext, max_speed: f32) -> Self {
        let mut store = Self {
            agents: Vec::with_capacity(count),
            lifecycle,
            ctx,
            max_speed,
        };
        for id in 0..count {
            let agent = store.spawn(id as u32, 0);
            store.agents.push(agent);
        }
        store
    }

    fn spawn(&mut self, id: u32, generation: u32) -> Agent {
        let (position, heading) = self.lifecycle.spawn.sample(&mut self.ctx);
        let tag = BehaviorTag::sample(self.ctx.rng());
        let speed = self.max_speed * self.ctx.random_range(0.2, 0.6);
        let spawn_energy = self.ctx.random_range(0.6, MAX_ENERGY);
        let influence = self.ctx.random();
        let max_age = self
            .ctx
            .random_range(self.lifecycle.min_lifetime, self.lifecycle.max_lifetime);
        let energy = self.lifecycle.energy_at(spawn_energy, 0.0, max_age);
        let color = self
            .ctx
            .vary_color(tag.profile().color, self.lifecycle.color_variation);

        Agent {
            id,
            position,
            velocity: heading * speed,
            acceleration: Vec3::ZERO,
            tag,
            energy,
            spawn_energy,
            influence,
            age: 0.0,
            max_age,
            size: self.lifecycle.size_for(energy, influence),
            color,
            generation,
        }
    }

    /// Reinitialize slot `index` in place: new position, tag, energy and
    /// lifetime, age reset to zero, generation bumped.
    pub fn recycle(&mut self, index: usize) {
        let Some(old) = self.agents.get(index) else {
            return;
        };
        let (id, generation) = (old.id, old.generation.wrapping_add(1));
        let fresh = self.spawn(id, generation);
        self.agents[index] = fresh;
    }

    /// Age every agent by `dt`, update energy and size, and recycle expired
    /// slots. Returns how many were recycled.
    pub fn advance_lifecycle(&mut self, dt: f32) -> usize {
        let mut recycled = 0;
        for i in 0..self.agents.len() {
            let agent = &mut self.agents[i];
            agent.age += dt;
            if agent.is_expired() {
                self.recycle(i);
                recycled += 1;
                continue;
            }
            agent.energy = self
                .lifecycle
                .energy_at(agent.spawn_energy, agent.age, agent.max_age);
            agent.size = self.lifecycle.size_for(agent.energy, agent.influence);
        }
        recycled
    }

    /// Set an agent's age directly. The next lifecycle pass recycles it if
    /// `age >= max_age`.
    pub fn force_age(&mut self, index: usize, age: f32) {
        if let Some(agent) = self.agents.get_mut(index) {
            agent.age = age;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    #[inline]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Drop every agent and free the arena.
    pub fn release(&mut self) {
        self.agents = Vec::new();
    }
}
