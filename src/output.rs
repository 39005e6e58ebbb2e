//! Per-tick output buffer.
//!
//! After every tick the agent arena is flattened into a gap-free array of
//! [`AgentRecord`]s, indexed from 0 and exactly `max_particles` long. The
//! layout is `#[repr(C)]` and all-`f32`, so a renderer can upload it as a
//! vertex or storage buffer without conversion:
//!
//! ```ignore
//! queue.write_buffer(&particle_buffer, 0, sim.output().as_bytes());
//! ```
//!
//! Record layout (48 bytes):
//!
//! | offset | field      | type       |
//! |--------|------------|------------|
//! | 0      | `position` | `[f32; 3]` |
//! | 12     | `size`     | `f32`      |
//! | 16     | `velocity` | `[f32; 3]` |
//! | 28     | `energy`   | `f32`      |
//! | 32     | `color`    | `[f32; 3]` |
//! | 44     | `tag`      | `f32`      |

use crate::agent::Agent;
use crate::error::ConsumerError;
use bytemuck::{Pod, Zeroable};

/// Flattened agent state for rendering.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AgentRecord {
    pub position: [f32; 3],
    pub size: f32,
    pub velocity: [f32; 3],
    pub energy: f32,
    pub color: [f32; 3],
    /// [`BehaviorTag`](crate::BehaviorTag) index as a float.
    pub tag: f32,
}

impl AgentRecord {
    /// Size of one record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Number of `f32`s per record.
    pub const FLOATS: usize = Self::SIZE / std::mem::size_of::<f32>();
}

impl From<&Agent> for AgentRecord {
    fn from(agent: &Agent) -> Self {
        Self {
            position: agent.position.to_array(),
            size: agent.size,
            velocity: agent.velocity.to_array(),
            energy: agent.energy,
            color: agent.color.to_array(),
            tag: agent.tag.as_f32(),
        }
    }
}

/// Reused record buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    records: Vec<AgentRecord>,
}

impl OutputBuffer {
    /// A buffer preallocated for `capacity` agents.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Overwrite the buffer with the current agent state.
    pub fn flush(&mut self, agents: &[Agent]) {
        self.records.clear();
        self.records.extend(agents.iter().map(AgentRecord::from));
    }

    #[inline]
    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Free the backing allocation.
    pub fn release(&mut self) {
        self.records = Vec::new();
    }
}

/// Receives the output buffer after every tick.
///
/// A consumer that returns `Err` is detached by the simulator and never
/// called again; the simulation keeps running.
pub trait FrameConsumer {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Handle one frame.
    fn consume(&mut self, records: &[AgentRecord]) -> Result<(), ConsumerError>;
}
