//! Steering rules.
//!
//! Every rule is a pure function from an agent and its neighbors to a
//! steering vector whose magnitude never exceeds `max_force`.
//!
//! # Rule Categories
//!
//! - **Flocking** (neighbor): [`separation`], [`alignment`], [`cohesion`]
//! - **Movement**: [`wander`]
//! - **Environment**: [`containment`], pointer force via
//!   [`PointerInput::force_at`](crate::input::PointerInput::force_at)
//!
//! [`steer`] evaluates all of them for one agent, weights them by the global
//! [`RuleWeights`] times the agent's [`TagProfile`](crate::TagProfile), and
//! clips the sum to `max_force`. A rule that produces a non-finite vector
//! contributes zero and is counted as a fault; it never reaches the agent.

use crate::agent::Agent;
use crate::config::{RuleWeights, SwarmConfig};
use crate::input::PointerInput;
use glam::Vec3;

/// Neighbors closer than this are treated as coincident and skipped.
pub const MIN_DISTANCE: f32 = 1e-6;

/// A neighbor as seen from the agent being steered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// `neighbor.position - agent.position`.
    pub offset: Vec3,
    /// `offset.length()`.
    pub distance: f32,
    /// Neighbor velocity.
    pub velocity: Vec3,
}

impl Neighbor {
    /// Build a neighbor record from raw positions and velocity.
    #[inline]
    pub fn new(from: Vec3, position: Vec3, velocity: Vec3) -> Self {
        let offset = position - from;
        Self {
            offset,
            distance: offset.length(),
            velocity,
        }
    }
}

/// Limits and radii shared by every rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringParams {
    pub max_speed: f32,
    pub max_force: f32,
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    /// Radius of the bounding sphere.
    pub bounds: f32,
    /// Fraction of `bounds` where containment starts.
    pub soft_boundary: f32,
}

impl From<&SwarmConfig> for SteeringParams {
    fn from(config: &SwarmConfig) -> Self {
        Self {
            max_speed: config.max_speed,
            max_force: config.max_force,
            separation_radius: config.separation_distance,
            alignment_radius: config.alignment_distance,
            cohesion_radius: config.cohesion_distance,
            bounds: config.bounds,
            soft_boundary: config.soft_boundary,
        }
    }
}

/// Clamp `v` to magnitude `max`.
#[inline]
pub fn limit(v: Vec3, max: f32) -> Vec3 {
    v.clamp_length_max(max)
}

/// `v` if every component is finite, otherwise zero.
#[inline]
pub fn finite_or_zero(v: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        Vec3::ZERO
    }
}

/// Reynolds steering: desired velocity along `direction` at full speed,
/// minus current velocity, clipped. Zero when `direction` has no length.
#[inline]
fn steer_along(direction: Vec3, velocity: Vec3, params: &SteeringParams) -> Vec3 {
    match direction.try_normalize() {
        Some(dir) => limit(dir * params.max_speed - velocity, params.max_force),
        None => Vec3::ZERO,
    }
}

/// Push away from neighbors inside the separation radius.
///
/// Each close neighbor contributes a unit vector pointing away from it,
/// weighted by `1 / distance`. Coincident neighbors are skipped.
pub fn separation(agent: &Agent, neighbors: &[Neighbor], params: &SteeringParams) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0;
    for n in neighbors {
        if n.distance < params.separation_radius && n.distance > MIN_DISTANCE {
            // unit away (-offset / d) weighted by 1 / d
            sum -= n.offset / (n.distance * n.distance);
            count += 1;
        }
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    steer_along(sum, agent.velocity, params)
}

/// Match the average velocity of neighbors inside the alignment radius.
pub fn alignment(agent: &Agent, neighbors: &[Neighbor], params: &SteeringParams) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0;
    for n in neighbors {
        if n.distance < params.alignment_radius {
            sum += n.velocity;
            count += 1;
        }
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    steer_along(sum / count as f32, agent.velocity, params)
}

/// Steer toward the centroid of neighbors inside the cohesion radius.
pub fn cohesion(agent: &Agent, neighbors: &[Neighbor], params: &SteeringParams) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0;
    for n in neighbors {
        if n.distance < params.cohesion_radius {
            sum += n.offset;
            count += 1;
        }
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    steer_along(sum / count as f32, agent.velocity, params)
}

/// Random perturbation. `jitter` is a caller-sampled unit vector; the tag's
/// wander strength scales it as a fraction of `max_force`.
pub fn wander(agent: &Agent, jitter: Vec3, params: &SteeringParams) -> Vec3 {
    let strength = agent.tag.profile().wander;
    limit(jitter * strength * params.max_force, params.max_force)
}

/// Inward steering once an agent is beyond `soft_boundary * bounds`.
///
/// Strength ramps linearly from zero at the soft boundary to `max_force` at
/// the hard boundary.
pub fn containment(agent: &Agent, params: &SteeringParams) -> Vec3 {
    let r = agent.position.length();
    let start = params.bounds * params.soft_boundary;
    if r <= start || r <= MIN_DISTANCE {
        return Vec3::ZERO;
    }
    let depth = ((r - start) / (params.bounds - start).max(MIN_DISTANCE)).min(1.0);
    let inward = -agent.position / r;
    limit(inward * params.max_speed - agent.velocity, params.max_force * depth)
}

/// Result of evaluating every rule for one agent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    /// Weighted, clipped acceleration.
    pub acceleration: Vec3,
    /// Number of rule contributions discarded as non-finite.
    pub faults: u32,
}

/// Evaluate every rule for `agent` and combine them into one acceleration.
pub fn steer(
    agent: &Agent,
    neighbors: &[Neighbor],
    jitter: Vec3,
    pointer: Option<&PointerInput>,
    weights: &RuleWeights,
    params: &SteeringParams,
) -> Steering {
    let profile = agent.tag.profile();
    let mut faults = 0;
    let mut guard = |v: Vec3| {
        if v.is_finite() {
            v
        } else {
            faults += 1;
            Vec3::ZERO
        }
    };

    let contributions = [
        (
            guard(separation(agent, neighbors, params)),
            weights.separation * profile.separation,
        ),
        (
            guard(alignment(agent, neighbors, params)),
            weights.alignment * profile.alignment,
        ),
        (
            guard(cohesion(agent, neighbors, params)),
            weights.cohesion * profile.cohesion,
        ),
        (guard(wander(agent, jitter, params)), weights.wander),
        (
            guard(pointer.map_or(Vec3::ZERO, |p| p.force_at(agent.position, params.max_force))),
            weights.pointer,
        ),
        (guard(containment(agent, params)), weights.containment),
    ];

    let sum = contributions
        .iter()
        .fold(Vec3::ZERO, |acc, (force, weight)| acc + *force * *weight);

    Steering {
        acceleration: finite_or_zero(limit(sum, params.max_force)),
        faults,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorTag;

    fn params() -> SteeringParams {
        SteeringParams {
            max_speed: 0.2,
            max_force: 0.05,
            separation_radius: 0.05,
            alignment_radius: 0.1,
            cohesion_radius: 0.12,
            bounds: 1.0,
            soft_boundary: 0.85,
        }
    }

    fn agent_at(position: Vec3, velocity: Vec3, tag: BehaviorTag) -> Agent {
        Agent {
            id: 0,
            position,
            velocity,
            acceleration: Vec3::ZERO,
            tag,
            energy: 1.0,
            spawn_energy: 1.0,
            influence: 0.5,
            age: 0.0,
            max_age: 10.0,
            size: 1.0,
            color: Vec3::ONE,
            generation: 0,
        }
    }

    #[test]
    fn test_zero_neighbors_zero_flocking() {
        let agent = agent_at(Vec3::ZERO, Vec3::X * 0.1, BehaviorTag::Follower);
        let p = params();
        assert_eq!(separation(&agent, &[], &p), Vec3::ZERO);
        assert_eq!(alignment(&agent, &[], &p), Vec3::ZERO);
        assert_eq!(cohesion(&agent, &[], &p), Vec3::ZERO);
    }

    #[test]
    fn test_separation_points_away() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let neighbor = Neighbor::new(Vec3::ZERO, Vec3::new(0.02, 0.0, 0.0), Vec3::ZERO);
        let force = separation(&agent, &[neighbor], &params());
        assert!(force.x < 0.0);
        assert!(force.length() <= params().max_force + 1e-6);
    }

    #[test]
    fn test_separation_closer_neighbor_dominates() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let near = Neighbor::new(Vec3::ZERO, Vec3::new(0.01, 0.0, 0.0), Vec3::ZERO);
        let far = Neighbor::new(Vec3::ZERO, Vec3::new(-0.04, 0.0, 0.0), Vec3::ZERO);
        let force = separation(&agent, &[near, far], &params());
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_coincident_neighbor_is_guarded() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let twin = Neighbor::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        let force = separation(&agent, &[twin], &params());
        assert_eq!(force, Vec3::ZERO);
        assert!(cohesion(&agent, &[twin], &params()).is_finite());
        assert!(alignment(&agent, &[twin], &params()).is_finite());
    }

    #[test]
    fn test_alignment_matches_heading() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let n = Neighbor::new(Vec3::ZERO, Vec3::new(0.05, 0.0, 0.0), Vec3::Y * 0.1);
        let force = alignment(&agent, &[n], &params());
        assert!(force.y > 0.0);
        assert!((force.length() - params().max_force).abs() < 1e-5);
    }

    #[test]
    fn test_cohesion_toward_centroid() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let a = Neighbor::new(Vec3::ZERO, Vec3::new(0.1, 0.05, 0.0), Vec3::ZERO);
        let b = Neighbor::new(Vec3::ZERO, Vec3::new(0.1, -0.05, 0.0), Vec3::ZERO);
        let force = cohesion(&agent, &[a, b], &params());
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn test_cohesion_ignores_out_of_radius() {
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Follower);
        let far = Neighbor::new(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(cohesion(&agent, &[far], &params()), Vec3::ZERO);
    }

    #[test]
    fn test_wander_scales_with_personality() {
        let p = params();
        let jitter = Vec3::Z;
        let maverick = wander(&agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Maverick), jitter, &p);
        let explorer = wander(&agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Explorer), jitter, &p);
        let leader = wander(&agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Leader), jitter, &p);
        assert!(maverick.length() > explorer.length());
        assert!(explorer.length() > leader.length());
        assert!(maverick.length() <= p.max_force + 1e-6);
    }

    #[test]
    fn test_containment_only_near_edge() {
        let p = params();
        let inside = agent_at(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO, BehaviorTag::Follower);
        assert_eq!(containment(&inside, &p), Vec3::ZERO);

        let edge = agent_at(Vec3::new(0.95, 0.0, 0.0), Vec3::X * 0.2, BehaviorTag::Follower);
        let force = containment(&edge, &p);
        assert!(force.x < 0.0);
        assert!(force.length() <= p.max_force + 1e-6);
    }

    #[test]
    fn test_steer_clips_total_force() {
        let p = params();
        let agent = agent_at(Vec3::new(0.99, 0.0, 0.0), Vec3::X * 0.2, BehaviorTag::Guardian);
        let neighbors: Vec<Neighbor> = (1..10)
            .map(|i| {
                Neighbor::new(
                    agent.position,
                    agent.position + Vec3::new(-0.004 * i as f32, 0.001, 0.0),
                    Vec3::Y * 0.2,
                )
            })
            .collect();
        let weights = RuleWeights {
            separation: 5.0,
            alignment: 5.0,
            cohesion: 5.0,
            wander: 5.0,
            pointer: 5.0,
            containment: 5.0,
        };
        let pointer = PointerInput::new(Vec3::new(0.9, 0.0, 0.0));
        let steering = steer(&agent, &neighbors, Vec3::Y, Some(&pointer), &weights, &p);
        assert!(steering.acceleration.length() <= p.max_force + 1e-6);
        assert_eq!(steering.faults, 0);
    }

    #[test]
    fn test_steer_drops_non_finite_rule() {
        let p = params();
        let agent = agent_at(Vec3::ZERO, Vec3::ZERO, BehaviorTag::Explorer);
        let steering = steer(
            &agent,
            &[],
            Vec3::new(f32::NAN, 0.0, 0.0),
            None,
            &RuleWeights::default(),
            &p,
        );
        assert_eq!(steering.faults, 1);
        assert!(steering.acceleration.is_finite());
    }
}
