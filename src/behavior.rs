//! Behavior tags and their per-tag rule weights.
//!
//! Every agent carries one [`BehaviorTag`]. The tag selects a [`TagProfile`]
//! from a constant lookup table, which scales the four steering rules and
//! tints the agent. Dispatch is a plain index into the table.
//!
//! | Tag | Separation | Alignment | Cohesion | Wander | Character |
//! |-----|-----------:|----------:|---------:|-------:|-----------|
//! | Explorer | 1.0 | 0.6 | 0.5 | 0.7 | Drifts away from the flock |
//! | Follower | 1.0 | 1.2 | 1.1 | 0.15 | Sticks with neighbors |
//! | Leader | 1.1 | 0.8 | 0.4 | 0.45 | Heads out, pulls others along |
//! | Maverick | 0.8 | 0.3 | 0.2 | 1.0 | Erratic loner |
//! | Guardian | 1.6 | 0.9 | 0.9 | 0.2 | Keeps its distance |

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed set of agent personalities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorTag {
    Explorer,
    Follower,
    Leader,
    Maverick,
    Guardian,
}

/// Per-tag multipliers applied on top of the global rule weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TagProfile {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    /// Wander strength as a fraction of `max_force`.
    pub wander: f32,
    /// Relative spawn probability.
    pub spawn_weight: f32,
    /// Base tint (RGB, 0-1).
    pub color: Vec3,
}

const PROFILES: [TagProfile; BehaviorTag::COUNT] = [
    // Explorer
    TagProfile {
        separation: 1.0,
        alignment: 0.6,
        cohesion: 0.5,
        wander: 0.7,
        spawn_weight: 0.25,
        color: Vec3::new(0.35, 0.75, 1.0),
    },
    // Follower
    TagProfile {
        separation: 1.0,
        alignment: 1.2,
        cohesion: 1.1,
        wander: 0.15,
        spawn_weight: 0.4,
        color: Vec3::new(0.55, 0.95, 0.7),
    },
    // Leader
    TagProfile {
        separation: 1.1,
        alignment: 0.8,
        cohesion: 0.4,
        wander: 0.45,
        spawn_weight: 0.1,
        color: Vec3::new(1.0, 0.85, 0.4),
    },
    // Maverick
    TagProfile {
        separation: 0.8,
        alignment: 0.3,
        cohesion: 0.2,
        wander: 1.0,
        spawn_weight: 0.1,
        color: Vec3::new(1.0, 0.4, 0.6),
    },
    // Guardian
    TagProfile {
        separation: 1.6,
        alignment: 0.9,
        cohesion: 0.9,
        wander: 0.2,
        spawn_weight: 0.15,
        color: Vec3::new(0.7, 0.55, 1.0),
    },
];

impl BehaviorTag {
    /// Number of tags.
    pub const COUNT: usize = 5;

    /// All tags in table order.
    pub const ALL: [BehaviorTag; Self::COUNT] = [
        BehaviorTag::Explorer,
        BehaviorTag::Follower,
        BehaviorTag::Leader,
        BehaviorTag::Maverick,
        BehaviorTag::Guardian,
    ];

    /// Table index of this tag.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weight profile for this tag.
    #[inline]
    pub fn profile(self) -> &'static TagProfile {
        &PROFILES[self.index()]
    }

    /// Numeric tag written into the output buffer.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.index() as f32
    }

    /// Pick a tag according to the profiles' spawn weights.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let total: f32 = PROFILES.iter().map(|p| p.spawn_weight).sum();
        let mut roll = rng.gen::<f32>() * total;
        for tag in Self::ALL {
            roll -= tag.profile().spawn_weight;
            if roll < 0.0 {
                return tag;
            }
        }
        BehaviorTag::Follower
    }
}

impl From<BehaviorTag> for u32 {
    fn from(tag: BehaviorTag) -> u32 {
        tag as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_table_order_matches_tags() {
        for (i, tag) in BehaviorTag::ALL.iter().enumerate() {
            assert_eq!(tag.index(), i);
        }
    }

    #[test]
    fn test_wander_personalities() {
        let maverick = BehaviorTag::Maverick.profile().wander;
        let explorer = BehaviorTag::Explorer.profile().wander;
        let leader = BehaviorTag::Leader.profile().wander;
        assert!(maverick > explorer);
        assert!(explorer > leader);
    }

    #[test]
    fn test_leader_overrides() {
        let leader = BehaviorTag::Leader.profile();
        let follower = BehaviorTag::Follower.profile();
        assert!(leader.cohesion < follower.cohesion);
        assert!(leader.wander > follower.wander);
    }

    #[test]
    fn test_sample_covers_all_tags() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = [0usize; BehaviorTag::COUNT];
        for _ in 0..5000 {
            seen[BehaviorTag::sample(&mut rng).index()] += 1;
        }
        assert!(seen.iter().all(|&n| n > 0));
        // Followers are the most common personality
        assert!(seen[BehaviorTag::Follower.index()] > seen[BehaviorTag::Maverick.index()]);
    }
}
