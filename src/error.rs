//! Error types for bioswarm.
//!
//! Only construction can fail. Numerical faults inside a tick are corrected
//! in place and never surface here; see [`crate::TickStats`].

use thiserror::Error;

/// Errors raised while validating a [`SwarmConfig`](crate::SwarmConfig).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The population budget is zero.
    #[error("max_particles must be at least 1")]
    NoParticles,

    /// A scalar parameter is zero, negative, NaN or infinite.
    #[error("`{name}` must be a positive finite number, got {value}")]
    NotPositive {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A rule weight is negative or not finite.
    #[error("rule weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Name of the weight.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The grid cell is smaller than the largest behavior radius, so the
    /// 3x3x3 neighbor window could miss agents.
    #[error("cell_size {cell_size} is smaller than the largest behavior radius {radius}")]
    CellTooSmall {
        /// Configured cell size.
        cell_size: f32,
        /// Largest of the separation/alignment/cohesion radii.
        radius: f32,
    },

    /// The spawn shape can place agents outside the bounding sphere.
    #[error("spawn shape reaches {reach}, beyond bounds {bounds}")]
    SpawnOutsideBounds {
        /// Furthest distance from the origin a spawn can land.
        reach: f32,
        /// Configured bounding sphere radius.
        bounds: f32,
    },

    /// The lifetime range is empty or inverted.
    #[error("lifetime range {min}..{max} is invalid")]
    InvalidLifetime {
        /// Lower bound in seconds.
        min: f32,
        /// Upper bound in seconds.
        max: f32,
    },

    /// A quality multiplier's bounds are inverted or out of range.
    #[error("quality bounds for `{name}` are invalid: [{min}, {max}]")]
    InvalidQualityBounds {
        /// Name of the multiplier.
        name: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// Quality gains must shrink above the band and grow (more slowly) below it.
    #[error("quality gains are invalid: decay {decay} must be in (0, 1), growth {growth} must be in (1, {max_growth})")]
    InvalidQualityGain {
        /// Multiplier applied when population is above the band.
        decay: f32,
        /// Multiplier applied when population is below the band.
        growth: f32,
        /// Largest growth allowed for the given decay.
        max_growth: f32,
    },

    /// The configuration text could not be parsed.
    #[error("failed to parse swarm configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Errors raised while building an [`ActivationNetwork`](crate::network::ActivationNetwork).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The network has no nodes.
    #[error("activation network needs at least one node")]
    Empty,

    /// An edge references a node that was never added.
    #[error("edge {from} -> {to} references a missing node (network has {len} nodes)")]
    DanglingEdge {
        /// Source node id.
        from: usize,
        /// Target node id.
        to: usize,
        /// Number of nodes in the network.
        len: usize,
    },

    /// An edge weight or threshold is NaN or infinite.
    #[error("node {node} has a non-finite weight or threshold")]
    NonFinite {
        /// Node id.
        node: usize,
    },
}

/// Error a [`FrameConsumer`](crate::output::FrameConsumer) reports when it can
/// no longer accept frames (lost graphics context, closed channel, ...).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("frame consumer `{consumer}` failed: {reason}")]
pub struct ConsumerError {
    /// Name of the consumer.
    pub consumer: String,
    /// Human readable reason.
    pub reason: String,
}

impl ConsumerError {
    /// Create a consumer error.
    pub fn new(consumer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::CellTooSmall {
            cell_size: 0.05,
            radius: 0.15,
        };
        assert!(err.to_string().contains("0.05"));
        assert!(err.to_string().contains("0.15"));

        let err = ConfigError::NotPositive {
            name: "max_speed",
            value: -1.0,
        };
        assert!(err.to_string().contains("max_speed"));
    }

    #[test]
    fn test_parse_error_from_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_consumer_error_display() {
        let err = ConsumerError::new("webgl", "context lost");
        assert_eq!(err.to_string(), "frame consumer `webgl` failed: context lost");
    }
}
