//! Small fixed activation network.
//!
//! Nodes hold an activation in [0, 1]. Each [`step`](ActivationNetwork::step)
//! computes every node from the *previous* step's activations of its
//! upstream nodes:
//!
//! ```text
//! a'[i] = sigmoid(gain * (sum_j w[j->i] * a[j] + stimulus[i] - threshold[i]))
//! ```
//!
//! Reads and writes go to separate buffers, so the result does not depend on
//! node or edge order. The node set is fixed once [`NetworkBuilder::build`]
//! returns.
//!
//! ```ignore
//! let mut builder = NetworkBuilder::new();
//! let a = builder.add_node(0.2);
//! let b = builder.add_node(0.4);
//! builder.connect(a, b, 1.5).connect(b, a, -0.5);
//! let mut net = builder.build()?;
//! net.stimulate(a, 1.0);
//! net.step();
//! ```

use crate::error::NetworkError;

/// Samples of past activation kept per node.
pub const HISTORY_LEN: usize = 16;

/// Default sigmoid steepness.
pub const DEFAULT_GAIN: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Edge {
    from: usize,
    weight: f32,
}

#[derive(Clone, Debug)]
struct Node {
    threshold: f32,
    incoming: Vec<Edge>,
    history: [f32; HISTORY_LEN],
}

/// Collects nodes and edges, then validates them into an
/// [`ActivationNetwork`].
#[derive(Clone, Debug, Default)]
pub struct NetworkBuilder {
    thresholds: Vec<f32>,
    edges: Vec<(usize, usize, f32)>,
    gain: Option<f32>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self, threshold: f32) -> usize {
        self.thresholds.push(threshold);
        self.thresholds.len() - 1
    }

    /// Add a weighted edge `from -> to`. Ids are checked in [`build`](Self::build).
    pub fn connect(&mut self, from: usize, to: usize, weight: f32) -> &mut Self {
        self.edges.push((from, to, weight));
        self
    }

    /// Sigmoid steepness. Defaults to [`DEFAULT_GAIN`].
    pub fn gain(&mut self, gain: f32) -> &mut Self {
        self.gain = Some(gain);
        self
    }

    /// Validate and freeze the topology.
    pub fn build(&self) -> Result<ActivationNetwork, NetworkError> {
        let len = self.thresholds.len();
        if len == 0 {
            return Err(NetworkError::Empty);
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(len);
        for (id, &threshold) in self.thresholds.iter().enumerate() {
            if !threshold.is_finite() {
                return Err(NetworkError::NonFinite { node: id });
            }
            nodes.push(Node {
                threshold,
                incoming: Vec::new(),
                history: [0.0; HISTORY_LEN],
            });
        }

        for &(from, to, weight) in &self.edges {
            if from >= len || to >= len {
                return Err(NetworkError::DanglingEdge { from, to, len });
            }
            if !weight.is_finite() {
                return Err(NetworkError::NonFinite { node: to });
            }
            nodes[to].incoming.push(Edge { from, weight });
        }

        let gain = self.gain.unwrap_or(DEFAULT_GAIN);
        if !gain.is_finite() {
            return Err(NetworkError::NonFinite { node: 0 });
        }

        tracing::debug!(nodes = len, edges = self.edges.len(), "activation network built");

        Ok(ActivationNetwork {
            nodes,
            previous: vec![0.0; len],
            current: vec![0.0; len],
            stimulus: vec![0.0; len],
            gain,
            cursor: 0,
            steps: 0,
        })
    }
}

/// Weighted graph of sigmoid nodes, double-buffered.
#[derive(Clone, Debug)]
pub struct ActivationNetwork {
    nodes: Vec<Node>,
    previous: Vec<f32>,
    current: Vec<f32>,
    stimulus: Vec<f32>,
    gain: f32,
    /// Next history slot.
    cursor: usize,
    steps: u64,
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl ActivationNetwork {
    /// `n` nodes in a directed ring, each feeding the next with weight 1.
    /// Returns [`NetworkError::Empty`] for `n == 0`.
    pub fn ring(n: usize) -> Result<Self, NetworkError> {
        let mut builder = NetworkBuilder::new();
        for _ in 0..n {
            builder.add_node(0.5);
        }
        for i in 0..n {
            builder.connect(i, (i + 1) % n, 1.0);
        }
        builder.build()
    }

    /// Add `amount` to node `id`'s input for the next step only.
    /// Unknown ids and non-finite amounts are ignored.
    pub fn stimulate(&mut self, id: usize, amount: f32) {
        if !amount.is_finite() {
            return;
        }
        if let Some(s) = self.stimulus.get_mut(id) {
            *s += amount;
        }
    }

    /// Advance one step.
    pub fn step(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);

        for (i, node) in self.nodes.iter_mut().enumerate() {
            let input: f32 = node
                .incoming
                .iter()
                .map(|edge| edge.weight * self.previous[edge.from])
                .sum::<f32>()
                + self.stimulus[i];
            let mut activation = sigmoid(self.gain * (input - node.threshold));
            if !activation.is_finite() {
                activation = self.previous[i];
            }
            let activation = activation.clamp(0.0, 1.0);
            self.current[i] = activation;
            node.history[self.cursor] = activation;
        }

        self.stimulus.iter_mut().for_each(|s| *s = 0.0);
        self.cursor = (self.cursor + 1) % HISTORY_LEN;
        self.steps += 1;
    }

    /// Activation of node `id` after the last step.
    pub fn activation(&self, id: usize) -> Option<f32> {
        self.current.get(id).copied()
    }

    pub fn activations(&self) -> &[f32] {
        &self.current
    }

    /// Up to [`HISTORY_LEN`] past activations of node `id`, oldest first.
    pub fn history(&self, id: usize) -> Option<Vec<f32>> {
        let node = self.nodes.get(id)?;
        let filled = (self.steps as usize).min(HISTORY_LEN);
        let start = (self.cursor + HISTORY_LEN - filled) % HISTORY_LEN;
        Some(
            (0..filled)
                .map(|k| node.history[(start + k) % HISTORY_LEN])
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_network_rejected() {
        assert_eq!(NetworkBuilder::new().build().unwrap_err(), NetworkError::Empty);
        assert!(ActivationNetwork::ring(0).is_err());
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut builder = NetworkBuilder::new();
        let a = builder.add_node(0.1);
        builder.connect(a, 7, 1.0);
        assert_eq!(
            builder.build().unwrap_err(),
            NetworkError::DanglingEdge { from: 0, to: 7, len: 1 }
        );
    }

    #[test]
    fn test_activations_stay_in_unit_range() {
        let mut net = ActivationNetwork::ring(8).unwrap();
        net.stimulate(0, 1_000.0);
        for _ in 0..100 {
            net.step();
            assert!(net.activations().iter().all(|a| (0.0..=1.0).contains(a)));
        }
    }

    #[test]
    fn test_stimulus_lasts_one_step() {
        let mut net = ActivationNetwork::ring(4).unwrap();
        net.step();
        let resting = net.activation(0).unwrap();

        net.stimulate(0, 2.0);
        net.step();
        assert!(net.activation(0).unwrap() > resting);

        net.step();
        net.step();
        net.step();
        let settled = net.activation(0).unwrap();
        assert!(settled < 1.0);
    }

    #[test]
    fn test_pulse_propagates_around_ring() {
        let mut net = ActivationNetwork::ring(3).unwrap();
        net.stimulate(0, 5.0);
        net.step();
        let after_one = net.activations().to_vec();
        net.step();
        // node 1 reads node 0's previous activation
        assert!(net.activation(1).unwrap() > after_one[1]);
    }

    #[test]
    fn test_result_is_independent_of_edge_order() {
        let build = |edges: &[(usize, usize, f32)]| {
            let mut builder = NetworkBuilder::new();
            for t in [0.1, 0.3, 0.5] {
                builder.add_node(t);
            }
            for &(a, b, w) in edges {
                builder.connect(a, b, w);
            }
            builder.build().unwrap()
        };
        let edges = [(0, 1, 0.8), (1, 2, -0.4), (2, 0, 1.2), (0, 2, 0.3)];
        let mut reversed = edges;
        reversed.reverse();

        let mut a = build(&edges);
        let mut b = build(&reversed);
        for step in 0..20 {
            if step % 5 == 0 {
                a.stimulate(1, 0.7);
                b.stimulate(1, 0.7);
            }
            a.step();
            b.step();
            for (x, y) in a.activations().iter().zip(b.activations()) {
                assert!((x - y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_history_is_bounded_and_ordered() {
        let mut net = ActivationNetwork::ring(2).unwrap();
        assert_eq!(net.history(0).unwrap().len(), 0);
        for _ in 0..(HISTORY_LEN + 5) {
            net.step();
        }
        let history = net.history(0).unwrap();
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(*history.last().unwrap(), net.activation(0).unwrap());
        assert!(net.history(9).is_none());
    }
}
