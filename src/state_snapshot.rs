use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Dynamic state of every neuron of a network after step `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub t: usize,
    pub neuron_states: Vec<NeuronState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuronState {
    pub u: f64,
    pub v: f64,
    pub threshold: f64,
    pub has_fired: bool,
    pub is_dead: bool,
}

impl StateSnapshot {
    pub fn extract(network: &Network, t: usize) -> Self {
        Self {
            t,
            neuron_states: network
                .neurons
                .iter()
                .map(|neuron| NeuronState {
                    u: neuron.u,
                    v: neuron.v,
                    threshold: neuron.threshold,
                    has_fired: neuron.has_fired,
                    is_dead: neuron.is_dead,
                })
                .collect(),
        }
    }

    /// Applies the recorded state onto `network`, which must have the
    /// neurons this snapshot was taken from.
    pub fn restore(&self, network: &mut Network) {
        for (neuron, state) in network.neurons.iter_mut().zip(&self.neuron_states) {
            neuron.u = state.u;
            neuron.v = state.v;
            neuron.threshold = state.threshold;
            neuron.has_fired = state.has_fired;
            neuron.is_dead = state.is_dead;
        }
    }

    pub fn spiking_nids(&self) -> Vec<usize> {
        self.neuron_states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.has_fired)
            .map(|(nid, _)| nid)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_network;
    use crate::util::test_util;
    use itertools::assert_equal;

    #[test]
    fn extract_and_restore() {
        let mut network = build_network(&test_util::path_graph(), 1, 42).unwrap();
        network.neurons[2].u = 4.0;
        network.neurons[2].has_fired = true;
        network.neurons[5].kill();

        let sut = StateSnapshot::extract(&network, 9);
        assert_eq!(sut.t, 9);
        assert_eq!(sut.neuron_states.len(), network.num_neurons());
        assert_equal(sut.spiking_nids(), [2]);

        let mut restored = build_network(&test_util::path_graph(), 1, 42).unwrap();
        sut.restore(&mut restored);
        assert_eq!(restored, network);
    }
}
