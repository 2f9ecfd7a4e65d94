use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::network::Network;
use crate::neuron::Role;
use crate::state_snapshot::StateSnapshot;
use crate::util::as_count;

/// Steps appended to every horizon so inhibition can propagate before the
/// counters are read.
pub const INHIBITION_PAD: usize = 2;

#[derive(Debug, Clone)]
pub struct TickResult {
    pub t: usize,
    pub spiking_nids: Vec<usize>,
    pub synaptic_transmission_count: usize,
}

/// Synchronous stepping engine over a private copy of a network.
///
/// Every step first gathers the input of all neurons from the firing state of
/// the previous step, then updates all neurons, so no update observes another
/// update of the same step.
pub struct Simulator {
    network: Network,
    outgoing: Vec<Vec<(usize, f64)>>,
    a_in: Vec<f64>,
    t: usize,
}

impl Simulator {
    pub fn new(network: &Network) -> Result<Self, RunError> {
        network.validate()?;

        Ok(Self {
            outgoing: network.outgoing(),
            a_in: vec![0.0; network.num_neurons()],
            network: network.clone(),
            t: 0,
        })
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn tick(&mut self) -> TickResult {
        self.a_in.fill(0.0);
        let mut synaptic_transmission_count = 0;

        for (nid, neuron) in self.network.neurons.iter().enumerate() {
            if neuron.has_fired {
                for &(post_syn_nid, weight) in &self.outgoing[nid] {
                    self.a_in[post_syn_nid] += weight;
                }
                synaptic_transmission_count += self.outgoing[nid].len();
            }
        }

        let mut spiking_nids = Vec::new();

        for (nid, neuron) in self.network.neurons.iter_mut().enumerate() {
            if neuron.update(self.a_in[nid]) {
                spiking_nids.push(nid);
            }
        }

        self.t += 1;

        trace!("t={}: {} spikes", self.t, spiking_nids.len());

        TickResult {
            t: self.t,
            spiking_nids,
            synaptic_transmission_count,
        }
    }
}

impl Iterator for Simulator {
    type Item = TickResult;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.tick())
    }
}

/// The initial network and the state recorded after every executed step.
/// `snapshots[i]` holds the state after step `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub network: Network,
    pub snapshots: Vec<StateSnapshot>,
}

impl History {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn initial_snapshot(&self) -> StateSnapshot {
        StateSnapshot::extract(&self.network, 0)
    }

    pub fn snapshot_at(&self, t: usize) -> Option<StateSnapshot> {
        if t == 0 {
            Some(self.initial_snapshot())
        } else {
            self.snapshots.get(t - 1).cloned()
        }
    }

    /// Rebuilds the full network as it was after step `t`.
    pub fn network_at(&self, t: usize) -> Option<Network> {
        let snapshot = self.snapshot_at(t)?;
        let mut network = self.network.clone();
        snapshot.restore(&mut network);
        Some(network)
    }

    pub fn final_network(&self) -> Network {
        let mut network = self.network.clone();
        if let Some(snapshot) = self.snapshots.last() {
            snapshot.restore(&mut network);
        }
        network
    }

    /// Number of steps in which each neuron fired.
    pub fn fire_counts(&self) -> Vec<usize> {
        let mut result = vec![0; self.network.num_neurons()];

        for snapshot in &self.snapshots {
            for nid in snapshot.spiking_nids() {
                result[nid] += 1;
            }
        }

        result
    }

    pub fn final_counts(&self, num_nodes: usize) -> Result<Vec<usize>, RunError> {
        counter_values(&self.final_network(), num_nodes)
    }
}

/// Runs `network` for `sim_time` steps plus the inhibition pad. The caller's
/// network is left untouched.
pub fn simulate(network: &Network, sim_time: usize) -> Result<History, RunError> {
    let mut simulator = Simulator::new(network)?;
    let horizon = sim_time + INHIBITION_PAD;

    let mut snapshots = Vec::with_capacity(horizon);
    let mut spike_count = 0;

    for _ in 0..horizon {
        let tick_result = simulator.tick();
        spike_count += tick_result.spiking_nids.len();
        snapshots.push(StateSnapshot::extract(simulator.network(), tick_result.t));
    }

    debug!(
        "simulated {} neurons for {} steps: {} spikes",
        network.num_neurons(),
        horizon,
        spike_count
    );

    Ok(History {
        network: network.clone(),
        snapshots,
    })
}

/// Reads the count of every node from the `u` of its counter neuron, in node
/// order.
pub fn counter_values(network: &Network, num_nodes: usize) -> Result<Vec<usize>, RunError> {
    let mut result: Vec<Option<usize>> = vec![None; num_nodes];

    for neuron in network.neurons_with_role(Role::Counter) {
        let node = neuron.id.node;

        if node >= num_nodes {
            return Err(RunError::structural(format!(
                "{} refers to a node outside 0..{}",
                neuron.id, num_nodes
            )));
        }

        if result[node].is_some() {
            return Err(RunError::structural(format!("duplicate {}", neuron.id)));
        }

        let count = as_count(neuron.u).ok_or_else(|| {
            RunError::structural(format!(
                "{} holds non-integral count {}",
                neuron.id, neuron.u
            ))
        })?;

        result[node] = Some(count);
    }

    result
        .into_iter()
        .enumerate()
        .map(|(node, count)| {
            count.ok_or_else(|| RunError::structural(format!("missing counter_{}", node)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_network;
    use crate::neuron::{LifParams, Neuron, NeuronId};
    use crate::util::test_util;
    use float_cmp::assert_approx_eq;
    use itertools::assert_equal;

    fn make_rand_counter() -> Network {
        let mut network = Network::new();
        let rand = network.add_neuron(Neuron::new(
            NeuronId::rand(0, 0),
            LifParams::new(1.0, 0.0, 0.0, 1.0),
        ));
        let counter = network.add_neuron(Neuron::new(
            NeuronId::counter(0),
            LifParams::new(0.0, 0.0, 1.0, 1.0),
        ));
        network.add_synapse(rand, rand, -5.0);
        network.add_synapse(rand, counter, 1.0);
        network
    }

    #[test]
    fn previous_step_drives_input() {
        let network = make_rand_counter();
        let mut sut = Simulator::new(&network).unwrap();

        let result = sut.tick();
        assert_eq!(result.t, 1);
        assert_equal(result.spiking_nids, [0]);
        assert_eq!(result.synaptic_transmission_count, 0);

        // the spike of step 1 arrives in step 2
        let result = sut.tick();
        assert_eq!(result.synaptic_transmission_count, 2);
        assert_equal(result.spiking_nids, [1]);
        assert_approx_eq!(f64, sut.network().neurons[1].u, 1.0);
        assert_approx_eq!(f64, sut.network().neurons[0].u, -5.0);

        let results: Vec<_> = sut.by_ref().take(3).collect();
        assert!(results.iter().all(|result| result.spiking_nids == vec![1]));
        assert_eq!(sut.t(), 5);
    }

    #[test]
    fn history_length_and_restart() {
        let network = make_rand_counter();
        let history = simulate(&network, 3).unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history.network, network);
        assert_eq!(history.snapshot_at(0).unwrap(), history.initial_snapshot());
        assert_eq!(history.snapshot_at(5).unwrap().t, 5);
        assert!(history.snapshot_at(6).is_none());

        let at_1 = history.network_at(1).unwrap();
        assert!(at_1.neurons[0].has_fired);
        assert_approx_eq!(f64, at_1.neurons[1].u, 0.0);

        // rerunning from the recorded initial network reproduces the run
        assert_eq!(simulate(&history.network, 3).unwrap(), history);
        assert_equal(history.fire_counts(), [1, 4]);
        assert_equal(history.final_counts(1).unwrap(), [1]);
    }

    #[test]
    fn zero_sim_time_runs_pad() {
        let network = build_network(&test_util::path_graph(), 1, 42).unwrap();
        let history = simulate(&network, 0).unwrap();

        assert_eq!(history.len(), INHIBITION_PAD);
        assert_equal(history.final_counts(3).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn invalid_network_rejected() {
        let mut network = make_rand_counter();
        network.neurons[0].du = f64::NAN;

        assert!(simulate(&network, 1).unwrap_err().is_structural());
    }

    #[test]
    fn counter_readout_errors() {
        let mut network = make_rand_counter();
        network.neurons[1].u = 2.5;
        assert_eq!(
            counter_values(&network, 1).unwrap_err().as_str(),
            "counter_0 holds non-integral count 2.5"
        );

        let network = make_rand_counter();
        assert_eq!(
            counter_values(&network, 2).unwrap_err().as_str(),
            "missing counter_1"
        );
    }
}
