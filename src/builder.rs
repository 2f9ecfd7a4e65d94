use log::debug;

use crate::error::RunError;
use crate::graph::Graph;
use crate::network::Network;
use crate::neuron::{LifParams, Neuron, NeuronId};
use crate::stimulus::StimulusBundle;
use crate::synapse::{SELECTOR_INHIBITION_WEIGHT, SELF_INHIBITION_WEIGHT, UNIT_WEIGHT};
use crate::types::HashMap;

const RAND_PARAMS: LifParams = LifParams::new(1.0, 0.0, 0.0, 1.0);
const SELECTOR_PARAMS: LifParams = LifParams::new(0.0, 0.0, 1.0, 1.0);
const DEGREE_RECEIVER_PARAMS: LifParams = LifParams::new(0.0, 0.0, 1.0, 1.0);
const COUNTER_PARAMS: LifParams = LifParams::new(0.0, 0.0, 1.0, 1.0);

fn spike_once_params(round_start: usize) -> LifParams {
    LifParams::new(1.0, 0.0, 0.0, round_start as f64)
}

/// Builds the MDSA circuit for `graph` with `m` approximation rounds, seeding
/// the stimuli from `seed`.
pub fn build_network(graph: &Graph, m: usize, seed: u64) -> Result<Network, RunError> {
    graph.validate()?;
    let stimuli = StimulusBundle::generate(graph, seed)?;
    build_network_with_stimuli(graph, m, &stimuli)
}

/// Builds the MDSA circuit for `graph` from precomputed stimuli.
///
/// Each round `r` has, per node, a spike-once, a rand and a selector neuron,
/// and one degree receiver per candidate in the node's closed neighbourhood.
/// The receivers of an owner compete: each integrates the (negative) random
/// offset of its candidate, the candidate's key and a ramp of +1 per step
/// driven by the owner's selector, so the receiver with the largest key and
/// random value fires first and silences the selector. Keys are degrees in
/// round 0 and the previous round's marks afterwards. The last round's
/// receivers feed the counters.
pub fn build_network_with_stimuli(
    graph: &Graph,
    m: usize,
    stimuli: &StimulusBundle,
) -> Result<Network, RunError> {
    graph.validate()?;

    if stimuli.num_nodes() != graph.num_nodes {
        return Err(RunError::structural(format!(
            "stimuli cover {} nodes but the graph has {}",
            stimuli.num_nodes(),
            graph.num_nodes
        )));
    }

    let num_nodes = graph.num_nodes;
    let adjacency = graph.adjacency();
    let candidates = graph.closed_neighbourhoods();
    let key_weight = stimuli.spike_weight() as f64;

    let mut network = Network::new();

    let counter_nids: Vec<usize> = (0..num_nodes)
        .map(|node| network.add_neuron(Neuron::new(NeuronId::counter(node), COUNTER_PARAMS)))
        .collect();

    // (owner, candidate) -> nid of the previous round's receivers
    let mut prev_receivers: HashMap<(usize, usize), usize> = HashMap::default();

    for round in 0..m {
        let spike_once_params = spike_once_params(stimuli.round_start(round));

        let spike_once_nids: Vec<usize> = (0..num_nodes)
            .map(|node| {
                network.add_neuron(Neuron::new(
                    NeuronId::spike_once(node, round),
                    spike_once_params,
                ))
            })
            .collect();

        let rand_nids: Vec<usize> = (0..num_nodes)
            .map(|node| network.add_neuron(Neuron::new(NeuronId::rand(node, round), RAND_PARAMS)))
            .collect();

        let selector_nids: Vec<usize> = (0..num_nodes)
            .map(|node| {
                network.add_neuron(Neuron::new(
                    NeuronId::selector(node, round),
                    SELECTOR_PARAMS,
                ))
            })
            .collect();

        for node in 0..num_nodes {
            network.add_synapse(spike_once_nids[node], spike_once_nids[node], SELF_INHIBITION_WEIGHT);
            network.add_synapse(rand_nids[node], rand_nids[node], SELF_INHIBITION_WEIGHT);
            network.add_synapse(spike_once_nids[node], selector_nids[node], UNIT_WEIGHT);
        }

        let mut receivers: HashMap<(usize, usize), usize> = HashMap::default();

        for owner in 0..num_nodes {
            for &candidate in &candidates[owner] {
                let nid = network.add_neuron(Neuron::new(
                    NeuronId::degree_receiver(owner, candidate, round),
                    DEGREE_RECEIVER_PARAMS,
                ));
                receivers.insert((owner, candidate), nid);

                network.add_synapse(
                    rand_nids[candidate],
                    nid,
                    stimuli.initial_random_current[candidate],
                );
                network.add_synapse(selector_nids[owner], nid, UNIT_WEIGHT);
                network.add_synapse(nid, selector_nids[owner], SELECTOR_INHIBITION_WEIGHT);
                network.add_synapse(nid, nid, SELF_INHIBITION_WEIGHT);

                if round == 0 {
                    for &neighbour in &adjacency[candidate] {
                        network.add_synapse(spike_once_nids[neighbour], nid, key_weight);
                    }
                } else {
                    // every owner that could have marked the candidate
                    for &prev_owner in &candidates[candidate] {
                        let prev_nid = prev_receivers
                            .get(&(prev_owner, candidate))
                            .copied()
                            .ok_or_else(|| {
                                RunError::structural(format!(
                                    "missing {}",
                                    NeuronId::degree_receiver(prev_owner, candidate, round - 1)
                                ))
                            })?;
                        network.add_synapse(prev_nid, nid, key_weight);
                    }
                }
            }
        }

        prev_receivers = receivers;
    }

    let mut last_receivers: Vec<_> = prev_receivers.into_iter().collect();
    last_receivers.sort_unstable();

    for ((_, candidate), nid) in last_receivers {
        network.add_synapse(nid, counter_nids[candidate], UNIT_WEIGHT);
    }

    network.validate()?;

    debug!(
        "built network for {} nodes with m={}: {} neurons, {} synapses",
        num_nodes,
        m,
        network.num_neurons(),
        network.num_synapses()
    );

    Ok(network)
}
