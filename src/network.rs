use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::neuron::{Neuron, NeuronId, Role};
use crate::synapse::Synapse;
use crate::types::{HashMap, HashSet};

/// Neurons and synapses of one MDSA circuit. Synapses refer to neurons by
/// their index in `neurons`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub neurons: Vec<Neuron>,
    pub synapses: Vec<Synapse>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_neuron(&mut self, neuron: Neuron) -> usize {
        self.neurons.push(neuron);
        self.neurons.len() - 1
    }

    pub fn add_synapse(&mut self, pre_syn_nid: usize, post_syn_nid: usize, weight: f64) {
        self.synapses
            .push(Synapse::new(pre_syn_nid, post_syn_nid, weight));
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    pub fn num_synapses(&self) -> usize {
        self.synapses.len()
    }

    pub fn id_to_nid(&self) -> HashMap<NeuronId, usize> {
        self.neurons
            .iter()
            .enumerate()
            .map(|(nid, neuron)| (neuron.id, nid))
            .collect()
    }

    pub fn find(&self, id: &NeuronId) -> Option<usize> {
        self.neurons.iter().position(|neuron| neuron.id == *id)
    }

    pub fn neuron(&self, id: &NeuronId) -> Option<&Neuron> {
        self.neurons.iter().find(|neuron| neuron.id == *id)
    }

    pub fn neurons_with_role(&self, role: Role) -> impl Iterator<Item = &Neuron> {
        self.neurons.iter().filter(move |neuron| neuron.role() == role)
    }

    pub fn dead_ids(&self) -> Vec<NeuronId> {
        self.neurons
            .iter()
            .filter(|neuron| neuron.is_dead)
            .map(|neuron| neuron.id)
            .collect()
    }

    /// Outgoing synapses of every neuron, as `(post_syn_nid, weight)` pairs.
    pub fn outgoing(&self) -> Vec<Vec<(usize, f64)>> {
        let mut result = vec![Vec::new(); self.neurons.len()];

        for synapse in &self.synapses {
            result[synapse.pre_syn_nid].push((synapse.post_syn_nid, synapse.weight));
        }

        result
    }

    /// Checks the structural contract the simulation relies on.
    pub fn validate(&self) -> Result<(), RunError> {
        let mut seen_ids = HashSet::default();

        for neuron in &self.neurons {
            if !neuron.has_valid_params() {
                return Err(RunError::structural(format!(
                    "neuron {} has invalid parameters: {:?}",
                    neuron.id,
                    neuron.params()
                )));
            }

            if !seen_ids.insert(neuron.id) {
                return Err(RunError::structural(format!(
                    "duplicate neuron {}",
                    neuron.id
                )));
            }
        }

        let mut seen_pairs = HashSet::default();

        for synapse in &self.synapses {
            if synapse.pre_syn_nid >= self.neurons.len()
                || synapse.post_syn_nid >= self.neurons.len()
            {
                return Err(RunError::structural(format!(
                    "synapse {} -> {} refers to a missing neuron",
                    synapse.pre_syn_nid, synapse.post_syn_nid
                )));
            }

            if !synapse.weight.is_finite() {
                return Err(RunError::structural(format!(
                    "synapse {} -> {} has invalid weight {}",
                    self.neurons[synapse.pre_syn_nid].id,
                    self.neurons[synapse.post_syn_nid].id,
                    synapse.weight
                )));
            }

            if !seen_pairs.insert((synapse.pre_syn_nid, synapse.post_syn_nid)) {
                return Err(RunError::structural(format!(
                    "duplicate synapse {} -> {}",
                    self.neurons[synapse.pre_syn_nid].id, self.neurons[synapse.post_syn_nid].id
                )));
            }
        }

        self.validate_reachability()
    }

    /// Every spike-once and rand neuron must reach the counter of its node.
    fn validate_reachability(&self) -> Result<(), RunError> {
        let mut incoming = vec![Vec::new(); self.neurons.len()];

        for synapse in &self.synapses {
            incoming[synapse.post_syn_nid].push(synapse.pre_syn_nid);
        }

        let counters: HashMap<usize, usize> = self
            .neurons
            .iter()
            .enumerate()
            .filter(|(_, neuron)| neuron.role() == Role::Counter)
            .map(|(nid, neuron)| (neuron.id.node, nid))
            .collect();

        let mut reaches_counter: HashMap<usize, Vec<bool>> = HashMap::default();

        for (nid, neuron) in self.neurons.iter().enumerate() {
            if !matches!(neuron.role(), Role::SpikeOnce | Role::Rand) {
                continue;
            }

            let node = neuron.id.node;

            if !reaches_counter.contains_key(&node) {
                let Some(&counter_nid) = counters.get(&node) else {
                    return Err(RunError::structural(format!(
                        "node {} has sources but no counter",
                        node
                    )));
                };

                reaches_counter.insert(node, reverse_reachable(&incoming, counter_nid));
            }

            if !reaches_counter[&node][nid] {
                return Err(RunError::structural(format!(
                    "neuron {} does not reach counter_{}",
                    neuron.id, node
                )));
            }
        }

        Ok(())
    }
}

fn reverse_reachable(incoming: &[Vec<usize>], target: usize) -> Vec<bool> {
    let mut visited = vec![false; incoming.len()];
    let mut queue = VecDeque::from([target]);
    visited[target] = true;

    while let Some(nid) = queue.pop_front() {
        for &pre_syn_nid in &incoming[nid] {
            if !visited[pre_syn_nid] {
                visited[pre_syn_nid] = true;
                queue.push_back(pre_syn_nid);
            }
        }
    }

    visited
}
