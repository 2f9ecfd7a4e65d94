use log::debug;

use crate::error::RunError;
use crate::network::Network;
use crate::neuron::{LifParams, Neuron, Role};
use crate::synapse::BACKUP_INHIBITION_WEIGHT;

fn backup_params(primary: &Neuron) -> LifParams {
    let mut params = primary.params();

    // selectors must still start from the single spike-once input
    if primary.role() != Role::Selector {
        params.threshold += 1.0;
    }

    params
}

/// Returns a copy of `network` in which every neuron except the counters has
/// a backup.
///
/// A backup receives the inputs of its primary, from primaries and backups
/// alike, and projects wherever its primary projects. Its threshold is one
/// higher and its primary inhibits it on firing, so while the primary works
/// the backup stays silent; if the primary is dead the backup fires one step
/// late in its place. Selector backups share the primary threshold and fire
/// together with their primary once before being silenced.
pub fn add_redundancy(network: &Network) -> Result<Network, RunError> {
    network.validate()?;

    if network.neurons.iter().any(|neuron| neuron.id.backup) {
        return Err(RunError::structural("network already has backup neurons"));
    }

    let mut result = network.clone();
    let mut backup_nids: Vec<Option<usize>> = vec![None; network.num_neurons()];

    for (nid, primary) in network.neurons.iter().enumerate() {
        if primary.role() == Role::Counter {
            continue;
        }

        let backup_nid =
            result.add_neuron(Neuron::new(primary.id.to_backup(), backup_params(primary)));
        result.add_synapse(nid, backup_nid, BACKUP_INHIBITION_WEIGHT);
        backup_nids[nid] = Some(backup_nid);
    }

    for synapse in &network.synapses {
        let pre_backup = backup_nids[synapse.pre_syn_nid];
        let post_backup = backup_nids[synapse.post_syn_nid];

        if synapse.is_self_synapse() {
            if let Some(backup_nid) = pre_backup {
                result.add_synapse(backup_nid, backup_nid, synapse.weight);
            }
            continue;
        }

        if let Some(pre_backup) = pre_backup {
            result.add_synapse(pre_backup, synapse.post_syn_nid, synapse.weight);
        }

        if let Some(post_backup) = post_backup {
            result.add_synapse(synapse.pre_syn_nid, post_backup, synapse.weight);
        }

        if let (Some(pre_backup), Some(post_backup)) = (pre_backup, post_backup) {
            result.add_synapse(pre_backup, post_backup, synapse.weight);
        }
    }

    result.validate()?;

    debug!(
        "added redundancy: {} -> {} neurons, {} -> {} synapses",
        network.num_neurons(),
        result.num_neurons(),
        network.num_synapses(),
        result.num_synapses()
    );

    Ok(result)
}
