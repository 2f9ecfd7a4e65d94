use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::RunError;
use crate::network::Network;
use crate::neuron::{NeuronId, Role};

/// Simulates radiation damage on a copy of `network`.
///
/// One uniform value in `[0, 1)` is drawn per neuron in network order, for
/// every neuron regardless of `roles`, and a neuron dies if its value is below
/// `probability` and its role is eligible (`None` makes all roles eligible).
/// For a fixed seed the dead set therefore only grows with the probability.
/// Returns the damaged network and the neurons killed by this call, in
/// network order; neurons that were already dead are left as they are.
pub fn inject_faults(
    network: &Network,
    probability: f64,
    seed: u64,
    roles: Option<&[Role]>,
) -> Result<(Network, Vec<NeuronId>), RunError> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(RunError::config(
            "neuron_death_probability must be in [0, 1]",
        ));
    }

    if roles.map_or(false, |roles| roles.is_empty()) {
        return Err(RunError::config("fault injection roles must not be empty"));
    }

    let is_eligible = |role: Role| roles.map_or(true, |roles| roles.contains(&role));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut damaged = network.clone();
    let mut dead_ids = Vec::new();

    for neuron in damaged.neurons.iter_mut() {
        let draw: f64 = rng.gen();

        if draw < probability && is_eligible(neuron.role()) && neuron.kill() {
            dead_ids.push(neuron.id);
        }
    }

    for role in Role::ALL.into_iter().filter(|role| is_eligible(*role)) {
        let mut neurons = damaged.neurons_with_role(role).peekable();

        if neurons.peek().is_some() && neurons.all(|neuron| neuron.is_dead) {
            warn!(
                "all {} neurons are dead, the circuit cannot complete",
                role
            );
        }
    }

    debug!(
        "killed {} of {} neurons with p={} (seed {})",
        dead_ids.len(),
        network.num_neurons(),
        probability,
        seed
    );

    Ok((damaged, dead_ids))
}
