use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::adaptation::add_redundancy;
use crate::builder::build_network_with_stimuli;
use crate::error::RunError;
use crate::faults::inject_faults;
use crate::graph::Graph;
use crate::neuron::NeuronId;
use crate::params::{self, RunParams};
use crate::reference::reference_marks;
use crate::simulation::simulate;
use crate::stimulus::{StimulusBundle, ADAPTATION_DELTA, DEFAULT_DELTA};
use crate::validation::compare;

/// Outcome of one run. Mismatches are recorded in the `*_passed` flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub graph: Graph,
    pub seed: u64,
    pub m: usize,
    pub sim_time: usize,
    pub adaptation: bool,
    pub neuron_death_probability: Option<f64>,
    pub rand_nrs: Vec<usize>,
    pub dead_neurons: Vec<NeuronId>,
    pub reference_counts: Vec<usize>,
    pub simulated_counts: Vec<usize>,
    pub adapted_counts: Option<Vec<usize>>,
    pub damaged_counts: Option<Vec<usize>>,
    pub passed: bool,
    pub adapted_passed: Option<bool>,
    pub damaged_passed: Option<bool>,
}

impl RunResult {
    /// Whether every comparison that was made matched the reference.
    pub fn all_passed(&self) -> bool {
        self.passed && self.adapted_passed.unwrap_or(true) && self.damaged_passed.unwrap_or(true)
    }
}

/// Runs the whole pipeline on `graph`: stimuli, network, reference, plain
/// simulation and, as configured, the adapted and the damaged simulation.
///
/// Radiation damages the adapted network when adaptation is enabled and the
/// plain one otherwise; the damaged comparison is skipped if no neuron died.
pub fn execute_run(graph: &Graph, run_params: &RunParams) -> Result<RunResult, RunError> {
    params::validate_run_params(run_params).map_err(RunError::Config)?;
    graph.validate()?;

    let num_nodes = graph.num_nodes;
    let m = run_params.m;
    let seed = run_params.seed;

    let delta = if run_params.adaptation {
        ADAPTATION_DELTA
    } else {
        DEFAULT_DELTA
    };
    let stimuli = StimulusBundle::generate_with_delta(graph, seed, delta)?;
    let sim_time = resolve_sim_time(run_params, &stimuli)?;

    let network = build_network_with_stimuli(graph, m, &stimuli)?;
    let reference_counts = reference_marks(graph, m, &stimuli)?;

    let simulated_counts = simulate(&network, sim_time)?.final_counts(num_nodes)?;
    let passed = compare(&reference_counts, &simulated_counts)?;

    let adapted_network = if run_params.adaptation {
        Some(add_redundancy(&network)?)
    } else {
        None
    };

    let mut adapted_counts = None;
    let mut adapted_passed = None;

    if let Some(adapted_network) = &adapted_network {
        let counts = simulate(adapted_network, sim_time)?.final_counts(num_nodes)?;
        adapted_passed = Some(compare(&reference_counts, &counts)?);
        adapted_counts = Some(counts);
    }

    let mut dead_neurons = Vec::new();
    let mut damaged_counts = None;
    let mut damaged_passed = None;

    if let Some(radiation_params) = &run_params.radiation {
        let target = adapted_network.as_ref().unwrap_or(&network);
        let (damaged_network, dead_ids) = inject_faults(
            target,
            radiation_params.neuron_death_probability,
            seed,
            Some(radiation_params.roles.as_slice()),
        )?;

        if dead_ids.is_empty() {
            debug!("no neuron died, skipping the damaged simulation");
        } else {
            let counts = simulate(&damaged_network, sim_time)?.final_counts(num_nodes)?;
            damaged_passed = Some(compare(&reference_counts, &counts)?);
            damaged_counts = Some(counts);
        }

        dead_neurons = dead_ids;
    }

    let result = RunResult {
        graph: graph.clone(),
        seed,
        m,
        sim_time,
        adaptation: run_params.adaptation,
        neuron_death_probability: run_params
            .radiation
            .as_ref()
            .map(|radiation_params| radiation_params.neuron_death_probability),
        rand_nrs: stimuli.rand_nrs,
        dead_neurons,
        reference_counts,
        simulated_counts,
        adapted_counts,
        damaged_counts,
        passed,
        adapted_passed,
        damaged_passed,
    };

    if !result.passed {
        warn!(
            "simulation of {:?} with seed {} and m={} does not match the reference",
            result.graph.edges, seed, m
        );
    }

    info!(
        "run on {} nodes, m={}, seed={}: passed={}, adapted_passed={:?}, damaged_passed={:?}, {} dead",
        num_nodes,
        m,
        seed,
        result.passed,
        result.adapted_passed,
        result.damaged_passed,
        result.dead_neurons.len()
    );

    Ok(result)
}

fn resolve_sim_time(run_params: &RunParams, stimuli: &StimulusBundle) -> Result<usize, RunError> {
    let required = stimuli.required_sim_time(run_params.m);

    match run_params.sim_time {
        Some(sim_time) if sim_time < required => Err(RunError::config(format!(
            "sim_time must be at least {} to resolve {} rounds",
            required, run_params.m
        ))),
        Some(sim_time) => Ok(sim_time),
        None => Ok(required),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::Role;
    use crate::params::RadiationParams;
    use crate::util::test_util;
    use itertools::assert_equal;

    #[test]
    fn undamaged_run_matches() {
        let mut params = test_util::get_template_run_params();
        params.radiation = None;
        let result = execute_run(&test_util::path_graph(), &params).unwrap();

        assert_equal(&result.reference_counts, &result.simulated_counts);
        assert_eq!(result.simulated_counts, vec![0, 3, 0]);
        assert!(result.passed);
        assert!(result.all_passed());
        assert_eq!(result.sim_time, 33);
        assert_eq!(result.adapted_passed, None);
        assert_eq!(result.damaged_passed, None);
        assert!(result.dead_neurons.is_empty());
    }

    #[test]
    fn adapted_run_matches() {
        let mut params = test_util::get_template_run_params();
        params.adaptation = true;
        params.radiation = None;
        let result = execute_run(&test_util::star_graph(), &params).unwrap();

        assert_eq!(result.reference_counts, vec![4, 0, 0, 0]);
        assert_eq!(result.adapted_counts, Some(vec![4, 0, 0, 0]));
        assert_eq!(result.adapted_passed, Some(true));
        assert!(result.passed);
    }

    #[test]
    fn spike_once_faults_mismatch() {
        let mut params = test_util::get_template_run_params();
        params.radiation = Some(RadiationParams {
            neuron_death_probability: 1.0,
            roles: vec![Role::SpikeOnce],
        });
        let result = execute_run(&test_util::path_graph(), &params).unwrap();

        assert!(result.passed);
        assert_eq!(result.dead_neurons.len(), 3);
        assert_eq!(result.damaged_counts, Some(vec![0, 0, 0]));
        assert_eq!(result.damaged_passed, Some(false));
        assert!(!result.all_passed());
    }

    #[test]
    fn no_deaths_skip_damaged_comparison() {
        let mut params = test_util::get_template_run_params();
        params.radiation.as_mut().unwrap().neuron_death_probability = 0.0;
        let result = execute_run(&test_util::path_graph(), &params).unwrap();

        assert_eq!(result.neuron_death_probability, Some(0.0));
        assert!(result.dead_neurons.is_empty());
        assert_eq!(result.damaged_counts, None);
        assert_eq!(result.damaged_passed, None);
    }

    #[test]
    fn short_sim_time_rejected() {
        let mut params = test_util::get_template_run_params();
        params.sim_time = Some(10);
        let err = execute_run(&test_util::path_graph(), &params).unwrap_err();

        assert!(err.is_config());
        assert_eq!(err.as_str(), "sim_time must be at least 33 to resolve 1 rounds");
    }

    #[test]
    fn invalid_params_rejected() {
        let mut params = test_util::get_template_run_params();
        params.radiation.as_mut().unwrap().neuron_death_probability = 1.5;

        assert!(execute_run(&test_util::path_graph(), &params)
            .unwrap_err()
            .is_config());
    }
}
