use std::sync::mpsc::channel as mpsc_channel;
use std::thread;

use core_affinity::CoreId;
use itertools::iproduct;
use log::info;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::RunError;
use crate::graph::{self, Graph};
use crate::params::{self, RunParams, SweepParams};
use crate::run::{execute_run, RunResult};
use crate::util::get_partition_range;

/// One independent run of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub graph_size: usize,
    pub graph_index: usize,
    pub graph: Graph,
    pub run_params: RunParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub num_runs: usize,
    pub pass_rate: Option<f64>,
    pub adapted_pass_rate: Option<f64>,
    pub damaged_pass_rate: Option<f64>,
    pub mean_dead_neurons: Option<f64>,
    pub std_dev_dead_neurons: Option<f64>,
}

/// Expands the sweep axes into run configurations, graph by graph.
pub fn expand(sweep_params: &SweepParams) -> Result<Vec<RunConfig>, RunError> {
    params::validate_sweep_params(sweep_params).map_err(RunError::Config)?;

    let mut result = Vec::new();

    for &graph_size in &sweep_params.graph_sizes {
        for (graph_index, graph) in graph::catalog(graph_size)?.into_iter().enumerate() {
            for (&m, &seed, &adaptation, radiation) in iproduct!(
                &sweep_params.m_vals,
                &sweep_params.seeds,
                &sweep_params.adaptations,
                &sweep_params.radiations
            ) {
                result.push(RunConfig {
                    graph_size,
                    graph_index,
                    graph: graph.clone(),
                    run_params: RunParams {
                        m,
                        seed,
                        sim_time: None,
                        adaptation,
                        radiation: radiation.clone(),
                    },
                });
            }
        }
    }

    Ok(result)
}

/// Executes every configuration of the sweep on worker threads and returns
/// the results in configuration order. The first failing run aborts the
/// sweep with its error.
pub fn run_sweep(sweep_params: &SweepParams) -> Result<Vec<RunResult>, RunError> {
    let configs = expand(sweep_params)?;
    let num_threads = sweep_params
        .technical_params
        .num_threads
        .unwrap_or_else(num_cpus::get)
        .min(configs.len().max(1));
    let pin_threads = sweep_params.technical_params.pin_threads;

    info!(
        "running {} configurations on {} threads",
        configs.len(),
        num_threads
    );

    let (result_tx, result_rx) = mpsc_channel();
    let mut join_handles = Vec::new();

    for thread_id in 0..num_threads {
        let range = get_partition_range(num_threads, thread_id, configs.len());
        let partition = configs[range.clone()].to_vec();
        let result_tx = result_tx.clone();

        join_handles.push(thread::spawn(move || {
            if pin_threads {
                core_affinity::set_for_current(CoreId { id: thread_id });
            }

            for (config_idx, config) in range.zip(partition) {
                let result = execute_run(&config.graph, &config.run_params);
                let is_err = result.is_err();

                if result_tx.send((config_idx, result)).is_err() || is_err {
                    break;
                }
            }
        }));
    }

    drop(result_tx);

    let mut slots: Vec<Option<RunResult>> = vec![None; configs.len()];
    let mut first_error: Option<(usize, RunError)> = None;

    for (config_idx, result) in result_rx {
        match result {
            Ok(run_result) => slots[config_idx] = Some(run_result),
            Err(err) => {
                if first_error
                    .as_ref()
                    .map_or(true, |(error_idx, _)| config_idx < *error_idx)
                {
                    first_error = Some((config_idx, err));
                }
            }
        }
    }

    for join_handle in join_handles {
        if join_handle.join().is_err() {
            return Err(RunError::structural("sweep worker thread panicked"));
        }
    }

    if let Some((_, err)) = first_error {
        return Err(err);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(config_idx, slot)| {
            slot.ok_or_else(|| {
                RunError::structural(format!("no result for configuration {}", config_idx))
            })
        })
        .collect()
}

pub fn summarize(results: &[RunResult]) -> SweepSummary {
    let dead_counts: Vec<f64> = results
        .iter()
        .map(|result| result.dead_neurons.len() as f64)
        .collect();

    SweepSummary {
        num_runs: results.len(),
        pass_rate: rate(results.iter().map(|result| Some(result.passed))),
        adapted_pass_rate: rate(results.iter().map(|result| result.adapted_passed)),
        damaged_pass_rate: rate(results.iter().map(|result| result.damaged_passed)),
        mean_dead_neurons: if dead_counts.is_empty() {
            None
        } else {
            Some(dead_counts.iter().mean())
        },
        std_dev_dead_neurons: if dead_counts.len() < 2 {
            None
        } else {
            Some(dead_counts.iter().std_dev())
        },
    }
}

fn rate(outcomes: impl Iterator<Item = Option<bool>>) -> Option<f64> {
    let outcomes: Vec<bool> = outcomes.flatten().collect();

    if outcomes.is_empty() {
        return None;
    }

    let passed = outcomes.iter().filter(|&&passed| passed).count();
    Some(passed as f64 / outcomes.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{RadiationParams, TechnicalParams};
    use crate::neuron::Role;
    use float_cmp::assert_approx_eq;

    fn get_template_sweep_params() -> SweepParams {
        SweepParams {
            graph_sizes: vec![3, 4],
            m_vals: vec![1, 2],
            seeds: vec![0, 1],
            adaptations: vec![false],
            radiations: vec![
                None,
                Some(RadiationParams {
                    neuron_death_probability: 0.2,
                    roles: vec![Role::SpikeOnce, Role::DegreeReceiver, Role::Selector],
                }),
            ],
            technical_params: TechnicalParams {
                num_threads: Some(1),
                pin_threads: false,
            },
        }
    }

    #[test]
    fn expand_axes() {
        let configs = expand(&get_template_sweep_params()).unwrap();

        // (1 + 3 graphs) x 2 m x 2 seeds x 1 adaptation x 2 radiations
        assert_eq!(configs.len(), 32);
        assert_eq!(configs[0].graph_size, 3);
        assert_eq!(configs[0].run_params.m, 1);
        assert!(configs[0].run_params.radiation.is_none());
        assert!(configs[1].run_params.radiation.is_some());
        assert_eq!(configs[31].graph_size, 4);
        assert_eq!(configs[31].graph_index, 2);
    }

    #[test]
    fn invalid_sweep_rejected() {
        let mut params = get_template_sweep_params();
        params.graph_sizes = vec![9];

        assert!(run_sweep(&params).unwrap_err().is_config());
    }

    #[test]
    fn sweep_matches_sequential_runs() {
        let params = get_template_sweep_params();
        let results = run_sweep(&params).unwrap();
        let configs = expand(&params).unwrap();

        assert_eq!(results.len(), configs.len());

        for (result, config) in results.iter().zip(&configs) {
            assert_eq!(result, &execute_run(&config.graph, &config.run_params).unwrap());
            assert!(result.passed);
        }
    }

    #[test]
    fn summary() {
        let mut params = get_template_sweep_params();
        params.graph_sizes = vec![3];
        params.m_vals = vec![1];
        params.radiations = vec![None];
        let results = run_sweep(&params).unwrap();
        let sut = summarize(&results);

        assert_eq!(sut.num_runs, 2);
        assert_approx_eq!(f64, sut.pass_rate.unwrap(), 1.0);
        assert_eq!(sut.adapted_pass_rate, None);
        assert_eq!(sut.damaged_pass_rate, None);
        assert_approx_eq!(f64, sut.mean_dead_neurons.unwrap(), 0.0);
        assert_approx_eq!(f64, sut.std_dev_dead_neurons.unwrap(), 0.0);

        let empty = summarize(&[]);
        assert_eq!(empty.num_runs, 0);
        assert_eq!(empty.pass_rate, None);
        assert_eq!(empty.mean_dead_neurons, None);
    }
}
