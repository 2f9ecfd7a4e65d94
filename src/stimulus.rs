use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::graph::Graph;

pub const DEFAULT_DELTA: usize = 2;

/// Delta required when every neuron has a backup that may fire one step late.
pub const ADAPTATION_DELTA: usize = 3;

/// Steps between a round's winner emerging and the next round starting.
const ROUND_SLACK: usize = 5;

/// Random values and derived constants seeding one MDSA network.
///
/// All quantities are integers; weights derived from them are exact in `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusBundle {
    pub seed: u64,
    pub rand_ceiling: usize,
    pub delta: usize,
    pub inhibition: usize,
    pub rand_nrs: Vec<usize>,
    pub spread_rand_nrs: Vec<usize>,
    pub initial_random_current: Vec<f64>,
}

impl StimulusBundle {
    pub fn generate(graph: &Graph, seed: u64) -> Result<Self, RunError> {
        Self::generate_with_delta(graph, seed, DEFAULT_DELTA)
    }

    pub fn generate_with_delta(graph: &Graph, seed: u64, delta: usize) -> Result<Self, RunError> {
        let num_nodes = graph.num_nodes;

        if num_nodes < 1 {
            return Err(RunError::structural(
                "cannot generate stimuli for a graph without nodes",
            ));
        }

        if delta < DEFAULT_DELTA {
            return Err(RunError::config(format!(
                "delta must be at least {}",
                DEFAULT_DELTA
            )));
        }

        let rand_ceiling = num_nodes;
        let spike_weight = rand_ceiling * delta + 1;
        let inhibition = num_nodes * spike_weight + rand_ceiling * delta + 1;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut rand_nrs: Vec<usize> = (0..rand_ceiling).collect();
        rand_nrs.shuffle(&mut rng);

        let spread_rand_nrs: Vec<usize> = rand_nrs.iter().map(|x| x * delta).collect();
        let initial_random_current = spread_rand_nrs
            .iter()
            .map(|&x| x as f64 - inhibition as f64)
            .collect();

        debug!(
            "stimuli for {} nodes: seed={}, delta={}, inhibition={}, rand_nrs={:?}",
            num_nodes, seed, delta, inhibition, rand_nrs
        );

        Ok(Self {
            seed,
            rand_ceiling,
            delta,
            inhibition,
            rand_nrs,
            spread_rand_nrs,
            initial_random_current,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.rand_nrs.len()
    }

    /// Weight of one unit of comparison key (degree or mark count). Larger
    /// than any difference of two spread values, so keys dominate and the
    /// random values only break ties.
    pub fn spike_weight(&self) -> usize {
        self.rand_ceiling * self.delta + 1
    }

    pub fn round_period(&self) -> usize {
        self.inhibition + ROUND_SLACK
    }

    /// Step at which the spike-once neurons of `round` fire.
    pub fn round_start(&self, round: usize) -> usize {
        2 + round * self.round_period()
    }

    /// Smallest `sim_time` whose padded horizon delivers every counter input
    /// of an `m`-round network.
    pub fn required_sim_time(&self, m: usize) -> usize {
        m * self.round_period()
    }
}
