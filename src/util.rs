use std::ops::Range;

pub fn get_partition_range(num_threads: usize, thread_id: usize, num_items: usize) -> Range<usize> {
    let min_partition_size = num_items / num_threads;
    let remainder = num_items % num_threads;

    if thread_id < remainder {
        let partition_size = min_partition_size + 1;
        let start = partition_size * thread_id;
        let end = start + partition_size;
        Range { start, end }
    } else {
        let start =
            (min_partition_size + 1) * remainder + min_partition_size * (thread_id - remainder);
        let end = start + min_partition_size;
        Range { start, end }
    }
}

/// Whether `value` holds an exact non-negative integer that fits a `usize`.
pub fn as_count(value: f64) -> Option<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Some(value as usize)
    } else {
        None
    }
}

#[cfg(test)]
pub mod test_util {
    use crate::graph::Graph;
    use crate::neuron::Role;
    use crate::params::{RadiationParams, RunParams};

    pub fn path_graph() -> Graph {
        Graph::new(3, vec![(0, 1), (1, 2)])
    }

    pub fn star_graph() -> Graph {
        Graph::new(4, vec![(0, 1), (0, 2), (0, 3)])
    }

    pub fn square_with_tail() -> Graph {
        Graph::new(5, vec![(0, 1), (1, 2), (2, 3), (3, 0), (3, 4)])
    }

    pub fn get_template_run_params() -> RunParams {
        RunParams {
            m: 1,
            seed: 42,
            sim_time: None,
            adaptation: false,
            radiation: Some(RadiationParams {
                neuron_death_probability: 0.1,
                roles: vec![Role::SpikeOnce, Role::DegreeReceiver, Role::Selector],
            }),
        }
    }
}
