use log::trace;

use crate::error::RunError;
use crate::graph::Graph;
use crate::stimulus::StimulusBundle;

/// Computes the marks of the last of `m` rounds directly from the graph.
///
/// In every round each node marks the node of its closed neighbourhood with
/// the largest key, breaking ties by the larger random value. Keys start as
/// degrees and become the number of marks collected in the previous round.
/// Zero rounds yield all-zero marks.
pub fn reference_marks(
    graph: &Graph,
    m: usize,
    stimuli: &StimulusBundle,
) -> Result<Vec<usize>, RunError> {
    graph.validate()?;

    let num_nodes = graph.num_nodes;

    if stimuli.rand_nrs.len() != num_nodes {
        return Err(RunError::structural(format!(
            "{} random values for {} nodes",
            stimuli.rand_nrs.len(),
            num_nodes
        )));
    }

    // Each node sees its own and its neighbours' (key, random value) pairs.
    let mut neighbourhoods: Vec<Vec<usize>> = (0..num_nodes).map(|node| vec![node]).collect();
    for &(a, b) in &graph.edges {
        neighbourhoods[a].push(b);
        neighbourhoods[b].push(a);
    }

    let mut keys: Vec<usize> = neighbourhoods.iter().map(|n| n.len() - 1).collect();
    let mut marks = vec![0; num_nodes];

    for round in 0..m {
        marks = vec![0; num_nodes];

        for neighbourhood in &neighbourhoods {
            let chosen = select(neighbourhood, &keys, &stimuli.rand_nrs)?;
            marks[chosen] += 1;
        }

        trace!("reference round {}: keys={:?} marks={:?}", round, keys, marks);
        keys = marks.clone();
    }

    Ok(marks)
}

fn select(neighbourhood: &[usize], keys: &[usize], rand_nrs: &[usize]) -> Result<usize, RunError> {
    let mut best = neighbourhood[0];

    for &node in &neighbourhood[1..] {
        let candidate = (keys[node], rand_nrs[node]);
        let current = (keys[best], rand_nrs[best]);

        if candidate == current {
            return Err(RunError::structural(format!(
                "nodes {} and {} cannot be told apart",
                best, node
            )));
        }

        if candidate > current {
            best = node;
        }
    }

    Ok(best)
}
