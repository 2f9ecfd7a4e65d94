use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::types::HashSet;

/// Undirected simple graph over the nodes `0..num_nodes`.
///
/// Edges are kept exactly as supplied so that malformed input (self-loops,
/// duplicates) can be reported by [`Graph::validate`] instead of being
/// silently normalised away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub num_nodes: usize,
    pub edges: Vec<(usize, usize)>,
}

impl Graph {
    pub fn new(num_nodes: usize, edges: Vec<(usize, usize)>) -> Self {
        Self { num_nodes, edges }
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if self.num_nodes == 0 {
            return Err(RunError::structural("graph must have at least one node"));
        }

        let mut seen = HashSet::default();

        for &(a, b) in &self.edges {
            if a >= self.num_nodes || b >= self.num_nodes {
                return Err(RunError::structural(format!(
                    "edge ({}, {}) refers to a node outside 0..{}",
                    a, b, self.num_nodes
                )));
            }

            if a == b {
                return Err(RunError::structural(format!("self-loop on node {}", a)));
            }

            if !seen.insert((a.min(b), a.max(b))) {
                return Err(RunError::structural(format!("duplicate edge ({}, {})", a, b)));
            }
        }

        Ok(())
    }

    /// Sorted open neighbourhood of every node.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut result = vec![Vec::new(); self.num_nodes];

        for &(a, b) in &self.edges {
            result[a].push(b);
            result[b].push(a);
        }

        for neighbours in &mut result {
            neighbours.sort_unstable();
        }

        result
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency().iter().map(Vec::len).collect()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.edges
            .iter()
            .filter(|&&(a, b)| a == node || b == node)
            .count()
    }

    /// Sorted closed neighbourhood (the node itself plus its neighbours) of
    /// every node. These are the candidates a node chooses from in each round.
    pub fn closed_neighbourhoods(&self) -> Vec<Vec<usize>> {
        self.adjacency()
            .into_iter()
            .enumerate()
            .map(|(node, mut neighbours)| {
                neighbours.push(node);
                neighbours.sort_unstable();
                neighbours
            })
            .collect()
    }
}

pub const CATALOG_SIZES: [usize; 3] = [3, 4, 5];

/// The small graphs used for radiation experiments, by node count.
pub fn catalog(size: usize) -> Result<Vec<Graph>, RunError> {
    let graphs = match size {
        3 => vec![Graph::new(3, vec![(0, 1), (1, 2)])],
        4 => vec![
            // line
            Graph::new(4, vec![(0, 1), (1, 2), (2, 3)]),
            // Y
            Graph::new(4, vec![(0, 2), (1, 2), (2, 3)]),
            // square
            Graph::new(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)]),
        ],
        5 => vec![
            // line
            Graph::new(5, vec![(0, 1), (1, 2), (2, 3), (3, 4)]),
            // Y with long tail
            Graph::new(5, vec![(0, 2), (1, 2), (2, 3), (3, 4)]),
            // star
            Graph::new(5, vec![(0, 2), (1, 2), (3, 2), (4, 2)]),
            // pentagon
            Graph::new(5, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]),
            // square with tail
            Graph::new(5, vec![(0, 1), (1, 2), (2, 3), (3, 0), (3, 4)]),
        ],
        _ => {
            return Err(RunError::config(format!(
                "graph size {} is not supported, expected one of {:?}",
                size, CATALOG_SIZES
            )))
        }
    };

    Ok(graphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_util;
    use itertools::assert_equal;

    #[test]
    fn degrees_and_neighbourhoods() {
        let graph = test_util::path_graph();
        graph.validate().unwrap();

        assert_equal(graph.degrees(), [1, 2, 1]);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.adjacency(), vec![vec![1], vec![0, 2], vec![1]]);
        assert_eq!(
            graph.closed_neighbourhoods(),
            vec![vec![0, 1], vec![0, 1, 2], vec![1, 2]]
        );
    }

    #[test]
    fn isolated_node_is_its_own_candidate() {
        let graph = Graph::new(2, Vec::new());
        graph.validate().unwrap();

        assert_eq!(graph.closed_neighbourhoods(), vec![vec![0], vec![1]]);
    }

    #[test]
    fn duplicate_edge() {
        let graph = Graph::new(3, vec![(0, 1), (1, 2), (1, 0)]);
        let result = graph.validate();

        assert!(result.as_ref().unwrap_err().is_structural());
        assert_eq!(result.unwrap_err().as_str(), "duplicate edge (1, 0)");
    }

    #[test]
    fn self_loop() {
        let graph = Graph::new(3, vec![(0, 1), (2, 2)]);

        assert_eq!(graph.validate().unwrap_err().as_str(), "self-loop on node 2");
    }

    #[test]
    fn node_out_of_range() {
        let graph = Graph::new(2, vec![(0, 2)]);

        assert_eq!(
            graph.validate().unwrap_err().as_str(),
            "edge (0, 2) refers to a node outside 0..2"
        );
    }

    #[test]
    fn empty_graph() {
        assert!(Graph::new(0, Vec::new()).validate().is_err());
    }

    #[test]
    fn catalog_graphs_are_valid() {
        for size in CATALOG_SIZES {
            let graphs = catalog(size).unwrap();
            assert!(!graphs.is_empty());

            for graph in graphs {
                assert_eq!(graph.num_nodes, size);
                graph.validate().unwrap();
            }
        }

        assert_eq!(catalog(4).unwrap().len(), 3);
        assert_eq!(catalog(5).unwrap().len(), 5);
        assert!(catalog(6).unwrap_err().is_config());
    }
}
