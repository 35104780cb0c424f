//! Index-based adjacency views used by the algorithms.
//!
//! Positions are petgraph node indexes, so results line up with the
//! insertion order of the source graph. Neighbor lists are sorted.

use crate::graph::{CitationGraph, CollaborationGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    directed: bool,
    lists: Vec<Vec<(usize, f64)>>,
    /// Self-loop weight per node (undirected views only).
    loops: Vec<f64>,
}

impl Adjacency {
    fn with_nodes(n: usize, directed: bool) -> Self {
        Self {
            directed,
            lists: vec![Vec::new(); n],
            loops: vec![0.0; n],
        }
    }

    fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        if self.directed {
            self.lists[a].push((b, weight));
        } else if a == b {
            self.loops[a] += weight;
        } else {
            self.lists[a].push((b, weight));
            self.lists[b].push((a, weight));
        }
    }

    fn finish(mut self) -> Self {
        for list in &mut self.lists {
            list.sort_by_key(|(neighbor, _)| *neighbor);
        }
        self
    }

    /// Undirected view of the collaboration graph. Unweighted views give
    /// every edge weight 1.
    pub fn collaboration(graph: &CollaborationGraph, weighted: bool) -> Self {
        let mut adj = Self::with_nodes(graph.node_count(), false);
        for edge_ref in graph.graph.edge_references() {
            let weight = if weighted {
                edge_ref.weight().weight as f64
            } else {
                1.0
            };
            adj.add_edge(edge_ref.source().index(), edge_ref.target().index(), weight);
        }
        adj.finish()
    }

    /// Directed view of the citation graph (out-neighbors).
    pub fn citations(graph: &CitationGraph) -> Self {
        let mut adj = Self::with_nodes(graph.node_count(), true);
        for edge_ref in graph.graph.edge_references() {
            adj.add_edge(edge_ref.source().index(), edge_ref.target().index(), 1.0);
        }
        adj.finish()
    }

    /// Undirected projection of the citation graph. Mutual citations
    /// collapse into one edge; self-citations stay as loops.
    pub fn citation_projection(graph: &CitationGraph) -> Self {
        let mut adj = Self::with_nodes(graph.node_count(), false);
        let mut seen = HashSet::new();
        for edge_ref in graph.graph.edge_references() {
            let (a, b) = (edge_ref.source().index(), edge_ref.target().index());
            if seen.insert((a.min(b), a.max(b))) {
                adj.add_edge(a, b, 1.0);
            }
        }
        adj.finish()
    }

    /// Builds a view straight from index pairs.
    #[cfg(test)]
    pub(crate) fn from_edges(n: usize, directed: bool, edges: &[(usize, usize)]) -> Self {
        let mut adj = Self::with_nodes(n, directed);
        for &(a, b) in edges {
            adj.add_edge(a, b, 1.0);
        }
        adj.finish()
    }

    pub fn node_count(&self) -> usize {
        self.lists.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Out-neighbors (directed) or neighbors (undirected), excluding
    /// undirected self-loops.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.lists[node].iter().map(|(neighbor, _)| *neighbor)
    }

    pub fn weighted_neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.lists[node]
    }

    /// Weight of the node's self-loop, 0 if none.
    pub fn self_loop(&self, node: usize) -> f64 {
        self.loops[node]
    }

    /// Weighted degree, counting a self-loop twice.
    pub fn strength(&self, node: usize) -> f64 {
        self.lists[node].iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self.loops[node]
    }

    /// Number of edges with both ends in `members`, self-loops included.
    pub fn edges_within(&self, members: &[usize]) -> usize {
        let set: HashSet<usize> = members.iter().copied().collect();
        let mut count = 0;
        for &node in members {
            count += self.lists[node]
                .iter()
                .filter(|(neighbor, _)| set.contains(neighbor) && (self.directed || node < *neighbor))
                .count();
            if self.loops[node] > 0.0 {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CitationEdge, DocumentNode};

    fn citation_graph(edges: &[(i64, i64)], n: i64) -> CitationGraph {
        let mut graph = CitationGraph::new();
        for id in 1..=n {
            graph.add_document(DocumentNode {
                id,
                title: String::new(),
                authors: Vec::new(),
                year: None,
                journal: None,
            });
        }
        for &(a, b) in edges {
            graph.add_citation(
                a,
                b,
                CitationEdge {
                    citation_text: String::new(),
                },
            );
        }
        graph
    }

    #[test]
    fn test_projection_collapses_mutual_citations() {
        let graph = citation_graph(&[(1, 2), (2, 1), (2, 3), (3, 3)], 3);
        let adj = Adjacency::citation_projection(&graph);

        assert_eq!(adj.neighbors(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(adj.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(adj.self_loop(2), 1.0);
        assert_eq!(adj.strength(2), 3.0);
        assert_eq!(adj.edges_within(&[0, 1, 2]), 3);
    }

    #[test]
    fn test_directed_view_keeps_direction() {
        let graph = citation_graph(&[(1, 2), (3, 2)], 3);
        let adj = Adjacency::citations(&graph);

        assert!(adj.is_directed());
        assert_eq!(adj.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(adj.neighbors(1).count(), 0);
    }
}
