//! Graph data structures.
//!
//! Both graphs wrap petgraph and keep an index from the domain identity
//! (document id, author name) to the graph index. Nodes are never removed,
//! so node indexes follow insertion order and every tie-break in the
//! analytics falls back to that order.

use crate::model::{AuthorNode, CitationEdge, CollaborationEdge, DocumentNode, PaperRef};
use bibnet_core::DocumentId;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;

/// Index of a node in either graph.
pub type NodeId = NodeIndex;

/// Directed citation graph: an edge A -> B means A cites B.
#[derive(Debug, Clone, Default)]
pub struct CitationGraph {
    pub(crate) graph: DiGraph<DocumentNode, CitationEdge>,

    /// Maps document ids to graph node indexes.
    id_index: HashMap<DocumentId, NodeId>,
}

impl CitationGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document node. A repeated id replaces the stored attributes
    /// and keeps the original index.
    pub fn add_document(&mut self, node: DocumentNode) -> NodeId {
        if let Some(&index) = self.id_index.get(&node.id) {
            self.graph[index] = node;
            return index;
        }
        let id = node.id;
        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        index
    }

    /// Adds a citation between two known documents.
    ///
    /// Returns false when either end is not in the graph. A second citation
    /// between the same pair replaces the first one's text; self-citations
    /// are kept as loops.
    pub fn add_citation(&mut self, citing: DocumentId, cited: DocumentId, edge: CitationEdge) -> bool {
        let (Some(&from), Some(&to)) = (self.id_index.get(&citing), self.id_index.get(&cited)) else {
            return false;
        };
        match self.graph.find_edge(from, to) {
            Some(existing) => self.graph[existing] = edge,
            None => {
                self.graph.add_edge(from, to, edge);
            }
        }
        true
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&DocumentNode> {
        self.graph.node_weight(index)
    }

    /// Gets a node by document id.
    pub fn get_by_id(&self, id: DocumentId) -> Option<&DocumentNode> {
        let index = self.id_index.get(&id)?;
        self.graph.node_weight(*index)
    }

    /// Gets the node index for a document id.
    pub fn get_index(&self, id: DocumentId) -> Option<NodeId> {
        self.id_index.get(&id).copied()
    }

    /// Returns the number of documents.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of citation edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentNode> {
        self.graph.node_weights()
    }

    /// Document ids in insertion order.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.graph.node_weights().map(|node| node.id).collect()
    }

    /// Iterates over citations as (citing, cited, edge).
    pub fn citations(&self) -> impl Iterator<Item = (DocumentId, DocumentId, &CitationEdge)> + '_ {
        self.graph.edge_references().map(|edge_ref| {
            (
                self.graph[edge_ref.source()].id,
                self.graph[edge_ref.target()].id,
                edge_ref.weight(),
            )
        })
    }

    /// Number of citations the document receives.
    pub fn in_degree(&self, index: NodeId) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// Number of citations the document makes.
    pub fn out_degree(&self, index: NodeId) -> usize {
        self.graph.edges_directed(index, Direction::Outgoing).count()
    }

    /// Documents cited by the given document.
    pub fn references(&self, index: NodeId) -> Vec<&DocumentNode> {
        self.graph
            .neighbors_directed(index, Direction::Outgoing)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Documents citing the given document.
    pub fn cited_by(&self, index: NodeId) -> Vec<&DocumentNode> {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Returns nodes and edges for export.
    pub fn export(&self) -> GraphExport<DocumentNode, CitationLink> {
        GraphExport {
            directed: true,
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self
                .citations()
                .map(|(citing, cited, edge)| CitationLink {
                    citing,
                    cited,
                    citation_text: edge.citation_text.clone(),
                })
                .collect(),
        }
    }
}

/// Undirected, weighted co-authorship graph keyed by author name.
#[derive(Debug, Clone, Default)]
pub struct CollaborationGraph {
    pub(crate) graph: UnGraph<AuthorNode, CollaborationEdge>,

    /// Maps exact author names to graph node indexes.
    name_index: HashMap<String, NodeId>,
}

impl CollaborationGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for an author, creating it if needed.
    pub fn add_author(&mut self, name: &str) -> NodeId {
        if let Some(&index) = self.name_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(AuthorNode::new(name));
        self.name_index.insert(name.to_string(), index);
        index
    }

    /// Credits a paper to an author.
    pub fn credit_paper(&mut self, author: NodeId, paper: PaperRef) {
        if let Some(node) = self.graph.node_weight_mut(author) {
            node.add_paper(paper);
        }
    }

    /// Records a shared paper between two authors.
    ///
    /// Creates the edge with weight 1 or bumps the existing weight by 1.
    /// Returns false for a self-pair, which is never stored.
    pub fn add_collaboration(&mut self, a: NodeId, b: NodeId, paper: PaperRef) -> bool {
        if a == b {
            return false;
        }
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge].add_paper(paper),
            None => {
                self.graph.add_edge(a, b, CollaborationEdge::new(paper));
            }
        }
        true
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&AuthorNode> {
        self.graph.node_weight(index)
    }

    /// Gets an author by exact name.
    pub fn get_by_name(&self, name: &str) -> Option<&AuthorNode> {
        let index = self.name_index.get(name)?;
        self.graph.node_weight(*index)
    }

    /// Gets the node index for an exact author name.
    pub fn get_index(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    /// Finds an author: exact name first, otherwise the first author (in
    /// insertion order) whose name contains the query, ignoring case.
    pub fn find(&self, query: &str) -> Option<NodeId> {
        if let Some(index) = self.get_index(query) {
            return Some(index);
        }
        let query_lower = query.to_lowercase();
        self.graph
            .node_indices()
            .find(|&idx| self.graph[idx].name.to_lowercase().contains(&query_lower))
    }

    /// Returns the number of authors.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of collaborating pairs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over authors in insertion order.
    pub fn authors(&self) -> impl Iterator<Item = &AuthorNode> {
        self.graph.node_weights()
    }

    /// Iterates over node indexes in insertion order.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Collaborators of an author with the shared edge, in the order the
    /// collaborations were first recorded.
    pub fn collaborators(&self, index: NodeId) -> Vec<(&AuthorNode, &CollaborationEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edges(index)
            .map(|edge_ref| {
                let other = if edge_ref.source() == index {
                    edge_ref.target()
                } else {
                    edge_ref.source()
                };
                (edge_ref.id(), other, edge_ref.weight())
            })
            .collect();
        edges.sort_by_key(|(edge_id, _, _)| edge_id.index());

        edges
            .into_iter()
            .filter_map(|(_, other, edge)| Some((self.graph.node_weight(other)?, edge)))
            .collect()
    }

    /// Number of distinct collaborators.
    pub fn degree(&self, index: NodeId) -> usize {
        self.graph.edges(index).count()
    }

    /// Sum of collaboration weights over all collaborators.
    pub fn weighted_degree(&self, index: NodeId) -> u32 {
        self.graph.edges(index).map(|edge_ref| edge_ref.weight().weight).sum()
    }

    /// The collaboration between two named authors, if any.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&CollaborationEdge> {
        let a = self.get_index(a)?;
        let b = self.get_index(b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge)
    }

    /// Iterates over collaborations as (author, author, edge), in the
    /// order they were first recorded.
    pub fn collaborations(&self) -> impl Iterator<Item = (&str, &str, &CollaborationEdge)> + '_ {
        self.graph.edge_references().map(|edge_ref| {
            (
                self.graph[edge_ref.source()].name.as_str(),
                self.graph[edge_ref.target()].name.as_str(),
                edge_ref.weight(),
            )
        })
    }

    /// Returns nodes and edges for export.
    pub fn export(&self) -> GraphExport<AuthorNode, CollaborationLink> {
        GraphExport {
            directed: false,
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self
                .collaborations()
                .map(|(source, target, edge)| CollaborationLink {
                    source: source.to_string(),
                    target: target.to_string(),
                    weight: edge.weight,
                    papers: edge.papers.clone(),
                })
                .collect(),
        }
    }
}

/// A graph flattened for export or comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport<N, E> {
    pub directed: bool,
    pub nodes: Vec<N>,
    pub edges: Vec<E>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationLink {
    pub citing: DocumentId,
    pub cited: DocumentId,
    pub citation_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaborationLink {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub papers: Vec<PaperRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocumentId) -> DocumentNode {
        DocumentNode {
            id,
            title: format!("doc {}", id),
            authors: Vec::new(),
            year: None,
            journal: None,
        }
    }

    fn paper(id: DocumentId) -> PaperRef {
        PaperRef {
            id,
            title: format!("doc {}", id),
            year: None,
        }
    }

    #[test]
    fn test_duplicate_document_keeps_index() {
        let mut graph = CitationGraph::new();
        let first = graph.add_document(doc(1));
        let mut renamed = doc(1);
        renamed.title = "renamed".to_string();
        let second = graph.add_document(renamed);

        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_by_id(1).unwrap().title, "renamed");
    }

    #[test]
    fn test_citation_requires_known_endpoints() {
        let mut graph = CitationGraph::new();
        graph.add_document(doc(1));
        graph.add_document(doc(2));

        let edge = CitationEdge {
            citation_text: "ref".to_string(),
        };
        assert!(graph.add_citation(1, 2, edge.clone()));
        assert!(!graph.add_citation(1, 99, edge.clone()));
        assert!(graph.add_citation(1, 2, edge));
        assert_eq!(graph.edge_count(), 1);

        let a = graph.get_index(1).unwrap();
        let b = graph.get_index(2).unwrap();
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.in_degree(b), 1);
        assert_eq!(graph.references(a)[0].id, 2);
        assert_eq!(graph.cited_by(b)[0].id, 1);
    }

    #[test]
    fn test_self_citation_is_a_loop() {
        let mut graph = CitationGraph::new();
        graph.add_document(doc(1));
        let edge = CitationEdge {
            citation_text: "me".to_string(),
        };
        assert!(graph.add_citation(1, 1, edge));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_collaboration_is_symmetric() {
        let mut graph = CollaborationGraph::new();
        let a = graph.add_author("A");
        let b = graph.add_author("B");

        assert!(graph.add_collaboration(a, b, paper(1)));
        assert!(graph.add_collaboration(b, a, paper(2)));
        assert!(!graph.add_collaboration(a, a, paper(3)));

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_between("A", "B").unwrap().weight, 2);
        assert_eq!(graph.edge_between("B", "A").unwrap().weight, 2);
        assert_eq!(graph.weighted_degree(a), 2);
        assert_eq!(graph.degree(b), 1);
    }

    #[test]
    fn test_collaborators_in_recorded_order() {
        let mut graph = CollaborationGraph::new();
        let hub = graph.add_author("Hub");
        let x = graph.add_author("X");
        let y = graph.add_author("Y");
        let z = graph.add_author("Z");
        graph.add_collaboration(hub, x, paper(1));
        graph.add_collaboration(y, hub, paper(2));
        graph.add_collaboration(hub, z, paper(3));

        let names: Vec<&str> = graph
            .collaborators(hub)
            .into_iter()
            .map(|(author, _)| author.name.as_str())
            .collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_find_prefers_exact_then_substring() {
        let mut graph = CollaborationGraph::new();
        graph.add_author("Anna Smithson");
        graph.add_author("John Smith");
        graph.add_author("smith");

        assert_eq!(graph.find("smith"), graph.get_index("smith"));
        assert_eq!(graph.find("SMITH"), graph.get_index("Anna Smithson"));
        assert_eq!(graph.find("john"), graph.get_index("John Smith"));
        assert_eq!(graph.find("nobody"), None);
    }
}
