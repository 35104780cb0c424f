//! Graph builder for materializing both graphs from a corpus snapshot.
//!
//! Building is two-pass, like resolving references in any graph:
//! 1. Add every document (or author) as a node
//! 2. Turn resolvable citations (or shared bylines) into edges
//!
//! The builder only borrows the snapshot, so the same snapshot can feed
//! both graphs within one call.

use crate::graph::{CitationGraph, CollaborationGraph, NodeId};
use crate::model::{CitationEdge, DocumentNode, PaperRef};
use bibnet_core::{CorpusSnapshot, DocumentRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// Builds citation and collaboration graphs from a snapshot.
pub struct GraphBuilder<'a> {
    snapshot: &'a CorpusSnapshot,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over a snapshot.
    pub fn new(snapshot: &'a CorpusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Builds the directed citation graph.
    ///
    /// Every document becomes a node. Only citations whose target resolves
    /// to a corpus document become edges; external references are left out.
    pub fn build_citation_graph(&self) -> CitationGraph {
        let mut graph = CitationGraph::new();

        for doc in &self.snapshot.documents {
            graph.add_document(DocumentNode::from(doc));
        }

        let mut dangling = 0usize;
        for citation in &self.snapshot.citations {
            let Some(cited) = citation.cited_document_id else {
                continue;
            };
            let edge = CitationEdge {
                citation_text: citation.citation_text.clone(),
            };
            if !graph.add_citation(citation.citing_document_id, cited, edge) {
                dangling += 1;
            }
        }

        if dangling > 0 {
            debug!("Skipped {} citations with an endpoint outside the corpus", dangling);
        }
        info!(
            "Built citation network with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Builds the undirected co-authorship graph.
    ///
    /// Each author is credited with every paper they appear on, and each
    /// unordered pair of distinct authors on a paper gains one unit of
    /// weight. Cost is the sum over documents of (authors per document)^2.
    pub fn build_collaboration_graph(&self) -> CollaborationGraph {
        let mut graph = CollaborationGraph::new();

        for doc in &self.snapshot.documents {
            let paper = PaperRef::from(doc);
            let authors: Vec<NodeId> = unique_authors(doc)
                .into_iter()
                .map(|name| graph.add_author(name))
                .collect();

            for &author in &authors {
                graph.credit_paper(author, paper.clone());
            }

            for (i, &first) in authors.iter().enumerate() {
                for &second in &authors[i + 1..] {
                    graph.add_collaboration(first, second, paper.clone());
                }
            }
        }

        info!(
            "Built co-authorship network with {} authors and {} collaborations",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}

/// A document's authors with repeats removed, first occurrence kept.
pub(crate) fn unique_authors(doc: &DocumentRecord) -> Vec<&str> {
    let mut seen = HashSet::new();
    doc.authors
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibnet_core::CitationRecord;

    fn scenario_a() -> CorpusSnapshot {
        CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "D1"),
                DocumentRecord::new(2, "D2"),
                DocumentRecord::new(3, "D3"),
            ],
            citations: vec![
                CitationRecord::internal(1, 2, "D2"),
                CitationRecord::internal(2, 3, "D3"),
                CitationRecord::external(3, "Somewhere else (1999)"),
            ],
        }
    }

    fn scenario_b() -> CorpusSnapshot {
        CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "D1").with_authors(["Smith", "Jones"]),
                DocumentRecord::new(2, "D2").with_authors(["Jones", "Lee"]),
                DocumentRecord::new(3, "D3").with_authors(["Smith"]),
            ],
            citations: Vec::new(),
        }
    }

    #[test]
    fn test_builder_adds_documents_and_resolved_citations() {
        let snapshot = scenario_a();
        let graph = GraphBuilder::new(&snapshot).build_citation_graph();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let edges: Vec<(i64, i64)> = graph.citations().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(edges, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_edge_count_matches_resolved_citations() {
        let mut snapshot = scenario_a();
        snapshot.citations.push(CitationRecord::external(1, "External"));
        snapshot.citations.push(CitationRecord::internal(3, 1, "D1"));

        let resolved = snapshot
            .citations
            .iter()
            .filter(|c| c.is_resolved())
            .count();
        let graph = GraphBuilder::new(&snapshot).build_citation_graph();
        assert_eq!(graph.edge_count(), resolved);
    }

    #[test]
    fn test_citation_to_unknown_document_is_not_an_edge() {
        let mut snapshot = scenario_a();
        snapshot.citations.push(CitationRecord::internal(1, 42, "Missing"));
        let graph = GraphBuilder::new(&snapshot).build_citation_graph();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_collaboration_scenario() {
        let snapshot = scenario_b();
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();

        let names: Vec<&str> = graph.authors().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Smith", "Jones", "Lee"]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_between("Smith", "Jones").unwrap().weight, 1);
        assert_eq!(graph.edge_between("Jones", "Lee").unwrap().weight, 1);
        assert!(graph.edge_between("Smith", "Lee").is_none());

        let smith = graph.get_by_name("Smith").unwrap();
        assert_eq!(smith.total_papers, 2);
        assert_eq!(smith.papers.len(), 2);
    }

    #[test]
    fn test_weight_grows_by_one_per_shared_paper() {
        let snapshot = CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "a").with_authors(["A", "B", "C"]),
                DocumentRecord::new(2, "b").with_authors(["B", "A"]),
                DocumentRecord::new(3, "c").with_authors(["A", "B", "C"]),
            ],
            citations: Vec::new(),
        };
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();

        let ab = graph.edge_between("A", "B").unwrap();
        assert_eq!(ab.weight, 3);
        assert_eq!(ab.papers.len(), 3);
        assert_eq!(graph.edge_between("B", "C").unwrap().weight, 2);
        assert_eq!(graph.edge_between("C", "A").unwrap().weight, 2);
    }

    #[test]
    fn test_repeated_author_never_self_collaborates() {
        let snapshot = CorpusSnapshot {
            documents: vec![DocumentRecord::new(1, "a").with_authors(["A", "A", "B"])],
            citations: Vec::new(),
        };
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_by_name("A").unwrap().total_papers, 1);
        for (a, b, _) in graph.collaborations() {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut snapshot = scenario_b();
        snapshot.citations = scenario_a().citations;
        let builder = GraphBuilder::new(&snapshot);

        assert_eq!(
            builder.build_citation_graph().export(),
            builder.build_citation_graph().export()
        );
        assert_eq!(
            builder.build_collaboration_graph().export(),
            builder.build_collaboration_graph().export()
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CorpusSnapshot::default();
        let builder = GraphBuilder::new(&snapshot);
        assert!(builder.build_citation_graph().is_empty());
        assert!(builder.build_collaboration_graph().is_empty());
    }
}
