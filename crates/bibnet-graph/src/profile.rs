//! Single-entity queries: author profiles and top-N lists.
//!
//! All rankings sort descending with stable ties, so equal counts keep the
//! order in which nodes (or documents) were inserted.

use crate::graph::{CollaborationGraph, NodeId};
use crate::model::PaperRef;
use crate::timeline::ratio;
use bibnet_core::{CorpusSnapshot, DocumentId, DocumentRecord};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Profiles list this many collaborators in `top_collaborators`.
pub const TOP_COLLABORATORS: usize = 10;

/// A co-author seen from one author's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collaborator {
    pub name: String,
    pub collaboration_count: u32,
    pub shared_papers: Vec<PaperRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorProfile {
    pub name: String,
    pub total_papers: usize,
    /// Papers shared with at least one co-author.
    pub collaborative_papers: usize,
    pub solo_papers: usize,
    pub unique_collaborators: usize,
    /// Collaborative papers over total papers.
    pub collaboration_rate: f64,
    /// Newest first; papers without a year sort as year 0.
    pub papers: Vec<PaperRef>,
    pub collaborators: Vec<Collaborator>,
    pub top_collaborators: Vec<Collaborator>,
    pub years_active: Vec<i32>,
}

/// Result of an author lookup. A miss is a value, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuthorLookup {
    Found(AuthorProfile),
    NotFound { error: String },
}

impl AuthorLookup {
    pub fn not_found() -> Self {
        AuthorLookup::NotFound {
            error: "Author not found".to_string(),
        }
    }

    pub fn profile(&self) -> Option<&AuthorProfile> {
        match self {
            AuthorLookup::Found(profile) => Some(profile),
            AuthorLookup::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, AuthorLookup::Found(_))
    }
}

/// Collaborators of an author, strongest first.
fn collaborators_of(graph: &CollaborationGraph, index: NodeId) -> Vec<Collaborator> {
    let mut collaborators: Vec<Collaborator> = graph
        .collaborators(index)
        .into_iter()
        .map(|(author, edge)| Collaborator {
            name: author.name.clone(),
            collaboration_count: edge.weight,
            shared_papers: edge.papers.clone(),
        })
        .collect();
    collaborators.sort_by_key(|c| Reverse(c.collaboration_count));
    collaborators
}

/// Looks an author up by exact name, then by case-insensitive substring,
/// and aggregates their profile.
pub fn author_profile(graph: &CollaborationGraph, query: &str) -> AuthorLookup {
    let Some(index) = graph.find(query) else {
        return AuthorLookup::not_found();
    };
    let Some(author) = graph.get(index) else {
        return AuthorLookup::not_found();
    };

    let collaborators = collaborators_of(graph, index);
    let shared: HashSet<DocumentId> = collaborators
        .iter()
        .flat_map(|c| c.shared_papers.iter().map(|p| p.id))
        .collect();

    let mut papers = author.papers.clone();
    papers.sort_by_key(|p| Reverse(p.year.unwrap_or(0)));

    let total_papers = papers.len();
    let collaborative_papers = papers.iter().filter(|p| shared.contains(&p.id)).count();
    let years_active: Vec<i32> = papers
        .iter()
        .filter_map(|p| p.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    AuthorLookup::Found(AuthorProfile {
        name: author.name.clone(),
        total_papers,
        collaborative_papers,
        solo_papers: total_papers - collaborative_papers,
        unique_collaborators: collaborators.len(),
        collaboration_rate: ratio(collaborative_papers, total_papers),
        papers,
        top_collaborators: collaborators.iter().take(TOP_COLLABORATORS).cloned().collect(),
        collaborators,
        years_active,
    })
}

/// An author ranked by how many distinct people they work with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaborativeAuthor {
    pub name: String,
    pub total_papers: usize,
    pub unique_collaborators: usize,
    /// Sum of collaboration weights.
    pub total_collaborations: u32,
    /// Unique collaborators per paper.
    pub collaboration_rate: f64,
    pub collaborators: Vec<Collaborator>,
}

/// Authors with the most unique collaborators.
pub fn most_collaborative_authors(graph: &CollaborationGraph, limit: usize) -> Vec<CollaborativeAuthor> {
    let mut authors: Vec<CollaborativeAuthor> = graph
        .node_indexes()
        .filter_map(|index| {
            let author = graph.get(index)?;
            let degree = graph.degree(index);
            Some(CollaborativeAuthor {
                name: author.name.clone(),
                total_papers: author.total_papers,
                unique_collaborators: degree,
                total_collaborations: graph.weighted_degree(index),
                collaboration_rate: ratio(degree, author.total_papers),
                collaborators: collaborators_of(graph, index),
            })
        })
        .collect();
    authors.sort_by_key(|a| Reverse(a.unique_collaborators));
    authors.truncate(limit);
    authors
}

/// A collaborating pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collaboration {
    pub authors: [String; 2],
    pub collaboration_count: u32,
    pub shared_papers: Vec<PaperRef>,
}

/// Pairs with the most shared papers.
pub fn strongest_collaborations(graph: &CollaborationGraph, limit: usize) -> Vec<Collaboration> {
    let mut pairs: Vec<Collaboration> = graph
        .collaborations()
        .map(|(a, b, edge)| Collaboration {
            authors: [a.to_string(), b.to_string()],
            collaboration_count: edge.weight,
            shared_papers: edge.papers.clone(),
        })
        .collect();
    pairs.sort_by_key(|p| Reverse(p.collaboration_count));
    pairs.truncate(limit);
    pairs
}

/// A document with the number of times it is cited inside the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitedPaper {
    pub document: DocumentRecord,
    pub citation_count: usize,
}

/// A document with the number of references it makes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitingPaper {
    pub document: DocumentRecord,
    pub citations_made: usize,
}

/// Documents by resolved citation records pointing at them. Uncited
/// documents are left out.
pub fn most_cited_papers(snapshot: &CorpusSnapshot, limit: usize) -> Vec<CitedPaper> {
    let counts = count_by(snapshot, |c| c.cited_document_id);
    ranked(snapshot, &counts, limit)
        .map(|(document, citation_count)| CitedPaper {
            document,
            citation_count,
        })
        .collect()
}

/// Documents by citation records they make, resolved or not. Documents
/// citing nothing are left out.
pub fn most_citing_papers(snapshot: &CorpusSnapshot, limit: usize) -> Vec<CitingPaper> {
    let counts = count_by(snapshot, |c| Some(c.citing_document_id));
    ranked(snapshot, &counts, limit)
        .map(|(document, citations_made)| CitingPaper {
            document,
            citations_made,
        })
        .collect()
}

fn count_by(
    snapshot: &CorpusSnapshot,
    key: impl Fn(&bibnet_core::CitationRecord) -> Option<DocumentId>,
) -> HashMap<DocumentId, usize> {
    let mut counts = HashMap::new();
    for citation in &snapshot.citations {
        if let Some(id) = key(citation) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

fn ranked(
    snapshot: &CorpusSnapshot,
    counts: &HashMap<DocumentId, usize>,
    limit: usize,
) -> impl Iterator<Item = (DocumentRecord, usize)> {
    let mut ranked: Vec<(DocumentRecord, usize)> = snapshot
        .documents
        .iter()
        .filter_map(|doc| {
            let count = counts.get(&doc.id).copied().unwrap_or(0);
            (count > 0).then(|| (doc.clone(), count))
        })
        .collect();
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked.truncate(limit);
    ranked.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use bibnet_core::CitationRecord;

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
    fn test_most_collaborative_puts_jones_first() {
        let snapshot = scenario_b();
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();
        let authors = most_collaborative_authors(&graph, 10);

        let names: Vec<&str> = authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Jones", "Smith", "Lee"]);
        assert_eq!(authors[0].unique_collaborators, 2);
        assert_eq!(authors[0].total_collaborations, 2);
        assert_eq!(authors[1].collaboration_rate, 0.5);
        assert_eq!(most_collaborative_authors(&graph, 1).len(), 1);
    }

    #[test]
    fn test_profile_resolves_substring_match() {
        let snapshot = CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "Early").with_year(2018).with_authors(["John Smith", "Ann Lee"]),
                DocumentRecord::new(2, "Undated").with_authors(["John Smith"]),
                DocumentRecord::new(3, "Late").with_year(2021).with_authors(["Ann Lee", "John Smith"]),
                DocumentRecord::new(4, "Also late").with_year(2021).with_authors(["John Smith", "Bo Park"]),
            ],
            citations: Vec::new(),
        };
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();
        let lookup = author_profile(&graph, "smith");
        let profile = lookup.profile().unwrap();

        assert_eq!(profile.name, "John Smith");
        assert_eq!(profile.total_papers, 4);
        assert_eq!(profile.collaborative_papers, 3);
        assert_eq!(profile.solo_papers, 1);
        assert_eq!(profile.unique_collaborators, 2);
        assert_eq!(profile.collaboration_rate, 0.75);
        assert_eq!(profile.years_active, vec![2018, 2021]);

        let titles: Vec<&str> = profile.papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Late", "Also late", "Early", "Undated"]);

        assert_eq!(profile.collaborators[0].name, "Ann Lee");
        assert_eq!(profile.collaborators[0].collaboration_count, 2);
    }

    #[test]
    fn test_profile_miss_is_a_value() {
        let snapshot = scenario_b();
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();
        let lookup = author_profile(&graph, "Nobody");

        assert!(!lookup.is_found());
        let json = serde_json::to_value(&lookup).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Author not found" }));
    }

    #[test]
    fn test_strongest_collaborations() {
        let snapshot = CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "a").with_authors(["A", "B"]),
                DocumentRecord::new(2, "b").with_authors(["C", "D"]),
                DocumentRecord::new(3, "c").with_authors(["D", "C"]),
            ],
            citations: Vec::new(),
        };
        let graph = GraphBuilder::new(&snapshot).build_collaboration_graph();
        let pairs = strongest_collaborations(&graph, 5);

        assert_eq!(pairs[0].authors, ["C".to_string(), "D".to_string()]);
        assert_eq!(pairs[0].collaboration_count, 2);
        assert_eq!(pairs[0].shared_papers.len(), 2);
        assert_eq!(pairs[1].collaboration_count, 1);
    }

    #[test]
    fn test_most_cited_and_most_citing() {
        let snapshot = CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(1, "D1"),
                DocumentRecord::new(2, "D2"),
                DocumentRecord::new(3, "D3"),
            ],
            citations: vec![
                CitationRecord::internal(1, 3, "D3"),
                CitationRecord::internal(2, 3, "D3"),
                CitationRecord::internal(2, 1, "D1"),
                CitationRecord::external(2, "outside"),
                CitationRecord::external(1, "outside"),
            ],
        };

        let cited = most_cited_papers(&snapshot, 10);
        let ids: Vec<(DocumentId, usize)> =
            cited.iter().map(|p| (p.document.id, p.citation_count)).collect();
        assert_eq!(ids, vec![(3, 2), (1, 1)]);

        let citing = most_citing_papers(&snapshot, 10);
        let ids: Vec<(DocumentId, usize)> =
            citing.iter().map(|p| (p.document.id, p.citations_made)).collect();
        assert_eq!(ids, vec![(2, 3), (1, 2)]);

        assert_eq!(most_cited_papers(&snapshot, 1).len(), 1);
    }
}
