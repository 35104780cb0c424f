//! Node and edge payloads for the two graphs.

use bibnet_core::{DocumentId, DocumentRecord};
use serde::{Deserialize, Serialize};

/// A document as a citation-graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: DocumentId,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub journal: Option<String>,
}

impl From<&DocumentRecord> for DocumentNode {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            authors: doc.authors.clone(),
            year: doc.publication_year,
            journal: doc.journal.clone(),
        }
    }
}

/// Directed edge: the citing document cites the cited one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEdge {
    /// Raw reference text as extracted.
    pub citation_text: String,
}

/// A short reference to a paper, carried on author nodes and
/// collaboration edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRef {
    pub id: DocumentId,
    pub title: String,
    pub year: Option<i32>,
}

impl From<&DocumentRecord> for PaperRef {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            year: doc.publication_year,
        }
    }
}

/// An author as a collaboration-graph node. The name is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorNode {
    pub name: String,
    pub total_papers: usize,
    pub papers: Vec<PaperRef>,
}

impl AuthorNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_papers: 0,
            papers: Vec::new(),
        }
    }

    /// Credits a paper to this author.
    pub fn add_paper(&mut self, paper: PaperRef) {
        self.papers.push(paper);
        self.total_papers += 1;
    }
}

/// Undirected edge between two distinct authors.
///
/// `weight` always equals `papers.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationEdge {
    pub weight: u32,
    pub papers: Vec<PaperRef>,
}

impl CollaborationEdge {
    /// A fresh collaboration backed by one shared paper.
    pub fn new(paper: PaperRef) -> Self {
        Self {
            weight: 1,
            papers: vec![paper],
        }
    }

    /// Records one more shared paper.
    pub fn add_paper(&mut self, paper: PaperRef) {
        self.papers.push(paper);
        self.weight += 1;
    }
}
