//! Normalized corpus records.
//!
//! These are the shapes the extraction pipeline hands over: a document with
//! its ordered author list, and a citation that may or may not resolve to a
//! document inside the corpus.

use crate::error::Result;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Opaque document identity assigned by the store.
pub type DocumentId = i64;

/// A document in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub title: String,

    /// Author names in byline order. Names are used verbatim as graph keys.
    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub publication_year: Option<i32>,

    #[serde(default)]
    pub journal: Option<String>,
}

impl DocumentRecord {
    /// Creates a document with no authors, year or journal.
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            authors: Vec::new(),
            publication_year: None,
            journal: None,
        }
    }

    /// Sets the author list.
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the publication year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    /// Sets the journal name.
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = Some(journal.into());
        self
    }
}

/// A citation made by a corpus document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub citing_document_id: DocumentId,

    /// Set when the reference was matched to a document in the corpus.
    #[serde(default)]
    pub cited_document_id: Option<DocumentId>,

    #[serde(default)]
    pub citation_text: String,
}

impl CitationRecord {
    /// A citation whose target was resolved inside the corpus.
    pub fn internal(citing: DocumentId, cited: DocumentId, text: impl Into<String>) -> Self {
        Self {
            citing_document_id: citing,
            cited_document_id: Some(cited),
            citation_text: text.into(),
        }
    }

    /// A citation pointing outside the corpus.
    pub fn external(citing: DocumentId, text: impl Into<String>) -> Self {
        Self {
            citing_document_id: citing,
            cited_document_id: None,
            citation_text: text.into(),
        }
    }

    /// Whether the citation has an internal target.
    pub fn is_resolved(&self) -> bool {
        self.cited_document_id.is_some()
    }
}

/// Everything an analysis reads, pulled from the store in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
    #[serde(default)]
    pub citations: Vec<CitationRecord>,
}

impl CorpusSnapshot {
    /// Reads the current documents and citations from a store.
    pub fn read<S: EntityStore + ?Sized>(store: &S) -> Result<Self> {
        let documents = store.list_documents()?;
        let citations = store.list_citations()?;
        tracing::debug!(
            "Read snapshot: {} documents, {} citations (revision {})",
            documents.len(),
            citations.len(),
            store.revision()
        );
        Ok(Self {
            documents,
            citations,
        })
    }

    /// Loads a snapshot from a JSON file of the form
    /// `{"documents": [...], "citations": [...]}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Returns true when the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
