//! The read contract for entity stores, plus an in-memory implementation.

use crate::error::Result;
use crate::record::{CitationRecord, CorpusSnapshot, DocumentId, DocumentRecord};
use std::sync::Arc;

/// Read access to the stored corpus.
///
/// Implementations must return documents in a stable order; graph node
/// insertion order (and therefore every tie-break) follows it.
pub trait EntityStore {
    /// Lists every document.
    fn list_documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Lists every citation record, resolved or not.
    fn list_citations(&self) -> Result<Vec<CitationRecord>>;

    /// Monotonic counter bumped on every committed write.
    fn revision(&self) -> u64;

    /// Resolves an author by exact name, returning the stored spelling.
    fn resolve_author(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .list_documents()?
            .into_iter()
            .flat_map(|doc| doc.authors)
            .find(|author| author == name))
    }
}

impl<T: EntityStore + ?Sized> EntityStore for &T {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        (**self).list_documents()
    }

    fn list_citations(&self) -> Result<Vec<CitationRecord>> {
        (**self).list_citations()
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }

    fn resolve_author(&self, name: &str) -> Result<Option<String>> {
        (**self).resolve_author(name)
    }
}

impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        (**self).list_documents()
    }

    fn list_citations(&self) -> Result<Vec<CitationRecord>> {
        (**self).list_citations()
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }

    fn resolve_author(&self, name: &str) -> Result<Option<String>> {
        (**self).resolve_author(name)
    }
}

impl<T: EntityStore + ?Sized> EntityStore for Box<T> {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        (**self).list_documents()
    }

    fn list_citations(&self) -> Result<Vec<CitationRecord>> {
        (**self).list_citations()
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }

    fn resolve_author(&self, name: &str) -> Result<Option<String>> {
        (**self).resolve_author(name)
    }
}

/// A Vec-backed store. Documents keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Vec<DocumentRecord>,
    citations: Vec<CitationRecord>,
    revision: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the records of a snapshot.
    pub fn from_snapshot(snapshot: CorpusSnapshot) -> Self {
        let mut store = Self::new();
        for doc in snapshot.documents {
            store.add_document(doc);
        }
        for citation in snapshot.citations {
            store.add_citation(citation);
        }
        store
    }

    /// Adds a document, replacing any existing document with the same id
    /// in place.
    pub fn add_document(&mut self, doc: DocumentRecord) {
        match self.documents.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => *existing = doc,
            None => self.documents.push(doc),
        }
        self.revision += 1;
    }

    /// Adds a citation record.
    pub fn add_citation(&mut self, citation: CitationRecord) {
        self.citations.push(citation);
        self.revision += 1;
    }

    /// Removes a document and every citation it makes.
    ///
    /// Citations pointing at it become unresolved.
    pub fn remove_document(&mut self, id: DocumentId) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        if self.documents.len() == before {
            return false;
        }

        self.citations.retain(|c| c.citing_document_id != id);
        for citation in &mut self.citations {
            if citation.cited_document_id == Some(id) {
                citation.cited_document_id = None;
            }
        }
        self.revision += 1;
        true
    }
}

impl EntityStore for MemoryStore {
    fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.documents.clone())
    }

    fn list_citations(&self) -> Result<Vec<CitationRecord>> {
        Ok(self.citations.clone())
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_document_keeps_position() {
        let mut store = MemoryStore::new();
        store.add_document(DocumentRecord::new(1, "first"));
        store.add_document(DocumentRecord::new(2, "second"));
        store.add_document(DocumentRecord::new(1, "first, revised"));

        let docs = store.list_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "first, revised");
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_remove_document_unresolves_citations() {
        let mut store = MemoryStore::new();
        store.add_document(DocumentRecord::new(1, "a"));
        store.add_document(DocumentRecord::new(2, "b"));
        store.add_citation(CitationRecord::internal(1, 2, "b"));
        store.add_citation(CitationRecord::internal(2, 1, "a"));

        assert!(store.remove_document(2));
        assert!(!store.remove_document(2));

        let citations = store.list_citations().unwrap();
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].citing_document_id, 1);
        assert!(!citations[0].is_resolved());
    }

    #[test]
    fn test_resolve_author_exact_only() {
        let mut store = MemoryStore::new();
        store.add_document(DocumentRecord::new(1, "a").with_authors(["John Smith"]));

        assert_eq!(
            store.resolve_author("John Smith").unwrap().as_deref(),
            Some("John Smith")
        );
        assert_eq!(store.resolve_author("smith").unwrap(), None);
    }

    #[test]
    fn test_shared_store_delegates() {
        let mut store = MemoryStore::new();
        store.add_document(DocumentRecord::new(1, "a"));
        let shared: Arc<dyn EntityStore + Send + Sync> = Arc::new(store);

        assert_eq!(shared.list_documents().unwrap().len(), 1);
        assert_eq!(shared.revision(), 1);
        assert_eq!(CorpusSnapshot::read(&shared).unwrap().documents.len(), 1);
    }
}
