//! Persistent corpus store backed by sled.
//!
//! Documents and citations live in separate trees as bincode blobs.
//! Document keys are order-preserving encodings of the id, so listing
//! returns documents by ascending id; citation keys come from sled's id
//! generator, so citations list in the order they were written.

use bibnet_core::{CitationRecord, CorpusSnapshot, DocumentId, DocumentRecord, EntityStore, StoreError};
use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

const REVISION_KEY: &[u8] = b"revision";

#[derive(Error, Debug)]
pub enum CorpusStoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl From<CorpusStoreError> for StoreError {
    fn from(err: CorpusStoreError) -> Self {
        match err {
            CorpusStoreError::Sled(e) => StoreError::Backend(e.to_string()),
            CorpusStoreError::Bincode(e) => StoreError::Corrupt(e.to_string()),
        }
    }
}

pub struct CorpusStore {
    db: Db,
    documents: Tree,
    citations: Tree,
    meta: Tree,
}

impl CorpusStore {
    /// Opens or creates a corpus store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CorpusStoreError> {
        let db = sled::open(path)?;
        let documents = db.open_tree("documents")?;
        let citations = db.open_tree("citations")?;
        let meta = db.open_tree("meta")?;
        Ok(Self {
            db,
            documents,
            citations,
            meta,
        })
    }

    /// Stores a document, replacing any document with the same id.
    pub fn put_document(&self, doc: &DocumentRecord) -> Result<(), CorpusStoreError> {
        let bytes = bincode::serialize(doc)?;
        self.documents.insert(document_key(doc.id), bytes)?;
        self.bump_revision()?;
        Ok(())
    }

    /// Appends a citation record.
    pub fn put_citation(&self, citation: &CitationRecord) -> Result<(), CorpusStoreError> {
        let key = self.db.generate_id()?.to_be_bytes();
        let bytes = bincode::serialize(citation)?;
        self.citations.insert(key, bytes)?;
        self.bump_revision()?;
        Ok(())
    }

    /// Writes every record of a snapshot and flushes.
    pub fn import_corpus(&self, snapshot: &CorpusSnapshot) -> Result<(), CorpusStoreError> {
        for doc in &snapshot.documents {
            self.put_document(doc)?;
        }
        for citation in &snapshot.citations {
            self.put_citation(citation)?;
        }
        self.db.flush()?;
        info!(
            "Imported {} documents and {} citations",
            snapshot.documents.len(),
            snapshot.citations.len()
        );
        Ok(())
    }

    /// Removes every document and citation. The revision still moves
    /// forward.
    pub fn clear(&self) -> Result<(), CorpusStoreError> {
        self.documents.clear()?;
        self.citations.clear()?;
        self.bump_revision()?;
        self.db.flush()?;
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    fn bump_revision(&self) -> Result<u64, CorpusStoreError> {
        let updated = self.meta.update_and_fetch(REVISION_KEY, |old| {
            let current = old.and_then(decode_u64).unwrap_or(0);
            Some((current + 1).to_be_bytes().to_vec())
        })?;
        Ok(updated.as_deref().and_then(decode_u64).unwrap_or(0))
    }

    fn read_revision(&self) -> Result<u64, CorpusStoreError> {
        let stored = self.meta.get(REVISION_KEY)?;
        Ok(stored.as_deref().and_then(decode_u64).unwrap_or(0))
    }

    fn load_all<T: serde::de::DeserializeOwned>(tree: &Tree) -> Result<Vec<T>, CorpusStoreError> {
        tree.iter()
            .values()
            .map(|value| -> Result<T, CorpusStoreError> { Ok(bincode::deserialize(&value?)?) })
            .collect()
    }
}

impl EntityStore for CorpusStore {
    fn list_documents(&self) -> bibnet_core::Result<Vec<DocumentRecord>> {
        Ok(Self::load_all(&self.documents)?)
    }

    fn list_citations(&self) -> bibnet_core::Result<Vec<CitationRecord>> {
        Ok(Self::load_all(&self.citations)?)
    }

    fn revision(&self) -> u64 {
        self.read_revision().unwrap_or_else(|e| {
            warn!("Could not read store revision: {}", e);
            0
        })
    }
}

/// Big-endian id with the sign bit flipped, so byte order matches numeric
/// order for negative ids too.
fn document_key(id: DocumentId) -> [u8; 8] {
    ((id as u64) ^ (1 << 63)).to_be_bytes()
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn corpus() -> CorpusSnapshot {
        CorpusSnapshot {
            documents: vec![
                DocumentRecord::new(2, "Second").with_authors(["Lee"]).with_year(2021),
                DocumentRecord::new(-1, "Negative"),
                DocumentRecord::new(1, "First").with_journal("Graphs"),
            ],
            citations: vec![
                CitationRecord::internal(2, 1, "First"),
                CitationRecord::external(1, "Outside (1990)"),
            ],
        }
    }

    #[test]
    fn test_import_and_list() {
        let dir = tempdir().unwrap();
        let store = CorpusStore::open(dir.path()).unwrap();
        store.import_corpus(&corpus()).unwrap();

        let ids: Vec<DocumentId> = store.list_documents().unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![-1, 1, 2]);
        assert_eq!(store.list_citations().unwrap(), corpus().citations);
        assert_eq!(store.revision(), 5);
    }

    #[test]
    fn test_put_document_replaces() {
        let dir = tempdir().unwrap();
        let store = CorpusStore::open(dir.path()).unwrap();
        store.put_document(&DocumentRecord::new(7, "Draft")).unwrap();
        store.put_document(&DocumentRecord::new(7, "Final")).unwrap();

        let docs = store.list_documents().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Final");
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_clear_keeps_revision_moving() {
        let dir = tempdir().unwrap();
        let store = CorpusStore::open(dir.path()).unwrap();
        store.import_corpus(&corpus()).unwrap();
        store.clear().unwrap();

        assert_eq!(store.document_count(), 0);
        assert_eq!(store.citation_count(), 0);
        assert_eq!(store.revision(), 6);
    }

    #[test]
    fn test_reopen_persists() {
        let dir = tempdir().unwrap();
        {
            let store = CorpusStore::open(dir.path()).unwrap();
            store.import_corpus(&corpus()).unwrap();
        }
        let store = CorpusStore::open(dir.path()).unwrap();
        assert_eq!(store.document_count(), 3);
        assert_eq!(store.revision(), 5);
    }

    #[test]
    fn test_snapshot_through_trait() {
        let dir = tempdir().unwrap();
        let store = CorpusStore::open(dir.path()).unwrap();
        store.import_corpus(&corpus()).unwrap();

        let snapshot = CorpusSnapshot::read(&store).unwrap();
        assert_eq!(snapshot.documents.len(), 3);
        assert_eq!(snapshot.citations.len(), 2);
    }
}
