//! Bibnet Core - Corpus records and the entity-store contract
//!
//! This crate defines the normalized records that the ingestion side of
//! Bibnet produces (documents, their authors, and citation links) and the
//! read API that graph analytics pull them through.
//!
//! # Example
//!
//! ```
//! use bibnet_core::{CitationRecord, DocumentRecord, EntityStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.add_document(DocumentRecord::new(1, "Graphs").with_authors(["Smith", "Jones"]));
//! store.add_document(DocumentRecord::new(2, "Trees").with_year(2019));
//! store.add_citation(CitationRecord::internal(1, 2, "Trees (2019)"));
//!
//! assert_eq!(store.list_documents().unwrap().len(), 2);
//! assert_eq!(store.revision(), 3);
//! ```

mod error;
mod record;
mod store;

pub use error::{Result, StoreError};
pub use record::{CitationRecord, CorpusSnapshot, DocumentId, DocumentRecord};
pub use store::{EntityStore, MemoryStore};
