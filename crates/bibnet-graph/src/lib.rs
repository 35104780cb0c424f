//! Bibnet Graph - Citation and collaboration network analytics
//!
//! This crate builds two graphs from a corpus snapshot and computes
//! structural metrics over them:
//!
//! - a directed citation graph (an edge A -> B means A cites B)
//! - an undirected co-authorship graph weighted by shared papers
//!
//! # Architecture
//!
//! Graphs wrap petgraph with an index from domain identity (document id,
//! author name) to node index. Nothing is cached: every analysis reads the
//! store, builds the graph it needs and throws it away afterwards.
//!
//! Expensive metrics (betweenness, closeness, eigenvector, path lengths)
//! run behind a node-count gate and a per-call deadline. When one of them
//! is skipped or fails, the overview still carries every other metric.
//!
//! # Example
//!
//! ```
//! use bibnet_core::{DocumentRecord, MemoryStore};
//! use bibnet_graph::NetworkAnalyzer;
//!
//! let mut store = MemoryStore::new();
//! store.add_document(DocumentRecord::new(1, "Graphs").with_authors(["Smith", "Jones"]));
//! store.add_document(DocumentRecord::new(2, "Trees").with_authors(["Jones", "Lee"]));
//!
//! let analyzer = NetworkAnalyzer::new(store);
//! let top = analyzer.most_collaborative_authors(1).unwrap();
//! assert_eq!(top[0].name, "Jones");
//! ```

mod analysis;
mod builder;
mod centrality;
mod community;
mod config;
mod connectivity;
mod error;
mod graph;
mod metric;
mod model;
mod profile;
mod store;
mod timeline;
mod topology;

pub use analysis::{
    author_centrality, citation_overview, AuthorCentralityOverview, CitationOverview,
    CorpusStats, NetworkAnalyzer,
};
pub use builder::GraphBuilder;
pub use centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality, eigenvector_centrality,
    in_degree_centrality, out_degree_centrality, pagerank, top_k, EigenvectorConfig,
    PageRankConfig, Ranking,
};
pub use community::{
    citation_clusters, greedy_modularity, modularity, research_communities, CitationCluster,
    ClusterDocument, CommunityMember, Partition, ResearchCommunity,
};
pub use config::{AnalysisConfig, ConfigError};
pub use connectivity::{
    citation_connectivity, collaboration_connectivity, connected_components, path_stats,
    Connectivity, PathStats,
};
pub use error::{AnalysisError, Result};
pub use graph::{
    CitationGraph, CitationLink, CollaborationGraph, CollaborationLink, GraphExport, NodeId,
};
pub use metric::{Budget, Deadline, Metric, MetricError};
pub use model::{AuthorNode, CitationEdge, CollaborationEdge, DocumentNode, PaperRef};
pub use profile::{
    author_profile, most_cited_papers, most_citing_papers, most_collaborative_authors,
    strongest_collaborations, AuthorLookup, AuthorProfile, CitedPaper, CitingPaper,
    Collaboration, CollaborativeAuthor, Collaborator,
};
pub use store::{CorpusStore, CorpusStoreError};
pub use timeline::{
    citation_timeline, collaboration_timeline, CitationTimeline, CitationYear,
    CollaborationTimeline, CollaborationYear,
};
pub use topology::Adjacency;
