//! Analysis entry points.
//!
//! [`NetworkAnalyzer`] is what callers talk to. Every method reads a fresh
//! snapshot from the store, builds the graph it needs, runs one analysis
//! and drops the graph, so results always reflect the store at call time.

use crate::builder::GraphBuilder;
use crate::centrality::{
    betweenness_centrality, closeness_centrality, degree_centrality, eigenvector_centrality,
    in_degree_centrality, out_degree_centrality, pagerank, top_k, EigenvectorConfig,
    PageRankConfig, Ranking,
};
use crate::community::{self, CitationCluster, ResearchCommunity};
use crate::config::AnalysisConfig;
use crate::connectivity::{citation_connectivity, collaboration_connectivity, Connectivity};
use crate::error::Result;
use crate::graph::{CitationGraph, CollaborationGraph};
use crate::metric::Metric;
use crate::profile::{self, AuthorLookup, CitedPaper, CitingPaper, Collaboration, CollaborativeAuthor};
use crate::timeline::{self, CitationTimeline, CollaborationTimeline};
use crate::topology::Adjacency;
use bibnet_core::{CorpusSnapshot, DocumentId, EntityStore};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Structure and rankings of the citation graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationOverview {
    pub total_papers: usize,
    pub total_citations: usize,
    pub average_citations_per_paper: f64,
    pub most_cited_by_in_degree: Ranking<DocumentId>,
    pub most_citing_by_out_degree: Ranking<DocumentId>,
    pub highest_pagerank: Ranking<DocumentId>,
    #[serde(flatten)]
    pub connectivity: Connectivity,
}

/// Centrality rankings and structure of the collaboration graph.
///
/// The expensive rankings may be omitted; each carries its own reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorCentralityOverview {
    pub total_authors: usize,
    pub total_collaborations: usize,
    pub average_collaborators_per_author: f64,
    pub top_by_degree_centrality: Ranking<String>,
    pub top_by_betweenness_centrality: Metric<Ranking<String>>,
    pub top_by_closeness_centrality: Metric<Ranking<String>>,
    pub top_by_eigenvector_centrality: Metric<Ranking<String>>,
    #[serde(flatten)]
    pub connectivity: Connectivity,
}

/// Corpus-level counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_authors: usize,
    pub total_citations: usize,
    pub resolved_citations: usize,
    pub unresolved_citations: usize,
    pub documents_by_year: BTreeMap<i32, usize>,
    pub documents_without_year: usize,
}

impl CorpusStats {
    pub fn from_snapshot(snapshot: &CorpusSnapshot) -> Self {
        let mut stats = CorpusStats {
            total_documents: snapshot.documents.len(),
            total_citations: snapshot.citations.len(),
            ..CorpusStats::default()
        };

        let mut authors = HashSet::new();
        for doc in &snapshot.documents {
            authors.extend(doc.authors.iter().map(String::as_str));
            match doc.publication_year {
                Some(year) => *stats.documents_by_year.entry(year).or_insert(0) += 1,
                None => stats.documents_without_year += 1,
            }
        }
        stats.total_authors = authors.len();
        stats.resolved_citations = snapshot.citations.iter().filter(|c| c.is_resolved()).count();
        stats.unresolved_citations = stats.total_citations - stats.resolved_citations;
        stats
    }
}

/// Citation overview of an already built graph.
pub fn citation_overview(graph: &CitationGraph, config: &AnalysisConfig) -> CitationOverview {
    let n = graph.node_count();
    let budget = config.budget(config.deadline(), n);
    let ids = graph.document_ids();

    let directed = Adjacency::citations(graph);
    let ranks = pagerank(
        &directed,
        PageRankConfig {
            damping: config.pagerank_damping,
            max_iterations: config.pagerank_max_iterations,
            tolerance: config.pagerank_tolerance,
        },
    );

    let projection = Adjacency::citation_projection(graph);

    CitationOverview {
        total_papers: n,
        total_citations: graph.edge_count(),
        average_citations_per_paper: per_node(graph.edge_count() as f64, n),
        most_cited_by_in_degree: top_k(&ids, &in_degree_centrality(graph), config.top_k),
        most_citing_by_out_degree: top_k(&ids, &out_degree_centrality(graph), config.top_k),
        highest_pagerank: top_k(&ids, &ranks, config.top_k),
        connectivity: citation_connectivity(&projection, &budget),
    }
}

/// Author centrality overview of an already built graph.
///
/// Degree centrality is always computed. Betweenness, closeness,
/// eigenvector and path metrics go through the expensive-metric gate and
/// fail independently of each other.
pub fn author_centrality(graph: &CollaborationGraph, config: &AnalysisConfig) -> AuthorCentralityOverview {
    let n = graph.node_count();
    let budget = config.budget(config.deadline(), n);
    let names: Vec<String> = graph.authors().map(|a| a.name.clone()).collect();
    let k = config.author_top_k;
    let adj = Adjacency::collaboration(graph, false);

    let eigen = EigenvectorConfig {
        max_iterations: config.eigenvector_max_iterations,
        tolerance: config.eigenvector_tolerance,
    };

    AuthorCentralityOverview {
        total_authors: n,
        total_collaborations: graph.edge_count(),
        average_collaborators_per_author: per_node(2.0 * graph.edge_count() as f64, n),
        top_by_degree_centrality: top_k(&names, &degree_centrality(&adj), k),
        top_by_betweenness_centrality: budget
            .expensive("betweenness", |deadline| betweenness_centrality(&adj, deadline))
            .map(|scores| top_k(&names, &scores, k)),
        top_by_closeness_centrality: budget
            .expensive("closeness", |deadline| closeness_centrality(&adj, deadline))
            .map(|scores| top_k(&names, &scores, k)),
        top_by_eigenvector_centrality: budget
            .expensive("eigenvector", |deadline| eigenvector_centrality(&adj, eigen, deadline))
            .map(|scores| top_k(&names, &scores, k)),
        connectivity: collaboration_connectivity(&adj, &budget),
    }
}

fn per_node(total: f64, nodes: usize) -> f64 {
    if nodes == 0 {
        0.0
    } else {
        total / nodes as f64
    }
}

/// Runs analyses against an entity store.
///
/// Cheap to clone when the store is (`&S`, `Arc<S>`), so independent
/// analyses can run on separate threads.
#[derive(Debug, Clone)]
pub struct NetworkAnalyzer<S> {
    store: S,
    config: AnalysisConfig,
}

impl<S: EntityStore> NetworkAnalyzer<S> {
    /// Creates an analyzer with the default config.
    pub fn new(store: S) -> Self {
        Self::with_config(store, AnalysisConfig::default())
    }

    pub fn with_config(store: S, config: AnalysisConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn snapshot(&self) -> Result<CorpusSnapshot> {
        Ok(CorpusSnapshot::read(&self.store)?)
    }

    /// Builds the citation graph from the current store contents.
    pub fn build_citation_graph(&self) -> Result<CitationGraph> {
        let snapshot = self.snapshot()?;
        Ok(GraphBuilder::new(&snapshot).build_citation_graph())
    }

    /// Builds the collaboration graph from the current store contents.
    pub fn build_collaboration_graph(&self) -> Result<CollaborationGraph> {
        let snapshot = self.snapshot()?;
        Ok(GraphBuilder::new(&snapshot).build_collaboration_graph())
    }

    pub fn citation_overview(&self) -> Result<CitationOverview> {
        let graph = self.build_citation_graph()?;
        let overview = citation_overview(&graph, &self.config);
        info!(
            "Citation overview: {} papers, {} citations",
            overview.total_papers, overview.total_citations
        );
        Ok(overview)
    }

    pub fn author_centrality(&self) -> Result<AuthorCentralityOverview> {
        let graph = self.build_collaboration_graph()?;
        let overview = author_centrality(&graph, &self.config);
        info!(
            "Author centrality: {} authors, {} collaborations",
            overview.total_authors, overview.total_collaborations
        );
        Ok(overview)
    }

    /// Research communities of size `min_community_size` or more, largest
    /// first. Fails only if the store read fails or the deadline expires.
    pub fn research_communities(&self) -> Result<Vec<ResearchCommunity>> {
        let graph = self.build_collaboration_graph()?;
        let deadline = self.config.deadline();
        Ok(community::research_communities(&graph, &self.config, &deadline)?)
    }

    pub fn citation_clusters(&self) -> Result<Vec<CitationCluster>> {
        let graph = self.build_citation_graph()?;
        let deadline = self.config.deadline();
        Ok(community::citation_clusters(&graph, &self.config, &deadline)?)
    }

    pub fn citation_timeline(&self) -> Result<CitationTimeline> {
        Ok(timeline::citation_timeline(&self.snapshot()?))
    }

    pub fn collaboration_timeline(&self) -> Result<CollaborationTimeline> {
        Ok(timeline::collaboration_timeline(&self.snapshot()?))
    }

    pub fn author_profile(&self, name: &str) -> Result<AuthorLookup> {
        let graph = self.build_collaboration_graph()?;
        Ok(profile::author_profile(&graph, name))
    }

    pub fn most_cited_papers(&self, limit: usize) -> Result<Vec<CitedPaper>> {
        Ok(profile::most_cited_papers(&self.snapshot()?, limit))
    }

    pub fn most_citing_papers(&self, limit: usize) -> Result<Vec<CitingPaper>> {
        Ok(profile::most_citing_papers(&self.snapshot()?, limit))
    }

    pub fn most_collaborative_authors(&self, limit: usize) -> Result<Vec<CollaborativeAuthor>> {
        let graph = self.build_collaboration_graph()?;
        Ok(profile::most_collaborative_authors(&graph, limit))
    }

    pub fn strongest_collaborations(&self, limit: usize) -> Result<Vec<Collaboration>> {
        let graph = self.build_collaboration_graph()?;
        Ok(profile::strongest_collaborations(&graph, limit))
    }

    pub fn corpus_stats(&self) -> Result<CorpusStats> {
        Ok(CorpusStats::from_snapshot(&self.snapshot()?))
    }
}
