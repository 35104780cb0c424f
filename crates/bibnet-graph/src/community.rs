//! Community detection by greedy modularity maximization.
//!
//! Clauset-Newman-Moore style agglomeration: every node starts alone, and
//! the pair of adjacent communities with the largest modularity gain is
//! merged until no merge gains anything. Only adjacent communities are
//! candidates, since merging two unlinked ones always lowers Q.

use crate::config::AnalysisConfig;
use crate::graph::{CitationGraph, CollaborationGraph};
use crate::metric::{Deadline, MetricError};
use crate::topology::Adjacency;
use bibnet_core::DocumentId;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Gains at or below this are treated as no gain.
const MIN_GAIN: f64 = 1e-12;

/// Node positions grouped into communities.
///
/// Members are sorted ascending; communities are sorted by size descending,
/// ties broken by their smallest member.
pub type Partition = Vec<Vec<usize>>;

/// Partitions an undirected view by greedy modularity maximization.
///
/// Edge weights are used as given, so pass an unweighted view for plain
/// adjacency modularity. A graph without edges stays all singletons. Ties
/// between equal gains go to the pair with the lowest community indexes.
pub fn greedy_modularity(adj: &Adjacency, deadline: &Deadline) -> Result<Partition, MetricError> {
    let n = adj.node_count();
    let two_m: f64 = (0..n).map(|v| adj.strength(v)).sum();

    let mut members: Vec<Vec<usize>> = (0..n).map(|v| vec![v]).collect();
    let mut alive = vec![true; n];

    if two_m > 0.0 {
        let m = two_m / 2.0;
        let mut totals: Vec<f64> = (0..n).map(|v| adj.strength(v)).collect();
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for v in 0..n {
            for &(u, w) in adj.weighted_neighbors(v) {
                if u != v {
                    *links[v].entry(u).or_insert(0.0) += w;
                }
            }
        }

        let mut merges = 0usize;
        loop {
            deadline.check()?;

            let mut best: Option<(f64, usize, usize)> = None;
            for a in (0..n).filter(|&a| alive[a]) {
                for (&b, &between) in links[a].range(a + 1..) {
                    let gain = between / m - totals[a] * totals[b] / (2.0 * m * m);
                    if gain > MIN_GAIN && best.map_or(true, |(g, _, _)| gain > g) {
                        best = Some((gain, a, b));
                    }
                }
            }

            let Some((_, a, b)) = best else {
                break;
            };

            // Fold b into a
            let absorbed = std::mem::take(&mut members[b]);
            members[a].extend(absorbed);
            totals[a] += totals[b];
            alive[b] = false;

            let b_links = std::mem::take(&mut links[b]);
            links[a].remove(&b);
            for (c, w) in b_links {
                if c == a {
                    continue;
                }
                links[c].remove(&b);
                *links[c].entry(a).or_insert(0.0) += w;
                *links[a].entry(c).or_insert(0.0) += w;
            }
            merges += 1;
        }
        debug!("Greedy modularity finished after {} merges", merges);
    }

    let mut partition: Partition = members
        .into_iter()
        .zip(alive)
        .filter(|(_, keep)| *keep)
        .map(|(mut group, _)| {
            group.sort_unstable();
            group
        })
        .collect();
    partition.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    Ok(partition)
}

/// Modularity Q of a partition of an undirected view. Q of an edgeless
/// graph is 0.
pub fn modularity(adj: &Adjacency, partition: &[Vec<usize>]) -> f64 {
    let two_m: f64 = (0..adj.node_count()).map(|v| adj.strength(v)).sum();
    if two_m == 0.0 {
        return 0.0;
    }

    partition
        .iter()
        .map(|group| {
            let set: HashSet<usize> = group.iter().copied().collect();
            // Each internal edge is seen from both ends; loops count twice.
            let internal: f64 = group
                .iter()
                .map(|&v| {
                    adj.weighted_neighbors(v)
                        .iter()
                        .filter(|(u, _)| set.contains(u))
                        .map(|(_, w)| w)
                        .sum::<f64>()
                        + 2.0 * adj.self_loop(v)
                })
                .sum();
            let total: f64 = group.iter().map(|&v| adj.strength(v)).sum();
            internal / two_m - (total / two_m).powi(2)
        })
        .sum()
}

/// An author in a research community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityMember {
    pub name: String,
    pub papers_count: usize,
    /// Collaborators this author has inside the community.
    pub collaborations_in_community: usize,
}

/// A densely collaborating group of authors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchCommunity {
    /// Rank of the community among all detected ones, before small ones
    /// were dropped.
    pub community_id: usize,
    pub size: usize,
    pub total_papers: usize,
    pub internal_collaborations: usize,
    pub density: f64,
    /// Every member, most papers first.
    pub authors: Vec<CommunityMember>,
    pub key_authors: Vec<CommunityMember>,
}

/// Research communities in the collaboration graph, largest first.
pub fn research_communities(
    graph: &CollaborationGraph,
    config: &AnalysisConfig,
    deadline: &Deadline,
) -> Result<Vec<ResearchCommunity>, MetricError> {
    let adj = Adjacency::collaboration(graph, config.weighted_modularity);
    let partition = greedy_modularity(&adj, deadline)?;
    let nodes: Vec<_> = graph.node_indexes().collect();

    let communities = partition
        .iter()
        .enumerate()
        .filter(|(_, group)| group.len() >= config.min_community_size)
        .map(|(rank, group)| {
            let set: HashSet<usize> = group.iter().copied().collect();
            let mut authors: Vec<CommunityMember> = group
                .iter()
                .filter_map(|&pos| {
                    let author = graph.get(nodes[pos])?;
                    Some(CommunityMember {
                        name: author.name.clone(),
                        papers_count: author.total_papers,
                        collaborations_in_community: adj
                            .neighbors(pos)
                            .filter(|u| set.contains(u))
                            .count(),
                    })
                })
                .collect();
            authors.sort_by(|a, b| b.papers_count.cmp(&a.papers_count));

            let internal = adj.edges_within(group);
            ResearchCommunity {
                community_id: rank,
                size: group.len(),
                total_papers: authors.iter().map(|a| a.papers_count).sum(),
                internal_collaborations: internal,
                density: undirected_density(internal, group.len()),
                key_authors: authors.iter().take(config.key_members).cloned().collect(),
                authors,
            }
        })
        .collect();

    Ok(communities)
}

/// A document inside a citation cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterDocument {
    pub id: DocumentId,
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
}

/// A group of heavily interlinked documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationCluster {
    pub cluster_id: usize,
    pub size: usize,
    /// Citation edges with both ends in the cluster.
    pub internal_citations: usize,
    /// Internal citations over the n(n - 1) possible directed edges.
    pub density: f64,
    pub documents: Vec<ClusterDocument>,
}

/// Citation clusters, found on the undirected projection of the citation
/// graph, largest first.
pub fn citation_clusters(
    graph: &CitationGraph,
    config: &AnalysisConfig,
    deadline: &Deadline,
) -> Result<Vec<CitationCluster>, MetricError> {
    let projection = Adjacency::citation_projection(graph);
    let partition = greedy_modularity(&projection, deadline)?;
    let directed = Adjacency::citations(graph);
    let docs: Vec<_> = graph.documents().collect();

    let clusters = partition
        .iter()
        .enumerate()
        .filter(|(_, group)| group.len() >= config.min_community_size)
        .map(|(rank, group)| {
            let internal = directed.edges_within(group);
            let size = group.len();
            let density = if size > 1 {
                internal as f64 / (size * (size - 1)) as f64
            } else {
                0.0
            };
            CitationCluster {
                cluster_id: rank,
                size,
                internal_citations: internal,
                density,
                documents: group
                    .iter()
                    .map(|&pos| {
                        let doc = docs[pos];
                        ClusterDocument {
                            id: doc.id,
                            title: doc.title.clone(),
                            authors: doc.authors.clone(),
                            year: doc.year,
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(clusters)
}

fn undirected_density(edges: usize, nodes: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    2.0 * edges as f64 / (nodes * (nodes - 1)) as f64
}
