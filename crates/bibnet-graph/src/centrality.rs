//! Centrality scores.
//!
//! Every function returns one score per node, indexed by node position
//! (insertion order). [`top_k`] turns scores into a ranking whose ties keep
//! insertion order.
//!
//! Degree and PageRank are cheap. Betweenness and closeness run one BFS
//! per node, and eigenvector centrality may iterate up to its bound; those
//! take a [`Deadline`] and check it once per outer step.

use crate::graph::CitationGraph;
use crate::metric::{Deadline, MetricError};
use crate::topology::Adjacency;
use std::collections::VecDeque;
use tracing::warn;

/// Ranked (key, score) pairs, highest score first.
pub type Ranking<K> = Vec<(K, f64)>;

/// Degree over (n - 1). A graph with fewer than two nodes scores 0.
pub fn degree_centrality(adj: &Adjacency) -> Vec<f64> {
    let n = adj.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n)
        .map(|node| adj.neighbors(node).count() as f64 / denom)
        .collect()
}

/// Citations received over (n - 1).
pub fn in_degree_centrality(graph: &CitationGraph) -> Vec<f64> {
    directed_degree_centrality(graph, |g, idx| g.in_degree(idx))
}

/// Citations made over (n - 1).
pub fn out_degree_centrality(graph: &CitationGraph) -> Vec<f64> {
    directed_degree_centrality(graph, |g, idx| g.out_degree(idx))
}

fn directed_degree_centrality(
    graph: &CitationGraph,
    degree: impl Fn(&CitationGraph, crate::graph::NodeId) -> usize,
) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    let denom = (n - 1) as f64;
    graph
        .graph
        .node_indices()
        .map(|idx| degree(graph, idx) as f64 / denom)
        .collect()
}

/// Betweenness centrality via Brandes' algorithm, unweighted.
///
/// Sums over ordered (source, target) pairs and scales by
/// 1 / ((n - 1)(n - 2)), so an undirected path's middle node scores 1.
/// Pairs with no path contribute nothing. Graphs with n <= 2 score 0.
pub fn betweenness_centrality(adj: &Adjacency, deadline: &Deadline) -> Result<Vec<f64>, MetricError> {
    let n = adj.node_count();
    if n <= 2 {
        return Ok(vec![0.0; n]);
    }

    let mut bc = vec![0.0_f64; n];

    for s in 0..n {
        deadline.check()?;

        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1i64; n];
        let mut delta = vec![0.0_f64; n];

        sigma[s] = 1.0;
        dist[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in adj.neighbors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        // Back-propagation of dependencies
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                bc[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    for score in &mut bc {
        *score *= scale;
    }
    Ok(bc)
}

/// Closeness centrality: reachable nodes over the sum of their distances.
///
/// Unreachable nodes are left out of the average rather than counted as
/// infinitely far. A node that reaches nothing scores 0. On directed views
/// distances follow outgoing edges.
pub fn closeness_centrality(adj: &Adjacency, deadline: &Deadline) -> Result<Vec<f64>, MetricError> {
    let n = adj.node_count();
    let mut result = Vec::with_capacity(n);

    for s in 0..n {
        deadline.check()?;

        let mut dist = vec![-1i64; n];
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);
        let mut total_dist = 0i64;
        let mut reachable = 0usize;

        while let Some(v) = queue.pop_front() {
            for w in adj.neighbors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    total_dist += dist[w];
                    reachable += 1;
                    queue.push_back(w);
                }
            }
        }

        let closeness = if reachable > 0 && total_dist > 0 {
            reachable as f64 / total_dist as f64
        } else {
            0.0
        };
        result.push(closeness);
    }

    Ok(result)
}

/// Power-iteration settings for eigenvector centrality.
#[derive(Debug, Clone, Copy)]
pub struct EigenvectorConfig {
    pub max_iterations: usize,
    /// Converged when the summed absolute change drops below n * tolerance.
    pub tolerance: f64,
}

impl Default for EigenvectorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Eigenvector centrality by power iteration on (A + I), L2-normalized.
///
/// The identity shift keeps bipartite graphs from oscillating. On directed
/// views score flows along out-edges, so a node is central when central
/// nodes point at it. Fails with `NonConvergence` when the bound is hit.
pub fn eigenvector_centrality(
    adj: &Adjacency,
    config: EigenvectorConfig,
    deadline: &Deadline,
) -> Result<Vec<f64>, MetricError> {
    let n = adj.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut scores = vec![1.0 / n as f64; n];

    for _ in 0..config.max_iterations {
        deadline.check()?;

        let last = scores.clone();
        for node in 0..n {
            for &(neighbor, weight) in adj.weighted_neighbors(node) {
                scores[neighbor] += last[node] * weight;
            }
            scores[node] += last[node] * adj.self_loop(node);
        }

        let norm = scores.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        for score in &mut scores {
            *score /= norm;
        }

        let change: f64 = scores.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * config.tolerance {
            return Ok(scores);
        }
    }

    Err(MetricError::NonConvergence {
        iterations: config.max_iterations,
    })
}

/// PageRank settings.
#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// PageRank over a directed view.
///
/// Dangling nodes spread their mass uniformly. Scores sum to 1. If the
/// iteration bound is reached first the last iterate is returned.
pub fn pagerank(adj: &Adjacency, config: PageRankConfig) -> Vec<f64> {
    let n = adj.node_count();
    if n == 0 {
        return Vec::new();
    }

    let n_f64 = n as f64;
    let damping = config.damping;
    let teleport = (1.0 - damping) / n_f64;

    let out_strength: Vec<f64> = (0..n)
        .map(|node| adj.weighted_neighbors(node).iter().map(|(_, w)| w).sum())
        .collect();

    let mut scores = vec![1.0 / n_f64; n];

    for _ in 0..config.max_iterations {
        let last = std::mem::replace(&mut scores, vec![0.0; n]);

        let dangling_sum: f64 = (0..n)
            .filter(|&node| out_strength[node] == 0.0)
            .map(|node| last[node])
            .sum::<f64>()
            * damping;

        for node in 0..n {
            if out_strength[node] == 0.0 {
                continue;
            }
            let share = damping * last[node] / out_strength[node];
            for &(neighbor, weight) in adj.weighted_neighbors(node) {
                scores[neighbor] += share * weight;
            }
        }

        for score in &mut scores {
            *score += dangling_sum / n_f64 + teleport;
        }

        let change: f64 = scores.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n_f64 * config.tolerance {
            return scores;
        }
    }

    warn!(
        "PageRank reached {} iterations without settling; using last iterate",
        config.max_iterations
    );
    scores
}

/// The `k` highest-scoring keys. Ties keep the order of `keys`.
pub fn top_k<K: Clone>(keys: &[K], scores: &[f64], k: usize) -> Ranking<K> {
    let mut order: Vec<usize> = (0..scores.len().min(keys.len())).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
        .into_iter()
        .take(k)
        .map(|idx| (keys[idx].clone(), scores[idx]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const EPS: f64 = 1e-9;

    fn path3() -> Adjacency {
        Adjacency::from_edges(3, false, &[(0, 1), (1, 2)])
    }

    fn star4() -> Adjacency {
        Adjacency::from_edges(4, false, &[(0, 1), (0, 2), (0, 3)])
    }

    #[test]
    fn test_degree_centrality_bounds() {
        let scores = degree_centrality(&star4());
        assert!((scores[0] - 1.0).abs() < EPS);
        assert!((scores[1] - 1.0 / 3.0).abs() < EPS);
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_degree_centrality_single_node_is_zero() {
        let single = Adjacency::from_edges(1, false, &[]);
        assert_eq!(degree_centrality(&single), vec![0.0]);
        assert!(degree_centrality(&Adjacency::default()).is_empty());
    }

    #[test]
    fn test_betweenness_path_and_star() {
        let path = betweenness_centrality(&path3(), &Deadline::none()).unwrap();
        assert!((path[0]).abs() < EPS);
        assert!((path[1] - 1.0).abs() < EPS);

        let star = betweenness_centrality(&star4(), &Deadline::none()).unwrap();
        assert!((star[0] - 1.0).abs() < EPS);
        assert!(star[1].abs() < EPS);
    }

    #[test]
    fn test_betweenness_disconnected_pairs_contribute_nothing() {
        let adj = Adjacency::from_edges(4, false, &[(0, 1), (2, 3)]);
        let scores = betweenness_centrality(&adj, &Deadline::none()).unwrap();
        assert!(scores.iter().all(|s| s.abs() < EPS));
    }

    #[test]
    fn test_betweenness_honors_deadline() {
        let expired = Deadline::after(Duration::ZERO);
        assert_eq!(
            betweenness_centrality(&star4(), &expired),
            Err(MetricError::DeadlineExceeded)
        );
    }

    #[test]
    fn test_closeness_excludes_unreachable() {
        let scores = closeness_centrality(&path3(), &Deadline::none()).unwrap();
        assert!((scores[0] - 2.0 / 3.0).abs() < EPS);
        assert!((scores[1] - 1.0).abs() < EPS);

        // 0-1 connected, 2 isolated
        let adj = Adjacency::from_edges(3, false, &[(0, 1)]);
        let scores = closeness_centrality(&adj, &Deadline::none()).unwrap();
        assert!((scores[0] - 1.0).abs() < EPS);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_eigenvector_symmetric_triangle() {
        let triangle = Adjacency::from_edges(3, false, &[(0, 1), (1, 2), (2, 0)]);
        let scores =
            eigenvector_centrality(&triangle, EigenvectorConfig::default(), &Deadline::none())
                .unwrap();
        let expected = 1.0 / 3f64.sqrt();
        for score in scores {
            assert!((score - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_eigenvector_star_center_leads() {
        let scores =
            eigenvector_centrality(&star4(), EigenvectorConfig::default(), &Deadline::none())
                .unwrap();
        assert!(scores[0] > scores[1]);
        assert!((scores[1] - scores[3]).abs() < 1e-6);
    }

    #[test]
    fn test_eigenvector_reports_non_convergence() {
        let triangle = Adjacency::from_edges(3, false, &[(0, 1), (1, 2), (2, 0)]);
        let config = EigenvectorConfig {
            max_iterations: 1,
            tolerance: 1e-6,
        };
        assert_eq!(
            eigenvector_centrality(&triangle, config, &Deadline::none()),
            Err(MetricError::NonConvergence { iterations: 1 })
        );
    }

    #[test]
    fn test_pagerank_chain() {
        // 0 -> 1 -> 2
        let adj = Adjacency::from_edges(3, true, &[(0, 1), (1, 2)]);
        let scores = pagerank(&adj, PageRankConfig::default());

        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(scores[2] > scores[1]);
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn test_pagerank_most_cited_wins() {
        // 0 -> 1, 3 -> 1, 1 -> 2
        let adj = Adjacency::from_edges(4, true, &[(0, 1), (3, 1), (1, 2)]);
        let scores = pagerank(&adj, PageRankConfig::default());
        assert!(scores[1] > scores[0]);
        assert!(scores[1] > scores[3]);
        assert!(pagerank(&Adjacency::default(), PageRankConfig::default()).is_empty());
    }

    #[test]
    fn test_top_k_ties_keep_insertion_order() {
        let keys = vec!["a", "b", "c", "d"];
        let scores = vec![0.5, 0.7, 0.5, 0.7];
        let ranked = top_k(&keys, &scores, 3);
        assert_eq!(ranked, vec![("b", 0.7), ("d", 0.7), ("a", 0.5)]);
        assert!(top_k::<&str>(&[], &[], 5).is_empty());
    }
}
