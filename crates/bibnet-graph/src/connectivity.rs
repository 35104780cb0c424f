//! Connectivity, components and path lengths.
//!
//! Path metrics are only ever computed inside one connected component, so
//! the diameter of a disconnected graph is never asked for.

use crate::metric::{Budget, Deadline, Metric, MetricError};
use crate::topology::Adjacency;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Connected components of an undirected view, each sorted ascending and
/// ordered by smallest member.
pub fn connected_components(adj: &Adjacency) -> Vec<Vec<usize>> {
    let n = adj.node_count();
    let mut seen = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut component = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for w in adj.neighbors(v) {
                if !seen[w] {
                    seen[w] = true;
                    component.push(w);
                    queue.push_back(w);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }

    components
}

/// Shortest-path summary of one connected component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathStats {
    pub diameter: usize,
    pub average_path_length: f64,
}

/// Diameter and average shortest-path length over the ordered pairs of
/// `component`, from one BFS per member. A single node has both at 0.
pub fn path_stats(
    adj: &Adjacency,
    component: &[usize],
    deadline: &Deadline,
) -> Result<PathStats, MetricError> {
    let n = adj.node_count();
    let mut diameter = 0usize;
    let mut total = 0u64;
    let mut dist = vec![usize::MAX; n];

    for &source in component {
        deadline.check()?;

        dist.iter_mut().for_each(|d| *d = usize::MAX);
        dist[source] = 0;
        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            for w in adj.neighbors(v) {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    diameter = diameter.max(dist[w]);
                    total += dist[w] as u64;
                    queue.push_back(w);
                }
            }
        }
    }

    let k = component.len();
    let average_path_length = if k > 1 {
        total as f64 / (k * (k - 1)) as f64
    } else {
        0.0
    };

    Ok(PathStats {
        diameter,
        average_path_length,
    })
}

/// Whether a graph is connected, with the structure metrics that apply
/// either way.
///
/// Serializes flat: `is_connected` plus the fields of the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Connectivity {
    Connected {
        diameter: Metric<usize>,
        /// Reported for the collaboration graph only.
        average_path_length: Option<Metric<f64>>,
    },
    Disconnected {
        connected_components: usize,
        largest_component_size: Option<usize>,
        largest_component_diameter: Option<Metric<usize>>,
    },
}

impl Connectivity {
    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected { .. })
    }

    /// Number of components, 1 when connected.
    pub fn component_count(&self) -> usize {
        match self {
            Connectivity::Connected { .. } => 1,
            Connectivity::Disconnected {
                connected_components,
                ..
            } => *connected_components,
        }
    }

    fn empty() -> Self {
        Connectivity::Disconnected {
            connected_components: 0,
            largest_component_size: None,
            largest_component_diameter: None,
        }
    }
}

impl Serialize for Connectivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("is_connected", &self.is_connected())?;
        match self {
            Connectivity::Connected {
                diameter,
                average_path_length,
            } => {
                map.serialize_entry("diameter", diameter)?;
                if let Some(average) = average_path_length {
                    map.serialize_entry("average_path_length", average)?;
                }
            }
            Connectivity::Disconnected {
                connected_components,
                largest_component_size,
                largest_component_diameter,
            } => {
                map.serialize_entry("connected_components", connected_components)?;
                if let Some(size) = largest_component_size {
                    map.serialize_entry("largest_component_size", size)?;
                }
                if let Some(diameter) = largest_component_diameter {
                    map.serialize_entry("largest_component_diameter", diameter)?;
                }
            }
        }
        map.end()
    }
}

/// Connectivity of the collaboration graph.
///
/// Connected graphs get diameter and average path length. Otherwise the
/// component count, plus size and diameter of the largest component (the
/// first one found on ties).
pub fn collaboration_connectivity(adj: &Adjacency, budget: &Budget) -> Connectivity {
    let components = connected_components(adj);
    match components.len() {
        0 => Connectivity::empty(),
        1 => {
            let stats = budget.expensive("path lengths", |deadline| {
                path_stats(adj, &components[0], deadline)
            });
            Connectivity::Connected {
                diameter: stats.clone().map(|s| s.diameter),
                average_path_length: Some(stats.map(|s| s.average_path_length)),
            }
        }
        count => {
            let largest = largest_component(&components);
            let diameter = budget.expensive("largest component diameter", |deadline| {
                path_stats(adj, largest, deadline).map(|s| s.diameter)
            });
            Connectivity::Disconnected {
                connected_components: count,
                largest_component_size: Some(largest.len()),
                largest_component_diameter: Some(diameter),
            }
        }
    }
}

/// Weak connectivity of the citation graph, given its undirected
/// projection. Only the component count is reported when disconnected.
pub fn citation_connectivity(projection: &Adjacency, budget: &Budget) -> Connectivity {
    let components = connected_components(projection);
    match components.len() {
        0 => Connectivity::empty(),
        1 => Connectivity::Connected {
            diameter: budget.expensive("diameter", |deadline| {
                path_stats(projection, &components[0], deadline).map(|s| s.diameter)
            }),
            average_path_length: None,
        },
        count => Connectivity::Disconnected {
            connected_components: count,
            largest_component_size: None,
            largest_component_diameter: None,
        },
    }
}

fn largest_component(components: &[Vec<usize>]) -> &[usize] {
    let mut largest: &[usize] = &[];
    for component in components {
        if component.len() > largest.len() {
            largest = component;
        }
    }
    largest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn path4() -> Adjacency {
        Adjacency::from_edges(4, false, &[(0, 1), (1, 2), (2, 3)])
    }

    #[test]
    fn test_components_ordered_by_first_member() {
        let adj = Adjacency::from_edges(5, false, &[(3, 4), (0, 2)]);
        assert_eq!(
            connected_components(&adj),
            vec![vec![0, 2], vec![1], vec![3, 4]]
        );
        assert!(connected_components(&Adjacency::default()).is_empty());
    }

    #[test]
    fn test_path_stats_on_path() {
        let stats = path_stats(&path4(), &[0, 1, 2, 3], &Deadline::none()).unwrap();
        assert_eq!(stats.diameter, 3);
        // distances: 1,2,3,1,2,1 each counted twice over 12 ordered pairs
        assert!((stats.average_path_length - 20.0 / 12.0).abs() < 1e-9);

        let isolated = Adjacency::from_edges(1, false, &[]);
        let single = path_stats(&isolated, &[0], &Deadline::none()).unwrap();
        assert_eq!(single.diameter, 0);
        assert_eq!(single.average_path_length, 0.0);
    }

    #[test]
    fn test_connected_collaboration() {
        let connectivity = collaboration_connectivity(&path4(), &Budget::unlimited());
        assert!(connectivity.is_connected());
        match connectivity {
            Connectivity::Connected {
                diameter,
                average_path_length,
            } => {
                assert_eq!(diameter.value(), Some(&3));
                assert!(average_path_length.is_some());
            }
            other => panic!("expected connected, got {:?}", other),
        }
    }

    #[test]
    fn test_disconnected_collaboration_uses_largest_component() {
        // 0-1-2 path plus 3-4 pair and isolated 5
        let adj = Adjacency::from_edges(6, false, &[(0, 1), (1, 2), (3, 4)]);
        let connectivity = collaboration_connectivity(&adj, &Budget::unlimited());

        assert_eq!(connectivity.component_count(), 3);
        assert_eq!(
            connectivity,
            Connectivity::Disconnected {
                connected_components: 3,
                largest_component_size: Some(3),
                largest_component_diameter: Some(Metric::Computed { value: 2 }),
            }
        );
    }

    #[test]
    fn test_citation_connectivity_reports_count_only() {
        let adj = Adjacency::from_edges(4, false, &[(0, 1), (2, 3)]);
        let connectivity = citation_connectivity(&adj, &Budget::unlimited());
        let json = serde_json::to_value(&connectivity).unwrap();
        assert_eq!(json["is_connected"], false);
        assert_eq!(json["connected_components"], 2);
        assert!(json.get("largest_component_size").is_none());
    }

    #[test]
    fn test_empty_graph_has_no_components() {
        let connectivity = collaboration_connectivity(&Adjacency::default(), &Budget::unlimited());
        assert!(!connectivity.is_connected());
        assert_eq!(connectivity.component_count(), 0);
    }

    #[test]
    fn test_diameter_skipped_on_large_graph() {
        let budget = Budget::new(Deadline::none(), 4, 2, false);
        let connectivity = citation_connectivity(&path4(), &budget);
        let json = serde_json::to_value(&connectivity).unwrap();
        assert_eq!(json["is_connected"], true);
        assert_eq!(json["diameter"]["status"], "omitted");
        assert_eq!(json["diameter"]["reason"]["kind"], "skipped_above_threshold");
    }

    #[test]
    fn test_path_stats_honors_deadline() {
        let expired = Deadline::after(Duration::ZERO);
        assert_eq!(
            path_stats(&path4(), &[0, 1, 2, 3], &expired),
            Err(MetricError::DeadlineExceeded)
        );
    }
}
