//! Analysis configuration.

use crate::metric::{Budget, Deadline};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for every analysis. Missing fields in a config file take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ranking length in the citation overview.
    pub top_k: usize,
    /// Ranking length in the author centrality overview.
    pub author_top_k: usize,

    pub pagerank_damping: f64,
    pub pagerank_max_iterations: usize,
    pub pagerank_tolerance: f64,

    pub eigenvector_max_iterations: usize,
    pub eigenvector_tolerance: f64,

    /// Communities smaller than this are dropped from reports.
    pub min_community_size: usize,
    /// Key members listed per community.
    pub key_members: usize,
    /// Use collaboration weights in modularity instead of plain adjacency.
    pub weighted_modularity: bool,

    /// Graphs above this many nodes skip betweenness, closeness,
    /// eigenvector and path-length metrics unless `allow_expensive` is set.
    pub expensive_node_limit: usize,
    pub allow_expensive: bool,

    /// Wall-clock limit per analysis call, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            author_top_k: 10,
            pagerank_damping: 0.85,
            pagerank_max_iterations: 100,
            pagerank_tolerance: 1e-6,
            eigenvector_max_iterations: 1000,
            eigenvector_tolerance: 1e-6,
            min_community_size: 3,
            key_members: 5,
            weighted_modularity: false,
            expensive_node_limit: 2000,
            allow_expensive: false,
            timeout_ms: None,
        }
    }
}

impl AnalysisConfig {
    /// Loads a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the config as pretty JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Starts the clock for one analysis call.
    pub fn deadline(&self) -> Deadline {
        match self.timeout_ms {
            Some(ms) => Deadline::after(Duration::from_millis(ms)),
            None => Deadline::none(),
        }
    }

    /// The gate for expensive metrics on a graph of `nodes` nodes.
    pub fn budget(&self, deadline: Deadline, nodes: usize) -> Budget {
        Budget::new(deadline, nodes, self.expensive_node_limit, self.allow_expensive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_k": 3, "timeout_ms": 250}}"#).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.timeout_ms, Some(250));
        assert_eq!(config.eigenvector_max_iterations, 1000);
        assert_eq!(config.pagerank_damping, 0.85);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AnalysisConfig {
            allow_expensive: true,
            ..AnalysisConfig::default()
        };
        config.write_to(&path).unwrap();
        assert_eq!(AnalysisConfig::from_file(&path).unwrap(), config);
    }
}
