//! Per-metric outcomes, deadlines and the expensive-metric gate.
//!
//! A failing metric never takes its siblings down: overview structs hold a
//! [`Metric`] for every metric that can fail, and the rest of the overview
//! is computed regardless.

use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single metric has no value.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricError {
    #[error("power iteration did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("analysis deadline exceeded")]
    DeadlineExceeded,

    #[error("skipped: graph has {nodes} nodes, above the limit of {limit}")]
    SkippedAboveThreshold { nodes: usize, limit: usize },
}

/// A metric value, or the reason it was omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric<T> {
    Computed { value: T },
    Omitted { reason: MetricError },
}

impl<T> Metric<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Computed { value } => Some(value),
            Metric::Omitted { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Metric::Computed { value } => Some(value),
            Metric::Omitted { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Metric::Computed { .. })
    }

    pub fn reason(&self) -> Option<&MetricError> {
        match self {
            Metric::Computed { .. } => None,
            Metric::Omitted { reason } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Computed { value } => Metric::Computed { value: f(value) },
            Metric::Omitted { reason } => Metric::Omitted { reason },
        }
    }
}

impl<T> From<Result<T, MetricError>> for Metric<T> {
    fn from(result: Result<T, MetricError>) -> Self {
        match result {
            Ok(value) => Metric::Computed { value },
            Err(reason) => Metric::Omitted { reason },
        }
    }
}

/// Wall-clock limit for one analysis call. Checked inside algorithm loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }

    /// Fails with `DeadlineExceeded` once the deadline has passed.
    pub fn check(&self) -> Result<(), MetricError> {
        if self.is_expired() {
            Err(MetricError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

/// Decides whether expensive metrics may run on a graph and runs them
/// under the call's deadline.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    deadline: Deadline,
    nodes: usize,
    limit: usize,
    allow_expensive: bool,
}

impl Budget {
    pub fn new(deadline: Deadline, nodes: usize, limit: usize, allow_expensive: bool) -> Self {
        Self {
            deadline,
            nodes,
            limit,
            allow_expensive,
        }
    }

    /// A budget with no deadline that allows everything.
    pub fn unlimited() -> Self {
        Self::new(Deadline::none(), 0, usize::MAX, true)
    }

    /// Runs an expensive metric if the graph is small enough or the caller
    /// opted in.
    pub fn expensive<T>(
        &self,
        name: &str,
        f: impl FnOnce(&Deadline) -> Result<T, MetricError>,
    ) -> Metric<T> {
        if !self.allow_expensive && self.nodes > self.limit {
            debug!(
                "Skipping {}: {} nodes above limit {}",
                name, self.nodes, self.limit
            );
            return Metric::Omitted {
                reason: MetricError::SkippedAboveThreshold {
                    nodes: self.nodes,
                    limit: self.limit,
                },
            };
        }
        self.timed(name, f)
    }

    fn timed<T>(&self, name: &str, f: impl FnOnce(&Deadline) -> Result<T, MetricError>) -> Metric<T> {
        let start = Instant::now();
        let result = self.deadline.check().and_then(|_| f(&self.deadline));
        let elapsed = start.elapsed().as_millis();
        match &result {
            Ok(_) => debug!("{} computed in {}ms", name, elapsed),
            Err(e) => warn!("{} omitted after {}ms: {}", name, elapsed, e),
        }
        result.into()
    }
}
