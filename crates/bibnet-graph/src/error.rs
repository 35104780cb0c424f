use crate::metric::MetricError;
use bibnet_core::StoreError;
use thiserror::Error;

/// Failure of a whole analysis call.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Reading the corpus failed; nothing was computed.
    #[error("Store read failed: {0}")]
    Store(#[from] StoreError),

    /// The single metric this call exists to compute failed.
    #[error("Metric failed: {0}")]
    Metric(#[from] MetricError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
