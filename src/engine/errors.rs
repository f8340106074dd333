use thiserror::Error;
use tracing::{debug, error};

/// Errors that abort a top-N query. None of them are transient.
#[derive(Debug, Error)]
pub enum TopNError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Aggregation type error: {0}")]
    AggregationType(String),

    #[error("Query cancelled: {0}")]
    Cancelled(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl TopNError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        TopNError::Configuration(msg.into())
    }

    pub fn aggregation_type(msg: impl Into<String>) -> Self {
        TopNError::AggregationType(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, TopNError::Configuration(_))
    }

    pub fn is_aggregation_type(&self) -> bool {
        matches!(self, TopNError::AggregationType(_))
    }

    pub fn log_error(&self) {
        match self {
            TopNError::Configuration(e) => {
                error!(target: "zftopn::engine", "Invalid top-N configuration: {}", e);
                debug!(target: "zftopn::engine", "Configuration error details: {:?}", self);
            }
            TopNError::AggregationType(e) => {
                error!(target: "zftopn::engine", "Incompatible aggregate states: {}", e);
                debug!(target: "zftopn::engine", "Aggregation type error details: {:?}", self);
            }
            TopNError::Cancelled(e) => {
                error!(target: "zftopn::engine", "Top-N bucket cancelled: {}", e);
            }
            TopNError::WorkerPool(e) => {
                error!(target: "zftopn::engine", "Worker pool could not be built: {}", e);
                debug!(target: "zftopn::engine", "Worker pool error details: {:?}", e);
            }
        }
    }
}

pub type TopNResult<T> = Result<T, TopNError>;
