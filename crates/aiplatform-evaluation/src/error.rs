use aiplatform_abstraction::{PlatformError, ResourceNameError};
use thiserror::Error;

pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

const MISSING_METRICS_HINT: &str =
    "this could be because the evaluation job failed. Check the job logs for details.";

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "model evaluation {name} does not have any metrics, {}",
        MISSING_METRICS_HINT
    )]
    MissingMetrics { name: String },

    #[error(transparent)]
    Remote(#[from] PlatformError),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl From<ResourceNameError> for EvaluationError {
    fn from(err: ResourceNameError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
