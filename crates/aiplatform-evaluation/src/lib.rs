//! Model evaluation resolver.
//!
//! Fetches a model evaluation from the platform and exposes:
//! - its metrics (`ModelEvaluation::metrics`)
//! - the pipeline job that produced it (`ModelEvaluation::backing_pipeline_job`)
//! - the `evaluation_metrics` artifact written by that pipeline
//!   (`ModelEvaluation::producing_artifact`)

pub mod error;
pub mod evaluation;

pub use error::{EvaluationError, EvaluationResult};
pub use evaluation::{ArtifactTrace, ModelEvaluation, find_evaluation_metrics_artifact};
