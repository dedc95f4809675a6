use crate::error::{EvaluationError, EvaluationResult};
use aiplatform_abstraction::{
    Artifact, ConnectionContext, EVALUATION_METRICS_ARTIFACT, EvaluationName, EvaluationRecord,
    ModelName, PipelineJob, PlatformClients, PlatformError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Outcome of tracing an evaluation back to its metrics artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactTrace {
    /// The evaluation was not created by a managed pipeline.
    NoBackingPipeline,
    /// The pipeline ran but none of its tasks output an `evaluation_metrics` artifact.
    NoMatchingArtifact { pipeline_job: String },
    Found { artifact: Artifact },
}

impl ArtifactTrace {
    #[must_use]
    pub fn into_artifact(self) -> Option<Artifact> {
        match self {
            Self::Found { artifact } => Some(artifact),
            Self::NoBackingPipeline | Self::NoMatchingArtifact { .. } => None,
        }
    }
}

/// Finds the first `evaluation_metrics` artifact of a pipeline run.
///
/// Tasks and artifacts are scanned in service order; the first match wins.
#[must_use]
pub fn find_evaluation_metrics_artifact(job: &PipelineJob) -> Option<&Artifact> {
    job.task_details()
        .iter()
        .filter_map(|task| task.outputs.get(EVALUATION_METRICS_ARTIFACT))
        .flat_map(|output| output.artifacts.iter())
        .find(|artifact| artifact.display_name == EVALUATION_METRICS_ARTIFACT)
}

/// A model evaluation fetched from the platform.
///
/// The record is captured once at construction and never refreshed; resolve
/// again to observe server-side changes. Pipeline and artifact lookups hit the
/// platform on every call.
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    name: EvaluationName,
    record: EvaluationRecord,
    context: ConnectionContext,
    clients: PlatformClients,
}

impl ModelEvaluation {
    /// Fetches an evaluation by fully-qualified name, or by bare id plus `model_id`.
    ///
    /// # Errors
    /// `InvalidArgument` if the name cannot be qualified, `Remote` if the fetch fails.
    pub async fn resolve(
        evaluation_name: &str,
        model_id: Option<&str>,
        context: ConnectionContext,
        clients: PlatformClients,
    ) -> EvaluationResult<Self> {
        let name = EvaluationName::resolve(evaluation_name, model_id, &context)?;
        let context = context.scoped_to(&name.model);
        debug!(name = %name, "Fetching model evaluation");

        let record = clients.resources.fetch_evaluation(&name, &context).await?;
        Ok(Self {
            name,
            record,
            context,
            clients,
        })
    }

    /// Lists the evaluations of a model in service order.
    ///
    /// # Errors
    /// `InvalidArgument` if `model_id` cannot be qualified, `Remote` if listing
    /// fails or the service returns a malformed evaluation name.
    pub async fn list(
        model_id: &str,
        context: ConnectionContext,
        clients: PlatformClients,
    ) -> EvaluationResult<Vec<Self>> {
        let model = ModelName::resolve(model_id, &context)?;
        let context = context.scoped_to(&model);
        let records = clients.resources.list_evaluations(&model, &context).await?;
        debug!(model = %model, count = records.len(), "Listed model evaluations");

        records
            .into_iter()
            .map(|record| -> EvaluationResult<Self> {
                let name = EvaluationName::parse(&record.name)
                    .map_err(|e| EvaluationError::Remote(PlatformError::Decode(e.to_string())))?;
                Ok(Self {
                    name,
                    record,
                    context: context.clone(),
                    clients: clients.clone(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn name(&self) -> &EvaluationName {
        &self.name
    }

    #[must_use]
    pub fn evaluation_id(&self) -> &str {
        &self.name.evaluation
    }

    #[must_use]
    pub fn model_name(&self) -> &ModelName {
        &self.name.model
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.record.display_name.as_deref()
    }

    #[must_use]
    pub fn metrics_schema_uri(&self) -> Option<&str> {
        self.record.metrics_schema_uri.as_deref()
    }

    #[must_use]
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.record.create_time
    }

    #[must_use]
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.record.metadata
    }

    #[must_use]
    pub fn record(&self) -> &EvaluationRecord {
        &self.record
    }

    #[must_use]
    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// The evaluation metrics.
    ///
    /// # Errors
    /// `MissingMetrics` when the record carries none, usually because the
    /// evaluation job failed.
    pub fn metrics(&self) -> EvaluationResult<&Map<String, Value>> {
        if self.record.metrics.is_empty() {
            return Err(EvaluationError::MissingMetrics {
                name: self.name.to_string(),
            });
        }
        Ok(&self.record.metrics)
    }

    /// The pipeline job that produced this evaluation, if any.
    pub async fn backing_pipeline_job(&self) -> EvaluationResult<Option<PipelineJob>> {
        let Some(reference) = self.record.pipeline_job_reference() else {
            return Ok(None);
        };
        debug!(
            evaluation = %self.name,
            pipeline_job = %reference,
            "Fetching backing pipeline job"
        );
        let job = self
            .clients
            .pipelines
            .fetch_pipeline_job(reference, &self.context)
            .await?;
        Ok(Some(job))
    }

    /// Traces the evaluation to its metrics artifact, reporting why none was found.
    pub async fn trace_producing_artifact(&self) -> EvaluationResult<ArtifactTrace> {
        let Some(job) = self.backing_pipeline_job().await? else {
            return Ok(ArtifactTrace::NoBackingPipeline);
        };
        let Some(reference) = find_evaluation_metrics_artifact(&job) else {
            info!(
                evaluation = %self.name,
                pipeline_job = %job.name,
                "Pipeline job has no evaluation_metrics artifact"
            );
            return Ok(ArtifactTrace::NoMatchingArtifact {
                pipeline_job: job.name.clone(),
            });
        };

        let artifact = self
            .clients
            .artifacts
            .fetch_artifact(&reference.name, &self.context)
            .await?;
        Ok(ArtifactTrace::Found { artifact })
    }

    /// The `evaluation_metrics` artifact written by the producing pipeline.
    ///
    /// `None` both when there is no backing pipeline and when the pipeline has
    /// no matching artifact; use [`Self::trace_producing_artifact`] to tell them apart.
    pub async fn producing_artifact(&self) -> EvaluationResult<Option<Artifact>> {
        Ok(self.trace_producing_artifact().await?.into_artifact())
    }

    /// Always fails: the platform cannot delete model evaluations.
    pub fn delete(&self) -> EvaluationResult<()> {
        Err(EvaluationError::NotImplemented(format!(
            "deleting model evaluation {} is not supported",
            self.name
        )))
    }
}
