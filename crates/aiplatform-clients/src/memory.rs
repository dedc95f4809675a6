//! In-memory platform client.
//!
//! Serves evaluations, pipeline jobs and artifacts from fixed tables and
//! records every call it receives. Used by tests and offline demos.

use aiplatform_abstraction::{
    Artifact, ArtifactClient, ConnectionContext, EvaluationName, EvaluationRecord, ModelName,
    OrchestrationClient, PipelineJob, PlatformError, PlatformResult, RemoteResourceClient,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    FetchEvaluation,
    ListEvaluations,
    FetchPipelineJob,
    FetchArtifact,
}

/// One request received by the in-memory client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub name: String,
    pub context: ConnectionContext,
}

#[derive(Debug, Default)]
pub struct InMemoryPlatformClient {
    evaluations: Vec<EvaluationRecord>,
    pipeline_jobs: HashMap<String, PipelineJob>,
    artifacts: HashMap<String, Artifact>,
    failure: Mutex<Option<PlatformError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl InMemoryPlatformClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an evaluation. Listing returns evaluations in insertion order.
    #[must_use]
    pub fn with_evaluation(mut self, record: EvaluationRecord) -> Self {
        self.evaluations.retain(|existing| existing.name != record.name);
        self.evaluations.push(record);
        self
    }

    #[must_use]
    pub fn with_pipeline_job(mut self, job: PipelineJob) -> Self {
        self.pipeline_jobs.insert(job.name.clone(), job);
        self
    }

    #[must_use]
    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.insert(artifact.name.clone(), artifact);
        self
    }

    /// Makes every following call fail with `error` until [`Self::clear_failure`].
    pub fn fail_with(&self, error: PlatformError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn call_count(&self, kind: CallKind) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.kind == kind)
            .count()
    }

    fn record(
        &self,
        kind: CallKind,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<()> {
        debug!(kind = ?kind, name = %name, "InMemoryPlatformClient call");
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedCall {
            kind,
            name: name.to_string(),
            context: context.clone(),
        });
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteResourceClient for InMemoryPlatformClient {
    async fn fetch_evaluation(
        &self,
        name: &EvaluationName,
        context: &ConnectionContext,
    ) -> PlatformResult<EvaluationRecord> {
        let name = name.to_string();
        self.record(CallKind::FetchEvaluation, &name, context)?;
        self.evaluations
            .iter()
            .find(|record| record.name == name)
            .cloned()
            .ok_or(PlatformError::NotFound(name))
    }

    async fn list_evaluations(
        &self,
        model: &ModelName,
        context: &ConnectionContext,
    ) -> PlatformResult<Vec<EvaluationRecord>> {
        let collection = model.evaluations_path();
        self.record(CallKind::ListEvaluations, &collection, context)?;
        let prefix = format!("{collection}/");
        Ok(self
            .evaluations
            .iter()
            .filter(|record| record.name.starts_with(&prefix))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrchestrationClient for InMemoryPlatformClient {
    async fn fetch_pipeline_job(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<PipelineJob> {
        self.record(CallKind::FetchPipelineJob, name, context)?;
        self.pipeline_jobs
            .get(name)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl ArtifactClient for InMemoryPlatformClient {
    async fn fetch_artifact(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<Artifact> {
        self.record(CallKind::FetchArtifact, name, context)?;
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))
    }
}
