//! Remote client abstraction for the managed ML platform.
//!
//! This crate defines the records the platform serves, its resource names,
//! and the client traits the evaluation resolver talks to. Transport,
//! authentication and retries live behind the traits.

pub mod error;
pub mod resource;
pub mod types;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub use error::{PlatformError, PlatformResult};
pub use resource::{
    ConnectionContext, Credentials, DEFAULT_LOCATION, EvaluationName, ModelName, ResourceNameError,
};
pub use types::{
    Artifact, ArtifactList, EVALUATION_METRICS_ARTIFACT, EvaluationRecord,
    PIPELINE_JOB_METADATA_KEY, PipelineJob, PipelineJobDetail, PipelineTaskDetail,
};

/// Reads model evaluation resources.
#[async_trait]
pub trait RemoteResourceClient: Send + Sync {
    /// Fetches a single evaluation.
    ///
    /// # Errors
    /// Returns a `PlatformError` if the request fails or the evaluation does not exist.
    async fn fetch_evaluation(
        &self,
        name: &EvaluationName,
        context: &ConnectionContext,
    ) -> PlatformResult<EvaluationRecord>;

    /// Lists every evaluation of `model` in service order.
    ///
    /// # Errors
    /// Returns a `PlatformError` if any page request fails.
    async fn list_evaluations(
        &self,
        model: &ModelName,
        context: &ConnectionContext,
    ) -> PlatformResult<Vec<EvaluationRecord>>;
}

/// Reads pipeline (orchestration) runs.
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    async fn fetch_pipeline_job(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<PipelineJob>;
}

/// Reads artifacts from the platform's metadata store.
#[async_trait]
pub trait ArtifactClient: Send + Sync {
    async fn fetch_artifact(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<Artifact>;
}

/// The three client handles a resolver needs.
#[derive(Clone)]
pub struct PlatformClients {
    pub resources: Arc<dyn RemoteResourceClient>,
    pub pipelines: Arc<dyn OrchestrationClient>,
    pub artifacts: Arc<dyn ArtifactClient>,
}

impl PlatformClients {
    #[must_use]
    pub fn new(
        resources: Arc<dyn RemoteResourceClient>,
        pipelines: Arc<dyn OrchestrationClient>,
        artifacts: Arc<dyn ArtifactClient>,
    ) -> Self {
        Self {
            resources,
            pipelines,
            artifacts,
        }
    }

    /// Uses one client that serves all three resource kinds.
    #[must_use]
    pub fn from_shared<C>(client: Arc<C>) -> Self
    where
        C: RemoteResourceClient + OrchestrationClient + ArtifactClient + 'static,
    {
        Self {
            resources: client.clone(),
            pipelines: client.clone(),
            artifacts: client,
        }
    }
}

impl fmt::Debug for PlatformClients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformClients").finish_non_exhaustive()
    }
}
