//! REST client for the platform API.
//!
//! Issues plain `GET {endpoint}/v1/{resource_name}` requests. Credentials
//! are taken from the connection context as an opaque bearer token.

use crate::config::{DEFAULT_TIMEOUT_SECS, PlatformConfig};
use aiplatform_abstraction::{
    Artifact, ArtifactClient, ConnectionContext, EvaluationName, EvaluationRecord, ModelName,
    OrchestrationClient, PipelineJob, PlatformError, PlatformResult, RemoteResourceClient,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

const API_VERSION: &str = "v1";
const LIST_PAGE_SIZE: &str = "100";

/// HTTP implementation of the platform client traits.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    /// Fixed endpoint; regional endpoints are derived per request when unset.
    endpoint: Option<String>,
    /// HTTP client for making requests.
    client: Client,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEvaluationsResponse {
    #[serde(default)]
    model_evaluations: Vec<EvaluationRecord>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl HttpPlatformClient {
    /// Creates a client that talks to the regional endpoint of each request's location.
    ///
    /// # Errors
    /// Returns a `PlatformError` if the HTTP client cannot be created.
    pub fn new() -> PlatformResult<Self> {
        Self::build(None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client bound to a fixed endpoint (e.g. a private endpoint or a test server).
    ///
    /// # Errors
    /// Returns a `PlatformError` if the HTTP client cannot be created.
    pub fn with_endpoint(endpoint: String) -> PlatformResult<Self> {
        Self::build(Some(endpoint), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    /// Returns a `PlatformError` if the HTTP client cannot be created.
    pub fn from_config(config: &PlatformConfig) -> PlatformResult<Self> {
        Self::build(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs_or_default()),
        )
    }

    fn build(endpoint: Option<String>, timeout: Duration) -> PlatformResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Request(format!("Failed to build HTTP client: {e}")))?;
        let endpoint = endpoint.map(|e| e.trim_end_matches('/').to_string());
        Ok(Self { endpoint, client })
    }

    /// Base URL for a resource, preferring the location embedded in its name.
    fn base_url(&self, resource_name: &str, context: &ConnectionContext) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        let location = location_of(resource_name)
            .unwrap_or_else(|| context.location_or_default());
        format!("https://{location}-aiplatform.googleapis.com")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource_name: &str,
        query: &[(&str, &str)],
        context: &ConnectionContext,
    ) -> PlatformResult<T> {
        let url = format!(
            "{}/{API_VERSION}/{resource_name}",
            self.base_url(resource_name, context)
        );
        debug!(url = %url, "Platform GET");

        let mut request = self.client.get(&url).query(query);
        if let Some(credentials) = &context.credentials {
            request = request.bearer_auth(credentials.token());
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to reach platform API");
            if e.is_timeout() {
                PlatformError::Request(format!("Request to {url} timed out"))
            } else {
                PlatformError::Request(format!("Network error: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Request(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            error!(
                status = %status,
                resource = %resource_name,
                "Platform API returned error status"
            );
            return Err(status_error(status, resource_name, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| PlatformError::Decode(format!("{resource_name}: {e}")))
    }
}

/// `projects/{p}/locations/{location}/...` -> `location`
fn location_of(resource_name: &str) -> Option<&str> {
    let mut segments = resource_name.split('/');
    while let Some(segment) = segments.next() {
        if segment == "locations" {
            return segments.next().filter(|location| !location.is_empty());
        }
    }
    None
}

fn status_error(status: StatusCode, resource_name: &str, body: &str) -> PlatformError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });

    match status {
        StatusCode::NOT_FOUND => PlatformError::NotFound(format!("{resource_name}: {message}")),
        StatusCode::UNAUTHORIZED => PlatformError::Unauthenticated(message),
        StatusCode::FORBIDDEN => PlatformError::PermissionDenied(message),
        _ => PlatformError::Status {
            code: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl RemoteResourceClient for HttpPlatformClient {
    async fn fetch_evaluation(
        &self,
        name: &EvaluationName,
        context: &ConnectionContext,
    ) -> PlatformResult<EvaluationRecord> {
        self.get_json(&name.to_string(), &[], context).await
    }

    async fn list_evaluations(
        &self,
        model: &ModelName,
        context: &ConnectionContext,
    ) -> PlatformResult<Vec<EvaluationRecord>> {
        let collection = model.evaluations_path();
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let page: ListEvaluationsResponse =
                self.get_json(&collection, &query, context).await?;
            debug!(
                model = %model,
                page_len = page.model_evaluations.len(),
                "Listed evaluation page"
            );
            records.extend(page.model_evaluations);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl OrchestrationClient for HttpPlatformClient {
    async fn fetch_pipeline_job(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<PipelineJob> {
        self.get_json(name, &[], context).await
    }
}

#[async_trait]
impl ArtifactClient for HttpPlatformClient {
    async fn fetch_artifact(
        &self,
        name: &str,
        context: &ConnectionContext,
    ) -> PlatformResult<Artifact> {
        self.get_json(name, &[], context).await
    }
}
