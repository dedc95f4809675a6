//! Records returned by the platform, in the service's camelCase JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata key that references the pipeline job which produced an evaluation.
pub const PIPELINE_JOB_METADATA_KEY: &str = "pipeline_job_resource_name";

/// Name of both the task output collection and the artifact that hold
/// evaluation metrics in a pipeline run.
pub const EVALUATION_METRICS_ARTIFACT: &str = "evaluation_metrics";

/// The service sends `null` for unset struct fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single evaluation of a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    /// Fully-qualified resource name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_schema_uri: Option<String>,
    /// Metric name to value. Empty when the evaluation job failed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

impl EvaluationRecord {
    /// The producing pipeline job's resource name, if the metadata carries one.
    #[must_use]
    pub fn pipeline_job_reference(&self) -> Option<&str> {
        self.metadata
            .get(PIPELINE_JOB_METADATA_KEY)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// A pipeline (orchestration) run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJob {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_detail: Option<PipelineJobDetail>,
}

impl PipelineJob {
    /// Tasks in the order the service returned them.
    #[must_use]
    pub fn task_details(&self) -> &[PipelineTaskDetail] {
        self.job_detail
            .as_ref()
            .map(|detail| detail.task_details.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJobDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_details: Vec<PipelineTaskDetail>,
}

/// One executed step of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTaskDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_name: String,
    /// Named output collections.
    #[serde(default, deserialize_with = "null_as_default")]
    pub outputs: BTreeMap<String, ArtifactList>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub artifacts: Vec<Artifact>,
}

/// An artifact in the platform's metadata store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Fully-qualified resource name.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}
