//! Resolver behaviour against the in-memory platform client.

use aiplatform_abstraction::{
    Artifact, ArtifactList, ConnectionContext, EvaluationRecord, PipelineJob, PipelineJobDetail,
    PipelineTaskDetail, PlatformClients, PlatformError,
};
use aiplatform_clients::{CallKind, InMemoryPlatformClient};
use aiplatform_evaluation::{ArtifactTrace, EvaluationError, ModelEvaluation};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

const EVAL: &str = "projects/1/locations/us-central1/models/2/evaluations/3";
const PIPELINE: &str = "projects/1/locations/us-central1/pipelineJobs/eval-pipeline";
const ARTIFACT: &str = "projects/1/locations/us-central1/metadataStores/default/artifacts/42";

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn record(metrics: Value, metadata: Value) -> EvaluationRecord {
    EvaluationRecord {
        name: EVAL.to_string(),
        metrics: as_map(metrics),
        metadata: as_map(metadata),
        ..Default::default()
    }
}

fn bare_record(name: &str) -> EvaluationRecord {
    EvaluationRecord {
        name: name.to_string(),
        ..Default::default()
    }
}

fn artifact(name: &str, display_name: &str) -> Artifact {
    Artifact {
        name: name.to_string(),
        display_name: display_name.to_string(),
        ..Default::default()
    }
}

fn task(name: &str, outputs: Vec<(&str, Vec<Artifact>)>) -> PipelineTaskDetail {
    PipelineTaskDetail {
        task_name: name.to_string(),
        outputs: outputs
            .into_iter()
            .map(|(key, artifacts)| (key.to_string(), ArtifactList { artifacts }))
            .collect::<BTreeMap<_, _>>(),
        ..Default::default()
    }
}

fn pipeline(tasks: Vec<PipelineTaskDetail>) -> PipelineJob {
    PipelineJob {
        name: PIPELINE.to_string(),
        job_detail: Some(PipelineJobDetail {
            task_details: tasks,
        }),
        ..Default::default()
    }
}

fn pipeline_metadata() -> Value {
    json!({ "pipeline_job_resource_name": PIPELINE })
}

fn serving(record: EvaluationRecord) -> Arc<InMemoryPlatformClient> {
    Arc::new(InMemoryPlatformClient::new().with_evaluation(record))
}

fn clients(client: &Arc<InMemoryPlatformClient>) -> PlatformClients {
    PlatformClients::from_shared(client.clone())
}

async fn resolve(client: &Arc<InMemoryPlatformClient>) -> ModelEvaluation {
    ModelEvaluation::resolve(EVAL, None, ConnectionContext::new(), clients(client))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_concrete_scenario_metrics_without_pipeline() {
    let client = serving(record(json!({"auc": 0.91}), json!({})));
    let evaluation = resolve(&client).await;

    assert_eq!(evaluation.metrics().unwrap(), &as_map(json!({"auc": 0.91})));
    assert_eq!(evaluation.producing_artifact().await.unwrap(), None);
    assert_eq!(client.call_count(CallKind::FetchEvaluation), 1);
    assert_eq!(client.call_count(CallKind::FetchPipelineJob), 0);
    assert_eq!(client.call_count(CallKind::FetchArtifact), 0);
}

#[tokio::test]
async fn test_fully_qualified_name_scopes_context() {
    let client = serving(record(json!({"auc": 0.5}), json!({})));
    let context = ConnectionContext::new()
        .with_project("elsewhere")
        .with_location("europe-west4");
    let evaluation = ModelEvaluation::resolve(EVAL, None, context, clients(&client))
        .await
        .unwrap();

    assert_eq!(evaluation.evaluation_id(), "3");
    assert_eq!(evaluation.model_name().model, "2");
    let calls = client.calls();
    assert_eq!(calls[0].name, EVAL);
    assert_eq!(calls[0].context.project.as_deref(), Some("1"));
    assert_eq!(calls[0].context.location.as_deref(), Some("us-central1"));
}

#[tokio::test]
async fn test_bare_id_without_model_id_is_invalid_argument() {
    let client = Arc::new(InMemoryPlatformClient::new());
    let context = ConnectionContext::new().with_project("1");
    let result = ModelEvaluation::resolve("3", None, context, clients(&client)).await;

    assert!(matches!(result, Err(EvaluationError::InvalidArgument(_))));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_bare_id_with_model_id_resolves() {
    let client = serving(record(json!({"auc": 0.91}), json!({})));
    let context = ConnectionContext::new().with_project("1");
    let evaluation = ModelEvaluation::resolve("3", Some("2"), context, clients(&client))
        .await
        .unwrap();

    assert_eq!(evaluation.name().to_string(), EVAL);
}

#[tokio::test]
async fn test_remote_failure_propagates_unchanged() {
    let client = Arc::new(InMemoryPlatformClient::new());
    let outage = PlatformError::Status {
        code: 503,
        message: "unavailable".to_string(),
    };
    client.fail_with(outage.clone());

    let result =
        ModelEvaluation::resolve(EVAL, None, ConnectionContext::new(), clients(&client)).await;

    match result {
        Err(EvaluationError::Remote(err)) => assert_eq!(err, outage),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_evaluation_is_remote_not_found() {
    let client = Arc::new(InMemoryPlatformClient::new());
    let result =
        ModelEvaluation::resolve(EVAL, None, ConnectionContext::new(), clients(&client)).await;

    assert!(matches!(
        result,
        Err(EvaluationError::Remote(PlatformError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_metrics_are_stable_across_calls() {
    let metrics = json!({
        "auPrc": 0.8,
        "confidenceMetrics": [{"threshold": 0.5, "recall": 0.7}]
    });
    let client = serving(record(metrics.clone(), json!({})));
    let evaluation = resolve(&client).await;

    let first = evaluation.metrics().unwrap().clone();
    let second = evaluation.metrics().unwrap().clone();
    assert_eq!(first, as_map(metrics));
    assert_eq!(first, second);
    assert_eq!(client.call_count(CallKind::FetchEvaluation), 1);
}

#[tokio::test]
async fn test_empty_metrics_is_missing_metrics() {
    let client = serving(record(json!({}), json!({})));
    let evaluation = resolve(&client).await;

    for _ in 0..2 {
        let err = evaluation.metrics().unwrap_err();
        assert!(matches!(err, EvaluationError::MissingMetrics { .. }));
        assert!(err.to_string().contains("Check the job logs"));
    }
}

#[tokio::test]
async fn test_artifact_from_second_task() {
    let job = pipeline(vec![
        task(
            "feature-attribution",
            vec![(
                "feature_attributions",
                vec![artifact("fa", "feature_attributions")],
            )],
        ),
        task(
            "model-evaluation",
            vec![(
                "evaluation_metrics",
                vec![
                    artifact(ARTIFACT, "evaluation_metrics"),
                    artifact("later", "evaluation_metrics"),
                ],
            )],
        ),
    ]);
    let stored = Artifact {
        uri: Some("gs://bucket/metrics".to_string()),
        ..artifact(ARTIFACT, "evaluation_metrics")
    };
    let client = Arc::new(
        InMemoryPlatformClient::new()
            .with_evaluation(record(json!({"auc": 0.9}), pipeline_metadata()))
            .with_pipeline_job(job)
            .with_artifact(stored.clone()),
    );
    let evaluation = resolve(&client).await;

    assert_eq!(evaluation.producing_artifact().await.unwrap(), Some(stored));
    assert_eq!(client.call_count(CallKind::FetchPipelineJob), 1);
    assert_eq!(client.call_count(CallKind::FetchArtifact), 1);
    let artifact_call = client
        .calls()
        .into_iter()
        .find(|c| c.kind == CallKind::FetchArtifact)
        .unwrap();
    assert_eq!(artifact_call.name, ARTIFACT);
}

#[tokio::test]
async fn test_pipeline_without_matching_artifact_is_not_found() {
    let job = pipeline(vec![
        task("a", vec![("metrics", vec![artifact("x", "evaluation_metrics")])]),
        task("b", vec![("evaluation_metrics", vec![artifact("y", "summary")])]),
    ]);
    let client = Arc::new(
        InMemoryPlatformClient::new()
            .with_evaluation(record(json!({"auc": 0.9}), pipeline_metadata()))
            .with_pipeline_job(job),
    );
    let evaluation = resolve(&client).await;

    assert_eq!(evaluation.producing_artifact().await.unwrap(), None);
    assert_eq!(
        evaluation.trace_producing_artifact().await.unwrap(),
        ArtifactTrace::NoMatchingArtifact {
            pipeline_job: PIPELINE.to_string()
        }
    );
    assert_eq!(client.call_count(CallKind::FetchArtifact), 0);
}

#[tokio::test]
async fn test_trace_distinguishes_missing_pipeline() {
    let client = serving(record(json!({"auc": 0.9}), json!({"other": "x"})));
    let evaluation = resolve(&client).await;

    assert_eq!(
        evaluation.trace_producing_artifact().await.unwrap(),
        ArtifactTrace::NoBackingPipeline
    );
    assert_eq!(evaluation.backing_pipeline_job().await.unwrap(), None);
    assert_eq!(client.call_count(CallKind::FetchPipelineJob), 0);
}

#[tokio::test]
async fn test_pipeline_fetch_failure_propagates() {
    let client = serving(record(json!({"auc": 0.9}), pipeline_metadata()));
    let evaluation = resolve(&client).await;

    let err = evaluation.producing_artifact().await.unwrap_err();
    assert!(matches!(
        err,
        EvaluationError::Remote(PlatformError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_is_not_implemented() {
    let client = serving(bare_record(EVAL));
    let evaluation = resolve(&client).await;

    assert!(matches!(
        evaluation.delete(),
        Err(EvaluationError::NotImplemented(_))
    ));
    assert!(matches!(
        evaluation.delete(),
        Err(EvaluationError::NotImplemented(_))
    ));
}

#[tokio::test]
async fn test_list_returns_resolvers_in_service_order() {
    let client = Arc::new(
        InMemoryPlatformClient::new()
            .with_evaluation(record(json!({"auc": 0.9}), json!({})))
            .with_evaluation(bare_record(
                "projects/1/locations/us-central1/models/2/evaluations/1",
            )),
    );
    let context = ConnectionContext::new().with_project("1");

    let evaluations = ModelEvaluation::list("2", context, clients(&client))
        .await
        .unwrap();

    let ids: Vec<_> = evaluations
        .iter()
        .map(ModelEvaluation::evaluation_id)
        .collect();
    assert_eq!(ids, ["3", "1"]);
    assert!(evaluations[0].metrics().is_ok());
    assert!(matches!(
        evaluations[1].metrics(),
        Err(EvaluationError::MissingMetrics { .. })
    ));
    assert_eq!(client.call_count(CallKind::ListEvaluations), 1);
    assert_eq!(client.call_count(CallKind::FetchEvaluation), 0);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_resolver() {
    let job = pipeline(vec![task(
        "eval",
        vec![(
            "evaluation_metrics",
            vec![artifact(ARTIFACT, "evaluation_metrics")],
        )],
    )]);
    let client = Arc::new(
        InMemoryPlatformClient::new()
            .with_evaluation(record(json!({"auc": 0.9}), pipeline_metadata()))
            .with_pipeline_job(job)
            .with_artifact(artifact(ARTIFACT, "evaluation_metrics")),
    );
    let evaluation = Arc::new(resolve(&client).await);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let evaluation = evaluation.clone();
            tokio::spawn(async move { evaluation.producing_artifact().await })
        })
        .collect();
    for handle in handles {
        let found = handle.await.unwrap().unwrap();
        assert_eq!(found.map(|a| a.name), Some(ARTIFACT.to_string()));
    }
    assert_eq!(client.call_count(CallKind::FetchArtifact), 4);
}
