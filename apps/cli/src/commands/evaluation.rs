//! Model evaluation commands.
//!
//! Resolves an evaluation from the platform and prints its metrics, its
//! producing artifact, or the evaluations of a model.

use aiplatform_clients::{PlatformConfig, http_clients};
use aiplatform_evaluation::{ArtifactTrace, ModelEvaluation};
use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color as ComfyColor, Table};
use serde_json::Value;

use super::OutputFormat;

/// Evaluation command subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum EvaluationCommand {
    /// Show an evaluation's details
    Show {
        /// Fully-qualified evaluation name or bare evaluation id
        name: String,
        /// Owning model id, required with a bare evaluation id
        #[arg(short, long)]
        model_id: Option<String>,
    },
    /// Print an evaluation's metrics
    Metrics {
        /// Fully-qualified evaluation name or bare evaluation id
        name: String,
        /// Owning model id, required with a bare evaluation id
        #[arg(short, long)]
        model_id: Option<String>,
    },
    /// Trace an evaluation to the pipeline artifact that produced it
    Artifact {
        /// Fully-qualified evaluation name or bare evaluation id
        name: String,
        /// Owning model id, required with a bare evaluation id
        #[arg(short, long)]
        model_id: Option<String>,
    },
    /// List the evaluations of a model
    List {
        /// Model id or fully-qualified model name
        #[arg(short, long)]
        model_id: String,
    },
    /// Delete an evaluation (not supported by the platform)
    Delete {
        /// Fully-qualified evaluation name or bare evaluation id
        name: String,
        /// Owning model id, required with a bare evaluation id
        #[arg(short, long)]
        model_id: Option<String>,
    },
}

/// Execute the evaluation command.
pub async fn execute(
    cmd: EvaluationCommand,
    config: &PlatformConfig,
    output: OutputFormat,
) -> Result<()> {
    match cmd {
        EvaluationCommand::Show { name, model_id } => {
            let evaluation = resolve(&name, model_id.as_deref(), config).await?;
            show(&evaluation, output)
        }
        EvaluationCommand::Metrics { name, model_id } => {
            let evaluation = resolve(&name, model_id.as_deref(), config).await?;
            print_metrics(&evaluation, output)
        }
        EvaluationCommand::Artifact { name, model_id } => {
            let evaluation = resolve(&name, model_id.as_deref(), config).await?;
            let trace = evaluation
                .trace_producing_artifact()
                .await
                .context("Failed to trace producing artifact")?;
            print_trace(&evaluation, &trace, output)
        }
        EvaluationCommand::List { model_id } => list(&model_id, config, output).await,
        EvaluationCommand::Delete { name, model_id } => {
            let evaluation = resolve(&name, model_id.as_deref(), config).await?;
            evaluation.delete()?;
            Ok(())
        }
    }
}

async fn resolve(
    name: &str,
    model_id: Option<&str>,
    config: &PlatformConfig,
) -> Result<ModelEvaluation> {
    let clients = http_clients(config)?;
    let evaluation = ModelEvaluation::resolve(name, model_id, config.connection_context(), clients)
        .await
        .with_context(|| format!("Failed to resolve model evaluation '{name}'"))?;
    Ok(evaluation)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn show(evaluation: &ModelEvaluation, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(&serde_json::to_value(evaluation.record())?);
    }

    println!("{}", "Model Evaluation".bold().cyan());
    let record = evaluation.record();
    let created = evaluation
        .create_time()
        .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());

    println!("  Name:          {}", evaluation.name());
    println!("  Display name:  {}", or_dash(evaluation.display_name()));
    println!("  Schema:        {}", or_dash(evaluation.metrics_schema_uri()));
    println!("  Created:       {created}");
    println!("  Pipeline job:  {}", or_dash(record.pipeline_job_reference()));
    println!("  Metrics:       {}", record.metrics.len());
    Ok(())
}

fn print_metrics(evaluation: &ModelEvaluation, output: OutputFormat) -> Result<()> {
    let metrics = evaluation.metrics()?;
    if output == OutputFormat::Json {
        return print_json(&Value::Object(metrics.clone()));
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (name, value) in metrics {
        table.add_row(vec![
            Cell::new(name).fg(ComfyColor::Cyan),
            Cell::new(render_value(value)),
        ]);
    }

    println!("{}", table);
    println!();
    println!(
        "  {} {} metric(s) for {}",
        "✓".green(),
        metrics.len(),
        evaluation.name()
    );
    Ok(())
}

fn print_trace(
    evaluation: &ModelEvaluation,
    trace: &ArtifactTrace,
    output: OutputFormat,
) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(&serde_json::to_value(trace)?);
    }

    match trace {
        ArtifactTrace::Found { artifact } => {
            println!("{}", "Evaluation Metrics Artifact".bold().cyan());
            println!("  Name:          {}", artifact.name);
            println!("  Display name:  {}", artifact.display_name);
            println!("  URI:           {}", or_dash(artifact.uri.as_deref()));
            println!("  Schema:        {}", or_dash(artifact.schema_title.as_deref()));
        }
        ArtifactTrace::NoBackingPipeline => {
            println!(
                "  {} Evaluation {} was not produced by a managed pipeline",
                "•".dimmed(),
                evaluation.name()
            );
        }
        ArtifactTrace::NoMatchingArtifact { pipeline_job } => {
            println!(
                "  {} Pipeline job {} has no evaluation_metrics artifact",
                "•".dimmed(),
                pipeline_job
            );
        }
    }
    Ok(())
}

async fn list(model_id: &str, config: &PlatformConfig, output: OutputFormat) -> Result<()> {
    let clients = http_clients(config)?;
    let evaluations = ModelEvaluation::list(model_id, config.connection_context(), clients)
        .await
        .with_context(|| format!("Failed to list evaluations of model '{model_id}'"))?;

    if output == OutputFormat::Json {
        let records: Vec<_> = evaluations.iter().map(ModelEvaluation::record).collect();
        return print_json(&serde_json::to_value(&records)?);
    }

    if evaluations.is_empty() {
        println!(
            "  {} No evaluations found for model '{}'",
            "•".dimmed(),
            model_id
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Evaluation", "Display name", "Metrics", "Pipeline job"]);
    for evaluation in &evaluations {
        table.add_row(vec![
            Cell::new(evaluation.evaluation_id()).fg(ComfyColor::Cyan),
            Cell::new(or_dash(evaluation.display_name())),
            Cell::new(evaluation.record().metrics.len().to_string()),
            Cell::new(or_dash(evaluation.record().pipeline_job_reference())),
        ]);
    }

    println!("{}", table);
    println!();
    println!(
        "  {} Total: {} evaluation(s)",
        "✓".green(),
        evaluations.len()
    );
    Ok(())
}
