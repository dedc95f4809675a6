//! aip - command-line access to model evaluations on the managed ML platform.

mod commands;
mod config;

use aiplatform_clients::PlatformConfig;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{EvaluationCommand, OutputFormat};

/// Inspect model evaluations, their metrics and the pipeline artifacts that produced them.
#[derive(Parser, Debug)]
#[command(
    name = "aip",
    author,
    version,
    about = "Model evaluation inspector for the managed ML platform"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error); overrides the config files
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Project used to qualify bare ids (overrides AIPLATFORM_PROJECT)
    #[arg(long, global = true)]
    project: Option<String>,

    /// Location used to qualify bare ids (overrides AIPLATFORM_LOCATION)
    #[arg(long, global = true)]
    location: Option<String>,

    /// API endpoint (overrides AIPLATFORM_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Model evaluation commands
    #[command(subcommand)]
    Evaluation(EvaluationCommand),
}

impl Args {
    fn config_overrides(&self) -> PlatformConfig {
        PlatformConfig {
            project: self.project.clone(),
            location: self.location.clone(),
            endpoint: self.endpoint.clone(),
            log_level: self.log_level.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::load_config(&args.config_overrides())?;

    // Initialize tracing
    let level = match config.log_level.as_deref().unwrap_or("warn") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let output = if args.json { OutputFormat::Json } else { OutputFormat::Human };

    match args.command {
        Command::Evaluation(cmd) => commands::evaluation::execute(cmd, &config, output).await,
    }
}
