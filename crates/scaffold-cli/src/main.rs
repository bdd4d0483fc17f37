use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use scaffold_host::{Host, MainOutcome};
use scaffold_types::HostConfig;

/// Scaffold -- run the commands of the nearest scaffold.json project.
///
/// Everything after the host options is handed to the project: command
/// names, `--help`, `--version`, `--silent`, and each command's own options.
#[derive(Parser, Debug)]
#[command(
    name = "scaffold",
    about,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Host configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to start looking for the manifest from
    #[arg(long, value_name = "DIR")]
    start_dir: Option<PathBuf>,

    /// Commands and options for the project
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing with env filter (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let mut config = HostConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    config.argv = Some(cli.args);
    config.start_arg = Some(0);
    if let Some(dir) = cli.start_dir {
        config.start_dir = Some(dir);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let success = runtime.block_on(run(config));
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Initialize the host and run `main`. Errors have already been printed by
/// the host when this returns `false`.
async fn run(config: HostConfig) -> bool {
    let host = Host::new(config);

    if let Err(err) = host.initialize().await {
        debug!(error = %err, "initialization failed");
        return false;
    }

    let outcome = host.main().await;
    match &outcome {
        MainOutcome::Batch(report) => {
            for result in &report.results {
                match result {
                    Value::Null => {}
                    Value::String(text) => host.output().print(text),
                    other => host
                        .output()
                        .print(&serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())),
                }
            }
            debug!(
                completed = report.results.len(),
                failed = report.error.is_some(),
                "batch finished"
            );
        }
        MainOutcome::Info(_) | MainOutcome::Handled(_) => {}
    }
    outcome.is_success()
}
