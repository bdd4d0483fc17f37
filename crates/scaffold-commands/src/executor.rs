//! Script handler -- runs a command definition's script as a subprocess.
//!
//! The resolved options are written to the script's stdin as one JSON object.
//! Stdout is parsed as JSON when possible and returned as a trimmed string
//! otherwise. A non-zero exit fails the command with the script's stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as Process;
use tracing::debug;

use crate::options::ResolvedOptions;
use crate::sdk::{CommandContext, RunHandler};

/// Maximum stdout size we will accept from a script (10 MB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Runs a script file with the resolved options on stdin.
#[derive(Debug, Clone)]
pub struct ScriptHandler {
    script: PathBuf,
    /// No limit when `None`.
    timeout: Option<Duration>,
}

impl ScriptHandler {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

#[async_trait]
impl RunHandler for ScriptHandler {
    async fn run(&self, ctx: CommandContext, options: ResolvedOptions) -> Result<Value> {
        if !self.script.is_file() {
            bail!("script does not exist: {}", self.script.display());
        }

        let input = serde_json::to_string(&options.to_json()).context("failed to serialize options")?;
        let (program, args) = resolve_interpreter(&self.script)?;

        debug!(
            command = ctx.command(),
            script = %self.script.display(),
            program = %program,
            "running command script"
        );

        let mut child = Process::new(&program)
            .args(&args)
            .current_dir(std::env::current_dir().context("failed to read current directory")?)
            .env("SCAFFOLD_COMMAND", ctx.command())
            .env("SCAFFOLD_SOURCE_PATH", ctx.source_path())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn script: {program}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            // scripts may exit without reading their input
            match stdin.write_all(input.as_bytes()).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(e).context("failed to write to script stdin");
                }
                _ => {}
            }
        }

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "script {} timed out after {:.0}s",
                        self.script.display(),
                        limit.as_secs_f64()
                    )
                })?,
            None => child.wait_with_output().await,
        }
        .context("script process failed")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".into());
            bail!("script exited with code {code}: {}", stderr.trim());
        }

        if output.stdout.len() > MAX_OUTPUT_BYTES {
            bail!(
                "script output exceeds maximum size ({} bytes > {MAX_OUTPUT_BYTES} bytes)",
                output.stdout.len()
            );
        }

        let stdout = std::str::from_utf8(&output.stdout).context("script produced non-UTF-8 output")?;
        Ok(serde_json::from_str::<Value>(stdout)
            .unwrap_or_else(|_| Value::String(stdout.trim().to_string())))
    }

    fn is_available(&self) -> bool {
        self.script.is_file()
    }
}

/// Determine the interpreter and arguments for a script from its extension.
///
/// Returns `(program, args)` where `args` includes the script path.
fn resolve_interpreter(script: &Path) -> Result<(String, Vec<String>)> {
    let ext = script.extension().and_then(|e| e.to_str()).unwrap_or("");

    let path_str = script
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("script path is not valid UTF-8"))?
        .to_string();

    match ext {
        "sh" | "bash" => Ok(("bash".into(), vec![path_str])),
        "py" => Ok(("python3".into(), vec![path_str])),
        "js" | "mjs" => Ok(("node".into(), vec![path_str])),
        "rb" => Ok(("ruby".into(), vec![path_str])),
        _ => Ok((path_str, vec![])),
    }
}
