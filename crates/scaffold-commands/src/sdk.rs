//! Handler SDK -- the interface commands implement and the context they run in.
//!
//! A command's work is a [`RunHandler`]. The dispatcher awaits
//! [`run`](RunHandler::run) exactly once per invocation; the returned future
//! is the command's single-use completion. Handlers reach back into the host
//! (helpers, nested runs) through the [`CommandContext`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use scaffold_types::{HostConfig, PromptRequest, ScaffoldError};

use crate::options::ResolvedOptions;

/// The work a command performs.
#[async_trait]
pub trait RunHandler: Send + Sync {
    /// Run the command with its resolved options.
    ///
    /// `Ok` carries the command's result value; `Err` halts the batch.
    async fn run(&self, ctx: CommandContext, options: ResolvedOptions) -> Result<Value>;

    /// Whether the handler can currently be invoked. Checked at dispatch time,
    /// immediately before [`run`](Self::run).
    fn is_available(&self) -> bool {
        true
    }
}

/// What a running command can ask of the host.
///
/// Implemented by the host once it is ready; every path returned here is
/// already resolved.
#[async_trait]
pub trait HostHandle: Send + Sync {
    /// Directory containing the manifest.
    fn source_path(&self) -> &Path;

    /// Directory assets and templates are read from.
    fn asset_path(&self) -> &Path;

    fn config(&self) -> &HostConfig;

    /// Copy `src` (relative to the source path) into `dst` (relative to the
    /// current directory), creating `dst` first.
    async fn copy(&self, src: &Path, dst: &Path) -> Result<(), ScaffoldError>;

    /// Read an asset file as UTF-8.
    async fn read_asset(&self, name: &str) -> Result<String, ScaffoldError>;

    /// Load an asset template and render it with `vars`.
    async fn render_template(&self, name: &str, vars: &Value) -> Result<String, ScaffoldError>;

    /// Ask the user each question in order; one answer per request.
    async fn prompt(&self, requests: Vec<PromptRequest>) -> Result<Vec<String>, ScaffoldError>;

    /// Run another command by name with per-call option overrides.
    async fn run(&self, name: &str, overrides: Map<String, Value>) -> Result<Value, ScaffoldError>;
}

/// Context handed to a handler for one invocation.
#[derive(Clone)]
pub struct CommandContext {
    command: String,
    host: Arc<dyn HostHandle>,
}

impl CommandContext {
    pub fn new(command: impl Into<String>, host: Arc<dyn HostHandle>) -> Self {
        Self {
            command: command.into(),
            host,
        }
    }

    /// Name of the command being run.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn host(&self) -> &dyn HostHandle {
        self.host.as_ref()
    }

    pub fn source_path(&self) -> &Path {
        self.host.source_path()
    }

    pub fn config(&self) -> &HostConfig {
        self.host.config()
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("source_path", &self.host.source_path())
            .finish()
    }
}

/// A [`RunHandler`] backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> RunHandler for FnHandler<F>
where
    F: Fn(CommandContext, ResolvedOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn run(&self, ctx: CommandContext, options: ResolvedOptions) -> Result<Value> {
        (self.f)(ctx, options).await
    }
}

/// Wrap an async closure as a shareable handler.
///
/// ```
/// use scaffold_commands::{handler_fn, RunHandler};
///
/// let handler = handler_fn(|_ctx, _opts| async { Ok(serde_json::json!("ok")) });
/// assert!(handler.is_available());
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn RunHandler>
where
    F: Fn(CommandContext, ResolvedOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}

#[cfg(test)]
pub(crate) mod testing {
    //! A host stand-in for handler tests that never touch the real host.

    use std::path::PathBuf;

    use super::*;

    pub struct StubHost {
        pub source: PathBuf,
        pub config: HostConfig,
    }

    impl StubHost {
        pub fn context(command: &str, source: &Path) -> CommandContext {
            CommandContext::new(
                command,
                Arc::new(StubHost {
                    source: source.to_path_buf(),
                    config: HostConfig::default(),
                }),
            )
        }
    }

    #[async_trait]
    impl HostHandle for StubHost {
        fn source_path(&self) -> &Path {
            &self.source
        }

        fn asset_path(&self) -> &Path {
            &self.source
        }

        fn config(&self) -> &HostConfig {
            &self.config
        }

        async fn copy(&self, _src: &Path, _dst: &Path) -> Result<(), ScaffoldError> {
            Ok(())
        }

        async fn read_asset(&self, name: &str) -> Result<String, ScaffoldError> {
            Err(ScaffoldError::io(name.to_string(), "no assets in stub host"))
        }

        async fn render_template(&self, name: &str, _vars: &Value) -> Result<String, ScaffoldError> {
            Err(ScaffoldError::io(name.to_string(), "no templates in stub host"))
        }

        async fn prompt(&self, requests: Vec<PromptRequest>) -> Result<Vec<String>, ScaffoldError> {
            Ok(requests
                .into_iter()
                .map(|r| r.default.unwrap_or_default())
                .collect())
        }

        async fn run(&self, name: &str, _overrides: Map<String, Value>) -> Result<Value, ScaffoldError> {
            Err(ScaffoldError::CommandNotFound(name.to_string()))
        }
    }
}
