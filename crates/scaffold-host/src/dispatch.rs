//! Sequential command dispatch.
//!
//! A batch runs its commands strictly one after another: the next command
//! starts only after the previous one completed successfully. The first
//! failure stops the batch; results gathered before it are kept in the
//! [`DispatchReport`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use scaffold_commands::{merge_options, CommandContext, HostHandle, MergeRequest};
use scaffold_types::{OptionSchema, ScaffoldError, ShorthandMap};

use crate::host::HostState;

/// The outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// One result per successfully completed command, in order.
    pub results: Vec<Value>,
    /// The failure that stopped the batch.
    pub error: Option<ScaffoldError>,
    /// Unconsumed tokens after the last command ran, command names removed.
    pub remain: Vec<String>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The results, or the error that stopped the batch.
    pub fn into_result(self) -> Result<Vec<Value>, ScaffoldError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.results),
        }
    }
}

/// Resolves options and runs commands against a ready host state.
pub(crate) struct Dispatcher<'a> {
    pub state: &'a HostState,
    pub default_args: &'a OptionSchema,
    pub default_shorthand: &'a ShorthandMap,
    pub argv: &'a [String],
    pub start: usize,
    pub host: Arc<dyn HostHandle>,
}

impl Dispatcher<'_> {
    /// Run one command.
    ///
    /// Options are parsed from the host's token list against the default
    /// schema merged with the command's own. Every registered command name
    /// is removed from the unconsumed tokens, and `remain` is updated to
    /// what the command received.
    pub async fn run_one(
        &self,
        name: &str,
        overrides: &Map<String, Value>,
        remain: &mut Vec<String>,
    ) -> Result<Value, ScaffoldError> {
        let command = self
            .state
            .commands
            .get(name)
            .ok_or_else(|| ScaffoldError::CommandNotFound(name.to_string()))?;
        let handler = Arc::clone(
            command
                .runnable_handler()
                .ok_or_else(|| ScaffoldError::NotRunnable(name.to_string()))?,
        );

        let mut options = merge_options(MergeRequest {
            default_schema: self.default_args,
            command_schema: &command.option_schema,
            default_shorthand: self.default_shorthand,
            command_shorthand: &command.shorthand,
            argv: self.argv,
            start: self.start,
            overrides,
        });
        options
            .remain
            .retain(|token| !self.state.commands.contains(token));
        remain.clone_from(&options.remain);

        debug!(command = name, options = options.values.len(), "running command");
        let ctx = CommandContext::new(name, Arc::clone(&self.host));
        handler.run(ctx, options).await.map_err(|e| {
            warn!(command = name, error = %format!("{e:#}"), "command failed");
            ScaffoldError::command_failed(name, format!("{e:#}"))
        })
    }

    /// Run `names` in order, stopping at the first failure.
    pub async fn dispatch(&self, names: &[String]) -> DispatchReport {
        let mut report = DispatchReport::default();
        let no_overrides = Map::new();

        for name in names {
            match self.run_one(name, &no_overrides, &mut report.remain).await {
                Ok(value) => report.results.push(value),
                Err(err) => {
                    report.error = Some(err);
                    break;
                }
            }
        }

        debug!(
            completed = report.results.len(),
            requested = names.len(),
            failed = report.error.is_some(),
            "batch finished"
        );
        report
    }
}
