//! Help and version text.

use async_trait::async_trait;

use scaffold_types::ScaffoldError;

use crate::host::HostState;

const RULE: &str =
    "=======================================================================";

/// Produces the text shown for `--help` and `--version`.
#[async_trait]
pub trait InfoProvider: Send + Sync {
    /// Help for the first requested command, or an overview when it is not
    /// a registered command.
    async fn help(&self, state: &HostState, requested: &[String]) -> Result<String, ScaffoldError>;

    async fn version(&self, state: &HostState) -> Result<String, ScaffoldError>;
}

/// Help built from the manifest and each command's help or description.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInfo;

#[async_trait]
impl InfoProvider for DefaultInfo {
    async fn help(&self, state: &HostState, requested: &[String]) -> Result<String, ScaffoldError> {
        let command = requested.first().and_then(|name| state.commands.get(name));
        Ok(match command {
            Some(command) => match command.help_text() {
                Some(text) => format!("{}\n\n{text}", command.name),
                None => format!("{}\n\nNo help available.", command.name),
            },
            None => overview(state),
        })
    }

    async fn version(&self, state: &HostState) -> Result<String, ScaffoldError> {
        Ok(state
            .package
            .version
            .clone()
            .unwrap_or_else(|| "unknown".to_string()))
    }
}

fn overview(state: &HostState) -> String {
    let mut lines = Vec::new();
    if let Some(title) = state.package.title() {
        lines.push(title);
    }
    if let Some(description) = &state.package.description {
        lines.push(description.clone());
    }
    lines.push(RULE.to_string());

    let commands = state.commands.list();
    if commands.is_empty() {
        lines.push("No commands available.".to_string());
        return lines.join("\n");
    }

    lines.push("Commands:".to_string());
    let width = commands.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for command in commands {
        match &command.description {
            Some(description) => {
                lines.push(format!("  {:<width$}  {description}", command.name))
            }
            None => lines.push(format!("  {}", command.name)),
        }
    }
    lines.join("\n")
}
