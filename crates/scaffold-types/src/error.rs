//! Error types shared across all scaffold crates.

use std::path::PathBuf;

/// Errors surfaced by the host lifecycle and the command dispatcher.
///
/// The enum is `Clone` so a single pipeline failure can be handed to every
/// listener waiting on the readiness gate. Underlying causes are captured as
/// rendered strings for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaffoldError {
    /// No directory containing the manifest was found walking up from `start`.
    #[error("could not find {manifest} walking up from {}", start.display())]
    Locator { start: PathBuf, manifest: String },

    /// The manifest exists but could not be read.
    #[error("unable to read {}: {reason}", path.display())]
    ManifestRead { path: PathBuf, reason: String },

    /// The manifest was read but is not a valid JSON object.
    #[error("unable to parse {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },

    /// A command definition failed to load. Only the first failure of a scan
    /// is reported.
    #[error("unable to load: {} ({reason})", path.display())]
    CommandLoad { path: PathBuf, reason: String },

    #[error("unable to find handler for command: {0}")]
    CommandNotFound(String),

    #[error("command \"{0}\" does not have a run handler")]
    NotRunnable(String),

    /// A command handler completed with an error.
    #[error("command \"{name}\" failed: {reason}")]
    CommandFailed { name: String, reason: String },

    /// A caller-supplied initializer failed.
    #[error("initializer failed: {0}")]
    Initializer(String),

    /// The readiness gate was asked to move backwards or out of a terminal state.
    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// I/O failure inside a collaborator (copy, asset read, prompt).
    #[error("{context}: {reason}")]
    Io { context: String, reason: String },
}

impl ScaffoldError {
    /// Wrap a handler error. Pass `format_args!("{err:#}")` for an
    /// `anyhow::Error` to keep its context chain.
    pub fn command_failed(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::CommandFailed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`Io`](Self::Io) error from any displayable cause.
    pub fn io(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            context: context.into(),
            reason: err.to_string(),
        }
    }

    /// Short, stable name of the variant, used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Locator { .. } => "locator",
            Self::ManifestRead { .. } => "manifest_read",
            Self::ManifestParse { .. } => "manifest_parse",
            Self::CommandLoad { .. } => "command_load",
            Self::CommandNotFound(_) => "command_not_found",
            Self::NotRunnable(_) => "not_runnable",
            Self::CommandFailed { .. } => "command_failed",
            Self::Initializer(_) => "initializer",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Config(_) => "config",
            Self::Io { .. } => "io",
        }
    }
}
