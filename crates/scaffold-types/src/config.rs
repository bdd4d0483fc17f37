//! Host configuration.
//!
//! [`HostConfig`] is the single typed configuration object passed to the host
//! at construction. It can be built in code, or loaded from a TOML file and
//! then adjusted by `SCAFFOLD_*` environment variables. Values parsed from the
//! command line (`--silent`, `--help`, `--version`) are applied later by the
//! host and win over both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::option::{OptionSchema, ShorthandMap};
use crate::ScaffoldError;

/// Manifest file the locator searches for when none is configured.
pub const DEFAULT_MANIFEST_FILENAME: &str = "scaffold.json";

/// Command run when nothing is requested on the command line.
pub const DEFAULT_COMMAND: &str = "run";

/// Maximum config file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Construction-time configuration for a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Where the locator starts walking up. Defaults to the current directory.
    pub start_dir: Option<PathBuf>,
    /// Directory scanned for command definitions. Relative paths resolve
    /// against the source path; defaults to `<source>/commands`.
    #[serde(alias = "action_path")]
    pub command_path: Option<PathBuf>,
    /// Directory assets and templates are read from; defaults to `<source>/assets`.
    pub asset_path: Option<PathBuf>,
    /// Name of the manifest file that marks the source root.
    pub manifest_file: String,
    /// Commands run, in order, when none are requested.
    pub default_commands: Vec<String>,
    /// Global option schema merged under every command's own schema.
    pub default_args: OptionSchema,
    /// Global shorthand merged under every command's own shorthand.
    pub default_shorthand: ShorthandMap,
    /// Suppress all human-readable output.
    pub silent: bool,
    pub help: bool,
    pub version: bool,
    /// Raw token source. `None` means the process arguments.
    pub argv: Option<Vec<String>>,
    /// Offset into `argv` where option parsing starts. Defaults to 0 for a
    /// supplied `argv` and 1 for the process arguments.
    pub start_arg: Option<usize>,
    /// Commands to run instead of the positional tokens of `argv`.
    pub commands: Option<Vec<String>>,
    /// Run `main` automatically once the host is ready.
    pub run_main: bool,
    /// Pre-parse `argv` with the global schema to pick up core flags and
    /// positional command names.
    pub parse_opts: bool,
    /// Free-form values made available to command handlers.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            start_dir: None,
            command_path: None,
            asset_path: None,
            manifest_file: DEFAULT_MANIFEST_FILENAME.to_string(),
            default_commands: vec![DEFAULT_COMMAND.to_string()],
            default_args: OptionSchema::new(),
            default_shorthand: ShorthandMap::new(),
            silent: false,
            help: false,
            version: false,
            argv: None,
            start_arg: None,
            commands: None,
            run_main: true,
            parse_opts: true,
            extra: serde_json::Map::new(),
        }
    }
}

impl HostConfig {
    /// Configuration driven by an explicit token list instead of the process
    /// arguments.
    pub fn with_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: Some(argv.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ScaffoldError> {
        toml::from_str(content).map_err(|e| ScaffoldError::Config(e.to_string()))
    }

    /// Load a configuration file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ScaffoldError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| ScaffoldError::Config(format!("{}: {e}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ScaffoldError::Config(format!(
                "{} exceeds maximum size ({} bytes > {MAX_CONFIG_FILE_SIZE} bytes)",
                path.display(),
                metadata.len()
            )));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScaffoldError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SCAFFOLD_SILENT`, `SCAFFOLD_COMMAND_PATH` and
    /// `SCAFFOLD_ASSET_PATH` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SCAFFOLD_SILENT") {
            self.silent = matches!(value.trim(), "1" | "true" | "yes");
        }
        if let Some(value) = lookup("SCAFFOLD_COMMAND_PATH").filter(|v| !v.is_empty()) {
            self.command_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("SCAFFOLD_ASSET_PATH").filter(|v| !v.is_empty()) {
            self.asset_path = Some(PathBuf::from(value));
        }
    }

    /// The token list to parse and the offset parsing starts at.
    pub fn resolved_argv(&self) -> (Vec<String>, usize) {
        match &self.argv {
            Some(argv) => (argv.clone(), self.start_arg.unwrap_or(0)),
            None => (std::env::args().collect(), self.start_arg.unwrap_or(1)),
        }
    }

    /// Where the locator starts.
    pub fn resolved_start_dir(&self) -> Result<PathBuf, ScaffoldError> {
        match &self.start_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|e| ScaffoldError::io("current directory", e)),
        }
    }
}
