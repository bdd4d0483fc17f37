//! Command discovery.
//!
//! A [`CommandSource`] populates a registry. [`DirectorySource`] scans a
//! directory for `*.toml` definition files; [`StaticSource`] hands over
//! commands built in code, which is how tests avoid the filesystem.
//!
//! Loading never stops at a broken definition: every loadable command is
//! registered and the first failure is reported alongside the registry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use scaffold_types::ScaffoldError;

use crate::command::Command;
use crate::definition::{parse_definition, validate_definition, validate_name};
use crate::registry::CommandRegistry;

/// File extension of command definition files.
pub const DEFINITION_EXTENSION: &str = "toml";

/// The outcome of populating a registry.
///
/// `error` holds the first load failure, if any. The registry still contains
/// every command that did load; whether that is acceptable is the caller's
/// decision.
#[derive(Debug, Default)]
pub struct RegistryLoad {
    pub registry: CommandRegistry,
    pub error: Option<ScaffoldError>,
}

impl RegistryLoad {
    /// Fold the registry and error into a `Result`, discarding the partial
    /// registry on error.
    pub fn into_result(self) -> Result<CommandRegistry, ScaffoldError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.registry),
        }
    }
}

/// Something that can produce the commands for a host.
#[async_trait]
pub trait CommandSource: Send + Sync {
    async fn load(&self) -> RegistryLoad;
}

/// Loads definitions from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl CommandSource for DirectorySource {
    async fn load(&self) -> RegistryLoad {
        load_commands(&self.dir).await
    }
}

/// Hands over a fixed set of commands.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    commands: Vec<Command>,
}

impl StaticSource {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

#[async_trait]
impl CommandSource for StaticSource {
    async fn load(&self) -> RegistryLoad {
        RegistryLoad {
            registry: self.commands.iter().cloned().collect(),
            error: None,
        }
    }
}

/// Load every definition file in `dir`.
///
/// Only regular files with the [`DEFINITION_EXTENSION`] are considered;
/// anything else is ignored. A directory that cannot be listed yields an
/// empty registry and no error. Files are processed in name order, so when
/// two definitions declare the same name the later file wins.
pub async fn load_commands(dir: &Path) -> RegistryLoad {
    let mut load = RegistryLoad::default();

    debug!(dir = %dir.display(), "loading command definitions");
    let candidates = match list_candidates(dir).await {
        Ok(candidates) => candidates,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "command directory not readable");
            return load;
        }
    };

    for path in candidates {
        debug!(path = %path.display(), "loading command definition");
        match load_one(&path).await {
            Ok(command) => {
                debug!(command = %command.name, path = %path.display(), "command loaded");
                load.registry.insert(command);
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "failed loading command definition");
                load.error.get_or_insert(ScaffoldError::CommandLoad { path, reason });
            }
        }
    }

    load
}

async fn list_candidates(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(DEFINITION_EXTENSION) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => candidates.push(path),
            _ => continue,
        }
    }

    candidates.sort();
    Ok(candidates)
}

async fn load_one(path: &Path) -> Result<Command, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    let definition = parse_definition(&content).map_err(|e| format!("{e:#}"))?;
    validate_definition(&definition).map_err(|e| format!("{e:#}"))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "file name is not valid UTF-8".to_string())?;
    if definition.name.is_none() {
        validate_name(stem).map_err(|e| e.to_string())?;
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(Command::from_definition(definition, stem, dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn loads_valid_definitions_and_names_them() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "build.toml", "description = \"Build\"\n");
        write(tmp.path(), "other.toml", "name = \"serve\"\n");

        let load = load_commands(tmp.path()).await;
        assert!(load.error.is_none());
        assert_eq!(load.registry.names(), vec!["build", "serve"]);
        assert_eq!(
            load.registry.get("build").unwrap().description.as_deref(),
            Some("Build")
        );
    }

    #[tokio::test]
    async fn ignores_other_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "build.toml", "");
        write(tmp.path(), "README.md", "# not a command");
        write(tmp.path(), "build.sh", "echo hi");
        std::fs::create_dir(tmp.path().join("nested.toml")).unwrap();

        let load = load_commands(tmp.path()).await;
        assert!(load.error.is_none());
        assert_eq!(load.registry.names(), vec!["build"]);
    }

    #[tokio::test]
    async fn keeps_loading_after_a_broken_file() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.toml", "");
        write(tmp.path(), "b.toml", "this is = = not toml");
        write(tmp.path(), "c.toml", "");
        write(tmp.path(), "d.toml", "args = 7");

        let load = load_commands(tmp.path()).await;
        assert_eq!(load.registry.names(), vec!["a", "c"]);

        match load.error {
            Some(ScaffoldError::CommandLoad { path, .. }) => {
                assert_eq!(path, tmp.path().join("b.toml"), "first failure is reported");
            }
            other => panic!("expected CommandLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn later_file_wins_on_duplicate_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.toml", "name = \"dup\"\ndescription = \"from a\"\n");
        write(tmp.path(), "b.toml", "name = \"dup\"\ndescription = \"from b\"\n");

        let load = load_commands(tmp.path()).await;
        assert!(load.error.is_none());
        assert_eq!(load.registry.len(), 1);
        assert_eq!(
            load.registry.get("dup").unwrap().description.as_deref(),
            Some("from b")
        );
    }

    #[tokio::test]
    async fn missing_directory_is_empty_not_an_error() {
        let load = load_commands(Path::new("/nonexistent/commands")).await;
        assert!(load.registry.is_empty());
        assert!(load.error.is_none());
    }

    #[tokio::test]
    async fn invalid_stem_is_a_load_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bad name.toml", "");

        let load = load_commands(tmp.path()).await;
        assert!(load.registry.is_empty());
        assert!(matches!(load.error, Some(ScaffoldError::CommandLoad { .. })));
    }

    #[tokio::test]
    async fn run_script_resolves_next_to_definition() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "hello.toml", "run = \"hello.sh\"\n");
        write(tmp.path(), "hello.sh", "echo hi\n");

        let load = DirectorySource::new(tmp.path()).load().await;
        let command = load.registry.get("hello").unwrap();
        assert!(command.is_runnable());
    }

    #[tokio::test]
    async fn static_source() {
        let source = StaticSource::default()
            .with(Command::new("one"))
            .with(Command::new("two"));
        let registry = source.load().await.into_result().unwrap();
        assert_eq!(registry.names(), vec!["one", "two"]);
    }
}
