//! Command definition parsing and validation.
//!
//! A command definition is a TOML file in the command directory declaring the
//! command's name, help text, option schema, shorthand, and the script that
//! runs it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use scaffold_types::{OptionSchema, ShorthandMap};

/// Maximum allowed length for a command name.
const MAX_NAME_LEN: usize = 64;

/// A parsed command definition file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDefinition {
    /// Command name. Falls back to the file stem when absent.
    pub name: Option<String>,
    /// One-line summary shown in the command overview.
    pub description: Option<String>,
    /// Full help text shown by `--help <command>`.
    pub help: Option<String>,
    /// Script run by the command, relative to the definition file.
    pub run: Option<String>,
    /// Optional wall-clock limit for the script. No limit when absent.
    pub timeout_secs: Option<u64>,
    /// Options this command understands.
    #[serde(default, alias = "option_schema")]
    pub args: OptionSchema,
    /// Short flags this command understands.
    #[serde(default)]
    pub shorthand: ShorthandMap,
}

/// Parse a command definition from a TOML string.
pub fn parse_definition(toml_str: &str) -> Result<CommandDefinition> {
    let definition: CommandDefinition =
        toml::from_str(toml_str).context("failed to parse command definition TOML")?;
    Ok(definition)
}

/// Parse and validate a command definition file.
pub fn parse_definition_file(path: &Path) -> Result<CommandDefinition> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let definition = parse_definition(&content)?;
    validate_definition(&definition)?;
    Ok(definition)
}

/// Validate a parsed definition.
///
/// Checks:
/// - An explicit name is 1-64 chars of alphanumerics, `-`, `_` or `:`
/// - The run script contains no path traversal (`..`)
/// - Shorthand keys are non-empty, do not start with `-`, and expand to at
///   least one token
pub fn validate_definition(definition: &CommandDefinition) -> Result<()> {
    if let Some(name) = &definition.name {
        validate_name(name)?;
    }
    if let Some(run) = &definition.run {
        validate_run_path(run)?;
    }
    for (short, expansion) in &definition.shorthand {
        if short.is_empty() || short.starts_with('-') {
            bail!("shorthand key must be a bare flag name, got: {short:?}");
        }
        if expansion.is_empty() {
            bail!("shorthand -{short} expands to nothing");
        }
    }
    Ok(())
}

/// Validate a command name, explicit or derived from a file stem.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("command name must not be empty");
    }
    if name.len() > MAX_NAME_LEN {
        bail!("command name exceeds maximum length of {MAX_NAME_LEN} characters: {name}");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
    {
        bail!("command name must contain only alphanumerics, '-', '_' or ':': {name}");
    }
    Ok(())
}

fn validate_run_path(run: &str) -> Result<()> {
    if run.is_empty() {
        bail!("run must not be empty");
    }
    if run.contains("..") {
        bail!("run must not contain path traversal (..): {run}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaffold_types::ValueKind;

    fn full_toml() -> &'static str {
        r#"
name = "build"
description = "Build the site"
help = "Usage: build [--out DIR]"
run = "build.sh"
timeout_secs = 30

[args]
out = "path"
verbose = { kind = "boolean", default = false }

[shorthand]
o = ["--out"]
v = ["--verbose"]
"#
    }

    #[test]
    fn parse_full_definition() {
        let def = parse_definition(full_toml()).unwrap();
        assert_eq!(def.name.as_deref(), Some("build"));
        assert_eq!(def.description.as_deref(), Some("Build the site"));
        assert_eq!(def.run.as_deref(), Some("build.sh"));
        assert_eq!(def.timeout_secs, Some(30));
        assert_eq!(def.args["out"].kind.value, ValueKind::Path);
        assert_eq!(def.shorthand["o"], vec!["--out"]);
        validate_definition(&def).unwrap();
    }

    #[test]
    fn parse_empty_definition() {
        let def = parse_definition("").unwrap();
        assert_eq!(def, CommandDefinition::default());
        validate_definition(&def).unwrap();
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let err = parse_definition("entry = \"x.sh\"\n").unwrap_err();
        assert!(
            format!("{err:#}").contains("entry"),
            "expected unknown field error, got: {err:#}"
        );
    }

    #[test]
    fn validate_rejects_traversal() {
        let mut def = parse_definition(full_toml()).unwrap();
        def.run = Some("../../bin/rm".into());
        let err = validate_definition(&def).unwrap_err();
        assert!(err.to_string().contains("path traversal"), "got: {err}");
    }

    #[test]
    fn validate_rejects_bad_names() {
        let long = "x".repeat(65);
        for bad in ["", "rm -rf", "a;b", long.as_str()] {
            assert!(validate_name(bad).is_err(), "{bad:?} should be rejected");
        }
        for good in ["build", "db:migrate", "new_project", "x-1"] {
            validate_name(good).unwrap();
        }
    }

    #[test]
    fn validate_rejects_bad_shorthand() {
        let mut def = CommandDefinition::default();
        def.shorthand.insert("-o".into(), vec!["--out".into()]);
        assert!(validate_definition(&def).is_err());

        let mut def = CommandDefinition::default();
        def.shorthand.insert("o".into(), vec![]);
        assert!(validate_definition(&def).is_err());
    }

    #[test]
    fn parse_file_missing() {
        let err = parse_definition_file(Path::new("/nonexistent/cmd.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"), "got: {err}");
    }
}
