//! Replaceable collaborators behind the host's helper operations.
//!
//! Each helper (copy, read asset, render template, prompt) delegates to a
//! trait object so embedders and tests can swap the filesystem or the
//! terminal out. The defaults here are what the CLI uses.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use scaffold_types::{PromptRequest, ScaffoldError};

/// Copies a file or directory tree.
#[async_trait]
pub trait Copier: Send + Sync {
    /// Copy `src` into the directory `dst`, creating `dst` first. Returns the
    /// number of files copied.
    async fn copy_tree(&self, src: &Path, dst: &Path) -> Result<u64, ScaffoldError>;
}

/// Reads asset files.
#[async_trait]
pub trait AssetReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<String, ScaffoldError>;
}

/// Compiles template source text.
pub trait TemplateLoader: Send + Sync {
    fn compile(&self, source: &str) -> Result<Template, ScaffoldError>;
}

/// Asks the user a question.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn ask(&self, request: &PromptRequest) -> Result<String, ScaffoldError>;
}

/// The set of collaborators a host uses.
#[derive(Clone)]
pub struct Collaborators {
    pub copier: Arc<dyn Copier>,
    pub assets: Arc<dyn AssetReader>,
    pub templates: Arc<dyn TemplateLoader>,
    pub prompter: Arc<dyn Prompter>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            copier: Arc::new(FsCopier),
            assets: Arc::new(FsAssetReader),
            templates: Arc::new(PlaceholderTemplates),
            prompter: Arc::new(TerminalPrompter),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Filesystem copier built on `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

#[async_trait]
impl Copier for FsCopier {
    async fn copy_tree(&self, src: &Path, dst: &Path) -> Result<u64, ScaffoldError> {
        let src = src.to_path_buf();
        let dst = dst.to_path_buf();
        tokio::task::spawn_blocking(move || copy_tree_blocking(&src, &dst))
            .await
            .map_err(|e| ScaffoldError::io("copy task", e))?
    }
}

fn copy_tree_blocking(src: &Path, dst: &Path) -> Result<u64, ScaffoldError> {
    std::fs::create_dir_all(dst).map_err(|e| ScaffoldError::io(dst.display().to_string(), e))?;

    if src.is_file() {
        let name = src
            .file_name()
            .ok_or_else(|| ScaffoldError::io(src.display().to_string(), "no file name"))?;
        copy_file(src, &dst.join(name))?;
        return Ok(1);
    }

    let mut copied = 0u64;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| ScaffoldError::io(src.display().to_string(), e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ScaffoldError::io(entry.path().display().to_string(), e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| ScaffoldError::io(target.display().to_string(), e))?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    debug!(src = %src.display(), dst = %dst.display(), copied, "copied tree");
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), ScaffoldError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ScaffoldError::io(parent.display().to_string(), e))?;
    }
    std::fs::copy(from, to).map_err(|e| ScaffoldError::io(from.display().to_string(), e))?;
    Ok(())
}

/// Reads assets as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetReader;

#[async_trait]
impl AssetReader for FsAssetReader {
    async fn read(&self, path: &Path) -> Result<String, ScaffoldError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ScaffoldError::io(path.display().to_string(), e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Key(String),
}

/// A compiled template: literal text interleaved with keys looked up at
/// render time. Dotted keys index into nested objects and arrays; missing
/// keys render as nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// A template with no placeholders.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Text(text.into())],
        }
    }

    /// Names of the keys the template refers to, in order of appearance.
    pub fn keys(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Key(key) => Some(key.as_str()),
                Segment::Text(_) => None,
            })
            .collect()
    }

    pub fn render(&self, vars: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Key(key) => match lookup(vars, key) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(Value::Null) | None => debug!(key = key.as_str(), "template key not set"),
                    Some(other) => out.push_str(&other.to_string()),
                },
            }
        }
        out
    }
}

fn lookup<'a>(vars: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(vars, |value, part| match value {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// `{{ key }}` placeholder templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderTemplates;

const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}";

impl TemplateLoader for PlaceholderTemplates {
    fn compile(&self, source: &str) -> Result<Template, ScaffoldError> {
        let pattern = Regex::new(PLACEHOLDER).map_err(|e| ScaffoldError::Config(e.to_string()))?;
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Key(key.as_str().to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Text(source[last..].to_string()));
        }
        Ok(Template { segments })
    }
}

/// Interactive terminal prompts through `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn ask(&self, request: &PromptRequest) -> Result<String, ScaffoldError> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            let answer = if request.silent {
                dialoguer::Password::new()
                    .with_prompt(&request.prompt)
                    .allow_empty_password(true)
                    .interact()
            } else {
                let mut input = dialoguer::Input::<String>::new()
                    .with_prompt(&request.prompt)
                    .allow_empty(true);
                if let Some(default) = &request.default {
                    input = input.default(default.clone());
                }
                input.interact_text()
            };
            answer.map_err(|e| ScaffoldError::io("prompt", e))
        })
        .await
        .map_err(|e| ScaffoldError::io("prompt task", e))?
    }
}

/// Answers prompts from a fixed list, falling back to each request's
/// default. For non-interactive runs and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&self, request: &PromptRequest) -> Result<String, ScaffoldError> {
        let next = self
            .answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.or_else(|| request.default.clone()).ok_or_else(|| {
            ScaffoldError::io(request.prompt.clone(), "no scripted answer and no default")
        })
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub(crate) fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn copies_directory_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("template");
        std::fs::create_dir_all(src.join("nested/deeper")).unwrap();
        std::fs::write(src.join("a.txt"), "a").unwrap();
        std::fs::write(src.join("nested/deeper/b.txt"), "b").unwrap();
        let dst = tmp.path().join("out/site");

        let copied = FsCopier.copy_tree(&src, &dst).await.unwrap();
        assert_eq!(copied, 2);
        assert_eq!(std::fs::read_to_string(dst.join("a.txt")).unwrap(), "a");
        assert_eq!(
            std::fs::read_to_string(dst.join("nested/deeper/b.txt")).unwrap(),
            "b"
        );
    }

    #[tokio::test]
    async fn copies_single_file_into_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("README.md");
        std::fs::write(&src, "hello").unwrap();
        let dst = tmp.path().join("out");

        assert_eq!(FsCopier.copy_tree(&src, &dst).await.unwrap(), 1);
        assert_eq!(std::fs::read_to_string(dst.join("README.md")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn reads_assets() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("banner.txt"), "hi there").unwrap();

        let text = FsAssetReader.read(&tmp.path().join("banner.txt")).await.unwrap();
        assert_eq!(text, "hi there");

        let err = FsAssetReader.read(&tmp.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { .. }));
    }

    #[test]
    fn renders_placeholders() {
        let vars = json!({
            "name": "site",
            "author": { "email": "dev@example.com" },
            "port": 8080,
            "tags": ["a", "b"]
        });
        let template = PlaceholderTemplates
            .compile("{{name}} by {{ author.email }} on :{{port}} [{{tags.1}}]{{missing}}")
            .unwrap();
        assert_eq!(
            template.keys(),
            vec!["name", "author.email", "port", "tags.1", "missing"]
        );
        assert_eq!(template.render(&vars), "site by dev@example.com on :8080 [b]");
    }

    #[test]
    fn leaves_non_placeholders_alone() {
        let template = PlaceholderTemplates.compile("{ single } {{ }} {{x").unwrap();
        assert!(template.keys().is_empty());
        assert_eq!(template, Template::literal("{ single } {{ }} {{x"));
        assert_eq!(template.render(&json!({"x": 1})), "{ single } {{ }} {{x");
    }

    #[tokio::test]
    async fn scripted_prompter_uses_answers_then_defaults() {
        let prompter = ScriptedPrompter::new(["first"]);

        let a = prompter.ask(&PromptRequest::new("one?")).await.unwrap();
        let b = prompter
            .ask(&PromptRequest::new("two?").with_default("fallback"))
            .await
            .unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("first", "fallback"));

        assert!(prompter.ask(&PromptRequest::new("three?")).await.is_err());
    }

    #[test]
    fn resolve_against_keeps_absolute_paths() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_against(base, Path::new("assets")), PathBuf::from("/srv/app/assets"));
        assert_eq!(resolve_against(base, Path::new("/opt/x")), PathBuf::from("/opt/x"));
    }
}
