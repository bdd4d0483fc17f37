//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::broadcast;

use scaffold_commands::{handler_fn, Command};
use scaffold_host::{HostEvent, Output};
use scaffold_types::HostConfig;

/// Manifest name that exists nowhere above a temp dir.
pub const UNREACHABLE_MANIFEST: &str = "scaffold-unreachable-3f9c2a.json";

/// A temporary project directory with a manifest.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// A project whose manifest names it `demo` at version `1.0.0`.
    pub fn new() -> Self {
        Self::with_manifest(
            r#"{"name":"demo","version":"1.0.0","description":"Demo project","private":true}"#,
        )
    }

    pub fn with_manifest(manifest: &str) -> Self {
        let dir = TempDir::new().expect("should create temp project dir");
        std::fs::write(dir.path().join("scaffold.json"), manifest).expect("should write manifest");
        Self { dir }
    }

    /// A directory with no manifest in it.
    pub fn without_manifest() -> Self {
        Self {
            dir: TempDir::new().expect("should create temp project dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn commands_dir(&self) -> PathBuf {
        self.path().join("commands")
    }

    /// Write `commands/<stem>.toml`.
    pub fn command(&self, stem: &str, definition: &str) -> &Self {
        let dir = self.commands_dir();
        std::fs::create_dir_all(&dir).expect("should create commands dir");
        std::fs::write(dir.join(format!("{stem}.toml")), definition)
            .expect("should write command definition");
        self
    }

    /// Write an executable script next to the definitions.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let dir = self.commands_dir();
        std::fs::create_dir_all(&dir).expect("should create commands dir");
        let path = dir.join(name);
        std::fs::write(&path, body).expect("should write script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("should make script executable");
        }
        path
    }

    /// Write a file under `assets/`.
    pub fn asset(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join("assets").join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("should create asset dir");
        }
        std::fs::write(&path, content).expect("should write asset");
        path
    }

    /// Write any file relative to the project root.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("should create parent dir");
        }
        std::fs::write(&path, content).expect("should write file");
        path
    }

    /// Host configuration rooted at this project, parsing `argv` from 0.
    pub fn config<I, S>(&self, argv: I) -> HostConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HostConfig {
            start_dir: Some(self.path().to_path_buf()),
            ..HostConfig::with_argv(argv)
        }
    }
}

/// Names of commands in the order they ran.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &RunLog) -> Vec<String> {
    log.lock().expect("run log lock").clone()
}

/// A command that records its name and returns it.
pub fn recording_command(name: &str, log: &RunLog) -> Command {
    let log = Arc::clone(log);
    let label = name.to_string();
    Command::new(name).with_handler(handler_fn(move |_ctx, _opts| {
        let log = Arc::clone(&log);
        let label = label.clone();
        async move {
            log.lock().expect("run log lock").push(label.clone());
            Ok(json!(label))
        }
    }))
}

/// A command that records its name and then fails.
pub fn failing_command(name: &str, log: &RunLog) -> Command {
    let log = Arc::clone(log);
    let label = name.to_string();
    Command::new(name).with_handler(handler_fn(move |_ctx, _opts| {
        let log = Arc::clone(&log);
        let label = label.clone();
        async move {
            log.lock().expect("run log lock").push(label.clone());
            Err::<Value, _>(anyhow::anyhow!("{label} exploded"))
        }
    }))
}

/// A command that returns the options it received as JSON.
pub fn options_command(name: &str) -> Command {
    Command::new(name).with_handler(handler_fn(|_ctx, opts| async move { Ok(opts.to_json()) }))
}

/// An output sink that records instead of printing.
pub fn capture() -> Output {
    Output::capture(false)
}

/// Wait for the next event, failing the test after a second.
pub async fn next_event(rx: &mut broadcast::Receiver<HostEvent>) -> HostEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event should arrive")
        .expect("event channel should stay open")
}

pub fn strings(values: &[Value]) -> Vec<&str> {
    values.iter().filter_map(Value::as_str).collect()
}
