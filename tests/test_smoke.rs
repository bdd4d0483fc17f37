//! End-to-end smoke test that invokes the `scaffold` binary.
//!
//! Each test builds a throwaway project in a temp directory and runs the
//! binary from inside it, so the manifest is found by walking up from the
//! working directory.
//!
//! The `scaffold` binary must be built before running these tests:
//!   cargo build -p scaffold-cli && cargo test --test test_smoke

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use std::sync::Once;

use common::{Project, UNREACHABLE_MANIFEST};

static BUILD_ONCE: Once = Once::new();

/// Ensure the scaffold binary is built, then return its path.
fn scaffold_bin() -> PathBuf {
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ should have a parent")
        .to_path_buf();

    BUILD_ONCE.call_once(|| {
        let status = std::process::Command::new("cargo")
            .args(["build", "-p", "scaffold-cli"])
            .current_dir(&workspace_root)
            .status()
            .expect("failed to invoke cargo build");
        assert!(status.success(), "cargo build -p scaffold-cli failed");
    });

    let bin = workspace_root.join("target").join("debug").join("scaffold");
    assert!(bin.exists(), "scaffold binary not found at {}", bin.display());
    bin
}

/// Get a Command for the `scaffold` binary running inside `project`.
fn scaffold_cmd(project: &Project) -> Command {
    let mut cmd = Command::new(scaffold_bin());
    cmd.current_dir(project.path());
    cmd.env_remove("SCAFFOLD_SILENT");
    cmd.env_remove("SCAFFOLD_COMMAND_PATH");
    cmd.env_remove("SCAFFOLD_ASSET_PATH");
    cmd
}

#[test]
fn version_prints_manifest_version() {
    let project = Project::new();

    scaffold_cmd(&project)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::diff("1.0.0\n"));
}

#[test]
fn help_lists_commands() {
    let project = Project::new();
    project
        .command("build", "description = \"Build the site\"\nrun = \"build.sh\"\n")
        .command("serve", "description = \"Serve it locally\"\n");
    project.script("build.sh", "#!/bin/bash\necho built\n");

    scaffold_cmd(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("demo 1.0.0")
                .and(predicate::str::contains("Commands:"))
                .and(predicate::str::contains("build  Build the site"))
                .and(predicate::str::contains("serve  Serve it locally")),
        );
}

#[test]
fn runs_script_command_from_nested_directory() {
    let project = Project::new();
    project.command("greet", "run = \"greet.sh\"\n\n[args]\nname = { kind = \"string\", default = \"world\" }\n");
    project.script(
        "greet.sh",
        "#!/bin/bash\ninput=$(cat)\nname=$(echo \"$input\" | sed -E 's/.*\"name\":\"([^\"]*)\".*/\\1/')\necho \"hello $name\"\n",
    );
    let nested = project.path().join("docs");
    std::fs::create_dir_all(&nested).expect("should create nested dir");

    let mut cmd = scaffold_cmd(&project);
    cmd.current_dir(&nested)
        .args(["greet", "--name", "smoke"])
        .assert()
        .success()
        .stdout(predicate::str::diff("hello smoke\n"));
}

#[test]
fn failing_command_exits_non_zero() {
    let project = Project::new();
    project.command("boom", "run = \"boom.sh\"\n");
    project.script("boom.sh", "#!/bin/bash\necho kaboom >&2\nexit 2\n");

    scaffold_cmd(&project)
        .arg("boom")
        .assert()
        .failure()
        .stderr(predicate::str::contains("command \"boom\" failed").and(predicate::str::contains("kaboom")));
}

#[test]
fn missing_manifest_fails() {
    let project = Project::without_manifest();
    let config = project.file(
        "host.toml",
        &format!("manifest_file = \"{UNREACHABLE_MANIFEST}\"\n"),
    );

    scaffold_cmd(&project)
        .args(["--config", config.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find"));
}

#[test]
fn silent_suppresses_output() {
    let project = Project::new();

    scaffold_cmd(&project)
        .args(["--version", "--silent"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
