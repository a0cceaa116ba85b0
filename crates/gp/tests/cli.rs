//! End-to-end CLI tests for the `gp` binary.
//!
//! Each test creates a temporary repository and drives `gp` as a subprocess
//! via `assert_cmd`. Global git configuration is redirected into the temp
//! directory so the startup gate never writes to the real home.

use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Project {
    home: TempDir,
    repo: TempDir,
}

impl Project {
    /// A repository with one commit containing `a.txt`.
    fn new() -> Self {
        let project = Self {
            home: TempDir::new().unwrap(),
            repo: TempDir::new().unwrap(),
        };
        project.git(&["init", "-q"]);
        std::fs::write(project.repo.path().join("a.txt"), "alpha\n").unwrap();
        project.git(&["add", "a.txt"]);
        project.git(&["commit", "-q", "--no-gpg-sign", "-m", "first"]);
        project
    }

    fn envs(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "GIT_CONFIG_GLOBAL",
                self.home.path().join("gitconfig").display().to_string(),
            ),
            ("GIT_CONFIG_NOSYSTEM", "1".to_string()),
            ("GIT_AUTHOR_NAME", "Setup".to_string()),
            ("GIT_AUTHOR_EMAIL", "setup@example.com".to_string()),
            ("GIT_COMMITTER_NAME", "Setup".to_string()),
            ("GIT_COMMITTER_EMAIL", "setup@example.com".to_string()),
        ]
    }

    fn git(&self, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(self.repo.path())
            .envs(self.envs())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Build a `Command` targeting the cargo-built `gp` binary, pointed at
    /// this project's repository.
    fn gp(&self) -> Command {
        let mut cmd = Command::cargo_bin("gp").unwrap();
        cmd.current_dir(self.repo.path())
            .envs(self.envs())
            .env_remove("GITPLUMB_CONFIG");
        cmd
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn version_reports_git() {
    let project = Project::new();
    project
        .gp()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gp version"))
        .stdout(predicate::str::contains("git version"));
}

#[test]
fn version_json() {
    let project = Project::new();
    let output = project.gp().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["git"].as_str().is_some_and(|v| !v.is_empty()));
    assert!(json["git_path"].as_str().is_some());
}

#[test]
fn unsupported_git_fails_startup() {
    let project = Project::new();
    project
        .gp()
        .arg("version")
        .env("GITPLUMB_GIT__MIN_VERSION", "999.0.0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn missing_git_fails_startup() {
    let project = Project::new();
    project
        .gp()
        .arg("version")
        .env("GITPLUMB_GIT__EXECUTABLE", "definitely-not-a-git-binary-xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn tree_of_head_lists_entries() {
    let project = Project::new();
    let commit = project.git(&["rev-parse", "HEAD"]);
    let tree = project.git(&["rev-parse", "HEAD^{tree}"]);

    project
        .gp()
        .args(["tree", "HEAD"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("tree {tree}")))
        .stdout(predicate::str::contains(format!("resolved {commit}")))
        .stdout(predicate::str::contains("a.txt"));
}

#[test]
fn tree_json_distinguishes_ids() {
    let project = Project::new();
    let commit = project.git(&["rev-parse", "HEAD"]);
    let tree = project.git(&["rev-parse", "HEAD^{tree}"]);

    let output = project.gp().args(["--json", "tree", "HEAD"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], tree.as_str());
    assert_eq!(json["resolved_id"], commit.as_str());
    assert_eq!(json["entries"][0]["name"], "a.txt");
    assert_eq!(json["entries"][0]["kind"], "blob");
}

#[test]
fn tree_unknown_ref_fails() {
    let project = Project::new();
    project
        .gp()
        .args(["tree", "no-such-branch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-branch"));
}

#[test]
fn commit_tree_prints_new_commit() {
    let project = Project::new();
    let head = project.git(&["rev-parse", "HEAD"]);

    let output = project
        .gp()
        .args([
            "commit-tree",
            "HEAD",
            "-p",
            "HEAD",
            "-m",
            "from gp",
            "--name",
            "Jane Doe",
            "--email",
            "jane@example.com",
            "--no-gpg-sign",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(id.len(), 40);

    assert_eq!(
        project.git(&["log", "-1", "--format=%P|%an|%s", &id]),
        format!("{head}|Jane Doe|from gp")
    );
}

#[test]
fn fsck_clean_repository() {
    let project = Project::new();
    project
        .gp()
        .args(["fsck", "--timeout", "0", "--", "--no-dangling"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn fsck_corrupt_repository_fails() {
    let project = Project::new();
    let blob = project.git(&["rev-parse", "HEAD:a.txt"]);
    let object = project
        .repo
        .path()
        .join(".git/objects")
        .join(&blob[..2])
        .join(&blob[2..]);
    std::fs::remove_file(object).unwrap();

    project
        .gp()
        .args(["fsck", "--", "--no-dangling"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fsck failed"));
}

#[test]
fn config_file_overrides_identity() {
    let project = Project::new();
    let config = project.home.path().join("gitplumb.yaml");
    std::fs::write(
        &config,
        "git:\n  identity:\n    name: Config Bot\n    email: bot@example.com\n",
    )
    .unwrap();

    let output = project
        .gp()
        .arg("--config")
        .arg(&config)
        .args(["commit-tree", "HEAD", "-m", "configured", "--no-gpg-sign"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(
        project.git(&["log", "-1", "--format=%an <%ae>", &id]),
        "Config Bot <bot@example.com>"
    );
}
