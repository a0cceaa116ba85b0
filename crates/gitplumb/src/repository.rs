//! Repository handle and object resolution.
//!
//! A [`Repository`] pairs a verified [`Git`] with a working directory. All
//! object access goes through git's own plumbing (`rev-parse`, `cat-file`),
//! so the handle holds no state beyond its path.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::{CommandOutput, GitCommand, RunOptions};
use crate::error::{GitError, Result};
use crate::init::Git;
use crate::object_id::ObjectId;

/// The type of a stored object, as reported by `cat-file -t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A commit.
    Commit,
    /// A directory snapshot.
    Tree,
    /// File contents.
    Blob,
    /// An annotated tag.
    Tag,
}

impl ObjectKind {
    /// The name git uses for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }

    /// Parse git's name for an object kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "commit" => Some(ObjectKind::Commit),
            "tree" => Some(ObjectKind::Tree),
            "blob" => Some(ObjectKind::Blob),
            "tag" => Some(ObjectKind::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A git repository on disk.
#[derive(Debug, Clone)]
pub struct Repository {
    git: Git,
    path: PathBuf,
}

impl Repository {
    /// Open the repository at `path` (a working tree or a bare repository).
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotFound`] if `path` is not inside a repository,
    /// or the underlying error if git could not be run at all.
    pub fn open(git: &Git, path: impl Into<PathBuf>) -> Result<Self> {
        let repo = Self {
            git: git.clone(),
            path: path.into(),
        };
        match repo.run(GitCommand::new("rev-parse").arg("--git-dir"), RunOptions::new()) {
            Ok(_) => Ok(repo),
            Err(GitError::CommandFailed { .. }) => Err(GitError::NotFound {
                kind: "repository",
                id: repo.path.display().to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// The directory git commands run in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The git installation used by this repository.
    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Run `cmd` inside this repository.
    pub fn run(&self, cmd: GitCommand, opts: RunOptions) -> Result<CommandOutput> {
        cmd.run(&self.git, &opts.dir(&self.path))
    }

    /// Resolve a full id, abbreviation or ref name to an [`ObjectId`].
    ///
    /// Full 40-character hex ids are parsed without running git; anything
    /// else goes through `rev-parse`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] if git cannot resolve the name, or
    /// [`GitError::InvalidObjectId`] if its answer is not a full id.
    pub fn resolve(&self, id_or_ref: &str) -> Result<ObjectId> {
        if ObjectId::is_full_hex(id_or_ref) {
            return ObjectId::from_hex(id_or_ref);
        }
        let out = self.run(GitCommand::new("rev-parse").arg(id_or_ref), RunOptions::new())?;
        let resolved = out.stdout.trim_end_matches(['\n', '\r']);
        debug!(input = id_or_ref, %resolved, "resolved reference");
        ObjectId::from_hex(resolved)
    }

    /// If `id` names a commit, return the id of its tree; otherwise return
    /// `id` unchanged.
    ///
    /// # Errors
    ///
    /// Fails only if git could not be run, or printed a commit without a
    /// well-formed tree header.
    pub fn dereference(&self, id: ObjectId) -> Result<ObjectId> {
        let cmd = GitCommand::new("cat-file").args(["commit", &id.to_hex()]);
        match self.run(cmd, RunOptions::new()) {
            Ok(out) => parse_commit_tree(&out.stdout),
            // Not a commit (or missing): the caller decides what that means.
            Err(GitError::CommandFailed { .. }) => Ok(id),
            Err(err) => Err(err),
        }
    }

    /// The kind of object stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotFound`] if no such object exists, or
    /// [`GitError::UnexpectedOutput`] for a kind this crate does not know.
    pub fn object_kind(&self, id: &ObjectId) -> Result<ObjectKind> {
        let cmd = GitCommand::new("cat-file").args(["-t", &id.to_hex()]);
        let out = match self.run(cmd, RunOptions::new()) {
            Ok(out) => out,
            Err(GitError::CommandFailed { .. }) => {
                return Err(GitError::NotFound {
                    kind: "object",
                    id: id.to_hex(),
                });
            }
            Err(err) => return Err(err),
        };
        ObjectKind::parse(out.trimmed()).ok_or_else(|| GitError::UnexpectedOutput {
            command: "cat-file".to_string(),
            output: out.stdout.clone(),
        })
    }
}

/// Read the `tree <id>` header of a raw commit object.
pub(crate) fn parse_commit_tree(raw: &str) -> Result<ObjectId> {
    raw.lines()
        .next()
        .and_then(|line| line.strip_prefix("tree "))
        .ok_or_else(|| GitError::UnexpectedOutput {
            command: "cat-file".to_string(),
            output: raw.to_string(),
        })
        .and_then(|hex| ObjectId::from_hex(hex.trim()))
}
