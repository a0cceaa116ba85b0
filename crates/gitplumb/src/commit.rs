//! Commit creation with `commit-tree`.

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use tracing::debug;

use crate::command::{GitCommand, RunOptions};
use crate::error::Result;
use crate::object_id::{parse_object_id_output, ObjectId};
use crate::repository::Repository;
use crate::tree::Tree;

/// Identity recorded as author and committer of a new commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Commit time; `None` means the moment the commit is written.
    pub when: Option<DateTime<FixedOffset>>,
}

impl Signature {
    /// A signature stamped at commit time.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when: None,
        }
    }

    /// Use a fixed timestamp instead of the commit time.
    pub fn at(mut self, when: DateTime<FixedOffset>) -> Self {
        self.when = Some(when);
        self
    }
}

/// Options for [`Repository::commit_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitTreeOptions {
    /// Parent ids or refs; the first is the primary parent.
    pub parents: Vec<String>,
    /// Commit message.
    pub message: String,
    /// GPG key to sign with.
    pub key_id: Option<String>,
    /// Never sign. Wins over `key_id`.
    pub no_gpg_sign: bool,
}

impl Repository {
    /// Write a commit for `tree` and return its id.
    ///
    /// Author and committer come from `sig` and share a single timestamp.
    /// The identity variables are layered over the inherited environment so
    /// hooks still see everything else.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`](crate::GitError::CommandFailed)
    /// with git's stderr if the commit could not be written.
    pub fn commit_tree(
        &self,
        sig: &Signature,
        tree: &Tree,
        opts: &CommitTreeOptions,
    ) -> Result<ObjectId> {
        let when = sig
            .when
            .unwrap_or_else(|| DateTime::<FixedOffset>::from(Local::now()));
        let cmd = commit_tree_command(tree.id(), opts);
        let out = self.run(cmd, RunOptions::new().envs(commit_env(sig, &when)))?;
        let id = parse_object_id_output("commit-tree", &out.stdout)?;
        debug!(commit = %id, tree = %tree.id(), "wrote commit");
        Ok(id)
    }
}

/// Build `commit-tree <tree> [-p <parent>]... -m <message> [-S<key> | --no-gpg-sign]`.
pub fn commit_tree_command(tree: &ObjectId, opts: &CommitTreeOptions) -> GitCommand {
    let mut cmd = GitCommand::new("commit-tree").arg(tree.to_hex());
    for parent in &opts.parents {
        cmd.push_arg("-p");
        cmd.push_arg(parent.as_str());
    }
    cmd.push_arg("-m");
    cmd.push_arg(opts.message.as_str());

    if opts.no_gpg_sign {
        cmd.push_arg("--no-gpg-sign");
    } else if let Some(key) = opts.key_id.as_deref().filter(|k| !k.is_empty()) {
        cmd.push_arg(format!("-S{key}"));
    }
    cmd
}

/// Author and committer variables for one commit, all stamped `when`.
pub fn commit_env(sig: &Signature, when: &DateTime<FixedOffset>) -> Vec<(String, String)> {
    let author_date = when.to_rfc3339_opts(SecondsFormat::Secs, false);
    let committer_date = when.to_rfc3339_opts(SecondsFormat::Secs, false);
    vec![
        ("GIT_AUTHOR_NAME".to_string(), sig.name.clone()),
        ("GIT_AUTHOR_EMAIL".to_string(), sig.email.clone()),
        ("GIT_AUTHOR_DATE".to_string(), author_date),
        ("GIT_COMMITTER_NAME".to_string(), sig.name.clone()),
        ("GIT_COMMITTER_EMAIL".to_string(), sig.email.clone()),
        ("GIT_COMMITTER_DATE".to_string(), committer_date),
    ]
}
