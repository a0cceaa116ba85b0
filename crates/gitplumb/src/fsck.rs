//! Object database integrity checks.

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::command::{GitCommand, RunOptions};
use crate::error::Result;
use crate::init::Git;
use crate::repository::Repository;

/// Run `git fsck [args...]` in `repo_path`.
///
/// A `timeout` of `None` or zero waits as long as the check takes. Only the
/// pass/fail status is interpreted; diagnostics are returned in the error.
///
/// # Errors
///
/// Returns [`GitError::CommandFailed`](crate::GitError::CommandFailed) if
/// the check reports problems, or [`GitError::Timeout`](crate::GitError::Timeout)
/// if it runs past `timeout`.
pub fn fsck(git: &Git, repo_path: &Path, timeout: Option<Duration>, args: &[&str]) -> Result<()> {
    let cmd = GitCommand::new("fsck").args(args.iter().copied());
    let opts = RunOptions::new().dir(repo_path).timeout(timeout);
    debug!(repo = %repo_path.display(), timeout = ?opts.effective_timeout(), "checking repository");
    cmd.run(git, &opts)?;
    Ok(())
}

impl Repository {
    /// Run [`fsck`] on this repository.
    pub fn fsck(&self, timeout: Option<Duration>, args: &[&str]) -> Result<()> {
        fsck(self.git(), self.path(), timeout, args)
    }
}
