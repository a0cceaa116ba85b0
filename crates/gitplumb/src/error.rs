//! Error types for git invocations and output parsing.

use std::time::Duration;

/// Errors that can occur when running git commands or interpreting their
/// output.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The git binary could not be spawned or its output could not be read.
    #[error("failed to execute git: {0}")]
    Spawn(#[from] std::io::Error),

    /// The git command exited with a non-zero status.
    #[error("git command failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        /// The exit code, or `None` if the process was killed by a signal.
        code: Option<i32>,
        /// The content of stderr.
        stderr: String,
    },

    /// The git command ran past its deadline and was killed.
    #[error("git command timed out after {after:?}")]
    Timeout {
        /// The timeout that expired.
        after: Duration,
    },

    /// The command succeeded but its output did not have the expected shape.
    #[error("unexpected output from git {command}: {output:?}")]
    UnexpectedOutput {
        /// The subcommand whose output was rejected.
        command: String,
        /// The raw output.
        output: String,
    },

    /// A string could not be parsed as a full object id.
    #[error("invalid object id {input:?}: {reason}")]
    InvalidObjectId {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The object does not exist or is not of the requested kind.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of object that was looked up (e.g. "tree").
        kind: &'static str,
        /// The identifier that was looked up.
        id: String,
    },
}

/// A specialized `Result` type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;
