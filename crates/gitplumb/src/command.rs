//! Git command construction and execution.
//!
//! [`GitCommand`] accumulates the ordered argument list of one invocation;
//! [`GitCommand::run`] executes it as a subprocess of the resolved git
//! binary, honoring the working directory, timeout and environment in
//! [`RunOptions`]. Nothing here retries: a failed invocation is reported to
//! the caller exactly once.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{GitError, Result};
use crate::init::Git;

/// Interval between exit checks while a deadline is running.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Normalize a timeout: a zero duration means "no timeout", never "expire
/// immediately".
pub fn normalize_timeout(timeout: Option<Duration>) -> Option<Duration> {
    timeout.filter(|t| !t.is_zero())
}

/// Convert a signed number of seconds into a timeout. Zero or negative
/// values mean "no timeout".
pub fn timeout_from_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs)
        .ok()
        .filter(|&s| s > 0)
        .map(Duration::from_secs)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// The ordered argument list for one git invocation.
///
/// The first argument is always the subcommand. Arguments are passed to git
/// verbatim and in insertion order; no validation is done here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<String>,
    description: Option<String>,
}

impl GitCommand {
    /// Start a command for `subcommand`, e.g. `rev-parse`.
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            args: vec![subcommand.into()],
            description: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.push_arg(arg);
        self
    }

    /// Append several arguments, keeping their order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append one argument in place.
    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Attach a human-readable label used in log output.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The subcommand this invocation runs.
    pub fn subcommand(&self) -> &str {
        &self.args[0]
    }

    /// The full argument list, subcommand first.
    pub fn as_args(&self) -> &[String] {
        &self.args
    }

    /// The log label, defaulting to `git <subcommand>`.
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("git {}", self.subcommand()))
    }

    /// Run this command with the resolved executable of `git`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Spawn`] if the process cannot be started,
    /// [`GitError::CommandFailed`] on a non-zero exit, or
    /// [`GitError::Timeout`] if the deadline in `opts` expires (the child is
    /// killed in that case).
    pub fn run(&self, git: &Git, opts: &RunOptions) -> Result<CommandOutput> {
        execute(git.executable(), git.env(), self, opts)
    }
}

// ---------------------------------------------------------------------------
// Execution options and output
// ---------------------------------------------------------------------------

/// Per-invocation execution settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    dir: Option<PathBuf>,
    timeout: Option<Duration>,
    env: Vec<(String, String)>,
    env_clear: bool,
}

impl RunOptions {
    /// Inherit everything from the current process; no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run inside `dir` instead of the current directory.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Kill the process if it runs longer than `timeout`. `None` or a zero
    /// duration waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = normalize_timeout(timeout);
        self
    }

    /// Set one environment variable for this invocation only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set several environment variables for this invocation only.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Start from an empty environment instead of inheriting the current one.
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// The effective (normalized) timeout.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Raw stdout, lossily decoded.
    pub stdout: String,
    /// Raw stderr, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout without surrounding whitespace or line terminators.
    pub fn trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

// ---------------------------------------------------------------------------
// Process runner
// ---------------------------------------------------------------------------

/// Execute `cmd` with `program`, layering `base_env` and then the overlay
/// from `opts` onto the environment.
pub(crate) fn execute(
    program: &Path,
    base_env: &BTreeMap<String, String>,
    cmd: &GitCommand,
    opts: &RunOptions,
) -> Result<CommandOutput> {
    let mut command = Command::new(program);
    command.args(cmd.as_args());
    if let Some(dir) = &opts.dir {
        command.current_dir(dir);
    }
    if opts.env_clear {
        command.env_clear();
    }
    command.envs(base_env);
    command.envs(opts.env.iter().map(|(k, v)| (k, v)));
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    debug!(
        description = %cmd.description(),
        program = %program.display(),
        args = ?cmd.as_args(),
        dir = ?opts.dir,
        timeout = ?opts.timeout,
        "spawning git"
    );

    match opts.timeout {
        None => {
            let output = command.output()?;
            finish(output.status, output.stdout, output.stderr)
        }
        Some(limit) => run_with_deadline(command, limit, cmd),
    }
}

/// Spawn `command` and wait at most `limit` for it, killing it on expiry.
fn run_with_deadline(
    mut command: Command,
    limit: Duration,
    cmd: &GitCommand,
) -> Result<CommandOutput> {
    let mut child = command.spawn()?;

    // Drain both pipes concurrently so a chatty child cannot block on a full
    // pipe while we poll for its exit.
    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        let elapsed = started.elapsed();
        if elapsed >= limit {
            warn!(
                description = %cmd.description(),
                timeout = ?limit,
                "git command timed out, killing child"
            );
            // The child may have exited between the poll and the kill.
            if let Err(err) = child.kill() {
                debug!(error = %err, "kill after timeout failed");
            }
            child.wait()?;
            // Reader threads finish on their own once every writer of the
            // pipes is gone; grandchildren may still hold them open.
            return Err(GitError::Timeout { after: limit });
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    };

    let stdout = join_reader(stdout)?;
    let stderr = join_reader(stderr)?;
    finish(status, stdout, stderr)
}

type Reader = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Reader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_reader(handle: Option<Reader>) -> Result<Vec<u8>> {
    match handle {
        None => Ok(Vec::new()),
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("pipe reader thread panicked"))?
            .map_err(GitError::from),
    }
}

fn finish(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Result<CommandOutput> {
    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    if !status.success() {
        return Err(GitError::CommandFailed {
            code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
