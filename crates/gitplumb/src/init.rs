//! Startup gate for the git executable.
//!
//! [`initialize`] must run once before anything else talks to git. It
//! resolves the executable on `PATH`, checks its version against the
//! configured minimum, makes sure an author identity exists and forces the
//! configured global settings. The result is an immutable [`Git`] handle
//! that every other operation takes; nothing here is stored in globals.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gitplumb_config::{GitSettings, IdentitySettings};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::{execute, CommandOutput, GitCommand, RunOptions};
use crate::error::GitError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Unrecoverable startup failures. A host program should refuse to run when
/// [`initialize`] returns one of these.
#[derive(Debug, Error)]
pub enum InitError {
    /// The executable was not found on `PATH`.
    #[error("git executable {name:?} not found: {source}")]
    ExecutableNotFound {
        /// The configured executable name.
        name: String,
        /// The lookup failure.
        #[source]
        source: which::Error,
    },

    /// `git version` failed or printed something unparseable.
    #[error("failed to determine git version: {0}")]
    VersionQuery(#[source] GitError),

    /// The installed git is older than the required minimum.
    #[error("git version {found} is not supported, requires {required} or later")]
    UnsupportedVersion {
        /// The detected version.
        found: String,
        /// The configured minimum.
        required: String,
    },

    /// A mandatory setting could not be read.
    #[error("failed to read git config {key}: {source}")]
    ConfigRead {
        /// The configuration key.
        key: String,
        /// The underlying failure.
        #[source]
        source: GitError,
    },

    /// A mandatory setting could not be written.
    #[error("failed to set git config {key}: {source}")]
    ConfigWrite {
        /// The configuration key.
        key: String,
        /// The underlying failure.
        #[source]
        source: GitError,
    },
}

// ---------------------------------------------------------------------------
// Git handle
// ---------------------------------------------------------------------------

/// A verified git installation.
///
/// Cheap to clone and safe to share between threads; its contents never
/// change after [`initialize`] returns.
#[derive(Debug, Clone)]
pub struct Git {
    inner: Arc<GitInner>,
}

#[derive(Debug)]
struct GitInner {
    executable: PathBuf,
    version: String,
    env: BTreeMap<String, String>,
}

impl Git {
    /// Absolute path of the git executable.
    pub fn executable(&self) -> &Path {
        &self.inner.executable
    }

    /// The version reported by `git version`, detected once at startup.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Environment layered onto every invocation.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.inner.env
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Locate, version-check and configure git.
///
/// # Errors
///
/// Returns an [`InitError`] if the executable is missing, too old, or a
/// mandatory global setting cannot be read or written.
pub fn initialize(settings: &GitSettings) -> Result<Git, InitError> {
    let executable =
        which::which(&settings.executable).map_err(|source| InitError::ExecutableNotFound {
            name: settings.executable.clone(),
            source,
        })?;
    debug!(executable = %executable.display(), "resolved git executable");

    let env = settings.env.clone();
    let version = query_version(&executable, &env).map_err(InitError::VersionQuery)?;
    if version_less(&version, &settings.min_version) {
        return Err(InitError::UnsupportedVersion {
            found: version,
            required: settings.min_version.clone(),
        });
    }

    let git = Git {
        inner: Arc::new(GitInner {
            executable,
            version,
            env,
        }),
    };

    ensure_identity(&git, &settings.identity)?;
    for forced in &settings.forced {
        set_global(&git, &forced.key, &forced.value)?;
    }

    info!(
        executable = %git.executable().display(),
        version = %git.version(),
        "git initialized"
    );
    Ok(git)
}

/// Extract the version number from `git version` output.
///
/// The version is the third whitespace-separated token. Builds that embed
/// an OS tag (`2.30.1.windows.1`) have the tag and the separator before it
/// stripped.
///
/// # Errors
///
/// Returns [`GitError::UnexpectedOutput`] if there are fewer than three
/// tokens.
pub fn parse_version_output(stdout: &str) -> Result<String, GitError> {
    let token = stdout
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| GitError::UnexpectedOutput {
            command: "version".to_string(),
            output: stdout.to_string(),
        })?;

    match token.find("windows") {
        Some(i) if i >= 1 => Ok(token[..i - 1].to_string()),
        _ => Ok(token.to_string()),
    }
}

/// Whether version `a` sorts strictly before version `b`.
///
/// Versions compare segment by segment as numbers; missing segments count
/// as zero, so `2.30` equals `2.30.0`.
pub fn version_less(a: &str, b: &str) -> bool {
    let a = version_segments(a);
    let b = version_segments(b);
    let len = a.len().max(b.len());
    let seg = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);
    for i in 0..len {
        match seg(&a, i).cmp(&seg(&b, i)) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Numeric value of each dot-separated segment; `rc1` style suffixes are
/// ignored and non-numeric segments count as zero.
fn version_segments(v: &str) -> Vec<u64> {
    v.trim()
        .split('.')
        .map(|seg| {
            let digits: String = seg.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

fn query_version(executable: &Path, env: &BTreeMap<String, String>) -> Result<String, GitError> {
    let cmd = GitCommand::new("version").describe("init(version)");
    let out = execute(executable, env, &cmd, &RunOptions::new())?;
    parse_version_output(&out.stdout)
}

fn ensure_identity(git: &Git, identity: &IdentitySettings) -> Result<(), InitError> {
    for (key, default) in [
        ("user.name", identity.name.as_str()),
        ("user.email", identity.email.as_str()),
    ] {
        if read_config(git, key)?.is_none() {
            warn!(key, value = default, "git identity unset, writing default");
            set_global(git, key, default)?;
        }
    }
    Ok(())
}

fn read_config(git: &Git, key: &str) -> Result<Option<String>, InitError> {
    let cmd = GitCommand::new("config")
        .args(["--get", key])
        .describe(format!("init(get {key})"));
    classify_config_read(cmd.run(git, &RunOptions::new())).map_err(|source| {
        InitError::ConfigRead {
            key: key.to_string(),
            source,
        }
    })
}

/// Interpret the result of `git config --get`.
///
/// Exit status 1 is git's "key not found"; together with blank output on
/// success that is the only case treated as unset. Every other failure is a
/// genuine read error.
fn classify_config_read(
    result: Result<CommandOutput, GitError>,
) -> Result<Option<String>, GitError> {
    match result {
        Ok(out) if out.trimmed().is_empty() => Ok(None),
        Ok(out) => Ok(Some(out.trimmed().to_string())),
        Err(GitError::CommandFailed {
            code: Some(1),
            ref stderr,
        }) if stderr.is_empty() => Ok(None),
        Err(err) => Err(err),
    }
}

fn set_global(git: &Git, key: &str, value: &str) -> Result<(), InitError> {
    GitCommand::new("config")
        .args(["--global", key, value])
        .describe(format!("init(set {key})"))
        .run(git, &RunOptions::new())
        .map(|_| ())
        .map_err(|source| InitError::ConfigWrite {
            key: key.to_string(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_version_output("git version 2.30.1\n").unwrap(), "2.30.1");
    }

    #[test]
    fn test_parse_windows_version() {
        assert_eq!(
            parse_version_output("git version 2.30.1.windows.1\n").unwrap(),
            "2.30.1"
        );
    }

    #[test]
    fn test_parse_version_with_vendor_suffix() {
        assert_eq!(
            parse_version_output("git version 2.39.3 (Apple Git-145)\n").unwrap(),
            "2.39.3"
        );
    }

    #[test]
    fn test_parse_version_too_few_fields() {
        match parse_version_output("git version").unwrap_err() {
            GitError::UnexpectedOutput { command, output } => {
                assert_eq!(command, "version");
                assert_eq!(output, "git version");
            }
            other => panic!("expected UnexpectedOutput, got: {other:?}"),
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(version_less("1.6.9", "1.7.2"));
        assert!(!version_less("1.7.2", "1.7.2"));
        assert!(!version_less("2.30.1", "1.7.2"));
        assert!(version_less("1.7.10", "1.7.11"));
        assert!(!version_less("1.7.10", "1.7.9"));
        assert!(!version_less("2.30", "2.30.0"));
        assert!(version_less("2.30", "2.30.1"));
        assert!(!version_less("2.45.0.rc1", "2.45.0"));
    }

    #[test]
    fn test_config_read_found() {
        let out = CommandOutput {
            stdout: "Alice\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(classify_config_read(Ok(out)).unwrap(), Some("Alice".to_string()));
    }

    #[test]
    fn test_config_read_blank_is_unset() {
        let out = CommandOutput {
            stdout: "  \n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(classify_config_read(Ok(out)).unwrap(), None);
    }

    #[test]
    fn test_config_read_exit_one_is_unset() {
        let err = GitError::CommandFailed {
            code: Some(1),
            stderr: String::new(),
        };
        assert_eq!(classify_config_read(Err(err)).unwrap(), None);
    }

    #[test]
    fn test_config_read_other_failures_propagate() {
        let unreadable = GitError::CommandFailed {
            code: Some(1),
            stderr: "fatal: unable to read config file '/root/.gitconfig': Permission denied"
                .to_string(),
        };
        assert!(classify_config_read(Err(unreadable)).is_err());

        let bad_file = GitError::CommandFailed {
            code: Some(3),
            stderr: String::new(),
        };
        assert!(classify_config_read(Err(bad_file)).is_err());

        let killed = GitError::CommandFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(classify_config_read(Err(killed)).is_err());
    }

    #[test]
    fn test_missing_executable() {
        let settings = GitSettings {
            executable: "definitely-not-a-git-binary-xyz".to_string(),
            ..GitSettings::default()
        };
        match initialize(&settings).unwrap_err() {
            InitError::ExecutableNotFound { name, .. } => {
                assert_eq!(name, "definitely-not-a-git-binary-xyz");
            }
            other => panic!("expected ExecutableNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_version_below_minimum() {
        let settings = GitSettings {
            min_version: "999.0.0".to_string(),
            ..GitSettings::default()
        };
        match initialize(&settings).unwrap_err() {
            InitError::UnsupportedVersion { required, .. } => assert_eq!(required, "999.0.0"),
            other => panic!("expected UnsupportedVersion, got: {other:?}"),
        }
    }
}
