//! Settings types and loading for gitplumb.
//!
//! The main entry point is [`Settings`]. Values are merged by
//! [`load_settings`] from three layers, later layers winning:
//!
//! 1. built-in defaults ([`Settings::default`]),
//! 2. an optional YAML file,
//! 3. environment variables prefixed `GITPLUMB_`, with `__` separating
//!    nested keys (e.g. `GITPLUMB_GIT__EXECUTABLE=/usr/local/bin/git`).

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Prefix of the environment variables merged into [`Settings`].
pub const ENV_PREFIX: &str = "GITPLUMB_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One of the configuration layers could not be read or extracted.
    #[error("failed to load settings: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Identity written to the global git configuration when none is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Fallback for `user.name`.
    #[serde(default = "default_identity_name")]
    pub name: String,

    /// Fallback for `user.email`.
    #[serde(default = "default_identity_email")]
    pub email: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            name: default_identity_name(),
            email: default_identity_email(),
        }
    }
}

fn default_identity_name() -> String {
    "Gitplumb".to_string()
}

fn default_identity_email() -> String {
    "gitplumb@fake.local".to_string()
}

/// A global git setting that is written unconditionally at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedSetting {
    /// Configuration key, e.g. `core.quotepath`.
    pub key: String,
    /// Value written for `key`.
    pub value: String,
}

/// Settings for locating and gating the git executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSettings {
    /// Executable name searched on `PATH`, or an explicit path.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Lowest git version accepted at startup.
    #[serde(default = "default_min_version")]
    pub min_version: String,

    /// Fallback identity for `user.name` / `user.email`.
    #[serde(default)]
    pub identity: IdentitySettings,

    /// Global settings forced at startup regardless of their prior value.
    #[serde(default = "default_forced")]
    pub forced: Vec<ForcedSetting>,

    /// Extra environment applied to every git invocation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            min_version: default_min_version(),
            identity: IdentitySettings::default(),
            forced: default_forced(),
            env: BTreeMap::new(),
        }
    }
}

fn default_executable() -> String {
    "git".to_string()
}

fn default_min_version() -> String {
    "1.7.2".to_string()
}

fn default_forced() -> Vec<ForcedSetting> {
    // Keep non-ASCII paths readable in plumbing output.
    vec![ForcedSetting {
        key: "core.quotepath".to_string(),
        value: "false".to_string(),
    }]
}

/// Settings for the integrity check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsckSettings {
    /// Timeout in seconds. Zero or negative disables the timeout.
    #[serde(default)]
    pub timeout_secs: i64,
}

// ---------------------------------------------------------------------------
// Main settings struct
// ---------------------------------------------------------------------------

/// The full gitplumb configuration.
///
/// All fields use `serde` defaults so that a partially-specified YAML file
/// is deserialized with sensible default values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Git executable and startup gate.
    #[serde(default)]
    pub git: GitSettings,

    /// Integrity check.
    #[serde(default)]
    pub fsck: FsckSettings,
}

impl Settings {
    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty executable name,
    /// a minimum version that is not dot-separated numbers, or an empty
    /// identity or forced-setting key.
    pub fn validate(&self) -> Result<()> {
        if self.git.executable.trim().is_empty() {
            return Err(invalid("git.executable", "must not be empty"));
        }

        let min = self.git.min_version.trim();
        if min.is_empty()
            || !min
                .split('.')
                .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid(
                "git.min_version",
                "expected dot-separated numbers such as 1.7.2",
            ));
        }

        if self.git.identity.name.trim().is_empty() {
            return Err(invalid("git.identity.name", "must not be empty"));
        }
        if self.git.identity.email.trim().is_empty() {
            return Err(invalid("git.identity.email", "must not be empty"));
        }

        if self.git.forced.iter().any(|f| f.key.trim().is_empty()) {
            return Err(invalid("git.forced", "setting key must not be empty"));
        }

        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the layered figment backing [`load_settings`].
pub fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load settings from defaults, the YAML file at `path` (if any) and the
/// environment, then validate them.
///
/// A missing file is not an error; its layer is simply empty.
///
/// # Errors
///
/// Returns [`ConfigError::Figment`] if a layer contains malformed data, or
/// [`ConfigError::InvalidValue`] if validation fails.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings: Settings = figment(path).extract().map_err(Box::new)?;
    settings.validate()?;
    Ok(settings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.git.executable, "git");
        assert_eq!(s.git.min_version, "1.7.2");
        assert_eq!(s.git.identity.name, "Gitplumb");
        assert_eq!(s.git.identity.email, "gitplumb@fake.local");
        assert_eq!(
            s.git.forced,
            vec![ForcedSetting {
                key: "core.quotepath".to_string(),
                value: "false".to_string(),
            }]
        );
        assert!(s.git.env.is_empty());
        assert_eq!(s.fsck.timeout_secs, 0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = "git:\n  executable: /opt/git/bin/git\nfsck:\n  timeout_secs: 30\n";
        let s: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.git.executable, "/opt/git/bin/git");
        assert_eq!(s.fsck.timeout_secs, 30);
        // Everything else should be default
        assert_eq!(s.git.min_version, "1.7.2");
        assert_eq!(s.git.identity, IdentitySettings::default());
    }

    #[test]
    fn test_load_without_file() {
        figment::Jail::expect_with(|_jail| {
            let s = load_settings(None).unwrap();
            assert_eq!(s, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("absent.yaml");
            let s = load_settings(Some(&path)).unwrap();
            assert_eq!(s, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "gitplumb.yaml",
                "git:\n  min_version: \"2.0.0\"\n  identity:\n    name: Robot\n",
            )?;
            jail.set_env("GITPLUMB_GIT__MIN_VERSION", "2.1.0");
            jail.set_env("GITPLUMB_FSCK__TIMEOUT_SECS", "-5");

            let path = jail.directory().join("gitplumb.yaml");
            let s = load_settings(Some(&path)).unwrap();
            assert_eq!(s.git.min_version, "2.1.0");
            assert_eq!(s.git.identity.name, "Robot");
            assert_eq!(s.git.identity.email, "gitplumb@fake.local");
            assert_eq!(s.fsck.timeout_secs, -5);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_min_version_rejected() {
        let mut s = Settings::default();
        s.git.min_version = "two.oh".to_string();
        match s.validate().unwrap_err() {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "git.min_version"),
            other => panic!("expected InvalidValue, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_executable_rejected() {
        let mut s = Settings::default();
        s.git.executable = "  ".to_string();
        assert!(matches!(
            s.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "git.executable"
        ));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "git: [unclosed\n")?;
            let path = jail.directory().join("bad.yaml");
            assert!(matches!(
                load_settings(Some(&path)),
                Err(ConfigError::Figment(_))
            ));
            Ok(())
        });
    }
}
