//! Configuration management for gitplumb.
//!
//! This crate defines the typed [`Settings`](settings::Settings) consumed by
//! the `gitplumb` library and the `gp` binary, and loads them from built-in
//! defaults, an optional YAML file and `GITPLUMB_*` environment variables.

pub mod settings;

pub use settings::{
    load_settings, ConfigError, FsckSettings, ForcedSetting, GitSettings, IdentitySettings,
    Settings,
};
