//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds the loaded settings and global flags. The
//! git startup gate runs lazily through [`RuntimeContext::git`] so that
//! argument errors are reported before git is touched.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gitplumb::{initialize, Git, Repository};
use gitplumb_config::{load_settings, Settings};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Loaded and validated settings.
    pub settings: Settings,

    /// Repository directory.
    pub repo: PathBuf,

    /// Whether to produce JSON output.
    pub json: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let settings = load_settings(global.config.as_deref()).context("loading settings")?;
        Ok(Self {
            settings,
            repo: global.repo.clone(),
            json: global.json,
        })
    }

    /// Run the git startup gate.
    pub fn git(&self) -> Result<Git> {
        initialize(&self.settings.git).context("git initialization failed")
    }

    /// Initialize git and open the repository named by `--repo`.
    pub fn repository(&self) -> Result<Repository> {
        let git = self.git()?;
        Repository::open(&git, &self.repo)
            .with_context(|| format!("opening repository {}", self.repo.display()))
    }
}
