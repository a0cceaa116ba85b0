//! Typed access to git plumbing.
//!
//! This crate drives an installed `git` binary instead of reimplementing
//! it. Call [`initialize`] once at startup to obtain a [`Git`] handle, open
//! a [`Repository`] with it, then look up trees, write commits and check
//! integrity through typed calls.
//!
//! ```no_run
//! use gitplumb::{initialize, CommitTreeOptions, Repository, Signature};
//! use gitplumb_config::GitSettings;
//!
//! let git = initialize(&GitSettings::default())?;
//! let repo = Repository::open(&git, ".")?;
//! let tree = repo.get_tree("HEAD")?;
//! let opts = CommitTreeOptions {
//!     parents: vec!["HEAD".to_string()],
//!     message: "snapshot".to_string(),
//!     ..CommitTreeOptions::default()
//! };
//! let id = repo.commit_tree(&Signature::new("Bot", "bot@example.com"), &tree, &opts)?;
//! println!("{id}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod commit;
pub mod error;
pub mod fsck;
pub mod init;
pub mod object_id;
pub mod repository;
pub mod tree;

pub use command::{timeout_from_secs, CommandOutput, GitCommand, RunOptions};
pub use commit::{CommitTreeOptions, Signature};
pub use error::{GitError, Result};
pub use fsck::fsck;
pub use init::{initialize, Git, InitError};
pub use object_id::ObjectId;
pub use repository::{ObjectKind, Repository};
pub use tree::{Tree, TreeEntry};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
