//! Clap CLI definitions for the `gp` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// gp -- typed git plumbing.
#[derive(Parser, Debug)]
#[command(
    name = "gp",
    about = "Typed git plumbing: tree lookup, commit creation and integrity checks",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// YAML settings file (default: built-in settings plus GITPLUMB_* env).
    #[arg(long, global = true, env = "GITPLUMB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository to operate on.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show gp and git versions.
    Version,

    /// Look up a tree by id or reference and list its entries.
    Tree(TreeArgs),

    /// Create a commit object from an existing tree.
    CommitTree(CommitTreeArgs),

    /// Verify the connectivity and validity of the object database.
    Fsck(FsckArgs),
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Tree id, commit id or reference (e.g. HEAD, main).
    pub reference: String,
}

#[derive(Args, Debug)]
pub struct CommitTreeArgs {
    /// Tree id or a reference that dereferences to a tree.
    pub tree: String,

    /// Parent commit; repeat for merges, first is the primary parent.
    #[arg(short = 'p', long = "parent")]
    pub parents: Vec<String>,

    /// Commit message.
    #[arg(short = 'm', long)]
    pub message: String,

    /// Author and committer name (default: configured identity).
    #[arg(long)]
    pub name: Option<String>,

    /// Author and committer email (default: configured identity).
    #[arg(long)]
    pub email: Option<String>,

    /// GPG key id to sign with.
    #[arg(short = 'S', long = "gpg-sign")]
    pub key_id: Option<String>,

    /// Do not sign the commit (overrides --gpg-sign).
    #[arg(long)]
    pub no_gpg_sign: bool,
}

#[derive(Args, Debug)]
pub struct FsckArgs {
    /// Timeout in seconds; zero or negative waits indefinitely
    /// (default: fsck.timeout_secs from settings).
    #[arg(long, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Extra arguments passed to git fsck, e.g. --no-dangling.
    #[arg(last = true)]
    pub args: Vec<String>,
}
