//! Command handlers, one module per subcommand.

pub mod commit_tree;
pub mod fsck;
pub mod tree;
pub mod version;
