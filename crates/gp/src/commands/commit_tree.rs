//! `gp commit-tree` -- write a commit object for an existing tree.

use anyhow::{Context, Result};
use gitplumb::{CommitTreeOptions, Signature};

use crate::cli::CommitTreeArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `gp commit-tree` command.
pub fn run(ctx: &RuntimeContext, args: &CommitTreeArgs) -> Result<()> {
    let repo = ctx.repository()?;
    let tree = repo
        .get_tree(&args.tree)
        .with_context(|| format!("looking up tree {}", args.tree))?;

    let identity = &ctx.settings.git.identity;
    let sig = Signature::new(
        args.name.clone().unwrap_or_else(|| identity.name.clone()),
        args.email.clone().unwrap_or_else(|| identity.email.clone()),
    );
    let opts = CommitTreeOptions {
        parents: args.parents.clone(),
        message: args.message.clone(),
        key_id: args.key_id.clone(),
        no_gpg_sign: args.no_gpg_sign,
    };

    let id = repo
        .commit_tree(&sig, &tree, &opts)
        .context("commit-tree failed")?;

    if ctx.json {
        output_json(&serde_json::json!({ "id": id, "tree": tree.id() }));
    } else {
        println!("{id}");
    }
    Ok(())
}
