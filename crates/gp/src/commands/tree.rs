//! `gp tree` -- resolve a reference to a tree and list it.

use anyhow::{Context, Result};
use gitplumb::{ObjectId, TreeEntry};
use serde::Serialize;

use crate::cli::TreeArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

#[derive(Serialize)]
struct TreeView<'a> {
    id: &'a ObjectId,
    resolved_id: &'a ObjectId,
    entries: &'a [TreeEntry],
}

/// Execute the `gp tree` command.
pub fn run(ctx: &RuntimeContext, args: &TreeArgs) -> Result<()> {
    let repo = ctx.repository()?;
    let tree = repo
        .get_tree(&args.reference)
        .with_context(|| format!("looking up tree {}", args.reference))?;
    let entries = tree.entries().context("listing tree entries")?;

    if ctx.json {
        output_json(&TreeView {
            id: tree.id(),
            resolved_id: tree.resolved_id(),
            entries: &entries,
        });
        return Ok(());
    }

    println!("tree {}", tree.id());
    if tree.resolved_id() != tree.id() {
        println!("resolved {}", tree.resolved_id());
    }
    for entry in &entries {
        println!("{} {} {}\t{}", entry.mode, entry.kind, entry.id, entry.name);
    }
    Ok(())
}
