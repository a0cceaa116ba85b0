//! `gp fsck` -- check repository integrity.

use anyhow::{Context, Result};
use gitplumb::timeout_from_secs;

use crate::cli::FsckArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `gp fsck` command.
pub fn run(ctx: &RuntimeContext, args: &FsckArgs) -> Result<()> {
    let repo = ctx.repository()?;
    let timeout = timeout_from_secs(args.timeout.unwrap_or(ctx.settings.fsck.timeout_secs));
    let extra: Vec<&str> = args.args.iter().map(String::as_str).collect();

    repo.fsck(timeout, &extra)
        .with_context(|| format!("fsck failed for {}", repo.path().display()))?;

    if ctx.json {
        output_json(&serde_json::json!({ "ok": true }));
    } else {
        println!("ok");
    }
    Ok(())
}
