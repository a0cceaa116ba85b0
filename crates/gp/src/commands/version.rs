//! `gp version` -- print gp version and the detected git installation.

use anyhow::Result;

use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `gp version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let git = ctx.git()?;

    if ctx.json {
        let info = serde_json::json!({
            "version": gitplumb::VERSION,
            "git": git.version(),
            "git_path": git.executable().display().to_string(),
        });
        output_json(&info);
    } else {
        println!("gp version {}", gitplumb::VERSION);
        println!("git version {} ({})", git.version(), git.executable().display());
    }

    Ok(())
}
