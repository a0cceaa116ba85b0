//! `gp` -- command-line front-end for gitplumb.
//!
//! Parses CLI arguments with clap, loads settings, runs the git startup
//! gate and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("gp=debug,gitplumb=debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let result = RuntimeContext::from_global_args(&cli.global).and_then(|ctx| match cli.command {
        Some(Commands::Version) => commands::version::run(&ctx),
        Some(Commands::Tree(ref args)) => commands::tree::run(&ctx, args),
        Some(Commands::CommitTree(ref args)) => commands::commit_tree::run(&ctx, args),
        Some(Commands::Fsck(ref args)) => commands::fsck::run(&ctx, args),
        None => {
            // No subcommand -- print help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    });

    // Handle errors: print message and exit with code 1
    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
