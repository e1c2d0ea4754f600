//! Default command: fetch and build a project
//!
//! Resolves the root package, fetches every dependency into the development
//! tree, composes the `include` namespaces and builds everything in
//! dependency order. `--fetch-only` stops after fetching and `--local-only`
//! works with the trees already on disk.

use std::time::Instant;

use anyhow::Result;
use clap::Args;

use cpm::output::{emoji, format_elapsed, OutputConfig};
use cpm::phases::orchestrator::{self, RootRequest};
use cpm::runner::SystemRunner;

use super::WorkspaceArgs;

/// Arguments for fetching and building a project
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project to build: a name under the dev root or a path
    /// (defaults to the current directory). Projects named like a
    /// subcommand must be given as a path, e.g. `./tree`
    #[arg(value_name = "PROJECT")]
    pub project: Option<String>,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Check out a specific branch of the root project
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Discard local changes when switching branches
    #[arg(short = 'F', long)]
    pub force: bool,

    /// Fetch only (no build)
    #[arg(short, long)]
    pub fetch_only: bool,

    /// Local only (no clone or pull)
    #[arg(short, long)]
    pub local_only: bool,

    /// Source URI of the root project, used to clone it when missing
    #[arg(short, long, value_name = "URI")]
    pub uri: Option<String>,
}

/// Execute the default fetch-and-build command
pub fn execute(args: RunArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    println!(
        "{} C/C++ Package Manager v{}",
        emoji(output, "📦", "[CPM]"),
        env!("CARGO_PKG_VERSION")
    );

    let mut options = args.workspace.run_options()?;
    options.force = args.force;
    options.fetch_only = args.fetch_only;
    options.local_only = args.local_only;

    let request = RootRequest {
        project: args.project,
        uri: args.uri,
        branch: args.branch,
        working_dir: std::env::current_dir()?,
    };

    match orchestrator::run(options, &SystemRunner, &request) {
        Ok(summary) => {
            println!(
                "{} {}: {} packages, {} built",
                emoji(output, "✅", "[OK]"),
                summary.root,
                summary.packages,
                summary.built
            );
            println!(
                "CPM operation finished in {}",
                format_elapsed(start_time.elapsed())
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{} CPM operation failed", emoji(output, "❌", "[FAILED]"));
            Err(e.into())
        }
    }
}
