//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use cpm::output::{ColorWhen, OutputConfig};
use env_logger::Env;

use crate::commands;

/// C/C++ Package Manager - fetch, link and build multi-repository projects
#[derive(Parser, Debug)]
#[command(name = "cpm")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute; without one, fetch and build the project
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: commands::run::RunArgs,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorWhen,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the dependency tree of a project using only local trees
    Tree(commands::tree::TreeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        };
        // RUST_LOG still takes precedence over the flags
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
            .format_timestamp(None)
            .format_target(false)
            .try_init();

        let output = OutputConfig::new(self.color);
        match self.command {
            Some(Commands::Tree(args)) => commands::tree::execute(args, &output),
            Some(Commands::Completions(args)) => commands::completions::execute(args),
            None => commands::run::execute(self.run, &output),
        }
    }
}
