//! # cpm - C/C++ Package Manager CLI
//!
//! This is the binary entry point for the `cpm` command-line tool. It parses
//! the command line with `clap`, sets up logging and hands off to the command
//! implementations, which in turn drive the `cpm` library.
//!
//! Any error ends the process with a non-zero exit status and a description
//! on stderr.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
