//! # CLI Command Implementations
//!
//! Each command lives in its own file with an `Args` struct derived with
//! `clap` and an `execute` function that calls into the `cpm` library.
//!
//! - `run`: the default action, fetch and build a project
//! - `tree`: print the dependency graph of a locally present project
//! - `completions`: shell completion scripts

pub mod completions;
pub mod run;
pub mod tree;

use std::path::{self, PathBuf};

use anyhow::Result;
use clap::Args;

use cpm::context::RunOptions;
use cpm::error::Error;
use cpm::package::Protocol;
use cpm::platform::TargetOs;

/// Options locating the development tree, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Root of the development tree
    #[arg(short, long, value_name = "DIR", env = "DEV_ROOT")]
    pub root: Option<PathBuf>,

    /// Preferred download protocol (git or https)
    #[arg(
        short,
        long,
        value_name = "PROTO",
        env = "CPM_PROTOCOL",
        default_value = "git"
    )]
    pub proto: Protocol,

    /// Operating system used to select build commands (defaults to the host)
    #[arg(long, value_name = "OS")]
    pub os: Option<TargetOs>,
}

impl WorkspaceArgs {
    /// Build run options with every flag off.
    pub fn run_options(&self) -> Result<RunOptions> {
        let root = self.root.as_ref().ok_or(Error::MissingDevRoot)?;
        let dev_root = path::absolute(root)?;
        let target_os = match self.os {
            Some(os) => os,
            None => TargetOs::host()?,
        };

        let mut options = RunOptions::new(dev_root, target_os);
        options.protocol = self.proto;
        Ok(options)
    }
}
