//! # Run Context
//!
//! Everything a fetch or build pass reads or mutates lives in one [`Context`]
//! owned by the top-level run: the options, the package registry, the command
//! runner and the stack of packages currently being built. It is passed by
//! `&mut` through the recursion and dropped at the end of the run, so separate
//! runs (and separate tests) never share state.

use std::path::{Path, PathBuf};

use crate::package::Protocol;
use crate::platform::TargetOs;
use crate::registry::Registry;
use crate::runner::CommandRunner;

/// Name of the shared library output directory under the dev root.
pub const LIB_DIR: &str = "lib";

/// Name of the header namespace directory inside each package.
pub const INCLUDE_DIR: &str = "include";

/// Settings that stay fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Root of the development tree; every package lives in `<dev_root>/<name>`.
    pub dev_root: PathBuf,
    /// Preferred download transport.
    pub protocol: Protocol,
    /// Discard local modifications when switching branches.
    pub force: bool,
    /// Stop after the fetch phase.
    pub fetch_only: bool,
    /// Never clone or pull.
    pub local_only: bool,
    /// Operating system used to select build commands.
    pub target_os: TargetOs,
}

impl RunOptions {
    pub fn new(dev_root: PathBuf, target_os: TargetOs) -> Self {
        Self {
            dev_root,
            protocol: Protocol::default(),
            force: false,
            fetch_only: false,
            local_only: false,
            target_os,
        }
    }
}

pub struct Context<'a> {
    pub options: RunOptions,
    pub registry: Registry,
    pub runner: &'a dyn CommandRunner,
    /// Names of the packages whose build is in progress, outermost first.
    pub in_progress: Vec<String>,
}

impl<'a> Context<'a> {
    pub fn new(options: RunOptions, runner: &'a dyn CommandRunner) -> Self {
        Self {
            options,
            registry: Registry::new(),
            runner,
            in_progress: Vec::new(),
        }
    }

    /// Directory holding the tree of package `name`.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.options.dev_root.join(name)
    }

    /// The shared library output directory.
    pub fn lib_dir(&self) -> PathBuf {
        self.options.dev_root.join(LIB_DIR)
    }

    pub fn dev_root(&self) -> &Path {
        &self.options.dev_root
    }
}
