//! Shared test utilities for CLI end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let tree = DevTree::new().with_package("app", r#"{"name": "app"}"#, &[]);
//!     tree.command().arg("-l").arg("app").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::DevTree;
}

/// A temporary development tree populated with packages.
///
/// Packages are plain directories with a `cpm.json`; there is no `.git`, so
/// tests run cpm with `--local-only` and never touch the network.
pub struct DevTree {
    temp_dir: assert_fs::TempDir,
}

impl DevTree {
    /// Create an empty development tree.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a package with the given descriptor and public header folders.
    pub fn with_package(self, name: &str, descriptor: &str, include_dirs: &[&str]) -> Self {
        self.temp_dir
            .child(name)
            .child("cpm.json")
            .write_str(descriptor)
            .expect("Failed to write descriptor");
        for dir in include_dirs {
            self.temp_dir
                .child(name)
                .child("include")
                .child(dir)
                .create_dir_all()
                .expect("Failed to create include directory");
        }
        self
    }

    /// Get the path to the development tree root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the tree.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read the build log written by `log_step` commands.
    #[allow(dead_code)]
    pub fn build_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.path().join("build.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// A cpm command with `DEV_ROOT` pointing at this tree.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("cpm");
        cmd.current_dir(self.path())
            .env("DEV_ROOT", self.path())
            .env_remove("CPM_PROTOCOL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for DevTree {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON for a build command that appends `label` to `<dev_root>/build.log`.
#[allow(dead_code)]
pub fn log_step(os: &str, label: &str) -> String {
    format!(
        r#"{{"os": "{os}", "cmd": "sh", "args": ["-c", "echo {label} >> \"$DEV_ROOT/build.log\""]}}"#
    )
}

/// JSON for a build command that exits with `status`.
#[allow(dead_code)]
pub fn fail_step(status: i32) -> String {
    format!(r#"{{"cmd": "sh", "args": ["-c", "exit {status}"]}}"#)
}
