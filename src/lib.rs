//! # cpm - C/C++ Package Manager
//!
//! This library resolves, fetches, links and builds multi-repository native
//! projects. Each package is a git repository with a small `cpm.json`
//! descriptor naming its dependencies and its build commands. It is used by
//! the `cpm` command-line tool but the whole run can be driven from code.
//!
//! ## Quick Example
//!
//! ```
//! use cpm::platform::{applicable_runs, TargetOs};
//! use cpm::registry::Registry;
//!
//! // Packages are deduplicated by name
//! let mut registry = Registry::new();
//! let (utils, created) = registry.find_or_create("utils");
//! assert!(created);
//! assert_eq!(registry.find_or_create("utils"), (utils, false));
//!
//! // Build commands are selected by OS pattern
//! assert_eq!(applicable_runs("windows linux", TargetOs::Linux), 1);
//! assert_eq!(applicable_runs("windows", TargetOs::Linux), 0);
//! ```
//!
//! ## Core Concepts
//!
//! - **Descriptors (`descriptor`)**: the `cpm.json` schema and its loader.
//! - **Packages (`package`, `registry`)**: graph nodes, dependency edges and
//!   the deduplicating registry that enforces one branch per package.
//! - **Commands (`runner`, `platform`)**: the external command primitive and
//!   the OS-pattern dispatch rule for build steps.
//! - **Git (`git`)**: clone, switch and pull as external commands.
//! - **Phases (`phases`)**: the fetch pass with namespace composition and the
//!   dependency-first build pass with cycle detection.
//!
//! ## Development Tree Layout
//!
//! ```text
//! <dev_root>/
//! ├── lib/                 shared library output directory
//! ├── app/
//! │   ├── cpm.json
//! │   ├── lib -> <dev_root>/lib
//! │   └── include/
//! │       ├── utils -> <dev_root>/utils/include/utils
//! │       └── serial -> <dev_root>/mlib/include/serial
//! ├── utils/
//! └── mlib/
//! ```

pub mod context;
pub mod descriptor;
pub mod error;
pub mod git;
pub mod output;
pub mod package;
pub mod phases;
pub mod platform;
pub mod registry;
pub mod runner;

#[cfg(test)]
mod platform_proptest;
#[cfg(test)]
mod test_support;
