//! # Error Handling
//!
//! This module defines the centralized error type for `cpm`. It uses the
//! `thiserror` library to create an `Error` enum covering every fatal
//! condition a run can hit, each carrying enough context (package name,
//! dependency chain, conflicting branches) to explain the failure without a
//! debugger.
//!
//! The variants fall into four groups:
//!
//! - **Configuration**: unreadable or malformed descriptors, missing source
//!   locations, unknown protocols or operating systems, branch conflicts.
//! - **Filesystem**: directory creation failures, namespace collisions at a
//!   symlink site, missing trees in local-only mode.
//! - **Process**: git or build commands that fail to start or exit non-zero.
//! - **Graph**: build cycles and unresolved dependency edges.
//!
//! Every error is fatal. Nothing in the library retries or recovers; the
//! binary reports the error and exits with a non-zero status.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cpm operations
#[derive(Error, Debug)]
pub enum Error {
    /// A `cpm.json` descriptor exists but could not be decoded.
    #[error("Cannot parse descriptor {}: {message}", path.display())]
    DescriptorParse { path: PathBuf, message: String },

    /// The root package has neither a descriptor nor a source URI.
    #[error("Cannot open root descriptor {}{}", path.display(), hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    RootDescriptorMissing {
        path: PathBuf,
        /// Optional hint for how to point cpm at the root package
        hint: Option<String>,
    },

    /// A package must be cloned but declares no usable source location.
    #[error("Package {package} has no git or https source location")]
    MissingSource { package: String },

    /// A protocol name other than `git` or `https` was requested.
    #[error("Unknown download protocol '{0}' (expected 'git' or 'https')")]
    UnknownProtocol(String),

    /// An operating system identifier outside the supported set.
    #[error("Unsupported operating system '{0}'")]
    UnsupportedOs(String),

    /// A package name that cannot be used as a directory under the dev root.
    #[error("Invalid package name '{0}': must be a single path component")]
    InvalidPackageName(String),

    /// No development tree root was configured.
    #[error("No development tree root specified and environment variable DEV_ROOT is not set")]
    MissingDevRoot,

    /// Two dependency edges bind the same package to different branches.
    #[error("Branch conflict for package {package}: already bound to '{existing}', now requested '{requested}'")]
    BranchConflict {
        package: String,
        existing: String,
        requested: String,
    },

    /// Something other than the expected symlink occupies a namespace slot.
    #[error("Namespace collision at {}: {message}", link.display())]
    NamespaceCollision { link: PathBuf, message: String },

    /// A filesystem operation on the development tree failed.
    #[error("Filesystem operation error on {}: {message}", path.display())]
    Filesystem { path: PathBuf, message: String },

    /// Local-only mode was requested but a package tree is not on disk.
    #[error("Local-only mode and {package} does not exist in {}", path.display())]
    LocalOnlyMissing { package: String, path: PathBuf },

    /// A git invocation exited unsuccessfully.
    #[error("Git {command} failed for {package} (exit status {status})")]
    Git {
        command: String,
        package: String,
        status: i32,
    },

    /// A build or post-build command exited with a non-zero status.
    #[error("Build aborted - {program} exited with status {status} in {}", dir.display())]
    CommandFailed {
        program: String,
        status: i32,
        dir: PathBuf,
    },

    /// An external program could not be started at all.
    #[error("Cannot start {program}: {message}")]
    CommandSpawn { program: String, message: String },

    /// The build graph contains a cycle.
    #[error("Package {package} depends on itself. Dependency chain: {chain}")]
    CycleDetected { package: String, chain: String },

    /// A dependency edge reached the build phase without a fetched target.
    #[error("Dependency {target} of {package} was never resolved")]
    UnresolvedDependency { package: String, target: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
