//! Git invocations used by the fetch phase.
//!
//! git is driven as an opaque external command through the
//! [`CommandRunner`], so it picks up whatever authentication the user has
//! configured (SSH keys, credential helpers, tokens) and its progress output
//! goes straight to the terminal.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::runner::CommandRunner;

/// Whether `dir` looks like a git working tree.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

fn git(runner: &dyn CommandRunner, package: &str, args: Vec<String>, dir: &Path) -> Result<()> {
    debug!("In {} - git {:?}", dir.display(), args);
    let status = runner.run("git", &args, dir)?;
    if status != 0 {
        return Err(Error::Git {
            command: args.first().cloned().unwrap_or_default(),
            package: package.to_string(),
            status,
        });
    }
    Ok(())
}

/// Build the argument list for `git clone`.
pub fn clone_args(url: &str, branch: Option<&str>, target_dir: &Path) -> Vec<String> {
    let mut args = vec!["clone".to_string()];
    if let Some(branch) = branch {
        args.push("-b".to_string());
        args.push(branch.to_string());
    }
    args.push(url.to_string());
    args.push(target_dir.to_string_lossy().into_owned());
    args
}

/// Clone `url` into `target_dir`, checking out `branch` when one is bound.
///
/// `target_dir` may already exist as long as it is empty.
pub fn clone(
    runner: &dyn CommandRunner,
    package: &str,
    url: &str,
    branch: Option<&str>,
    target_dir: &Path,
) -> Result<()> {
    let parent = target_dir.parent().unwrap_or(target_dir);
    debug!("Cloning: {} in {}", url, target_dir.display());
    git(runner, package, clone_args(url, branch, target_dir), parent)
}

/// Build the argument list for `git switch`.
pub fn switch_args(branch: &str, force: bool) -> Vec<String> {
    let mut args = vec!["switch".to_string()];
    if force {
        args.push("-f".to_string());
    }
    args.push(branch.to_string());
    args
}

/// Build the argument list for `git pull`.
pub fn pull_args(branch: Option<&str>) -> Vec<String> {
    match branch {
        Some(branch) => vec!["pull".into(), "origin".into(), branch.into()],
        None => vec!["pull".into()],
    }
}

/// Bring an existing working tree up to date.
///
/// With a bound branch the tree is first switched to it (discarding local
/// changes when `force` is set) and then that branch is pulled from `origin`.
pub fn update(
    runner: &dyn CommandRunner,
    package: &str,
    dir: &Path,
    branch: Option<&str>,
    force: bool,
) -> Result<()> {
    if let Some(branch) = branch {
        debug!("In {} - Switching to: {}", dir.display(), branch);
        git(runner, package, switch_args(branch, force), dir)?;
    }
    git(runner, package, pull_args(branch), dir)
}
