//! # External Command Execution
//!
//! All external programs (git as well as build tools) are started through the
//! [`CommandRunner`] trait. The default implementation, [`SystemRunner`],
//! inherits stdin/stdout/stderr and blocks until the program exits; tests
//! substitute a scripted runner.
//!
//! Platform quirks stay inside [`SystemRunner`]: on Windows, commands that
//! are `cmd.exe` builtins (`copy`, `del`, `mkdir`, ...) have no executable of
//! their own and are routed through `cmd /C`.
//!
//! [`run_applicable`] is the dispatch rule used for build and post-build
//! steps: commands run in declaration order, filtered by OS pattern, with
//! environment variables expanded in their arguments, stopping at the first
//! failure.

use std::borrow::Cow;
use std::env;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use log::debug;
use regex::{Captures, Regex};

use crate::descriptor::BuildCommand;
use crate::error::{Error, Result};
use crate::platform::{applicable_runs, TargetOs};

/// Trait for running external programs - allows mocking in tests
pub trait CommandRunner {
    /// Runs `program` with `args` in `dir` and returns its exit code.
    ///
    /// A program that cannot be started is an error; a program that runs and
    /// fails is reported through the returned code. Termination by signal is
    /// reported as `-1`.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<i32>;
}

/// Runs programs as child processes of cpm with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

/// Builtins of `cmd.exe` that are not standalone executables.
const WINDOWS_SHELL_BUILTINS: &[&str] = &[
    "assoc", "call", "cd", "chdir", "cls", "copy", "date", "del", "dir", "echo", "erase", "md",
    "mkdir", "mklink", "move", "rd", "ren", "rename", "rmdir", "set", "start", "time", "type",
    "ver", "vol",
];

fn is_windows_builtin(program: &str) -> bool {
    WINDOWS_SHELL_BUILTINS
        .iter()
        .any(|b| b.eq_ignore_ascii_case(program))
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<i32> {
        let mut command = if cfg!(windows) && is_windows_builtin(program) {
            let mut shell = Command::new("cmd");
            shell.arg("/C").arg(program);
            shell
        } else {
            Command::new(program)
        };

        let status = command
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::CommandSpawn {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        Ok(status.code().unwrap_or(-1))
    }
}

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("environment reference pattern is valid")
});

/// Expand `$VAR` and `${VAR}` references from the process environment.
///
/// Undefined variables expand to the empty string.
pub fn expand_env_vars(arg: &str) -> Cow<'_, str> {
    ENV_REFERENCE.replace_all(arg, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        env::var(name).unwrap_or_default()
    })
}

/// Run every command of `commands` that applies to `target`, in order.
///
/// A command is executed once per matching token of its OS pattern. The first
/// command that exits non-zero aborts the list with [`Error::CommandFailed`].
pub fn run_applicable(
    runner: &dyn CommandRunner,
    commands: &[BuildCommand],
    target: TargetOs,
    dir: &Path,
) -> Result<()> {
    if commands.is_empty() {
        debug!("No build command found in {}", dir.display());
        return Ok(());
    }

    for command in commands {
        let runs = applicable_runs(&command.os, target);
        if runs == 0 {
            debug!("Skipping '{}' (os: {})", command.cmd, command.os);
            continue;
        }

        let args: Vec<String> = command
            .args
            .iter()
            .map(|a| expand_env_vars(a).into_owned())
            .collect();

        for _ in 0..runs {
            debug!("OS: {} cmd: {} {:?}", command.os, command.cmd, args);
            let status = runner.run(&command.cmd, &args, dir)?;
            if status != 0 {
                return Err(Error::CommandFailed {
                    program: command.cmd.clone(),
                    status,
                    dir: dir.to_path_buf(),
                });
            }
        }
    }
    Ok(())
}
