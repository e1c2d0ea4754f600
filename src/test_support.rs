//! Shared fixtures for unit tests: a scripted [`CommandRunner`] that records
//! every invocation and simulates `git clone` on disk.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::context::{Context, RunOptions};
use crate::error::Result;
use crate::platform::TargetOs;
use crate::runner::CommandRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

/// A runner that never starts a process.
///
/// `git clone <url> <dir>` creates `<dir>/.git` and, when a remote was
/// registered for `<url>`, writes its descriptor and public header folders.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: RefCell<Vec<Call>>,
    failures: HashMap<String, i32>,
    remotes: HashMap<String, Remote>,
}

#[derive(Default, Clone)]
struct Remote {
    descriptor: Option<String>,
    include_dirs: Vec<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with `status`.
    pub fn fail_program(mut self, program: &str, status: i32) -> Self {
        self.failures.insert(program.to_string(), status);
        self
    }

    /// Register a remote whose clone contains `descriptor` and the given
    /// `include/<dir>` folders.
    pub fn remote(mut self, url: &str, descriptor: &str, include_dirs: &[&str]) -> Self {
        self.remotes.insert(
            url.to_string(),
            Remote {
                descriptor: Some(descriptor.to_string()),
                include_dirs: include_dirs.iter().map(|d| d.to_string()).collect(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }

    /// Invocations other than git, i.e. build and post-build steps.
    pub fn build_calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program != "git")
            .cloned()
            .collect()
    }

    /// `git` sub-commands in invocation order, e.g. `["clone", "pull"]`.
    pub fn git_commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == "git")
            .filter_map(|c| c.args.first().cloned())
            .collect()
    }

    fn simulate_clone(&self, args: &[String]) {
        if args.len() < 3 {
            return;
        }
        let url = &args[args.len() - 2];
        let target = PathBuf::from(&args[args.len() - 1]);
        fs::create_dir_all(target.join(".git")).unwrap();
        if let Some(remote) = self.remotes.get(url) {
            if let Some(descriptor) = &remote.descriptor {
                fs::write(target.join("cpm.json"), descriptor).unwrap();
            }
            for dir in &remote.include_dirs {
                fs::create_dir_all(target.join("include").join(dir)).unwrap();
            }
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<i32> {
        self.calls.borrow_mut().push(Call {
            program: program.to_string(),
            args: args.to_vec(),
            dir: dir.to_path_buf(),
        });
        if let Some(&status) = self.failures.get(program) {
            return Ok(status);
        }
        if program == "git" && args.first().map(String::as_str) == Some("clone") {
            self.simulate_clone(args);
        }
        Ok(0)
    }
}

/// A temporary development tree.
pub struct DevTree {
    pub temp: TempDir,
}

impl DevTree {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Create an already-cloned package with a descriptor and header folders.
    pub fn package(&self, name: &str, descriptor: &str, include_dirs: &[&str]) -> &Self {
        let dir = self.root().join(name);
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::write(dir.join("cpm.json"), descriptor).unwrap();
        for inc in include_dirs {
            fs::create_dir_all(dir.join("include").join(inc)).unwrap();
        }
        self
    }

    pub fn options(&self) -> RunOptions {
        RunOptions::new(self.root().to_path_buf(), TargetOs::Linux)
    }

    pub fn context<'a>(&self, runner: &'a ScriptedRunner) -> Context<'a> {
        Context::new(self.options(), runner)
    }
}
