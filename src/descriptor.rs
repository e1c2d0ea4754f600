//! # Package Descriptors
//!
//! Every package carries a `cpm.json` file at the root of its tree describing
//! where its dependencies come from and how to build it:
//!
//! ```json
//! {
//!   "name": "app",
//!   "git": "git@github.com:example/app.git",
//!   "build": [
//!     { "os": "linux", "cmd": "cmake", "args": ["--build", "build"] },
//!     { "os": "windows", "cmd": "msbuild", "args": ["app.sln"] }
//!   ],
//!   "depends": [
//!     { "name": "utils", "git": "git@github.com:example/utils.git" },
//!     { "name": "mlib", "modules": ["serial"], "fetchOnly": true }
//!   ]
//! }
//! ```
//!
//! A missing descriptor is not an error: the package simply has no further
//! dependencies and nothing to build.
//!
//! Descriptors written for earlier cpm releases are still read. Their keys
//! were capitalised (`Name`, `Depends`, `FetchOnly`, ...) and a dependency
//! named at most one `Module`. Both spellings are accepted and a single
//! `module` is folded into `modules`. Keys that mean nothing to cpm are
//! logged and otherwise ignored.
//!
//! Package and module names become directory entries (`<dev_root>/<name>`,
//! `include/<module>`), so [`load`] rejects any name that is not exactly one
//! plain path component.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use log::warn;
use serde::Deserialize;

use crate::error::{Error, Result};

/// File name of the descriptor inside each package tree.
pub const DESCRIPTOR_NAME: &str = "cpm.json";

/// Decoded contents of a `cpm.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDescriptor")]
pub struct Descriptor {
    pub name: String,
    pub git: Option<String>,
    pub https: Option<String>,
    pub branch: Option<String>,
    pub build: Vec<BuildCommand>,
    pub depends: Vec<DependencySpec>,
}

/// One entry of a `build` or `post` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildCommand {
    /// Empty, `any`, or whitespace-separated OS identifiers.
    #[serde(alias = "Os", alias = "OS")]
    pub os: String,
    #[serde(alias = "Cmd")]
    pub cmd: String,
    #[serde(alias = "Args")]
    pub args: Vec<String>,
}

impl BuildCommand {
    pub fn new(os: &str, cmd: &str, args: &[&str]) -> Self {
        Self {
            os: os.to_string(),
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// One entry of the `depends` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDependency")]
pub struct DependencySpec {
    pub name: String,
    pub git: Option<String>,
    pub https: Option<String>,
    pub branch: Option<String>,
    pub modules: Vec<String>,
    pub fetch_only: bool,
    pub post: Vec<BuildCommand>,
}

type UnknownKeys = BTreeMap<String, serde_json::Value>;

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawDescriptor {
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Git")]
    git: Option<String>,
    #[serde(alias = "Https", alias = "HTTPS")]
    https: Option<String>,
    #[serde(alias = "Branch")]
    branch: Option<String>,
    #[serde(alias = "Build")]
    build: Vec<BuildCommand>,
    #[serde(alias = "Depends")]
    depends: Vec<DependencySpec>,
    #[serde(flatten)]
    unknown: UnknownKeys,
}

impl From<RawDescriptor> for Descriptor {
    fn from(raw: RawDescriptor) -> Self {
        warn_unknown(&raw.unknown, "descriptor", &raw.name);
        Self {
            name: raw.name,
            git: raw.git,
            https: raw.https,
            branch: raw.branch,
            build: raw.build,
            depends: raw.depends,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawDependency {
    #[serde(alias = "Name")]
    name: String,
    #[serde(alias = "Git")]
    git: Option<String>,
    #[serde(alias = "Https", alias = "HTTPS")]
    https: Option<String>,
    #[serde(alias = "Branch")]
    branch: Option<String>,
    #[serde(alias = "Modules")]
    modules: Vec<String>,
    #[serde(alias = "Module")]
    module: Option<String>,
    #[serde(
        rename = "fetchOnly",
        alias = "fetch_only",
        alias = "FetchOnly",
        alias = "fetchonly"
    )]
    fetch_only: bool,
    #[serde(alias = "Post")]
    post: Vec<BuildCommand>,
    #[serde(flatten)]
    unknown: UnknownKeys,
}

impl From<RawDependency> for DependencySpec {
    fn from(raw: RawDependency) -> Self {
        warn_unknown(&raw.unknown, "dependency", &raw.name);
        let mut modules = raw.modules;
        if let Some(module) = raw.module.filter(|m| !m.is_empty()) {
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
        Self {
            name: raw.name,
            git: raw.git,
            https: raw.https,
            branch: raw.branch,
            modules,
            fetch_only: raw.fetch_only,
            post: raw.post,
        }
    }
}

fn warn_unknown(unknown: &UnknownKeys, what: &str, name: &str) {
    for key in unknown.keys() {
        warn!("Ignoring unknown key '{}' in {} {}", key, what, name);
    }
}

/// Whether `name` is exactly one plain path component.
///
/// Rejects empty names, `.`/`..`, roots, drive prefixes and anything with a
/// separator of either platform.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Parse descriptor text. `origin` is only used for error messages.
pub fn parse(content: &str, origin: &Path) -> Result<Descriptor> {
    serde_json::from_str(content).map_err(|e| Error::DescriptorParse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}

/// Check every name that will become a directory entry.
fn validate(descriptor: &Descriptor) -> std::result::Result<(), String> {
    if !descriptor.name.is_empty() && !is_plain_name(&descriptor.name) {
        return Err(format!("invalid package name '{}'", descriptor.name));
    }
    for dep in &descriptor.depends {
        if dep.name.trim().is_empty() {
            return Err("dependency entry without a name".to_string());
        }
        if !is_plain_name(&dep.name) {
            return Err(format!("invalid dependency name '{}'", dep.name));
        }
        if let Some(module) = dep.modules.iter().find(|m| !is_plain_name(m)) {
            return Err(format!(
                "invalid module name '{}' in dependency {}",
                module, dep.name
            ));
        }
    }
    Ok(())
}

/// Load the descriptor of the package rooted at `package_dir`.
///
/// Returns `Ok(None)` when the directory has no `cpm.json`.
pub fn load(package_dir: &Path) -> Result<Option<Descriptor>> {
    let path = package_dir.join(DESCRIPTOR_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::DescriptorParse {
                path,
                message: e.to_string(),
            })
        }
    };

    let descriptor = parse(&content, &path)?;
    validate(&descriptor).map_err(|message| Error::DescriptorParse { path, message })?;
    Ok(Some(descriptor))
}
