//! Orchestrator for a complete cpm run
//!
//! This module resolves the root package from the command line, then runs the
//! fetch phase and (unless fetch-only mode is set) the build phase against a
//! single [`Context`].

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{phase1, phase2};
use crate::context::{Context, RunOptions};
use crate::descriptor::{self, DESCRIPTOR_NAME};
use crate::error::{Error, Result};
use crate::package::{normalize_branch, PackageId, SourceLocations};
use crate::runner::CommandRunner;

/// Which package to start from, as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootRequest {
    /// A bare package name (looked up under the dev root) or a path.
    pub project: Option<String>,
    /// Source URI overriding the root descriptor's locations.
    pub uri: Option<String>,
    /// Branch to bind the root package to.
    pub branch: Option<String>,
    /// Directory relative paths are resolved against.
    pub working_dir: PathBuf,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub root: String,
    pub packages: usize,
    pub built: usize,
}

/// Directory holding the root descriptor for `request`.
pub fn project_dir(dev_root: &Path, request: &RootRequest) -> PathBuf {
    match &request.project {
        Some(project) if project.contains(['/', '\\']) => request.working_dir.join(project),
        Some(project) => dev_root.join(project),
        None => request.working_dir.clone(),
    }
}

/// Package name implied by a source URI: its last path segment without `.git`.
pub fn name_from_uri(uri: &str) -> Option<String> {
    let segment = uri
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\', ':'])
        .next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);
    (!name.is_empty()).then(|| name.to_string())
}

/// Register the root package in the context's registry.
///
/// The root descriptor is read from the project directory. Without one, the
/// root can still be created from `--uri`, named after the project argument
/// or the URI itself.
pub fn resolve_root(ctx: &mut Context, request: &RootRequest) -> Result<PackageId> {
    let dir = project_dir(ctx.dev_root(), request);
    let descriptor_path = dir.join(DESCRIPTOR_NAME);
    debug!("Top descriptor is {}", descriptor_path.display());

    let (name, mut sources, branch) = match descriptor::load(&dir)? {
        Some(desc) => {
            if desc.name.trim().is_empty() {
                return Err(Error::DescriptorParse {
                    path: descriptor_path,
                    message: "root descriptor has no name".to_string(),
                });
            }
            (
                desc.name,
                SourceLocations::new(desc.git, desc.https),
                desc.branch,
            )
        }
        None => {
            let Some(uri) = request.uri.as_deref() else {
                return Err(Error::RootDescriptorMissing {
                    path: descriptor_path,
                    hint: Some(
                        "pass a project name, or --uri to clone the root package".to_string(),
                    ),
                });
            };
            let name = request
                .project
                .as_deref()
                .and_then(|p| Path::new(p).file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .or_else(|| name_from_uri(uri))
                .ok_or_else(|| Error::MissingSource {
                    package: uri.to_string(),
                })?;
            if !descriptor::is_plain_name(&name) {
                return Err(Error::InvalidPackageName(name));
            }
            (name, SourceLocations::default(), None)
        }
    };

    if let Some(uri) = request.uri.as_deref() {
        let mut overridden = SourceLocations::from_uri(uri);
        overridden.fill_from(sources);
        sources = overridden;
    }

    let (id, _) = ctx.registry.find_or_create(&name);
    let root = ctx.registry.get_mut(id);
    root.sources = sources;
    root.branch = normalize_branch(request.branch.clone()).or(normalize_branch(branch));
    Ok(id)
}

/// Create `<dev_root>/lib`, the target of every package's `lib` link.
pub fn ensure_lib_dir(ctx: &Context) -> Result<()> {
    let lib_dir = ctx.lib_dir();
    fs::create_dir_all(&lib_dir).map_err(|e| Error::Filesystem {
        path: lib_dir.clone(),
        message: format!("cannot create shared library directory: {}", e),
    })
}

/// Run the fetch phase and, unless fetch-only mode is set, the build phase.
pub fn execute(ctx: &mut Context, root: PackageId) -> Result<()> {
    ensure_lib_dir(ctx)?;

    info!("Fetching {}", ctx.registry.get(root).name);
    phase1::fetch_package(ctx, root)?;

    if ctx.options.fetch_only {
        info!("Fetch-only mode, skipping build");
        return Ok(());
    }
    phase2::build_package(ctx, root)
}

/// Resolve the root, fetch and build, returning what was done.
pub fn run(
    options: RunOptions,
    runner: &dyn CommandRunner,
    request: &RootRequest,
) -> Result<RunSummary> {
    let mut ctx = Context::new(options, runner);
    debug!("DEV_ROOT={}", ctx.dev_root().display());

    let root = resolve_root(&mut ctx, request)?;
    execute(&mut ctx, root)?;

    Ok(RunSummary {
        root: ctx.registry.get(root).name.clone(),
        packages: ctx.registry.len(),
        built: ctx.registry.iter().filter(|(_, p)| p.built).count(),
    })
}
