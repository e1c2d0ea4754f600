//! Phase 2: Building
//!
//! Packages are built depth-first, dependencies before dependents. Each
//! package moves through three states:
//!
//! - **Unbuilt**: not yet visited.
//! - **InProgress**: its name is on the context's in-progress stack while its
//!   dependencies are being built.
//! - **Built**: its `built` flag is set; later visits return immediately, so a
//!   shared dependency is built once.
//!
//! Reaching a package that is already in progress means the build graph has a
//! cycle, which aborts the run before the package's commands run.
//!
//! Weak (`fetchOnly`) edges are skipped entirely. For every other edge the
//! target is built and then the edge's post-build steps run, once per edge.

use log::{debug, info};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::package::PackageId;
use crate::runner::run_applicable;

/// Build package `id` after building everything it depends on.
pub fn build_package(ctx: &mut Context, id: PackageId) -> Result<()> {
    let package = ctx.registry.get(id);
    let name = package.name.clone();
    if package.built {
        debug!("Package {} has already been built", name);
        return Ok(());
    }

    if ctx.in_progress.contains(&name) {
        let mut chain = ctx.in_progress.clone();
        chain.push(name.clone());
        return Err(Error::CycleDetected {
            package: name,
            chain: chain.join(" -> "),
        });
    }

    ctx.in_progress.push(name.clone());
    let dir = ctx.package_dir(&name);
    debug!("Building {} in {}", name, dir.display());

    let edges = ctx.registry.get(id).edges.clone();
    for edge in &edges {
        if edge.fetch_only {
            debug!("Package {} - skipped build", edge.target_name);
            continue;
        }
        let target = edge.resolved.ok_or_else(|| Error::UnresolvedDependency {
            package: name.clone(),
            target: edge.target_name.clone(),
        })?;
        build_package(ctx, target)?;

        if !edge.post_build_steps.is_empty() {
            debug!("Running post-build steps of {} for {}", edge.target_name, name);
            run_applicable(
                ctx.runner,
                &edge.post_build_steps,
                ctx.options.target_os,
                &dir,
            )?;
        }
    }

    info!("Building {}", name);
    run_applicable(
        ctx.runner,
        &ctx.registry.get(id).build_steps,
        ctx.options.target_os,
        &dir,
    )?;

    ctx.in_progress.pop();
    ctx.registry.get_mut(id).built = true;
    Ok(())
}
