//! Phase 1: Fetching
//!
//! This phase makes sure every package reachable from the root is on disk and
//! current, registers it in the [`Registry`](crate::registry::Registry), and
//! composes each package's header namespace.
//!
//! ## Per-package state machine
//!
//! - **Absent** (no directory) or **present without `.git`**: clone, using the
//!   source location picked by the protocol preference and the bound branch.
//! - **Present with `.git`**: switch to the bound branch (if any) and pull.
//! - **Local-only mode**: neither clone nor pull; a missing directory is fatal.
//!
//! After that the `lib` link to the shared output directory is ensured, the
//! descriptor is loaded, every dependency edge is resolved (fetching newly
//! discovered packages depth-first, in declaration order) and the namespace is
//! composed.
//!
//! The fetch graph may contain cycles (through weak dependencies); they are
//! harmless here because a package is fetched only when it is first created
//! in the registry.

use std::path::Path;

use log::{debug, info};

use super::namespace;
use crate::context::{Context, LIB_DIR};
use crate::descriptor;
use crate::error::{Error, Result};
use crate::git;
use crate::package::PackageId;

/// Fetch package `id` and, recursively, everything it depends on.
pub fn fetch_package(ctx: &mut Context, id: PackageId) -> Result<()> {
    let name = ctx.registry.get(id).name.clone();
    let dir = ctx.package_dir(&name);

    ensure_source_tree(ctx, id, &dir)?;
    debug!("Setting up {} in {}", name, dir.display());

    namespace::ensure_symlink(&dir.join(LIB_DIR), &ctx.lib_dir())?;

    match descriptor::load(&dir)? {
        Some(desc) => ctx.registry.get_mut(id).apply_descriptor(desc),
        None => debug!(
            "{} not found in {}. Assuming no dependencies",
            descriptor::DESCRIPTOR_NAME,
            dir.display()
        ),
    }
    ctx.registry.get_mut(id).fetched = true;

    let edge_count = ctx.registry.get(id).edges.len();
    for index in 0..edge_count {
        let edge = ctx.registry.get(id).edges[index].clone();
        let (dep, is_new) = ctx.registry.find_or_create(&edge.target_name);
        ctx.registry.get_mut(id).edges[index].resolved = Some(dep);

        if is_new {
            let package = ctx.registry.get_mut(dep);
            package.sources = edge.sources.clone();
            package.branch = edge.branch.clone();
            fetch_package(ctx, dep)?;
        } else {
            debug!("Package {} has already been configured", edge.target_name);
            ctx.registry.check_branch(dep, edge.branch.as_deref())?;
        }
    }

    let package = ctx.registry.get(id);
    namespace::compose(ctx.dev_root(), &dir, &package.edges)
}

/// Bring the tree of package `id` into existence or up to date.
fn ensure_source_tree(ctx: &Context, id: PackageId, dir: &Path) -> Result<()> {
    let package = ctx.registry.get(id);
    let options = &ctx.options;

    if options.local_only {
        if !dir.is_dir() {
            return Err(Error::LocalOnlyMissing {
                package: package.name.clone(),
                path: dir.to_path_buf(),
            });
        }
        return Ok(());
    }

    if git::is_repository(dir) {
        info!("Updating {}", package.name);
        return git::update(
            ctx.runner,
            &package.name,
            dir,
            package.branch.as_deref(),
            options.force,
        );
    }

    let url = package
        .sources
        .select(options.protocol)
        .ok_or_else(|| Error::MissingSource {
            package: package.name.clone(),
        })?;
    info!("Cloning {} from {}", package.name, url);
    git::clone(
        ctx.runner,
        &package.name,
        url,
        package.branch.as_deref(),
        dir,
    )
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::package::{Protocol, SourceLocations};
    use crate::test_support::{DevTree, ScriptedRunner};
    use std::fs;

    fn seed_root(ctx: &mut Context, name: &str, git: Option<&str>) -> PackageId {
        let (id, _) = ctx.registry.find_or_create(name);
        ctx.registry.get_mut(id).sources = SourceLocations::new(git.map(String::from), None);
        id
    }

    #[test]
    fn test_fetch_clones_missing_tree_and_dependencies() {
        let tree = DevTree::new();
        let runner = ScriptedRunner::new()
            .remote(
                "git@h:app.git",
                r#"{"name": "app", "depends": [{"name": "utils", "git": "git@h:utils.git"}]}"#,
                &[],
            )
            .remote("git@h:utils.git", r#"{"name": "utils"}"#, &["utils"]);
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", Some("git@h:app.git"));

        fetch_package(&mut ctx, root).unwrap();

        assert_eq!(runner.git_commands(), vec!["clone", "clone"]);
        assert_eq!(ctx.registry.names(), vec!["app", "utils"]);
        let app = ctx.registry.get(root);
        assert!(app.fetched);
        assert_eq!(app.edges[0].resolved, ctx.registry.find("utils"));
        assert!(tree.root().join("app/include/utils").is_dir());
        assert!(fs::symlink_metadata(tree.root().join("utils/lib"))
            .unwrap()
            .file_type()
            .is_symlink());
    }

    #[test]
    fn test_fetch_clone_requests_bound_branch() {
        let tree = DevTree::new();
        let runner = ScriptedRunner::new().remote(
            "git@h:app.git",
            r#"{"name": "app", "depends": [{"name": "utils", "git": "git@h:utils.git", "branch": "dev"}]}"#,
            &[],
        );
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", Some("git@h:app.git"));

        fetch_package(&mut ctx, root).unwrap();

        let clone = &runner.calls()[1];
        assert_eq!(&clone.args[..4], &["clone", "-b", "dev", "git@h:utils.git"]);
    }

    #[test]
    fn test_fetch_updates_existing_repository() {
        let tree = DevTree::new();
        tree.package("app", r#"{"name": "app"}"#, &[]);
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", None);

        fetch_package(&mut ctx, root).unwrap();

        assert_eq!(runner.git_commands(), vec!["pull"]);
        assert_eq!(runner.calls()[0].dir, tree.root().join("app"));
    }

    #[test]
    fn test_fetch_directory_without_git_is_recloned() {
        let tree = DevTree::new();
        fs::create_dir_all(tree.root().join("app")).unwrap();
        let runner = ScriptedRunner::new().remote("git@h:app.git", r#"{"name": "app"}"#, &[]);
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", Some("git@h:app.git"));

        fetch_package(&mut ctx, root).unwrap();

        assert_eq!(runner.git_commands(), vec!["clone"]);
    }

    #[test]
    fn test_fetch_prefers_configured_protocol() {
        let tree = DevTree::new();
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        ctx.options.protocol = Protocol::Https;
        let (id, _) = ctx.registry.find_or_create("app");
        ctx.registry.get_mut(id).sources = SourceLocations::new(
            Some("git@h:app.git".into()),
            Some("https://h/app.git".into()),
        );

        fetch_package(&mut ctx, id).unwrap();

        assert_eq!(runner.calls()[0].args[1], "https://h/app.git");
    }

    #[test]
    fn test_fetch_missing_source_is_fatal() {
        let tree = DevTree::new();
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", None);

        let err = fetch_package(&mut ctx, root).unwrap_err();
        assert!(matches!(err, Error::MissingSource { ref package } if package == "app"));
    }

    #[test]
    fn test_local_only_skips_git() {
        let tree = DevTree::new();
        tree.package(
            "app",
            r#"{"name": "app", "depends": [{"name": "utils"}]}"#,
            &[],
        );
        tree.package("utils", r#"{"name": "utils"}"#, &["utils"]);
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        ctx.options.local_only = true;
        let root = seed_root(&mut ctx, "app", None);

        fetch_package(&mut ctx, root).unwrap();

        assert!(runner.calls().is_empty());
        assert_eq!(ctx.registry.len(), 2);
    }

    #[test]
    fn test_local_only_missing_directory_is_fatal() {
        let tree = DevTree::new();
        tree.package(
            "app",
            r#"{"name": "app", "depends": [{"name": "ghost"}]}"#,
            &[],
        );
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        ctx.options.local_only = true;
        let root = seed_root(&mut ctx, "app", None);

        let err = fetch_package(&mut ctx, root).unwrap_err();
        assert!(matches!(err, Error::LocalOnlyMissing { ref package, .. } if package == "ghost"));
    }

    #[test]
    fn test_shared_dependency_fetched_once() {
        let tree = DevTree::new();
        tree.package(
            "app",
            r#"{"name": "app", "depends": [{"name": "a"}, {"name": "b"}]}"#,
            &[],
        );
        tree.package("a", r#"{"name": "a", "depends": [{"name": "base"}]}"#, &["a"]);
        tree.package("b", r#"{"name": "b", "depends": [{"name": "base"}]}"#, &["b"]);
        tree.package("base", r#"{"name": "base"}"#, &["base"]);
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", None);

        fetch_package(&mut ctx, root).unwrap();

        assert_eq!(runner.git_commands().len(), 4);
        assert_eq!(ctx.registry.names(), vec!["app", "a", "base", "b"]);
        let a = ctx.registry.find("a").unwrap();
        let b = ctx.registry.find("b").unwrap();
        assert_eq!(
            ctx.registry.get(a).edges[0].resolved,
            ctx.registry.get(b).edges[0].resolved
        );
    }

    #[test]
    fn test_fetch_cycle_through_weak_edge_terminates() {
        let tree = DevTree::new();
        tree.package(
            "a",
            r#"{"name": "a", "depends": [{"name": "b"}]}"#,
            &["a"],
        );
        tree.package(
            "b",
            r#"{"name": "b", "depends": [{"name": "a", "fetchOnly": true}]}"#,
            &["b"],
        );
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "a", None);

        fetch_package(&mut ctx, root).unwrap();

        assert_eq!(runner.git_commands(), vec!["pull", "pull"]);
        assert!(tree.root().join("b/include/a").is_dir());
    }

    #[test]
    fn test_branch_conflict_between_edges() {
        let tree = DevTree::new();
        tree.package(
            "app",
            r#"{"name": "app", "depends": [
                {"name": "a"},
                {"name": "x", "branch": "main"}]}"#,
            &[],
        );
        tree.package(
            "a",
            r#"{"name": "a", "depends": [{"name": "x", "branch": "dev"}]}"#,
            &["a"],
        );
        tree.package("x", r#"{"name": "x"}"#, &["x"]);
        let runner = ScriptedRunner::new();
        let mut ctx = tree.context(&runner);
        let root = seed_root(&mut ctx, "app", None);

        let err = fetch_package(&mut ctx, root).unwrap_err();
        match err {
            Error::BranchConflict {
                package,
                existing,
                requested,
            } => {
                assert_eq!(package, "x");
                assert_eq!(existing, "dev");
                assert_eq!(requested, "main");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
