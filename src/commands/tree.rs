//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the dependency
//! graph of a project as a tree.
//!
//! The graph is resolved in local-only fetch-only mode: nothing is cloned,
//! pulled or built, but every tree must already be present under the dev root.
//! The `lib` and `include` links are refreshed exactly as a normal fetch would,
//! so a namespace collision fails here too. Weak dependencies are
//! marked `(fetch only)`, module-scoped edges list their modules, and an edge
//! leading back into the current path is shown as `(cycle)` without children.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use cpm::context::Context;
use cpm::output::{emoji, OutputConfig};
use cpm::package::{DependencyEdge, PackageId};
use cpm::phases::{fetch, orchestrator};
use cpm::registry::Registry;
use cpm::runner::SystemRunner;

use super::WorkspaceArgs;

/// Display the dependency tree of a project
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Project to inspect: a name under the dev root or a path
    /// (defaults to the current directory)
    #[arg(value_name = "PROJECT")]
    pub project: Option<String>,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Maximum depth to display in the tree.
    ///
    /// Use 0 to show only the root package, 1 for its direct dependencies, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, output: &OutputConfig) -> Result<()> {
    let mut options = args.workspace.run_options()?;
    options.local_only = true;
    options.fetch_only = true;

    let request = orchestrator::RootRequest {
        project: args.project,
        working_dir: std::env::current_dir()?,
        ..Default::default()
    };

    let mut ctx = Context::new(options, &SystemRunner);
    let root = orchestrator::resolve_root(&mut ctx, &request)?;
    orchestrator::ensure_lib_dir(&ctx)?;
    fetch::fetch_package(&mut ctx, root)?;

    println!(
        "{} Dependency tree of {}",
        emoji(output, "🌳", "[TREE]"),
        ctx.registry.get(root).name
    );
    let tree = build_tree_node(
        &ctx.registry,
        root,
        None,
        args.depth.unwrap_or(usize::MAX),
        &mut Vec::new(),
    );
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// Build a display node for `id`, reached through `via` (none for the root).
///
/// `path` holds the packages from the root down to the parent of `id`.
fn build_tree_node(
    registry: &Registry,
    id: PackageId,
    via: Option<&DependencyEdge>,
    max_depth: usize,
    path: &mut Vec<PackageId>,
) -> TreeNode {
    let package = registry.get(id);
    let mut label = package.name.clone();
    if let Some(branch) = &package.branch {
        label.push_str(&format!(" @ {}", branch));
    }
    if let Some(edge) = via {
        if !edge.modules.is_empty() {
            label.push_str(&format!(" [{}]", edge.modules.join(", ")));
        }
        if edge.fetch_only {
            label.push_str(" (fetch only)");
        }
    }

    if path.contains(&id) {
        label.push_str(" (cycle)");
        return TreeNode {
            label,
            children: vec![],
        };
    }
    if path.len() >= max_depth {
        return TreeNode {
            label,
            children: vec![],
        };
    }

    path.push(id);
    let children = package
        .edges
        .iter()
        .filter_map(|edge| {
            edge.resolved
                .map(|target| build_tree_node(registry, target, Some(edge), max_depth, path))
        })
        .collect();
    path.pop();

    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
