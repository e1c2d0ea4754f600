//! Namespace composition
//!
//! A package sees its dependencies' public headers through symlinks in its own
//! `include` directory:
//!
//! - an edge without modules exposes the whole package:
//!   `include/<dep>` -> `<dev_root>/<dep>/include/<dep>`
//! - an edge with modules exposes only those sub-namespaces:
//!   `include/<module>` -> `<dev_root>/<dep>/include/<module>`
//!
//! Links are created when missing and verified when present. Verification
//! compares the filesystem entities the paths denote, not their spelling, so a
//! relative link made by hand or a link through another symlink is accepted.
//! Anything else occupying a link site is a namespace collision; existing
//! files are never replaced.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::context::INCLUDE_DIR;
use crate::error::{Error, Result};
use crate::package::DependencyEdge;

/// One symlink to create inside a package's `include` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// Entry name inside `include`.
    pub name: String,
    /// Absolute path the entry must point at.
    pub target: PathBuf,
}

/// The links an edge contributes to its referencer's namespace.
pub fn plan_links(dev_root: &Path, edge: &DependencyEdge) -> Vec<LinkPlan> {
    let dep_include = dev_root.join(&edge.target_name).join(INCLUDE_DIR);
    if edge.modules.is_empty() {
        vec![LinkPlan {
            name: edge.target_name.clone(),
            target: dep_include.join(&edge.target_name),
        }]
    } else {
        edge.modules
            .iter()
            .map(|module| LinkPlan {
                name: module.clone(),
                target: dep_include.join(module),
            })
            .collect()
    }
}

/// Populate `<package_dir>/include` with links for every edge.
pub fn compose(dev_root: &Path, package_dir: &Path, edges: &[DependencyEdge]) -> Result<()> {
    if edges.is_empty() {
        return Ok(());
    }

    let include = package_dir.join(INCLUDE_DIR);
    fs::create_dir_all(&include).map_err(|e| Error::Filesystem {
        path: include.clone(),
        message: format!("cannot create include directory: {}", e),
    })?;

    for edge in edges {
        for link in plan_links(dev_root, edge) {
            ensure_symlink(&include.join(&link.name), &link.target)?;
        }
    }
    Ok(())
}

/// Make `link` a symlink to `target`, or verify that it already is one.
pub fn ensure_symlink(link: &Path, target: &Path) -> Result<()> {
    match fs::symlink_metadata(link) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Creating symlink {} --> {}", link.display(), target.display());
            create_symlink(target, link).map_err(|e| Error::Filesystem {
                path: link.to_path_buf(),
                message: format!("cannot create symlink to {}: {}", target.display(), e),
            })
        }
        Err(e) => Err(e.into()),
        Ok(meta) if !meta.file_type().is_symlink() => Err(Error::NamespaceCollision {
            link: link.to_path_buf(),
            message: format!(
                "a real {} exists where a link to {} is expected",
                if meta.is_dir() { "directory" } else { "file" },
                target.display()
            ),
        }),
        Ok(_) => {
            if links_to(link, target)? {
                debug!("Symlink {} already in place", link.display());
                Ok(())
            } else {
                let existing = fs::read_link(link)?;
                Err(Error::NamespaceCollision {
                    link: link.to_path_buf(),
                    message: format!(
                        "links to {} instead of {}",
                        existing.display(),
                        target.display()
                    ),
                })
            }
        }
    }
}

/// Whether the symlink at `link` denotes the same entity as `target`.
pub fn links_to(link: &Path, target: &Path) -> Result<bool> {
    let raw = fs::read_link(link)?;
    let resolved = if raw.is_absolute() {
        raw
    } else {
        link.parent().unwrap_or(Path::new("")).join(raw)
    };
    Ok(same_entity(&resolved, target))
}

/// Compare two paths by the filesystem entity they denote.
///
/// When both exist their canonical forms are compared, which sees through
/// relative components and symlink chains. A dangling path cannot be
/// canonicalized, so the comparison falls back to lexical normalization.
pub fn same_entity(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        (Err(_), Err(_)) => normalize(a) == normalize(b),
        _ => false,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
