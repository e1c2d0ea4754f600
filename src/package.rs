//! # Package Graph Nodes
//!
//! A [`Package`] is one node of the dependency graph. It starts out as a bare
//! name the first time anything refers to it, receives its source locations
//! and branch from the edge that discovered it, and is filled in from its own
//! descriptor once its tree is on disk.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::descriptor::{BuildCommand, DependencySpec, Descriptor};
use crate::error::Error;

/// Index of a package inside a [`Registry`](crate::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub(crate) usize);

/// Transport used to download package sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Git,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Git => f.write_str("git"),
            Protocol::Https => f.write_str("https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(Protocol::Git),
            "https" => Ok(Protocol::Https),
            _ => Err(Error::UnknownProtocol(s.to_string())),
        }
    }
}

/// Download URIs of a package, tagged by transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocations {
    pub git: Option<String>,
    pub https: Option<String>,
}

impl SourceLocations {
    pub fn new(git: Option<String>, https: Option<String>) -> Self {
        Self {
            git: git.filter(|s| !s.is_empty()),
            https: https.filter(|s| !s.is_empty()),
        }
    }

    /// Classify a bare URI: `https://` URIs are https sources, anything else
    /// (ssh, `git@host:path`, local paths) is handed to git as is.
    pub fn from_uri(uri: &str) -> Self {
        if uri.starts_with("https://") {
            Self::new(None, Some(uri.to_string()))
        } else {
            Self::new(Some(uri.to_string()), None)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.git.is_none() && self.https.is_none()
    }

    /// The location to download from, preferring `protocol` and falling back
    /// to the other transport.
    pub fn select(&self, protocol: Protocol) -> Option<&str> {
        let (preferred, fallback) = match protocol {
            Protocol::Git => (&self.git, &self.https),
            Protocol::Https => (&self.https, &self.git),
        };
        preferred.as_deref().or(fallback.as_deref())
    }

    /// Fill locations that are still unset from `other`.
    pub fn fill_from(&mut self, other: SourceLocations) {
        if self.git.is_none() {
            self.git = other.git;
        }
        if self.https.is_none() {
            self.https = other.https;
        }
    }
}

/// A reference from one package to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyEdge {
    pub target_name: String,
    pub sources: SourceLocations,
    pub branch: Option<String>,
    /// Sub-namespaces to expose; empty exposes the whole package.
    pub modules: Vec<String>,
    /// Weak dependency: fetched and linked, never built by the referencer.
    pub fetch_only: bool,
    pub post_build_steps: Vec<BuildCommand>,
    /// Canonical registry entry, bound during the fetch phase.
    pub resolved: Option<PackageId>,
}

impl DependencyEdge {
    pub fn new(target_name: &str) -> Self {
        Self {
            target_name: target_name.to_string(),
            ..Default::default()
        }
    }
}

impl From<DependencySpec> for DependencyEdge {
    fn from(spec: DependencySpec) -> Self {
        Self {
            target_name: spec.name,
            sources: SourceLocations::new(spec.git, spec.https),
            branch: normalize_branch(spec.branch),
            modules: spec.modules,
            fetch_only: spec.fetch_only,
            post_build_steps: spec.post,
            resolved: None,
        }
    }
}

/// Treat an empty branch name as "no branch".
pub fn normalize_branch(branch: Option<String>) -> Option<String> {
    branch.filter(|b| !b.trim().is_empty())
}

/// Render a branch for messages, naming the default branch explicitly.
pub fn branch_label(branch: Option<&str>) -> &str {
    branch.unwrap_or("default")
}

/// A node of the dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub sources: SourceLocations,
    pub branch: Option<String>,
    pub build_steps: Vec<BuildCommand>,
    pub edges: Vec<DependencyEdge>,
    pub fetched: bool,
    pub built: bool,
}

impl Package {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Merge a freshly loaded descriptor into this package.
    ///
    /// Build steps and edges come from the descriptor. Source locations only
    /// fill what the discovering edge left unset, and the registry name always
    /// wins over the descriptor's.
    pub fn apply_descriptor(&mut self, descriptor: Descriptor) {
        if !descriptor.name.is_empty() && descriptor.name != self.name {
            warn!(
                "Descriptor of {} declares name '{}'; keeping '{}'",
                self.name, descriptor.name, self.name
            );
        }
        self.sources
            .fill_from(SourceLocations::new(descriptor.git, descriptor.https));
        self.build_steps = descriptor.build;
        self.edges = descriptor
            .depends
            .into_iter()
            .map(DependencyEdge::from)
            .collect();
    }
}
