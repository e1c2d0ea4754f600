//! # Package Registry
//!
//! The registry is the deduplicated set of packages discovered during a run.
//! Packages live in an arena and are referred to by [`PackageId`], so
//! dependency edges can point at the one canonical instance of a package
//! regardless of how many referencers it has.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::package::{branch_label, Package, PackageId};

#[derive(Debug, Default)]
pub struct Registry {
    packages: Vec<Package>,
    by_name: HashMap<String, PackageId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the package called `name`, creating a bare one if needed.
    ///
    /// The boolean is `true` when the package was created by this call, which
    /// tells the caller to seed and fetch it.
    pub fn find_or_create(&mut self, name: &str) -> (PackageId, bool) {
        if let Some(&id) = self.by_name.get(name) {
            return (id, false);
        }
        let id = PackageId(self.packages.len());
        self.packages.push(Package::new(name));
        self.by_name.insert(name.to_string(), id);
        (id, true)
    }

    /// Verify that `requested` agrees with the branch already bound to `id`.
    pub fn check_branch(&self, id: PackageId, requested: Option<&str>) -> Result<()> {
        let package = self.get(id);
        let existing = package.branch.as_deref();
        if existing == requested {
            return Ok(());
        }
        Err(Error::BranchConflict {
            package: package.name.clone(),
            existing: branch_label(existing).to_string(),
            requested: branch_label(requested).to_string(),
        })
    }

    pub fn find(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn get_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, p)| (PackageId(i), p))
    }

    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }
}
