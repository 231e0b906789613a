//! Installed package module source.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ResolutionError, Result};
use crate::package::PackageMetadata;

/// A module provided by an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSource {
    /// Distribution name.
    pub name: String,
}

impl PackageSource {
    /// Create a source for a distribution name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Look the package up and return its installation root.
    pub fn resolve(&self, packages: &dyn PackageMetadata) -> Result<PathBuf> {
        match packages.distribution(&self.name)? {
            Some(dist) => Ok(dist.root()),
            None => Err(ResolutionError::PackageNotInstalled {
                name: self.name.clone(),
            }),
        }
    }
}
