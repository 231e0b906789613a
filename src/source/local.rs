//! Local filesystem module source.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ResolutionError, Result};

use super::scan::contains_module_files;

/// URI scheme accepted in front of local paths.
pub const FILE_SCHEME: &str = "file://";

/// A module living in a local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSource {
    /// Absolute path to the module directory.
    path: PathBuf,
}

impl LocalSource {
    /// Create a source for a path, made absolute against the current directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self { path }
    }

    /// Create a source from a descriptor string, stripping a `file://` prefix.
    pub fn from_descriptor(descriptor: &str) -> Self {
        Self::new(descriptor.strip_prefix(FILE_SCHEME).unwrap_or(descriptor))
    }

    /// The module directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate the directory and return its canonical path.
    pub fn resolve(&self) -> Result<PathBuf> {
        if !self.path.exists() {
            return Err(ResolutionError::PathNotFound {
                path: self.path.clone(),
            });
        }

        if !self.path.is_dir() {
            return Err(ResolutionError::NotADirectory {
                path: self.path.clone(),
            });
        }

        if !contains_module_files(&self.path) {
            return Err(ResolutionError::NotAModule {
                path: self.path.clone(),
            });
        }

        Ok(self.path.canonicalize()?)
    }

    /// Render as a `file://` descriptor.
    pub fn to_descriptor_string(&self) -> String {
        format!("{}{}", FILE_SCHEME, self.path.display())
    }
}
