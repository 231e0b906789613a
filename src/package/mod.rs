//! Installed package metadata.
//!
//! The package layer only needs to know whether a distribution is installed
//! and where its files landed. [`SitePackages`] answers that from
//! `*.dist-info` directories; tests use a `HashMap`.

pub mod site_packages;

pub use site_packages::SitePackages;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

/// An installed distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// Distribution name as recorded on disk.
    pub name: String,
    /// Installed version, when known.
    pub version: Option<String>,
    /// Directory the distribution was installed into.
    pub location: PathBuf,
    /// Installed files, relative to `location`.
    pub files: Vec<PathBuf>,
}

impl Distribution {
    /// Directory holding the distribution's importable code.
    ///
    /// This is the top-level directory of the first installed file outside
    /// the metadata directories. Distributions without such a directory
    /// (single-file modules, empty manifests) resolve to `location`.
    pub fn root(&self) -> PathBuf {
        self.files
            .iter()
            .find_map(|file| top_level_dir(file))
            .map(|dir| self.location.join(dir))
            .unwrap_or_else(|| self.location.clone())
    }
}

fn top_level_dir(file: &Path) -> Option<&str> {
    let mut components = file.components();
    let first = match components.next()? {
        Component::Normal(first) => first.to_str()?,
        _ => return None,
    };
    // A bare file has no directory to return.
    components.next()?;

    let is_metadata = first.ends_with(".dist-info")
        || first.ends_with(".data")
        || first.ends_with(".egg-info")
        || first == "__pycache__";
    (!is_metadata).then_some(first)
}

/// Normalize a distribution name for comparison.
///
/// Lowercases and collapses runs of `-`, `_` and `.` into a single `-`.
///
/// ```
/// use amplifier_module_resolution::package::normalize_name;
///
/// assert_eq!(normalize_name("Amplifier_Module.Tool__Bash"), "amplifier-module-tool-bash");
/// ```
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    normalized
}

/// Lookup of installed distributions.
pub trait PackageMetadata: Send + Sync {
    /// Find an installed distribution by name.
    fn distribution(&self, name: &str) -> Result<Option<Distribution>>;
}

impl PackageMetadata for HashMap<String, Distribution> {
    fn distribution(&self, name: &str) -> Result<Option<Distribution>> {
        let wanted = normalize_name(name);
        Ok(self
            .iter()
            .find(|(key, _)| normalize_name(key) == wanted)
            .map(|(_, dist)| dist.clone()))
    }
}
