//! Module sources.
//!
//! A [`ModuleSource`] is one of three concrete kinds of location a module
//! can come from:
//!
//! - [`LocalSource`]: a directory on disk
//! - [`GitSource`]: a ref of a git repository, materialized into the cache
//! - [`PackageSource`]: an installed package
//!
//! Sources are plain values. Turning one into a directory goes through
//! [`ModuleSource::resolve`] with a [`SourceContext`] carrying the cache,
//! the fetcher, and package metadata.

pub mod descriptor;
pub mod git;
pub mod local;
pub mod package;
pub mod scan;

pub use descriptor::{parse_descriptor, parse_uri, Descriptor, SourceRecord};
pub use git::{GitSource, DEFAULT_REF, GIT_PREFIX};
pub use local::{LocalSource, FILE_SCHEME};
pub use package::PackageSource;
pub use scan::{contains_module_files, is_submodule_checkout};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{default_cache_dir, ModuleCache};
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{RemoteFetcher, UvFetcher};
use crate::package::{PackageMetadata, SitePackages};

/// A concrete module source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModuleSource {
    /// Local directory.
    #[serde(rename = "file")]
    Local(LocalSource),
    /// Git repository ref.
    Git(GitSource),
    /// Installed package.
    Package(PackageSource),
}

impl ModuleSource {
    /// Materialize the source and return its module directory.
    pub fn resolve(&self, ctx: &SourceContext) -> Result<PathBuf> {
        match self {
            Self::Local(source) => source.resolve(),
            Self::Git(source) => source.resolve(ctx.cache(), ctx.fetcher()),
            Self::Package(source) => source.resolve(ctx.packages()),
        }
    }

    /// Canonical string descriptor for this source.
    pub fn to_descriptor_string(&self) -> String {
        match self {
            Self::Local(source) => source.to_descriptor_string(),
            Self::Git(source) => source.to_uri(),
            Self::Package(source) => source.name.clone(),
        }
    }

    /// Short name of the source kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "file",
            Self::Git(_) => "git",
            Self::Package(_) => "package",
        }
    }

    pub fn as_local(&self) -> Option<&LocalSource> {
        match self {
            Self::Local(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_git(&self) -> Option<&GitSource> {
        match self {
            Self::Git(source) => Some(source),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageSource> {
        match self {
            Self::Package(source) => Some(source),
            _ => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn is_git(&self) -> bool {
        matches!(self, Self::Git(_))
    }

    pub fn is_package(&self) -> bool {
        matches!(self, Self::Package(_))
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_descriptor_string())
    }
}

/// Collaborators needed to materialize sources.
#[derive(Clone)]
pub struct SourceContext {
    cache: ModuleCache,
    fetcher: Arc<dyn RemoteFetcher>,
    packages: Arc<dyn PackageMetadata>,
}

impl SourceContext {
    /// Create a context from explicit collaborators.
    pub fn new(
        cache: ModuleCache,
        fetcher: Arc<dyn RemoteFetcher>,
        packages: Arc<dyn PackageMetadata>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            packages,
        }
    }

    /// Build the default collaborators, honoring any overrides in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let cache_root = settings.cache_dir.clone().unwrap_or_else(default_cache_dir);
        let fetcher = match &settings.fetcher {
            Some(config) => config.build(),
            None => Arc::new(UvFetcher::default()) as Arc<dyn RemoteFetcher>,
        };
        let packages = SitePackages::discover(settings.site_packages.clone());

        Self::new(ModuleCache::new(cache_root), fetcher, Arc::new(packages))
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &dyn RemoteFetcher {
        self.fetcher.as_ref()
    }

    pub fn packages(&self) -> &dyn PackageMetadata {
        self.packages.as_ref()
    }

    /// Shared handle to the package metadata, for wiring a resolver.
    pub fn packages_handle(&self) -> Arc<dyn PackageMetadata> {
        Arc::clone(&self.packages)
    }
}

impl fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceContext")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
