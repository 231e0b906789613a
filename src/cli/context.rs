//! Settings and collaborators shared by commands.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collection::CollectionDirs;
use crate::config::{load_settings, Settings};
use crate::error::Result;
use crate::resolver::StandardResolver;
use crate::source::SourceContext;

/// Loaded settings plus the collaborators built from them.
#[derive(Debug)]
pub struct CommandContext {
    project_root: PathBuf,
    settings: Settings,
    sources: SourceContext,
}

impl CommandContext {
    /// Load settings for a project and wire the default collaborators.
    pub fn load(project_root: &Path) -> Result<Self> {
        let settings = load_settings(project_root)?;
        Ok(Self::from_settings(project_root, settings))
    }

    /// Wire the default collaborators from already-loaded settings.
    pub fn from_settings(project_root: &Path, settings: Settings) -> Self {
        let sources = SourceContext::from_settings(&settings);
        debug!(
            "Module cache at {}",
            sources.cache().root().display()
        );
        Self {
            project_root: project_root.to_path_buf(),
            settings,
            sources,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sources(&self) -> &SourceContext {
        &self.sources
    }

    /// Build a resolver, optionally overriding the configured workspace.
    pub fn resolver(&self, workspace: Option<&Path>) -> StandardResolver {
        let mut resolver = StandardResolver::new(self.sources.packages_handle())
            .with_settings(self.settings.clone())
            .with_collections(CollectionDirs::discover(
                &self.project_root,
                self.settings.collection_dirs.clone(),
            ));

        let workspace = workspace
            .map(|dir| self.project_root.join(dir))
            .or_else(|| self.settings.workspace.clone());
        if let Some(dir) = workspace {
            resolver = resolver.with_workspace(dir);
        }

        resolver
    }
}
