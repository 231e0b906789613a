//! Settings schema.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fetch::{GitCloneFetcher, RemoteFetcher, UvFetcher};
use crate::resolver::SettingsProvider;
use crate::source::{Descriptor, SourceRecord};

/// Merged user, project, and local settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory of module checkouts, one subdirectory per module id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    /// Module source overrides by module id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, Descriptor>,

    /// Cache root for git modules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Extra site-packages directories searched before the active virtualenv.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub site_packages: Vec<PathBuf>,

    /// Extra collection roots searched after the project and user roots.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collection_dirs: Vec<PathBuf>,

    /// Fetcher used to materialize git modules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetcher: Option<FetcherConfig>,
}

impl Settings {
    /// Make relative paths absolute against `base`.
    ///
    /// Covers the path settings and local-path descriptors in `sources`.
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        let absolutize = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(workspace) = &mut self.workspace {
            absolutize(workspace);
        }
        if let Some(cache_dir) = &mut self.cache_dir {
            absolutize(cache_dir);
        }
        self.site_packages.iter_mut().for_each(absolutize);
        self.collection_dirs.iter_mut().for_each(absolutize);

        for descriptor in self.sources.values_mut() {
            match descriptor {
                Descriptor::Uri(uri) if uri.starts_with('.') => {
                    *uri = base.join(&*uri).to_string_lossy().into_owned();
                }
                Descriptor::Record(SourceRecord {
                    kind: Some(kind),
                    path: Some(path),
                    ..
                }) if kind.as_str() == "file" && Path::new(path.as_str()).is_relative() => {
                    *path = base.join(&*path).to_string_lossy().into_owned();
                }
                _ => {}
            }
        }
    }
}

impl SettingsProvider for Settings {
    fn module_sources(&self) -> HashMap<String, Descriptor> {
        self.sources
            .iter()
            .map(|(id, descriptor)| (id.clone(), descriptor.clone()))
            .collect()
    }
}

/// Which fetcher materializes git modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// `uv pip install --target`.
    #[default]
    Uv,
    /// Shallow `git clone`.
    Git,
}

/// Fetcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub kind: FetcherKind,

    /// Executable override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Extra installer arguments (uv only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl FetcherConfig {
    /// Build the configured fetcher.
    pub fn build(&self) -> Arc<dyn RemoteFetcher> {
        match self.kind {
            FetcherKind::Uv => {
                let base = match &self.program {
                    Some(program) => UvFetcher::new(program.clone()),
                    None => UvFetcher::default(),
                };
                Arc::new(base.with_args(self.extra_args.iter().cloned()))
            }
            FetcherKind::Git => Arc::new(match &self.program {
                Some(program) => GitCloneFetcher::new(program.clone()),
                None => GitCloneFetcher::default(),
            }),
        }
    }
}
