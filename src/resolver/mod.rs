//! Module resolution across configuration layers.
//!
//! Resolution order (first match wins):
//! 1. Environment variable `AMPLIFIER_MODULE_<ID>`
//! 2. Workspace checkout `<workspace>/<id>`
//! 3. Settings `sources` entry
//! 4. Installed collection
//! 5. Profile-provided source
//! 6. Installed package `<id>` or `amplifier-module-<id>`
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use amplifier_module_resolution::package::Distribution;
//! use amplifier_module_resolution::resolver::{ResolutionLayer, StandardResolver};
//!
//! let mut env = HashMap::new();
//! env.insert(
//!     "AMPLIFIER_MODULE_TOOL_BASH".to_string(),
//!     "git+https://github.com/org/tool-bash@v2".to_string(),
//! );
//!
//! let packages: HashMap<String, Distribution> = HashMap::new();
//! let resolver = StandardResolver::new(Arc::new(packages)).with_env(env);
//!
//! let resolution = resolver.resolve("tool-bash", None).unwrap();
//! assert_eq!(resolution.layer, ResolutionLayer::Env);
//! assert_eq!(resolution.source.to_string(), "git+https://github.com/org/tool-bash@v2");
//! ```

pub mod layer;
pub mod providers;
pub mod report;

pub use layer::ResolutionLayer;
pub use providers::{CollectionProvider, EnvLookup, SettingsProvider, SystemEnv};
pub use report::{LayerAttempt, NotFoundReport};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{ResolutionError, Result};
use crate::module_id::ModuleId;
use crate::package::PackageMetadata;
use crate::source::{
    contains_module_files, is_submodule_checkout, parse_descriptor, Descriptor, LocalSource,
    ModuleSource, PackageSource,
};

use layer::LayerOutcome;
use providers::lookup;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub module_id: ModuleId,
    pub source: ModuleSource,
    /// Layer that produced the source.
    pub layer: ResolutionLayer,
}

/// The six-layer module resolver.
///
/// Holds only injected collaborators, so one instance can serve many
/// resolves across threads.
pub struct StandardResolver {
    workspace_dir: Option<PathBuf>,
    settings: Option<Box<dyn SettingsProvider>>,
    collections: Option<Box<dyn CollectionProvider>>,
    packages: Arc<dyn PackageMetadata>,
    env: Box<dyn EnvLookup>,
}

impl StandardResolver {
    /// Create a resolver reading the process environment and no other
    /// optional layers.
    pub fn new(packages: Arc<dyn PackageMetadata>) -> Self {
        Self {
            workspace_dir: None,
            settings: None,
            collections: None,
            packages,
            env: Box::new(SystemEnv),
        }
    }

    /// Enable the workspace layer.
    pub fn with_workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = Some(dir.into());
        self
    }

    /// Enable the settings layer.
    pub fn with_settings(mut self, provider: impl SettingsProvider + 'static) -> Self {
        self.settings = Some(Box::new(provider));
        self
    }

    /// Enable the collection layer.
    pub fn with_collections(mut self, provider: impl CollectionProvider + 'static) -> Self {
        self.collections = Some(Box::new(provider));
        self
    }

    /// Replace the environment lookup.
    pub fn with_env(mut self, env: impl EnvLookup + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Configured workspace directory.
    pub fn workspace_dir(&self) -> Option<&Path> {
        self.workspace_dir.as_deref()
    }

    /// Resolve a module id to a source and the layer that provided it.
    ///
    /// `profile_hint` is the descriptor the caller's profile names for this
    /// module, if any. A descriptor that fails to parse in the layer that
    /// supplied it is an error; later layers are not consulted.
    pub fn resolve(&self, module_id: &str, profile_hint: Option<&str>) -> Result<Resolution> {
        let id = ModuleId::new(module_id)?;
        let mut attempts = Vec::with_capacity(ResolutionLayer::ALL.len());

        for layer in ResolutionLayer::ALL {
            match self.check_layer(layer, &id, profile_hint)? {
                LayerOutcome::Matched(source) => {
                    debug!("Resolved {} via {} layer: {}", id, layer, source);
                    return Ok(Resolution {
                        module_id: id,
                        source,
                        layer,
                    });
                }
                LayerOutcome::Skipped(reason) => {
                    trace!("{} layer skipped for {}: {}", layer, id, reason);
                    attempts.push(LayerAttempt { layer, reason });
                }
            }
        }

        Err(ResolutionError::ModuleNotFound {
            module_id: id.to_string(),
            report: NotFoundReport {
                module_id: id,
                attempts,
            },
        })
    }

    /// Resolve and return only the source.
    pub fn resolve_source(&self, module_id: &str, profile_hint: Option<&str>) -> Result<ModuleSource> {
        self.resolve(module_id, profile_hint).map(|r| r.source)
    }

    fn check_layer(
        &self,
        layer: ResolutionLayer,
        id: &ModuleId,
        profile_hint: Option<&str>,
    ) -> Result<LayerOutcome> {
        match layer {
            ResolutionLayer::Env => self.from_env(id),
            ResolutionLayer::Workspace => Ok(self.from_workspace(id)),
            ResolutionLayer::Settings => self.from_settings(id),
            ResolutionLayer::Collection => Ok(self.from_collection(id)),
            ResolutionLayer::Profile => from_profile(id, profile_hint),
            ResolutionLayer::Package => self.from_package(id),
        }
    }

    fn from_env(&self, id: &ModuleId) -> Result<LayerOutcome> {
        let key = id.env_key();
        match self.env.var(&key).filter(|v| !v.trim().is_empty()) {
            Some(value) => {
                let descriptor = Descriptor::Uri(value);
                Ok(LayerOutcome::Matched(parse_descriptor(&descriptor, id)?))
            }
            None => Ok(LayerOutcome::Skipped(format!("{} (not set)", key))),
        }
    }

    fn from_workspace(&self, id: &ModuleId) -> LayerOutcome {
        let Some(workspace) = &self.workspace_dir else {
            return LayerOutcome::Skipped("N/A (no workspace configured)".to_string());
        };

        let path = workspace.join(id.as_str());
        if !path.is_dir() {
            return LayerOutcome::Skipped(format!("{} (not found)", path.display()));
        }

        if contains_module_files(&path) {
            return LayerOutcome::Matched(ModuleSource::Local(LocalSource::new(path)));
        }

        if is_submodule_checkout(&path) {
            debug!("Skipping empty submodule placeholder: {}", path.display());
            return LayerOutcome::Skipped(format!(
                "{} (empty submodule placeholder)",
                path.display()
            ));
        }

        warn!(
            "Workspace module directory has no source files: {}",
            path.display()
        );
        LayerOutcome::Skipped(format!("{} (no source files)", path.display()))
    }

    fn from_settings(&self, id: &ModuleId) -> Result<LayerOutcome> {
        let Some(settings) = &self.settings else {
            return Ok(LayerOutcome::Skipped("(no settings provider)".to_string()));
        };

        match lookup(&settings.module_sources(), id.as_str()) {
            Some(descriptor) => Ok(LayerOutcome::Matched(parse_descriptor(&descriptor, id)?)),
            None => Ok(LayerOutcome::Skipped("(no entry)".to_string())),
        }
    }

    fn from_collection(&self, id: &ModuleId) -> LayerOutcome {
        let Some(collections) = &self.collections else {
            return LayerOutcome::Skipped("(no collection provider)".to_string());
        };

        match lookup(&collections.collection_modules(), id.as_str()) {
            Some(path) => LayerOutcome::Matched(ModuleSource::Local(LocalSource::new(path))),
            None => LayerOutcome::Skipped("(no entry)".to_string()),
        }
    }

    fn from_package(&self, id: &ModuleId) -> Result<LayerOutcome> {
        let convention = id.package_name();

        for name in [id.as_str(), convention.as_str()] {
            if self.packages.distribution(name)?.is_some() {
                return Ok(LayerOutcome::Matched(ModuleSource::Package(
                    PackageSource::new(name),
                )));
            }
        }

        Ok(LayerOutcome::Skipped(format!(
            "tried '{}' and '{}' (neither installed)",
            id, convention
        )))
    }
}

fn from_profile(id: &ModuleId, profile_hint: Option<&str>) -> Result<LayerOutcome> {
    match profile_hint.filter(|hint| !hint.trim().is_empty()) {
        Some(hint) => {
            let descriptor = Descriptor::from(hint);
            Ok(LayerOutcome::Matched(parse_descriptor(&descriptor, id)?))
        }
        None => Ok(LayerOutcome::Skipped("(no source specified)".to_string())),
    }
}

impl fmt::Debug for StandardResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardResolver")
            .field("workspace_dir", &self.workspace_dir)
            .field("settings", &self.settings.is_some())
            .field("collections", &self.collections.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::package::Distribution;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn no_packages() -> Arc<dyn PackageMetadata> {
        Arc::new(HashMap::<String, Distribution>::new())
    }

    fn packages(names: &[&str]) -> Arc<dyn PackageMetadata> {
        let map: HashMap<String, Distribution> = names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Distribution {
                        name: name.to_string(),
                        version: None,
                        location: PathBuf::from("/site"),
                        files: Vec::new(),
                    },
                )
            })
            .collect();
        Arc::new(map)
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolver() -> StandardResolver {
        StandardResolver::new(no_packages()).with_env(env(&[]))
    }

    fn write_module(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
    }

    #[test]
    fn env_layer_parses_descriptor() {
        let r = resolver().with_env(env(&[(
            "AMPLIFIER_MODULE_TOOL_X",
            "git+https://github.com/org/tool-x@v1",
        )]));

        let resolution = r.resolve("tool-x", None).unwrap();
        assert_eq!(resolution.layer, ResolutionLayer::Env);
        assert_eq!(resolution.source.as_git().unwrap().git_ref, "v1");
    }

    #[test]
    fn empty_env_value_is_unset() {
        let r = resolver()
            .with_env(env(&[("AMPLIFIER_MODULE_TOOL_X", "")]))
            .with_settings(HashMap::from([(
                "tool-x".to_string(),
                Descriptor::from("/opt/tool-x"),
            )]));

        assert_eq!(
            r.resolve("tool-x", None).unwrap().layer,
            ResolutionLayer::Settings
        );
    }

    #[test]
    fn bad_env_descriptor_does_not_fall_through() {
        let r = resolver()
            .with_env(env(&[("AMPLIFIER_MODULE_TOOL_X", "git+https://h/o/r@")]))
            .with_settings(HashMap::from([(
                "tool-x".to_string(),
                Descriptor::from("/opt/tool-x"),
            )]));

        let err = r.resolve("tool-x", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn workspace_module_is_local() {
        let temp = TempDir::new().unwrap();
        write_module(&temp.path().join("tool-x"));

        let r = resolver().with_workspace(temp.path());
        let resolution = r.resolve("tool-x", None).unwrap();

        assert_eq!(resolution.layer, ResolutionLayer::Workspace);
        assert_eq!(
            resolution.source.as_local().unwrap().path(),
            temp.path().join("tool-x")
        );
    }

    #[test]
    fn empty_submodule_placeholder_falls_through() {
        let temp = TempDir::new().unwrap();
        let placeholder = temp.path().join("tool-x");
        fs::create_dir_all(&placeholder).unwrap();
        fs::write(placeholder.join(".git"), "gitdir: ../.git/modules/tool-x").unwrap();

        let r = resolver()
            .with_workspace(temp.path())
            .with_settings(HashMap::from([(
                "tool-x".to_string(),
                Descriptor::from("git+https://h/o/r@v1"),
            )]));

        assert_eq!(
            r.resolve("tool-x", None).unwrap().layer,
            ResolutionLayer::Settings
        );
    }

    #[test]
    fn workspace_dir_without_sources_falls_through() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("tool-x");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("README.md"), "").unwrap();

        let r = resolver()
            .with_workspace(temp.path())
            .with_env(env(&[]));

        let err = r.resolve("tool-x", None).unwrap_err();
        assert!(err.to_string().contains("(no source files)"));
    }

    #[test]
    fn settings_match_is_case_insensitive() {
        let r = resolver().with_settings(HashMap::from([(
            "Tool-X".to_string(),
            Descriptor::from("amplifier-module-tool-x"),
        )]));

        let source = r.resolve_source("tool-x", None).unwrap();
        assert_eq!(source, ModuleSource::Package(PackageSource::new("amplifier-module-tool-x")));
    }

    #[test]
    fn collection_path_is_used_directly() {
        let r = resolver().with_collections(HashMap::from([(
            "tool-x".to_string(),
            PathBuf::from("/collections/core/modules/tool-x"),
        )]));

        let resolution = r.resolve("tool-x", None).unwrap();
        assert_eq!(resolution.layer, ResolutionLayer::Collection);
        assert_eq!(
            resolution.source.as_local().unwrap().path(),
            Path::new("/collections/core/modules/tool-x")
        );
    }

    #[test]
    fn settings_beat_collections() {
        let r = resolver()
            .with_settings(HashMap::from([(
                "tool-x".to_string(),
                Descriptor::from("/from/settings"),
            )]))
            .with_collections(HashMap::from([(
                "tool-x".to_string(),
                PathBuf::from("/from/collection"),
            )]));

        assert_eq!(
            r.resolve("tool-x", None).unwrap().layer,
            ResolutionLayer::Settings
        );
    }

    #[test]
    fn profile_hint_used_before_packages() {
        let r = StandardResolver::new(packages(&["amplifier-module-tool-x"])).with_env(env(&[]));

        let resolution = r
            .resolve("tool-x", Some("git+https://h/o/tool-x@v3"))
            .unwrap();
        assert_eq!(resolution.layer, ResolutionLayer::Profile);

        let resolution = r.resolve("tool-x", None).unwrap();
        assert_eq!(resolution.layer, ResolutionLayer::Package);
    }

    #[test]
    fn package_exact_name_then_convention() {
        let r = StandardResolver::new(packages(&["tool-x", "amplifier-module-tool-x"]))
            .with_env(env(&[]));
        assert_eq!(
            r.resolve_source("tool-x", None).unwrap(),
            ModuleSource::Package(PackageSource::new("tool-x"))
        );

        let r = StandardResolver::new(packages(&["amplifier-module-tool-y"])).with_env(env(&[]));
        assert_eq!(
            r.resolve_source("tool-y", None).unwrap(),
            ModuleSource::Package(PackageSource::new("amplifier-module-tool-y"))
        );
    }

    #[test]
    fn not_found_lists_every_layer() {
        let err = resolver().resolve("foo", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let ResolutionError::ModuleNotFound { module_id, report } = &err else {
            panic!("Expected ModuleNotFound, got {:?}", err);
        };
        assert_eq!(module_id, "foo");
        assert_eq!(report.attempts.len(), 6);

        let msg = err.to_string();
        assert!(msg.contains("AMPLIFIER_MODULE_FOO (not set)"));
        assert!(msg.contains("(no settings provider)"));
        assert!(msg.contains("uv pip install amplifier-module-foo"));
    }

    #[test]
    fn workspace_reason_names_path() {
        let temp = TempDir::new().unwrap();
        let r = resolver().with_workspace(temp.path());

        let msg = r.resolve("foo", None).unwrap_err().to_string();
        assert!(msg.contains(&format!("{} (not found)", temp.path().join("foo").display())));
    }

    #[test]
    fn invalid_module_id_is_rejected() {
        let err = resolver().resolve("../escape", None).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidModuleId { .. }));
    }

    #[test]
    fn resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StandardResolver>();
    }

    #[test]
    fn resolution_serializes() {
        let r = resolver().with_env(env(&[("AMPLIFIER_MODULE_X", "pkg-x")]));
        let json = serde_json::to_value(r.resolve("x", None).unwrap()).unwrap();
        assert_eq!(json["module_id"], "x");
        assert_eq!(json["layer"], "env");
        assert_eq!(json["source"]["type"], "package");
    }
}
