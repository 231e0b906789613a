//! Collaborators consulted by the resolver.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::source::Descriptor;

/// Read access to environment variables.
pub trait EnvLookup: Send + Sync {
    /// Get a variable's value, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvLookup for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Module source overrides from user or project settings.
pub trait SettingsProvider: Send + Sync {
    /// Map of module id to descriptor.
    fn module_sources(&self) -> HashMap<String, Descriptor>;
}

impl SettingsProvider for HashMap<String, Descriptor> {
    fn module_sources(&self) -> HashMap<String, Descriptor> {
        self.clone()
    }
}

/// Modules shipped by installed collections.
pub trait CollectionProvider: Send + Sync {
    /// Map of module id to module directory.
    fn collection_modules(&self) -> HashMap<String, PathBuf>;
}

impl CollectionProvider for HashMap<String, PathBuf> {
    fn collection_modules(&self) -> HashMap<String, PathBuf> {
        self.clone()
    }
}

/// Look up `id` in a provider map, falling back to a case-insensitive match.
///
/// When several keys match only case-insensitively, the smallest key wins.
pub(crate) fn lookup<V: Clone>(map: &HashMap<String, V>, id: &str) -> Option<V> {
    map.get(id).cloned().or_else(|| {
        map.iter()
            .filter(|(key, _)| key.trim().eq_ignore_ascii_case(id))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value.clone())
    })
}
