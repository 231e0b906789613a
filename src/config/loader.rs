//! Settings file discovery and loading.
//!
//! This module handles finding and loading settings files from
//! various locations in the correct priority order.

use crate::config::schema::Settings;
use crate::error::{ResolutionError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SETTINGS_DIR: &str = ".amplifier";
const SETTINGS_FILE: &str = "settings.yaml";
const LOCAL_SETTINGS_FILE: &str = "settings.local.yaml";

/// Paths to settings files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User settings (`~/.amplifier/settings.yaml`)
/// 2. Project settings (`.amplifier/settings.yaml`)
/// 3. Local overrides (`.amplifier/settings.local.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPaths {
    /// User's settings: ~/.amplifier/settings.yaml
    pub user: Option<PathBuf>,

    /// Project settings: .amplifier/settings.yaml
    pub project: Option<PathBuf>,

    /// Local overrides: .amplifier/settings.local.yaml
    pub project_local: Option<PathBuf>,
}

impl SettingsPaths {
    /// Discover settings files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self::discover_with_home(project_root, dirs::home_dir().as_deref())
    }

    /// Discover settings files with an explicit home directory.
    pub fn discover_with_home(project_root: &Path, home: Option<&Path>) -> Self {
        let project_dir = project_root.join(SETTINGS_DIR);
        Self {
            user: home.and_then(|home| existing(home.join(SETTINGS_DIR).join(SETTINGS_FILE))),
            project: existing(project_dir.join(SETTINGS_FILE)),
            project_local: existing(project_dir.join(LOCAL_SETTINGS_FILE)),
        }
    }

    /// Returns all existing settings paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Load a single settings file.
///
/// An empty file yields default settings.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    parse_settings(&content, path)
}

/// Parse YAML content into settings.
///
/// `source_path` is only used for error reporting.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    let value = parse_value(content, source_path)?;
    from_value(value, source_path)
}

/// Load a settings file as a raw YAML value (for merging).
///
/// An empty file yields an empty mapping.
pub fn load_settings_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    parse_value(&content, path)
}

fn parse_value(content: &str, source_path: &Path) -> Result<Value> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ResolutionError::ConfigParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(match value {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    })
}

fn from_value(value: Value, source_path: &Path) -> Result<Settings> {
    serde_yaml::from_value(value).map_err(|e| ResolutionError::ConfigParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge two settings values, `overlay` taking precedence.
///
/// Mappings merge key by key; anything else in `overlay` replaces `base`.
/// A null in `overlay` removes the key.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(&key);
                    continue;
                }
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Top-level keys whose entries a later file replaces whole.
///
/// A source descriptor record is one value; mixing fields from two files
/// would pin a repository to a ref neither file names.
const WHOLE_ENTRY_KEYS: &[&str] = &["sources"];

/// Merge two settings documents, `overlay` taking precedence.
///
/// Like [`merge_values`], except that entries under the keys in
/// [`WHOLE_ENTRY_KEYS`] are replaced rather than merged field by field.
pub fn merge_settings(base: Value, overlay: Value) -> Value {
    let (mut base, overlay) = match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => (base, overlay),
        (_, overlay) => return overlay,
    };

    for (key, value) in overlay {
        if value.is_null() {
            base.remove(&key);
            continue;
        }
        let whole_entries = key
            .as_str()
            .is_some_and(|k| WHOLE_ENTRY_KEYS.contains(&k));
        let merged = match base.remove(&key) {
            Some(existing) if whole_entries => replace_entries(existing, value),
            Some(existing) => merge_values(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }
    Value::Mapping(base)
}

/// One-level merge: each overlay entry replaces the base entry whole.
fn replace_entries(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(&key);
                } else {
                    base.insert(key, value);
                }
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Load and merge all settings files for a project.
///
/// Missing files are skipped; with none present this returns default
/// settings. Relative paths resolve against `project_root`.
pub fn load_settings(project_root: &Path) -> Result<Settings> {
    load_from_paths(project_root, &SettingsPaths::discover(project_root))
}

/// Like [`load_settings`] with an explicit home directory.
pub fn load_settings_with_home(project_root: &Path, home: Option<&Path>) -> Result<Settings> {
    load_from_paths(
        project_root,
        &SettingsPaths::discover_with_home(project_root, home),
    )
}

fn load_from_paths(project_root: &Path, paths: &SettingsPaths) -> Result<Settings> {
    let mut merged = Value::Mapping(Default::default());

    for path in paths.all_existing() {
        debug!("Loading settings from {}", path.display());
        merged = merge_settings(merged, load_settings_value(path)?);
    }

    let report_path = paths
        .all_existing()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| project_root.join(SETTINGS_DIR).join(SETTINGS_FILE));

    let mut settings = from_value(merged, &report_path)?;
    settings.resolve_relative_paths(project_root);
    Ok(settings)
}
