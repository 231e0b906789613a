//! Source descriptors.
//!
//! A descriptor is either a string (`git+...`, `file://...`, a path, or a
//! package name) or a structured record tagged with `type`:
//!
//! ```yaml
//! tool-a: git+https://github.com/org/tool-a@v1
//! tool-b:
//!   type: git
//!   url: https://github.com/org/mono
//!   ref: v2
//!   subdirectory: tools/b
//! tool-c: { type: file, path: /src/tool-c }
//! tool-d: { type: package, name: amplifier-module-tool-d }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ResolutionError, Result};
use crate::module_id::ModuleId;

use super::git::{GitSource, GIT_PREFIX};
use super::local::{LocalSource, FILE_SCHEME};
use super::package::PackageSource;
use super::ModuleSource;

/// Where to find a module, in string or record form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// URI-like string.
    Uri(String),
    /// Structured record.
    Record(SourceRecord),
}

/// Structured descriptor record.
///
/// Fields are optional at the serde level so that missing fields surface as
/// descriptor errors naming the module rather than as YAML errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// One of `git`, `file`, `package`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdirectory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&str> for Descriptor {
    fn from(value: &str) -> Self {
        Self::Uri(value.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(value: String) -> Self {
        Self::Uri(value)
    }
}

impl From<SourceRecord> for Descriptor {
    fn from(value: SourceRecord) -> Self {
        Self::Record(value)
    }
}

/// Turn a descriptor into a concrete source for `module_id`.
pub fn parse_descriptor(descriptor: &Descriptor, module_id: &ModuleId) -> Result<ModuleSource> {
    match descriptor {
        Descriptor::Uri(uri) => parse_uri(uri).map_err(|e| match e {
            ResolutionError::InvalidGitUri { .. } => ResolutionError::InvalidDescriptor {
                module_id: module_id.to_string(),
                message: e.to_string(),
            },
            other => other,
        }),
        Descriptor::Record(record) => parse_record(record, module_id),
    }
}

/// Parse the string form of a descriptor.
///
/// Tried in order: `git+` URIs, `file://` or path-like strings, then
/// anything else as an installed package name.
///
/// # Example
///
/// ```
/// use amplifier_module_resolution::source::{parse_uri, ModuleSource};
///
/// assert!(matches!(parse_uri("git+https://github.com/org/repo@v1").unwrap(), ModuleSource::Git(_)));
/// assert!(matches!(parse_uri("./modules/tool").unwrap(), ModuleSource::Local(_)));
/// assert!(matches!(parse_uri("my-package").unwrap(), ModuleSource::Package(_)));
/// ```
pub fn parse_uri(uri: &str) -> Result<ModuleSource> {
    let uri = uri.trim();

    if uri.is_empty() {
        return Err(ResolutionError::InvalidGitUri {
            uri: uri.to_string(),
            message: "descriptor is empty".to_string(),
        });
    }

    if uri.starts_with(GIT_PREFIX) {
        return GitSource::from_uri(uri).map(ModuleSource::Git);
    }

    if uri.starts_with(FILE_SCHEME) || uri.starts_with('/') || uri.starts_with('.') {
        return Ok(ModuleSource::Local(LocalSource::from_descriptor(uri)));
    }

    Ok(ModuleSource::Package(PackageSource::new(uri)))
}

fn parse_record(record: &SourceRecord, module_id: &ModuleId) -> Result<ModuleSource> {
    let invalid = |message: String| ResolutionError::InvalidDescriptor {
        module_id: module_id.to_string(),
        message,
    };
    let required = |field: &Option<String>, name: &str, kind: &str| {
        field
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| invalid(format!("{kind} source requires '{name}'")))
    };

    match record.kind.as_deref() {
        Some("git") => {
            let url = required(&record.url, "url", "git")?;
            let source = GitSource::new(
                url,
                record.git_ref.clone().filter(|r| !r.is_empty()),
                record.subdirectory.clone().filter(|s| !s.is_empty()),
            );
            match source.path_problem() {
                Some(problem) => Err(invalid(format!("git source {problem}"))),
                None => Ok(ModuleSource::Git(source)),
            }
        }
        Some("file") => {
            let path = required(&record.path, "path", "file")?;
            Ok(ModuleSource::Local(LocalSource::from_descriptor(&path)))
        }
        Some("package") => {
            let name = required(&record.name, "name", "package")?;
            Ok(ModuleSource::Package(PackageSource::new(name)))
        }
        Some(other) => Err(invalid(format!(
            "unknown source type '{other}' (expected git, file, or package)"
        ))),
        None => Err(invalid("source record is missing 'type'".to_string())),
    }
}
