//! Module identifiers.

use std::fmt;

use serde::Serialize;

use crate::error::{ResolutionError, Result};

/// Prefix of the per-module environment override variable.
pub const ENV_PREFIX: &str = "AMPLIFIER_MODULE_";

/// Prefix of the conventional installed-package name.
pub const PACKAGE_PREFIX: &str = "amplifier-module-";

/// A case-normalized module identifier.
///
/// Identifiers are trimmed and ASCII-lowercased on construction, so
/// `Tool-Filesystem` and `tool-filesystem` name the same module.
///
/// # Example
///
/// ```
/// use amplifier_module_resolution::ModuleId;
///
/// let id = ModuleId::new("Tool-Filesystem").unwrap();
/// assert_eq!(id.as_str(), "tool-filesystem");
/// assert_eq!(id.env_key(), "AMPLIFIER_MODULE_TOOL_FILESYSTEM");
/// assert_eq!(id.package_name(), "amplifier-module-tool-filesystem");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Normalize and validate a raw identifier.
    pub fn new(raw: &str) -> Result<Self> {
        let id = raw.trim().to_ascii_lowercase();

        let problem = if id.is_empty() {
            Some("module id is empty")
        } else if id.contains('/') || id.contains('\\') {
            Some("module id must not contain path separators")
        } else if id == "." || id == ".." {
            Some("module id must not be a relative path component")
        } else {
            None
        };

        match problem {
            Some(message) => Err(ResolutionError::InvalidModuleId {
                module_id: raw.to_string(),
                message: message.to_string(),
            }),
            None => Ok(Self(id)),
        }
    }

    /// The normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Environment variable consulted by the env layer.
    pub fn env_key(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.0.to_ascii_uppercase().replace('-', "_"))
    }

    /// Conventional package name tried after the bare id.
    pub fn package_name(&self) -> String {
        format!("{}{}", PACKAGE_PREFIX, self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
