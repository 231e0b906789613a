//! Cache entry description.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One populated (or partially populated) cache slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// 12-hex-char key derived from the source's url and ref.
    pub key: String,
    /// Ref directory name under the key.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Whether the entry holds module source files.
    pub valid: bool,
    /// Last modification time of the entry directory.
    pub modified: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Get the age of this entry, if its modification time is known.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.modified
            .map(|modified| Utc::now().signed_duration_since(modified))
    }
}
