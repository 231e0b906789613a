//! Cache storage implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::entry::CacheEntry;
use super::lock;
use crate::source::contains_module_files;

/// Number of digest bytes kept in a cache key.
const KEY_BYTES: usize = 6;

/// Storage for fetched git modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCache {
    /// Root directory for cache.
    root: PathBuf,
}

impl ModuleCache {
    /// Create a new module cache.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the cache key for a (url, ref) pair.
    ///
    /// ```
    /// use amplifier_module_resolution::cache::ModuleCache;
    ///
    /// let key = ModuleCache::key("https://github.com/org/repo", "main");
    /// assert_eq!(key.len(), 12);
    /// assert_eq!(key, ModuleCache::key("https://github.com/org/repo", "main"));
    /// ```
    pub fn key(url: &str, git_ref: &str) -> String {
        let hash = Sha256::digest(format!("{}@{}", url, git_ref).as_bytes());
        hex::encode(&hash[..KEY_BYTES])
    }

    /// Get the directory a (url, ref) pair is fetched into.
    pub fn entry_path(&self, url: &str, git_ref: &str) -> PathBuf {
        self.root.join(Self::key(url, git_ref)).join(git_ref)
    }

    /// Check whether an entry directory holds module source files.
    pub fn is_valid(&self, path: &Path) -> bool {
        path.is_dir() && contains_module_files(path)
    }

    /// Get the in-process lock guarding fetches into `path`.
    pub fn entry_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        lock::entry_lock(path)
    }

    /// Forget the lock for `path` if no fetch still holds it.
    pub fn release_entry_lock(&self, path: &Path) {
        lock::release_entry_lock(path)
    }

    /// List all cache entries, sorted by key then ref.
    ///
    /// A missing cache root yields an empty list.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        let keys = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read cache directory {:?}", self.root))?;

        for key_dir in keys {
            let key_dir = key_dir?;
            if !key_dir.file_type()?.is_dir() {
                continue;
            }
            let key = key_dir.file_name().to_string_lossy().into_owned();

            for ref_dir in fs::read_dir(key_dir.path())? {
                let ref_dir = ref_dir?;
                if !ref_dir.file_type()?.is_dir() {
                    continue;
                }
                let path = ref_dir.path();
                let modified = ref_dir
                    .metadata()
                    .and_then(|m| m.modified())
                    .ok()
                    .map(DateTime::<Utc>::from);

                entries.push(CacheEntry {
                    key: key.clone(),
                    git_ref: ref_dir.file_name().to_string_lossy().into_owned(),
                    valid: self.is_valid(&path),
                    path,
                    modified,
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.git_ref.cmp(&b.git_ref)));
        Ok(entries)
    }
}
