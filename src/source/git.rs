//! Version-pinned git module source.
//!
//! Git sources are written as `git+<url>[@<ref>][#subdirectory=<path>]` and
//! are materialized into the module cache on first use.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::ModuleCache;
use crate::error::{ResolutionError, Result};
use crate::fetch::{FetchRequest, RemoteFetcher};

/// Prefix every git URI must carry.
pub const GIT_PREFIX: &str = "git+";

/// Ref used when a URI names none.
pub const DEFAULT_REF: &str = "main";

const SUBDIRECTORY_MARKER: &str = "#subdirectory=";

/// A module pinned to a ref of a git repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitSource {
    /// Repository URL, without the `git+` prefix.
    pub url: String,
    /// Branch, tag, or commit.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Path of the module within the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdirectory: Option<String>,
}

impl GitSource {
    /// Create a source, defaulting the ref to `main`.
    pub fn new(url: impl Into<String>, git_ref: Option<String>, subdirectory: Option<String>) -> Self {
        Self {
            url: url.into(),
            git_ref: git_ref.unwrap_or_else(|| DEFAULT_REF.to_string()),
            subdirectory,
        }
    }

    /// Parse a `git+<url>[@<ref>][#subdirectory=<path>]` URI.
    ///
    /// The subdirectory is split off at the last `#subdirectory=` marker,
    /// then the ref at the last `@`, so URLs with `@` in their authority
    /// still parse when a ref is given.
    ///
    /// # Example
    ///
    /// ```
    /// use amplifier_module_resolution::source::GitSource;
    ///
    /// let source = GitSource::from_uri("git+https://github.com/org/repo@v1#subdirectory=tools/fs").unwrap();
    /// assert_eq!(source.url, "https://github.com/org/repo");
    /// assert_eq!(source.git_ref, "v1");
    /// assert_eq!(source.subdirectory.as_deref(), Some("tools/fs"));
    /// ```
    pub fn from_uri(uri: &str) -> Result<Self> {
        let invalid = |message: &str| ResolutionError::InvalidGitUri {
            uri: uri.to_string(),
            message: message.to_string(),
        };

        let rest = uri
            .strip_prefix(GIT_PREFIX)
            .ok_or_else(|| invalid("git URI must start with 'git+'"))?;

        let (rest, subdirectory) = match rest.rfind(SUBDIRECTORY_MARKER) {
            Some(idx) => {
                let sub = &rest[idx + SUBDIRECTORY_MARKER.len()..];
                if sub.is_empty() {
                    return Err(invalid("subdirectory is empty"));
                }
                (&rest[..idx], Some(sub.to_string()))
            }
            None => (rest, None),
        };

        let (url, git_ref) = match rest.rsplit_once('@') {
            Some((url, git_ref)) => {
                if git_ref.is_empty() {
                    return Err(invalid("ref after '@' is empty"));
                }
                (url, Some(git_ref.to_string()))
            }
            None => (rest, None),
        };

        if url.is_empty() {
            return Err(invalid("repository URL is empty"));
        }

        let source = Self::new(url, git_ref, subdirectory);
        if let Some(message) = source.path_problem() {
            return Err(invalid(&message));
        }
        Ok(source)
    }

    /// Describe why the ref or subdirectory would leave the cache entry.
    ///
    /// Both are joined onto cache paths, so they must be relative and free
    /// of `..` components.
    pub(crate) fn path_problem(&self) -> Option<String> {
        if let Some(problem) = confined_path_problem(&self.git_ref) {
            return Some(format!("ref {problem}"));
        }
        self.subdirectory
            .as_deref()
            .and_then(confined_path_problem)
            .map(|problem| format!("subdirectory {problem}"))
    }

    /// Render the canonical `git+` URI. The ref is always explicit.
    pub fn to_uri(&self) -> String {
        let mut uri = format!("{}{}@{}", GIT_PREFIX, self.url, self.git_ref);
        if let Some(sub) = &self.subdirectory {
            uri.push_str(SUBDIRECTORY_MARKER);
            uri.push_str(sub);
        }
        uri
    }

    /// Cache key of this source's (url, ref) pair.
    pub fn cache_key(&self) -> String {
        ModuleCache::key(&self.url, &self.git_ref)
    }

    /// Resolve to the cached module directory, fetching on a cache miss.
    pub fn resolve(&self, cache: &ModuleCache, fetcher: &dyn RemoteFetcher) -> Result<PathBuf> {
        let cache_path = cache.entry_path(&self.url, &self.git_ref);

        if cache.is_valid(&cache_path) {
            debug!("Using cached git module: {}", cache_path.display());
        } else {
            let fetched = self.fetch_locked(cache, &cache_path, fetcher);
            cache.release_entry_lock(&cache_path);
            fetched?;
        }

        self.verify_fetched(&cache_path)
    }

    fn fetch_locked(
        &self,
        cache: &ModuleCache,
        cache_path: &Path,
        fetcher: &dyn RemoteFetcher,
    ) -> Result<()> {
        let lock = cache.entry_lock(cache_path);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        // Another resolve may have populated the entry while we waited.
        if cache.is_valid(cache_path) {
            debug!("Git module cached concurrently: {}", cache_path.display());
            return Ok(());
        }

        info!("Downloading git module: {}@{}", self.url, self.git_ref);
        self.fetch_into(cache_path, fetcher)
    }

    /// Install straight into `target_dir`, bypassing the cache.
    pub fn install_to(&self, target_dir: &Path, fetcher: &dyn RemoteFetcher) -> Result<()> {
        info!(
            "Installing git module to {}: {}@{}",
            target_dir.display(),
            self.url,
            self.git_ref
        );

        self.fetch_into(target_dir, fetcher)?;

        if !target_dir.exists() {
            return Err(ResolutionError::InstallTargetMissing {
                url: self.url.clone(),
                git_ref: self.git_ref.clone(),
                path: target_dir.to_path_buf(),
            });
        }

        debug!("Installed to {}", target_dir.display());
        Ok(())
    }

    fn fetch_into(&self, target: &Path, fetcher: &dyn RemoteFetcher) -> Result<()> {
        let request = FetchRequest {
            url: &self.url,
            git_ref: &self.git_ref,
            subdirectory: self.subdirectory.as_deref(),
            target,
        };

        fetcher
            .fetch(&request)
            .map_err(|e| ResolutionError::Fetch {
                url: self.url.clone(),
                git_ref: self.git_ref.clone(),
                reason: format!("{e:#}"),
            })
    }

    fn verify_fetched(&self, cache_path: &Path) -> Result<PathBuf> {
        match &self.subdirectory {
            Some(sub) => {
                let final_path = cache_path.join(sub);
                if !final_path.exists() {
                    return Err(ResolutionError::SubdirectoryNotFound {
                        url: self.url.clone(),
                        git_ref: self.git_ref.clone(),
                        subdirectory: sub.clone(),
                        path: final_path,
                    });
                }
                Ok(final_path)
            }
            None => {
                if !cache_path.exists() {
                    return Err(ResolutionError::InstallTargetMissing {
                        url: self.url.clone(),
                        git_ref: self.git_ref.clone(),
                        path: cache_path.to_path_buf(),
                    });
                }
                Ok(cache_path.to_path_buf())
            }
        }
    }
}

fn confined_path_problem(value: &str) -> Option<&'static str> {
    let path = Path::new(value);
    if path.has_root() || value.starts_with('/') || value.starts_with('\\') {
        return Some("must be a relative path");
    }
    if path.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        return Some("must not contain '..'");
    }
    None
}

impl fmt::Display for GitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}
