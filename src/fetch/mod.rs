//! Fetching remote module trees.
//!
//! The cache decides *when* a git source must be fetched; a
//! [`RemoteFetcher`] decides *how*. Two command-backed fetchers ship here:
//!
//! - [`UvFetcher`]: `uv pip install --target`, installing the module and its
//!   dependencies
//! - [`GitCloneFetcher`]: a shallow `git clone` of the ref

pub mod git;
pub mod uv;

pub use git::GitCloneFetcher;
pub use uv::UvFetcher;

use std::path::Path;
use std::process::Output;

use anyhow::bail;

use crate::source::GIT_PREFIX;

/// One fetch of a repository ref into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest<'a> {
    /// Repository URL, without the `git+` prefix.
    pub url: &'a str,
    /// Branch, tag, or commit.
    pub git_ref: &'a str,
    /// Path of the module within the repository.
    pub subdirectory: Option<&'a str>,
    /// Directory to populate.
    pub target: &'a Path,
}

impl FetchRequest<'_> {
    /// Render as a pip-style requirement: `git+<url>@<ref>[#subdirectory=<sub>]`.
    pub fn requirement(&self) -> String {
        let mut requirement = format!("{}{}@{}", GIT_PREFIX, self.url, self.git_ref);
        if let Some(sub) = self.subdirectory {
            requirement.push_str("#subdirectory=");
            requirement.push_str(sub);
        }
        requirement
    }
}

/// Populates a directory from a repository ref.
///
/// Implementations block until the fetch completes. They must not return
/// `Ok` unless `request.target` was populated.
pub trait RemoteFetcher: Send + Sync {
    /// Fetch `request.url` at `request.git_ref` into `request.target`.
    fn fetch(&self, request: &FetchRequest<'_>) -> anyhow::Result<()>;
}

/// Turn a finished command into an error carrying its stderr.
pub(crate) fn check_output(program: &str, action: &str, output: &Output) -> anyhow::Result<()> {
    if !output.status.success() {
        bail!(
            "{} {} failed ({}): {}",
            program,
            action,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
