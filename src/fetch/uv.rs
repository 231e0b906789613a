//! Fetching through `uv pip install --target`.

use std::fs;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

use super::{check_output, FetchRequest, RemoteFetcher};

/// Installs a git requirement and its dependencies into the target.
///
/// Host-provided packages are expected to be declared as peer dependencies
/// by modules, so they are not pulled into the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UvFetcher {
    /// Installer executable.
    pub program: String,
    /// Extra arguments placed before the requirement.
    pub extra_args: Vec<String>,
}

impl Default for UvFetcher {
    fn default() -> Self {
        Self {
            program: "uv".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl UvFetcher {
    /// Create a fetcher running a specific installer executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    /// Add extra installer arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the argument list for a request.
    pub fn args(&self, request: &FetchRequest<'_>) -> Vec<String> {
        let mut args = vec![
            "pip".to_string(),
            "install".to_string(),
            "--target".to_string(),
            request.target.to_string_lossy().into_owned(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(request.requirement());
        args
    }
}

impl RemoteFetcher for UvFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<()> {
        if let Some(parent) = request.target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let args = self.args(request);
        debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        check_output(&self.program, "pip install", &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn request(target: &Path) -> FetchRequest<'_> {
        FetchRequest {
            url: "https://github.com/org/tool",
            git_ref: "v1",
            subdirectory: Some("pkg"),
            target,
        }
    }

    #[test]
    fn default_program_is_uv() {
        assert_eq!(UvFetcher::default().program, "uv");
    }

    #[test]
    fn builds_install_command() {
        let fetcher = UvFetcher::default();
        let args = fetcher.args(&request(Path::new("/cache/abc/v1")));
        assert_eq!(
            args,
            vec![
                "pip",
                "install",
                "--target",
                "/cache/abc/v1",
                "git+https://github.com/org/tool@v1#subdirectory=pkg",
            ]
        );
    }

    #[test]
    fn extra_args_precede_requirement() {
        let fetcher = UvFetcher::default().with_args(["--quiet", "--no-cache"]);
        let args = fetcher.args(&request(Path::new("/t")));
        assert_eq!(args[4], "--quiet");
        assert_eq!(args[5], "--no-cache");
        assert!(args[6].starts_with("git+"));
    }

    #[test]
    fn missing_program_is_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        let fetcher = UvFetcher::new("definitely-not-a-real-installer-xyz");

        let err = fetcher.fetch(&request(&target)).unwrap_err();
        assert!(format!("{err:#}").contains("definitely-not-a-real-installer-xyz"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_error() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("out");
        let fetcher = UvFetcher::new("false");

        let err = fetcher.fetch(&request(&target)).unwrap_err();
        assert!(err.to_string().contains("pip install failed"));
        // Parent is created before running the installer.
        assert!(target.parent().unwrap().exists());
    }
}
