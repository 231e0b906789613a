//! Fetching through a shallow `git clone`.

use std::fs;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::{check_output, FetchRequest, RemoteFetcher};

/// Clones the ref into the target without installing dependencies.
///
/// The whole repository is cloned; a subdirectory in the request is
/// selected afterwards by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCloneFetcher {
    /// Git executable.
    pub program: String,
}

impl Default for GitCloneFetcher {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitCloneFetcher {
    /// Create a fetcher running a specific git executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl RemoteFetcher for GitCloneFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<()> {
        let target = request.target;

        // git refuses non-empty targets; an empty leftover slot is removed.
        if target.exists() {
            let is_empty = fs::read_dir(target)
                .with_context(|| format!("Failed to read {:?}", target))?
                .next()
                .is_none();
            if !is_empty {
                bail!("Target directory {:?} is not empty", target);
            }
            fs::remove_dir(target)?;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let target_arg = target.to_string_lossy();
        let args = [
            "clone",
            "--depth",
            "1",
            "--branch",
            request.git_ref,
            request.url,
            target_arg.as_ref(),
        ];
        debug!("Running: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        check_output(&self.program, "clone", &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serialize git-process tests to avoid flaky failures under parallel execution
    static GIT_LOCK: Mutex<()> = Mutex::new(());

    fn git(args: &[&str], dir: &Path) {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    /// Create a bare repo whose `main` branch holds `tools/fs/__init__.py`.
    fn create_bare_repo(parent: &Path) -> PathBuf {
        let bare_path = parent.join("modules.git");
        let work_dir = parent.join("work");
        fs::create_dir_all(&work_dir).unwrap();

        git(
            &[
                "init",
                "--bare",
                "--initial-branch=main",
                bare_path.to_string_lossy().as_ref(),
            ],
            parent,
        );
        git(
            &[
                "clone",
                bare_path.to_string_lossy().as_ref(),
                work_dir.to_string_lossy().as_ref(),
            ],
            parent,
        );
        for (key, val) in [("user.name", "Test"), ("user.email", "test@test.com")] {
            git(&["config", key, val], &work_dir);
        }

        let module_dir = work_dir.join("tools").join("fs");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("__init__.py"), "def mount(): pass\n").unwrap();

        git(&["add", "."], &work_dir);
        git(&["commit", "-m", "Initial commit"], &work_dir);
        git(&["push", "origin", "HEAD:main"], &work_dir);

        bare_path
    }

    #[test]
    fn clones_ref_from_local_bare_repo() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let bare_path = create_bare_repo(temp.path());
        let target = temp.path().join("cache").join("abc").join("main");
        let url = bare_path.to_string_lossy().into_owned();

        GitCloneFetcher::default()
            .fetch(&FetchRequest {
                url: &url,
                git_ref: "main",
                subdirectory: Some("tools/fs"),
                target: &target,
            })
            .unwrap();

        assert!(target.join("tools/fs/__init__.py").exists());
    }

    #[test]
    fn clone_replaces_empty_target() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let bare_path = create_bare_repo(temp.path());
        let target = temp.path().join("slot");
        fs::create_dir_all(&target).unwrap();
        let url = bare_path.to_string_lossy().into_owned();

        GitCloneFetcher::default()
            .fetch(&FetchRequest {
                url: &url,
                git_ref: "main",
                subdirectory: None,
                target: &target,
            })
            .unwrap();

        assert!(target.join("tools").is_dir());
    }

    #[test]
    fn unknown_ref_is_error() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let bare_path = create_bare_repo(temp.path());
        let target = temp.path().join("slot");
        let url = bare_path.to_string_lossy().into_owned();

        let err = GitCloneFetcher::default()
            .fetch(&FetchRequest {
                url: &url,
                git_ref: "no-such-branch",
                subdirectory: None,
                target: &target,
            })
            .unwrap_err();

        assert!(err.to_string().contains("clone failed"));
    }

    #[test]
    fn non_empty_target_is_rejected() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("slot");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("leftover.txt"), "").unwrap();

        let err = GitCloneFetcher::default()
            .fetch(&FetchRequest {
                url: "/nonexistent/repo.git",
                git_ref: "main",
                subdirectory: None,
                target: &target,
            })
            .unwrap_err();

        assert!(err.to_string().contains("not empty"));
    }
}
