//! Package metadata read from site-packages directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, trace};

use super::{normalize_name, Distribution, PackageMetadata};
use crate::error::Result;
use crate::resolver::{EnvLookup, SystemEnv};

const DIST_INFO_SUFFIX: &str = ".dist-info";

/// Distributions installed in a list of site-packages directories.
///
/// Directories are searched in order; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitePackages {
    dirs: Vec<PathBuf>,
}

impl SitePackages {
    /// Search exactly these directories.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Search `extra`, then the active virtual environment's site-packages.
    pub fn discover(extra: Vec<PathBuf>) -> Self {
        Self::discover_with_env(extra, &SystemEnv)
    }

    /// Like [`discover`](Self::discover), reading `VIRTUAL_ENV` from `env`.
    pub fn discover_with_env(extra: Vec<PathBuf>, env: &dyn EnvLookup) -> Self {
        let mut dirs = extra;

        if let Some(venv) = env.var("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
            let venv = PathBuf::from(venv);
            dirs.extend(venv_site_packages(&venv));
        }

        debug!("Site-packages search path: {:?}", dirs);
        Self { dirs }
    }

    /// Directories searched, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn find_in(&self, dir: &Path, wanted: &str) -> Result<Option<Distribution>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|n| n.strip_suffix(DIST_INFO_SUFFIX))
            else {
                continue;
            };

            let (name, version) = match stem.split_once('-') {
                Some((name, version)) => (name, Some(version.to_string())),
                None => (stem, None),
            };
            if normalize_name(name) != wanted {
                continue;
            }

            trace!("Found distribution {} in {}", name, dir.display());
            let files = read_record(&entry.path())?;
            return Ok(Some(Distribution {
                name: name.to_string(),
                version,
                location: dir.to_path_buf(),
                files,
            }));
        }

        Ok(None)
    }
}

impl PackageMetadata for SitePackages {
    fn distribution(&self, name: &str) -> Result<Option<Distribution>> {
        let wanted = normalize_name(name);
        for dir in &self.dirs {
            if let Some(dist) = self.find_in(dir, &wanted)? {
                return Ok(Some(dist));
            }
        }
        Ok(None)
    }
}

/// Site-packages directories of a virtual environment.
fn venv_site_packages(venv: &Path) -> Vec<PathBuf> {
    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() {
        return vec![windows];
    }

    let Ok(entries) = fs::read_dir(venv.join("lib")) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with("python"))
        .map(|e| e.path().join("site-packages"))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Read the file manifest of a `.dist-info` directory.
///
/// A missing `RECORD` yields an empty manifest.
fn read_record(dist_info: &Path) -> Result<Vec<PathBuf>> {
    let record = dist_info.join("RECORD");
    if !record.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&record)
        .with_context(|| format!("Failed to read {}", record.display()))?;

    Ok(content
        .lines()
        .filter_map(record_path)
        .map(PathBuf::from)
        .collect())
}

/// First CSV field of a RECORD line, honoring double quotes.
fn record_path(line: &str) -> Option<String> {
    let line = line.trim_end();
    if line.is_empty() {
        return None;
    }

    let path = match line.strip_prefix('"') {
        Some(rest) => {
            let mut path = String::new();
            let mut chars = rest.chars().peekable();
            while let Some(c) = chars.next() {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        path.push('"');
                        chars.next();
                    } else {
                        break;
                    }
                } else {
                    path.push(c);
                }
            }
            path
        }
        None => line.split(',').next().unwrap_or_default().to_string(),
    };

    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn install(site: &Path, dist_info: &str, record: &str) {
        let dir = site.join(dist_info);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("RECORD"), record).unwrap();
    }

    #[test]
    fn finds_distribution_by_normalized_name() {
        let temp = TempDir::new().unwrap();
        install(
            temp.path(),
            "amplifier_module_tool_bash-1.2.0.dist-info",
            "amplifier_module_tool_bash/__init__.py,sha256=abc,10\n\
             amplifier_module_tool_bash-1.2.0.dist-info/RECORD,,\n",
        );

        let packages = SitePackages::new(vec![temp.path().to_path_buf()]);
        let dist = packages
            .distribution("amplifier-module-tool-bash")
            .unwrap()
            .unwrap();

        assert_eq!(dist.version.as_deref(), Some("1.2.0"));
        assert_eq!(dist.location, temp.path());
        assert_eq!(dist.files.len(), 2);
        assert_eq!(dist.root(), temp.path().join("amplifier_module_tool_bash"));
    }

    #[test]
    fn missing_distribution_is_none() {
        let temp = TempDir::new().unwrap();
        install(temp.path(), "other-1.0.dist-info", "");

        let packages = SitePackages::new(vec![temp.path().to_path_buf()]);
        assert!(packages.distribution("absent").unwrap().is_none());
    }

    #[test]
    fn missing_directory_is_skipped() {
        let temp = TempDir::new().unwrap();
        let packages = SitePackages::new(vec![temp.path().join("gone")]);
        assert!(packages.distribution("anything").unwrap().is_none());
    }

    #[test]
    fn earlier_directory_wins() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        install(&first, "tool-1.0.dist-info", "tool/__init__.py,,\n");
        install(&second, "tool-2.0.dist-info", "tool/__init__.py,,\n");

        let packages = SitePackages::new(vec![first.clone(), second]);
        let dist = packages.distribution("tool").unwrap().unwrap();
        assert_eq!(dist.version.as_deref(), Some("1.0"));
        assert_eq!(dist.location, first);
    }

    #[test]
    fn discovers_virtualenv_site_packages() {
        let temp = TempDir::new().unwrap();
        let site = temp.path().join("lib").join("python3.12").join("site-packages");
        fs::create_dir_all(&site).unwrap();

        let mut env = HashMap::new();
        env.insert(
            "VIRTUAL_ENV".to_string(),
            temp.path().to_string_lossy().into_owned(),
        );

        let packages = SitePackages::discover_with_env(vec![PathBuf::from("/extra")], &env);
        assert_eq!(packages.dirs(), &[PathBuf::from("/extra"), site]);
    }

    #[test]
    fn record_path_handles_quotes() {
        assert_eq!(record_path("a/b.py,sha256=x,1").as_deref(), Some("a/b.py"));
        assert_eq!(
            record_path("\"dir,with/comma.py\",,").as_deref(),
            Some("dir,with/comma.py")
        );
        assert_eq!(record_path(""), None);
    }
}
