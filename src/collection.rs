//! Modules shipped by installed collections.
//!
//! A collection is a directory whose `modules/` subdirectory holds one
//! directory per module:
//!
//! ```text
//! <root>/
//!   core/
//!     modules/
//!       tool-bash/
//!       provider-anthropic/
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::resolver::CollectionProvider;

/// Collection roots searched for modules.
///
/// Earlier roots take precedence when two collections ship the same module.
/// Within a root, collections are visited in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDirs {
    roots: Vec<PathBuf>,
}

impl CollectionDirs {
    /// Search exactly these roots.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Search the project's, then the user's collection roots, then `extra`.
    pub fn discover(project_root: &Path, extra: Vec<PathBuf>) -> Self {
        Self::discover_with_home(project_root, extra, dirs::home_dir().as_deref())
    }

    /// Like [`discover`](Self::discover) with an explicit home directory.
    pub fn discover_with_home(project_root: &Path, extra: Vec<PathBuf>, home: Option<&Path>) -> Self {
        let mut roots = vec![project_root.join(".amplifier").join("collections")];
        if let Some(home) = home {
            roots.push(home.join(".amplifier").join("collections"));
        }
        roots.extend(extra);
        Self { roots }
    }

    /// Roots searched, in order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl CollectionProvider for CollectionDirs {
    fn collection_modules(&self) -> HashMap<String, PathBuf> {
        let mut modules = HashMap::new();

        for root in &self.roots {
            for collection in sorted_dirs(root) {
                for module in sorted_dirs(&collection.join("modules")) {
                    let Some(id) = module.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    trace!("Collection module {} at {}", id, module.display());
                    modules.entry(id.to_string()).or_insert(module.clone());
                }
            }
        }

        modules
    }
}

/// Subdirectories of `dir`, sorted. Missing directories yield nothing.
fn sorted_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_module(root: &Path, collection: &str, id: &str) -> PathBuf {
        let dir = root.join(collection).join("modules").join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
        dir
    }

    #[test]
    fn discovers_project_and_user_roots() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let dirs = CollectionDirs::discover_with_home(
            project.path(),
            vec![PathBuf::from("/extra")],
            Some(home.path()),
        );

        assert_eq!(
            dirs.roots(),
            &[
                project.path().join(".amplifier/collections"),
                home.path().join(".amplifier/collections"),
                PathBuf::from("/extra"),
            ]
        );
    }

    #[test]
    fn lists_modules_of_each_collection() {
        let temp = TempDir::new().unwrap();
        let bash = add_module(temp.path(), "core", "tool-bash");
        let web = add_module(temp.path(), "web", "tool-web");

        let modules = CollectionDirs::new(vec![temp.path().to_path_buf()]).collection_modules();

        assert_eq!(modules.len(), 2);
        assert_eq!(modules["tool-bash"], bash);
        assert_eq!(modules["tool-web"], web);
    }

    #[test]
    fn earlier_root_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let winner = add_module(first.path(), "z-last", "tool-x");
        add_module(second.path(), "a-first", "tool-x");

        let modules = CollectionDirs::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .collection_modules();

        assert_eq!(modules["tool-x"], winner);
    }

    #[test]
    fn collections_within_root_are_ordered_by_name() {
        let temp = TempDir::new().unwrap();
        let winner = add_module(temp.path(), "alpha", "tool-x");
        add_module(temp.path(), "beta", "tool-x");

        let modules = CollectionDirs::new(vec![temp.path().to_path_buf()]).collection_modules();
        assert_eq!(modules["tool-x"], winner);
    }

    #[test]
    fn files_and_missing_roots_are_ignored() {
        let temp = TempDir::new().unwrap();
        let modules_dir = temp.path().join("core").join("modules");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::write(modules_dir.join("not-a-module.txt"), "").unwrap();

        let modules = CollectionDirs::new(vec![
            temp.path().to_path_buf(),
            temp.path().join("missing"),
        ])
        .collection_modules();

        assert!(modules.is_empty());
    }
}
