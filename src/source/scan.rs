//! Module directory inspection.
//!
//! A directory counts as a module when at least one recognized source file
//! exists anywhere beneath it. Symlinked directories are not followed.

use std::fs;
use std::path::Path;

/// Extension of recognized module source files.
pub const MODULE_FILE_EXTENSION: &str = "py";

/// Check if a directory contains at least one module source file.
///
/// Unreadable or missing directories count as empty.
pub fn contains_module_files(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            if contains_module_files(&path) {
                return true;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext == MODULE_FILE_EXTENSION)
        {
            return true;
        }
    }

    false
}

/// Check if a directory is linked as a git submodule.
///
/// Submodule checkouts carry a `.git` *file* pointing at the parent
/// repository's object store rather than a `.git` directory.
pub fn is_submodule_checkout(dir: &Path) -> bool {
    dir.join(".git").is_file()
}
