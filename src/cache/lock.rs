//! In-process locks serializing fetches into the same cache slot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

static ENTRY_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Get the process-wide lock for a cache path.
///
/// The same path always yields the same mutex. Other processes sharing the
/// cache directory are not coordinated.
pub fn entry_lock(path: &Path) -> Arc<Mutex<()>> {
    let locks = ENTRY_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

/// Drop the map entry for `path` once no caller holds its lock.
///
/// The map then only holds paths with a fetch in flight.
pub fn release_entry_lock(path: &Path) {
    let Some(locks) = ENTRY_LOCKS.get() else {
        return;
    };
    let mut locks = locks.lock().unwrap_or_else(|e| e.into_inner());
    if locks
        .get(path)
        .is_some_and(|lock| Arc::strong_count(lock) == 1)
    {
        locks.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(path: &Path) -> bool {
        ENTRY_LOCKS
            .get()
            .is_some_and(|locks| locks.lock().unwrap().contains_key(path))
    }

    #[test]
    fn same_path_shares_lock() {
        let a = entry_lock(Path::new("/cache/abc/main"));
        let b = entry_lock(Path::new("/cache/abc/main"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_paths_get_different_locks() {
        let a = entry_lock(Path::new("/cache/abc/main"));
        let b = entry_lock(Path::new("/cache/abc/v1"));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn release_keeps_lock_while_held() {
        let path = Path::new("/cache/release/held");
        let held = entry_lock(path);

        release_entry_lock(path);
        assert!(tracked(path));
        assert!(Arc::ptr_eq(&held, &entry_lock(path)));

        drop(held);
        release_entry_lock(path);
        assert!(!tracked(path));
    }

    #[test]
    fn release_of_unknown_path_is_noop() {
        release_entry_lock(Path::new("/cache/release/never-locked"));
        assert!(!tracked(Path::new("/cache/release/never-locked")));
    }
}
