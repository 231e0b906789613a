//! Content-addressed cache for git module sources.
//!
//! Each (url, ref) pair owns one slot under the cache root:
//!
//! ```text
//! ~/.amplifier/module-cache/
//!   3fa1c09be2d4/
//!     v1.0.0/          <- fetched tree, optionally refined by a subdirectory
//! ```
//!
//! Entries are never expired or removed here.

pub mod entry;
pub mod lock;
pub mod store;

pub use entry::CacheEntry;
pub use store::ModuleCache;

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".amplifier")
        .join("module-cache")
}
