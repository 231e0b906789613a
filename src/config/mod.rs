//! Settings loading for module resolution.
//!
//! Settings files are discovered and merged in this order (later overrides
//! earlier):
//! 1. User settings (`~/.amplifier/settings.yaml`)
//! 2. Project settings (`.amplifier/settings.yaml`)
//! 3. Local overrides (`.amplifier/settings.local.yaml`)
//!
//! # Example
//!
//! ```
//! use amplifier_module_resolution::config::load_settings_with_home;
//! use amplifier_module_resolution::resolver::SettingsProvider;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".amplifier");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(
//!     dir.join("settings.yaml"),
//!     "sources:\n  tool-x: git+https://github.com/org/tool-x@v1\n",
//! )
//! .unwrap();
//!
//! let settings = load_settings_with_home(temp.path(), None).unwrap();
//! assert!(settings.module_sources().contains_key("tool-x"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    load_settings, load_settings_file, load_settings_value, load_settings_with_home,
    merge_settings, merge_values, parse_settings, SettingsPaths,
};
pub use schema::{FetcherConfig, FetcherKind, Settings};
