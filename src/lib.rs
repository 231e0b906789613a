//! Amplifier module resolution.
//!
//! Maps a module id such as `tool-bash` to a directory holding the module's
//! source files. Six layers are consulted in order and the first match wins:
//! environment overrides, a workspace of checkouts, settings, installed
//! collections, the active profile, and finally installed packages.
//!
//! Git sources are materialized into a content-addressed cache shared by all
//! resolvers on the machine.
//!
//! # Modules
//!
//! - [`resolver`] - Layered resolution and not-found diagnostics
//! - [`source`] - Local, git and package sources plus descriptor parsing
//! - [`cache`] - Git module cache layout and entry locking
//! - [`fetch`] - External installers that populate cache entries
//! - [`package`] - Installed package metadata
//! - [`collection`] - Modules shipped by installed collections
//! - [`config`] - Settings discovery, merging and parsing
//! - [`cli`] - Command-line interface
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use amplifier_module_resolution::source::parse_uri;
//!
//! let source = parse_uri("git+https://github.com/org/tool-bash@v1.2").unwrap();
//! let git = source.as_git().unwrap();
//! assert_eq!(git.url, "https://github.com/org/tool-bash");
//! assert_eq!(git.git_ref, "v1.2");
//! ```

pub mod cache;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod fetch;
pub mod module_id;
pub mod package;
pub mod resolver;
pub mod source;
pub mod ui;

pub use error::{ErrorKind, ResolutionError, Result};
pub use module_id::ModuleId;
pub use resolver::{Resolution, ResolutionLayer, StandardResolver};
pub use source::{Descriptor, ModuleSource, SourceContext};
