//! Error types for module resolution.
//!
//! This module defines [`ResolutionError`], the error type returned by every
//! resolver and source operation, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Each source validates locally and fails fast with a distinct variant
//! - [`ErrorKind`] groups variants into the coarse categories callers branch on
//! - Collaborator failures (fetchers, filesystem scans) arrive as `anyhow::Error`
//!   and are wrapped with the url/ref or path they concern
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

use crate::resolver::NotFoundReport;

/// Core error type for module resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Module identifier is empty or would escape the workspace.
    #[error("Invalid module id '{module_id}': {message}")]
    InvalidModuleId { module_id: String, message: String },

    /// A descriptor (string or record) could not be turned into a source.
    #[error("Invalid source for module '{module_id}': {message}")]
    InvalidDescriptor { module_id: String, message: String },

    /// A git URI did not match `git+<url>[@<ref>][#subdirectory=<path>]`.
    #[error("Invalid git URI '{uri}': {message}")]
    InvalidGitUri { uri: String, message: String },

    /// Local module path does not exist.
    #[error("Module path not found: {}", .path.display())]
    PathNotFound { path: PathBuf },

    /// Local module path exists but is a file.
    #[error("Module path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    /// Directory exists but holds no recognized source files.
    #[error("Path does not contain a valid module: {}", .path.display())]
    NotAModule { path: PathBuf },

    /// Installed package lookup failed.
    #[error("Package '{name}' not installed. Install with: uv pip install {name}")]
    PackageNotInstalled { name: String },

    /// The fetch collaborator failed.
    #[error("Failed to download {url}@{git_ref}: {reason}")]
    Fetch {
        url: String,
        git_ref: String,
        reason: String,
    },

    /// Fetch reported success but the requested subdirectory is absent.
    #[error("Subdirectory not found after download: {subdirectory} (from {url}@{git_ref}, expected at {})", .path.display())]
    SubdirectoryNotFound {
        url: String,
        git_ref: String,
        subdirectory: String,
        path: PathBuf,
    },

    /// A direct install finished without creating its target.
    #[error("Target directory not created after install of {url}@{git_ref}: {}", .path.display())]
    InstallTargetMissing {
        url: String,
        git_ref: String,
        path: PathBuf,
    },

    /// Every resolution layer was tried and none produced a source.
    #[error("{report}")]
    ModuleNotFound {
        module_id: String,
        report: NotFoundReport,
    },

    /// Failed to read a settings file.
    #[error("Failed to parse settings at {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad module id, descriptor, URI or settings file.
    Parse,
    /// Path, package, subdirectory or module missing.
    NotFound,
    /// Directory lacks recognized source files.
    NotAModule,
    /// Path is not a directory.
    NotADirectory,
    /// Underlying install command failed.
    Fetch,
    /// Filesystem failure.
    Io,
    /// Anything else.
    Other,
}

impl ResolutionError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidModuleId { .. }
            | Self::InvalidDescriptor { .. }
            | Self::InvalidGitUri { .. }
            | Self::ConfigParse { .. } => ErrorKind::Parse,
            Self::PathNotFound { .. }
            | Self::PackageNotInstalled { .. }
            | Self::SubdirectoryNotFound { .. }
            | Self::InstallTargetMissing { .. }
            | Self::ModuleNotFound { .. } => ErrorKind::NotFound,
            Self::NotAModule { .. } => ErrorKind::NotAModule,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Result type alias for module resolution.
pub type Result<T> = std::result::Result<T, ResolutionError>;
