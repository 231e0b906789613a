//! Resolution layers.

use std::fmt;

use serde::Serialize;

use crate::source::ModuleSource;

/// One step of the resolution search, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionLayer {
    /// `AMPLIFIER_MODULE_<ID>` environment variable.
    Env,
    /// `<workspace>/<id>` checkout.
    Workspace,
    /// Settings `sources` entry.
    Settings,
    /// Module shipped by an installed collection.
    Collection,
    /// Source named by the caller's profile.
    Profile,
    /// Installed package.
    Package,
}

impl ResolutionLayer {
    /// All layers, highest priority first.
    pub const ALL: [ResolutionLayer; 6] = [
        Self::Env,
        Self::Workspace,
        Self::Settings,
        Self::Collection,
        Self::Profile,
        Self::Package,
    ];

    /// Lowercase identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Workspace => "workspace",
            Self::Settings => "settings",
            Self::Collection => "collection",
            Self::Profile => "profile",
            Self::Package => "package",
        }
    }

    /// Human-readable name used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Env => "Environment",
            Self::Workspace => "Workspace",
            Self::Settings => "Settings",
            Self::Collection => "Collection",
            Self::Profile => "Profile",
            Self::Package => "Package",
        }
    }
}

impl fmt::Display for ResolutionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of consulting one layer.
#[derive(Debug)]
pub(crate) enum LayerOutcome {
    Matched(ModuleSource),
    /// Layer had nothing; the reason feeds the not-found report.
    Skipped(String),
}
