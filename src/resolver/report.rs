//! Diagnostic for a module no layer could resolve.

use std::fmt;

use serde::Serialize;

use super::layer::ResolutionLayer;
use crate::module_id::ModuleId;

/// Why one layer did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerAttempt {
    pub layer: ResolutionLayer,
    pub reason: String,
}

/// Every layer tried for a module, with remediation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundReport {
    pub module_id: ModuleId,
    pub attempts: Vec<LayerAttempt>,
}

impl NotFoundReport {
    /// Remediation hints, one per line of the diagnostic.
    pub fn suggestions(&self) -> Vec<String> {
        vec![
            "Add source to profile: source: git+https://...".to_string(),
            "Add source override to settings".to_string(),
            format!("Install package: uv pip install {}", self.module_id.package_name()),
        ]
    }
}

impl fmt::Display for NotFoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Module '{}' not found", self.module_id)?;
        writeln!(f)?;
        writeln!(f, "Resolution attempted:")?;
        for (i, attempt) in self.attempts.iter().enumerate() {
            writeln!(f, "  {}. {}: {}", i + 1, attempt.layer.label(), attempt.reason)?;
        }
        writeln!(f)?;
        write!(f, "Suggestions:")?;
        for suggestion in self.suggestions() {
            write!(f, "\n  - {}", suggestion)?;
        }
        Ok(())
    }
}
