//! Knobs controlling which optional checks report and how loudly

use crate::error::Severity;
use serde::{Deserialize, Serialize};

/// Reporting level of an optional check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    /// Report with [`Severity::Error`]
    #[default]
    Error,
    /// Report with [`Severity::Warning`]
    Warning,
    /// Do not report
    Allow,
}

impl ReportLevel {
    /// Severity to report with, `None` when the check is silenced
    #[must_use]
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Error => Some(Severity::Error),
            Self::Warning => Some(Severity::Warning),
            Self::Allow => None,
        }
    }
}

/// Options carried by a [`CompilationContext`](crate::CompilationContext)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SemanticOptions {
    /// RENAMES naming an item declared after the level-66 entry
    pub renames_forward_references: ReportLevel,
    /// Data items carrying no USAGE, PICTURE, TYPE or subordinate items
    pub untyped_placeholders: ReportLevel,
    /// `USING`/`RETURNING` names missing from LINKAGE
    pub unresolved_using: ReportLevel,
    /// `DEPENDING ON` objects that cannot be found
    pub unresolved_depending_on: ReportLevel,
}

impl Default for SemanticOptions {
    fn default() -> Self {
        Self {
            renames_forward_references: ReportLevel::Error,
            untyped_placeholders: ReportLevel::Allow,
            unresolved_using: ReportLevel::Warning,
            unresolved_depending_on: ReportLevel::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SemanticOptions::default();
        assert_eq!(options.renames_forward_references.severity(), Some(Severity::Error));
        assert_eq!(options.untyped_placeholders.severity(), None);
        assert_eq!(options.unresolved_using.severity(), Some(Severity::Warning));
    }
}
