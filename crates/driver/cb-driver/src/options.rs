//! Compiler options read from TOML

use anyhow::{Context, Result};
use cb_semantic::SemanticOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options of a compilation session
///
/// ```toml
/// [semantic]
/// renames-forward-references = "warning"
/// untyped-placeholders = "allow"
///
/// [trace]
/// log-unit-summary = false
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerOptions {
    /// Reporting levels of the optional semantic checks
    pub semantic: SemanticOptions,
    /// Logging of the session
    pub trace: TraceOptions,
}

/// Logging knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TraceOptions {
    /// Log one summary line per compiled unit
    pub log_unit_summary: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            log_unit_summary: true,
        }
    }
}

impl CompilerOptions {
    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))
    }

    /// Parse options from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse compiler options")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_semantic::ReportLevel;
    use std::io::Write;

    #[test]
    fn test_missing_tables_use_defaults() {
        let options = CompilerOptions::from_toml_str("").unwrap();
        assert_eq!(options, CompilerOptions::default());
        assert!(options.trace.log_unit_summary);
        assert_eq!(options.semantic.renames_forward_references, ReportLevel::Error);
    }

    #[test]
    fn test_partial_semantic_table() {
        let options = CompilerOptions::from_toml_str(
            r#"
            [semantic]
            renames-forward-references = "warning"
            unresolved-depending-on = "error"

            [trace]
            log-unit-summary = false
            "#,
        )
        .unwrap();
        assert_eq!(options.semantic.renames_forward_references, ReportLevel::Warning);
        assert_eq!(options.semantic.unresolved_depending_on, ReportLevel::Error);
        assert_eq!(options.semantic.untyped_placeholders, ReportLevel::Allow);
        assert!(!options.trace.log_unit_summary);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let error = CompilerOptions::from_toml_str("[semantic]\nuntyped-placeholders = \"loud\"\n")
            .unwrap_err();
        assert!(format!("{error:#}").contains("Failed to parse compiler options"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[semantic]\nuntyped-placeholders = \"warning\"").unwrap();

        let options = CompilerOptions::from_file(file.path()).unwrap();
        assert_eq!(options.semantic.untyped_placeholders, ReportLevel::Warning);

        let missing = file.path().with_extension("missing");
        let error = CompilerOptions::from_file(&missing).unwrap_err();
        assert!(error.to_string().contains("Failed to read options file"));
    }
}
