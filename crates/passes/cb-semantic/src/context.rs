//! State shared by every pass of a compilation session

use crate::error::{Diagnostic, Diagnostics, SemanticError, Severity};
use crate::options::{ReportLevel, SemanticOptions};
use cb_intern::Interner;
use cb_span::{FileId, Position};
use cb_symbols::SymbolTable;
use tracing::trace;

/// Symbol table, diagnostics and options for one session
///
/// The context is created once and handed by `&mut` to each unit build. The
/// symbol table persists across units; the diagnostics list is drained by the
/// caller after every unit.
#[derive(Debug)]
pub struct CompilationContext {
    /// Root symbol table
    pub symbols: SymbolTable,
    /// Diagnostics of the unit being built
    pub diagnostics: Diagnostics,
    /// Active options
    pub options: SemanticOptions,
    file: FileId,
}

impl CompilationContext {
    /// Create a context with a fresh interner
    #[must_use]
    pub fn new(options: SemanticOptions) -> Self {
        Self::with_interner(Interner::new(), options)
    }

    /// Create a context whose table interns through `interner`
    #[must_use]
    pub fn with_interner(interner: Interner, options: SemanticOptions) -> Self {
        Self {
            symbols: SymbolTable::new(interner),
            diagnostics: Diagnostics::new(),
            options,
            file: FileId::default(),
        }
    }

    /// Start a unit read from `file`
    pub fn begin_unit(&mut self, file: FileId) {
        self.file = file;
    }

    /// File of the unit being built
    #[must_use]
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Report an error at `position`
    pub fn report(&mut self, error: SemanticError, position: Position) {
        self.push(error, Severity::Error, position);
    }

    /// Report an optional check at the configured `level`
    pub fn report_at(&mut self, level: ReportLevel, error: SemanticError, position: Position) {
        if let Some(severity) = level.severity() {
            self.push(error, severity, position);
        }
    }

    fn push(&mut self, error: SemanticError, severity: Severity, position: Position) {
        trace!(%position, %severity, %error, "diagnostic");
        self.diagnostics
            .push(Diagnostic::new(error, severity, self.file, position));
    }

    /// Drain the diagnostics reported so far
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        self.diagnostics.take()
    }
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new(SemanticOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_at_allow_is_silent() {
        let mut ctx = CompilationContext::default();
        ctx.begin_unit(FileId::new(3));
        ctx.report_at(
            ReportLevel::Allow,
            SemanticError::UntypedDataItem {
                name: "X".to_owned(),
            },
            Position::new(1, 8),
        );
        assert!(ctx.diagnostics.is_empty());

        ctx.report(
            SemanticError::UnresolvedType {
                name: "T".to_owned(),
            },
            Position::new(2, 8),
        );
        let drained = ctx.take_diagnostics();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained.as_slice()[0].location.file, FileId::new(3));
        assert!(ctx.diagnostics.is_empty());
    }
}
