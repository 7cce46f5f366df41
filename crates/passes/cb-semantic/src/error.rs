//! Semantic diagnostics

use cb_span::{FileId, Location, Position};
use cb_symbols::PictureError;
use miette::Diagnostic as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Problems found while building symbols and linking types
///
/// Every variant is recoverable: the offending symbol is left partially built
/// and the build goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq, miette::Diagnostic)]
pub enum SemanticError {
    /// Two nested programs share a name under one enclosing program
    #[error("program '{name}' is already declared at this nesting level")]
    #[diagnostic(code(semantic::duplicate_program))]
    DuplicateProgram {
        /// Program name
        name: String,
    },

    /// `TYPE` clause naming no visible typedef
    #[error("TYPE '{name}' is not referenced")]
    #[diagnostic(code(semantic::unresolved_type), help("declare the TYPEDEF or make it visible"))]
    UnresolvedType {
        /// Type name
        name: String,
    },

    /// `TYPE` clause naming several visible typedefs
    #[error("ambiguous reference to TYPE '{name}' ({candidates} candidates)")]
    #[diagnostic(code(semantic::ambiguous_type))]
    AmbiguousType {
        /// Type name
        name: String,
        /// Number of matching typedefs
        candidates: usize,
    },

    /// Typedefs containing each other
    #[error("type circular reference detected: {}", cycle.join(" -> "))]
    #[diagnostic(code(semantic::circular_type_reference))]
    CircularTypeReference {
        /// Typedef names along the cycle, first name repeated at the end
        cycle: Vec<String>,
    },

    /// `REDEFINES` naming nothing in the enclosing scope
    #[error("REDEFINES target '{target}' of '{name}' is not declared")]
    #[diagnostic(code(semantic::unresolved_redefines_target))]
    UnresolvedRedefinesTarget {
        /// Redefining item
        name: String,
        /// Redefined name
        target: String,
    },

    /// `REDEFINES` naming an item that is not the preceding sibling
    #[error("'{target}' is not the item immediately preceding '{name}' at the same level")]
    #[diagnostic(code(semantic::redefines_not_immediately_preceding))]
    RedefinesNotImmediatelyPreceding {
        /// Redefining item
        name: String,
        /// Redefined name
        target: String,
    },

    /// `REDEFINES` naming several items, none of them the preceding sibling
    #[error("REDEFINES target '{target}' of '{name}' is ambiguous")]
    #[diagnostic(code(semantic::ambiguous_redefines_target))]
    AmbiguousRedefinesTarget {
        /// Redefining item
        name: String,
        /// Redefined name
        target: String,
    },

    /// `REDEFINES` with no enclosing scope to search
    #[error("REDEFINES is not allowed for '{name}' here")]
    #[diagnostic(code(semantic::redefines_not_allowed_here))]
    RedefinesNotAllowedHere {
        /// Redefining item
        name: String,
    },

    /// RENAMES object not found in the enclosing record
    #[error("'{target}' renamed by '{name}' is not declared in the enclosing record")]
    #[diagnostic(code(semantic::unknown_renamed_symbol))]
    UnknownRenamedSymbol {
        /// Level-66 item
        name: String,
        /// Renamed name
        target: String,
    },

    /// RENAMES object matching several items
    #[error("'{target}' renamed by '{name}' is ambiguous")]
    #[diagnostic(code(semantic::ambiguous_renamed_symbol))]
    AmbiguousRenamedSymbol {
        /// Level-66 item
        name: String,
        /// Renamed name
        target: String,
    },

    /// RENAMES object at level 01, 66, 77 or 88
    #[error("'{target}' is a level {level:02} item and cannot be renamed by '{name}'")]
    #[diagnostic(code(semantic::invalid_renames_level))]
    InvalidRenamesLevel {
        /// Level-66 item
        name: String,
        /// Renamed name
        target: String,
        /// Level of the renamed item
        level: u8,
    },

    /// `THRU` object declared before the first object
    #[error("'{thru}' must not precede '{from}' in RENAMES '{name}'")]
    #[diagnostic(code(semantic::renames_order_violation))]
    RenamesOrderViolation {
        /// Level-66 item
        name: String,
        /// First object
        from: String,
        /// `THRU` object
        thru: String,
    },

    /// Renamed range containing or inside an `OCCURS` item
    #[error("RENAMES '{name}' spans OCCURS item '{item}'")]
    #[diagnostic(code(semantic::renames_spans_occurs))]
    RenamesSpansOccurs {
        /// Level-66 item
        name: String,
        /// Offending table item
        item: String,
    },

    /// Level-66 entry that does not follow a group record
    #[error("RENAMES '{name}' must follow a level 01 group")]
    #[diagnostic(code(semantic::renames_not_a_group))]
    RenamesNotAGroup {
        /// Level-66 item
        name: String,
    },

    /// RENAMES object declared after the level-66 entry
    #[error("'{target}' is declared after RENAMES '{name}'")]
    #[diagnostic(
        code(semantic::renames_forward_reference),
        help("move the level 66 entry after the last item it renames")
    )]
    RenamesForwardReference {
        /// Level-66 item
        name: String,
        /// Renamed name
        target: String,
    },

    /// Malformed PICTURE string
    #[error("invalid PICTURE '{picture}' for '{name}'")]
    #[diagnostic(code(semantic::invalid_picture))]
    InvalidPicture {
        /// Data item
        name: String,
        /// Picture as written
        picture: String,
        /// What is wrong with it
        #[source]
        reason: PictureError,
    },

    /// `USING`/`RETURNING` naming no LINKAGE item
    #[error("'{name}' is not declared in the LINKAGE SECTION")]
    #[diagnostic(code(semantic::unresolved_using_parameter))]
    UnresolvedUsingParameter {
        /// Parameter name
        name: String,
    },

    /// `DEPENDING ON` object that cannot be resolved
    #[error("DEPENDING ON object '{object}' of '{name}' cannot be resolved")]
    #[diagnostic(code(semantic::unresolved_depending_on))]
    UnresolvedDependingOn {
        /// Table item
        name: String,
        /// Object name
        object: String,
    },

    /// Item with neither USAGE, PICTURE, TYPE nor subordinate items
    #[error("'{name}' has no type")]
    #[diagnostic(code(semantic::untyped_data_item))]
    UntypedDataItem {
        /// Data item
        name: String,
    },
}

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning that should be addressed
    Warning,
    /// Error that must be fixed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(text)
    }
}

/// A located semantic error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub error: SemanticError,
    /// How serious it is
    pub severity: Severity,
    /// Where it happened
    pub location: Location,
}

impl Diagnostic {
    /// Create a diagnostic in `file` at `position`
    #[must_use]
    pub fn new(error: SemanticError, severity: Severity, file: FileId, position: Position) -> Self {
        Self {
            error,
            severity,
            location: Location::new(file, position),
        }
    }

    /// Stable message code, e.g. `semantic::duplicate_program`
    #[must_use]
    pub fn code(&self) -> String {
        self.error
            .code()
            .map(|code| code.to_string())
            .unwrap_or_default()
    }

    /// Line and column of the diagnostic
    #[must_use]
    pub fn position(&self) -> Position {
        self.location.position
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.location,
            self.severity,
            self.code(),
            self.error
        )
    }
}

/// Ordered list of diagnostics owned by the caller of a build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Diagnostics in report order
    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Iterate in report order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Whether any diagnostic has [`Severity::Error`]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// Number of diagnostics carrying `code`
    #[must_use]
    pub fn count_code(&self, code: &str) -> usize {
        self.items
            .iter()
            .filter(|diagnostic| diagnostic.code() == code)
            .count()
    }

    /// Number of diagnostics
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move every diagnostic out, leaving the list empty
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_display() {
        let diagnostic = Diagnostic::new(
            SemanticError::DuplicateProgram {
                name: "NESTED".to_owned(),
            },
            Severity::Error,
            FileId::new(0),
            Position::new(12, 19),
        );
        assert_eq!(diagnostic.code(), "semantic::duplicate_program");
        assert_eq!(
            diagnostic.to_string(),
            "#0:12:19: error[semantic::duplicate_program]: program 'NESTED' is already declared at this nesting level"
        );
    }

    #[test]
    fn test_cycle_message() {
        let error = SemanticError::CircularTypeReference {
            cycle: vec!["TYPE-A".to_owned(), "TYPE-B".to_owned(), "TYPE-A".to_owned()],
        };
        assert_eq!(
            error.to_string(),
            "type circular reference detected: TYPE-A -> TYPE-B -> TYPE-A"
        );
    }

    #[test]
    fn test_has_errors_ignores_warnings() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::new(
            SemanticError::UnresolvedUsingParameter {
                name: "PARM".to_owned(),
            },
            Severity::Warning,
            FileId::new(0),
            Position::new(20, 30),
        ));
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.count_code("semantic::unresolved_using_parameter"), 1);
    }
}
