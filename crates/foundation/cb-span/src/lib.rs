//! Source files and line/column positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a file id
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A 1-based line/column position of a code element in its source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl Position {
    /// Create a position
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Position used for elements that do not come from source text (builtins)
    #[must_use]
    pub fn synthetic() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Whether this position was produced by [`Position::synthetic`]
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A position with associated file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// File the position belongs to
    pub file: FileId,
    /// Position inside the file
    pub position: Position,
}

impl Location {
    /// Create a location
    #[must_use]
    pub fn new(file: FileId, position: Position) -> Self {
        Self { file, position }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.file.0, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 8) < Position::new(2, 1));
        assert!(Position::new(3, 8) < Position::new(3, 12));
    }

    #[test]
    fn test_location_display() {
        let location = Location::new(FileId::new(2), Position::new(14, 8));
        assert_eq!(location.to_string(), "#2:14:8");
        assert!(Position::synthetic().is_synthetic());
    }
}
