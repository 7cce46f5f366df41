//! Program boundaries and data division sections

use cb_span::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `PROGRAM-ID` paragraph of the IDENTIFICATION DIVISION
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramIdentification {
    /// Program name
    pub name: String,
    /// Position of the program name
    pub position: Position,
    /// `IS COMMON`
    #[serde(default)]
    pub is_common: bool,
    /// `IS INITIAL`
    #[serde(default)]
    pub is_initial: bool,
}

impl ProgramIdentification {
    /// Identification of a plain program
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            is_common: false,
            is_initial: false,
        }
    }
}

/// `END PROGRAM` marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEnd {
    /// Name repeated after `END PROGRAM`
    pub name: Option<String>,
    /// Position of the marker
    pub position: Position,
}

/// Header of a data division section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionHeader {
    /// Position of the section keyword
    pub position: Position,
}

/// The data division regions a variable can be declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageSection {
    /// `FILE SECTION`
    File,
    /// `GLOBAL-STORAGE SECTION`
    GlobalStorage,
    /// `WORKING-STORAGE SECTION`
    WorkingStorage,
    /// `LOCAL-STORAGE SECTION`
    LocalStorage,
    /// `LINKAGE SECTION`
    Linkage,
}

impl StorageSection {
    /// Every section in source order
    pub const ALL: [Self; 5] = [
        Self::File,
        Self::GlobalStorage,
        Self::WorkingStorage,
        Self::LocalStorage,
        Self::Linkage,
    ];

    /// Section keyword as written in source
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::File => "FILE SECTION",
            Self::GlobalStorage => "GLOBAL-STORAGE SECTION",
            Self::WorkingStorage => "WORKING-STORAGE SECTION",
            Self::LocalStorage => "LOCAL-STORAGE SECTION",
            Self::Linkage => "LINKAGE SECTION",
        }
    }
}

impl fmt::Display for StorageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
