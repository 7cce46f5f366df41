//! Data description entries and the clauses they carry

use crate::procedure::AccessModifier;
use cb_span::Position;
use serde::{Deserialize, Serialize};

/// A data name as written in a clause that refers to another item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolReference {
    /// Referenced name
    pub name: String,
    /// Position of the reference
    pub position: Position,
}

impl SymbolReference {
    /// Create a reference
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// `USAGE` clause values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataUsage {
    /// `BINARY`
    Binary,
    /// `COMP` / `COMPUTATIONAL`
    Comp,
    /// `COMP-1`
    Comp1,
    /// `COMP-2`
    Comp2,
    /// `COMP-3`
    Comp3,
    /// `COMP-4`
    Comp4,
    /// `COMP-5`
    Comp5,
    /// `DISPLAY`
    Display,
    /// `DISPLAY-1`
    Display1,
    /// `NATIONAL`
    National,
    /// `PACKED-DECIMAL`
    PackedDecimal,
    /// `INDEX`
    Index,
    /// `POINTER`
    Pointer,
    /// `FUNCTION-POINTER`
    FunctionPointer,
    /// `PROCEDURE-POINTER`
    ProcedurePointer,
    /// `OBJECT REFERENCE`
    ObjectReference,
}

/// `OCCURS` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurs {
    /// Minimum number of occurrences
    pub min: u32,
    /// Maximum number of occurrences
    pub max: u32,
    /// `DEPENDING ON` object
    pub depending_on: Option<SymbolReference>,
    /// `INDEXED BY` names
    #[serde(default)]
    pub indexes: Vec<IndexName>,
}

/// A name declared by `INDEXED BY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexName {
    /// Index name
    pub name: String,
    /// Position of the name
    pub position: Position,
}

/// Figurative constants usable in `VALUE` clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FigurativeConstant {
    /// `ZERO`
    Zero,
    /// `SPACE`
    Space,
    /// `HIGH-VALUE`
    HighValue,
    /// `LOW-VALUE`
    LowValue,
    /// `QUOTE`
    Quote,
    /// `NULL`
    Null,
}

/// A literal in a `VALUE` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Alphanumeric literal, without its delimiters
    Alphanumeric(String),
    /// Numeric literal as written
    Numeric(String),
    /// Figurative constant
    Figurative(FigurativeConstant),
}

/// One value or value range of a level-88 condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionValue {
    /// Single value or lower bound
    pub value: Value,
    /// Upper bound of a `THRU` range
    pub thru: Option<Value>,
}

/// Restriction level of a `TYPEDEF`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RestrictionLevel {
    /// Plain `TYPEDEF`
    #[default]
    Weak,
    /// `TYPEDEF STRICT`
    Strict,
    /// `TYPEDEF STRONG`
    Strong,
}

/// `TYPEDEF` clause of a type description entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypedefClause {
    /// Restriction level
    pub restriction: RestrictionLevel,
    /// `PRIVATE` / `PUBLIC`; `None` keeps the type local to its program
    pub visibility: Option<AccessModifier>,
}

/// A level 1-49 or 77 data description entry
///
/// Also used for type description entries (when [`Self::typedef`] is set) and
/// for function parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDescriptionEntry {
    /// Level number
    pub level: u8,
    /// Data name, `None` for `FILLER`
    pub name: Option<String>,
    /// Position of the level number
    pub position: Position,
    /// `PICTURE` character string
    pub picture: Option<String>,
    /// `USAGE` clause
    pub usage: Option<DataUsage>,
    /// `SIGN ... SEPARATE CHARACTER`
    pub sign_separate: bool,
    /// `OCCURS` clause
    pub occurs: Option<Occurs>,
    /// `GLOBAL`
    pub is_global: bool,
    /// `EXTERNAL`
    pub is_external: bool,
    /// `BLANK WHEN ZERO`
    pub blank_when_zero: bool,
    /// `JUSTIFIED RIGHT`
    pub justified: bool,
    /// `SYNCHRONIZED`
    pub synchronized: bool,
    /// `GROUP-USAGE NATIONAL`
    pub group_usage_national: bool,
    /// `VALUE` clause
    pub value: Option<Value>,
    /// `TYPE` clause naming a typedef
    pub user_type: Option<SymbolReference>,
    /// `TYPEDEF` clause
    pub typedef: Option<TypedefClause>,
}

impl DataDescriptionEntry {
    /// A named entry with no clauses
    #[must_use]
    pub fn new(level: u8, name: impl Into<String>, position: Position) -> Self {
        Self {
            level,
            name: Some(name.into()),
            position,
            ..Self::default()
        }
    }

    /// A `FILLER` entry
    #[must_use]
    pub fn filler(level: u8, position: Position) -> Self {
        Self {
            level,
            position,
            ..Self::default()
        }
    }

    /// Set the `PICTURE` clause
    #[must_use]
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Set the `USAGE` clause
    #[must_use]
    pub fn with_usage(mut self, usage: DataUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set a fixed `OCCURS min TO max` clause
    #[must_use]
    pub fn with_occurs(mut self, min: u32, max: u32) -> Self {
        self.occurs = Some(Occurs {
            min,
            max,
            depending_on: None,
            indexes: Vec::new(),
        });
        self
    }

    /// Add `DEPENDING ON` to the `OCCURS` clause, creating `OCCURS 1 TO max` if absent
    #[must_use]
    pub fn depending_on(mut self, max: u32, object: SymbolReference) -> Self {
        let occurs = self.occurs.get_or_insert(Occurs {
            min: 1,
            max,
            depending_on: None,
            indexes: Vec::new(),
        });
        occurs.depending_on = Some(object);
        self
    }

    /// Add an `INDEXED BY` name to the `OCCURS` clause
    #[must_use]
    pub fn indexed_by(mut self, name: impl Into<String>, position: Position) -> Self {
        let occurs = self.occurs.get_or_insert(Occurs {
            min: 1,
            max: 1,
            depending_on: None,
            indexes: Vec::new(),
        });
        occurs.indexes.push(IndexName {
            name: name.into(),
            position,
        });
        self
    }

    /// Mark the entry `GLOBAL`
    #[must_use]
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    /// Mark the entry `EXTERNAL`
    #[must_use]
    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }

    /// Set the `VALUE` clause
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the `TYPE` clause
    #[must_use]
    pub fn of_type(mut self, reference: SymbolReference) -> Self {
        self.user_type = Some(reference);
        self
    }

    /// Turn the entry into a `TYPEDEF`
    #[must_use]
    pub fn as_typedef(mut self, clause: TypedefClause) -> Self {
        self.typedef = Some(clause);
        self
    }

    /// Whether the entry is a type description entry
    #[must_use]
    pub fn is_typedef(&self) -> bool {
        self.typedef.is_some()
    }

    /// Upper occurs bound, 1 without `OCCURS`
    #[must_use]
    pub fn max_occurs(&self) -> u32 {
        self.occurs.as_ref().map_or(1, |occurs| occurs.max)
    }

    /// Name, or `FILLER` for anonymous entries
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("FILLER")
    }
}

/// A data description entry carrying a `REDEFINES` clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRedefinesEntry {
    /// The entry's own clauses
    pub entry: DataDescriptionEntry,
    /// Redefined data name
    pub redefines: SymbolReference,
}

/// A level-66 `RENAMES` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRenamesEntry {
    /// Name introduced by the entry
    pub name: String,
    /// Position of the level number
    pub position: Position,
    /// First renamed item
    pub from: SymbolReference,
    /// Last renamed item of a `THRU` range
    pub thru: Option<SymbolReference>,
}

/// A level-88 condition-name entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConditionEntry {
    /// Condition name
    pub name: String,
    /// Position of the level number
    pub position: Position,
    /// Values and value ranges
    pub values: Vec<ConditionValue>,
}

/// An `FD` entry of the FILE SECTION
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptionEntry {
    /// File name
    pub name: String,
    /// Position of the `FD` keyword
    pub position: Position,
    /// `IS GLOBAL`
    #[serde(default)]
    pub is_global: bool,
    /// `IS EXTERNAL`
    #[serde(default)]
    pub is_external: bool,
}
