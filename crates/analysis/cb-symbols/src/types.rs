//! The type model attached to symbols

use crate::domain::Scope;
use crate::picture::Picture;
use crate::symbol::{SymbolId, SymbolKind};
use crate::table::SymbolTable;
use cb_intern::Name;
use cb_span::Position;
use cb_syntax::DataUsage;
use std::fmt;

/// Storage format of a USAGE clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageFormat {
    /// No usage: an untyped or builtin placeholder
    None,
    /// `COMP`
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
    /// `BINARY`
    Binary,
    /// `FUNCTION-POINTER`
    FunctionPointer,
    /// `OBJECT REFERENCE`
    ObjectReference,
    /// `INDEX`
    Index,
    /// `POINTER`
    Pointer,
    /// `PACKED-DECIMAL`
    PackedDecimal,
    /// `PROCEDURE-POINTER`
    ProcedurePointer,
}

impl UsageFormat {
    /// Size of formats that do not depend on a picture
    #[must_use]
    pub fn fixed_size(self) -> Option<u32> {
        match self {
            Self::Comp1 | Self::Index | Self::Pointer | Self::FunctionPointer | Self::ObjectReference => {
                Some(4)
            }
            Self::Comp2 | Self::ProcedurePointer => Some(8),
            _ => None,
        }
    }

    /// Keyword as written in a USAGE clause
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Comp => "COMP",
            Self::Comp1 => "COMP-1",
            Self::Comp2 => "COMP-2",
            Self::Comp3 => "COMP-3",
            Self::Comp4 => "COMP-4",
            Self::Comp5 => "COMP-5",
            Self::Display => "DISPLAY",
            Self::Display1 => "DISPLAY-1",
            Self::National => "NATIONAL",
            Self::Binary => "BINARY",
            Self::FunctionPointer => "FUNCTION-POINTER",
            Self::ObjectReference => "OBJECT REFERENCE",
            Self::Index => "INDEX",
            Self::Pointer => "POINTER",
            Self::PackedDecimal => "PACKED-DECIMAL",
            Self::ProcedurePointer => "PROCEDURE-POINTER",
        }
    }
}

impl From<DataUsage> for UsageFormat {
    fn from(usage: DataUsage) -> Self {
        match usage {
            DataUsage::Binary => Self::Binary,
            DataUsage::Comp => Self::Comp,
            DataUsage::Comp1 => Self::Comp1,
            DataUsage::Comp2 => Self::Comp2,
            DataUsage::Comp3 => Self::Comp3,
            DataUsage::Comp4 => Self::Comp4,
            DataUsage::Comp5 => Self::Comp5,
            DataUsage::Display => Self::Display,
            DataUsage::Display1 => Self::Display1,
            DataUsage::National => Self::National,
            DataUsage::PackedDecimal => Self::PackedDecimal,
            DataUsage::Index => Self::Index,
            DataUsage::Pointer => Self::Pointer,
            DataUsage::FunctionPointer => Self::FunctionPointer,
            DataUsage::ProcedurePointer => Self::ProcedurePointer,
            DataUsage::ObjectReference => Self::ObjectReference,
        }
    }
}

impl fmt::Display for UsageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Elementary item described by a PICTURE clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureType {
    /// Validated picture
    pub picture: Picture,
    /// Storage format, `DISPLAY` when no USAGE clause is given
    pub usage: UsageFormat,
    /// `SIGN SEPARATE`
    pub sign_separate: bool,
}

/// Group item: an ordered scope of fields
#[derive(Debug, Clone)]
pub struct GroupType {
    /// Fields in declaration order
    pub fields: Scope<SymbolId>,
    /// USAGE or PICTURE carried by the group entry itself
    pub leading: Option<Box<Type>>,
    /// Variable owning the group
    pub owner: SymbolId,
}

/// Resolution state of an `OCCURS DEPENDING ON` object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependingOn {
    /// Object name
    pub name: Name,
    /// Position of the reference
    pub position: Position,
    /// Resolved object
    pub target: Option<SymbolId>,
}

/// Table item produced by `OCCURS`
#[derive(Debug, Clone)]
pub struct ArrayType {
    /// Type of one occurrence
    pub element: Box<Type>,
    /// Minimum occurrences
    pub min: u32,
    /// Maximum occurrences
    pub max: u32,
    /// `DEPENDING ON` object
    pub depending_on: Option<DependingOn>,
}

/// Reference to a typedef through a `TYPE` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefType {
    /// Referenced type name
    pub name: Name,
    /// Position of the reference
    pub position: Position,
    /// Typedef bound by the type linker
    pub target: Option<SymbolId>,
}

/// Calling signature of a program or procedure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSignature {
    /// `USING` parameters in order
    pub usings: Vec<SymbolId>,
    /// `RETURNING` item
    pub returning: Option<SymbolId>,
}

/// Byte range covered by a validated RENAMES entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenamesType {
    /// First renamed item
    pub from: SymbolId,
    /// Last renamed item of a `THRU` range
    pub thru: Option<SymbolId>,
    /// Offset of the range inside the enclosing record
    pub offset: u32,
    /// Length of the range in bytes, `None` when a renamed item has no size
    pub length: Option<u32>,
}

/// Type of a symbol
#[derive(Debug, Clone)]
pub enum Type {
    /// USAGE clause without PICTURE
    Usage(UsageFormat),
    /// PICTURE clause
    Picture(PictureType),
    /// Group item
    Group(GroupType),
    /// `OCCURS` table
    Array(ArrayType),
    /// `TYPE` reference
    Typedef(TypedefType),
    /// Condition name
    Level88,
    /// Program or procedure signature
    Program(ProgramSignature),
}

impl Type {
    /// Group type, looking through `OCCURS` wrappers
    #[must_use]
    pub fn as_group(&self) -> Option<&GroupType> {
        match self {
            Self::Group(group) => Some(group),
            Self::Array(array) => array.element.as_group(),
            _ => None,
        }
    }

    /// Mutable group type, looking through `OCCURS` wrappers
    pub fn as_group_mut(&mut self) -> Option<&mut GroupType> {
        match self {
            Self::Group(group) => Some(group),
            Self::Array(array) => array.element.as_group_mut(),
            _ => None,
        }
    }

    /// `TYPE` reference, looking through `OCCURS` wrappers
    #[must_use]
    pub fn typedef_reference(&self) -> Option<&TypedefType> {
        match self {
            Self::Typedef(reference) => Some(reference),
            Self::Array(array) => array.element.typedef_reference(),
            _ => None,
        }
    }

    /// Mutable `TYPE` reference, looking through `OCCURS` wrappers
    pub fn typedef_reference_mut(&mut self) -> Option<&mut TypedefType> {
        match self {
            Self::Typedef(reference) => Some(reference),
            Self::Array(array) => array.element.typedef_reference_mut(),
            _ => None,
        }
    }

    /// Whether the type is an `OCCURS` table
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Storage size in bytes, `None` when some part has no known size or the
    /// total does not fit in a `u32`
    #[must_use]
    pub fn size(&self, table: &SymbolTable) -> Option<u32> {
        match self {
            Self::Usage(usage) => usage.fixed_size(),
            Self::Picture(picture) => Some(picture.picture.size(picture.usage, picture.sign_separate)),
            Self::Group(group) => {
                let mut total: u32 = 0;
                let mut counted = false;
                for field in group.fields.ordered() {
                    let symbol = table.get(*field);
                    if !matches!(symbol.kind(), SymbolKind::Variable | SymbolKind::Typedef) {
                        continue;
                    }
                    if matches!(symbol.ty, Some(Self::Level88)) {
                        continue;
                    }
                    total = total.checked_add(symbol.ty.as_ref()?.size(table)?)?;
                    counted = true;
                }
                if counted {
                    Some(total)
                } else {
                    group.leading.as_ref()?.size(table)
                }
            }
            Self::Array(array) => array.max.checked_mul(array.element.size(table)?),
            Self::Typedef(reference) => table.get(reference.target?).ty.as_ref()?.size(table),
            Self::Level88 | Self::Program(_) => None,
        }
    }
}
