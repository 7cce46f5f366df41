//! Symbols and their per-kind payloads

use crate::domain::{Domain, Scope};
use crate::flags::SymbolFlags;
use crate::types::{RenamesType, Type};
use cb_arena::Idx;
use cb_intern::Name;
use cb_span::Position;
use cb_syntax::{ConditionValue, RestrictionLevel, Value};
use rustc_hash::FxHashMap;
use std::fmt;

/// Handle of a symbol in the [`SymbolTable`](crate::SymbolTable) arena
pub type SymbolId = Idx<Symbol>;

/// Kind of a symbol, derived from its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Namespace
    Namespace,
    /// Program
    Program,
    /// Declared function or procedure
    Function,
    /// Data item
    Variable,
    /// Type description entry
    Typedef,
    /// Data item with a `REDEFINES` clause
    Redefines,
    /// Level-66 entry
    Renames,
    /// `INDEXED BY` name
    Index,
    /// Paragraph
    Paragraph,
    /// Procedure division section
    Section,
    /// Root namespace
    Root,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Namespace => "namespace",
            Self::Program => "program",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Typedef => "typedef",
            Self::Redefines => "redefines",
            Self::Renames => "renames",
            Self::Index => "index",
            Self::Paragraph => "paragraph",
            Self::Section => "section",
            Self::Root => "root",
        };
        f.write_str(text)
    }
}

/// A named entity known to the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Name as interned
    pub name: Name,
    /// Attribute bits
    pub flags: SymbolFlags,
    /// Enclosing scope symbol; never owning
    pub owner: Option<SymbolId>,
    /// Type, absent for untyped or unresolved symbols
    pub ty: Option<Type>,
    /// Declaration position
    pub position: Position,
    /// Per-kind payload
    pub data: SymbolData,
}

impl Symbol {
    /// Create a symbol with no flags, owner or type
    #[must_use]
    pub fn new(name: Name, position: Position, data: SymbolData) -> Self {
        Self {
            name,
            flags: SymbolFlags::empty(),
            owner: None,
            ty: None,
            position,
            data,
        }
    }

    /// Kind derived from the payload
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match &self.data {
            SymbolData::Root(_) => SymbolKind::Root,
            SymbolData::Namespace(_) => SymbolKind::Namespace,
            SymbolData::Program(_) => SymbolKind::Program,
            SymbolData::Function(_) => SymbolKind::Function,
            SymbolData::Variable(variable) => match variable.kind {
                VariableKind::Plain => SymbolKind::Variable,
                VariableKind::Typedef(_) => SymbolKind::Typedef,
                VariableKind::Redefines { .. } => SymbolKind::Redefines,
                VariableKind::Renames(_) => SymbolKind::Renames,
                VariableKind::Index { .. } => SymbolKind::Index,
            },
            SymbolData::Paragraph(_) => SymbolKind::Paragraph,
            SymbolData::Section => SymbolKind::Section,
        }
    }

    /// Variable payload of every data item kind
    #[must_use]
    pub fn variable(&self) -> Option<&VariableData> {
        match &self.data {
            SymbolData::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Mutable variable payload
    pub fn variable_mut(&mut self) -> Option<&mut VariableData> {
        match &mut self.data {
            SymbolData::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Level number of a data item
    #[must_use]
    pub fn level(&self) -> Option<u8> {
        self.variable().map(|variable| variable.level)
    }

    /// Scope payload of programs and functions
    #[must_use]
    pub fn scope_data(&self) -> Option<&ScopeData> {
        match &self.data {
            SymbolData::Program(data) | SymbolData::Function(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable scope payload of programs and functions
    pub fn scope_data_mut(&mut self) -> Option<&mut ScopeData> {
        match &mut self.data {
            SymbolData::Program(data) | SymbolData::Function(data) => Some(data),
            _ => None,
        }
    }

    /// Whether the symbol is a namespace, program or function
    #[must_use]
    pub fn is_abstract_scope(&self) -> bool {
        matches!(
            self.kind(),
            SymbolKind::Root | SymbolKind::Namespace | SymbolKind::Program | SymbolKind::Function
        )
    }

    /// Whether the symbol was detached by a program removal
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.flags.contains(SymbolFlags::REMOVED)
    }
}

/// Payload of a symbol, one variant per family of kinds
#[derive(Debug, Clone)]
pub enum SymbolData {
    /// Root namespace
    Root(NamespaceData),
    /// Namespace
    Namespace(NamespaceData),
    /// Program
    Program(Box<ScopeData>),
    /// Function or procedure
    Function(Box<ScopeData>),
    /// Any data item
    Variable(VariableData),
    /// Paragraph
    Paragraph(ParagraphData),
    /// Procedure division section
    Section,
}

/// Scopes owned by a namespace
#[derive(Debug, Clone, Default)]
pub struct NamespaceData {
    /// Typedefs
    pub types: Scope<SymbolId>,
    /// Programs
    pub programs: Scope<SymbolId>,
    /// Nested namespaces
    pub namespaces: Scope<SymbolId>,
}

/// Scopes owned by a program or function
#[derive(Debug, Clone, Default)]
pub struct ScopeData {
    /// Typedefs
    pub types: Scope<SymbolId>,
    /// FILE SECTION records
    pub file_data: Scope<SymbolId>,
    /// GLOBAL-STORAGE items
    pub global_storage: Scope<SymbolId>,
    /// WORKING-STORAGE items
    pub working_storage: Scope<SymbolId>,
    /// LOCAL-STORAGE items
    pub local_storage: Scope<SymbolId>,
    /// LINKAGE items and procedure parameters
    pub linkage: Scope<SymbolId>,
    /// Procedure division sections
    pub sections: Scope<SymbolId>,
    /// Paragraphs
    pub paragraphs: Scope<SymbolId>,
    /// Nested programs
    pub programs: Scope<SymbolId>,
    /// Declared functions and procedures
    pub functions: Scope<SymbolId>,
    /// Nested programs rejected as duplicates; their contents stay reachable
    pub duplicates: Vec<SymbolId>,
    /// Every variable of the scope regardless of section
    pub domain: Domain<SymbolId>,
    /// Variables of this scope referencing each linked typedef
    pub types_referenced: FxHashMap<SymbolId, Vec<SymbolId>>,
}

/// Payload shared by all data items
#[derive(Debug, Clone)]
pub struct VariableData {
    /// Level number
    pub level: u8,
    /// Initial value or condition values
    pub value: Option<VariableValue>,
    /// Slot in the variable universe
    pub universe_index: Option<u32>,
    /// Kind-specific part
    pub kind: VariableKind,
}

impl VariableData {
    /// Plain variable payload
    #[must_use]
    pub fn new(level: u8, kind: VariableKind) -> Self {
        Self {
            level,
            value: None,
            universe_index: None,
            kind,
        }
    }

    /// Typedef payload
    #[must_use]
    pub fn typedef(&self) -> Option<&TypedefData> {
        match &self.kind {
            VariableKind::Typedef(typedef) => Some(typedef),
            _ => None,
        }
    }

    /// Mutable typedef payload
    pub fn typedef_mut(&mut self) -> Option<&mut TypedefData> {
        match &mut self.kind {
            VariableKind::Typedef(typedef) => Some(typedef),
            _ => None,
        }
    }
}

/// Value attached to a data item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableValue {
    /// `VALUE` clause of an ordinary item
    Initial(Value),
    /// Values of a condition name
    Conditions(Vec<ConditionValue>),
}

/// Kind-specific data of a data item
#[derive(Debug, Clone)]
pub enum VariableKind {
    /// Ordinary item
    Plain,
    /// Type description entry
    Typedef(TypedefData),
    /// `REDEFINES` item; the target is never owned
    Redefines {
        /// Redefined item, absent when resolution failed
        target: Option<SymbolId>,
    },
    /// Level-66 item
    Renames(RenamesData),
    /// `INDEXED BY` name
    Index {
        /// Indexed table item
        indexed: SymbolId,
    },
}

/// Typedef payload
#[derive(Debug, Clone, Default)]
pub struct TypedefData {
    /// Restriction level
    pub restriction: RestrictionLevel,
    /// Fields of this typedef that themselves use a `TYPE` clause
    pub typed_children: Vec<SymbolId>,
}

/// RENAMES payload
#[derive(Debug, Clone)]
pub struct RenamesData {
    /// First renamed name
    pub from: Name,
    /// Last renamed name of a `THRU` range
    pub thru: Option<Name>,
    /// Range computed once validated
    pub range: Option<RenamesType>,
}

/// Paragraph payload
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphData {
    /// Enclosing procedure section
    pub section: Option<SymbolId>,
}

/// A scope slot of a scope-owning symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeSlot {
    /// Typedefs
    Types,
    /// FILE SECTION
    FileData,
    /// GLOBAL-STORAGE
    GlobalStorage,
    /// WORKING-STORAGE
    WorkingStorage,
    /// LOCAL-STORAGE
    LocalStorage,
    /// LINKAGE
    Linkage,
    /// Procedure sections
    Sections,
    /// Paragraphs
    Paragraphs,
    /// Nested programs
    Programs,
    /// Functions
    Functions,
    /// Nested namespaces
    Namespaces,
    /// Fields of a group item or typedef
    Fields,
}

impl ScopeSlot {
    /// Slot holding the variables of a data division section
    #[must_use]
    pub fn for_section(section: cb_syntax::StorageSection) -> Self {
        match section {
            cb_syntax::StorageSection::File => Self::FileData,
            cb_syntax::StorageSection::GlobalStorage => Self::GlobalStorage,
            cb_syntax::StorageSection::WorkingStorage => Self::WorkingStorage,
            cb_syntax::StorageSection::LocalStorage => Self::LocalStorage,
            cb_syntax::StorageSection::Linkage => Self::Linkage,
        }
    }
}

/// Address of one scope: its owning symbol and slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeRef {
    /// Owning symbol
    pub owner: SymbolId,
    /// Slot inside the owner
    pub slot: ScopeSlot,
}

impl ScopeRef {
    /// Create a scope address
    #[must_use]
    pub fn new(owner: SymbolId, slot: ScopeSlot) -> Self {
        Self { owner, slot }
    }

    /// Field scope of a group item
    #[must_use]
    pub fn fields(owner: SymbolId) -> Self {
        Self::new(owner, ScopeSlot::Fields)
    }
}

impl NamespaceData {
    /// Scope in `slot`
    #[must_use]
    pub fn slot(&self, slot: ScopeSlot) -> Option<&Scope<SymbolId>> {
        match slot {
            ScopeSlot::Types => Some(&self.types),
            ScopeSlot::Programs => Some(&self.programs),
            ScopeSlot::Namespaces => Some(&self.namespaces),
            _ => None,
        }
    }

    /// Mutable scope in `slot`
    pub fn slot_mut(&mut self, slot: ScopeSlot) -> Option<&mut Scope<SymbolId>> {
        match slot {
            ScopeSlot::Types => Some(&mut self.types),
            ScopeSlot::Programs => Some(&mut self.programs),
            ScopeSlot::Namespaces => Some(&mut self.namespaces),
            _ => None,
        }
    }
}

impl ScopeData {
    /// Scope in `slot`
    #[must_use]
    pub fn slot(&self, slot: ScopeSlot) -> Option<&Scope<SymbolId>> {
        match slot {
            ScopeSlot::Types => Some(&self.types),
            ScopeSlot::FileData => Some(&self.file_data),
            ScopeSlot::GlobalStorage => Some(&self.global_storage),
            ScopeSlot::WorkingStorage => Some(&self.working_storage),
            ScopeSlot::LocalStorage => Some(&self.local_storage),
            ScopeSlot::Linkage => Some(&self.linkage),
            ScopeSlot::Sections => Some(&self.sections),
            ScopeSlot::Paragraphs => Some(&self.paragraphs),
            ScopeSlot::Programs => Some(&self.programs),
            ScopeSlot::Functions => Some(&self.functions),
            ScopeSlot::Namespaces | ScopeSlot::Fields => None,
        }
    }

    /// Mutable scope in `slot`
    pub fn slot_mut(&mut self, slot: ScopeSlot) -> Option<&mut Scope<SymbolId>> {
        match slot {
            ScopeSlot::Types => Some(&mut self.types),
            ScopeSlot::FileData => Some(&mut self.file_data),
            ScopeSlot::GlobalStorage => Some(&mut self.global_storage),
            ScopeSlot::WorkingStorage => Some(&mut self.working_storage),
            ScopeSlot::LocalStorage => Some(&mut self.local_storage),
            ScopeSlot::Linkage => Some(&mut self.linkage),
            ScopeSlot::Sections => Some(&mut self.sections),
            ScopeSlot::Paragraphs => Some(&mut self.paragraphs),
            ScopeSlot::Programs => Some(&mut self.programs),
            ScopeSlot::Functions => Some(&mut self.functions),
            ScopeSlot::Namespaces | ScopeSlot::Fields => None,
        }
    }

    /// Every symbol owned through one of the scopes, plus rejected duplicates
    pub fn owned(&self) -> impl Iterator<Item = SymbolId> + '_ {
        [
            &self.types,
            &self.file_data,
            &self.global_storage,
            &self.working_storage,
            &self.local_storage,
            &self.linkage,
            &self.sections,
            &self.paragraphs,
            &self.programs,
            &self.functions,
        ]
        .into_iter()
        .flat_map(|scope| scope.ordered().iter().copied())
        .chain(self.duplicates.iter().copied())
    }
}
