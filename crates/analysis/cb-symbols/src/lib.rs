//! Symbols, scopes and types
//!
//! # Architecture
//!
//! Every symbol lives in the [`SymbolTable`] arena and is addressed by a
//! [`SymbolId`]. Scopes ([`Scope`]) hold handles only, so owners, REDEFINES
//! targets, indexed tables and typedef references are plain non-owning ids.
//! Symbol kinds are variants of [`SymbolData`] / [`VariableKind`] rather than a
//! class hierarchy.
//!
//! # Usage
//!
//! ```
//! use cb_intern::Interner;
//! use cb_symbols::SymbolTable;
//!
//! let table = SymbolTable::new(Interner::new());
//! assert_eq!(table.lookup_type("Numeric").len(), 1);
//! assert!(table.lookup_scope("PAYROLL").is_empty());
//! ```

mod dump;

pub mod domain;
pub mod flags;
pub mod picture;
pub mod symbol;
pub mod table;
pub mod types;

pub use domain::{Domain, Scope};
pub use flags::SymbolFlags;
pub use picture::{Picture, PictureCategory, PictureError};
pub use symbol::{
    NamespaceData, ParagraphData, RenamesData, ScopeData, ScopeRef, ScopeSlot, Symbol, SymbolData,
    SymbolId, SymbolKind, TypedefData, VariableData, VariableKind, VariableValue,
};
pub use table::{BUILTIN_TYPES, SymbolTable};
pub use types::{
    ArrayType, DependingOn, GroupType, PictureType, ProgramSignature, RenamesType, Type,
    TypedefType, UsageFormat,
};
