//! Parsed code elements and the event protocol that feeds the tree builder
//!
//! The scanner and grammar live outside this workspace. What reaches Cobalt is
//! a stream of [`Event`]s in source order, each carrying a clause or statement
//! payload that has already been parsed. This crate defines those payloads and
//! the [`EventHandler`] trait a consumer implements.
//!
//! # Example
//!
//! ```
//! use cb_span::Position;
//! use cb_syntax::{DataDescriptionEntry, DataUsage};
//!
//! let entry = DataDescriptionEntry::new(5, "WS-COUNT", Position::new(12, 8))
//!     .with_picture("9(4)")
//!     .with_usage(DataUsage::Comp)
//!     .with_occurs(1, 10);
//! assert_eq!(entry.max_occurs(), 10);
//! ```

pub mod data;
pub mod event;
pub mod procedure;
pub mod program;

pub use data::{
    ConditionValue, DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry,
    DataRenamesEntry, DataUsage, FigurativeConstant, FileDescriptionEntry, IndexName, Occurs,
    RestrictionLevel, SymbolReference, TypedefClause, Value,
};
pub use event::{Event, EventHandler};
pub use procedure::{
    AccessModifier, CallParameter, FunctionDeclarationHeader, FunctionKind, ParagraphHeader,
    PassingDirection, ProcedureDivisionHeader, ProcedureSectionHeader, SharingMode, Statement,
    StatementKind,
};
pub use program::{ProgramEnd, ProgramIdentification, SectionHeader, StorageSection};

/// Level number of RENAMES entries
pub const LEVEL_RENAMES: u8 = 66;
/// Level number of independent elementary items
pub const LEVEL_INDEPENDENT: u8 = 77;
/// Level number of condition names
pub const LEVEL_CONDITION: u8 = 88;
