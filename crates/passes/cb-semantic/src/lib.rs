//! Symbol tables and type linking for Cobalt programs
//!
//! This crate turns the data definitions, programs and procedures collected
//! in the program tree into symbols, resolves REDEFINES, RENAMES and
//! `DEPENDING ON` references, and links `TYPE` clauses to their typedefs.
//!
//! # Architecture
//!
//! - **Context**: [`CompilationContext`] owns the symbol table, the
//!   diagnostics and the options of a compilation; passes borrow it
//! - **Builder**: [`ProgramSymbolBuilder`] is driven by the tree builder and
//!   creates symbols as programs, sections and records complete
//! - **Linker**: [`TypeLinker`] runs when the outermost program of a unit
//!   ends and reports unresolved, ambiguous and circular type references
//!
//! # Usage
//!
//! ```rust,ignore
//! use cb_semantic::{CompilationContext, ProgramSymbolBuilder, SemanticOptions};
//!
//! let mut ctx = CompilationContext::new(SemanticOptions::default());
//! let mut symbols = ProgramSymbolBuilder::new();
//! symbols.start_program(&mut ctx, &mut tree, program_node);
//! // ...
//! symbols.end_program(&mut ctx);
//! for diagnostic in ctx.take_diagnostics() {
//!     eprintln!("{diagnostic}");
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod linker;
pub mod options;

mod renames;

pub use builder::ProgramSymbolBuilder;
pub use context::CompilationContext;
pub use error::{Diagnostic, Diagnostics, SemanticError, Severity};
pub use linker::TypeLinker;
pub use options::{ReportLevel, SemanticOptions};
