//! Compilation driver
//!
//! A [`Compiler`] owns the [`CompilationContext`] of a session and builds one
//! unit at a time from its event stream. The symbol table persists across
//! units; recompiling a file first detaches the programs it produced last
//! time.

pub mod logging;
pub mod options;

pub use logging::init_tracing;
pub use options::{CompilerOptions, TraceOptions};

use anyhow::{Context, Result};
use cb_builder::{BuiltUnit, TreeBuilder};
use cb_semantic::{CompilationContext, Diagnostics};
use cb_span::FileId;
use cb_symbols::{SymbolId, SymbolTable};
use cb_syntax::{Event, EventHandler};
use cb_tree::SyntaxTree;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{debug, info};

/// Result of building one unit
#[derive(Debug)]
pub struct CompiledUnit {
    /// File the unit was read from
    pub file: FileId,
    /// Program tree
    pub tree: SyntaxTree,
    /// Top-level programs in declaration order
    pub programs: Vec<SymbolId>,
    /// Diagnostics reported while building the unit
    pub diagnostics: Diagnostics,
}

/// A compilation session
pub struct Compiler {
    ctx: CompilationContext,
    options: CompilerOptions,
    /// Top-level programs produced by each file
    units: FxHashMap<FileId, Vec<SymbolId>>,
}

impl Compiler {
    /// Create a session with an empty symbol table
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            ctx: CompilationContext::new(options.semantic),
            options,
            units: FxHashMap::default(),
        }
    }

    /// Options of the session
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Symbol table shared by every unit
    pub fn symbols(&self) -> &SymbolTable {
        &self.ctx.symbols
    }

    /// Build the unit read from `file`
    pub fn compile_unit(&mut self, file: FileId, events: impl IntoIterator<Item = Event>) -> CompiledUnit {
        self.ctx.begin_unit(file);
        let mut builder = TreeBuilder::new(&mut self.ctx);
        builder.replay(events);
        let BuiltUnit { tree, programs } = builder.finish();
        let diagnostics = self.ctx.take_diagnostics();

        if self.options.trace.log_unit_summary {
            info!(
                file = file.0,
                programs = programs.len(),
                nodes = tree.len(),
                diagnostics = diagnostics.len(),
                errors = diagnostics.has_errors(),
                "compiled unit"
            );
        }
        self.units.insert(file, programs.clone());
        CompiledUnit {
            file,
            tree,
            programs,
            diagnostics,
        }
    }

    /// Detach the programs `file` produced before, then build it again
    pub fn recompile_unit(&mut self, file: FileId, events: impl IntoIterator<Item = Event>) -> CompiledUnit {
        if let Some(programs) = self.units.remove(&file) {
            let removed: usize = programs
                .into_iter()
                .map(|program| self.ctx.symbols.remove_program(program))
                .sum();
            debug!(file = file.0, removed, "detached previous unit");
        }
        self.compile_unit(file, events)
    }
}

/// Read a recorded event stream stored as a JSON array
pub fn read_event_trace(path: &Path) -> Result<Vec<Event>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event trace: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse event trace: {}", path.display()))
}
