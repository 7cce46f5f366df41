//! Integration test utilities for Cobalt
//!
//! [`UnitScript`] writes the event stream a parser would deliver for a
//! compilation unit, one source line per event. [`build`] runs it through a
//! fresh [`Compiler`] and returns a [`Session`] with lookup helpers.

use cb_driver::{CompiledUnit, Compiler, CompilerOptions};
use cb_span::{FileId, Position};
use cb_symbols::{SymbolId, SymbolTable};
use cb_syntax::{
    CallParameter, DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry, DataRenamesEntry,
    Event, FileDescriptionEntry, FunctionDeclarationHeader, ParagraphHeader,
    ProcedureDivisionHeader, ProcedureSectionHeader, ProgramEnd, ProgramIdentification,
    SectionHeader, Statement, StatementKind, StorageSection, SymbolReference, TypedefClause,
};

/// Column of the level number of every scripted entry
pub const ENTRY_COLUMN: u32 = 8;
/// Column of every name referenced by a scripted entry
pub const REFERENCE_COLUMN: u32 = 30;

/// Fluent builder of a unit's event stream
///
/// Every call takes the next source line, so diagnostics can be checked
/// against [`UnitScript::line`].
#[derive(Debug, Clone, Default)]
pub struct UnitScript {
    events: Vec<Event>,
    line: u32,
}

impl UnitScript {
    /// An empty unit
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last line used
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Events written so far
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Hand over the events
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    fn next_line(&mut self) -> Position {
        self.line += 1;
        Position::new(self.line, ENTRY_COLUMN)
    }

    fn reference(&self, name: &str) -> SymbolReference {
        SymbolReference::new(name, Position::new(self.line, REFERENCE_COLUMN))
    }

    fn push(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// `PROGRAM-ID. name.`
    #[must_use]
    pub fn program(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::StartProgram(ProgramIdentification::new(name, position)))
    }

    /// `END PROGRAM name.`
    #[must_use]
    pub fn end_program(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::EndProgram(Some(ProgramEnd {
            name: Some(name.to_owned()),
            position,
        })))
    }

    /// End of a program without an `END PROGRAM` marker
    #[must_use]
    pub fn end_program_missing(self) -> Self {
        self.push(Event::EndProgram(None))
    }

    /// `DATA DIVISION.`
    #[must_use]
    pub fn data_division(mut self) -> Self {
        let position = self.next_line();
        self.push(Event::StartDataDivision(position))
    }

    /// End of the data division
    #[must_use]
    pub fn end_data_division(self) -> Self {
        self.push(Event::EndDataDivision)
    }

    /// A data division section header
    #[must_use]
    pub fn section(mut self, section: StorageSection) -> Self {
        let position = self.next_line();
        self.push(Event::StartDataSection(section, SectionHeader { position }))
    }

    /// End of a data division section
    #[must_use]
    pub fn end_section(self, section: StorageSection) -> Self {
        self.push(Event::EndDataSection(section))
    }

    /// `DATA DIVISION. WORKING-STORAGE SECTION.`
    #[must_use]
    pub fn working_storage(self) -> Self {
        self.data_division().section(StorageSection::WorkingStorage)
    }

    /// Close the working storage opened by [`Self::working_storage`]
    #[must_use]
    pub fn end_working_storage(self) -> Self {
        self.end_section(StorageSection::WorkingStorage).end_data_division()
    }

    /// `FD name.`
    #[must_use]
    pub fn file_description(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::StartFileDescriptionEntry(FileDescriptionEntry {
            name: name.to_owned(),
            position,
            is_global: false,
            is_external: false,
        }))
    }

    /// End of an `FD`
    #[must_use]
    pub fn end_file_description(self) -> Self {
        self.push(Event::EndFileDescriptionEntry)
    }

    /// A data description entry shaped by `configure`
    ///
    /// `configure` receives the entry and the current line's reference
    /// position, for clauses that name other items.
    #[must_use]
    pub fn entry(
        mut self,
        level: u8,
        name: &str,
        configure: impl FnOnce(DataDescriptionEntry, Position) -> DataDescriptionEntry,
    ) -> Self {
        let position = self.next_line();
        let reference = Position::new(self.line, REFERENCE_COLUMN);
        let entry = configure(DataDescriptionEntry::new(level, name, position), reference);
        self.push(Event::StartDataDescriptionEntry(Box::new(entry)))
    }

    /// A group item
    #[must_use]
    pub fn group(self, level: u8, name: &str) -> Self {
        self.entry(level, name, |entry, _| entry)
    }

    /// An elementary item with a PICTURE clause
    #[must_use]
    pub fn pic(self, level: u8, name: &str, picture: &str) -> Self {
        self.entry(level, name, |entry, _| entry.with_picture(picture))
    }

    /// An elementary item of a named type
    #[must_use]
    pub fn typed(self, level: u8, name: &str, type_name: &str) -> Self {
        self.entry(level, name, |entry, at| {
            entry.of_type(SymbolReference::new(type_name, at))
        })
    }

    /// `FILLER` with a PICTURE clause
    #[must_use]
    pub fn filler(mut self, level: u8, picture: &str) -> Self {
        let position = self.next_line();
        let entry = DataDescriptionEntry::filler(level, position).with_picture(picture);
        self.push(Event::StartDataDescriptionEntry(Box::new(entry)))
    }

    /// A type description entry
    #[must_use]
    pub fn typedef(self, level: u8, name: &str, clause: TypedefClause) -> Self {
        self.typedef_with(level, name, clause, |entry, _| entry)
    }

    /// A type description entry with further clauses
    #[must_use]
    pub fn typedef_with(
        mut self,
        level: u8,
        name: &str,
        clause: TypedefClause,
        configure: impl FnOnce(DataDescriptionEntry, Position) -> DataDescriptionEntry,
    ) -> Self {
        let position = self.next_line();
        let reference = Position::new(self.line, REFERENCE_COLUMN);
        let entry = configure(
            DataDescriptionEntry::new(level, name, position).as_typedef(clause),
            reference,
        );
        self.push(Event::StartTypedefEntry(Box::new(entry)))
    }

    /// An item redefining `target`
    #[must_use]
    pub fn redefines(mut self, level: u8, name: &str, target: &str, picture: &str) -> Self {
        let position = self.next_line();
        let redefines = self.reference(target);
        let entry = DataDescriptionEntry::new(level, name, position).with_picture(picture);
        self.push(Event::StartDataRedefinesEntry(Box::new(DataRedefinesEntry {
            entry,
            redefines,
        })))
    }

    /// `66 name RENAMES from [THRU thru]`
    #[must_use]
    pub fn renames(mut self, name: &str, from: &str, thru: Option<&str>) -> Self {
        let position = self.next_line();
        let entry = DataRenamesEntry {
            name: name.to_owned(),
            position,
            from: self.reference(from),
            thru: thru.map(|thru| {
                SymbolReference::new(thru, Position::new(self.line, REFERENCE_COLUMN + 20))
            }),
        };
        self.push(Event::StartDataRenamesEntry(entry))
    }

    /// `88 name` without values
    #[must_use]
    pub fn condition(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::StartDataConditionEntry(DataConditionEntry {
            name: name.to_owned(),
            position,
            values: Vec::new(),
        }))
    }

    /// `PROCEDURE DIVISION.`
    #[must_use]
    pub fn procedure_division(self) -> Self {
        self.procedure_division_using(&[], None)
    }

    /// `PROCEDURE DIVISION USING ... RETURNING ...`
    #[must_use]
    pub fn procedure_division_using(mut self, using: &[&str], returning: Option<&str>) -> Self {
        let position = self.next_line();
        let header = ProcedureDivisionHeader {
            position,
            using: using
                .iter()
                .map(|name| CallParameter::by_reference(self.reference(name)))
                .collect(),
            returning: returning.map(|name| self.reference(name)),
        };
        self.push(Event::StartProcedureDivision(Box::new(header)))
    }

    /// `PROCEDURE DIVISION` with explicit parameters
    #[must_use]
    pub fn procedure_division_with(mut self, using: Vec<CallParameter>) -> Self {
        let position = self.next_line();
        let header = ProcedureDivisionHeader {
            position,
            using,
            returning: None,
        };
        self.push(Event::StartProcedureDivision(Box::new(header)))
    }

    /// End of the procedure division
    #[must_use]
    pub fn end_procedure_division(self) -> Self {
        self.push(Event::EndProcedureDivision)
    }

    /// `DECLARE` header shaped by `configure`
    #[must_use]
    pub fn declare(
        mut self,
        name: &str,
        configure: impl FnOnce(FunctionDeclarationHeader) -> FunctionDeclarationHeader,
    ) -> Self {
        let position = self.next_line();
        let header = configure(FunctionDeclarationHeader::new(name, position));
        self.push(Event::StartFunctionDeclaration(Box::new(header)))
    }

    /// `END-DECLARE`
    #[must_use]
    pub fn end_declare(self) -> Self {
        self.push(Event::EndFunctionDeclaration)
    }

    /// Procedure section header
    #[must_use]
    pub fn procedure_section(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::StartSection(ProcedureSectionHeader {
            name: name.to_owned(),
            position,
        }))
    }

    /// End of a procedure section
    #[must_use]
    pub fn end_procedure_section(self) -> Self {
        self.push(Event::EndSection)
    }

    /// Paragraph header
    #[must_use]
    pub fn paragraph(mut self, name: &str) -> Self {
        let position = self.next_line();
        self.push(Event::StartParagraph(ParagraphHeader {
            name: name.to_owned(),
            position,
        }))
    }

    /// End of a paragraph
    #[must_use]
    pub fn end_paragraph(self) -> Self {
        self.push(Event::EndParagraph)
    }

    /// An executable statement
    #[must_use]
    pub fn statement(mut self, kind: StatementKind) -> Self {
        let position = self.next_line();
        self.push(Event::Statement(Statement { kind, position }))
    }
}

/// A compiler together with the unit it just built
pub struct Session {
    /// Compiler owning the symbol table
    pub compiler: Compiler,
    /// Last built unit
    pub unit: CompiledUnit,
}

/// Build `script` as file 0 with default options
#[must_use]
pub fn build(script: UnitScript) -> Session {
    build_with(CompilerOptions::default(), script)
}

/// Build `script` as file 0
///
/// Set `COBALT_LOG` to see the builder's logs.
#[must_use]
pub fn build_with(options: CompilerOptions, script: UnitScript) -> Session {
    cb_driver::init_tracing();
    let mut compiler = Compiler::new(options);
    let unit = compiler.compile_unit(FileId::new(0), script.into_events());
    Session { compiler, unit }
}

impl Session {
    /// Shared symbol table
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        self.compiler.symbols()
    }

    /// Symbol of the first data entry named `name`
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols_named(name).first().copied()
    }

    /// Symbols of every data entry named `name`, in source order
    #[must_use]
    pub fn symbols_named(&self, name: &str) -> Vec<SymbolId> {
        let tree = &self.unit.tree;
        tree.find_data(name)
            .into_iter()
            .filter_map(|node| tree.get(node).symbol())
            .collect()
    }

    /// Program or procedure named `name`
    #[must_use]
    pub fn scope(&self, name: &str) -> Option<SymbolId> {
        self.symbols().lookup_scope(name).first().copied()
    }

    /// Codes of the unit's diagnostics, in report order
    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        self.unit.diagnostics.iter().map(|diagnostic| diagnostic.code()).collect()
    }

    /// Number of diagnostics with `code`
    #[must_use]
    pub fn count(&self, code: &str) -> usize {
        self.unit.diagnostics.count_code(code)
    }

    /// Rendered diagnostics, one per line
    #[must_use]
    pub fn rendered_diagnostics(&self) -> String {
        self.unit
            .diagnostics
            .iter()
            .map(|diagnostic| format!("{diagnostic}\n"))
            .collect()
    }

    /// Dump of every top-level program of the unit
    #[must_use]
    pub fn dump(&self) -> String {
        self.unit
            .programs
            .iter()
            .map(|program| self.symbols().dump(*program))
            .collect()
    }
}
