//! The callback protocol between the parser and the tree builder

use crate::data::{
    DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry, DataRenamesEntry,
    FileDescriptionEntry,
};
use crate::procedure::{
    FunctionDeclarationHeader, ParagraphHeader, ProcedureDivisionHeader, ProcedureSectionHeader,
    Statement,
};
use crate::program::{ProgramEnd, ProgramIdentification, SectionHeader, StorageSection};
use cb_span::Position;
use serde::{Deserialize, Serialize};

/// One recognized code element, delivered in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// `PROGRAM-ID`
    StartProgram(ProgramIdentification),
    /// `END PROGRAM`, or the end of the source when the marker is missing
    EndProgram(Option<ProgramEnd>),
    /// `DATA DIVISION`
    StartDataDivision(Position),
    /// End of the data division
    EndDataDivision,
    /// A data division section header
    StartDataSection(StorageSection, SectionHeader),
    /// End of a data division section
    EndDataSection(StorageSection),
    /// `FD` entry
    StartFileDescriptionEntry(FileDescriptionEntry),
    /// End of the records of an `FD`
    EndFileDescriptionEntry,
    /// Level 1-49/77 data description entry; typedef entries are forwarded
    StartDataDescriptionEntry(Box<DataDescriptionEntry>),
    /// Entry with a `REDEFINES` clause
    StartDataRedefinesEntry(Box<DataRedefinesEntry>),
    /// Level-66 entry
    StartDataRenamesEntry(DataRenamesEntry),
    /// Level-88 entry
    StartDataConditionEntry(DataConditionEntry),
    /// Type description entry
    StartTypedefEntry(Box<DataDescriptionEntry>),
    /// `PROCEDURE DIVISION` header
    StartProcedureDivision(Box<ProcedureDivisionHeader>),
    /// End of the procedure division
    EndProcedureDivision,
    /// `DECLARATIVES`
    StartDeclaratives(Position),
    /// `END DECLARATIVES`
    EndDeclaratives,
    /// `DECLARE FUNCTION|PROCEDURE`
    StartFunctionDeclaration(Box<FunctionDeclarationHeader>),
    /// `END-DECLARE`
    EndFunctionDeclaration,
    /// Procedure division section header
    StartSection(ProcedureSectionHeader),
    /// End of a procedure division section
    EndSection,
    /// Paragraph header
    StartParagraph(ParagraphHeader),
    /// End of a paragraph
    EndParagraph,
    /// Any executable statement
    Statement(Statement),
}

/// Receiver of the event protocol
///
/// Implementors get one callback per event; [`EventHandler::handle`] routes an
/// [`Event`] value to the matching callback so recorded streams can be replayed.
pub trait EventHandler {
    /// `PROGRAM-ID`
    fn start_program(&mut self, id: ProgramIdentification);
    /// `END PROGRAM`
    fn end_program(&mut self, end: Option<ProgramEnd>);
    /// `DATA DIVISION`
    fn start_data_division(&mut self, position: Position);
    /// End of the data division
    fn end_data_division(&mut self);
    /// Data division section header
    fn start_data_section(&mut self, section: StorageSection, header: SectionHeader);
    /// End of a data division section
    fn end_data_section(&mut self, section: StorageSection);
    /// `FD` entry
    fn start_file_description_entry(&mut self, entry: FileDescriptionEntry);
    /// End of an `FD`
    fn end_file_description_entry(&mut self);
    /// Data description entry
    fn start_data_description_entry(&mut self, entry: DataDescriptionEntry);
    /// `REDEFINES` entry
    fn start_data_redefines_entry(&mut self, entry: DataRedefinesEntry);
    /// `RENAMES` entry
    fn start_data_renames_entry(&mut self, entry: DataRenamesEntry);
    /// Condition-name entry
    fn start_data_condition_entry(&mut self, entry: DataConditionEntry);
    /// Type description entry
    fn start_typedef_entry(&mut self, entry: DataDescriptionEntry);
    /// `PROCEDURE DIVISION`
    fn start_procedure_division(&mut self, header: ProcedureDivisionHeader);
    /// End of the procedure division
    fn end_procedure_division(&mut self);
    /// `DECLARATIVES`
    fn start_declaratives(&mut self, position: Position);
    /// `END DECLARATIVES`
    fn end_declaratives(&mut self);
    /// `DECLARE`
    fn start_function_declaration(&mut self, header: FunctionDeclarationHeader);
    /// `END-DECLARE`
    fn end_function_declaration(&mut self);
    /// Procedure section
    fn start_section(&mut self, header: ProcedureSectionHeader);
    /// End of a procedure section
    fn end_section(&mut self);
    /// Paragraph
    fn start_paragraph(&mut self, header: ParagraphHeader);
    /// End of a paragraph
    fn end_paragraph(&mut self);
    /// Executable statement
    fn statement(&mut self, statement: Statement);

    /// Route `event` to its callback
    fn handle(&mut self, event: Event) {
        match event {
            Event::StartProgram(id) => self.start_program(id),
            Event::EndProgram(end) => self.end_program(end),
            Event::StartDataDivision(position) => self.start_data_division(position),
            Event::EndDataDivision => self.end_data_division(),
            Event::StartDataSection(section, header) => self.start_data_section(section, header),
            Event::EndDataSection(section) => self.end_data_section(section),
            Event::StartFileDescriptionEntry(entry) => self.start_file_description_entry(entry),
            Event::EndFileDescriptionEntry => self.end_file_description_entry(),
            Event::StartDataDescriptionEntry(entry) => self.start_data_description_entry(*entry),
            Event::StartDataRedefinesEntry(entry) => self.start_data_redefines_entry(*entry),
            Event::StartDataRenamesEntry(entry) => self.start_data_renames_entry(entry),
            Event::StartDataConditionEntry(entry) => self.start_data_condition_entry(entry),
            Event::StartTypedefEntry(entry) => self.start_typedef_entry(*entry),
            Event::StartProcedureDivision(header) => self.start_procedure_division(*header),
            Event::EndProcedureDivision => self.end_procedure_division(),
            Event::StartDeclaratives(position) => self.start_declaratives(position),
            Event::EndDeclaratives => self.end_declaratives(),
            Event::StartFunctionDeclaration(header) => self.start_function_declaration(*header),
            Event::EndFunctionDeclaration => self.end_function_declaration(),
            Event::StartSection(header) => self.start_section(header),
            Event::EndSection => self.end_section(),
            Event::StartParagraph(header) => self.start_paragraph(header),
            Event::EndParagraph => self.end_paragraph(),
            Event::Statement(statement) => self.statement(statement),
        }
    }

    /// Feed every event of `events` in order
    fn replay(&mut self, events: impl IntoIterator<Item = Event>)
    where
        Self: Sized,
    {
        for event in events {
            self.handle(event);
        }
    }
}
