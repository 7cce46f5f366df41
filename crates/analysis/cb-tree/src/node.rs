//! Tree nodes and the code elements they carry

use bitflags::bitflags;
use cb_arena::Idx;
use cb_span::Position;
use cb_symbols::{ScopeRef, SymbolId};
use cb_syntax::{
    DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry, DataRenamesEntry,
    FileDescriptionEntry, FunctionDeclarationHeader, IndexName, LEVEL_CONDITION, LEVEL_RENAMES,
    ParagraphHeader, PassingDirection, ProcedureDivisionHeader, ProcedureSectionHeader, ProgramEnd,
    ProgramIdentification, SectionHeader, Statement, StorageSection,
};

/// Handle of a node in a [`SyntaxTree`](crate::SyntaxTree)
pub type NodeId = Idx<Node>;

bitflags! {
    /// Context a node was built in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Inside WORKING-STORAGE
        const WORKING_STORAGE = 1 << 0;
        /// Inside LINKAGE, or a procedure parameter
        const LINKAGE_SECTION = 1 << 1;
        /// Inside LOCAL-STORAGE
        const LOCAL_STORAGE = 1 << 2;
        /// Inside the FILE SECTION
        const FILE_SECTION = 1 << 3;
        /// Inside GLOBAL-STORAGE
        const GLOBAL_STORAGE = 1 << 4;
        /// Inside a declared procedure
        const INSIDE_PROCEDURE = 1 << 5;
        /// Inside a TYPEDEF body
        const INSIDE_TYPEDEF = 1 << 6;
        /// Program declaring procedures
        const CONTAINS_PROCEDURE = 1 << 7;
        /// Data item with `INDEXED BY`
        const CONTAINS_INDEX = 1 << 8;
        /// Program closed without `END PROGRAM`
        const MISSING_END_PROGRAM = 1 << 9;
    }
}

impl NodeFlags {
    /// Flag of a data division section
    #[must_use]
    pub fn for_section(section: StorageSection) -> Self {
        match section {
            StorageSection::File => Self::FILE_SECTION,
            StorageSection::GlobalStorage => Self::GLOBAL_STORAGE,
            StorageSection::WorkingStorage => Self::WORKING_STORAGE,
            StorageSection::LocalStorage => Self::LOCAL_STORAGE,
            StorageSection::Linkage => Self::LINKAGE_SECTION,
        }
    }
}

/// Handle into the symbol table attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticData {
    /// Symbol built for the node
    Symbol(SymbolId),
    /// Scope the node opens
    Scope(ScopeRef),
}

impl SemanticData {
    /// Symbol handle, if the node carries one
    #[must_use]
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Self::Symbol(id) => Some(id),
            Self::Scope(_) => None,
        }
    }
}

/// Code element a node was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the tree
    SourceFile,
    /// Program
    Program(ProgramIdentification),
    /// `END PROGRAM` marker
    ProgramEnd(ProgramEnd),
    /// `DATA DIVISION`
    DataDivision(Position),
    /// Data division section
    DataSection(StorageSection, SectionHeader),
    /// `FD`
    FileDescription(FileDescriptionEntry),
    /// Data description entry
    DataDescription(Box<DataDescriptionEntry>),
    /// `REDEFINES` entry
    DataRedefines(Box<DataRedefinesEntry>),
    /// Level-66 entry
    DataRenames(DataRenamesEntry),
    /// Level-88 entry
    DataCondition(DataConditionEntry),
    /// Type description entry
    TypeDefinition(Box<DataDescriptionEntry>),
    /// `INDEXED BY` name
    IndexDefinition(IndexName),
    /// `PROCEDURE DIVISION`
    ProcedureDivision(Box<ProcedureDivisionHeader>),
    /// `DECLARATIVES`
    Declaratives(Position),
    /// Declared function or procedure
    FunctionDeclaration(Box<FunctionDeclarationHeader>),
    /// Parameter of a declared procedure; `None` direction is `RETURNING`
    ParameterDescription(Box<DataDescriptionEntry>, Option<PassingDirection>),
    /// Procedure section
    Section(ProcedureSectionHeader),
    /// Paragraph
    Paragraph(ParagraphHeader),
    /// Executable statement
    Statement(Statement),
}

impl NodeKind {
    /// Short description used by outlines
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::SourceFile => "SourceFile".to_owned(),
            Self::Program(id) => format!("Program {}", id.name),
            Self::ProgramEnd(_) => "End".to_owned(),
            Self::DataDivision(_) => "DataDivision".to_owned(),
            Self::DataSection(section, _) => section.keyword().to_owned(),
            Self::FileDescription(entry) => format!("FD {}", entry.name),
            Self::DataDescription(entry) => format!("{:02} {}", entry.level, entry.display_name()),
            Self::DataRedefines(entry) => format!(
                "{:02} {} REDEFINES {}",
                entry.entry.level,
                entry.entry.display_name(),
                entry.redefines.name
            ),
            Self::DataRenames(entry) => format!("66 {}", entry.name),
            Self::DataCondition(entry) => format!("88 {}", entry.name),
            Self::TypeDefinition(entry) => {
                format!("{:02} {} TYPEDEF", entry.level, entry.display_name())
            }
            Self::IndexDefinition(index) => format!("Index {}", index.name),
            Self::ProcedureDivision(_) => "ProcedureDivision".to_owned(),
            Self::Declaratives(_) => "Declaratives".to_owned(),
            Self::FunctionDeclaration(header) => format!("Declare {}", header.name),
            Self::ParameterDescription(entry, _) => format!("Parameter {}", entry.display_name()),
            Self::Section(header) => format!("Section {}", header.name),
            Self::Paragraph(header) => format!("Paragraph {}", header.name),
            Self::Statement(statement) => format!("{:?}", statement.kind),
        }
    }
}

/// Borrowed view over every node kind that declares a data item
#[derive(Debug, Clone, Copy)]
pub enum DataDefinition<'a> {
    /// Data description entry
    Description(&'a DataDescriptionEntry),
    /// `REDEFINES` entry
    Redefines(&'a DataRedefinesEntry),
    /// Level-66 entry
    Renames(&'a DataRenamesEntry),
    /// Level-88 entry
    Condition(&'a DataConditionEntry),
    /// Type description entry
    Typedef(&'a DataDescriptionEntry),
    /// Procedure parameter
    Parameter(&'a DataDescriptionEntry),
}

impl<'a> DataDefinition<'a> {
    /// Level number, 66 and 88 for RENAMES and conditions
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Renames(_) => LEVEL_RENAMES,
            Self::Condition(_) => LEVEL_CONDITION,
            Self::Redefines(entry) => entry.entry.level,
            Self::Description(entry) | Self::Typedef(entry) | Self::Parameter(entry) => entry.level,
        }
    }

    /// Declared name, `None` for `FILLER`
    #[must_use]
    pub fn name(self) -> Option<&'a str> {
        match self {
            Self::Renames(entry) => Some(&entry.name),
            Self::Condition(entry) => Some(&entry.name),
            Self::Redefines(entry) => entry.entry.name.as_deref(),
            Self::Description(entry) | Self::Typedef(entry) | Self::Parameter(entry) => {
                entry.name.as_deref()
            }
        }
    }

    /// Position of the entry
    #[must_use]
    pub fn position(self) -> Position {
        match self {
            Self::Renames(entry) => entry.position,
            Self::Condition(entry) => entry.position,
            Self::Redefines(entry) => entry.entry.position,
            Self::Description(entry) | Self::Typedef(entry) | Self::Parameter(entry) => {
                entry.position
            }
        }
    }

    /// Common data description clauses, absent for RENAMES and conditions
    #[must_use]
    pub fn entry(self) -> Option<&'a DataDescriptionEntry> {
        match self {
            Self::Redefines(entry) => Some(&entry.entry),
            Self::Description(entry) | Self::Typedef(entry) | Self::Parameter(entry) => Some(entry),
            Self::Renames(_) | Self::Condition(_) => None,
        }
    }
}

/// A node of the program tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Code element
    pub kind: NodeKind,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Children in source order
    pub children: Vec<NodeId>,
    /// Section and procedure context
    pub flags: NodeFlags,
    /// Symbol or scope associated while building
    pub semantic: Option<SemanticData>,
    /// Typedef node whose body contains this node
    pub parent_typedef: Option<NodeId>,
}

impl Node {
    /// Create a childless node
    #[must_use]
    pub fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            flags: NodeFlags::empty(),
            semantic: None,
            parent_typedef: None,
        }
    }

    /// Data definition view of the node
    #[must_use]
    pub fn data_definition(&self) -> Option<DataDefinition<'_>> {
        match &self.kind {
            NodeKind::DataDescription(entry) => Some(DataDefinition::Description(entry)),
            NodeKind::DataRedefines(entry) => Some(DataDefinition::Redefines(entry)),
            NodeKind::DataRenames(entry) => Some(DataDefinition::Renames(entry)),
            NodeKind::DataCondition(entry) => Some(DataDefinition::Condition(entry)),
            NodeKind::TypeDefinition(entry) => Some(DataDefinition::Typedef(entry)),
            NodeKind::ParameterDescription(entry, _) => Some(DataDefinition::Parameter(entry)),
            _ => None,
        }
    }

    /// Symbol handle from the semantic slot
    #[must_use]
    pub fn symbol(&self) -> Option<SymbolId> {
        self.semantic.and_then(SemanticData::symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_definition_levels() {
        let renames = NodeKind::DataRenames(DataRenamesEntry {
            name: "R".to_owned(),
            position: Position::new(9, 8),
            from: cb_syntax::SymbolReference::new("B", Position::new(9, 20)),
            thru: None,
        });
        let node = Node::new(renames, None);
        let definition = node.data_definition().expect("renames is a data definition");
        assert_eq!(definition.level(), 66);
        assert_eq!(definition.name(), Some("R"));
        assert!(definition.entry().is_none());

        let statement = Node::new(
            NodeKind::Statement(Statement {
                kind: cb_syntax::StatementKind::Move,
                position: Position::new(12, 12),
            }),
            None,
        );
        assert!(statement.data_definition().is_none());
        assert_eq!(statement.kind.label(), "Move");
    }
}
