//! Level-driven program tree builder
//!
//! [`TreeBuilder`] consumes the parser's event stream and nests every entry
//! under the node it belongs to. Data description entries carry no explicit
//! end event, so their nesting is derived from level numbers: entering an
//! item closes every open item at the same or a deeper level. Each callback
//! also drives the [`ProgramSymbolBuilder`], so scopes and symbols are built
//! in the same pass.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cb_builder::TreeBuilder;
//! use cb_semantic::CompilationContext;
//! use cb_syntax::EventHandler;
//!
//! let mut ctx = CompilationContext::default();
//! let mut builder = TreeBuilder::new(&mut ctx);
//! builder.replay(events);
//! let unit = builder.finish();
//! println!("{}", unit.tree.outline());
//! ```

use cb_semantic::{CompilationContext, ProgramSymbolBuilder};
use cb_span::Position;
use cb_symbols::{ScopeRef, ScopeSlot, SymbolId};
use cb_syntax::{
    DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry, DataRenamesEntry, EventHandler,
    FileDescriptionEntry, FunctionDeclarationHeader, LEVEL_CONDITION, LEVEL_INDEPENDENT, LEVEL_RENAMES,
    ParagraphHeader, ProcedureDivisionHeader, ProcedureSectionHeader, ProgramEnd,
    ProgramIdentification, SectionHeader, Statement, StorageSection,
};
use cb_tree::{DataDefinition, NodeFlags, NodeId, NodeKind, SemanticData, SyntaxTree};
use tracing::trace;

/// Level a RENAMES entry is nested at: directly under its 01 record
const RENAMES_NESTING_LEVEL: u8 = 2;

/// Tree and top-level programs of one built unit
#[derive(Debug)]
pub struct BuiltUnit {
    /// Program tree rooted at the source file node
    pub tree: SyntaxTree,
    /// Top-level programs in declaration order, duplicates included
    pub programs: Vec<SymbolId>,
}

/// Context saved when a program or declared procedure opens
#[derive(Debug, Clone, Copy)]
struct Frame {
    flags: NodeFlags,
    section: Option<StorageSection>,
    typedef: Option<NodeId>,
}

/// Builds the program tree of one unit from its event stream
pub struct TreeBuilder<'ctx> {
    ctx: &'ctx mut CompilationContext,
    tree: SyntaxTree,
    current: NodeId,
    symbols: ProgramSymbolBuilder,
    /// TYPEDEF node whose body is open
    current_typedef: Option<NodeId>,
    section: Option<StorageSection>,
    /// Flags of the program or procedure being read
    scope_flags: NodeFlags,
    frames: Vec<Frame>,
}

impl<'ctx> TreeBuilder<'ctx> {
    /// Create a builder with an empty tree
    pub fn new(ctx: &'ctx mut CompilationContext) -> Self {
        let tree = SyntaxTree::new();
        let current = tree.root();
        Self {
            ctx,
            tree,
            current,
            symbols: ProgramSymbolBuilder::new(),
            current_typedef: None,
            section: None,
            scope_flags: NodeFlags::empty(),
            frames: Vec::new(),
        }
    }

    /// Tree built so far
    #[must_use]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Innermost open node
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Symbol builder driven by this tree builder
    #[must_use]
    pub fn symbols(&self) -> &ProgramSymbolBuilder {
        &self.symbols
    }

    /// Close what is still open and hand over the tree
    pub fn finish(mut self) -> BuiltUnit {
        self.close_data_definitions(None);
        debug_assert!(
            self.current == self.tree.root(),
            "unit finished with open nodes"
        );
        BuiltUnit {
            programs: self.symbols.programs().to_vec(),
            tree: self.tree,
        }
    }

    fn flags(&self) -> NodeFlags {
        let mut flags = self.scope_flags;
        if let Some(section) = self.section {
            flags |= NodeFlags::for_section(section);
        }
        if self.current_typedef.is_some() {
            flags |= NodeFlags::INSIDE_TYPEDEF;
        }
        flags
    }

    /// Add `kind` under the current node and make it current
    fn enter(&mut self, kind: NodeKind) -> NodeId {
        let node = self.leaf(kind);
        self.current = node;
        node
    }

    /// Add `kind` under the current node
    fn leaf(&mut self, kind: NodeKind) -> NodeId {
        let flags = self.flags();
        let node = self.tree.add_child(self.current, kind);
        let entered = self.tree.get_mut(node);
        entered.flags = flags;
        entered.parent_typedef = self.current_typedef;
        trace!(node = %entered.kind.label(), "enter");
        node
    }

    fn exit(&mut self) -> Option<NodeId> {
        let node = self.current;
        let Some(parent) = self.tree.parent(node) else {
            debug_assert!(false, "exit from the root node");
            return None;
        };
        trace!(node = %self.tree.get(node).kind.label(), "exit");
        self.current = parent;
        Some(node)
    }

    /// Exit the innermost open node matching `is_target` and everything
    /// opened after it
    fn exit_through(&mut self, is_target: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.close_data_definitions(None);
        while self.current != self.tree.root() {
            let found = is_target(&self.tree.get(self.current).kind);
            let node = self.exit()?;
            if found {
                return Some(node);
            }
        }
        debug_assert!(false, "no matching open node");
        None
    }

    /// Exit open data definitions whose level is `level` or deeper; `None`
    /// exits all of them
    fn close_data_definitions(&mut self, level: Option<u8>) {
        while let Some(open) = self
            .tree
            .get(self.current)
            .data_definition()
            .map(DataDefinition::level)
        {
            if level.is_some_and(|level| open < level) {
                break;
            }
            self.exit_data_definition();
        }
    }

    fn exit_data_definition(&mut self) {
        let Some(node) = self.exit() else {
            return;
        };
        if self.current_typedef == Some(node) {
            self.current_typedef = None;
        }
        if self.tree.get(self.current).data_definition().is_some() {
            return;
        }
        self.symbols.on_level1_definition(self.ctx, &mut self.tree, node);
    }

    /// Nest a data entry at `level` according to the open entries
    fn enter_data_definition(&mut self, level: u8, kind: NodeKind) -> NodeId {
        let bound = match level {
            1 | LEVEL_INDEPENDENT => None,
            LEVEL_RENAMES => Some(RENAMES_NESTING_LEVEL),
            level => Some(level),
        };
        self.close_data_definitions(bound);
        self.enter(kind)
    }

    fn add_indexes(&mut self, node: NodeId, entry: &DataDescriptionEntry) {
        let Some(occurs) = entry.occurs.as_ref().filter(|occurs| !occurs.indexes.is_empty()) else {
            return;
        };
        for index in &occurs.indexes {
            self.leaf(NodeKind::IndexDefinition(index.clone()));
        }
        self.tree.get_mut(node).flags |= NodeFlags::CONTAINS_INDEX;
    }

    fn push_frame(&mut self, flags: NodeFlags) {
        self.frames.push(Frame {
            flags: self.scope_flags,
            section: self.section.take(),
            typedef: self.current_typedef.take(),
        });
        self.scope_flags = flags;
    }

    fn pop_frame(&mut self) {
        let frame = self.frames.pop();
        debug_assert!(frame.is_some(), "no saved frame");
        if let Some(frame) = frame {
            self.scope_flags = frame.flags;
            self.section = frame.section;
            self.current_typedef = frame.typedef;
        }
    }
}

impl EventHandler for TreeBuilder<'_> {
    fn start_program(&mut self, id: ProgramIdentification) {
        self.close_data_definitions(None);
        self.push_frame(NodeFlags::empty());
        let node = self.enter(NodeKind::Program(id));
        self.symbols.start_program(self.ctx, &mut self.tree, node);
    }

    fn end_program(&mut self, end: Option<ProgramEnd>) {
        self.close_data_definitions(None);
        while self.current != self.tree.root()
            && !matches!(self.tree.get(self.current).kind, NodeKind::Program(_))
        {
            self.exit();
        }
        match end {
            Some(end) => {
                self.leaf(NodeKind::ProgramEnd(end));
            }
            None => self.tree.get_mut(self.current).flags |= NodeFlags::MISSING_END_PROGRAM,
        }
        if self.exit().is_some() {
            self.symbols.end_program(self.ctx);
            self.pop_frame();
        }
    }

    fn start_data_division(&mut self, position: Position) {
        self.enter(NodeKind::DataDivision(position));
    }

    fn end_data_division(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::DataDivision(_)));
    }

    fn start_data_section(&mut self, section: StorageSection, header: SectionHeader) {
        self.close_data_definitions(None);
        self.section = Some(section);
        let node = self.enter(NodeKind::DataSection(section, header));
        if let Some(scope) = self.symbols.current_scope() {
            let scope = ScopeRef::new(scope, ScopeSlot::for_section(section));
            self.tree.get_mut(node).semantic = Some(SemanticData::Scope(scope));
        }
        self.symbols.start_data_section(section);
    }

    fn end_data_section(&mut self, section: StorageSection) {
        self.exit_through(|kind| matches!(kind, NodeKind::DataSection(open, _) if *open == section));
        self.symbols.end_data_section();
        self.section = None;
    }

    fn start_file_description_entry(&mut self, entry: FileDescriptionEntry) {
        self.close_data_definitions(None);
        self.enter(NodeKind::FileDescription(entry));
    }

    fn end_file_description_entry(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::FileDescription(_)));
    }

    fn start_data_description_entry(&mut self, entry: DataDescriptionEntry) {
        if entry.is_typedef() {
            self.start_typedef_entry(entry);
            return;
        }
        let node = self.enter_data_definition(entry.level, NodeKind::DataDescription(Box::new(entry.clone())));
        self.add_indexes(node, &entry);
    }

    fn start_data_redefines_entry(&mut self, entry: DataRedefinesEntry) {
        let level = entry.entry.level;
        let indexed = entry.entry.clone();
        let node = self.enter_data_definition(level, NodeKind::DataRedefines(Box::new(entry)));
        self.add_indexes(node, &indexed);
    }

    fn start_data_renames_entry(&mut self, entry: DataRenamesEntry) {
        self.enter_data_definition(LEVEL_RENAMES, NodeKind::DataRenames(entry));
    }

    fn start_data_condition_entry(&mut self, entry: DataConditionEntry) {
        self.enter_data_definition(LEVEL_CONDITION, NodeKind::DataCondition(entry));
    }

    fn start_typedef_entry(&mut self, entry: DataDescriptionEntry) {
        let level = entry.level;
        let indexed = entry.clone();
        let node = self.enter_data_definition(level, NodeKind::TypeDefinition(Box::new(entry)));
        if self.current_typedef.is_none() {
            self.current_typedef = Some(node);
        }
        self.add_indexes(node, &indexed);
    }

    fn start_procedure_division(&mut self, header: ProcedureDivisionHeader) {
        self.close_data_definitions(None);
        self.section = None;
        self.symbols.start_procedure_division(self.ctx, &header);
        self.enter(NodeKind::ProcedureDivision(Box::new(header)));
    }

    fn end_procedure_division(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::ProcedureDivision(_)));
    }

    fn start_declaratives(&mut self, position: Position) {
        self.enter(NodeKind::Declaratives(position));
    }

    fn end_declaratives(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::Declaratives(_)));
    }

    fn start_function_declaration(&mut self, header: FunctionDeclarationHeader) {
        self.close_data_definitions(None);
        let program = self
            .tree
            .ancestors(self.current)
            .find(|node| matches!(self.tree.get(*node).kind, NodeKind::Program(_)));
        if let Some(program) = program {
            self.tree.get_mut(program).flags |= NodeFlags::CONTAINS_PROCEDURE;
        }

        self.push_frame(NodeFlags::INSIDE_PROCEDURE);
        let parameters: Vec<_> = header
            .parameters()
            .map(|(direction, entry)| (direction, entry.clone()))
            .collect();
        let node = self.enter(NodeKind::FunctionDeclaration(Box::new(header)));
        for (direction, entry) in parameters {
            let parameter = self.leaf(NodeKind::ParameterDescription(Box::new(entry), direction));
            self.tree.get_mut(parameter).flags |= NodeFlags::LINKAGE_SECTION;
        }
        self.symbols.start_function(self.ctx, &mut self.tree, node);
    }

    fn end_function_declaration(&mut self) {
        if self
            .exit_through(|kind| matches!(kind, NodeKind::FunctionDeclaration(_)))
            .is_some()
        {
            self.symbols.end_function(self.ctx);
            self.pop_frame();
        }
    }

    fn start_section(&mut self, header: ProcedureSectionHeader) {
        let node = self.enter(NodeKind::Section(header));
        self.symbols.start_section(self.ctx, &mut self.tree, node);
    }

    fn end_section(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::Section(_)));
        self.symbols.end_section();
    }

    fn start_paragraph(&mut self, header: ParagraphHeader) {
        let node = self.enter(NodeKind::Paragraph(header));
        self.symbols.start_paragraph(self.ctx, &mut self.tree, node);
    }

    fn end_paragraph(&mut self) {
        self.exit_through(|kind| matches!(kind, NodeKind::Paragraph(_)));
    }

    fn statement(&mut self, statement: Statement) {
        self.leaf(NodeKind::Statement(statement));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_symbols::{SymbolKind, Type};
    use cb_syntax::{IndexName, TypedefClause};
    use expect_test::expect;

    fn at(line: u32) -> Position {
        Position::new(line, 8)
    }

    fn item(level: u8, name: &str, line: u32) -> DataDescriptionEntry {
        DataDescriptionEntry::new(level, name, at(line)).with_picture("X")
    }

    fn open_working_storage(builder: &mut TreeBuilder<'_>, name: &str) {
        builder.start_program(ProgramIdentification::new(name, at(1)));
        builder.start_data_division(at(2));
        builder.start_data_section(StorageSection::WorkingStorage, SectionHeader { position: at(3) });
    }

    fn close_working_storage(builder: &mut TreeBuilder<'_>) {
        builder.end_data_section(StorageSection::WorkingStorage);
        builder.end_data_division();
        builder.end_program(None);
    }

    #[test]
    fn test_level_numbers_drive_nesting() {
        let mut ctx = CompilationContext::default();
        let mut builder = TreeBuilder::new(&mut ctx);
        open_working_storage(&mut builder, "MAIN");
        builder.start_data_description_entry(DataDescriptionEntry::new(1, "A", at(4)));
        builder.start_data_description_entry(DataDescriptionEntry::new(5, "B", at(5)));
        builder.start_data_description_entry(item(10, "B1", 6));
        builder.start_data_description_entry(item(5, "C", 7));
        builder.start_data_description_entry(item(1, "D", 8));
        builder.start_data_description_entry(item(77, "E", 9));
        close_working_storage(&mut builder);
        let unit = builder.finish();

        expect![[r#"
            SourceFile
              Program MAIN
                DataDivision
                  WORKING-STORAGE SECTION
                    01 A
                      05 B
                        10 B1
                      05 C
                    01 D
                    77 E
        "#]]
        .assert_eq(&unit.tree.outline());
        assert!(
            unit.tree
                .get(unit.tree.children(unit.tree.root())[0])
                .flags
                .contains(NodeFlags::MISSING_END_PROGRAM)
        );
    }

    #[test]
    fn test_renames_and_conditions_attach_to_their_items() {
        let mut ctx = CompilationContext::default();
        let mut builder = TreeBuilder::new(&mut ctx);
        open_working_storage(&mut builder, "MAIN");
        builder.start_data_description_entry(DataDescriptionEntry::new(1, "REC", at(4)));
        builder.start_data_description_entry(DataDescriptionEntry::new(5, "GRP", at(5)));
        builder.start_data_description_entry(item(10, "FLAG", 6));
        builder.start_data_condition_entry(DataConditionEntry {
            name: "IS-ON".to_owned(),
            position: at(7),
            values: Vec::new(),
        });
        builder.start_data_condition_entry(DataConditionEntry {
            name: "IS-OFF".to_owned(),
            position: at(8),
            values: Vec::new(),
        });
        builder.start_data_renames_entry(DataRenamesEntry {
            name: "ALIAS".to_owned(),
            position: at(9),
            from: cb_syntax::SymbolReference::new("FLAG", at(9)),
            thru: None,
        });
        close_working_storage(&mut builder);
        let unit = builder.finish();

        expect![[r#"
            SourceFile
              Program MAIN
                DataDivision
                  WORKING-STORAGE SECTION
                    01 REC
                      05 GRP
                        10 FLAG
                          88 IS-ON
                          88 IS-OFF
                      66 ALIAS
        "#]]
        .assert_eq(&unit.tree.outline());
    }

    #[test]
    fn test_indexes_and_typedef_context() {
        let mut ctx = CompilationContext::default();
        let mut builder = TreeBuilder::new(&mut ctx);
        open_working_storage(&mut builder, "MAIN");
        builder.start_data_description_entry(
            DataDescriptionEntry::new(1, "POINT", at(4)).as_typedef(TypedefClause::default()),
        );
        builder.start_data_description_entry(item(5, "X", 5));
        builder.start_data_description_entry(
            item(1, "TABLE", 6)
                .with_occurs(1, 3)
                .indexed_by("IX", at(6)),
        );
        close_working_storage(&mut builder);
        let unit = builder.finish();

        let tree = &unit.tree;
        let point = tree.find_data("POINT")[0];
        let field = tree.find_data("X")[0];
        let table = tree.find_data("TABLE")[0];
        assert_eq!(tree.get(field).parent_typedef, Some(point));
        assert!(tree.get(field).flags.contains(NodeFlags::INSIDE_TYPEDEF));
        assert!(!tree.get(point).flags.contains(NodeFlags::INSIDE_TYPEDEF));
        assert_eq!(tree.get(table).parent_typedef, None);
        assert!(tree.get(table).flags.contains(NodeFlags::CONTAINS_INDEX | NodeFlags::WORKING_STORAGE));
        let index = tree.children(table)[0];
        assert_eq!(
            tree.get(index).kind,
            NodeKind::IndexDefinition(IndexName {
                name: "IX".to_owned(),
                position: at(6),
            })
        );

        let symbol = tree.get(table).symbol().map(|id| ctx.symbols.get(id));
        assert!(symbol.is_some_and(|symbol| matches!(symbol.ty, Some(Type::Array(_)))));
        let typedef = tree.get(point).symbol().map(|id| ctx.symbols.get(id).kind());
        assert_eq!(typedef, Some(SymbolKind::Typedef));
    }

    #[test]
    fn test_typedef_body_ends_with_its_header() {
        let mut ctx = CompilationContext::default();
        let mut builder = TreeBuilder::new(&mut ctx);
        open_working_storage(&mut builder, "MAIN");
        builder.start_data_description_entry(DataDescriptionEntry::new(1, "REC", at(4)));
        builder.start_data_description_entry(
            DataDescriptionEntry::new(5, "POINT", at(5)).as_typedef(TypedefClause::default()),
        );
        builder.start_data_description_entry(item(10, "PX", 6));
        builder.start_data_description_entry(item(5, "AFTER", 7));
        builder.start_data_description_entry(item(10, "DEEPER", 8));
        close_working_storage(&mut builder);
        let unit = builder.finish();

        let tree = &unit.tree;
        let point = tree.find_data("POINT")[0];
        let inside = tree.find_data("PX")[0];
        assert_eq!(tree.get(inside).parent_typedef, Some(point));
        assert!(tree.get(inside).flags.contains(NodeFlags::INSIDE_TYPEDEF));
        for name in ["AFTER", "DEEPER"] {
            let node = tree.get(tree.find_data(name)[0]);
            assert_eq!(node.parent_typedef, None);
            assert!(!node.flags.contains(NodeFlags::INSIDE_TYPEDEF));
        }
    }

    #[test]
    fn test_procedure_parameters_are_linkage() {
        let mut ctx = CompilationContext::default();
        let mut builder = TreeBuilder::new(&mut ctx);
        builder.start_program(ProgramIdentification::new("MAIN", at(1)));
        builder.start_procedure_division(ProcedureDivisionHeader::default());
        let mut header = FunctionDeclarationHeader::new("CHECK", at(3));
        header.input.push(item(1, "IN-DATE", 4));
        header.returning = Some(item(1, "RESULT", 5));
        builder.start_function_declaration(header);
        builder.start_procedure_division(ProcedureDivisionHeader::default());
        builder.statement(Statement {
            kind: cb_syntax::StatementKind::Goback,
            position: at(7),
        });
        builder.end_procedure_division();
        builder.end_function_declaration();
        builder.end_procedure_division();
        builder.end_program(Some(ProgramEnd {
            name: Some("MAIN".to_owned()),
            position: at(10),
        }));
        let unit = builder.finish();

        let tree = &unit.tree;
        let program = tree.children(tree.root())[0];
        assert!(tree.get(program).flags.contains(NodeFlags::CONTAINS_PROCEDURE));
        assert!(!tree.get(program).flags.contains(NodeFlags::MISSING_END_PROGRAM));
        let parameter = tree.find_data("IN-DATE")[0];
        assert!(
            tree.get(parameter)
                .flags
                .contains(NodeFlags::LINKAGE_SECTION | NodeFlags::INSIDE_PROCEDURE)
        );
        expect![[r#"
            SourceFile
              Program MAIN
                ProcedureDivision
                  Declare CHECK
                    Parameter IN-DATE
                    Parameter RESULT
                    ProcedureDivision
                      Goback
                End
        "#]]
        .assert_eq(&tree.outline());
        assert!(ctx.diagnostics.is_empty());
    }
}
