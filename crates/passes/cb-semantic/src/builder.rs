//! Program symbol table construction
//!
//! [`ProgramSymbolBuilder`] is driven by the tree builder: it is told when a
//! program, section, procedure or paragraph starts and when a top-level data
//! definition has been fully read. Data definitions are converted to symbols
//! recursively from their tree node, so a group is only converted once all of
//! its subordinate entries are known.

use crate::context::CompilationContext;
use crate::error::SemanticError;
use crate::linker::TypeLinker;
use crate::renames;
use cb_symbols::{
    ArrayType, DependingOn, GroupType, ParagraphData, Picture, PictureType, ProgramSignature,
    RenamesData, Scope, ScopeRef, ScopeSlot, Symbol, SymbolData, SymbolFlags, SymbolId, SymbolKind,
    SymbolTable, Type, TypedefData, TypedefType, UsageFormat, VariableData, VariableKind,
    VariableValue,
};
use cb_syntax::{
    AccessModifier, CallParameter, DataConditionEntry, DataDescriptionEntry, DataRedefinesEntry,
    DataRenamesEntry, LEVEL_CONDITION, LEVEL_RENAMES, ProcedureDivisionHeader, StorageSection,
    SymbolReference,
};
use cb_tree::{NodeId, NodeKind, SemanticData, SyntaxTree};
use tracing::{debug, trace};

/// A level-66 entry waiting for its record to be complete
#[derive(Debug)]
struct PendingRenames {
    symbol: SymbolId,
    entry: DataRenamesEntry,
}

/// Builds the symbols of one compilation unit
#[derive(Debug, Default)]
pub struct ProgramSymbolBuilder {
    /// Top-level programs of the unit, in declaration order
    programs: Vec<SymbolId>,
    open_programs: Vec<SymbolId>,
    /// Programs and declared procedures, innermost last
    scopes: Vec<SymbolId>,
    section: Option<StorageSection>,
    procedure_section: Option<SymbolId>,
    pending_renames: Vec<PendingRenames>,
    typed_outside_typedef: Vec<SymbolId>,
    needs_type_linking: Vec<SymbolId>,
    pending_depending_on: Vec<SymbolId>,
}

impl ProgramSymbolBuilder {
    /// Create a builder with no open program
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level programs built so far, duplicates included
    #[must_use]
    pub fn programs(&self) -> &[SymbolId] {
        &self.programs
    }

    /// Innermost open program or procedure
    #[must_use]
    pub fn current_scope(&self) -> Option<SymbolId> {
        self.scopes.last().copied()
    }

    /// Data division section being read
    #[must_use]
    pub fn section(&self) -> Option<StorageSection> {
        self.section
    }

    /// Create the symbol of the program opened by `node`
    pub fn start_program(&mut self, ctx: &mut CompilationContext, tree: &mut SyntaxTree, node: NodeId) {
        let NodeKind::Program(identification) = &tree.get(node).kind else {
            debug_assert!(false, "start_program on a node that is not a program");
            return;
        };
        let text = identification.name.clone();
        let position = identification.position;
        let name = ctx.symbols.intern(&text);
        let mut symbol = Symbol::new(name, position, SymbolData::Program(Box::default()));
        symbol.ty = Some(Type::Program(ProgramSignature::default()));

        let (program, duplicate) = match self.open_programs.last().copied() {
            Some(parent) => {
                symbol.owner = Some(parent);
                symbol.flags |= SymbolFlags::NESTED_PROGRAM;
                let program = ctx.symbols.alloc(symbol);
                let siblings = ScopeRef::new(parent, ScopeSlot::Programs);
                let duplicate = ctx
                    .symbols
                    .scope(siblings)
                    .is_some_and(|scope| !scope.lookup(name).is_empty());
                if duplicate {
                    if let Some(data) = ctx.symbols.get_mut(parent).scope_data_mut() {
                        data.duplicates.push(program);
                    }
                } else {
                    ctx.symbols.enter(siblings, program);
                    ctx.symbols.register_scope_symbol(program);
                }
                (program, duplicate)
            }
            None => {
                let root = ctx.symbols.root();
                symbol.owner = Some(root);
                symbol.flags |= if self.programs.is_empty() {
                    SymbolFlags::MAIN_PROGRAM
                } else {
                    SymbolFlags::STACKED_PROGRAM
                };
                let duplicate = self
                    .programs
                    .iter()
                    .any(|program| ctx.symbols.get(*program).name == name);
                let program = ctx.symbols.alloc(symbol);
                if !duplicate {
                    ctx.symbols.enter(ScopeRef::new(root, ScopeSlot::Programs), program);
                    ctx.symbols.register_scope_symbol(program);
                }
                self.programs.push(program);
                (program, duplicate)
            }
        };

        if duplicate {
            ctx.report(SemanticError::DuplicateProgram { name: text.clone() }, position);
        }
        debug!(program = %text, nested = self.open_programs.len(), duplicate, "start program");
        bind(tree, node, program);
        self.open_programs.push(program);
        self.scopes.push(program);
        self.section = None;
        self.procedure_section = None;
    }

    /// Close the innermost program
    ///
    /// Closing the outermost program links every TYPE reference of the unit
    /// and resolves the pending `DEPENDING ON` objects.
    pub fn end_program(&mut self, ctx: &mut CompilationContext) {
        let closed = self.open_programs.pop();
        debug_assert!(closed.is_some(), "end_program without an open program");
        while let Some(scope) = self.scopes.pop() {
            if Some(scope) == closed {
                break;
            }
        }
        self.section = None;
        self.procedure_section = None;
        self.pending_renames.clear();

        if self.open_programs.is_empty() {
            let typed = std::mem::take(&mut self.typed_outside_typedef);
            let needs_linking = std::mem::take(&mut self.needs_type_linking);
            let depending = std::mem::take(&mut self.pending_depending_on);
            let mut linker = TypeLinker::new(ctx);
            linker.link(&typed, &needs_linking);
            linker.resolve_depending_on(&depending);
        }
    }

    /// Enter a data division section
    pub fn start_data_section(&mut self, section: StorageSection) {
        self.section = Some(section);
    }

    /// Leave the current data division section
    pub fn end_data_section(&mut self) {
        self.section = None;
    }

    /// Create a declared procedure and its parameters
    ///
    /// Parameters are the `ParameterDescription` children of `node`; they are
    /// entered into the procedure's LINKAGE scope before its body is read.
    pub fn start_function(&mut self, ctx: &mut CompilationContext, tree: &mut SyntaxTree, node: NodeId) {
        let NodeKind::FunctionDeclaration(header) = &tree.get(node).kind else {
            debug_assert!(false, "start_function on a node that is not a declaration");
            return;
        };
        let Some(program) = self.current_scope() else {
            return;
        };
        let mut symbol = Symbol::new(
            ctx.symbols.intern(&header.name),
            header.position,
            SymbolData::Function(Box::default()),
        );
        symbol.owner = Some(program);
        symbol.flags |= match header.visibility {
            AccessModifier::Public => SymbolFlags::PUBLIC,
            AccessModifier::Private => SymbolFlags::PRIVATE,
        };
        let function = ctx.symbols.alloc(symbol);
        ctx.symbols.enter(ScopeRef::new(program, ScopeSlot::Functions), function);
        ctx.symbols.register_scope_symbol(function);
        bind(tree, node, function);
        self.scopes.push(function);

        let saved = self.section.replace(StorageSection::Linkage);
        let linkage = ScopeRef::new(function, ScopeSlot::Linkage);
        let mut signature = ProgramSignature::default();
        for child in tree.children(node).to_vec() {
            let NodeKind::ParameterDescription(_, direction) = &tree.get(child).kind else {
                continue;
            };
            let direction = *direction;
            let Some(parameter) = self.data_definition_to_symbol(ctx, tree, child, Some(linkage), None) else {
                continue;
            };
            ctx.symbols.get_mut(parameter).flags |=
                direction.map_or(SymbolFlags::RETURNING, SymbolFlags::for_direction);
            match direction {
                Some(_) => signature.usings.push(parameter),
                None => signature.returning = Some(parameter),
            }
        }
        ctx.symbols.get_mut(function).ty = Some(Type::Program(signature));
        self.section = saved;
        debug!(function = ctx.symbols.name(function), "declared procedure");
    }

    /// Close the innermost declared procedure
    pub fn end_function(&mut self, ctx: &CompilationContext) {
        let closed = self.scopes.pop();
        debug_assert!(
            closed.is_some_and(|id| ctx.symbols.get(id).kind() == SymbolKind::Function),
            "end_function without an open procedure"
        );
        self.section = None;
        self.procedure_section = None;
    }

    /// Resolve the `USING` and `RETURNING` parameters of the current program
    pub fn start_procedure_division(&mut self, ctx: &mut CompilationContext, header: &ProcedureDivisionHeader) {
        self.section = None;
        let Some(scope) = self.current_scope() else {
            return;
        };
        // Procedures get their signature from the declaration header.
        if ctx.symbols.get(scope).kind() != SymbolKind::Program {
            return;
        }

        let mut signature = ProgramSignature::default();
        for parameter in &header.using {
            if let Some(variable) = resolve_parameter(ctx, scope, parameter) {
                signature.usings.push(variable);
            }
        }
        if let Some(returning) = &header.returning {
            let parameter = CallParameter::by_reference(returning.clone());
            if let Some(variable) = resolve_parameter(ctx, scope, &parameter) {
                ctx.symbols.get_mut(variable).flags |= SymbolFlags::RETURNING;
                signature.returning = Some(variable);
            }
        }
        ctx.symbols.get_mut(scope).ty = Some(Type::Program(signature));
    }

    /// Create a procedure section symbol
    pub fn start_section(&mut self, ctx: &mut CompilationContext, tree: &mut SyntaxTree, node: NodeId) {
        let NodeKind::Section(header) = &tree.get(node).kind else {
            return;
        };
        let Some(scope) = self.current_scope() else {
            return;
        };
        let mut symbol = Symbol::new(ctx.symbols.intern(&header.name), header.position, SymbolData::Section);
        symbol.owner = Some(scope);
        let section = ctx.symbols.alloc(symbol);
        ctx.symbols.enter(ScopeRef::new(scope, ScopeSlot::Sections), section);
        bind(tree, node, section);
        self.procedure_section = Some(section);
    }

    /// Leave the current procedure section
    pub fn end_section(&mut self) {
        self.procedure_section = None;
    }

    /// Create a paragraph symbol attached to the current procedure section
    pub fn start_paragraph(&mut self, ctx: &mut CompilationContext, tree: &mut SyntaxTree, node: NodeId) {
        let NodeKind::Paragraph(header) = &tree.get(node).kind else {
            return;
        };
        let Some(scope) = self.current_scope() else {
            return;
        };
        let mut symbol = Symbol::new(
            ctx.symbols.intern(&header.name),
            header.position,
            SymbolData::Paragraph(ParagraphData {
                section: self.procedure_section,
            }),
        );
        symbol.owner = Some(self.procedure_section.unwrap_or(scope));
        let paragraph = ctx.symbols.alloc(symbol);
        ctx.symbols.enter(ScopeRef::new(scope, ScopeSlot::Paragraphs), paragraph);
        bind(tree, node, paragraph);
    }

    /// Convert a complete top-level data definition
    ///
    /// Level-66 entries collected while converting are validated once the
    /// whole record is known.
    pub fn on_level1_definition(&mut self, ctx: &mut CompilationContext, tree: &mut SyntaxTree, node: NodeId) {
        self.pending_renames.clear();
        let Some(scope) = self.current_scope() else {
            return;
        };
        if matches!(tree.get(node).kind, NodeKind::TypeDefinition(_)) {
            self.create_typedef(ctx, tree, node, scope);
        } else {
            let parent = self
                .section
                .map(|section| ScopeRef::new(scope, ScopeSlot::for_section(section)));
            self.data_definition_to_symbol(ctx, tree, node, parent, None);
        }

        for pending in std::mem::take(&mut self.pending_renames) {
            renames::validate(ctx, pending.symbol, &pending.entry);
        }
    }

    /// Convert the data definition `node` into a symbol entered into `parent`
    ///
    /// `typedef` is the typedef whose body is being converted, if any. A
    /// typedef header met outside of a typedef body is deferred and yields
    /// `None`, as does a node that declares no data.
    pub fn data_definition_to_symbol(
        &mut self,
        ctx: &mut CompilationContext,
        tree: &mut SyntaxTree,
        node: NodeId,
        parent: Option<ScopeRef>,
        typedef: Option<SymbolId>,
    ) -> Option<SymbolId> {
        let placement = Placement { parent, typedef };
        let symbol = match tree.get(node).kind.clone() {
            NodeKind::TypeDefinition(_) if typedef.is_none() => return None,
            NodeKind::DataDescription(entry)
            | NodeKind::TypeDefinition(entry)
            | NodeKind::ParameterDescription(entry, _) => {
                self.create_variable(ctx, tree, node, &entry, VariableKind::Plain, placement)
            }
            NodeKind::DataRedefines(redefines) => {
                let target = redefines_target(ctx, &redefines, parent);
                let kind = VariableKind::Redefines { target };
                self.create_variable(ctx, tree, node, &redefines.entry, kind, placement)
            }
            NodeKind::DataRenames(entry) => self.create_renames(ctx, entry, placement),
            NodeKind::DataCondition(entry) => self.create_condition(ctx, entry, placement),
            _ => return None,
        };
        bind(tree, node, symbol);
        Some(symbol)
    }

    fn create_typedef(
        &mut self,
        ctx: &mut CompilationContext,
        tree: &mut SyntaxTree,
        node: NodeId,
        scope: SymbolId,
    ) -> Option<SymbolId> {
        let NodeKind::TypeDefinition(entry) = tree.get(node).kind.clone() else {
            return None;
        };
        let restriction = entry.typedef.unwrap_or_default().restriction;
        let kind = VariableKind::Typedef(TypedefData {
            restriction,
            typed_children: Vec::new(),
        });
        let placement = Placement {
            parent: Some(ScopeRef::new(scope, ScopeSlot::Types)),
            typedef: None,
        };
        let typedef = self.create_variable(ctx, tree, node, &entry, kind, placement);
        bind(tree, node, typedef);
        debug!(typedef = ctx.symbols.name(typedef), ?restriction, "declared typedef");
        Some(typedef)
    }

    fn create_variable(
        &mut self,
        ctx: &mut CompilationContext,
        tree: &mut SyntaxTree,
        node: NodeId,
        entry: &DataDescriptionEntry,
        kind: VariableKind,
        placement: Placement,
    ) -> SymbolId {
        let declared = declared_flags(entry, &kind);
        let is_typedef = matches!(kind, VariableKind::Typedef(_));
        let mut data = VariableData::new(entry.level, kind);
        data.value = entry.value.clone().map(VariableValue::Initial);
        let name = ctx.symbols.intern(entry.display_name());
        let id = ctx
            .symbols
            .alloc(Symbol::new(name, entry.position, SymbolData::Variable(data)));
        self.decorate(ctx, id, Some(entry), placement);
        ctx.symbols.get_mut(id).flags |= declared;

        let body = if is_typedef { Some(id) } else { placement.typedef };
        self.build_type(ctx, tree, node, id, entry, body);
        self.wrap_array(ctx, id, entry, body);

        if let Some(parent) = placement.parent {
            ctx.symbols.enter(parent, id);
        }
        if is_typedef {
            ctx.symbols.register_type(id);
        } else {
            if placement.typedef.is_none() {
                self.store_in_universe(ctx, id);
            }
            self.handle_indexes(ctx, tree, node, id, placement);
        }
        trace!(
            name = entry.display_name(),
            level = entry.level,
            kind = %ctx.symbols.get(id).kind(),
            "data symbol"
        );
        id
    }

    fn create_renames(&mut self, ctx: &mut CompilationContext, entry: DataRenamesEntry, placement: Placement) -> SymbolId {
        let data = RenamesData {
            from: ctx.symbols.intern(&entry.from.name),
            thru: entry.thru.as_ref().map(|thru| ctx.symbols.intern(&thru.name)),
            range: None,
        };
        let symbol = Symbol::new(
            ctx.symbols.intern(&entry.name),
            entry.position,
            SymbolData::Variable(VariableData::new(LEVEL_RENAMES, VariableKind::Renames(data))),
        );
        let id = ctx.symbols.alloc(symbol);
        self.decorate(ctx, id, None, placement);
        if let Some(parent) = placement.parent {
            ctx.symbols.enter(parent, id);
        }
        if placement.typedef.is_none() {
            self.store_in_universe(ctx, id);
        }
        self.pending_renames.push(PendingRenames { symbol: id, entry });
        id
    }

    fn create_condition(
        &mut self,
        ctx: &mut CompilationContext,
        entry: DataConditionEntry,
        placement: Placement,
    ) -> SymbolId {
        let mut data = VariableData::new(LEVEL_CONDITION, VariableKind::Plain);
        data.value = Some(VariableValue::Conditions(entry.values));
        let mut symbol = Symbol::new(
            ctx.symbols.intern(&entry.name),
            entry.position,
            SymbolData::Variable(data),
        );
        symbol.ty = Some(Type::Level88);
        let id = ctx.symbols.alloc(symbol);
        self.decorate(ctx, id, None, placement);
        if let Some(parent) = placement.parent {
            ctx.symbols.enter(parent, id);
        }
        if placement.typedef.is_none() {
            self.store_in_universe(ctx, id);
        }
        id
    }

    /// Set owner and context flags of a freshly allocated data symbol
    fn decorate(
        &self,
        ctx: &mut CompilationContext,
        id: SymbolId,
        entry: Option<&DataDescriptionEntry>,
        placement: Placement,
    ) {
        let owner = placement
            .parent
            .map(|parent| parent.owner)
            .or_else(|| self.current_scope());
        let (owner_flags, owner_is_scope) = owner.map_or((SymbolFlags::empty(), true), |owner| {
            let symbol = ctx.symbols.get(owner);
            (symbol.flags, symbol.is_abstract_scope())
        });

        let symbol = ctx.symbols.get_mut(id);
        let section = match (placement.typedef, symbol.kind()) {
            (None, kind) if kind != SymbolKind::Typedef => self.section.map(SymbolFlags::for_section),
            _ => None,
        };
        let mut flags = section.unwrap_or_else(SymbolFlags::empty);
        match entry {
            None => {
                if !owner_is_scope {
                    flags |= owner_flags & SymbolFlags::VISIBILITY;
                }
            }
            Some(entry) => {
                let may_be_global = section.is_some_and(|section| section != SymbolFlags::GLOBAL_STORAGE);
                if (entry.is_global || owner_flags.contains(SymbolFlags::GLOBAL)) && may_be_global {
                    flags |= SymbolFlags::GLOBAL;
                }
                if !owner_is_scope {
                    flags |= owner_flags & (SymbolFlags::PUBLIC | SymbolFlags::PRIVATE);
                }
                flags.set(SymbolFlags::BLANK_WHEN_ZERO, entry.blank_when_zero);
                flags.set(SymbolFlags::JUSTIFIED, entry.justified);
                flags.set(SymbolFlags::SYNC, entry.synchronized);
                flags.set(SymbolFlags::SIGN_SEPARATE, entry.sign_separate);
                flags.set(SymbolFlags::EXTERNAL, entry.is_external);
                flags.set(SymbolFlags::GROUP_USAGE_NATIONAL, entry.group_usage_national);
                flags.set(SymbolFlags::HAS_ATOMIC_VALUE, entry.value.is_some());
            }
        }
        if placement.typedef.is_some() {
            flags |= SymbolFlags::IN_TYPEDEF;
        }
        symbol.owner = owner;
        symbol.flags |= flags;
    }

    fn build_type(
        &mut self,
        ctx: &mut CompilationContext,
        tree: &mut SyntaxTree,
        node: NodeId,
        id: SymbolId,
        entry: &DataDescriptionEntry,
        typedef: Option<SymbolId>,
    ) {
        let children: Vec<NodeId> = tree
            .children(node)
            .iter()
            .copied()
            .filter(|child| tree.get(*child).data_definition().is_some())
            .collect();

        if !children.is_empty() {
            ctx.symbols.get_mut(id).ty = Some(Type::Group(GroupType {
                fields: Scope::new(),
                leading: None,
                owner: id,
            }));
            for child in children {
                self.data_definition_to_symbol(ctx, tree, child, Some(ScopeRef::fields(id)), typedef);
            }
            let leading = elementary_type(ctx, entry);
            if let Some(Type::Group(group)) = &mut ctx.symbols.get_mut(id).ty {
                group.leading = leading.map(Box::new);
            }
            return;
        }

        if let Some(ty) = elementary_type(ctx, entry) {
            ctx.symbols.get_mut(id).ty = Some(ty);
        } else if let Some(reference) = &entry.user_type {
            ctx.symbols.get_mut(id).ty = Some(Type::Typedef(TypedefType {
                name: ctx.symbols.intern(&reference.name),
                position: reference.position,
                target: None,
            }));
            match typedef {
                Some(typedef) => {
                    if let Some(data) = ctx
                        .symbols
                        .get_mut(typedef)
                        .variable_mut()
                        .and_then(VariableData::typedef_mut)
                    {
                        data.typed_children.push(id);
                    }
                }
                None => self.typed_outside_typedef.push(id),
            }
        } else {
            let level = ctx.options.untyped_placeholders;
            let name = entry.display_name().to_owned();
            ctx.report_at(level, SemanticError::UntypedDataItem { name }, entry.position);
        }
    }

    fn wrap_array(
        &mut self,
        ctx: &mut CompilationContext,
        id: SymbolId,
        entry: &DataDescriptionEntry,
        typedef: Option<SymbolId>,
    ) {
        let Some(occurs) = entry.occurs.as_ref().filter(|occurs| occurs.max > 1) else {
            return;
        };
        let depending_on = occurs.depending_on.as_ref().map(|object| DependingOn {
            name: ctx.symbols.intern(&object.name),
            position: object.position,
            target: None,
        });
        let has_depending_on = depending_on.is_some();
        let symbol = ctx.symbols.get_mut(id);
        let Some(element) = symbol.ty.take() else {
            return;
        };
        symbol.ty = Some(Type::Array(ArrayType {
            element: Box::new(element),
            min: occurs.min,
            max: occurs.max,
            depending_on,
        }));

        if has_depending_on {
            match typedef {
                Some(typedef) => {
                    if !self.needs_type_linking.contains(&typedef) {
                        self.needs_type_linking.push(typedef);
                    }
                }
                None => self.pending_depending_on.push(id),
            }
        }
    }

    /// Create the `INDEXED BY` symbols of `indexed` next to it
    fn handle_indexes(
        &mut self,
        ctx: &mut CompilationContext,
        tree: &mut SyntaxTree,
        node: NodeId,
        indexed: SymbolId,
        placement: Placement,
    ) {
        let Some(parent) = placement.parent else {
            return;
        };
        for child in tree.children(node).to_vec() {
            let NodeKind::IndexDefinition(index) = &tree.get(child).kind else {
                continue;
            };
            let indexed_symbol = ctx.symbols.get(indexed);
            let inherited =
                indexed_symbol.flags & (SymbolFlags::GLOBAL | SymbolFlags::SECTION_ORIGIN | SymbolFlags::IN_TYPEDEF);
            let level = indexed_symbol.level().unwrap_or_default();
            let owner = indexed_symbol.owner;
            let mut symbol = Symbol::new(
                ctx.symbols.intern(&index.name),
                index.position,
                SymbolData::Variable(VariableData::new(level, VariableKind::Index { indexed })),
            );
            symbol.owner = owner;
            symbol.flags = inherited;
            symbol.ty = Some(Type::Usage(UsageFormat::Index));
            let id = ctx.symbols.alloc(symbol);
            ctx.symbols.enter(parent, id);
            if placement.typedef.is_none() {
                self.store_in_universe(ctx, id);
            }
            bind(tree, child, id);
        }
    }

    fn store_in_universe(&self, ctx: &mut CompilationContext, id: SymbolId) {
        if let Some(scope) = self.current_scope() {
            ctx.symbols.add_to_domain(scope, id);
        }
        ctx.symbols.add_to_universe(id);
    }
}

/// Where a data symbol is being created
#[derive(Debug, Clone, Copy)]
struct Placement {
    parent: Option<ScopeRef>,
    typedef: Option<SymbolId>,
}

fn bind(tree: &mut SyntaxTree, node: NodeId, symbol: SymbolId) {
    tree.get_mut(node).semantic = Some(SemanticData::Symbol(symbol));
}

/// Flags implied by the kind of entry rather than by where it is declared
fn declared_flags(entry: &DataDescriptionEntry, kind: &VariableKind) -> SymbolFlags {
    match kind {
        VariableKind::Redefines { .. } => SymbolFlags::REDEFINES,
        VariableKind::Typedef(typedef) => {
            let mut flags = SymbolFlags::for_restriction(typedef.restriction);
            match entry.typedef.and_then(|clause| clause.visibility) {
                Some(AccessModifier::Public) => flags |= SymbolFlags::PUBLIC,
                Some(AccessModifier::Private) => flags |= SymbolFlags::PRIVATE,
                None => {}
            }
            flags.set(SymbolFlags::GLOBAL, entry.is_global);
            flags
        }
        _ => SymbolFlags::empty(),
    }
}

/// Usage or picture type declared directly by `entry`
fn elementary_type(ctx: &mut CompilationContext, entry: &DataDescriptionEntry) -> Option<Type> {
    if let Some(text) = &entry.picture {
        return match Picture::parse(text) {
            Ok(picture) => Some(Type::Picture(PictureType {
                picture,
                usage: entry.usage.map_or(UsageFormat::Display, UsageFormat::from),
                sign_separate: entry.sign_separate,
            })),
            Err(reason) => {
                let error = SemanticError::InvalidPicture {
                    name: entry.display_name().to_owned(),
                    picture: text.clone(),
                    reason,
                };
                ctx.report(error, entry.position);
                None
            }
        };
    }
    entry.usage.map(|usage| Type::Usage(usage.into()))
}

/// Resolve the item redefined by `redefines` among the siblings already in `parent`
fn redefines_target(
    ctx: &mut CompilationContext,
    redefines: &DataRedefinesEntry,
    parent: Option<ScopeRef>,
) -> Option<SymbolId> {
    let name = redefines.entry.display_name().to_owned();
    let reference = &redefines.redefines;
    let Some(parent) = parent else {
        ctx.report(SemanticError::RedefinesNotAllowedHere { name }, reference.position);
        return None;
    };
    match find_redefined(&ctx.symbols, parent, redefines.entry.level, &reference.name) {
        Ok(target) => Some(target),
        Err(problem) => {
            let target = reference.name.clone();
            let error = match problem {
                RedefinesProblem::Unresolved => SemanticError::UnresolvedRedefinesTarget { name, target },
                RedefinesProblem::Ambiguous => SemanticError::AmbiguousRedefinesTarget { name, target },
                RedefinesProblem::NotPreceding => SemanticError::RedefinesNotImmediatelyPreceding { name, target },
            };
            ctx.report(error, reference.position);
            None
        }
    }
}

enum RedefinesProblem {
    Unresolved,
    Ambiguous,
    NotPreceding,
}

fn find_redefined(
    table: &SymbolTable,
    parent: ScopeRef,
    level: u8,
    target: &str,
) -> Result<SymbolId, RedefinesProblem> {
    let Some(scope) = table.scope(parent) else {
        return Err(RedefinesProblem::Unresolved);
    };
    let candidates = table
        .interner()
        .get(target)
        .map_or(&[][..], |name| scope.lookup(name));
    if candidates.is_empty() {
        return Err(RedefinesProblem::Unresolved);
    }

    // The last sibling that is not itself a REDEFINES, and the chain of
    // REDEFINES declared after it.
    let mut chain = Vec::new();
    let mut preceding = None;
    for sibling in scope.ordered().iter().rev() {
        let symbol = table.get(*sibling);
        if matches!(symbol.kind(), SymbolKind::Index | SymbolKind::Renames)
            || symbol.level() == Some(LEVEL_CONDITION)
        {
            continue;
        }
        if symbol.flags.contains(SymbolFlags::REDEFINES) {
            chain.push(*sibling);
            continue;
        }
        preceding = Some(*sibling);
        break;
    }

    if let Some(preceding) = preceding.filter(|preceding| candidates.contains(preceding)) {
        return if table.get(preceding).level() == Some(level) {
            Ok(preceding)
        } else {
            Err(RedefinesProblem::NotPreceding)
        };
    }
    if candidates.len() > 1 {
        return Err(RedefinesProblem::Ambiguous);
    }
    if chain.contains(&candidates[0]) {
        return Ok(candidates[0]);
    }
    Err(RedefinesProblem::NotPreceding)
}

/// Look a `USING`/`RETURNING` name up in LINKAGE and flag it
fn resolve_parameter(
    ctx: &mut CompilationContext,
    scope: SymbolId,
    parameter: &CallParameter,
) -> Option<SymbolId> {
    let found = lookup_linkage(&ctx.symbols, scope, &parameter.target);
    let Some(variable) = found else {
        let level = ctx.options.unresolved_using;
        let name = parameter.target.name.clone();
        ctx.report_at(level, SemanticError::UnresolvedUsingParameter { name }, parameter.target.position);
        return None;
    };
    let mut flags = SymbolFlags::for_sharing(parameter.sharing.unwrap_or_default());
    if let Some(direction) = parameter.direction {
        flags |= SymbolFlags::for_direction(direction);
    }
    ctx.symbols.get_mut(variable).flags |= flags;
    Some(variable)
}

fn lookup_linkage(table: &SymbolTable, scope: SymbolId, reference: &SymbolReference) -> Option<SymbolId> {
    let name = table.interner().get(&reference.name)?;
    table
        .scope(ScopeRef::new(scope, ScopeSlot::Linkage))?
        .lookup(name)
        .first()
        .copied()
}
