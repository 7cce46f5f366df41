//! The root symbol table: arena, root namespace, builtins and the variable universe

use crate::domain::{Domain, Scope};
use crate::flags::SymbolFlags;
use crate::symbol::{
    NamespaceData, ScopeRef, ScopeSlot, Symbol, SymbolData, SymbolId, SymbolKind, TypedefData,
    VariableData, VariableKind,
};
use crate::types::{Type, UsageFormat};
use cb_arena::{Arena, SlotVec};
use cb_intern::{Interner, Name};
use cb_span::Position;
use tracing::debug;

/// Name of the root namespace
pub const ROOT_NAME: &str = "<<Root>>";
/// Name of the variable occupying universe index 0
pub const BOTTOM_NAME: &str = "<<BottomVariable>>";

/// Builtin typedefs registered in the root namespace
pub const BUILTIN_TYPES: [(&str, UsageFormat); 8] = [
    ("Omitted", UsageFormat::None),
    ("Alphabetic", UsageFormat::Display),
    ("Numeric", UsageFormat::Display),
    ("NumericEdited", UsageFormat::Display),
    ("Alphanumeric", UsageFormat::Display),
    ("AlphanumericEdited", UsageFormat::Display),
    ("DBCS", UsageFormat::Display1),
    ("FloatingPoint", UsageFormat::Comp1),
];

/// Owner of every symbol built for every compilation unit
///
/// Scopes store [`SymbolId`] handles; the arena here is the only owner of
/// symbol values. The table also keeps two flat domains used for fast lookup
/// across units (scopes and types) and the variable universe, whose slots are
/// recycled when a program is removed.
#[derive(Debug)]
pub struct SymbolTable {
    interner: Interner,
    symbols: Arena<Symbol>,
    root: SymbolId,
    bottom: SymbolId,
    scope_domain: Domain<SymbolId>,
    type_domain: Domain<SymbolId>,
    universe: SlotVec<SymbolId>,
}

impl SymbolTable {
    /// Create a table holding the root namespace, the bottom variable and builtins
    #[must_use]
    pub fn new(interner: Interner) -> Self {
        let mut symbols = Arena::new();
        let root = symbols.alloc(Symbol::new(
            interner.intern(ROOT_NAME),
            Position::synthetic(),
            SymbolData::Root(NamespaceData::default()),
        ));
        let mut bottom_symbol = Symbol::new(
            interner.intern(BOTTOM_NAME),
            Position::synthetic(),
            SymbolData::Variable(VariableData::new(1, VariableKind::Plain)),
        );
        bottom_symbol.owner = Some(root);
        let bottom = symbols.alloc(bottom_symbol);

        let mut table = Self {
            interner,
            symbols,
            root,
            bottom,
            scope_domain: Domain::new(),
            type_domain: Domain::new(),
            universe: SlotVec::new(),
        };
        table.add_to_universe(bottom);
        table.load_builtins();
        table
    }

    fn load_builtins(&mut self) {
        for (name, usage) in BUILTIN_TYPES {
            let mut symbol = Symbol::new(
                self.interner.intern(name),
                Position::synthetic(),
                SymbolData::Variable(VariableData::new(
                    1,
                    VariableKind::Typedef(TypedefData::default()),
                )),
            );
            symbol.flags = SymbolFlags::BUILTIN_TYPE | SymbolFlags::PUBLIC | SymbolFlags::WEAK_TYPEDEF;
            symbol.owner = Some(self.root);
            symbol.ty = Some(Type::Usage(usage));
            let id = self.alloc(symbol);
            self.enter(ScopeRef::new(self.root, ScopeSlot::Types), id);
            self.register_type(id);
        }
    }

    /// Interner shared with every unit
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Intern `text`
    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Text of a symbol's name
    #[must_use]
    pub fn name(&self, id: SymbolId) -> &str {
        self.interner.resolve(self.symbols[id].name)
    }

    /// Root namespace
    #[must_use]
    pub fn root(&self) -> SymbolId {
        self.root
    }

    /// Variable at universe index 0
    #[must_use]
    pub fn bottom(&self) -> SymbolId {
        self.bottom
    }

    /// Store a new symbol
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.alloc(symbol)
    }

    /// Symbol behind `id`
    #[must_use]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    /// Mutable symbol behind `id`
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    /// Every symbol ever allocated, removed ones included
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter()
    }

    /// Scope at `scope`, if the owner has such a slot
    #[must_use]
    pub fn scope(&self, scope: ScopeRef) -> Option<&Scope<SymbolId>> {
        let owner = &self.symbols[scope.owner];
        match (&owner.data, scope.slot) {
            (_, ScopeSlot::Fields) => owner.ty.as_ref()?.as_group().map(|group| &group.fields),
            (SymbolData::Root(namespace) | SymbolData::Namespace(namespace), slot) => {
                namespace.slot(slot)
            }
            (SymbolData::Program(data) | SymbolData::Function(data), slot) => data.slot(slot),
            _ => None,
        }
    }

    /// Mutable scope at `scope`
    pub fn scope_mut(&mut self, scope: ScopeRef) -> Option<&mut Scope<SymbolId>> {
        let owner = &mut self.symbols[scope.owner];
        match (&mut owner.data, scope.slot) {
            (_, ScopeSlot::Fields) => owner
                .ty
                .as_mut()?
                .as_group_mut()
                .map(|group| &mut group.fields),
            (SymbolData::Root(namespace) | SymbolData::Namespace(namespace), slot) => {
                namespace.slot_mut(slot)
            }
            (SymbolData::Program(data) | SymbolData::Function(data), slot) => data.slot_mut(slot),
            _ => None,
        }
    }

    /// Enter `id` into `scope` under its own name
    ///
    /// Returns `false` when the owner has no such scope.
    pub fn enter(&mut self, scope: ScopeRef, id: SymbolId) -> bool {
        let name = self.symbols[id].name;
        self.scope_mut(scope).map(|target| target.enter(name, id)).is_some()
    }

    /// Add a variable to the flat domain of a program or function
    pub fn add_to_domain(&mut self, scope: SymbolId, variable: SymbolId) {
        let name = self.symbols[variable].name;
        if let Some(data) = self.symbols[scope].scope_data_mut() {
            data.domain.enter(name, variable);
        }
    }

    /// Make a namespace, program or function findable through [`Self::lookup_scope`]
    pub fn register_scope_symbol(&mut self, id: SymbolId) {
        let name = self.symbols[id].name;
        self.scope_domain.enter(name, id);
    }

    /// Make a typedef findable through [`Self::lookup_type`]
    pub fn register_type(&mut self, id: SymbolId) {
        let name = self.symbols[id].name;
        self.type_domain.enter(name, id);
    }

    /// Give a variable a slot in the universe
    pub fn add_to_universe(&mut self, variable: SymbolId) -> u32 {
        let index = self.universe.insert(variable);
        if let Some(data) = self.symbols[variable].variable_mut() {
            data.universe_index = Some(index);
        }
        index
    }

    /// Free the universe slot of a variable
    pub fn remove_from_universe(&mut self, variable: SymbolId) {
        let index = self.symbols[variable]
            .variable_mut()
            .and_then(|data| data.universe_index.take());
        if let Some(index) = index {
            self.universe.remove(index);
        }
    }

    /// Variable stored at universe `index`
    #[must_use]
    pub fn universe_variable(&self, index: u32) -> Option<SymbolId> {
        self.universe.get(index).copied()
    }

    /// Number of live universe slots
    #[must_use]
    pub fn universe_len(&self) -> usize {
        self.universe.len()
    }

    /// Number of universe slots ever allocated
    #[must_use]
    pub fn universe_capacity(&self) -> usize {
        self.universe.capacity()
    }

    /// Namespaces, programs and functions named `name`
    #[must_use]
    pub fn lookup_scope(&self, name: &str) -> &[SymbolId] {
        self.interner
            .get(name)
            .map_or(&[], |name| self.scope_domain.lookup(name))
    }

    /// Typedefs named `name`, builtins included
    #[must_use]
    pub fn lookup_type(&self, name: &str) -> &[SymbolId] {
        self.interner
            .get(name)
            .map_or(&[], |name| self.type_domain.lookup(name))
    }

    /// Nearest namespace, program or function strictly enclosing `id`
    #[must_use]
    pub fn enclosing_scope(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.symbols[id].owner;
        while let Some(candidate) = current {
            if self.symbols[candidate].is_abstract_scope() {
                return Some(candidate);
            }
            current = self.symbols[candidate].owner;
        }
        None
    }

    /// Whether `program` is nested in another program
    #[must_use]
    pub fn is_nested(&self, program: SymbolId) -> bool {
        self.symbols[program]
            .owner
            .is_some_and(|owner| self.symbols[owner].kind() == SymbolKind::Program)
    }

    /// Outermost data item containing `id`, `id` itself at level 01/77
    #[must_use]
    pub fn top_level_variable(&self, id: SymbolId) -> SymbolId {
        let mut current = id;
        while let Some(owner) = self.symbols[current].owner {
            if self.symbols[owner].variable().is_none() {
                break;
            }
            current = owner;
        }
        current
    }

    /// Fields of a group item in declaration order
    #[must_use]
    pub fn fields(&self, id: SymbolId) -> &[SymbolId] {
        self.scope(ScopeRef::fields(id)).map_or(&[], Scope::ordered)
    }

    /// Typedefs named `name` visible from the scope `from`
    ///
    /// The nearest scope with a match wins. Types of the enclosing programs of
    /// a nested program are only visible when declared `GLOBAL`, `PUBLIC` or
    /// `PRIVATE`; builtins are always visible.
    #[must_use]
    pub fn resolve_type(&self, from: SymbolId, name: Name) -> Vec<SymbolId> {
        let mut current = Some(from);
        let mut left_program = false;
        while let Some(scope) = current {
            let symbol = &self.symbols[scope];
            let found: Vec<SymbolId> = match &symbol.data {
                SymbolData::Program(data) | SymbolData::Function(data) => data
                    .types
                    .lookup(name)
                    .iter()
                    .copied()
                    .filter(|typedef| {
                        !left_program || self.symbols[*typedef].flags.intersects(SymbolFlags::VISIBILITY)
                    })
                    .collect(),
                SymbolData::Root(namespace) | SymbolData::Namespace(namespace) => {
                    namespace.types.lookup(name).to_vec()
                }
                _ => Vec::new(),
            };
            if !found.is_empty() {
                return found;
            }
            if symbol.kind() == SymbolKind::Program {
                left_program = true;
            }
            current = symbol.owner;
        }
        Vec::new()
    }

    /// Variables named `name` visible from the scope `from`
    ///
    /// Variables of the scope itself are all visible. Beyond it only `GLOBAL`
    /// items and GLOBAL-STORAGE items of enclosing programs are.
    #[must_use]
    pub fn resolve_variable(&self, from: SymbolId, name: &str) -> Vec<SymbolId> {
        let Some(name) = self.interner.get(name) else {
            return Vec::new();
        };
        let mut current = Some(from);
        let mut outer = false;
        while let Some(scope) = current {
            let symbol = &self.symbols[scope];
            if let Some(data) = symbol.scope_data() {
                let found: Vec<SymbolId> = data
                    .domain
                    .lookup(name)
                    .iter()
                    .copied()
                    .filter(|variable| {
                        !outer
                            || self.symbols[*variable]
                                .flags
                                .intersects(SymbolFlags::GLOBAL | SymbolFlags::GLOBAL_STORAGE)
                    })
                    .collect();
                if !found.is_empty() {
                    return found;
                }
                outer = true;
            }
            current = symbol.owner;
        }
        Vec::new()
    }

    /// Every symbol owned, directly or not, by `id`
    fn owned_symbols(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut owned = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            owned.push(current);
            let symbol = &self.symbols[current];
            if let Some(data) = symbol.scope_data() {
                stack.extend(data.owned());
            }
            if let Some(group) = symbol.ty.as_ref().and_then(Type::as_group) {
                stack.extend(group.fields.ordered().iter().copied());
            }
        }
        owned
    }

    /// Detach a program and everything it owns
    ///
    /// The program leaves its owner's Programs scope, its programs and functions
    /// leave the scope domain, its typedefs leave the type domain and the universe
    /// slots of its variables are freed for reuse. Returns the number of symbols
    /// detached.
    pub fn remove_program(&mut self, program: SymbolId) -> usize {
        if self.symbols[program].is_removed() {
            return 0;
        }
        let name = self.symbols[program].name;
        if let Some(owner) = self.symbols[program].owner
            && let Some(programs) = self.scope_mut(ScopeRef::new(owner, ScopeSlot::Programs))
        {
            programs.delete(name, program);
        }

        let owned = self.owned_symbols(program);
        for id in &owned {
            let symbol_name = self.symbols[*id].name;
            match self.symbols[*id].kind() {
                SymbolKind::Program | SymbolKind::Function | SymbolKind::Namespace => {
                    self.scope_domain.delete(symbol_name, *id);
                }
                SymbolKind::Typedef => {
                    self.type_domain.delete(symbol_name, *id);
                }
                _ => {}
            }
            self.remove_from_universe(*id);
            self.symbols[*id].flags |= SymbolFlags::REMOVED;
        }
        debug!(
            program = self.name(program),
            symbols = owned.len(),
            "removed program"
        );
        owned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(table: &mut SymbolTable, name: &str, owner: SymbolId) -> SymbolId {
        let mut symbol = Symbol::new(
            table.intern(name),
            Position::new(1, 8),
            SymbolData::Program(Box::default()),
        );
        symbol.owner = Some(owner);
        let id = table.alloc(symbol);
        table.enter(ScopeRef::new(owner, ScopeSlot::Programs), id);
        table.register_scope_symbol(id);
        id
    }

    fn variable(table: &mut SymbolTable, name: &str, owner: SymbolId, flags: SymbolFlags) -> SymbolId {
        let mut symbol = Symbol::new(
            table.intern(name),
            Position::new(2, 8),
            SymbolData::Variable(VariableData::new(1, VariableKind::Plain)),
        );
        symbol.owner = Some(owner);
        symbol.flags = flags;
        let id = table.alloc(symbol);
        table.enter(ScopeRef::new(owner, ScopeSlot::WorkingStorage), id);
        table.add_to_domain(owner, id);
        table.add_to_universe(id);
        id
    }

    #[test]
    fn test_builtins_and_bottom() {
        let table = SymbolTable::new(Interner::new());
        assert_eq!(table.universe_variable(0), Some(table.bottom()));
        for (name, _) in BUILTIN_TYPES {
            let found = table.lookup_type(name);
            assert_eq!(found.len(), 1, "builtin {name} should be registered once");
            assert!(table.get(found[0]).flags.contains(SymbolFlags::BUILTIN_TYPE));
        }
        assert!(table.lookup_type("Level88").is_empty());
    }

    #[test]
    fn test_lookup_scope_unknown_is_empty() {
        let table = SymbolTable::new(Interner::new());
        assert!(table.lookup_scope("NOWHERE").is_empty());
    }

    #[test]
    fn test_nested_visibility() {
        let mut table = SymbolTable::new(Interner::new());
        let root = table.root();
        let outer = program(&mut table, "OUTER", root);
        let inner = program(&mut table, "INNER", outer);
        let shared = variable(&mut table, "SHARED", outer, SymbolFlags::GLOBAL | SymbolFlags::WORKING_STORAGE);
        variable(&mut table, "HIDDEN", outer, SymbolFlags::WORKING_STORAGE);

        assert!(table.is_nested(inner));
        assert_eq!(table.resolve_variable(inner, "SHARED"), vec![shared]);
        assert!(table.resolve_variable(inner, "HIDDEN").is_empty());
        assert_eq!(table.resolve_variable(outer, "HIDDEN").len(), 1);
    }

    #[test]
    fn test_remove_program_recycles_universe() {
        let mut table = SymbolTable::new(Interner::new());
        let root = table.root();
        let first = program(&mut table, "PGM", root);
        variable(&mut table, "A", first, SymbolFlags::WORKING_STORAGE);
        variable(&mut table, "B", first, SymbolFlags::WORKING_STORAGE);
        let capacity = table.universe_capacity();

        for _ in 0..10 {
            let removed = table.lookup_scope("PGM").to_vec();
            for id in removed {
                table.remove_program(id);
            }
            assert!(table.lookup_scope("PGM").is_empty());
            let again = program(&mut table, "PGM", root);
            variable(&mut table, "A", again, SymbolFlags::WORKING_STORAGE);
            variable(&mut table, "B", again, SymbolFlags::WORKING_STORAGE);
        }

        assert_eq!(table.universe_capacity(), capacity);
        assert_eq!(table.universe_len(), 3);
        assert!(table.get(first).is_removed());
    }
}
