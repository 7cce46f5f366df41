//! TYPE reference linking
//!
//! Variables declared with a `TYPE` clause are collected while a unit is
//! built and linked once its outermost program is closed. The first time a
//! scope references a typedef, the typed fields of its body are linked into
//! that scope too, walking the typedef graph depth first with an explicit
//! path so that cycles are reported instead of followed.

use crate::context::CompilationContext;
use crate::error::SemanticError;
use cb_intern::Name;
use cb_span::Position;
use cb_symbols::{SymbolFlags, SymbolId, SymbolTable, Type, VariableData};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Links TYPE references against the typedefs visible from their scope
pub struct TypeLinker<'ctx> {
    ctx: &'ctx mut CompilationContext,
    /// TYPE clauses already looked up, misses included
    resolved: FxHashMap<SymbolId, Option<SymbolId>>,
    /// Fields whose TYPE clause closes a reported cycle
    cyclic: FxHashSet<SymbolId>,
}

impl<'ctx> TypeLinker<'ctx> {
    /// Create a linker reporting into `ctx`
    pub fn new(ctx: &'ctx mut CompilationContext) -> Self {
        Self {
            ctx,
            resolved: FxHashMap::default(),
            cyclic: FxHashSet::default(),
        }
    }

    /// Link variables typed outside of typedef bodies, then typedefs whose
    /// fields carry `OCCURS DEPENDING ON`
    pub fn link(&mut self, typed_outside_typedef: &[SymbolId], needs_type_linking: &[SymbolId]) {
        for variable in typed_outside_typedef {
            self.link_variable(*variable);
        }
        for typedef in needs_type_linking {
            if let Some(scope) = self.ctx.symbols.enclosing_scope(*typedef) {
                let mut path = Vec::new();
                self.link_typed_children(scope, *typedef, &mut path);
            }
            self.resolve_typedef_depending_on(*typedef);
        }
    }

    /// Bind the TYPE reference of `variable` and link the typedef's body the
    /// first time it is referenced from the variable's scope
    pub fn link_variable(&mut self, variable: SymbolId) {
        let Some(typedef) = self.resolve(variable) else {
            return;
        };
        self.bind(variable, typedef);
        let Some(scope) = self.ctx.symbols.enclosing_scope(variable) else {
            return;
        };
        let first = self.record_reference(scope, typedef, variable);
        debug!(
            variable = self.ctx.symbols.name(variable),
            typedef = self.ctx.symbols.name(typedef),
            first,
            "link variable"
        );
        if first {
            let mut path = Vec::new();
            self.link_typed_children(scope, typedef, &mut path);
        }
    }

    /// Link the typed fields of `typedef` into `scope`, descending into the
    /// typedefs `scope` references for the first time
    fn link_typed_children(&mut self, scope: SymbolId, typedef: SymbolId, path: &mut Vec<SymbolId>) {
        path.push(typedef);
        let children = self
            .ctx
            .symbols
            .get(typedef)
            .variable()
            .and_then(VariableData::typedef)
            .map(|data| data.typed_children.clone())
            .unwrap_or_default();

        for child in children {
            if self.cyclic.contains(&child) {
                continue;
            }
            let Some(target) = self.resolve_once(child) else {
                continue;
            };
            if let Some(start) = path.iter().position(|open| *open == target) {
                self.cyclic.insert(child);
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|open| self.ctx.symbols.name(*open).to_owned())
                    .collect();
                cycle.push(self.ctx.symbols.name(target).to_owned());
                debug!(?cycle, "circular type reference");
                let position = reference_position(self.ctx, child);
                self.ctx
                    .report(SemanticError::CircularTypeReference { cycle }, position);
                continue;
            }

            self.bind(child, target);
            if self.record_reference(scope, target, child) {
                self.link_typed_children(scope, target, path);
            }
        }
        path.pop();
    }

    /// [`Self::resolve`] for typedef fields, which are visited once per
    /// referencing scope but reported at most once
    fn resolve_once(&mut self, field: SymbolId) -> Option<SymbolId> {
        if let Some(resolved) = self.resolved.get(&field) {
            return *resolved;
        }
        let resolved = self.resolve(field);
        self.resolved.insert(field, resolved);
        resolved
    }

    /// Typedef named by the TYPE clause of `variable`, reporting misses
    fn resolve(&mut self, variable: SymbolId) -> Option<SymbolId> {
        let table = &self.ctx.symbols;
        let reference = table.get(variable).ty.as_ref()?.typedef_reference()?;
        let (name, position) = (reference.name, reference.position);
        let scope = table.enclosing_scope(variable)?;
        let candidates = table.resolve_type(scope, name);
        let text = table.interner().resolve(name).to_owned();

        let error = match candidates.as_slice() {
            [typedef] => return Some(*typedef),
            [] => SemanticError::UnresolvedType { name: text },
            _ => SemanticError::AmbiguousType {
                name: text,
                candidates: candidates.len(),
            },
        };
        self.ctx.report(error, position);
        None
    }

    fn bind(&mut self, variable: SymbolId, typedef: SymbolId) {
        let restriction = self.ctx.symbols.get(typedef).flags & SymbolFlags::RESTRICTION;
        let symbol = self.ctx.symbols.get_mut(variable);
        if let Some(reference) = symbol.ty.as_mut().and_then(Type::typedef_reference_mut) {
            reference.target = Some(typedef);
        }
        symbol.flags |= restriction;
    }

    /// Remember that `variable` references `typedef` from `scope`; true on the
    /// first reference
    fn record_reference(&mut self, scope: SymbolId, typedef: SymbolId, variable: SymbolId) -> bool {
        let Some(data) = self.ctx.symbols.get_mut(scope).scope_data_mut() else {
            return true;
        };
        let referencing = data.types_referenced.entry(typedef).or_default();
        let first = referencing.is_empty();
        if !referencing.contains(&variable) {
            referencing.push(variable);
        }
        first
    }

    /// Resolve `DEPENDING ON` objects of ordinary tables by name from their scope
    pub fn resolve_depending_on(&mut self, variables: &[SymbolId]) {
        for variable in variables {
            let table = &self.ctx.symbols;
            let Some((name, position)) = depending_on(table, *variable) else {
                continue;
            };
            let object = table.interner().resolve(name).to_owned();
            let found = table
                .enclosing_scope(*variable)
                .and_then(|scope| table.resolve_variable(scope, &object).first().copied());
            self.set_depending_on(*variable, found, object, position);
        }
    }

    /// Resolve `DEPENDING ON` objects inside `typedef` among its fields and the
    /// fields of the typedefs it references
    fn resolve_typedef_depending_on(&mut self, typedef: SymbolId) {
        let table = &self.ctx.symbols;
        let own = subordinates(table, typedef);
        let mut candidates = own.clone();
        for field in &own {
            let linked = table
                .get(*field)
                .ty
                .as_ref()
                .and_then(Type::typedef_reference)
                .and_then(|reference| reference.target);
            if let Some(linked) = linked {
                candidates.extend(subordinates(table, linked));
            }
        }

        let mut tables = vec![typedef];
        tables.extend(own);
        for variable in tables {
            let table = &self.ctx.symbols;
            let Some((name, position)) = depending_on(table, variable) else {
                continue;
            };
            let found = candidates
                .iter()
                .copied()
                .find(|candidate| table.get(*candidate).name == name);
            let object = table.interner().resolve(name).to_owned();
            self.set_depending_on(variable, found, object, position);
        }
    }

    fn set_depending_on(&mut self, variable: SymbolId, found: Option<SymbolId>, object: String, position: Position) {
        let Some(target) = found else {
            let level = self.ctx.options.unresolved_depending_on;
            let name = self.ctx.symbols.name(variable).to_owned();
            self.ctx
                .report_at(level, SemanticError::UnresolvedDependingOn { name, object }, position);
            return;
        };
        if let Some(Type::Array(array)) = &mut self.ctx.symbols.get_mut(variable).ty
            && let Some(depending) = &mut array.depending_on
        {
            depending.target = Some(target);
        }
    }
}

/// Unresolved `DEPENDING ON` object of `variable`, if it has one
fn depending_on(table: &SymbolTable, variable: SymbolId) -> Option<(Name, Position)> {
    let Some(Type::Array(array)) = &table.get(variable).ty else {
        return None;
    };
    array
        .depending_on
        .as_ref()
        .filter(|depending| depending.target.is_none())
        .map(|depending| (depending.name, depending.position))
}

/// Every item subordinate to `id`, in declaration order
fn subordinates(table: &SymbolTable, id: SymbolId) -> Vec<SymbolId> {
    let mut found = Vec::new();
    let mut stack: Vec<SymbolId> = table.fields(id).iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        found.push(current);
        stack.extend(table.fields(current).iter().rev().copied());
    }
    found
}

fn reference_position(ctx: &CompilationContext, variable: SymbolId) -> Position {
    let symbol = ctx.symbols.get(variable);
    symbol
        .ty
        .as_ref()
        .and_then(Type::typedef_reference)
        .map_or(symbol.position, |reference| reference.position)
}
