//! Level-66 RENAMES validation
//!
//! A RENAMES entry is checked once the record it follows is complete. The
//! record is laid out in declaration order to find the renamed items, check
//! that they are in order and outside of any table, and compute the renamed
//! byte range.

use crate::context::CompilationContext;
use crate::error::SemanticError;
use crate::options::ReportLevel;
use cb_symbols::{RenamesType, SymbolId, SymbolKind, SymbolTable, Type, VariableKind};
use cb_syntax::{DataRenamesEntry, LEVEL_CONDITION, LEVEL_INDEPENDENT, LEVEL_RENAMES, SymbolReference};
use rustc_hash::FxHashMap;
use tracing::trace;

/// One item of a record in declaration order
#[derive(Debug, Clone, Copy)]
struct Item {
    id: SymbolId,
    depth: usize,
    offset: u32,
    size: Option<u32>,
    in_table: bool,
}

/// Declaration-order layout of a record and its subordinate items
#[derive(Debug, Default)]
struct Layout {
    items: Vec<Item>,
}

impl Layout {
    fn of(table: &SymbolTable, record: SymbolId) -> Self {
        let mut layout = Self::default();
        let mut offsets = FxHashMap::default();
        let size = table.get(record).ty.as_ref().and_then(|ty| ty.size(table));
        layout.items.push(Item {
            id: record,
            depth: 0,
            offset: 0,
            size,
            in_table: is_table(table, record),
        });
        offsets.insert(record, 0);
        layout.visit(table, record, 1, 0, is_table(table, record), &mut offsets);
        layout
    }

    fn visit(
        &mut self,
        table: &SymbolTable,
        group: SymbolId,
        depth: usize,
        start: u32,
        in_table: bool,
        offsets: &mut FxHashMap<SymbolId, u32>,
    ) {
        let mut cursor = start;
        for field in table.fields(group) {
            let symbol = table.get(*field);
            let Some(variable) = symbol.variable() else {
                continue;
            };
            let (offset, advances) = match &variable.kind {
                VariableKind::Index { .. } => continue,
                VariableKind::Renames(_) => (cursor, false),
                VariableKind::Redefines { target } => {
                    let offset = target
                        .and_then(|target| offsets.get(&target).copied())
                        .unwrap_or(cursor);
                    (offset, false)
                }
                VariableKind::Plain | VariableKind::Typedef(_) => {
                    (cursor, variable.level != LEVEL_CONDITION)
                }
            };
            let size = if advances || matches!(variable.kind, VariableKind::Redefines { .. }) {
                symbol.ty.as_ref().and_then(|ty| ty.size(table))
            } else {
                Some(0)
            };
            let nested_in_table = in_table || is_table(table, *field);
            offsets.insert(*field, offset);
            self.items.push(Item {
                id: *field,
                depth,
                offset,
                size,
                in_table: nested_in_table,
            });
            self.visit(table, *field, depth + 1, offset, nested_in_table, offsets);
            if advances {
                cursor = cursor.saturating_add(size.unwrap_or_default());
            }
        }
    }

    fn position(&self, id: SymbolId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Index of the last item subordinate to the item at `index`
    fn subtree_end(&self, index: usize) -> usize {
        let depth = self.items[index].depth;
        self.items[index + 1..]
            .iter()
            .position(|item| item.depth <= depth)
            .map_or(self.items.len() - 1, |offset| index + offset)
    }
}

fn is_table(table: &SymbolTable, id: SymbolId) -> bool {
    table.get(id).ty.as_ref().is_some_and(Type::is_array)
}

/// Validate `renames` against the record it follows and store its range
pub(crate) fn validate(ctx: &mut CompilationContext, renames: SymbolId, entry: &DataRenamesEntry) {
    let table = &ctx.symbols;
    let record = table.top_level_variable(renames);
    let is_group = record != renames
        && table
            .get(record)
            .ty
            .as_ref()
            .is_some_and(|ty| ty.as_group().is_some());
    if !is_group {
        let name = entry.name.clone();
        ctx.report(SemanticError::RenamesNotAGroup { name }, entry.position);
        return;
    }

    let layout = Layout::of(table, record);
    let Some(own) = layout.position(renames) else {
        return;
    };
    let Some(from) = resolve(ctx, &layout, entry, &entry.from) else {
        return;
    };
    let thru = match &entry.thru {
        Some(reference) => match resolve(ctx, &layout, entry, reference) {
            Some(index) => Some(index),
            None => return,
        },
        None => None,
    };

    let level = ctx.options.renames_forward_references;
    let mut references = vec![(from, &entry.from)];
    if let (Some(index), Some(reference)) = (thru, &entry.thru) {
        references.push((index, reference));
    }
    for (index, reference) in references {
        if index <= own {
            continue;
        }
        let error = SemanticError::RenamesForwardReference {
            name: entry.name.clone(),
            target: reference.name.clone(),
        };
        ctx.report_at(level, error, reference.position);
        if level == ReportLevel::Error {
            return;
        }
    }

    let last = thru.unwrap_or(from);
    if last < from {
        let error = SemanticError::RenamesOrderViolation {
            name: entry.name.clone(),
            from: entry.from.name.clone(),
            thru: entry.thru.as_ref().map_or_else(String::new, |thru| thru.name.clone()),
        };
        ctx.report(error, entry.position);
        return;
    }

    let end = layout.subtree_end(last);
    let table = &ctx.symbols;
    if let Some(item) = layout.items[from..=end].iter().find(|item| item.in_table) {
        let error = SemanticError::RenamesSpansOccurs {
            name: entry.name.clone(),
            item: table.name(item.id).to_owned(),
        };
        ctx.report(error, entry.position);
        return;
    }

    let start = layout.items[from];
    let last_item = layout.items[last];
    let length = layout.items[from..=end]
        .iter()
        .all(|item| item.size.is_some())
        .then(|| last_item.offset.checked_add(last_item.size.unwrap_or_default()))
        .flatten()
        .map(|finish| finish.saturating_sub(start.offset));
    let range = RenamesType {
        from: start.id,
        thru: thru.map(|index| layout.items[index].id),
        offset: start.offset,
        length,
    };
    trace!(renames = %entry.name, offset = range.offset, ?length, "renames range");
    if let Some(VariableKind::Renames(data)) = ctx
        .symbols
        .get_mut(renames)
        .variable_mut()
        .map(|variable| &mut variable.kind)
    {
        data.range = Some(range);
    }
}

/// Index in `layout` of the item named by `reference`
fn resolve(
    ctx: &mut CompilationContext,
    layout: &Layout,
    entry: &DataRenamesEntry,
    reference: &SymbolReference,
) -> Option<usize> {
    let table = &ctx.symbols;
    let matches: Vec<usize> = layout
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| table.name(item.id) == reference.name)
        .map(|(index, _)| index)
        .collect();

    let error = match matches.as_slice() {
        [] => SemanticError::UnknownRenamedSymbol {
            name: entry.name.clone(),
            target: reference.name.clone(),
        },
        [index] => {
            let symbol = table.get(layout.items[*index].id);
            let level = symbol.level().unwrap_or_default();
            let renamable = symbol.kind() != SymbolKind::Renames
                && !matches!(level, 1 | LEVEL_RENAMES | LEVEL_INDEPENDENT | LEVEL_CONDITION);
            if renamable {
                return Some(*index);
            }
            SemanticError::InvalidRenamesLevel {
                name: entry.name.clone(),
                target: reference.name.clone(),
                level,
            }
        }
        _ => SemanticError::AmbiguousRenamedSymbol {
            name: entry.name.clone(),
            target: reference.name.clone(),
        },
    };
    ctx.report(error, reference.position);
    None
}
