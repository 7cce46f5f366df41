//! COBOL-like text rendering of a program's symbols

use crate::flags::SymbolFlags;
use crate::symbol::{SymbolId, SymbolKind, VariableKind};
use crate::table::SymbolTable;
use crate::types::{Type, UsageFormat};
use cb_syntax::{RestrictionLevel, StorageSection};
use std::fmt::Write;

impl SymbolTable {
    /// Render `program` and its nested programs
    ///
    /// Useful for snapshot tests and debugging; the layout follows the
    /// divisions of the source program.
    #[must_use]
    pub fn dump(&self, program: SymbolId) -> String {
        let mut out = String::new();
        self.dump_program(&mut out, program);
        out
    }

    fn dump_program(&self, out: &mut String, program: SymbolId) {
        let name = self.name(program);
        let _ = writeln!(out, "IDENTIFICATION DIVISION.");
        let _ = writeln!(out, "PROGRAM-ID. {name}.");
        let Some(data) = self.get(program).scope_data() else {
            return;
        };

        let sections: Vec<_> = StorageSection::ALL
            .into_iter()
            .map(|section| (section, data.slot(crate::ScopeSlot::for_section(section))))
            .filter_map(|(section, scope)| scope.filter(|scope| !scope.is_empty()).map(|scope| (section, scope)))
            .collect();
        if !data.types.is_empty() || !sections.is_empty() {
            let _ = writeln!(out, "DATA DIVISION.");
            for typedef in data.types.ordered() {
                self.dump_variable(out, *typedef, 0);
            }
            for (section, scope) in sections {
                let _ = writeln!(out, "{}.", section.keyword());
                for variable in scope.ordered() {
                    self.dump_variable(out, *variable, 0);
                }
            }
        }

        let _ = writeln!(out, "PROCEDURE DIVISION{}.", self.signature(program));
        for function in data.functions.ordered() {
            let _ = writeln!(out, "DECLARE {}{}.", self.name(*function), self.signature(*function));
            if let Some(function_data) = self.get(*function).scope_data() {
                for parameter in function_data.linkage.ordered() {
                    self.dump_variable(out, *parameter, 1);
                }
            }
            let _ = writeln!(out, "END-DECLARE.");
        }
        for nested in data.programs.ordered() {
            self.dump_program(out, *nested);
        }
        let _ = writeln!(out, "END PROGRAM {name}.");
    }

    fn signature(&self, scope: SymbolId) -> String {
        let mut text = String::new();
        if let Some(Type::Program(signature)) = &self.get(scope).ty {
            if !signature.usings.is_empty() {
                text.push_str(" USING");
                for parameter in &signature.usings {
                    let _ = write!(text, " {}", self.name(*parameter));
                }
            }
            if let Some(returning) = signature.returning {
                let _ = write!(text, " RETURNING {}", self.name(returning));
            }
        }
        text
    }

    fn dump_variable(&self, out: &mut String, id: SymbolId, depth: usize) {
        let symbol = self.get(id);
        let Some(variable) = symbol.variable() else {
            return;
        };
        if symbol.kind() == SymbolKind::Index {
            return;
        }

        let _ = write!(out, "{}{:02} {}", "  ".repeat(depth), variable.level, self.name(id));
        match &variable.kind {
            VariableKind::Typedef(typedef) => {
                out.push_str(" TYPEDEF");
                match typedef.restriction {
                    RestrictionLevel::Strict => out.push_str(" STRICT"),
                    RestrictionLevel::Strong => out.push_str(" STRONG"),
                    RestrictionLevel::Weak => {}
                }
            }
            VariableKind::Redefines { target: Some(target) } => {
                let _ = write!(out, " REDEFINES {}", self.name(*target));
            }
            VariableKind::Renames(renames) => {
                let _ = write!(out, " RENAMES {}", self.interner().resolve(renames.from));
                if let Some(thru) = renames.thru {
                    let _ = write!(out, " THRU {}", self.interner().resolve(thru));
                }
            }
            VariableKind::Plain | VariableKind::Redefines { target: None } | VariableKind::Index { .. } => {}
        }
        if let Some(ty) = &symbol.ty {
            self.write_type(out, ty);
        }
        if symbol.flags.contains(SymbolFlags::GLOBAL) {
            out.push_str(" GLOBAL");
        }
        out.push_str(".\n");

        for field in self.fields(id) {
            self.dump_variable(out, *field, depth + 1);
        }
    }

    fn write_type(&self, out: &mut String, ty: &Type) {
        match ty {
            Type::Usage(UsageFormat::None) | Type::Level88 | Type::Program(_) => {}
            Type::Usage(usage) => {
                let _ = write!(out, " USAGE {usage}");
            }
            Type::Picture(picture) => {
                let _ = write!(out, " PIC {}", picture.picture);
                if picture.usage != UsageFormat::Display {
                    let _ = write!(out, " USAGE {}", picture.usage);
                }
            }
            Type::Group(group) => {
                if let Some(leading) = &group.leading {
                    self.write_type(out, leading);
                }
            }
            Type::Array(array) => {
                self.write_type(out, &array.element);
                if array.min == array.max {
                    let _ = write!(out, " OCCURS {}", array.max);
                } else {
                    let _ = write!(out, " OCCURS {} TO {}", array.min, array.max);
                }
                if let Some(depending_on) = &array.depending_on {
                    let _ = write!(out, " DEPENDING ON {}", self.interner().resolve(depending_on.name));
                }
            }
            Type::Typedef(reference) => {
                let _ = write!(out, " TYPE {}", self.interner().resolve(reference.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrayType, Picture, PictureType, ScopeRef, ScopeSlot, Symbol, SymbolData, VariableData};
    use cb_intern::Interner;
    use cb_span::Position;
    use expect_test::expect;

    fn picture(text: &str, usage: UsageFormat) -> Type {
        Type::Picture(PictureType {
            picture: Picture::parse(text).expect("valid picture"),
            usage,
            sign_separate: false,
        })
    }

    fn working_storage(table: &mut SymbolTable, program: SymbolId, name: &str, ty: Type) -> SymbolId {
        let mut symbol = Symbol::new(
            table.intern(name),
            Position::new(4, 8),
            SymbolData::Variable(VariableData::new(1, VariableKind::Plain)),
        );
        symbol.owner = Some(program);
        symbol.ty = Some(ty);
        let id = table.alloc(symbol);
        table.enter(ScopeRef::new(program, ScopeSlot::WorkingStorage), id);
        id
    }

    #[test]
    fn test_dump_working_storage() {
        let mut table = SymbolTable::new(Interner::new());
        let root = table.root();
        let mut symbol = Symbol::new(
            table.intern("LEDGER"),
            Position::new(1, 8),
            SymbolData::Program(Box::default()),
        );
        symbol.owner = Some(root);
        let program = table.alloc(symbol);
        table.enter(ScopeRef::new(root, ScopeSlot::Programs), program);

        let code = working_storage(&mut table, program, "CODE-TEXT", picture("X(3)", UsageFormat::Display));
        table.get_mut(code).flags |= SymbolFlags::GLOBAL;
        let amounts = Type::Array(ArrayType {
            element: Box::new(picture("S9(5)V99", UsageFormat::Comp3)),
            min: 12,
            max: 12,
            depending_on: None,
        });
        working_storage(&mut table, program, "AMOUNTS", amounts);

        expect![[r#"
            IDENTIFICATION DIVISION.
            PROGRAM-ID. LEDGER.
            DATA DIVISION.
            WORKING-STORAGE SECTION.
            01 CODE-TEXT PIC X(3) GLOBAL.
            01 AMOUNTS PIC S9(5)V99 USAGE COMP-3 OCCURS 12.
            PROCEDURE DIVISION.
            END PROGRAM LEDGER.
        "#]]
        .assert_eq(&table.dump(program));
    }
}
