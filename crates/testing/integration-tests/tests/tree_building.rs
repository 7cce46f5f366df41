//! Level-driven nesting of the program tree and the symbols hanging off it

use cb_symbols::{ScopeRef, ScopeSlot, SymbolFlags, SymbolKind};
use cb_syntax::{DataDescriptionEntry, StatementKind, StorageSection};
use cb_tree::NodeFlags;
use expect_test::expect;
use integration_tests::{UnitScript, build};

#[test]
fn test_level_stack_closes_groups() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .group(1, "A")
            .pic(5, "B", "X")
            .pic(5, "C", "X")
            .pic(1, "D", "X")
            .end_working_storage()
            .end_program("MAIN"),
    );
    let tree = &session.unit.tree;
    let a = tree.find_data("A")[0];
    let b = tree.find_data("B")[0];
    let c = tree.find_data("C")[0];
    let d = tree.find_data("D")[0];
    assert_eq!(tree.parent(d), tree.parent(a));
    assert_eq!(tree.children(a), &[b, c]);
    assert!(tree.children(d).is_empty());

    let symbols = session.symbols();
    let [sa, sb, sc, sd] = ["A", "B", "C", "D"].map(|name| session.symbol(name).unwrap());
    assert_eq!(symbols.fields(sa), &[sb, sc]);
    assert!(symbols.fields(sd).is_empty());
    assert_eq!(symbols.get(sb).owner, Some(sa));

    let program = session.scope("MAIN").unwrap();
    let storage = symbols
        .scope(ScopeRef::new(program, ScopeSlot::WorkingStorage))
        .unwrap();
    assert_eq!(storage.ordered(), &[sa, sd]);
    assert!(session.unit.diagnostics.is_empty());
}

#[test]
fn test_full_program_outline() {
    let session = build(
        UnitScript::new()
            .program("PAYROLL")
            .data_division()
            .section(StorageSection::File)
            .file_description("EMPLOYEES")
            .group(1, "EMP-REC")
            .pic(5, "EMP-ID", "9(6)")
            .pic(5, "EMP-NAME", "X(30)")
            .end_file_description()
            .end_section(StorageSection::File)
            .section(StorageSection::WorkingStorage)
            .pic(1, "WS-STATUS", "XX")
            .condition("WS-OK")
            .group(1, "WS-TOTALS")
            .pic(5, "WS-GROSS", "9(7)")
            .pic(5, "WS-NET", "9(7)")
            .renames("WS-AMOUNTS", "WS-GROSS", Some("WS-NET"))
            .pic(77, "WS-COUNT", "9(4)")
            .end_section(StorageSection::WorkingStorage)
            .end_data_division()
            .procedure_division()
            .procedure_section("MAIN-LOGIC")
            .paragraph("START-UP")
            .statement(StatementKind::Display)
            .statement(StatementKind::Perform)
            .end_paragraph()
            .end_procedure_section()
            .end_procedure_division()
            .end_program("PAYROLL"),
    );

    expect![[r#"
        SourceFile
          Program PAYROLL
            DataDivision
              FILE SECTION
                FD EMPLOYEES
                  01 EMP-REC
                    05 EMP-ID
                    05 EMP-NAME
              WORKING-STORAGE SECTION
                01 WS-STATUS
                  88 WS-OK
                01 WS-TOTALS
                  05 WS-GROSS
                  05 WS-NET
                  66 WS-AMOUNTS
                77 WS-COUNT
            ProcedureDivision
              Section MAIN-LOGIC
                Paragraph START-UP
                  Display
                  Perform
            End
    "#]]
    .assert_eq(&session.unit.tree.outline());
    assert!(session.unit.diagnostics.is_empty());

    let tree = &session.unit.tree;
    let record = tree.find_data("EMP-REC")[0];
    assert!(tree.get(record).flags.contains(NodeFlags::FILE_SECTION));
    let symbols = session.symbols();
    let record = session.symbol("EMP-REC").unwrap();
    assert!(symbols.get(record).flags.contains(SymbolFlags::FILE_SECTION));

    let program = session.scope("PAYROLL").unwrap();
    let paragraphs = symbols
        .scope(ScopeRef::new(program, ScopeSlot::Paragraphs))
        .unwrap();
    let [paragraph] = paragraphs.ordered() else {
        panic!("expected one paragraph");
    };
    let section = symbols
        .scope(ScopeRef::new(program, ScopeSlot::Sections))
        .unwrap()
        .ordered()[0];
    assert_eq!(symbols.get(*paragraph).kind(), SymbolKind::Paragraph);
    assert_eq!(symbols.get(*paragraph).owner, Some(section));
}

#[test]
fn test_nested_and_stacked_programs() {
    let session = build(
        UnitScript::new()
            .program("OUTER")
            .procedure_division()
            .statement(StatementKind::Display)
            .end_procedure_division()
            .program("INNER")
            .end_program("INNER")
            .end_program("OUTER")
            .program("NEXT")
            .end_program_missing(),
    );

    expect![[r#"
        SourceFile
          Program OUTER
            ProcedureDivision
              Display
            Program INNER
              End
            End
          Program NEXT
    "#]]
    .assert_eq(&session.unit.tree.outline());

    let symbols = session.symbols();
    let outer = session.scope("OUTER").unwrap();
    let inner = session.scope("INNER").unwrap();
    let next = session.scope("NEXT").unwrap();
    assert_eq!(session.unit.programs, vec![outer, next]);
    assert!(symbols.get(outer).flags.contains(SymbolFlags::MAIN_PROGRAM));
    assert!(symbols.get(inner).flags.contains(SymbolFlags::NESTED_PROGRAM));
    assert!(symbols.get(next).flags.contains(SymbolFlags::STACKED_PROGRAM));
    assert_eq!(symbols.get(inner).owner, Some(outer));
    assert!(symbols.is_nested(inner));

    let tree = &session.unit.tree;
    let programs = tree.children(tree.root());
    assert!(!tree.get(programs[0]).flags.contains(NodeFlags::MISSING_END_PROGRAM));
    assert!(tree.get(programs[1]).flags.contains(NodeFlags::MISSING_END_PROGRAM));
}

#[test]
fn test_declared_procedure_has_its_own_scope() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .procedure_division()
            .declare("CHECK-DATE", |mut header| {
                let position = header.position;
                header
                    .input
                    .push(DataDescriptionEntry::new(1, "IN-DATE", position).with_picture("9(8)"));
                header.returning = Some(DataDescriptionEntry::new(1, "RESULT", position).with_picture("9"));
                header
            })
            .working_storage()
            .pic(1, "SCRATCH", "X")
            .end_working_storage()
            .procedure_division()
            .statement(StatementKind::Goback)
            .end_procedure_division()
            .end_declare()
            .statement(StatementKind::Stop)
            .end_procedure_division()
            .end_program("MAIN"),
    );
    assert!(session.unit.diagnostics.is_empty());

    let tree = &session.unit.tree;
    let scratch = tree.find_data("SCRATCH")[0];
    assert!(
        tree.get(scratch)
            .flags
            .contains(NodeFlags::INSIDE_PROCEDURE | NodeFlags::WORKING_STORAGE)
    );
    let program = tree.children(tree.root())[0];
    assert!(tree.get(program).flags.contains(NodeFlags::CONTAINS_PROCEDURE));
    let stop = tree
        .children(tree.children(program)[0])
        .last()
        .copied()
        .unwrap();
    assert!(!tree.get(stop).flags.contains(NodeFlags::INSIDE_PROCEDURE));

    let symbols = session.symbols();
    let function = session.scope("CHECK-DATE").unwrap();
    assert_eq!(symbols.get(function).kind(), SymbolKind::Function);
    assert_eq!(symbols.get(function).owner, session.scope("MAIN"));

    let input = session.symbol("IN-DATE").unwrap();
    let result = session.symbol("RESULT").unwrap();
    assert!(
        symbols
            .get(input)
            .flags
            .contains(SymbolFlags::INPUT | SymbolFlags::LINKAGE)
    );
    assert!(symbols.get(result).flags.contains(SymbolFlags::RETURNING));
    let linkage = symbols
        .scope(ScopeRef::new(function, ScopeSlot::Linkage))
        .unwrap();
    assert_eq!(linkage.ordered(), &[input, result]);

    let scratch = session.symbol("SCRATCH").unwrap();
    assert_eq!(symbols.enclosing_scope(scratch), Some(function));
    assert_eq!(symbols.resolve_variable(function, "SCRATCH"), vec![scratch]);
    assert!(
        symbols
            .resolve_variable(session.scope("MAIN").unwrap(), "SCRATCH")
            .is_empty()
    );
}
