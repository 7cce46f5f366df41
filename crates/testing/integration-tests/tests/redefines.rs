//! REDEFINES target resolution

use cb_symbols::{SymbolFlags, SymbolId, SymbolKind, VariableKind};
use cb_syntax::StorageSection;
use expect_test::expect;
use integration_tests::{Session, UnitScript, build};

fn target(session: &Session, name: &str) -> Option<SymbolId> {
    let id = session.symbol(name)?;
    match session.symbols().get(id).variable().map(|variable| &variable.kind) {
        Some(VariableKind::Redefines { target }) => *target,
        _ => None,
    }
}

#[test]
fn test_redefines_preceding_sibling() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .pic(1, "RAW-DATE", "X(8)")
            .redefines(1, "NUM-DATE", "RAW-DATE", "9(8)")
            .group(1, "PERIOD")
            .pic(5, "START-YEAR", "9(4)")
            .redefines(5, "START-TEXT", "START-YEAR", "X(4)")
            .end_working_storage()
            .end_program("MAIN"),
    );
    assert!(session.unit.diagnostics.is_empty());

    let symbols = session.symbols();
    let redefining = session.symbol("NUM-DATE").unwrap();
    assert_eq!(target(&session, "NUM-DATE"), session.symbol("RAW-DATE"));
    assert_eq!(symbols.get(redefining).kind(), SymbolKind::Redefines);
    assert!(symbols.get(redefining).flags.contains(SymbolFlags::REDEFINES));
    assert_eq!(target(&session, "START-TEXT"), session.symbol("START-YEAR"));

    let period = session.symbol("PERIOD").unwrap();
    let size = symbols.get(period).ty.as_ref().and_then(|ty| ty.size(symbols));
    assert_eq!(size, Some(4));

    expect![[r#"
        IDENTIFICATION DIVISION.
        PROGRAM-ID. MAIN.
        DATA DIVISION.
        WORKING-STORAGE SECTION.
        01 RAW-DATE PIC X(8).
        01 NUM-DATE REDEFINES RAW-DATE PIC 9(8).
        01 PERIOD.
          05 START-YEAR PIC 9(4).
          05 START-TEXT REDEFINES START-YEAR PIC X(4).
        PROCEDURE DIVISION.
        END PROGRAM MAIN.
    "#]]
    .assert_eq(&session.dump());
}

#[test]
fn test_redefines_chain_targets_first_item() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .pic(1, "AREA-A", "X(4)")
            .redefines(1, "AREA-B", "AREA-A", "9(4)")
            .redefines(1, "AREA-C", "AREA-A", "S9(3)")
            .end_working_storage()
            .end_program("MAIN"),
    );
    assert!(session.unit.diagnostics.is_empty());
    assert_eq!(target(&session, "AREA-B"), session.symbol("AREA-A"));
    assert_eq!(target(&session, "AREA-C"), session.symbol("AREA-A"));
}

#[test]
fn test_absent_target_is_reported() {
    let script = UnitScript::new()
        .program("MAIN")
        .working_storage()
        .pic(1, "FIRST", "X")
        .redefines(1, "SECOND", "NOWHERE", "X");
    let line = script.line();
    let session = build(script.end_working_storage().end_program("MAIN"));

    assert_eq!(session.codes(), ["semantic::unresolved_redefines_target"]);
    assert_eq!(
        session.rendered_diagnostics(),
        format!(
            "#0:{line}:30: error[semantic::unresolved_redefines_target]: \
             REDEFINES target 'NOWHERE' of 'SECOND' is not declared\n"
        )
    );
    let second = session.symbol("SECOND").unwrap();
    assert_eq!(target(&session, "SECOND"), None);
    assert!(session.symbols().get(second).ty.is_some());
}

#[test]
fn test_target_must_immediately_precede() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .pic(1, "A", "X")
            .pic(1, "B", "X")
            .redefines(1, "C", "A", "X")
            .group(1, "G")
            .pic(5, "D", "X")
            .pic(5, "F", "X")
            .redefines(5, "E", "D", "X")
            .end_working_storage()
            .end_program("MAIN"),
    );
    assert_eq!(
        session.codes(),
        [
            "semantic::redefines_not_immediately_preceding",
            "semantic::redefines_not_immediately_preceding",
        ]
    );
    assert_eq!(target(&session, "C"), None);
    assert_eq!(target(&session, "E"), None);
}

#[test]
fn test_redefines_outside_any_section() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .data_division()
            .redefines(1, "LOOSE", "ANY", "X")
            .end_data_division()
            .end_program("MAIN"),
    );
    assert_eq!(session.codes(), ["semantic::redefines_not_allowed_here"]);
    assert_eq!(session.count("semantic::redefines_not_allowed_here"), 1);
}

#[test]
fn test_redefines_inside_file_record() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .data_division()
            .section(StorageSection::File)
            .file_description("EMPLOYEES")
            .group(1, "EMP-REC")
            .pic(5, "EMP-ID", "9(6)")
            .redefines(5, "EMP-KEY", "EMP-ID", "X(6)")
            .pic(5, "EMP-NAME", "X(30)")
            .end_file_description()
            .end_section(StorageSection::File)
            .end_data_division()
            .end_program("MAIN"),
    );
    assert!(session.unit.diagnostics.is_empty());

    assert_eq!(target(&session, "EMP-KEY"), session.symbol("EMP-ID"));
    let symbols = session.symbols();
    let key = session.symbol("EMP-KEY").unwrap();
    assert!(symbols.get(key).flags.contains(SymbolFlags::FILE_SECTION | SymbolFlags::REDEFINES));
    let record = session.symbol("EMP-REC").unwrap();
    assert_eq!(symbols.get(record).ty.as_ref().and_then(|ty| ty.size(symbols)), Some(36));
}
