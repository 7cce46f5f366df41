//! Replaying recorded event traces

use cb_driver::{Compiler, CompilerOptions, read_event_trace};
use cb_span::FileId;
use cb_symbols::{SymbolFlags, VariableKind};
use cb_syntax::Event;
use expect_test::expect;
use integration_tests::{UnitScript, build};
use std::io::Write;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_replay_customer_trace() {
    let events = read_event_trace(&fixture("customers.events.json")).unwrap();
    let mut compiler = Compiler::new(CompilerOptions::default());
    let unit = compiler.compile_unit(FileId::new(7), events);
    assert!(unit.diagnostics.is_empty());

    expect![[r#"
        SourceFile
          Program CUSTOMERS
            DataDivision
              WORKING-STORAGE SECTION
                01 NAME-T TYPEDEF
                  05 FIRST-NAME
                  05 LAST-NAME
                01 CUSTOMER
                  05 CUST-ID
                  05 CUST-NAME
                  05 ORDER-COUNT
                  05 ORDERS
                    Index ORD-IX
                  66 CUST-KEY
            ProcedureDivision
              Paragraph MAIN-PARA
                Display
                Goback
            End
    "#]]
    .assert_eq(&unit.tree.outline());

    let symbols = compiler.symbols();
    expect![[r#"
        IDENTIFICATION DIVISION.
        PROGRAM-ID. CUSTOMERS.
        DATA DIVISION.
        01 NAME-T TYPEDEF STRICT.
          05 FIRST-NAME PIC X(15).
          05 LAST-NAME PIC X(20).
        WORKING-STORAGE SECTION.
        01 CUSTOMER.
          05 CUST-ID PIC 9(6).
          05 CUST-NAME TYPE NAME-T.
          05 ORDER-COUNT PIC 99.
          05 ORDERS PIC 9(8) OCCURS 1 TO 20 DEPENDING ON ORDER-COUNT.
          66 CUST-KEY RENAMES CUST-ID.
        PROCEDURE DIVISION.
        END PROGRAM CUSTOMERS.
    "#]]
    .assert_eq(&symbols.dump(unit.programs[0]));

    let customer = unit.tree.find_data("CUSTOMER")[0];
    let customer = unit.tree.get(customer).symbol().unwrap();
    let size = symbols.get(customer).ty.as_ref().and_then(|ty| ty.size(symbols));
    assert_eq!(size, Some(203));

    let name = unit.tree.find_data("CUST-NAME")[0];
    let name = unit.tree.get(name).symbol().unwrap();
    assert!(symbols.get(name).flags.contains(SymbolFlags::STRICT_TYPEDEF));

    let key = unit.tree.find_data("CUST-KEY")[0];
    let key = unit.tree.get(key).symbol().unwrap();
    let Some(VariableKind::Renames(renames)) = symbols.get(key).variable().map(|variable| &variable.kind) else {
        panic!("CUST-KEY is not a RENAMES item");
    };
    let range = renames.range.unwrap();
    assert_eq!((range.offset, range.length), (0, Some(6)));
}

#[test]
fn test_scripted_unit_survives_json() {
    let script = UnitScript::new()
        .program("MAIN")
        .working_storage()
        .group(1, "REC")
        .pic(5, "A", "X(3)")
        .redefines(5, "B", "A", "9(3)")
        .end_working_storage()
        .end_program("MAIN");
    let direct = build(script.clone());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = serde_json::to_string_pretty(script.events()).unwrap();
    write!(file, "{text}").unwrap();
    let events: Vec<Event> = read_event_trace(file.path()).unwrap();
    assert_eq!(events.as_slice(), script.events());

    let mut compiler = Compiler::new(CompilerOptions::default());
    let replayed = compiler.compile_unit(FileId::new(0), events);
    assert_eq!(replayed.tree.outline(), direct.unit.tree.outline());
    assert_eq!(compiler.symbols().dump(replayed.programs[0]), direct.dump());
}

#[test]
fn test_malformed_trace_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"StartProgram": 12}}]"#).unwrap();
    let error = read_event_trace(file.path()).unwrap_err();
    assert!(error.to_string().contains("Failed to parse event trace"));

    let missing = fixture("missing.events.json");
    let error = read_event_trace(&missing).unwrap_err();
    assert!(error.to_string().contains("Failed to read event trace"));
}
