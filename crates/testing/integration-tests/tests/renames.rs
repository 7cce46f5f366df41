//! Level-66 RENAMES validation and byte ranges

use cb_driver::CompilerOptions;
use cb_semantic::{ReportLevel, SemanticOptions, Severity};
use cb_symbols::{RenamesType, VariableKind};
use integration_tests::{Session, UnitScript, build, build_with};

fn range(session: &Session, name: &str) -> Option<RenamesType> {
    let id = session.symbol(name)?;
    match session.symbols().get(id).variable().map(|variable| &variable.kind) {
        Some(VariableKind::Renames(data)) => data.range,
        _ => None,
    }
}

/// `01 REC` with `A PIC XX`, `B PIC XXX`, `C PIC 9(4)` and `D PIC X`
fn record() -> UnitScript {
    UnitScript::new()
        .program("MAIN")
        .working_storage()
        .group(1, "REC")
        .pic(5, "A", "XX")
        .pic(5, "B", "XXX")
        .pic(5, "C", "9(4)")
        .pic(5, "D", "X")
}

fn close(script: UnitScript) -> UnitScript {
    script.end_working_storage().end_program("MAIN")
}

#[test]
fn test_thru_range_covers_both_items() {
    let session = build(close(
        record()
            .renames("MIDDLE", "B", Some("C"))
            .renames("LAST", "D", None),
    ));
    assert!(session.unit.diagnostics.is_empty());

    let middle = range(&session, "MIDDLE").unwrap();
    assert_eq!(middle.from, session.symbol("B").unwrap());
    assert_eq!(middle.thru, session.symbol("C"));
    assert_eq!(middle.offset, 2);
    assert_eq!(middle.length, Some(7));

    let last = range(&session, "LAST").unwrap();
    assert_eq!(last.thru, None);
    assert_eq!((last.offset, last.length), (9, Some(1)));
}

#[test]
fn test_reversed_range_is_an_order_violation() {
    let script = record().renames("BACKWARDS", "D", Some("B"));
    let line = script.line();
    let session = build(close(script));

    assert_eq!(
        session.rendered_diagnostics(),
        format!(
            "#0:{line}:8: error[semantic::renames_order_violation]: \
             'B' must not precede 'D' in RENAMES 'BACKWARDS'\n"
        )
    );
    assert_eq!(range(&session, "BACKWARDS"), None);
}

#[test]
fn test_unknown_and_invalid_objects() {
    let session = build(close(
        record()
            .renames("GHOST", "NOPE", None)
            .renames("WHOLE", "REC", None)
            .renames("NESTED", "A", Some("WHOLE")),
    ));
    assert_eq!(
        session.codes(),
        [
            "semantic::unknown_renamed_symbol",
            "semantic::invalid_renames_level",
            "semantic::invalid_renames_level",
        ]
    );
    let rendered = session.rendered_diagnostics();
    assert!(rendered.contains("'REC' is a level 01 item and cannot be renamed by 'WHOLE'"));
    assert!(rendered.contains("'WHOLE' is a level 66 item and cannot be renamed by 'NESTED'"));
}

#[test]
fn test_range_must_not_span_a_table() {
    let session = build(close(
        record()
            .entry(5, "ROWS", |entry, _| entry.with_picture("X").with_occurs(3, 3))
            .pic(5, "TAIL", "X")
            .renames("ACROSS", "D", Some("TAIL"))
            .renames("AFTER", "TAIL", None),
    ));
    assert_eq!(session.codes(), ["semantic::renames_spans_occurs"]);
    assert!(
        session
            .rendered_diagnostics()
            .contains("RENAMES 'ACROSS' spans OCCURS item 'ROWS'")
    );
    let after = range(&session, "AFTER").unwrap();
    assert_eq!((after.offset, after.length), (13, Some(1)));
}

#[test]
fn test_renames_without_record() {
    let session = build(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .renames("ORPHAN", "A", None)
            .pic(1, "A", "X")
            .end_working_storage()
            .end_program("MAIN"),
    );
    assert_eq!(session.codes(), ["semantic::renames_not_a_group"]);
}

fn forward_reference() -> UnitScript {
    UnitScript::new()
        .program("MAIN")
        .working_storage()
        .group(1, "REC")
        .pic(5, "A", "X")
        .renames("EARLY", "B", None)
        .pic(5, "B", "XX")
        .end_working_storage()
        .end_program("MAIN")
}

#[test]
fn test_forward_reference_is_an_error_by_default() {
    let session = build(forward_reference());
    assert_eq!(session.codes(), ["semantic::renames_forward_reference"]);
    assert!(session.unit.diagnostics.has_errors());
    assert_eq!(range(&session, "EARLY"), None);
}

#[test]
fn test_forward_reference_can_be_relaxed() {
    let options = CompilerOptions {
        semantic: SemanticOptions {
            renames_forward_references: ReportLevel::Warning,
            ..SemanticOptions::default()
        },
        ..CompilerOptions::default()
    };
    let session = build_with(options, forward_reference());
    let [diagnostic] = session.unit.diagnostics.as_slice() else {
        panic!("expected one diagnostic");
    };
    assert_eq!(diagnostic.severity, Severity::Warning);
    let early = range(&session, "EARLY").unwrap();
    assert_eq!((early.offset, early.length), (1, Some(2)));

    let options = CompilerOptions {
        semantic: SemanticOptions {
            renames_forward_references: ReportLevel::Allow,
            ..SemanticOptions::default()
        },
        ..CompilerOptions::default()
    };
    let session = build_with(options, forward_reference());
    assert!(session.unit.diagnostics.is_empty());
    assert!(range(&session, "EARLY").is_some());
}

#[test]
fn test_oversized_table_leaves_record_unsized() {
    let session = build(close(
        UnitScript::new()
            .program("MAIN")
            .working_storage()
            .group(1, "REC")
            .pic(5, "A", "X")
            .entry(5, "BIG", |entry, _| entry.with_picture("X(70000)").with_occurs(70_000, 70_000))
            .renames("FIRST-BYTE", "A", None),
    ));
    assert!(session.unit.diagnostics.is_empty());

    let symbols = session.symbols();
    for name in ["REC", "BIG"] {
        let id = session.symbol(name).unwrap();
        assert_eq!(symbols.get(id).ty.as_ref().and_then(|ty| ty.size(symbols)), None);
    }
    let first = range(&session, "FIRST-BYTE").unwrap();
    assert_eq!((first.offset, first.length), (0, Some(1)));
}
