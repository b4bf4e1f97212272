use crate::shell::{parse_value, render, CompareOp, Outcome, Shell};
use config::{BackendKind, EngineConfig};
use schema::{ColumnKind, Columns, Value};
use tempfile::tempdir;

fn shell_in(dir: &std::path::Path, kind: BackendKind) -> Shell {
    let config = EngineConfig::new(dir.join("store"), kind)
        .with_read_workers(2)
        .with_sync(false);
    Shell::new(config)
}

fn out(shell: &mut Shell, line: &str) -> String {
    match shell.execute(line) {
        Outcome::Continue(s) => s,
        Outcome::Exit(s) => panic!("unexpected exit: {s}"),
    }
}

#[test]
fn session_round_trip_on_both_backends() {
    for kind in [BackendKind::FlatFile, BackendKind::Kv] {
        let dir = tempdir().unwrap();
        let mut shell = shell_in(dir.path(), kind);

        assert_eq!(
            out(&mut shell, "SCHEMA timestamp:int64 price:float64"),
            format!("OK (backend={kind}, record_width=16)")
        );
        assert_eq!(out(&mut shell, "APPEND ES 2025-06-14 timestamp=1 price=100.5"), "OK");
        assert_eq!(out(&mut shell, "append ES 2025-06-14 price=101 timestamp=2"), "OK");
        assert_eq!(out(&mut shell, "FLUSH"), "OK");
        assert_eq!(
            out(&mut shell, "READ ES 2025-06-14"),
            "timestamp\tprice\n1\t100.5\n2\t101\n(2 rows)"
        );
        assert_eq!(
            out(&mut shell, "FILTER ES 2025-06-14 price > 100.75"),
            "timestamp\tprice\n2\t101\n(1 rows)"
        );
        assert_eq!(shell.execute("QUIT"), Outcome::Exit("bye".into()));
    }
}

#[test]
fn read_range_and_missing_data() {
    let dir = tempdir().unwrap();
    let mut shell = shell_in(dir.path(), BackendKind::FlatFile);
    out(&mut shell, "SCHEMA ts:int64");
    out(&mut shell, "APPEND ES 2025-06-15 ts=2");
    out(&mut shell, "APPEND ES 2025-06-14 ts=1");
    out(&mut shell, "FLUSH");

    assert_eq!(
        out(&mut shell, "READ ES 2025-06-13 2025-06-16"),
        "ts\n1\n2\n(2 rows)"
    );
    assert_eq!(out(&mut shell, "READ NQ 2025-06-14"), "(empty)");
}

#[test]
fn commands_before_schema_are_errors() {
    let dir = tempdir().unwrap();
    let mut shell = shell_in(dir.path(), BackendKind::FlatFile);

    assert!(out(&mut shell, "APPEND ES 2025-06-14 ts=1").starts_with("ERR no schema declared"));
    assert!(out(&mut shell, "READ ES 2025-06-14").starts_with("ERR"));
    assert!(out(&mut shell, "FLUSH").starts_with("ERR"));
    assert!(out(&mut shell, "STATS").starts_with("no schema declared"));
}

#[test]
fn bad_input_reports_errors_and_keeps_going() {
    let dir = tempdir().unwrap();
    let mut shell = shell_in(dir.path(), BackendKind::FlatFile);

    assert!(out(&mut shell, "SCHEMA ts:int65").starts_with("ERR"));
    assert!(out(&mut shell, "SCHEMA").starts_with("ERR usage"));
    assert!(out(&mut shell, "SCHEMA ts:int64 delta:int8").starts_with("OK"));
    assert_eq!(out(&mut shell, "SCHEMA ts:int64"), "ERR schema already declared");

    assert!(out(&mut shell, "APPEND ES 2025-06-14").starts_with("ERR usage"));
    assert!(out(&mut shell, "APPEND ES 2025-06-14 ts=1").contains("missing column 'delta'"));
    assert!(out(&mut shell, "APPEND ES 2025-06-14 ts=1 delta=300").contains("not a valid int8"));
    assert!(out(&mut shell, "APPEND ES 2025-06-14 ts=1 bogus=3").contains("unknown column"));
    assert!(out(&mut shell, "APPEND ES 2025-13-01 ts=1 delta=3").starts_with("ERR"));
    assert!(out(&mut shell, "READ ES 2025-06-15 2025-06-14").contains("inverted date range"));
    assert!(out(&mut shell, "FILTER ES 2025-06-14 delta ~ 3").contains("unknown operator"));
    assert!(out(&mut shell, "FILTER ES 2025-06-14 nope > 3").contains("unknown column"));
    assert_eq!(out(&mut shell, "FROB"), "ERR unknown command: FROB");
    assert_eq!(out(&mut shell, "   "), "");

    assert_eq!(out(&mut shell, "APPEND ES 2025-06-14 ts=1 delta=-3"), "OK");
}

#[test]
fn stats_shows_engine_debug() {
    let dir = tempdir().unwrap();
    let mut shell = shell_in(dir.path(), BackendKind::Kv);
    out(&mut shell, "SCHEMA ts:int64");
    out(&mut shell, "APPEND ES 2025-06-14 ts=1");

    let stats = out(&mut shell, "STATS");
    assert!(stats.contains("KvBackend"), "{stats}");
    assert!(stats.contains("buffered_rows: 1"), "{stats}");
}

#[test]
fn values_parse_to_the_declared_kind() {
    assert_eq!(parse_value(ColumnKind::UInt8, "255").unwrap(), Value::U8(255));
    assert_eq!(parse_value(ColumnKind::Int16, "-7").unwrap(), Value::I16(-7));
    assert_eq!(parse_value(ColumnKind::Float32, "1.5").unwrap(), Value::F32(1.5));
    assert_eq!(parse_value(ColumnKind::UInt64, "18446744073709551615").unwrap(), Value::U64(u64::MAX));
    assert!(parse_value(ColumnKind::UInt8, "-1").is_err());
    assert!(parse_value(ColumnKind::Int32, "1.5").is_err());
}

#[test]
fn comparison_operators() {
    let cases = [
        (">", 2.0, 1.0, true),
        (">=", 1.0, 1.0, true),
        ("<", 2.0, 1.0, false),
        ("<=", 1.0, 1.0, true),
        ("==", 1.0, 1.0, true),
        ("!=", 1.0, 1.0, false),
    ];
    for (op, lhs, rhs, expected) in cases {
        let op: CompareOp = op.parse().unwrap();
        assert_eq!(op.holds(lhs, rhs), expected, "{op:?}");
    }
    assert!("=>".parse::<CompareOp>().is_err());
}

#[test]
fn render_distinguishes_nothing_from_no_rows() {
    assert_eq!(render(&Columns::new()), "(empty)");
    let empty_rows = Columns::new().with("ts", Vec::<i64>::new());
    assert_eq!(render(&empty_rows), "ts\n(0 rows)");
}
