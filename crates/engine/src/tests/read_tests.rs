use super::helpers::*;
use crate::*;
use anyhow::Result;
use config::BackendKind;
use schema::{StoreError, Value};
use std::fs;
use tempfile::tempdir;

fn engine_with_ten_rows(kind: BackendKind, dir: &std::path::Path) -> Result<Engine> {
    let mut engine = open_engine(kind, dir, tick_schema())?;
    let rows: Vec<_> = (0..10).map(|i| tick(i, i as f64 * 0.5)).collect();
    engine.append("ES", "2025-06-14", rows)?;
    engine.flush()?;
    Ok(engine)
}

// --------------------- Missing data ---------------------

#[test]
fn never_written_partition_reads_empty() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = open_engine(kind, dir.path(), tick_schema())?;

        let cols = engine.read("ES", "2025-06-14", ReadOptions::new())?;
        assert!(cols.is_empty(), "{kind}");
        assert_eq!(cols.row_count(), 0);
    }
    Ok(())
}

#[test]
fn other_tables_and_days_are_isolated() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let mut engine = open_engine(kind, dir.path(), tick_schema())?;
        engine.append("ES", "2025-06-14", tick(1, 1.0))?;
        engine.append("NQ", "2025-06-14", vec![tick(2, 2.0), tick(3, 3.0)])?;
        engine.append("ES", "2025-06-15", tick(4, 4.0))?;
        engine.flush()?;

        let es = engine.read("ES", "2025-06-14", ReadOptions::new())?;
        let nq = engine.read("NQ", "2025-06-14", ReadOptions::new())?;
        let es_next = engine.read("ES", "2025-06-15", ReadOptions::new())?;
        assert_eq!(es["timestamp"].as_i64(), Some(&[1][..]), "{kind}");
        assert_eq!(nq["timestamp"].as_i64(), Some(&[2, 3][..]), "{kind}");
        assert_eq!(es_next["timestamp"].as_i64(), Some(&[4][..]), "{kind}");
    }
    Ok(())
}

#[test]
fn read_rejects_malformed_date() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = open_engine(kind, dir.path(), tick_schema())?;
        let err = store_error(engine.read("ES", "2025/06/14", ReadOptions::new()));
        assert!(matches!(err, StoreError::Validation(_)), "{kind}: {err:?}");
    }
    Ok(())
}

// --------------------- Slicing ---------------------

#[test]
fn slice_selects_half_open_row_range() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = engine_with_ten_rows(kind, dir.path())?;

        let read = |start, end| -> Result<Vec<i64>> {
            let cols = engine.read("ES", "2025-06-14", ReadOptions::new().slice(start, end))?;
            Ok(cols["timestamp"].as_i64().unwrap_or_default().to_vec())
        };

        assert_eq!(read(Some(2), Some(5))?, vec![2, 3, 4], "{kind}");
        assert_eq!(read(None, Some(3))?, vec![0, 1, 2], "{kind}");
        assert_eq!(read(Some(8), None)?, vec![8, 9], "{kind}");
        assert_eq!(read(Some(-3), None)?, vec![7, 8, 9], "{kind}");
        assert_eq!(read(Some(-3), Some(-1))?, vec![7, 8], "{kind}");
        assert_eq!(read(Some(5), Some(100))?, vec![5, 6, 7, 8, 9], "{kind}");
        assert_eq!(read(Some(-100), Some(2))?, vec![0, 1], "{kind}");
    }
    Ok(())
}

#[test]
fn empty_slice_keeps_columns() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = engine_with_ten_rows(kind, dir.path())?;

        let cols = engine.read("ES", "2025-06-14", ReadOptions::new().slice(Some(6), Some(3)))?;
        assert_eq!(cols.num_columns(), 2, "{kind}");
        assert_eq!(cols.row_count(), 0, "{kind}");
    }
    Ok(())
}

// --------------------- Corruption ---------------------

#[test]
fn truncated_log_is_reported_as_corruption() -> Result<()> {
    let dir = tempdir()?;
    let engine = engine_with_ten_rows(BackendKind::FlatFile, dir.path())?;

    let log = dir
        .path()
        .join("store")
        .join("ES")
        .join("2025-06-14")
        .join("data.bin");
    let mut bytes = fs::read(&log)?;
    bytes.truncate(bytes.len() - 3);
    fs::write(&log, &bytes)?;

    let err = store_error(engine.read("ES", "2025-06-14", ReadOptions::new()));
    assert_eq!(err, StoreError::Corruption { len: 157, width: 16 });
    Ok(())
}

#[test]
fn existing_empty_log_reads_as_present_but_empty() -> Result<()> {
    let dir = tempdir()?;
    let engine = open_engine(BackendKind::FlatFile, dir.path(), tick_schema())?;

    let part = dir.path().join("store").join("ES").join("2025-06-14");
    fs::create_dir_all(&part)?;
    fs::write(part.join("data.bin"), b"")?;

    let cols = engine.read("ES", "2025-06-14", ReadOptions::new())?;
    assert_eq!(cols.num_columns(), 2);
    assert_eq!(cols.row_count(), 0);
    Ok(())
}

// --------------------- Row-major view ---------------------

#[test]
fn read_as_table_is_row_major() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = engine_with_ten_rows(kind, dir.path())?;

        let table = engine.read_as_table("ES", "2025-06-14", ReadOptions::new().slice(None, Some(2)))?;
        assert_eq!(table.columns, vec!["timestamp", "price"]);
        assert_eq!(
            table.rows,
            vec![
                vec![Value::I64(0), Value::F64(0.0)],
                vec![Value::I64(1), Value::F64(0.5)],
            ],
            "{kind}"
        );
        assert_eq!(table.get(1, "price"), Some(Value::F64(0.5)));
        assert_eq!(table.get(1, "volume"), None);
        assert_eq!(table.to_string(), "timestamp\tprice\n0\t0\n1\t0.5\n");
    }
    Ok(())
}

#[test]
fn read_as_table_of_nothing_is_empty() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let engine = open_engine(kind, dir.path(), tick_schema())?;

        let table = engine.read_as_table("ES", "2025-06-14", ReadOptions::new())?;
        assert!(table.is_empty(), "{kind}");
        assert!(table.columns.is_empty(), "{kind}");
    }
    Ok(())
}
