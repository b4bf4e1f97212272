use super::helpers::*;
use crate::*;
use anyhow::Result;
use config::{BackendKind, EngineConfig};
use tempfile::tempdir;

#[test]
fn open_builds_the_configured_backend() -> Result<()> {
    let dir = tempdir()?;

    let flat = open_engine(BackendKind::FlatFile, dir.path().join("a").as_path(), tick_schema())?;
    assert_eq!(flat.backend().name(), "flatfile");

    let kv = open_engine(BackendKind::Kv, dir.path().join("b").as_path(), tick_schema())?;
    assert_eq!(kv.backend().name(), "kv");
    assert_eq!(kv.schema(), &tick_schema());
    Ok(())
}

#[test]
fn zero_read_workers_means_one() -> Result<()> {
    let dir = tempdir()?;
    let backend = FlatFileBackend::open(dir.path(), tick_schema())?;
    let engine = Engine::with_read_workers(backend, 0)?;
    assert_eq!(engine.read_workers(), 1);
    Ok(())
}

#[test]
fn debug_shows_backend_state() -> Result<()> {
    for kind in BACKENDS {
        let dir = tempdir()?;
        let mut engine = open_engine(kind, dir.path(), tick_schema())?;
        engine.append("ES", "2025-06-14", tick(1, 1.0))?;

        let dbg = format!("{engine:?}");
        assert!(dbg.contains("Engine"), "{dbg}");
        assert!(dbg.contains("read_workers: 4"), "{dbg}");
        assert!(dbg.contains("appended_rows: 1"), "{dbg}");
        match kind {
            BackendKind::FlatFile => assert!(dbg.contains("open_writers: 1"), "{dbg}"),
            BackendKind::Kv => assert!(dbg.contains("buffered_rows: 1"), "{dbg}"),
        }
    }
    Ok(())
}

#[test]
fn backends_agree_on_stored_data() -> Result<()> {
    let dir = tempdir()?;
    let mut results = Vec::new();
    for kind in BACKENDS {
        let mut engine = open_engine(kind, dir.path().join(kind.to_string()).as_path(), tick_schema())?;
        engine.append("ES", "2025-06-14", vec![tick(1, 1.25), tick(2, -3.5)])?;
        engine.append("ES", "2025-06-16", tick(3, 0.0))?;
        engine.flush()?;
        results.push(engine.read_range("ES", "2025-06-13", "2025-06-17")?);
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].row_count(), 3);
    Ok(())
}

#[test]
fn engine_works_through_a_boxed_backend() -> Result<()> {
    let dir = tempdir()?;
    let cfg = EngineConfig::new(dir.path(), BackendKind::Kv).with_read_workers(2);
    let backend: Box<dyn Backend> = Box::new(KvBackend::open(
        &cfg.data_dir,
        tick_schema(),
        KvOptions::from(&cfg),
    )?);
    let mut engine = Engine::from_boxed(backend, cfg.read_workers)?;

    engine.append("ES", "2025-06-14", tick(1, 1.0))?;
    engine.flush()?;
    assert_eq!(engine.read("ES", "2025-06-14", ReadOptions::new())?.row_count(), 1);
    Ok(())
}

#[test]
fn date_spec_conversions() {
    assert_eq!(DateSpec::from("2025-06-14"), DateSpec::Day("2025-06-14".into()));
    assert_eq!(
        DateSpec::from(("2025-06-14", "2025-06-15")),
        DateSpec::Range {
            start: "2025-06-14".into(),
            end: "2025-06-15".into(),
        }
    );
    assert_eq!(
        DateSpec::from(("a".to_string(), "b".to_string())),
        DateSpec::range("a", "b")
    );
}
