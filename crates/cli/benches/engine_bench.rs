use config::{BackendKind, EngineConfig};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use engine::{Engine, ReadOptions};
use schema::{Columns, Schema};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const N_ROWS: usize = 100_000;
const TABLE: &str = "Sensor";
const DAY: &str = "2025-06-14";
const BACKENDS: [BackendKind; 2] = [BackendKind::FlatFile, BackendKind::Kv];

fn bench_schema() -> Schema {
    Schema::parse("timestamp:int64,value1:float64,value2:float64,value3:float64").unwrap()
}

/// Deterministic values spread over [0, 100).
fn spread(i: usize, salt: usize) -> f64 {
    ((i * 7919 + salt * 104_729) % 10_000) as f64 / 100.0
}

fn bench_data() -> Columns {
    Columns::new()
        .with("timestamp", (0..N_ROWS as i64).collect::<Vec<_>>())
        .with("value1", (0..N_ROWS).map(|i| spread(i, 1)).collect::<Vec<_>>())
        .with("value2", (0..N_ROWS).map(|i| spread(i, 2)).collect::<Vec<_>>())
        .with("value3", (0..N_ROWS).map(|i| spread(i, 3)).collect::<Vec<_>>())
}

fn open(kind: BackendKind, dir: &Path) -> Engine {
    let mut cfg = EngineConfig::new(dir, kind);
    cfg.kv_cache_capacity = 256 * 1024 * 1024;
    Engine::open(&cfg, bench_schema()).unwrap()
}

fn loaded(kind: BackendKind, dir: &Path) -> Engine {
    let mut engine = open(kind, dir);
    engine.append(TABLE, DAY, bench_data()).unwrap();
    engine.flush().unwrap();
    engine
}

fn dir_size(path: &Path) -> u64 {
    fs::read_dir(path)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| {
            let meta = e.metadata().unwrap();
            if meta.is_dir() {
                dir_size(&e.path())
            } else {
                meta.len()
            }
        })
        .sum()
}

fn write_benchmark(c: &mut Criterion) {
    for kind in BACKENDS {
        c.bench_function(&format!("{kind}_write_100k"), |b| {
            b.iter_batched(
                || (tempdir().unwrap(), bench_data()),
                |(dir, data)| {
                    let mut engine = open(kind, dir.path());
                    engine.append(TABLE, DAY, data).unwrap();
                    engine.flush().unwrap();
                },
                BatchSize::LargeInput,
            );
        });
    }
}

fn read_all_benchmark(c: &mut Criterion) {
    for kind in BACKENDS {
        let dir = tempdir().unwrap();
        let engine = loaded(kind, dir.path());
        c.bench_function(&format!("{kind}_read_all_100k"), |b| {
            b.iter(|| {
                let cols = engine.read(TABLE, DAY, ReadOptions::new()).unwrap();
                assert_eq!(cols.row_count(), N_ROWS);
            });
        });
    }
}

fn filtered_read_benchmark(c: &mut Criterion) {
    for kind in BACKENDS {
        let dir = tempdir().unwrap();
        let engine = loaded(kind, dir.path());
        c.bench_function(&format!("{kind}_filtered_read_100k"), |b| {
            b.iter(|| {
                engine
                    .filter(TABLE, DAY, |cols| {
                        cols["value1"]
                            .as_f64()
                            .unwrap_or_default()
                            .iter()
                            .map(|v| *v > 90.0)
                            .collect()
                    })
                    .unwrap()
            });
        });
    }
}

fn disk_usage_report(_c: &mut Criterion) {
    for kind in BACKENDS {
        let dir = tempdir().unwrap();
        drop(loaded(kind, dir.path()));
        let mib = dir_size(dir.path()) as f64 / (1024.0 * 1024.0);
        println!("{kind} disk usage for {N_ROWS} rows: {mib:.2} MiB");
    }
}

criterion_group!(
    benches,
    write_benchmark,
    read_all_benchmark,
    filtered_read_benchmark,
    disk_usage_report
);
criterion_main!(benches);
