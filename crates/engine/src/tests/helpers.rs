use crate::Engine;
use anyhow::Result;
use config::{BackendKind, EngineConfig};
use schema::{Row, Schema, StoreError};
use std::path::Path;

pub const BACKENDS: [BackendKind; 2] = [BackendKind::FlatFile, BackendKind::Kv];

pub fn tick_schema() -> Schema {
    Schema::parse("timestamp:int64,price:float64").unwrap()
}

pub fn delta_schema() -> Schema {
    Schema::parse("timestamp:int64,delta:int32").unwrap()
}

pub fn tick(ts: i64, price: f64) -> Row {
    Row::new().with("timestamp", ts).with("price", price)
}

pub fn test_config(kind: BackendKind, dir: &Path) -> EngineConfig {
    let mut cfg = EngineConfig::new(dir.join("store"), kind)
        .with_read_workers(4)
        .with_sync(true);
    cfg.kv_cache_capacity = 8 * 1024 * 1024;
    cfg
}

pub fn open_engine(kind: BackendKind, dir: &Path, schema: Schema) -> Result<Engine> {
    Engine::open(&test_config(kind, dir), schema)
}

/// The typed error behind an engine failure.
pub fn store_error<T: std::fmt::Debug>(res: Result<T>) -> StoreError {
    match res {
        Ok(v) => panic!("expected an error, got {:?}", v),
        Err(e) => match e.downcast::<StoreError>() {
            Ok(err) => err,
            Err(other) => panic!("expected a StoreError, got {other:#}"),
        },
    }
}
