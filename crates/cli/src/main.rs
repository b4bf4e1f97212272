//! # CLI - ChronoStore Interactive Shell
//!
//! A REPL-style command-line interface for the ChronoStore engine. Reads
//! commands from stdin, executes them against the engine, and prints results
//! to stdout. Works interactively and for scripted testing (pipe commands via
//! stdin). Logs go to stderr.
//!
//! ## Commands
//!
//! ```text
//! SCHEMA name:kind [name:kind ...]   Declare the record layout and open the store
//! APPEND table date col=val ...      Append one row
//! READ table date [end_date]         Print one day or an inclusive date range
//! FILTER table date col op value     Read rows where `col op value` (> >= < <= == !=)
//! FLUSH                              Make appended rows durable and readable
//! STATS                              Print engine debug info
//! EXIT / QUIT                        Shut down (flushes pending rows)
//! ```
//!
//! ## Configuration
//!
//! Environment variables, see the `config` crate:
//!
//! ```text
//! CHRONO_DATA_DIR      data directory                  (default: "data")
//! CHRONO_BACKEND       "flatfile" or "kv"              (default: "flatfile")
//! CHRONO_READ_WORKERS  range-read worker threads       (default: CPU count)
//! CHRONO_SYNC          fsync on flush                  (default: "true")
//! CHRONO_KV_CACHE_MB   key-value page cache in MiB     (default: 1024)
//! CHRONO_KV_TREE       key-value tree name             (default: "partitions")
//! CHRONO_LOG           log filter if RUST_LOG is unset (default: "info")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! ChronoStore started (backend=flatfile, data_dir=data, read_workers=8)
//! > SCHEMA timestamp:int64 price:float64
//! OK (backend=flatfile, record_width=16)
//! > APPEND ES 2025-06-14 timestamp=1 price=100.5
//! OK
//! > FLUSH
//! OK
//! > READ ES 2025-06-14
//! timestamp	price
//! 1	100.5
//! (1 rows)
//! > EXIT
//! bye
//! ```

mod shell;

use anyhow::Result;
use config::EngineConfig;
use shell::{Outcome, Shell};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let config = EngineConfig::from_env()?;
    init_logging(&config.log_level);

    println!(
        "ChronoStore started (backend={}, data_dir={}, read_workers={})",
        config.backend,
        config.data_dir.display(),
        config.read_workers
    );
    println!("Commands: SCHEMA name:kind ... | APPEND table date col=val ...");
    println!("          READ table date [end] | FILTER table date col op value");
    println!("          FLUSH | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let mut shell = Shell::new(config);
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        match shell.execute(&line) {
            Outcome::Continue(out) => {
                if !out.is_empty() {
                    println!("{}", out);
                }
            }
            Outcome::Exit(out) => {
                println!("{}", out);
                break;
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

#[cfg(test)]
mod tests;
