use anyhow::{anyhow, bail, Context, Result};
use config::EngineConfig;
use engine::{DateSpec, Engine, ReadOptions, Table};
use schema::{ColumnKind, Columns, Row, Schema, Value};
use std::str::FromStr;

/// Result of one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text (may be empty) and keep reading.
    Continue(String),
    /// Print the text and stop.
    Exit(String),
}

/// Command interpreter behind the REPL. The engine is opened by `SCHEMA`,
/// since nothing can be stored before the record layout is known.
pub struct Shell {
    config: EngineConfig,
    engine: Option<Engine>,
}

impl Shell {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: None,
        }
    }

    /// Runs one line. Errors are rendered as `ERR ...` output rather than
    /// returned, so one bad command never ends the session.
    pub fn execute(&mut self, line: &str) -> Outcome {
        let mut parts = line.split_whitespace();
        let cmd = match parts.next() {
            Some(cmd) => cmd.to_uppercase(),
            None => return Outcome::Continue(String::new()),
        };
        let args: Vec<&str> = parts.collect();

        let result = match cmd.as_str() {
            "EXIT" | "QUIT" => return Outcome::Exit("bye".to_string()),
            "SCHEMA" => self.schema(&args),
            "APPEND" => self.append(&args),
            "READ" => self.read(&args),
            "FILTER" => self.filter(&args),
            "FLUSH" => self.flush(),
            "STATS" => Ok(self.stats()),
            other => Err(anyhow!("unknown command: {}", other)),
        };
        match result {
            Ok(out) => Outcome::Continue(out),
            Err(e) => Outcome::Continue(format!("ERR {e:#}")),
        }
    }

    fn engine(&mut self) -> Result<&mut Engine> {
        self.engine
            .as_mut()
            .ok_or_else(|| anyhow!("no schema declared (run SCHEMA name:kind ... first)"))
    }

    fn schema(&mut self, args: &[&str]) -> Result<String> {
        if args.is_empty() {
            bail!("usage: SCHEMA name:kind [name:kind ...]");
        }
        if self.engine.is_some() {
            bail!("schema already declared");
        }
        let schema = Schema::parse(&args.join(","))?;
        let width = schema.record_width();
        let engine = Engine::open(&self.config, schema)?;
        let out = format!("OK (backend={}, record_width={width})", engine.backend().name());
        self.engine = Some(engine);
        Ok(out)
    }

    fn append(&mut self, args: &[&str]) -> Result<String> {
        let (table, date, assignments) = match args {
            [table, date, rest @ ..] if !rest.is_empty() => (*table, *date, rest),
            _ => bail!("usage: APPEND table date col=val [col=val ...]"),
        };
        let engine = self.engine()?;

        let mut row = Row::new();
        for assignment in assignments {
            let (name, text) = assignment
                .split_once('=')
                .ok_or_else(|| anyhow!("expected col=val, got '{}'", assignment))?;
            let kind = engine
                .schema()
                .field(name)
                .map(|f| f.kind)
                .ok_or_else(|| anyhow!("unknown column '{}'", name))?;
            row.set(name, parse_value(kind, text)?);
        }
        engine.append(table, date, row)?;
        Ok("OK".to_string())
    }

    fn read(&mut self, args: &[&str]) -> Result<String> {
        let (table, dates) = match args {
            [table, date] => (*table, DateSpec::day(*date)),
            [table, start, end] => (*table, DateSpec::range(*start, *end)),
            _ => bail!("usage: READ table date [end_date]"),
        };
        let cols = self.engine()?.read(table, dates, ReadOptions::new())?;
        Ok(render(&cols))
    }

    fn filter(&mut self, args: &[&str]) -> Result<String> {
        let (table, date, column, op, threshold) = match args {
            [table, date, column, op, value] => (*table, *date, *column, *op, *value),
            _ => bail!("usage: FILTER table date col op value"),
        };
        let op: CompareOp = op.parse()?;
        let threshold: f64 = threshold
            .parse()
            .with_context(|| format!("'{threshold}' is not a number"))?;

        let engine = self.engine()?;
        if engine.schema().field(column).is_none() {
            bail!("unknown column '{}'", column);
        }
        let cols = engine.filter(table, date, |cols: &Columns| match cols.get(column) {
            Some(data) => data.values().map(|v| op.holds(v.as_f64(), threshold)).collect(),
            None => Vec::new(),
        })?;
        Ok(render(&cols))
    }

    fn flush(&mut self) -> Result<String> {
        self.engine()?.flush()?;
        Ok("OK".to_string())
    }

    fn stats(&self) -> String {
        match &self.engine {
            Some(engine) => format!("{engine:?}"),
            None => format!("no schema declared; {:?}", self.config),
        }
    }
}

/// Comparison used by `FILTER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

impl FromStr for CompareOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Ge,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Le,
            "==" | "=" => CompareOp::Eq,
            "!=" => CompareOp::Ne,
            other => bail!("unknown operator '{}' (expected > >= < <= == !=)", other),
        })
    }
}

/// Parses `text` as a value of exactly `kind`.
pub fn parse_value(kind: ColumnKind, text: &str) -> Result<Value> {
    Ok(match kind {
        ColumnKind::Int8 => Value::I8(number(kind, text)?),
        ColumnKind::Int16 => Value::I16(number(kind, text)?),
        ColumnKind::Int32 => Value::I32(number(kind, text)?),
        ColumnKind::Int64 => Value::I64(number(kind, text)?),
        ColumnKind::UInt8 => Value::U8(number(kind, text)?),
        ColumnKind::UInt16 => Value::U16(number(kind, text)?),
        ColumnKind::UInt32 => Value::U32(number(kind, text)?),
        ColumnKind::UInt64 => Value::U64(number(kind, text)?),
        ColumnKind::Float32 => Value::F32(number(kind, text)?),
        ColumnKind::Float64 => Value::F64(number(kind, text)?),
    })
}

fn number<T>(kind: ColumnKind, text: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse()
        .with_context(|| format!("'{text}' is not a valid {kind}"))
}

/// Rows as a tab-separated table plus a row count, or `(empty)` when no
/// partition was found.
pub fn render(cols: &Columns) -> String {
    if cols.is_empty() {
        return "(empty)".to_string();
    }
    let table = Table::from(cols);
    format!("{table}({} rows)", table.len())
}
