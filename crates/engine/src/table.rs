use schema::{Columns, Value};
use std::fmt;

/// Row-major copy of a read result, for callers that want records instead of
/// column sequences.
///
/// A read that found no partition at all yields a table with no columns and
/// no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The value at (`row`, column `name`).
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<Value> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }
}

impl From<&Columns> for Table {
    fn from(cols: &Columns) -> Self {
        Table {
            columns: cols.names().to_vec(),
            rows: (0..cols.row_count()).filter_map(|i| cols.row(i)).collect(),
        }
    }
}

impl From<Columns> for Table {
    fn from(cols: Columns) -> Self {
        Table::from(&cols)
    }
}

/// Tab-separated, header first.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
