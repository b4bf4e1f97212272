use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// The closed set of fixed-width numeric column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl ColumnKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [ColumnKind; 10] = [
        ColumnKind::Int8,
        ColumnKind::Int16,
        ColumnKind::Int32,
        ColumnKind::Int64,
        ColumnKind::UInt8,
        ColumnKind::UInt16,
        ColumnKind::UInt32,
        ColumnKind::UInt64,
        ColumnKind::Float32,
        ColumnKind::Float64,
    ];

    /// Size of one value of this kind in a binary record.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            ColumnKind::Int8 | ColumnKind::UInt8 => 1,
            ColumnKind::Int16 | ColumnKind::UInt16 => 2,
            ColumnKind::Int32 | ColumnKind::UInt32 | ColumnKind::Float32 => 4,
            ColumnKind::Int64 | ColumnKind::UInt64 | ColumnKind::Float64 => 8,
        }
    }

    /// Canonical lower-case name, e.g. `"int64"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ColumnKind::Int8 => "int8",
            ColumnKind::Int16 => "int16",
            ColumnKind::Int32 => "int32",
            ColumnKind::Int64 => "int64",
            ColumnKind::UInt8 => "uint8",
            ColumnKind::UInt16 => "uint16",
            ColumnKind::UInt32 => "uint32",
            ColumnKind::UInt64 => "uint64",
            ColumnKind::Float32 => "float32",
            ColumnKind::Float64 => "float64",
        }
    }

    /// Struct-format character for this kind (`q` for int64, `d` for float64, ...).
    #[must_use]
    pub const fn format_char(self) -> char {
        match self {
            ColumnKind::Int8 => 'b',
            ColumnKind::Int16 => 'h',
            ColumnKind::Int32 => 'i',
            ColumnKind::Int64 => 'q',
            ColumnKind::UInt8 => 'B',
            ColumnKind::UInt16 => 'H',
            ColumnKind::UInt32 => 'I',
            ColumnKind::UInt64 => 'Q',
            ColumnKind::Float32 => 'f',
            ColumnKind::Float64 => 'd',
        }
    }

    /// Parses a struct-format character.
    pub fn from_format_char(c: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.format_char() == c)
            .ok_or_else(|| StoreError::Schema(format!("unsupported format character '{c}'")))
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, ColumnKind::Float32 | ColumnKind::Float64)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts canonical names (`int64`), Rust names (`i64`, `f64`) and
/// single struct-format characters (`q`, `d`).
impl FromStr for ColumnKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "int8" | "i8" => ColumnKind::Int8,
            "int16" | "i16" => ColumnKind::Int16,
            "int32" | "i32" => ColumnKind::Int32,
            "int64" | "i64" => ColumnKind::Int64,
            "uint8" | "u8" => ColumnKind::UInt8,
            "uint16" | "u16" => ColumnKind::UInt16,
            "uint32" | "u32" => ColumnKind::UInt32,
            "uint64" | "u64" => ColumnKind::UInt64,
            "float32" | "f32" => ColumnKind::Float32,
            "float64" | "f64" => ColumnKind::Float64,
            other => {
                let mut chars = other.chars();
                return match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_format_char(c),
                    _ => Err(StoreError::Schema(format!("unsupported column kind '{other}'"))),
                };
            }
        };
        Ok(kind)
    }
}
