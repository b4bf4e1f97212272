use std::fmt;

use crate::kind::ColumnKind;

/// One numeric cell, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64,
);

/// 2^64: strictly above every value an integer column can hold.
const INTEGER_LIMIT: f64 = 18_446_744_073_709_551_616.0;

impl Value {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::I8(_) => ColumnKind::Int8,
            Value::I16(_) => ColumnKind::Int16,
            Value::I32(_) => ColumnKind::Int32,
            Value::I64(_) => ColumnKind::Int64,
            Value::U8(_) => ColumnKind::UInt8,
            Value::U16(_) => ColumnKind::UInt16,
            Value::U32(_) => ColumnKind::UInt32,
            Value::U64(_) => ColumnKind::UInt64,
            Value::F32(_) => ColumnKind::Float32,
            Value::F64(_) => ColumnKind::Float64,
        }
    }

    /// Widens the value to `f64` (possibly rounding large integers).
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::I8(v) => v as f64,
            Value::I16(v) => v as f64,
            Value::I32(v) => v as f64,
            Value::I64(v) => v as f64,
            Value::U8(v) => v as f64,
            Value::U16(v) => v as f64,
            Value::U32(v) => v as f64,
            Value::U64(v) => v as f64,
            Value::F32(v) => v as f64,
            Value::F64(v) => v,
        }
    }

    /// Converts the value to `kind` if, and only if, no information is lost.
    ///
    /// Integers must fit the target range; floats convert to integers only
    /// when integral; integers convert to floats only when exactly
    /// representable; `f64 -> f32` requires an exact round trip (NaN and the
    /// infinities pass).
    #[must_use]
    pub fn cast(self, kind: ColumnKind) -> Option<Value> {
        if self.kind() == kind {
            return Some(self);
        }
        match kind {
            ColumnKind::Int8 => self.integral().and_then(|i| i8::try_from(i).ok()).map(Value::I8),
            ColumnKind::Int16 => self.integral().and_then(|i| i16::try_from(i).ok()).map(Value::I16),
            ColumnKind::Int32 => self.integral().and_then(|i| i32::try_from(i).ok()).map(Value::I32),
            ColumnKind::Int64 => self.integral().and_then(|i| i64::try_from(i).ok()).map(Value::I64),
            ColumnKind::UInt8 => self.integral().and_then(|i| u8::try_from(i).ok()).map(Value::U8),
            ColumnKind::UInt16 => self.integral().and_then(|i| u16::try_from(i).ok()).map(Value::U16),
            ColumnKind::UInt32 => self.integral().and_then(|i| u32::try_from(i).ok()).map(Value::U32),
            ColumnKind::UInt64 => self.integral().and_then(|i| u64::try_from(i).ok()).map(Value::U64),
            ColumnKind::Float32 => self.to_f32().map(Value::F32),
            ColumnKind::Float64 => self.to_f64().map(Value::F64),
        }
    }

    fn integer(&self) -> Option<i128> {
        match *self {
            Value::I8(v) => Some(v as i128),
            Value::I16(v) => Some(v as i128),
            Value::I32(v) => Some(v as i128),
            Value::I64(v) => Some(v as i128),
            Value::U8(v) => Some(v as i128),
            Value::U16(v) => Some(v as i128),
            Value::U32(v) => Some(v as i128),
            Value::U64(v) => Some(v as i128),
            Value::F32(_) | Value::F64(_) => None,
        }
    }

    fn integral(&self) -> Option<i128> {
        match *self {
            Value::F32(f) => exact_integer(f as f64),
            Value::F64(f) => exact_integer(f),
            _ => self.integer(),
        }
    }

    fn to_f64(self) -> Option<f64> {
        match self {
            Value::F32(f) => Some(f as f64),
            Value::F64(f) => Some(f),
            _ => {
                let i = self.integer()?;
                let f = i as f64;
                (f as i128 == i).then_some(f)
            }
        }
    }

    fn to_f32(self) -> Option<f32> {
        match self {
            Value::F32(f) => Some(f),
            Value::F64(f) => {
                let narrowed = f as f32;
                (f.is_nan() || narrowed as f64 == f).then_some(narrowed)
            }
            _ => {
                let i = self.integer()?;
                let f = i as f32;
                (f as i128 == i).then_some(f)
            }
        }
    }
}

fn exact_integer(f: f64) -> Option<i128> {
    if !f.is_finite() || f.fract() != 0.0 || f.abs() >= INTEGER_LIMIT {
        return None;
    }
    Some(f as i128)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
        }
    }
}
