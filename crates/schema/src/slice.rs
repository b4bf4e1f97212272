use std::ops::Range;

/// Row bounds for a single-partition read.
///
/// Follows the usual half-open slice rules: `None` is open-ended, negative
/// indices count back from the end, anything out of range is clamped, and an
/// end before the start selects nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSlice {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl RowSlice {
    /// Every row.
    pub const ALL: RowSlice = RowSlice {
        start: None,
        end: None,
    };

    #[must_use]
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Resolves the bounds against `len` rows.
    #[must_use]
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let start = clamp_index(self.start, len, 0);
        let end = clamp_index(self.end, len, len);
        start..end.max(start)
    }
}

fn clamp_index(index: Option<i64>, len: usize, default: usize) -> usize {
    match index {
        None => default,
        Some(i) if i < 0 => {
            let from_end = (len as i64).saturating_add(i);
            from_end.max(0) as usize
        }
        Some(i) => (i as u64).min(len as u64) as usize,
    }
}
