//! Byte ranges into a script.

use std::fmt;
use std::ops::Range;

/// A script longer than `u32::MAX` bytes cannot be addressed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("offset {0} does not fit a span (scripts are limited to {max} bytes)", max = u32::MAX)]
pub struct SpanError(pub usize);

/// Half-open byte range `start..end` into a script source.
///
/// Parse errors, tree nodes and evaluation errors all carry one; the
/// diagnostic emitter maps it back to source lines.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder for offsets that cannot be represented.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Empty span at `offset`, used for "expected ..." errors.
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span::new(offset, offset)
    }

    pub fn try_from_range(range: Range<usize>) -> Result<Self, SpanError> {
        let offset = |value: usize| u32::try_from(value).map_err(|_| SpanError(value));
        Ok(Span::new(offset(range.start)?, offset(range.end)?))
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// The covered text of `source`, or `""` if the span lies outside it.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.to_range()).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Span;
    crate::static_assert_size!(Span, 8);
}

#[cfg(test)]
mod tests;
