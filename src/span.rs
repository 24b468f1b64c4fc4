use core::ops::Range;

/// A range of source positions.
///
/// A [`Span`] is what [`Parse::recognize`](crate::Parse::recognize) produces:
/// the positions between where a parser started and where it stopped. It does
/// not borrow the source, use [`Span::of_str`] or [`Span::of_slice`] to get at
/// the consumed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a new [`Span`] between `start` and `end`.
    ///
    /// `end` is clamped so that it is never before `start`.
    pub const fn new(start: usize, end: usize) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    /// Gets the start position of the [`Span`].
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Gets the end position of the [`Span`].
    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Checks if the [`Span`] is empty.
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Gets the text covered by the [`Span`].
    ///
    /// Returns [`None`] if the span is out of bounds or does not fall on char
    /// boundaries.
    pub fn of_str<'a>(&self, src: &'a str) -> Option<&'a str> {
        src.get(self.range())
    }

    /// Gets the elements covered by the [`Span`].
    pub fn of_slice<'a, T>(&self, src: &'a [T]) -> Option<&'a [T]> {
        src.get(self.range())
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Range<usize> {
        span.range()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Span {
        Span::new(range.start, range.end)
    }
}
