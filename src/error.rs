use alloc::{borrow::Cow, vec::Vec};
use core::fmt;

/// A record of what a parser expected at some position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub enum Expectation {
    /// A mismatch with no further explanation.
    Unknown { index: usize },
    /// A specific symbol or pattern was expected.
    Expected {
        index: usize,
        value: Cow<'static, str>,
    },
    /// A named rule failed.
    ///
    /// When the final report is built, a label replaces the `length` records
    /// reported before it, so the report reads "expected number" rather than
    /// listing every digit and sign.
    Label {
        index: usize,
        length: usize,
        name: Cow<'static, str>,
    },
}

impl Expectation {
    pub const fn unknown(index: usize) -> Self {
        Self::Unknown { index }
    }

    pub fn expected(index: usize, value: impl Into<Cow<'static, str>>) -> Self {
        Self::Expected {
            index,
            value: value.into(),
        }
    }

    pub fn label(index: usize, length: usize, name: impl Into<Cow<'static, str>>) -> Self {
        Self::Label {
            index,
            length,
            name: name.into(),
        }
    }

    /// The position the record applies to.
    pub const fn index(&self) -> usize {
        match self {
            Self::Unknown { index } => *index,
            Self::Expected { index, .. } => *index,
            Self::Label { index, .. } => *index,
        }
    }

    /// Weight of the record when a label collapses the records before it.
    ///
    /// A nested label counts as its own length less one.
    fn weight(&self) -> usize {
        match self {
            Self::Label { length, .. } => length.saturating_sub(1),
            _ => 1,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { .. } => f.write_str("<unknown>"),
            Self::Expected { value, .. } => f.write_str(value),
            Self::Label { name, .. } => f.write_str(name),
        }
    }
}

/// A snapshot of the [`ErrorSink`] used to count records added since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    index: Option<usize>,
    len: usize,
}

/// Accumulator of expectations for the farthest failure seen so far.
///
/// Only records at the farthest position are kept. Reporting at a greater
/// position discards everything collected before; reporting at a smaller one
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSink {
    farthest: Option<usize>,
    records: Vec<Expectation>,
}

impl ErrorSink {
    pub const fn new() -> Self {
        Self {
            farthest: None,
            records: Vec::new(),
        }
    }

    /// Registers a failure at `index`, optionally with a record of what was
    /// expected there.
    ///
    /// A failure without a record still moves the farthest position forward.
    pub fn add(&mut self, index: usize, record: Option<Expectation>) {
        if self.farthest.map_or(true, |farthest| index > farthest) {
            self.farthest = Some(index);
            self.records.clear();
        }
        if let Some(record) = record {
            if self.farthest == Some(index) {
                self.records.push(record);
            }
        }
    }

    /// The farthest position at which a failure was reported.
    pub const fn farthest(&self) -> Option<usize> {
        self.farthest
    }

    /// The raw records at the farthest position, in reporting order.
    pub fn records(&self) -> &[Expectation] {
        &self.records
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            index: self.farthest,
            len: self.records.len(),
        }
    }

    /// Number of records added since `checkpoint`.
    ///
    /// If the farthest position moved since, every current record is new.
    pub fn count_since(&self, checkpoint: Checkpoint) -> usize {
        if checkpoint.index == self.farthest {
            self.records.len().saturating_sub(checkpoint.len)
        } else {
            self.records.len()
        }
    }

    /// Builds the final expectation list, collapsing labelled runs.
    pub fn finish(&self) -> Vec<Expectation> {
        let mut out: Vec<Expectation> = Vec::with_capacity(self.records.len());
        for record in &self.records {
            if let Expectation::Label { length, .. } = record {
                let mut weight = 0;
                let mut count = 0;
                for prev in out.iter().rev() {
                    if weight >= *length {
                        break;
                    }
                    weight += prev.weight();
                    count += 1;
                }
                out.truncate(out.len() - count);
            }
            out.push(record.clone());
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn farthest_wins() {
        let mut sink = ErrorSink::new();
        sink.add(1, Some(Expectation::unknown(1)));
        sink.add(3, Some(Expectation::expected(3, "'a'")));
        sink.add(2, Some(Expectation::unknown(2)));
        sink.add(3, Some(Expectation::expected(3, "'b'")));
        assert_eq!(sink.farthest(), Some(3));
        assert_eq!(
            sink.records(),
            &[Expectation::expected(3, "'a'"), Expectation::expected(3, "'b'")]
        );
    }

    #[test]
    fn bare_failure_clears_records() {
        let mut sink = ErrorSink::new();
        sink.add(0, Some(Expectation::unknown(0)));
        sink.add(4, None);
        assert_eq!(sink.farthest(), Some(4));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn count_since_checkpoint() {
        let mut sink = ErrorSink::new();
        sink.add(2, Some(Expectation::unknown(2)));
        let cp = sink.checkpoint();
        sink.add(2, Some(Expectation::unknown(2)));
        assert_eq!(sink.count_since(cp), 1);
        sink.add(5, Some(Expectation::unknown(5)));
        assert_eq!(sink.count_since(cp), 1);
    }

    #[test]
    fn label_collapses_run() {
        let mut sink = ErrorSink::new();
        sink.add(0, Some(Expectation::expected(0, "'x'")));
        sink.add(0, Some(Expectation::expected(0, "'+'")));
        sink.add(0, Some(Expectation::expected(0, "'-'")));
        sink.add(0, Some(Expectation::label(0, 2, "sign")));
        assert_eq!(
            sink.finish(),
            [Expectation::expected(0, "'x'"), Expectation::label(0, 2, "sign")]
        );
    }

    #[test]
    fn nested_labels_collapse_to_outer() {
        let mut sink = ErrorSink::new();
        sink.add(0, Some(Expectation::expected(0, "'0'")));
        sink.add(0, Some(Expectation::expected(0, "'1'")));
        sink.add(0, Some(Expectation::label(0, 2, "digit")));
        sink.add(0, Some(Expectation::label(0, 3, "number")));
        assert_eq!(sink.finish(), [Expectation::label(0, 3, "number")]);
    }

    #[test]
    fn empty_label_collapses_nothing() {
        let mut sink = ErrorSink::new();
        sink.add(0, Some(Expectation::unknown(0)));
        sink.add(0, Some(Expectation::label(0, 0, "empty")));
        assert_eq!(
            sink.finish(),
            [Expectation::unknown(0), Expectation::label(0, 0, "empty")]
        );
    }
}
