use std::fmt::Display;

use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

/// A 1-based, inclusive coordinate interval `[start, end]`.
///
/// Constructed only from validated columns, so `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    start: u64,
    end:   u64,
}

impl Span {
    /// Creates a new `Span`. Returns `None` unless `1 <= start <= end`.
    pub fn new(
        start: u64,
        end: u64,
    ) -> Option<Self> {
        if start == 0 || start > end {
            None
        }
        else {
            Some(Self { start, end })
        }
    }

    pub fn start(&self) -> u64 { self.start }

    pub fn end(&self) -> u64 { self.end }

    /// Number of bases covered, endpoints included.
    pub fn length(&self) -> u64 { self.end - self.start + 1 }

    /// Inclusive intersection test; touching endpoints count.
    pub fn intersects(
        &self,
        other: &Self,
    ) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Checks if this span is fully contained within another span.
    pub fn is_in(
        &self,
        other: &Self,
    ) -> bool {
        self.start >= other.start && self.end <= other.end
    }
}

impl Display for Span {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Merges spans into the minimal set of contiguous unions.
///
/// Overlapping spans and spans that abut (`a.end + 1 == b.start`) are joined.
/// The result is sorted by start.
pub fn merge_spans<I>(spans: I) -> Vec<Span>
where
    I: IntoIterator<Item = Span>, {
    let mut merged: Vec<Span> = Vec::new();
    for span in spans.into_iter().sorted() {
        match merged.last_mut() {
            Some(last) if span.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(span.end);
            },
            _ => merged.push(span),
        }
    }
    merged
}
