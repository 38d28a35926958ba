//! Interleaving of two value-change streams into one sequence of co-occurrences.
//!
//! The pattern automatons never look at the values of a wire, only at *when* it changed relative
//! to another wire. [`cooccurrences`] walks two [`DeltaTrace`]s in lock-step and yields one
//! [`Cooccurrence`] for every distinct timestamp found in either trace, telling whether the first
//! wire changed, the second wire changed, or both changed at that time.
//!
//! ```rust
//! use specmine::merge::{cooccurrences, Cooccurrence};
//! use specmine::trace::delta_trace;
//!
//! let a = delta_trace([(0, 1), (4, 0)]);
//! let b = delta_trace([(2, 1), (4, 1)]);
//! let times: Vec<u64> = cooccurrences(&a, &b).map(|c| c.time()).collect();
//!
//! assert_eq!(times, vec![0, 2, 4]);
//! ```
use std::cmp::Ordering;
use std::iter::{FusedIterator, Peekable};

use crate::trace::{DeltaTrace, Iter, Time, Value};

/// A single value change as seen by the merger
pub type Change<'a> = (Time, &'a Value);

/// What happened at one timestamp of the merged sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooccurrence<'a> {
    /// Only the first trace changed
    Left(Change<'a>),

    /// Only the second trace changed
    Right(Change<'a>),

    /// Both traces changed at the same time
    Both(Change<'a>, Change<'a>),
}

impl<'a> Cooccurrence<'a> {
    pub fn time(&self) -> Time {
        match self {
            Self::Left((time, _)) | Self::Right((time, _)) | Self::Both((time, _), _) => *time,
        }
    }

    pub fn left(&self) -> Option<Change<'a>> {
        match *self {
            Self::Left(change) | Self::Both(change, _) => Some(change),
            Self::Right(_) => None,
        }
    }

    pub fn right(&self) -> Option<Change<'a>> {
        match *self {
            Self::Right(change) | Self::Both(_, change) => Some(change),
            Self::Left(_) => None,
        }
    }
}

/// Iterator created by [`cooccurrences`]
pub struct Cooccurrences<'a> {
    left: Peekable<Iter<'a, Value>>,
    right: Peekable<Iter<'a, Value>>,
}

impl<'a> Iterator for Cooccurrences<'a> {
    type Item = Cooccurrence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ordering = match (self.left.peek(), self.right.peek()) {
            (Some((t1, _)), Some((t2, _))) => t1.cmp(t2),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => return None,
        };

        let item = match ordering {
            Ordering::Less => Cooccurrence::Left(self.left.next()?),
            Ordering::Greater => Cooccurrence::Right(self.right.next()?),
            Ordering::Equal => Cooccurrence::Both(self.left.next()?, self.right.next()?),
        };

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_lower, l_upper) = self.left.size_hint();
        let (r_lower, r_upper) = self.right.size_hint();
        let upper = l_upper.zip(r_upper).and_then(|(l, r)| l.checked_add(r));

        (l_lower.max(r_lower), upper)
    }
}

impl<'a> FusedIterator for Cooccurrences<'a> {}

/// Merge two traces into the ordered sequence of their co-occurrences.
///
/// Runs in a single pass over both traces and yields exactly one element per distinct timestamp.
pub fn cooccurrences<'a>(left: &'a DeltaTrace, right: &'a DeltaTrace) -> Cooccurrences<'a> {
    Cooccurrences {
        left: left.iter().peekable(),
        right: right.iter().peekable(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{cooccurrences, Cooccurrence};
    use crate::trace::{delta_trace, DeltaTrace, Value};

    #[test]
    fn tie_breaks() {
        let a = delta_trace([(0, 1), (5, 0)]);
        let b = delta_trace([(0, 0), (3, 1)]);
        let one = Value::from(1u32);
        let zero = Value::from(0u32);
        let merged: Vec<_> = cooccurrences(&a, &b).collect();

        assert_eq!(
            merged,
            vec![
                Cooccurrence::Both((0, &one), (0, &zero)),
                Cooccurrence::Right((3, &one)),
                Cooccurrence::Left((5, &zero)),
            ]
        );
    }

    #[test]
    fn one_element_per_distinct_time() {
        let a = delta_trace([(0, 1), (2, 0), (7, 1), (9, 0)]);
        let b = delta_trace([(1, 1), (2, 1), (8, 0), (9, 1), (12, 0)]);
        let times: Vec<u64> = cooccurrences(&a, &b).map(|c| c.time()).collect();
        let distinct: BTreeSet<u64> = a.times().chain(b.times()).collect();

        assert_eq!(times, distinct.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn sides_recover_inputs() {
        let a = delta_trace([(0, 1), (2, 0), (7, 1), (9, 0)]);
        let b = delta_trace([(1, 1), (2, 1), (8, 0), (9, 1), (12, 0)]);

        let left: DeltaTrace = cooccurrences(&a, &b)
            .filter_map(|c| c.left())
            .map(|(time, value)| (time, value.clone()))
            .collect();
        let right: DeltaTrace = cooccurrences(&a, &b)
            .filter_map(|c| c.right())
            .map(|(time, value)| (time, value.clone()))
            .collect();

        assert_eq!(left, a);
        assert_eq!(right, b);
    }

    #[test]
    fn empty_inputs() {
        let a = delta_trace([(3, 1)]);
        let empty = DeltaTrace::new();

        assert_eq!(cooccurrences(&empty, &empty).count(), 0);
        assert!(cooccurrences(&a, &empty).all(|c| matches!(c, Cooccurrence::Left(_))));
        assert!(cooccurrences(&empty, &a).all(|c| matches!(c, Cooccurrence::Right(_))));
    }
}
