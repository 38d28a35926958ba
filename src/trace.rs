//! Time-ordered sequences of signal values.
//!
//! A [`Trace`] is an associative map from a simulation timestamp to a state. Because the map is
//! keyed by time, a trace is always chronologically ordered and never holds two entries for the
//! same timestamp: inserting a state at an occupied time replaces the previous state. In this
//! crate the state of interest is the decoded integer [`Value`] of a wire, and a trace of those
//! values is called a [`DeltaTrace`] since it only records the times at which the value changed.
//!
//! # Examples
//!
//! ```rust
//! use specmine::trace::{delta_trace, Trace};
//!
//! let mut trace: Trace<char> = Trace::new();
//! trace.insert(0, 'a');
//! trace.insert(5, 'b');
//! trace.insert(5, 'c');  // replaces 'b'
//!
//! assert_eq!(trace.len(), 2);
//! assert_eq!(trace.at_time(5), Some(&'c'));
//!
//! let deltas = delta_trace([(0, 1), (3, 0)]);
//! let times: Vec<u64> = deltas.times().collect();
//! assert_eq!(times, vec![0, 3]);
//! ```
use std::collections::{btree_map, BTreeMap, HashMap};

use num::BigUint;

use crate::signal::AliasGroup;

/// Simulation timestamp, in the time unit declared by the trace file.
pub type Time = u64;

/// Decoded value of an arbitrary-width bit vector.
pub type Value = BigUint;

/// A set of states where each state is associated with a distinct time.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Trace<T>(BTreeMap<Time, T>);

/// Value changes of a single wire.
pub type DeltaTrace = Trace<Value>;

/// Build a [`DeltaTrace`] from `(time, value)` pairs of machine-sized values.
pub fn delta_trace<I>(events: I) -> DeltaTrace
where
    I: IntoIterator<Item = (Time, u64)>,
{
    events
        .into_iter()
        .map(|(time, value)| (time, Value::from(value)))
        .collect()
}

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Time, T)> for Trace<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Time, T)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl<T> Trace<T> {
    /// Create a new empty trace. Equivalent to [`Trace::default()`]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of elements in the trace
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Determine if the trace contains any elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the state for a given time. Returns None if the time is not present in the trace.
    pub fn at_time(&self, time: Time) -> Option<&T> {
        self.0.get(&time)
    }

    /// Insert a state for a given time into the trace. Returns the prior state if it exists.
    pub fn insert(&mut self, time: Time, state: T) -> Option<T> {
        self.0.insert(time, state)
    }

    /// The earliest element of the trace
    pub fn first(&self) -> Option<(Time, &T)> {
        self.0.iter().next().map(|(&time, state)| (time, state))
    }

    /// Keep only the elements whose time and state satisfy the predicate
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(Time, &T) -> bool,
    {
        self.0.retain(|&time, state| f(time, state));
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter(self.0.iter())
    }

    pub fn times(&self) -> Times<'_, T> {
        Times(self.0.keys())
    }

    pub fn states(&self) -> States<'_, T> {
        States(self.0.values())
    }
}

/// Iterator over the times in a trace, in chronological order.
pub struct Times<'a, T>(btree_map::Keys<'a, Time, T>);

impl<'a, T> Iterator for Times<'a, T> {
    type Item = Time;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Iterator over the states in a trace, in chronological order.
pub struct States<'a, T>(btree_map::Values<'a, Time, T>);

impl<'a, T> Iterator for States<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Borrowing iterator over the (time, state) pairs in a trace, in chronological order.
pub struct Iter<'a, T>(btree_map::Iter<'a, Time, T>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Time, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&time, state)| (time, state))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, T> IntoIterator for &'a Trace<T> {
    type Item = (Time, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over the (time, state) pairs in a trace, in chronological order.
pub struct IntoIter<T>(btree_map::IntoIter<Time, T>);

impl<T> Iterator for IntoIter<T> {
    type Item = (Time, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> IntoIterator for Trace<T> {
    type Item = (Time, T);
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.0.into_iter())
    }
}

/// Value changes of every wire in one simulation run, keyed by the wire's alias group.
pub type TraceStore = HashMap<AliasGroup, DeltaTrace>;
