//! Resampling of asynchronous value changes onto the rising edges of a reference clock.
//!
//! Every wire of a synchronous design is only meaningful at the instant the clock rises, so each
//! [`DeltaTrace`] is converted into the sequence of values a flip-flop would observe at those
//! instants. A change that happens at the same timestamp as a rising edge is not yet visible to
//! that edge: the edge observes the value held before the change, and the new value becomes
//! visible from the next edge onward.
//!
//! # Examples
//!
//! ```rust
//! use specmine::sampling::{posedges, sample};
//! use specmine::trace::delta_trace;
//!
//! let clock = delta_trace([(0, 0), (1, 1), (2, 0), (3, 1), (4, 0), (5, 1)]);
//! let data = delta_trace([(0, 100), (2, 200), (4, 300)]);
//!
//! let edges = posedges(&clock);
//! let sampled = sample(&edges, &data).unwrap();
//!
//! assert_eq!(sampled, delta_trace([(1, 100), (3, 200), (5, 300)]));
//! ```
use std::cmp::Ordering;
use std::collections::BTreeMap;

use num::Zero;
use thiserror::Error;

use crate::trace::{DeltaTrace, Time, Value};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The sampled trace must define its value at time 0
    #[error("initial value required: first change at {0:?}")]
    MissingInitialValue(Option<Time>),

    /// The clock edges do not strictly increase, so the sampling order is undefined
    #[error("ambiguous sample: clock edge at {edge} follows edge at {previous}")]
    AmbiguousSample { previous: Time, edge: Time },
}

/// Times at which the clock rises: every change to 1 whose preceding value was not 1.
pub fn posedges(clock: &DeltaTrace) -> Vec<Time> {
    let one = Value::from(1u32);
    let mut previous: Option<&Value> = None;
    let mut edges = Vec::new();

    for (time, value) in clock {
        if *value == one && previous != Some(&one) {
            edges.push(time);
        }

        previous = Some(value);
    }

    edges
}

/// Most frequent spacing between consecutive rising edges, preferring the shortest on ties.
pub fn clock_period(edges: &[Time]) -> Option<Time> {
    let mut counts: BTreeMap<Time, usize> = BTreeMap::new();

    for pair in edges.windows(2) {
        *counts.entry(pair[1] - pair[0]).or_default() += 1;
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(Time, usize)>, (gap, count)| match best {
            Some((_, most)) if most >= count => best,
            _ => Some((gap, count)),
        })
        .map(|(gap, _)| gap)
}

struct Recorder {
    samples: DeltaTrace,
    last: Option<Value>,
}

impl Recorder {
    /// Record a sample only when it differs from the previously recorded one
    fn record(&mut self, time: Time, value: &Value) {
        if self.last.as_ref() != Some(value) {
            self.samples.insert(time, value.clone());
            self.last = Some(value.clone());
        }
    }
}

/// Sample `signal` at the given rising-edge times.
///
/// The returned trace only contains a sample when its value differs from the previous sample,
/// except for the first edge which is always recorded.
pub fn sample(edges: &[Time], signal: &DeltaTrace) -> Result<DeltaTrace, SampleError> {
    match signal.first() {
        Some((0, _)) => {}
        first => return Err(SampleError::MissingInitialValue(first.map(|(time, _)| time))),
    }

    let mut recorder = Recorder {
        samples: DeltaTrace::new(),
        last: None,
    };
    let mut held = Value::zero();
    let mut changes = signal.iter().peekable();
    let mut edges = edges.iter().copied().peekable();
    let mut previous_edge: Option<Time> = None;

    while let Some(&edge) = edges.peek() {
        if let Some(previous) = previous_edge.filter(|&previous| previous >= edge) {
            return Err(SampleError::AmbiguousSample { previous, edge });
        }

        match changes.peek().map(|(time, _)| time.cmp(&edge)) {
            Some(Ordering::Equal) => {
                recorder.record(edge, &held);

                if let Some((_, value)) = changes.next() {
                    held = value.clone();
                }

                previous_edge = edges.next();
            }
            Some(Ordering::Less) => {
                if let Some((_, value)) = changes.next() {
                    held = value.clone();
                }
            }
            Some(Ordering::Greater) | None => {
                recorder.record(edge, &held);
                previous_edge = edges.next();
            }
        }
    }

    Ok(recorder.samples)
}
