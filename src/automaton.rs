//! Finite-state machines that check one temporal pattern over a pair of wires.
//!
//! Each [`PropertyKind`] is implemented by its own transition function over a small closed set of
//! states. An [`Automaton`] consumes the [`Cooccurrence`] sequence produced by the merger one
//! element at a time, counting completed patterns as it goes, and stops at the first violation.
//!
//! ```rust
//! use specmine::automaton::run;
//! use specmine::property::PropertyKind;
//! use specmine::trace::delta_trace;
//!
//! let req = delta_trace([(0, 1), (5, 0), (10, 1)]);
//! let ack = delta_trace([(1, 0), (6, 1), (11, 0)]);
//! let outcome = run(PropertyKind::Alternating, &req, &ack, 1);
//!
//! assert_eq!(outcome.stats.support, 3);
//! assert!(outcome.holds());
//! ```
use crate::merge::{cooccurrences, Cooccurrence};
use crate::property::{PropertyKind, PropertyStats};
use crate::trace::{DeltaTrace, Time};

/// Which of the two wires changed at one point of the merged sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
    Both,
}

impl From<&Cooccurrence<'_>> for Side {
    fn from(cooccurrence: &Cooccurrence<'_>) -> Self {
        match cooccurrence {
            Cooccurrence::Left(_) => Side::A,
            Cooccurrence::Right(_) => Side::B,
            Cooccurrence::Both(..) => Side::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alternating {
    WaitA,
    WaitB,
}

fn alternating(state: Alternating, side: Side, stats: &mut PropertyStats) -> Option<Alternating> {
    match (state, side) {
        (_, Side::Both) => None,
        (Alternating::WaitA, Side::A) => {
            stats.falsifiable = true;
            Some(Alternating::WaitB)
        }
        (Alternating::WaitB, Side::B) => {
            stats.support += 1;
            Some(Alternating::WaitA)
        }
        (Alternating::WaitB, Side::A) | (Alternating::WaitA, Side::B) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Idle,
    Armed(Time),
}

fn next(state: Next, side: Side, time: Time, period: Time, stats: &mut PropertyStats) -> Option<Next> {
    match (state, side) {
        (Next::Idle, Side::A | Side::Both) => {
            stats.falsifiable = true;
            Some(Next::Armed(time))
        }
        (Next::Idle, Side::B) => Some(Next::Idle),
        (Next::Armed(_), Side::Both) => {
            stats.support += 1;
            Some(Next::Armed(time))
        }
        (Next::Armed(_), Side::A) => None,
        (Next::Armed(armed), Side::B) if time - armed == period => {
            stats.support += 1;
            Some(Next::Idle)
        }
        (Next::Armed(_), Side::B) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Idle,
    Holding,
}

fn until(state: Until, side: Side, stats: &mut PropertyStats) -> Option<Until> {
    match (state, side) {
        (Until::Idle, Side::A | Side::Both) => {
            stats.falsifiable = true;
            Some(Until::Holding)
        }
        (Until::Idle, Side::B) => Some(Until::Idle),
        (Until::Holding, Side::Both) => {
            stats.support += 1;
            Some(Until::Holding)
        }
        (Until::Holding, Side::A) => None,
        (Until::Holding, Side::B) => {
            stats.support += 1;
            Some(Until::Idle)
        }
    }
}

/// `Pending2` means `b` answered a change of `a` in the same cycle `a` changed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eventual {
    Idle,
    Pending,
    Pending2,
}

fn eventual(state: Eventual, side: Side, stats: &mut PropertyStats) -> Eventual {
    match (state, side) {
        (Eventual::Idle, Side::A | Side::Both) => {
            stats.falsifiable = true;
            Eventual::Pending
        }
        (Eventual::Idle, Side::B) => Eventual::Idle,
        (Eventual::Pending, Side::Both) => {
            stats.support += 1;
            Eventual::Pending2
        }
        (Eventual::Pending, Side::A) => Eventual::Pending,
        (Eventual::Pending2, Side::Both) => Eventual::Pending2,
        (Eventual::Pending2, Side::A) => Eventual::Pending,
        (Eventual::Pending | Eventual::Pending2, Side::B) => {
            stats.support += 1;
            Eventual::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Alternating(Alternating),
    Next { period: Time, state: Next },
    Until(Until),
    Eventual(Eventual),
}

/// A running pattern checker.
///
/// Once a violation has been observed the automaton is halted and ignores every further event.
#[derive(Debug, Clone)]
pub struct Automaton {
    kind: PropertyKind,
    state: State,
    stats: PropertyStats,
    falsified_at: Option<Time>,
}

impl Automaton {
    /// Create an automaton in its initial state. The `period` is only used by
    /// [`PropertyKind::Next`] and gives the expected distance between a change of `a` and the
    /// answering change of `b`.
    pub fn new(kind: PropertyKind, period: Time) -> Self {
        let state = match kind {
            PropertyKind::Alternating => State::Alternating(Alternating::WaitA),
            PropertyKind::Next => State::Next {
                period,
                state: Next::Idle,
            },
            PropertyKind::Until => State::Until(Until::Idle),
            PropertyKind::Eventual => State::Eventual(Eventual::Idle),
        };

        Self {
            kind,
            state,
            stats: PropertyStats::default(),
            falsified_at: None,
        }
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn is_halted(&self) -> bool {
        self.falsified_at.is_some()
    }

    /// Feed one element of the merged sequence. Returns `false` once the automaton has halted.
    pub fn step(&mut self, cooccurrence: &Cooccurrence<'_>) -> bool {
        if self.is_halted() {
            return false;
        }

        let side = Side::from(cooccurrence);
        let time = cooccurrence.time();
        let stats = &mut self.stats;

        let state = match self.state {
            State::Alternating(state) => alternating(state, side, stats).map(State::Alternating),
            State::Next { period, state } => {
                next(state, side, time, period, stats).map(|state| State::Next { period, state })
            }
            State::Until(state) => until(state, side, stats).map(State::Until),
            State::Eventual(state) => Some(State::Eventual(eventual(state, side, stats))),
        };

        match state {
            Some(state) => {
                self.state = state;
                true
            }
            None => {
                self.stats.falsified = true;
                self.falsified_at = Some(time);
                false
            }
        }
    }

    /// Stop consuming events and report what was observed.
    pub fn finish(self) -> Outcome {
        let mut stats = self.stats;

        if self.kind == PropertyKind::Eventual {
            stats.falsifiable = stats.support > 0;
        }

        Outcome {
            stats,
            falsified_at: self.falsified_at,
        }
    }
}

/// Result of checking one pattern over one pair of traces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub stats: PropertyStats,

    /// Time of the event that violated the pattern
    pub falsified_at: Option<Time>,
}

impl Outcome {
    pub fn holds(&self) -> bool {
        !self.stats.falsified
    }
}

/// Check the pattern `kind` of `a` against `b` over the whole of both traces.
///
/// An alternation between a wire and an identical copy of itself is rejected outright.
pub fn run(kind: PropertyKind, a: &DeltaTrace, b: &DeltaTrace, period: Time) -> Outcome {
    if kind == PropertyKind::Alternating && a == b {
        let stats = PropertyStats {
            support: 0,
            falsifiable: true,
            falsified: true,
        };

        return Outcome {
            stats,
            falsified_at: a.first().map(|(time, _)| time),
        };
    }

    let mut automaton = Automaton::new(kind, period);

    for cooccurrence in cooccurrences(a, b) {
        if !automaton.step(&cooccurrence) {
            break;
        }
    }

    automaton.finish()
}

#[cfg(test)]
mod tests {
    use super::{run, Automaton};
    use crate::merge::cooccurrences;
    use crate::property::{PropertyKind, PropertyStats};
    use crate::trace::delta_trace;

    #[test]
    fn alternating_holds() {
        let a = delta_trace([(0, 1), (5, 0), (10, 1)]);
        let b = delta_trace([(1, 0), (6, 1), (11, 0)]);
        let outcome = run(PropertyKind::Alternating, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 3, falsifiable: true, falsified: false });
        assert_eq!(outcome.falsified_at, None);
    }

    #[test]
    fn alternating_violations() {
        let a = delta_trace([(0, 1), (2, 0), (3, 1)]);
        let b = delta_trace([(1, 1), (4, 0)]);
        let outcome = run(PropertyKind::Alternating, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 1, falsifiable: true, falsified: true });
        assert_eq!(outcome.falsified_at, Some(3));

        let a = delta_trace([(0, 1), (4, 0)]);
        let b = delta_trace([(4, 1)]);
        let outcome = run(PropertyKind::Alternating, &a, &b, 1);

        assert_eq!(outcome.falsified_at, Some(4));
        assert_eq!(outcome.stats.support, 0);
    }

    #[test]
    fn alternating_may_end_waiting_for_b() {
        let a = delta_trace([(0, 1), (5, 0)]);
        let b = delta_trace([(1, 0)]);
        let outcome = run(PropertyKind::Alternating, &a, &b, 1);

        assert!(outcome.holds());
        assert_eq!(outcome.stats.support, 1);
    }

    #[test]
    fn alternating_with_itself() {
        let a = delta_trace([(0, 1), (5, 0), (10, 1)]);
        let outcome = run(PropertyKind::Alternating, &a, &a.clone(), 1);

        assert_eq!(outcome.stats, PropertyStats { support: 0, falsifiable: true, falsified: true });
    }

    #[test]
    fn next_holds() {
        let a = delta_trace([(2, 1), (6, 0)]);
        let b = delta_trace([(4, 0), (8, 1)]);
        let outcome = run(PropertyKind::Next, &a, &b, 2);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });
    }

    #[test]
    fn next_arms_on_joint_change() {
        let a = delta_trace([(2, 1)]);
        let b = delta_trace([(2, 0), (4, 1)]);
        let outcome = run(PropertyKind::Next, &a, &b, 2);

        assert_eq!(outcome.stats, PropertyStats { support: 1, falsifiable: true, falsified: false });
        assert_eq!(outcome.falsified_at, None);
    }

    #[test]
    fn next_violations() {
        let a = delta_trace([(2, 1), (6, 0)]);
        let b = delta_trace([(8, 0)]);
        let outcome = run(PropertyKind::Next, &a, &b, 2);

        assert!(!outcome.holds());
        assert_eq!(outcome.falsified_at, Some(6));

        let b = delta_trace([(5, 0)]);
        let outcome = run(PropertyKind::Next, &a, &b, 2);

        assert_eq!(outcome.falsified_at, Some(5));
        assert_eq!(outcome.stats.support, 0);
    }

    #[test]
    fn next_same_cycle_change_rearms() {
        let a = delta_trace([(2, 1), (4, 0)]);
        let b = delta_trace([(0, 1), (4, 1), (6, 0)]);
        let outcome = run(PropertyKind::Next, &a, &b, 2);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });
    }

    #[test]
    fn until_holds() {
        let a = delta_trace([(2, 1), (20, 0)]);
        let b = delta_trace([(6, 0), (22, 1)]);
        let outcome = run(PropertyKind::Until, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });
    }

    #[test]
    fn until_keeps_holding_on_joint_change() {
        let a = delta_trace([(2, 1), (4, 0)]);
        let b = delta_trace([(4, 1), (6, 0)]);
        let outcome = run(PropertyKind::Until, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });
    }

    #[test]
    fn until_violation() {
        let a = delta_trace([(2, 1), (6, 0), (20, 1)]);
        let b = delta_trace([(0, 1), (8, 0)]);
        let outcome = run(PropertyKind::Until, &a, &b, 1);

        assert!(!outcome.holds());
        assert_eq!(outcome.falsified_at, Some(6));
        assert_eq!(outcome.stats.support, 0);
    }

    #[test]
    fn eventual_support() {
        let a = delta_trace([(2, 1), (20, 0)]);
        let b = delta_trace([(4, 1), (6, 0), (30, 1)]);
        let outcome = run(PropertyKind::Eventual, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });
    }

    #[test]
    fn eventual_rearms_after_joint_change() {
        let a = delta_trace([(2, 1), (4, 0), (6, 1)]);
        let b = delta_trace([(4, 1), (8, 0)]);
        let outcome = run(PropertyKind::Eventual, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 2, falsifiable: true, falsified: false });

        let a = delta_trace([(2, 1), (4, 0), (6, 1), (8, 0)]);
        let b = delta_trace([(4, 1), (8, 0)]);
        let outcome = run(PropertyKind::Eventual, &a, &b, 1);

        assert_eq!(outcome.stats.support, 2);
    }

    #[test]
    fn eventual_is_never_falsified() {
        let a = delta_trace([(2, 1), (4, 0), (6, 1), (8, 0)]);
        let b = delta_trace([(1, 1)]);
        let outcome = run(PropertyKind::Eventual, &a, &b, 1);

        assert_eq!(outcome.stats, PropertyStats { support: 0, falsifiable: false, falsified: false });
    }

    #[test]
    fn eventual_same_cycle_answers() {
        let a = delta_trace([(2, 1), (4, 0), (6, 1)]);
        let b = delta_trace([(4, 1), (6, 0), (9, 1)]);
        let outcome = run(PropertyKind::Eventual, &a, &b, 1);

        assert_eq!(outcome.stats.support, 2);
        assert!(outcome.holds());
    }

    #[test]
    fn halted_automaton_ignores_events() {
        let a = delta_trace([(0, 1), (1, 0), (5, 1)]);
        let b = delta_trace([(3, 1), (7, 0)]);
        let mut automaton = Automaton::new(PropertyKind::Until, 1);
        let mut consumed = 0;

        for cooccurrence in cooccurrences(&a, &b) {
            if automaton.step(&cooccurrence) {
                consumed += 1;
            }
        }

        assert!(automaton.is_halted());
        assert_eq!(consumed, 1);

        let outcome = automaton.finish();
        assert_eq!(outcome.falsified_at, Some(1));
        assert_eq!(outcome.stats.support, 0);
    }

    #[test]
    fn lone_b_changes() {
        let empty = delta_trace([]);
        let b = delta_trace([(3, 1)]);

        for kind in [PropertyKind::Next, PropertyKind::Until, PropertyKind::Eventual] {
            let outcome = run(kind, &empty, &b, 1);

            assert!(outcome.holds(), "{kind} falsified without any change of a");
            assert_eq!(outcome.stats, PropertyStats::default());
        }

        let outcome = run(PropertyKind::Alternating, &empty, &b, 1);
        assert_eq!(outcome.falsified_at, Some(3));
    }
}
