//! Named wires and the groups of names that refer to the same wire.
//!
//! Simulators frequently emit one physical wire under several hierarchical names, for example a
//! port of a child module and the parent signal connected to it. The trace format expresses this
//! by declaring several variables under a single identifier code. An [`AliasGroup`] collects all
//! of those names and is the key used for every wire in the rest of the crate.
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A hierarchical, dot-qualified signal name together with its bit width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub width: u32,
}

impl Signal {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    /// The scope path the signal was declared in, i.e. its name without the last component.
    ///
    /// ```rust
    /// use specmine::signal::Signal;
    ///
    /// assert_eq!(Signal::new("TOP.core.valid", 1).scope(), "TOP.core");
    /// assert_eq!(Signal::new("valid", 1).scope(), "");
    /// ```
    pub fn scope(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(scope, _)| scope)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Set of signal names that are electrically the same wire.
///
/// Two groups are equal when they contain the same signals, regardless of the order in which the
/// names were declared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AliasGroup(BTreeSet<Signal>);

impl AliasGroup {
    pub fn new(signals: BTreeSet<Signal>) -> Self {
        Self(signals)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, signal: &Signal) -> bool {
        self.0.contains(signal)
    }

    pub fn signals(&self) -> impl Iterator<Item = &Signal> + '_ {
        self.0.iter()
    }

    /// Width of the widest member
    pub fn width(&self) -> u32 {
        self.0.iter().map(|signal| signal.width).max().unwrap_or(0)
    }

    /// Determine if any member satisfies the predicate
    pub fn any<F>(&self, f: F) -> bool
    where
        F: FnMut(&Signal) -> bool,
    {
        self.0.iter().any(f)
    }

    /// Determine if any member of the group was declared directly in `scope`
    pub fn declared_in(&self, scope: &str) -> bool {
        self.any(|signal| signal.scope() == scope)
    }

    /// Create a new group that keeps only the members satisfying the predicate
    pub fn filter<F>(&self, mut f: F) -> AliasGroup
    where
        F: FnMut(&Signal) -> bool,
    {
        Self(self.0.iter().filter(|signal| f(signal)).cloned().collect())
    }
}

impl FromIterator<Signal> for AliasGroup {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Signal; N]> for AliasGroup {
    fn from(signals: [Signal; N]) -> Self {
        Self::from_iter(signals)
    }
}

impl Display for AliasGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;

        for (index, signal) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{}", signal)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::{AliasGroup, Signal};

    #[test]
    fn equality_ignores_declaration_order() {
        let g1 = AliasGroup::from([Signal::new("TOP.a", 1), Signal::new("TOP.sub.b", 1)]);
        let g2 = AliasGroup::from([Signal::new("TOP.sub.b", 1), Signal::new("TOP.a", 1)]);

        assert_eq!(g1, g2);
    }

    #[test]
    fn group_scopes() {
        let group = AliasGroup::from([Signal::new("TOP.a", 1), Signal::new("TOP.sub.b", 1)]);

        assert!(group.declared_in("TOP"));
        assert!(group.declared_in("TOP.sub"));
        assert!(!group.declared_in("TOP.other"));
    }

    #[test]
    fn filter_members() {
        let group = AliasGroup::from([Signal::new("TOP.a", 3), Signal::new("TOP._GEN_1", 3)]);
        let kept = group.filter(|signal| !signal.name.contains("_GEN"));

        assert_eq!(kept, AliasGroup::from([Signal::new("TOP.a", 3)]));
        assert_eq!(kept.width(), 3);
        assert_eq!(format!("{}", group), "{TOP._GEN_1, TOP.a}");
    }
}
