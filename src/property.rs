//! Mined properties and the statistics gathered for them.
//!
//! A [`Property`] names a temporal relation between two wires and is used purely as a key: two
//! properties are the same when they have the same kind and the same operands. The evidence
//! collected for a property while mining a trace is kept separately in [`PropertyStats`], and a
//! [`MinerResult`] maps each property to its statistics.
//!
//! A `MinerResult` is the hand-off artifact between independent runs, so it can be stored as
//! JSON and read back without losing any field.
//!
//! ```rust
//! use specmine::property::{MinerResult, Property, PropertyKind, PropertyStats};
//! use specmine::signal::{AliasGroup, Signal};
//!
//! let property = Property::new(
//!     PropertyKind::Until,
//!     AliasGroup::from([Signal::new("TOP.req", 1)]),
//!     AliasGroup::from([Signal::new("TOP.ack", 1)]),
//! );
//!
//! let mut result = MinerResult::new();
//! result.insert(property.clone(), PropertyStats { support: 3, falsifiable: true, falsified: false });
//!
//! let json = result.to_json().unwrap();
//! assert_eq!(MinerResult::from_json(&json).unwrap(), result);
//! ```
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::AliasGroup;

/// The temporal relation a property asserts between its operands `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Changes of `a` and `b` strictly alternate, starting with `a`
    Alternating,

    /// Every change of `a` is followed by a change of `b` exactly one clock period later
    Next,

    /// After `a` changes, `a` does not change again until `b` changes
    Until,

    /// Every change of `a` is eventually followed by a change of `b`
    Eventual,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 4] = [Self::Alternating, Self::Next, Self::Until, Self::Eventual];
}

impl Display for PropertyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Alternating => "Alternating",
            Self::Next => "Next",
            Self::Until => "Until",
            Self::Eventual => "Eventual",
        };

        write!(f, "{}", name)
    }
}

/// Identity of a mined property. Statistics are deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Property {
    pub kind: PropertyKind,
    pub a: AliasGroup,
    pub b: AliasGroup,
}

impl Property {
    pub fn new(kind: PropertyKind, a: AliasGroup, b: AliasGroup) -> Self {
        Self { kind, a, b }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {})", self.kind, self.a, self.b)
    }
}

/// Evidence gathered for a property over one or more traces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyStats {
    /// Number of times the pattern was completed
    pub support: u64,

    /// The pattern had at least one opportunity to be violated
    pub falsifiable: bool,

    /// The pattern was violated at least once
    pub falsified: bool,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("unable to access property file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid property file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct Entry {
    property: Property,
    stats: PropertyStats,
}

/// Statistics of every property mined from one trace, or aggregated over several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Entry>", into = "Vec<Entry>")]
pub struct MinerResult(HashMap<Property, PropertyStats>);

impl From<Vec<Entry>> for MinerResult {
    fn from(entries: Vec<Entry>) -> Self {
        entries.into_iter().map(|entry| (entry.property, entry.stats)).collect()
    }
}

impl From<MinerResult> for Vec<Entry> {
    fn from(result: MinerResult) -> Self {
        let mut entries: Vec<Entry> = result
            .0
            .into_iter()
            .map(|(property, stats)| Entry { property, stats })
            .collect();

        entries.sort_by(|e1, e2| e1.property.cmp(&e2.property));
        entries
    }
}

impl MinerResult {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, property: &Property) -> Option<&PropertyStats> {
        self.0.get(property)
    }

    /// Set the statistics of a property, returning the previous statistics if present
    pub fn insert(&mut self, property: Property, stats: PropertyStats) -> Option<PropertyStats> {
        self.0.insert(property, stats)
    }

    pub fn entry(&mut self, property: Property) -> hash_map::Entry<'_, Property, PropertyStats> {
        self.0.entry(property)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Property, PropertyStats> {
        self.0.iter()
    }

    /// Properties that survived every trace and were completed at least once, highest support
    /// first.
    pub fn surviving(&self) -> Vec<(&Property, &PropertyStats)> {
        let mut survivors: Vec<_> = self
            .0
            .iter()
            .filter(|(_, stats)| !stats.falsified && stats.support > 0)
            .collect();

        survivors.sort_by(|(p1, s1), (p2, s2)| s2.support.cmp(&s1.support).then_with(|| p1.cmp(p2)));
        survivors
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the result to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        Ok(())
    }

    /// Read a result previously written with [`MinerResult::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl FromIterator<(Property, PropertyStats)> for MinerResult {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Property, PropertyStats)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(Property, PropertyStats)> for MinerResult {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (Property, PropertyStats)>,
    {
        self.0.extend(iter);
    }
}

impl IntoIterator for MinerResult {
    type Item = (Property, PropertyStats);
    type IntoIter = hash_map::IntoIter<Property, PropertyStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MinerResult {
    type Item = (&'a Property, &'a PropertyStats);
    type IntoIter = hash_map::Iter<'a, Property, PropertyStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
