//! Combination of the properties mined from several traces.
//!
//! Support accumulates across traces until a trace falsifies the property. From then on the
//! property stays falsified and its support no longer changes. A property is falsifiable once any
//! trace gave it a chance to fail.
use std::collections::hash_map::Entry;

use tracing::info;

use crate::property::{MinerResult, PropertyStats};

/// Fold the statistics observed in a later trace into the statistics gathered so far.
pub fn merge_stats(merged: &mut PropertyStats, later: PropertyStats) {
    merged.falsifiable |= later.falsifiable;

    if merged.falsified {
        return;
    }

    if later.falsified {
        merged.falsified = true;
    } else {
        merged.support += later.support;
    }
}

/// Fold every property of `later` into `merged`.
pub fn merge_into(merged: &mut MinerResult, later: MinerResult) {
    for (property, stats) in later {
        match merged.entry(property) {
            Entry::Occupied(mut entry) => merge_stats(entry.get_mut(), stats),
            Entry::Vacant(entry) => {
                entry.insert(stats);
            }
        }
    }
}

/// Combine the results of several traces, in order.
pub fn aggregate<I>(results: I) -> MinerResult
where
    I: IntoIterator<Item = MinerResult>,
{
    let mut merged = MinerResult::new();
    let mut count = 0;

    for result in results {
        merge_into(&mut merged, result);
        count += 1;
    }

    info!(traces = count, properties = merged.len(), "aggregated results");
    merged
}
