//! Discovery of candidate properties in a single trace.
//!
//! Properties are only proposed between wires that are declared together: for every module of
//! the design hierarchy, every ordered pair of distinct alias groups with a member declared
//! directly in that module is checked against every [`PropertyKind`].
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::automaton::run;
use crate::clean::{prepare, PreparedTrace};
use crate::config::MinerConfig;
use crate::module::Module;
use crate::parser::read_trace;
use crate::property::{MinerResult, Property, PropertyKind};
use crate::signal::AliasGroup;
use crate::Error;

/// Alias groups of the trace with a member declared directly in `module`, in a stable order
fn module_groups<'a>(module: &Module, trace: &'a PreparedTrace) -> Vec<&'a AliasGroup> {
    let mut groups: Vec<_> = trace
        .store
        .keys()
        .filter(|group| group.declared_in(&module.name))
        .collect();

    groups.sort();
    groups
}

/// Check every property kind over every ordered pair of groups declared in `module`.
pub fn mine_module(module: &Module, trace: &PreparedTrace, config: &MinerConfig) -> MinerResult {
    let groups = module_groups(module, trace);
    let candidates: Vec<_> = groups
        .iter()
        .flat_map(|&a| groups.iter().filter(move |&&b| a != b).map(move |&b| (a, b)))
        .flat_map(|(a, b)| PropertyKind::ALL.into_iter().map(move |kind| (kind, a, b)))
        .collect();

    debug!(module = %module.name, groups = groups.len(), candidates = candidates.len(), "mining module");

    candidates
        .par_iter()
        .filter_map(|&(kind, a, b)| {
            let outcome = run(kind, &trace.store[a], &trace.store[b], trace.period);

            if outcome.stats.support >= config.min_support {
                Some((Property::new(kind, a.clone(), b.clone()), outcome.stats))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Mine every module of a prepared trace, visiting the hierarchy depth-first.
pub fn mine_trace(trace: &PreparedTrace, config: &MinerConfig) -> MinerResult {
    let mut result = MinerResult::new();

    for module in trace.module.walk() {
        result.extend(mine_module(module, trace, config));
    }

    info!(
        properties = result.len(),
        surviving = result.surviving().len(),
        "mined trace"
    );

    result
}

/// Read, clean and mine one trace file.
pub fn mine_file(path: impl AsRef<Path>, config: &MinerConfig) -> Result<MinerResult, Error> {
    let parsed = read_trace(path)?;
    let prepared = prepare(parsed, config)?;

    Ok(mine_trace(&prepared, config))
}

/// Mine several trace files in parallel. A file that fails does not affect the others.
pub fn mine_files<P>(paths: &[P], config: &MinerConfig) -> Vec<(PathBuf, Result<MinerResult, Error>)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = mine_file(path, config);

            if let Err(err) = &result {
                warn!(path = %path.display(), "unable to mine trace: {}", err);
            }

            (path.to_path_buf(), result)
        })
        .collect()
}
