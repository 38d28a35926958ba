//! Re-checking of previously mined properties against held-out traces.
//!
//! A property mined from one set of traces is only a candidate. Running its automaton again over
//! a trace that took no part in mining either confirms it or exposes it as an artifact of the
//! mining traces. A [`ValidationReport`] collects the outcome for a whole [`MinerResult`].
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::automaton::run;
use crate::clean::{prepare, PreparedTrace};
use crate::config::MinerConfig;
use crate::parser::read_trace;
use crate::property::{MinerResult, Property, PropertyStats};
use crate::trace::Time;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An operand of the property does not exist in the trace
    UnknownOperand,

    /// The property was already falsified while mining
    AlreadyFalsified,
}

/// Outcome of validating a single property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Held(PropertyStats),
    Skipped(SkipReason),
    Violated { at: Time, stats: PropertyStats },
}

/// Run the automaton of `property` over the operands found in `trace`.
pub fn check(property: &Property, stats: &PropertyStats, trace: &PreparedTrace) -> Check {
    let (a, b) = match (trace.store.get(&property.a), trace.store.get(&property.b)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            warn!(property = %property, "operand missing from trace, skipping property");
            return Check::Skipped(SkipReason::UnknownOperand);
        }
    };

    if stats.falsified {
        return Check::Skipped(SkipReason::AlreadyFalsified);
    }

    let outcome = run(property.kind, a, b, trace.period);

    match outcome.falsified_at {
        Some(at) => Check::Violated { at, stats: outcome.stats },
        None => Check::Held(outcome.stats),
    }
}

/// A property falsified by a validation trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub property: Property,

    /// Time of the first event violating the property
    pub at: Time,

    /// Support the property had when it was mined
    pub support: u64,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} violated at {} (mined support {})", self.property, self.at, self.support)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    skipped: usize,
    held: usize,
}

impl ValidationReport {
    /// Violations ordered by the time they were first observed
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn held(&self) -> usize {
        self.held
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Process exit status: 0 when every checked property held, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

impl FromIterator<(Property, PropertyStats, Check)> for ValidationReport {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (Property, PropertyStats, Check)>,
    {
        let mut report = Self::default();

        for (property, mined, check) in iter {
            match check {
                Check::Held(_) => report.held += 1,
                Check::Skipped(_) => report.skipped += 1,
                Check::Violated { at, .. } => report.violations.push(Violation {
                    property,
                    at,
                    support: mined.support,
                }),
            }
        }

        report
            .violations
            .sort_by(|v1, v2| v1.at.cmp(&v2.at).then_with(|| v1.property.cmp(&v2.property)));

        report
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }

        Ok(())
    }
}

/// Check every property of `result` against one prepared trace.
pub fn validate(result: &MinerResult, trace: &PreparedTrace) -> ValidationReport {
    let properties: Vec<_> = result.iter().collect();
    let report: ValidationReport = properties
        .par_iter()
        .map(|&(property, stats)| (property.clone(), *stats, check(property, stats, trace)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    info!(
        held = report.held,
        violated = report.violations.len(),
        skipped = report.skipped,
        "validated properties"
    );

    report
}

/// Read and clean one trace file, then check every property of `result` against it.
pub fn validate_file(result: &MinerResult, path: impl AsRef<Path>, config: &MinerConfig) -> Result<ValidationReport, Error> {
    let parsed = read_trace(path)?;
    let prepared = prepare(parsed, config)?;

    Ok(validate(result, &prepared))
}

/// Validate against several trace files in parallel, one report per file.
pub fn validate_files<P>(
    result: &MinerResult,
    paths: &[P],
    config: &MinerConfig,
) -> Vec<(PathBuf, Result<ValidationReport, Error>)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let report = validate_file(result, path, config);

            if let Err(err) = &report {
                warn!(path = %path.display(), "unable to validate trace: {}", err);
            }

            (path.to_path_buf(), report)
        })
        .collect()
}
