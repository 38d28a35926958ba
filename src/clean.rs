//! Conversion of a parsed trace into the clock-synchronous form the miner works on.
//!
//! Cleaning runs the following steps in order:
//!
//! 1. find the reference clock and its rising edges,
//! 2. strip generator temporaries from every alias group,
//! 3. drop wires wider than the configured limit or without any recorded change,
//! 4. sample every remaining wire on the clock edges,
//! 5. drop the samples at or before the configured start time and the wires left empty.
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MinerConfig;
use crate::module::Module;
use crate::parser::ParsedTrace;
use crate::sampling::{clock_period, posedges, sample};
use crate::signal::AliasGroup;
use crate::trace::{DeltaTrace, Time, TraceStore};
use crate::Error as PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("no clock found among {0} signal groups")]
    Missing(usize),

    #[error("found {} clock candidates: {}", .0.len(), .0.join("; "))]
    Multiple(Vec<String>),

    #[error("clock {0} has a member wider than one bit")]
    Wide(String),

    #[error("clock {group} has {edges} rising edges, at least two are required")]
    TooFewEdges { group: String, edges: usize },
}

/// A trace sampled on its clock and filtered down to the wires worth mining
#[derive(Debug, Clone)]
pub struct PreparedTrace {
    pub module: Module,
    pub store: TraceStore,

    /// Group of the reference clock. It is not part of `store`.
    pub clock: AliasGroup,

    /// Most common distance between two rising edges of the clock
    pub period: Time,
}

/// Find the single alias group naming the reference clock.
pub fn find_clock<'a>(store: &'a TraceStore, config: &MinerConfig) -> Result<(&'a AliasGroup, &'a DeltaTrace), ClockError> {
    let mut candidates: Vec<_> = store
        .iter()
        .filter(|(group, _)| group.any(|signal| config.is_clock(signal)))
        .collect();

    match candidates.len() {
        0 => Err(ClockError::Missing(store.len())),
        1 => {
            let (group, trace) = candidates.remove(0);

            if group.any(|signal| signal.width != 1) {
                return Err(ClockError::Wide(group.to_string()));
            }

            Ok((group, trace))
        }
        _ => {
            let mut names: Vec<String> = candidates.iter().map(|(group, _)| group.to_string()).collect();
            names.sort();

            Err(ClockError::Multiple(names))
        }
    }
}

/// Sample, trim and filter a parsed trace.
pub fn prepare(parsed: ParsedTrace, config: &MinerConfig) -> Result<PreparedTrace, PipelineError> {
    let (clock, clock_trace) = find_clock(&parsed.store, config)?;
    let edges = posedges(clock_trace);
    let period = clock_period(&edges).ok_or_else(|| ClockError::TooFewEdges {
        group: clock.to_string(),
        edges: edges.len(),
    })?;

    info!(clock = %clock, edges = edges.len(), period, "found clock");

    let mut store = TraceStore::with_capacity(parsed.store.len());

    for (group, trace) in &parsed.store {
        if group == clock {
            continue;
        }

        let kept = group.filter(|signal| !config.is_junk(signal));

        if kept.is_empty() {
            debug!(group = %group, "dropped generator temporaries");
            continue;
        }

        if kept.width() > config.signal_bit_limit {
            debug!(group = %kept, width = kept.width(), "dropped wide signal");
            continue;
        }

        // Real-valued and never-driven wires have no recorded changes at all
        if trace.is_empty() {
            debug!(group = %kept, "dropped signal without changes");
            continue;
        }

        let mut sampled = sample(&edges, trace).map_err(|source| PipelineError::Sample {
            group: group.clone(),
            source,
        })?;
        sampled.retain(|time, _| time > config.start_time);

        if sampled.is_empty() {
            debug!(group = %kept, "dropped signal without events");
        } else {
            store.insert(kept, sampled);
        }
    }

    info!(
        groups = store.len(),
        dropped = parsed.store.len() - store.len() - 1,
        "cleaned trace"
    );

    Ok(PreparedTrace {
        module: parsed.module,
        store,
        clock: clock.clone(),
        period,
    })
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{find_clock, prepare, ClockError};
    use crate::config::MinerConfig;
    use crate::parser::parse_trace;
    use crate::signal::{AliasGroup, Signal};
    use crate::trace::delta_trace;

    const TRACE: &str = "\
$scope module TOP $end
$var wire 1 ! clock $end
$var wire 1 \" reset $end
$var wire 1 # io_valid $end
$var wire 4 $ _GEN_3 $end
$var wire 8 % io_data $end
$var wire 1 & io_idle $end
$scope module core $end
$var wire 1 ! clock $end
$var wire 1 ' _T_12 $end
$var wire 1 ' valid_q $end
$upscope $end
$upscope $end
$enddefinitions $end
#0
0!
1\"
0#
b0000 $
b0 %
1&
0'
#5
1!
#10
0!
0\"
1#
b0011 $
#15
1!
1'
#20
0!
0#
#25
1!
#30
0!
b101 %
1#
#35
1!
";

    fn group(names: &[&str], width: u32) -> AliasGroup {
        names.iter().map(|name| Signal::new(*name, width)).collect()
    }

    #[test]
    fn prepare_trace() -> Result<(), Box<dyn Error>> {
        let parsed = parse_trace(TRACE)?;
        let prepared = prepare(parsed, &MinerConfig::default())?;

        assert_eq!(prepared.clock, group(&["TOP.clock", "TOP.core.clock"], 1));
        assert_eq!(prepared.period, 10);

        let mut groups: Vec<_> = prepared.store.keys().cloned().collect();
        groups.sort();

        assert_eq!(
            groups,
            vec![
                group(&["TOP.core.valid_q"], 1),
                group(&["TOP.io_idle"], 1),
                group(&["TOP.io_valid"], 1),
            ]
        );

        let valid = &prepared.store[&group(&["TOP.io_valid"], 1)];
        assert_eq!(valid, &delta_trace([(5, 0), (15, 1), (25, 0), (35, 1)]));

        let valid_q = &prepared.store[&group(&["TOP.core.valid_q"], 1)];
        assert_eq!(valid_q, &delta_trace([(5, 0), (25, 1)]));
        Ok(())
    }

    #[test]
    fn start_time_trims_samples() -> Result<(), Box<dyn Error>> {
        let parsed = parse_trace(TRACE)?;
        let config = MinerConfig {
            start_time: 15,
            ..MinerConfig::default()
        };
        let prepared = prepare(parsed, &config)?;

        let valid = &prepared.store[&group(&["TOP.io_valid"], 1)];
        assert_eq!(valid, &delta_trace([(25, 0), (35, 1)]));

        assert!(!prepared.store.contains_key(&group(&["TOP.io_idle"], 1)));
        Ok(())
    }

    #[test]
    fn bit_limit() -> Result<(), Box<dyn Error>> {
        let parsed = parse_trace(TRACE)?;
        let config = MinerConfig {
            signal_bit_limit: 8,
            ..MinerConfig::default()
        };
        let prepared = prepare(parsed, &config)?;

        let data = &prepared.store[&group(&["TOP.io_data"], 8)];
        assert_eq!(data, &delta_trace([(5, 0), (35, 5)]));
        Ok(())
    }

    #[test]
    fn clock_heuristic() -> Result<(), Box<dyn Error>> {
        let parsed = parse_trace(TRACE)?;

        let config = MinerConfig {
            clock_fragments: vec![String::from("sysclk")],
            ..MinerConfig::default()
        };
        assert!(matches!(find_clock(&parsed.store, &config), Err(ClockError::Missing(_))));

        let config = MinerConfig {
            clock_fragments: vec![String::from("clock"), String::from("io_")],
            ..MinerConfig::default()
        };
        assert!(matches!(find_clock(&parsed.store, &config), Err(ClockError::Multiple(names)) if names.len() == 4));

        let config = MinerConfig {
            clock_fragments: vec![String::from("io_data")],
            ..MinerConfig::default()
        };
        assert!(matches!(find_clock(&parsed.store, &config), Err(ClockError::Wide(_))));
        Ok(())
    }

    #[test]
    fn clock_needs_two_edges() -> Result<(), Box<dyn Error>> {
        let text = "\
$scope module TOP $end
$var wire 1 ! clk $end
$var wire 1 \" ready $end
$upscope $end
$enddefinitions $end
#0
0!
0\"
#1
1!
";
        let parsed = parse_trace(text)?;
        let result = prepare(parsed, &MinerConfig::default());

        assert!(matches!(
            result,
            Err(crate::Error::Clock(ClockError::TooFewEdges { edges: 1, .. }))
        ));
        Ok(())
    }

    #[test]
    fn missing_initial_value() -> Result<(), Box<dyn Error>> {
        let text = "\
$scope module TOP $end
$var wire 1 ! clk $end
$var wire 1 \" ready $end
$upscope $end
$enddefinitions $end
#0
0!
#1
1!
#2
0!
1\"
#3
1!
";
        let parsed = parse_trace(text)?;
        let result = prepare(parsed, &MinerConfig::default());

        assert!(matches!(result, Err(crate::Error::Sample { .. })));
        Ok(())
    }

    #[test]
    fn wires_without_changes_are_dropped() -> Result<(), Box<dyn Error>> {
        let text = "\
$scope module TOP $end
$var wire 1 ! clock $end
$var wire 1 \" io_valid $end
$var real 64 # temperature $end
$var wire 1 $ io_spare $end
$upscope $end
$enddefinitions $end
#0
0!
0\"
r21.5 #
#1
1!
#2
0!
1\"
r22.0 #
#3
1!
";
        let parsed = parse_trace(text)?;
        let config = MinerConfig {
            signal_bit_limit: 64,
            ..MinerConfig::default()
        };
        let prepared = prepare(parsed, &config)?;

        assert_eq!(prepared.store.len(), 1);
        assert_eq!(
            prepared.store[&group(&["TOP.io_valid"], 1)],
            delta_trace([(1, 0), (3, 1)])
        );
        Ok(())
    }
}
