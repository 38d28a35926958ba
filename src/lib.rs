#![deny(clippy::all)]

//! Mining of temporal properties from hardware simulation traces.
//!
//! A trace is [parsed](parser), sampled on its clock and [cleaned](clean), and then every pair
//! of wires declared in the same module is checked against a fixed set of temporal patterns by the
//! [`miner`]. Results from several traces are combined by the [`aggregate`] module and finally
//! checked against traces that took no part in mining by the [`validate`] module.
//!
//! ```no_run
//! use specmine::aggregate::aggregate;
//! use specmine::config::MinerConfig;
//! use specmine::miner::mine_files;
//! use specmine::validate::validate_file;
//!
//! # fn main() -> Result<(), specmine::Error> {
//! let config = MinerConfig::load(None)?;
//! let mined = mine_files(&["run0.vcd", "run1.vcd"], &config)
//!     .into_iter()
//!     .filter_map(|(_, result)| result.ok());
//!
//! let candidates = aggregate(mined);
//! let report = validate_file(&candidates, "run2.vcd", &config)?;
//!
//! print!("{}", report);
//! std::process::exit(report.exit_code());
//! # }
//! ```

use thiserror::Error;

pub mod aggregate;
pub mod automaton;
pub mod clean;
pub mod config;
pub mod merge;
pub mod miner;
pub mod module;
pub mod parser;
pub mod property;
pub mod sampling;
pub mod signal;
pub mod trace;
pub mod validate;

pub use crate::property::{MinerResult, Property, PropertyKind, PropertyStats};
pub use crate::trace::Trace;

/// Error produced by any stage of the mining pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] parser::ParseError),

    #[error("unable to read trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to sample {group}: {source}")]
    Sample {
        group: signal::AliasGroup,
        source: sampling::SampleError,
    },

    #[error(transparent)]
    Clock(#[from] clean::ClockError),

    #[error(transparent)]
    Persist(#[from] property::PersistError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
