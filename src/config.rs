//! Settings shared by the miner and the validator.
//!
//! The built-in defaults live in `default_config.toml` at the root of the crate. [`MinerConfig::load`]
//! layers an optional user file and `SPECMINE_*` environment variables on top of them, so
//! `SPECMINE_SIGNAL_BIT_LIMIT=8` raises the width ceiling and
//! `SPECMINE_JUNK_FRAGMENTS=_T,_GEN` replaces the junk list.
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::Signal;
use crate::trace::Time;

const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Sampled events at or before this time are dropped
    pub start_time: Time,

    /// Widest signal group that is still mined
    pub signal_bit_limit: u32,

    /// Name fragments identifying generator temporaries
    pub junk_fragments: Vec<String>,

    /// Name fragments identifying the reference clock
    pub clock_fragments: Vec<String>,

    /// Smallest support a mined property needs to be kept
    pub min_support: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            start_time: 0,
            signal_bit_limit: 5,
            junk_fragments: ["_RAND", "_GEN", "_T", "reset"].map(String::from).to_vec(),
            clock_fragments: ["clk", "clock"].map(String::from).to_vec(),
            min_support: 1,
        }
    }
}

fn contains_any(name: &str, fragments: &[String]) -> bool {
    fragments.iter().any(|fragment| name.contains(fragment.as_str()))
}

impl MinerConfig {
    /// Load the defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let environment = Environment::with_prefix("specmine")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("junk_fragments")
            .with_list_parse_key("clock_fragments");

        let config: Self = builder.add_source(environment).build()?.try_deserialize()?;
        config.validate()
    }

    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.clock_fragments.iter().all(String::is_empty) {
            return Err(ConfigError::Invalid(String::from("at least one clock fragment is required")));
        }

        if self.min_support == 0 {
            return Err(ConfigError::Invalid(String::from("min_support must be at least 1")));
        }

        Ok(self)
    }

    pub fn is_junk(&self, signal: &Signal) -> bool {
        contains_any(&signal.name, &self.junk_fragments)
    }

    pub fn is_clock(&self, signal: &Signal) -> bool {
        contains_any(&signal.name, &self.clock_fragments)
    }
}
