use ahash::AHashMap;
use std::fmt::{self, Display};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::paging::translation_pipeline::MAX_FRAMES;

/// default location of the configuration, relative to the working directory
pub const CONFIG_FILE: &str = "paging.cfg";

/// number of physical page frames
pub const KEY_FRAMES: &str = "PF";
/// number of TLB entries
pub const KEY_CACHE_ENTRIES: &str = "TE";
/// number of accesses between two shifts of the use histories
pub const KEY_DECAY_INTERVAL: &str = "UP";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub frames: usize,
    pub cache_entries: usize,
    pub decay_interval: u64,
}

/// Problems in the configuration that are reported but do not stop the simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownParameter(String),
    MalformedValue { key: String, value: Option<String> },
    MissingSource(String),
}

impl Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownParameter(name) => write!(f, "unknown parameter {name}"),
            ConfigWarning::MalformedValue { key, value: Some(value) } => {
                write!(f, "value {value:?} of parameter {key} is not a number")
            }
            ConfigWarning::MalformedValue { key, value: None } => {
                write!(f, "parameter {key} has no value")
            }
            ConfigWarning::MissingSource(path) => write!(
                f,
                "unable to locate {path}, please make sure it is in the working directory"
            ),
        }
    }
}

impl Config {
    /// read the configuration file, falling back to the all-zero defaults if it cannot be read
    pub fn load(path: &Path) -> (Self, Vec<ConfigWarning>) {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!("could not read {}: {e}", path.display());
                }
                (
                    Self::default(),
                    vec![ConfigWarning::MissingSource(path.display().to_string())],
                )
            }
        }
    }

    /// parse whitespace separated `KEY value` pairs
    /// an unknown key only consumes itself, so its value is read as the next key
    /// a missing or non numeric value stops the parsing, keeping what was read so far
    pub fn parse(text: &str) -> (Self, Vec<ConfigWarning>) {
        let mut values: AHashMap<&str, u64> = AHashMap::new();
        let mut warnings = vec![];
        let mut tokens = text.split_whitespace();

        while let Some(key) = tokens.next() {
            if ![KEY_FRAMES, KEY_CACHE_ENTRIES, KEY_DECAY_INTERVAL].contains(&key) {
                warnings.push(ConfigWarning::UnknownParameter(key.to_string()));
                continue;
            }
            let value = tokens.next();
            match value.map(str::parse::<u64>) {
                Some(Ok(value)) => {
                    values.insert(key, value);
                }
                _ => {
                    warnings.push(ConfigWarning::MalformedValue {
                        key: key.to_string(),
                        value: value.map(str::to_string),
                    });
                    break;
                }
            }
        }

        let get = |key: &str| values.get(key).copied().unwrap_or(0);
        let config = Self {
            frames: get(KEY_FRAMES) as usize,
            cache_entries: get(KEY_CACHE_ENTRIES) as usize,
            decay_interval: get(KEY_DECAY_INTERVAL),
        };
        (config, warnings)
    }

    /// capacities of zero are fine, they just leave the matching table empty
    pub fn validate(&self) -> Result<()> {
        if self.decay_interval == 0 {
            return Err(Error::InvalidConfig(
                "the use vector shift interval (UP) must be at least 1",
            ));
        }
        if self.frames > MAX_FRAMES {
            return Err(Error::InvalidConfig(
                "at most 256 physical page frames (PF) can be simulated",
            ));
        }
        Ok(())
    }
}
