//! `dbspec.toml` loading.
//!
//! ```toml
//! [parameters]
//! year = 2024
//! region = "north"
//!
//! [siard]
//! extract_command = "siard-from-db"
//! adjust_command = "siard-adjust"
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "dbspec.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("parameter '{name}' must be a string, number, boolean or date")]
    NotScalar { name: String },
}

/// Run configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Defaults bound by `Parameters:` blocks, as text.
    pub parameters: BTreeMap<String, String>,
    pub siard: SiardConfig,
}

/// External archive tools.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiardConfig {
    pub extract_command: String,
    pub adjust_command: String,
}

impl Default for SiardConfig {
    fn default() -> Self {
        SiardConfig {
            extract_command: "siard-from-db".to_owned(),
            adjust_command: "siard-adjust".to_owned(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    parameters: BTreeMap<String, toml::Value>,
    siard: SiardConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let parameters = raw
            .parameters
            .into_iter()
            .map(|(name, value)| {
                let text = match value {
                    toml::Value::String(text) => text,
                    toml::Value::Integer(number) => number.to_string(),
                    toml::Value::Float(number) => number.to_string(),
                    toml::Value::Boolean(flag) => flag.to_string(),
                    toml::Value::Datetime(date) => date.to_string(),
                    toml::Value::Array(_) | toml::Value::Table(_) => {
                        return Err(ConfigError::NotScalar { name });
                    }
                };
                Ok((name, text))
            })
            .collect::<Result<_, _>>()?;
        Ok(Config {
            parameters,
            siard: raw.siard,
        })
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), parameters = config.parameters.len(), "loaded config");
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            info!(
                "No config file found at {}; using defaults",
                path.display()
            );
            return Ok(Config::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests;
