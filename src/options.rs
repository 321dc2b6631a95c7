//! Relation store configuration and its TOML loader.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::BoundMode;
use crate::record::Direction;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FOLLOWGRAPH_CONFIG";

/// Configuration for a [`crate::RelationStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationOptions {
    /// Name of the forward ("follows") index.
    pub forward_index: String,
    /// Name of the reverse ("followed by") index.
    pub reverse_index: String,
    /// Attribute holding the literal origin identifier.
    pub origin_attr: String,
    /// Attribute holding the literal target identifier.
    pub target_attr: String,
    /// Upper-bound derivation for origin scans.
    pub bound_mode: BoundMode,
    /// Rows the store may fetch per round-trip of a lazy scan.
    pub scan_batch_size: usize,
}

impl Default for RelationOptions {
    fn default() -> Self {
        Self {
            forward_index: "forward".to_string(),
            reverse_index: "reverse".to_string(),
            origin_attr: "origin".to_string(),
            target_attr: "target".to_string(),
            bound_mode: BoundMode::Prefix,
            scan_batch_size: 256,
        }
    }
}

impl RelationOptions {
    /// Sets the forward index name.
    pub fn forward_index(mut self, name: impl Into<String>) -> Self {
        self.forward_index = name.into();
        self
    }

    /// Sets the reverse index name.
    pub fn reverse_index(mut self, name: impl Into<String>) -> Self {
        self.reverse_index = name.into();
        self
    }

    /// Sets the origin and target attribute names.
    pub fn attributes(mut self, origin: impl Into<String>, target: impl Into<String>) -> Self {
        self.origin_attr = origin.into();
        self.target_attr = target.into();
        self
    }

    /// Selects the scan upper-bound derivation.
    pub fn bound_mode(mut self, mode: BoundMode) -> Self {
        self.bound_mode = mode;
        self
    }

    /// Sets the scan batch size.
    pub fn scan_batch_size(mut self, rows: usize) -> Self {
        self.scan_batch_size = rows;
        self
    }

    /// Index name addressed by `direction`.
    pub fn index_name(&self, direction: Direction) -> &str {
        match direction {
            Direction::Forward => &self.forward_index,
            Direction::Reverse => &self.reverse_index,
        }
    }

    /// Checks the options for values the relation store cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("forward_index", &self.forward_index),
            ("reverse_index", &self.reverse_index),
            ("origin_attr", &self.origin_attr),
            ("target_attr", &self.target_attr),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.forward_index == self.reverse_index {
            return Err(ConfigError::Invalid {
                field: "reverse_index",
                reason: format!("must differ from forward_index '{}'", self.forward_index),
            });
        }
        if self.origin_attr == self.target_attr {
            return Err(ConfigError::Invalid {
                field: "target_attr",
                reason: format!("must differ from origin_attr '{}'", self.origin_attr),
            });
        }
        if self.scan_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "scan_batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parses the `[relations]` table of a TOML document and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })?;
        raw.relations.validate()?;
        Ok(raw.relations)
    }

    /// Reads options from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        raw.relations.validate()?;
        Ok(raw.relations)
    }

    /// Loads options from `explicit`, else [`CONFIG_ENV`], else the default
    /// config path. A missing file yields the defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(default_config_path);
        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Renders the options as a TOML document with a `[relations]` table.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let raw = RawConfig {
            relations: self.clone(),
        };
        toml::to_string_pretty(&raw).map_err(|source| ConfigError::Serialize { source })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    relations: RelationOptions,
}

/// Failures loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The config document is not valid TOML for these options.
    #[error("failed to parse config {}: {source}", display_path(.path))]
    Parse {
        /// File that was parsed, if any.
        path: Option<PathBuf>,
        /// Underlying parse error.
        source: toml::de::Error,
    },
    /// The options could not be rendered as TOML.
    #[error("failed to serialize config: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: toml::ser::Error,
    },
    /// A field holds an unusable value.
    #[error("invalid config field {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// The log filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    /// A global subscriber is already installed.
    #[error("logging already initialized")]
    LoggingInitialized,
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "<inline>".to_string(), |p| p.display().to_string())
}

/// Default config file location, `<config dir>/followgraph/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("followgraph").join("config.toml"))
}
