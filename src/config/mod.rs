//! Configuration module for reduction-pipeline
//!
//! Settings are read from a TOML file, then overridden by environment
//! variables, then by command-line flags (handled in `main`).
//!
//! # Config Location
//!
//! Without an explicit `--config`, the file is looked up in the
//! platform-appropriate config directory under `dev.hxyulin.reduction-pipeline`:
//! - **Linux**: `~/.config/dev.hxyulin.reduction-pipeline/pipeline.toml`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.reduction-pipeline/pipeline.toml`
//! - **Windows**: `%APPDATA%\dev.hxyulin.reduction-pipeline\pipeline.toml`
//!
//! # Example
//!
//! ```toml
//! [topology]
//! process_count = 5
//!
//! [sequence]
//! length = 10
//!
//! [transport]
//! channel_capacity = 0
//!
//! [logging]
//! filter = "info,reduction_pipeline=debug"
//! format = "compact"
//! ```

pub mod logging;

pub use logging::init_logging;

use crate::error::{ReductionError, Result, ResultExt};
use crate::pipeline::{PipelineError, Topology, MAX_SEQUENCE_LEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hxyulin.reduction-pipeline";

/// Config filename
pub const CONFIG_FILE: &str = "pipeline.toml";

/// Default number of processes (source + 3 workers)
pub const DEFAULT_PROCESS_COUNT: usize = 4;

/// Default sequence length
pub const DEFAULT_SEQUENCE_LEN: usize = 10;

/// Environment variable overriding `topology.process_count`
pub const ENV_PROCESSES: &str = "REDUCTION_PIPELINE_PROCESSES";

/// Environment variable overriding `sequence.length`
pub const ENV_SEQUENCE_LEN: &str = "REDUCTION_PIPELINE_SEQUENCE_LEN";

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Pipeline Config ====================

/// Complete configuration of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub topology: TopologyConfig,
    pub sequence: SequenceConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(ReductionError::from)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        toml::from_str(&content).map_err(|e| {
            ReductionError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load a config file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load from the default location if a file exists there
    pub fn discover() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from {:?}", path);
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save config file to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(ReductionError::from)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ReductionError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(ReductionError::from)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }

    /// Apply `REDUCTION_PIPELINE_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PROCESSES) {
            self.topology.process_count = parse_count(ENV_PROCESSES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEQUENCE_LEN) {
            self.sequence.length = parse_count(ENV_SEQUENCE_LEN, &raw)?;
        }
        Ok(())
    }

    /// Check the values a run depends on, before any channel is created
    pub fn validate(&self) -> Result<()> {
        Topology::new(self.topology.process_count)?;
        if self.sequence.length > MAX_SEQUENCE_LEN {
            return Err(PipelineError::SequenceTooLong {
                len: self.sequence.length,
                max: MAX_SEQUENCE_LEN,
            }
            .into());
        }
        Ok(())
    }
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|e| ReductionError::Config(format!("Invalid value {:?} for {}: {}", raw, key, e)))
}

/// Shape of the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Total process count, source included (P)
    pub process_count: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            process_count: DEFAULT_PROCESS_COUNT,
        }
    }
}

/// Input sequence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of elements (N); values are `1..=N`
    pub length: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_SEQUENCE_LEN,
        }
    }
}

/// Channel settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Buffer size per edge; 0 means synchronous rendezvous sends
    pub channel_capacity: usize,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,

    /// Optional log file, written in addition to stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Output style of the stderr layer
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
            format: LogFormat::default(),
        }
    }
}

/// Log output style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.topology.process_count, 4);
        assert_eq!(config.sequence.length, 10);
        assert_eq!(config.transport.channel_capacity, 0);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("[topology]\nprocess_count = 7\n").unwrap();
        assert_eq!(config.topology.process_count, 7);
        assert_eq!(config.sequence.length, DEFAULT_SEQUENCE_LEN);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: PipelineConfig = toml::from_str("[logging]\nformat = \"compact\"\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(ENV_PROCESSES, "6"), (ENV_SEQUENCE_LEN, " 3 ")]);
        let mut config = PipelineConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.topology.process_count, 6);
        assert_eq!(config.sequence.length, 3);
    }

    #[test]
    fn test_override_rejects_garbage() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == ENV_PROCESSES).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PROCESSES));
    }

    #[test]
    fn test_validate_rejects_bad_topology() {
        let mut config = PipelineConfig::default();
        config.topology.process_count = 1;
        assert!(matches!(
            config.validate(),
            Err(ReductionError::Pipeline(PipelineError::InvalidTopology { .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_long_sequence() {
        let mut config = PipelineConfig::default();
        config.sequence.length = MAX_SEQUENCE_LEN + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_keeps_io_cause() {
        let err = PipelineConfig::load("/nonexistent/reduction-pipeline/pipeline.toml").unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
        match err {
            ReductionError::WithContext { source, .. } => {
                assert!(matches!(*source, ReductionError::Io(_)));
            }
            other => panic!("expected context-wrapped IO error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_serialization() {
        let mut config = PipelineConfig::default();
        config.logging.file = Some(PathBuf::from("/tmp/pipeline.log"));

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
