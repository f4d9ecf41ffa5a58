//! Host settings, loaded from YAML and overridable through `ROUNDS_*` environment variables.
use crate::pipeline::StageOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_COMPENSATE: &str = "ROUNDS_COMPENSATE_LAST_ROUND";
pub const ENV_STAGE_ORDER: &str = "ROUNDS_STAGE_ORDER";
pub const ENV_LOG: &str = "ROUNDS_LOG";
pub const ENV_SENTINEL_DIR: &str = "ROUNDS_SENTINEL_DIR";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("READ/{path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML/{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("ENV/{var}: invalid value {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Install the last-round compensator (when the processor allows it too).
    pub compensate_last_round: bool,
    pub stage_order: StageOrder,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Directory for sentinel marker files; sentinels stay in memory when unset.
    pub sentinel_dir: Option<PathBuf>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            compensate_last_round: true,
            stage_order: StageOrder::default(),
            log_filter: "info".to_string(),
            sentinel_dir: None,
        }
    }
}

impl HostSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides from `lookup` (variable name to value).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_COMPENSATE) {
            self.compensate_last_round = parse_bool(&value).ok_or(SettingsError::InvalidEnv {
                var: ENV_COMPENSATE,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_STAGE_ORDER) {
            let order = match value.trim() {
                "first_configured_first" | "first" => Some(StageOrder::FirstConfiguredFirst),
                "last_configured_first" | "last" => Some(StageOrder::LastConfiguredFirst),
                _ => None,
            };
            self.stage_order = order.ok_or(SettingsError::InvalidEnv {
                var: ENV_STAGE_ORDER,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log_filter = value;
        }
        if let Some(value) = lookup(ENV_SENTINEL_DIR) {
            self.sentinel_dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
