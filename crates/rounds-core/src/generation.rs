//! Sentinel generation: the side channel the last-round compensator writes
//! through to force the driver into one more round.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Marker embedded in every sentinel name.
pub const SENTINEL_MARKER: &str = "$last_round_sentinel$";

/// Deterministic sentinel name for `owner` at round `round`.
///
/// The same pair always yields the same name, so retrying a round never
/// produces a second artifact.
pub fn sentinel_name(owner: &str, round: u64) -> String {
    format!("{}{}round{}", owner, SENTINEL_MARKER, round)
}

/// Whether `simple_name` was produced by [`sentinel_name`] (for any owner).
pub fn is_sentinel(simple_name: &str) -> bool {
    simple_name.contains(SENTINEL_MARKER)
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("IO/{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("ENCODE/{name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SentinelWriter: Send + Sync {
    /// Emits the sentinel `name`. Emitting an existing name is a no-op.
    fn emit_sentinel(&self, name: &str) -> Result<(), GenerationError>;
}

/// Keeps emitted sentinel names in memory.
#[derive(Debug, Default)]
pub struct MemorySentinelWriter {
    names: Mutex<BTreeSet<String>>,
}

impl MemorySentinelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<String> {
        self.names
            .lock()
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl SentinelWriter for MemorySentinelWriter {
    fn emit_sentinel(&self, name: &str) -> Result<(), GenerationError> {
        let mut names = self.names.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        names.insert(name.to_string());
        Ok(())
    }
}

/// Content of a sentinel file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelMarker {
    pub name: String,
    pub owner: String,
    pub round: Option<u64>,
}

impl SentinelMarker {
    /// Splits a sentinel name back into owner and round.
    pub fn parse(name: &str) -> Self {
        let (owner, suffix) = name.split_once(SENTINEL_MARKER).unwrap_or((name, ""));
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            round: suffix.strip_prefix("round").and_then(|n| n.parse().ok()),
        }
    }
}

/// Writes one JSON marker file per sentinel into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySentinelWriter {
    dir: PathBuf,
}

impl DirectorySentinelWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the marker file for `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.sentinel.json", name))
    }
}

impl SentinelWriter for DirectorySentinelWriter {
    fn emit_sentinel(&self, name: &str) -> Result<(), GenerationError> {
        let path = self.path_for(name);
        if path.exists() {
            tracing::debug!(path = %path.display(), "sentinel already present");
            return Ok(());
        }

        let io_err = |source| GenerationError::Io {
            name: name.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        let body = serde_json::to_vec_pretty(&SentinelMarker::parse(name)).map_err(|source| {
            GenerationError::Encode {
                name: name.to_string(),
                source,
            }
        })?;
        fs::write(&path, body).map_err(io_err)?;
        tracing::debug!(path = %path.display(), "sentinel written");
        Ok(())
    }
}
