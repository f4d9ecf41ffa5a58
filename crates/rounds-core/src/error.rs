//! Unified Error Model
//!
//! None of these end a process: the pipeline turns each of them into a
//! diagnostic and carries on with the next round.
use crate::generation::GenerationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoundError {
    /// The driver signalled a terminal round after the compensator finalized.
    #[error("PROTOCOL/{0}")]
    ProtocolViolation(String),

    /// The sentinel for the next round could not be written.
    #[error("SENTINEL/{name}: {source}")]
    SentinelWrite {
        name: String,
        #[source]
        source: GenerationError,
    },

    #[error("{0}")]
    Stage(#[from] crate::stage::StageError),

    #[error("CONFIG/{0}")]
    Config(#[from] crate::settings::SettingsError),
}
