//! Rounds Core: round-processing interceptor pipeline
//!
//! A driver calls [`ProcessorHost::invoke`] once per round. The round then
//! travels through the configured [`Stage`]s, the [`LastRoundCompensator`]
//! when enabled, and finally the processor itself:
//!
//! ```text
//! driver → host → stage₁ → … → stageₙ → last-round → processor
//! ```

pub mod compensator;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod generation;
pub mod host;
pub mod item;
pub mod logging;
pub mod pipeline;
pub mod proxy;
pub mod settings;
pub mod stage;

pub use compensator::{LastRoundCompensator, Phase};
pub use context::{DriverRound, RoundContext};
pub use diagnostics::{Diagnostic, Diagnostics, RecordingDiagnostics, Severity, TracingDiagnostics};
pub use error::RoundError;
pub use generation::{
    is_sentinel, sentinel_name, DirectorySentinelWriter, GenerationError, MemorySentinelWriter,
    SentinelWriter,
};
pub use host::{Collaborators, Processor, ProcessorHost};
pub use item::{Item, ItemKind, ItemSet};
pub use logging::{init_logging, try_init_logging};
pub use pipeline::{Pipeline, PipelineBuilder, StageOrder};
pub use proxy::TerminalOverride;
pub use settings::{HostSettings, SettingsError};
pub use stage::{stage_fn, FnStage, Next, RoundHandler, Stage, StageError};

/// Crate version
pub const ROUNDS_VERSION: &str = env!("CARGO_PKG_VERSION");
