//! Driver adapter: the single entry point a driver calls once per round.
use crate::compensator::LastRoundCompensator;
use crate::context::{DriverRound, RoundContext};
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::RoundError;
use crate::generation::{DirectorySentinelWriter, MemorySentinelWriter, SentinelWriter};
use crate::item::ItemSet;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::settings::HostSettings;
use crate::stage::{RoundHandler, Stage, StageError};
use std::path::Path;
use std::sync::Arc;

/// A round processor: the terminal handler plus the stages it wants in front of it.
pub trait Processor: Send {
    /// Identifies the processor in diagnostics and tags its sentinels.
    fn name(&self) -> &str;

    /// Handles one round after every stage let it through.
    fn process(&mut self, round: &dyn RoundContext) -> Result<bool, StageError>;

    /// Stages to run in front of [`Processor::process`], in configured order.
    fn stages(&self, _diagnostics: &Arc<dyn Diagnostics>) -> Vec<Box<dyn Stage>> {
        Vec::new()
    }

    /// Whether this processor wants the last-round compensator.
    fn compensate_last_round(&self) -> bool {
        true
    }
}

struct ProcessorHandler<P>(P);

impl<P: Processor> RoundHandler for ProcessorHandler<P> {
    fn process(&mut self, round: &dyn RoundContext) -> Result<bool, StageError> {
        self.0.process(round)
    }
}

/// Services handed to the host at construction time.
#[derive(Clone)]
pub struct Collaborators {
    pub diagnostics: Arc<dyn Diagnostics>,
    pub sentinels: Arc<dyn SentinelWriter>,
}

impl Collaborators {
    pub fn new(diagnostics: Arc<dyn Diagnostics>, sentinels: Arc<dyn SentinelWriter>) -> Self {
        Self {
            diagnostics,
            sentinels,
        }
    }

    /// Tracing diagnostics plus a directory or in-memory sentinel writer, depending on `settings`.
    pub fn from_settings(source: &str, settings: &HostSettings) -> Self {
        let sentinels: Arc<dyn SentinelWriter> = match &settings.sentinel_dir {
            Some(dir) => Arc::new(DirectorySentinelWriter::new(dir)),
            None => Arc::new(MemorySentinelWriter::new()),
        };
        Self::new(Arc::new(TracingDiagnostics::new(source)), sentinels)
    }
}

pub struct ProcessorHost {
    name: String,
    pipeline: Pipeline,
}

impl ProcessorHost {
    pub fn new<P>(processor: P, settings: &HostSettings, collaborators: Collaborators) -> Self
    where
        P: Processor + 'static,
    {
        let name = processor.name().to_string();
        let Collaborators {
            diagnostics,
            sentinels,
        } = collaborators;

        let mut builder = PipelineBuilder::new(name.clone())
            .order(settings.stage_order)
            .stages(processor.stages(&diagnostics));
        if settings.compensate_last_round && processor.compensate_last_round() {
            builder = builder.compensator(LastRoundCompensator::new(
                name.clone(),
                sentinels,
                diagnostics.clone(),
            ));
        }
        let pipeline = builder.build(Box::new(ProcessorHandler(processor)), diagnostics);
        tracing::info!(processor = %name, chain = pipeline.describe(), "processor host ready");

        Self { name, pipeline }
    }

    /// Reads settings from a YAML file, applies environment overrides, installs
    /// logging if nothing else did and wires default collaborators.
    pub fn from_settings_file<P>(processor: P, path: impl AsRef<Path>) -> Result<Self, RoundError>
    where
        P: Processor + 'static,
    {
        Self::from_settings_file_with(processor, path, |var| std::env::var(var).ok())
    }

    /// [`ProcessorHost::from_settings_file`] with overrides taken from `lookup`
    /// instead of the process environment.
    pub fn from_settings_file_with<P, F>(processor: P, path: impl AsRef<Path>, lookup: F) -> Result<Self, RoundError>
    where
        P: Processor + 'static,
        F: Fn(&'static str) -> Option<String>,
    {
        let settings = HostSettings::from_path(path)?.with_overrides(lookup)?;
        crate::logging::init_logging(&settings);
        let collaborators = Collaborators::from_settings(processor.name(), &settings);
        Ok(Self::new(processor, &settings, collaborators))
    }

    /// One driver round. Returns whether the round was handled.
    pub fn invoke(&mut self, items: ItemSet, is_terminal: bool, has_errors: bool) -> bool {
        let round = DriverRound::new(items, is_terminal, has_errors);
        self.pipeline.invoke(&round)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
