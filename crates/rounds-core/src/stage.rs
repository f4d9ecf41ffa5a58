//! Stage Trait: the single contract every interceptor in a round pipeline follows
use crate::context::RoundContext;

/// One link of the interceptor chain.
///
/// A stage may forward the round (possibly decorated) through `next`, or
/// drop `next` and answer on its own, which short-circuits everything
/// behind it including the terminal handler.
pub trait Stage: Send {
    /// Stable identifier (ex: "round-log", "last-round")
    fn id(&self) -> &str;

    fn handle(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError>;
}

/// The innermost link: the processor's own round handling.
pub trait RoundHandler: Send {
    fn process(&mut self, round: &dyn RoundContext) -> Result<bool, StageError>;
}

impl<F> RoundHandler for F
where
    F: FnMut(&dyn RoundContext) -> Result<bool, StageError> + Send,
{
    fn process(&mut self, round: &dyn RoundContext) -> Result<bool, StageError> {
        self(round)
    }
}

/// The remainder of the chain behind the current stage.
///
/// `run` takes `self` by value, so a stage can forward a round at most once.
pub struct Next<'a> {
    stages: &'a mut [Box<dyn Stage>],
    handler: &'a mut dyn RoundHandler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(stages: &'a mut [Box<dyn Stage>], handler: &'a mut dyn RoundHandler) -> Self {
        Self { stages, handler }
    }

    /// Runs the rest of the chain with `round` and returns its result.
    pub fn run(self, round: &dyn RoundContext) -> Result<bool, StageError> {
        let Next { stages, handler } = self;
        match stages.split_first_mut() {
            Some((stage, rest)) => {
                tracing::trace!(stage = stage.id(), "entering stage");
                stage.handle(round, Next::new(rest, handler))
            }
            None => handler.process(round),
        }
    }

    /// Number of stages still ahead of the terminal handler.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }
}

/// A stage backed by a closure.
pub struct FnStage<F> {
    id: String,
    f: F,
}

impl<F> Stage for FnStage<F>
where
    F: FnMut(&dyn RoundContext, Next<'_>) -> Result<bool, StageError> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn handle(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError> {
        (self.f)(round, next)
    }
}

/// Wraps a closure as a [`Stage`].
pub fn stage_fn<F>(id: impl Into<String>, f: F) -> FnStage<F>
where
    F: FnMut(&dyn RoundContext, Next<'_>) -> Result<bool, StageError> + Send,
{
    FnStage { id: id.into(), f }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// A stage broke the chain contract; the round is aborted.
    ContractViolation { stage: String, reason: String },
    ExecutionFailed(String),
}

impl StageError {
    pub fn contract(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ContractViolation { stage, reason } => {
                write!(f, "STAGE/CONTRACT: {} violated the chain contract: {}", stage, reason)
            }
            Self::ExecutionFailed(msg) => write!(f, "STAGE/EXEC: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}
