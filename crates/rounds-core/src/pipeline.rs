//! Pipeline: composes configured stages around a terminal handler
//!
//! The chain is materialized once by [`PipelineBuilder::build`] into a flat
//! list of stages in execution order. Each stage reaches the next one through
//! a [`Next`] continuation over the remaining slice, so the call graph is fixed
//! for the lifetime of the pipeline.
use crate::compensator::LastRoundCompensator;
use crate::context::RoundContext;
use crate::diagnostics::Diagnostics;
use crate::error::RoundError;
use crate::stage::{Next, RoundHandler, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which configured stage sees a round first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOrder {
    /// Stages run top to bottom, like a request middleware stack.
    #[default]
    FirstConfiguredFirst,
    /// Every configured stage wraps the chain built so far, so the last one runs first.
    LastConfiguredFirst,
}

pub struct PipelineBuilder {
    id: String,
    order: StageOrder,
    stages: Vec<Box<dyn Stage>>,
    compensator: Option<LastRoundCompensator>,
}

impl PipelineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order: StageOrder::default(),
            stages: Vec::new(),
            compensator: None,
        }
    }

    pub fn order(mut self, order: StageOrder) -> Self {
        self.order = order;
        self
    }

    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(mut self, stages: impl IntoIterator<Item = Box<dyn Stage>>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Installs the last-round compensator. It always ends up innermost,
    /// directly in front of the handler, whatever the stage order.
    pub fn compensator(mut self, compensator: LastRoundCompensator) -> Self {
        self.compensator = Some(compensator);
        self
    }

    pub fn build(self, handler: Box<dyn RoundHandler>, diagnostics: Arc<dyn Diagnostics>) -> Pipeline {
        let mut stages = self.stages;
        if self.order == StageOrder::LastConfiguredFirst {
            stages.reverse();
        }
        if let Some(compensator) = self.compensator {
            stages.push(Box::new(compensator));
        }

        let pipeline_id = stages
            .iter()
            .map(|s| s.id())
            .chain(std::iter::once("handler"))
            .collect::<Vec<_>>()
            .join("→");
        tracing::debug!(id = %self.id, chain = %pipeline_id, "pipeline built");

        Pipeline {
            id: self.id,
            chain: pipeline_id,
            stages,
            handler,
            diagnostics,
            rounds: 0,
        }
    }
}

/// A composed chain. Invoking it runs every stage at most once per round.
pub struct Pipeline {
    id: String,
    chain: String,
    stages: Vec<Box<dyn Stage>>,
    handler: Box<dyn RoundHandler>,
    diagnostics: Arc<dyn Diagnostics>,
    rounds: u64,
}

impl Pipeline {
    /// Runs one round through the chain and reports whether it was handled.
    ///
    /// A stage or handler error aborts the round: it is reported as an error
    /// diagnostic and the driver gets `false`.
    pub fn invoke(&mut self, round: &dyn RoundContext) -> bool {
        let span = tracing::debug_span!("round", pipeline = %self.id, round = self.rounds);
        let _entered = span.enter();
        self.rounds += 1;

        let next = Next::new(&mut self.stages, &mut *self.handler);
        match next.run(round) {
            Ok(handled) => {
                tracing::debug!(handled, "round finished");
                handled
            }
            Err(err) => {
                let err = RoundError::from(err);
                tracing::debug!(error = %err, "round aborted");
                self.diagnostics.error(
                    &format!("[{}] round {} aborted: {}", self.id, self.rounds - 1, err),
                    None,
                );
                false
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stage ids in execution order, ending with the handler (ex: "round-log→last-round→handler").
    pub fn describe(&self) -> &str {
        &self.chain
    }

    /// Number of rounds invoked so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
