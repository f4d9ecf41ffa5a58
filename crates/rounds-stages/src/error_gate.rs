use rounds_core::{Diagnostics, Next, RoundContext, Stage, StageError};
use std::sync::Arc;

/// Stops rounds that arrive with errors raised.
///
/// Terminal rounds are always let through so the processor can still finalize.
pub struct ErrorGateStage {
    diagnostics: Arc<dyn Diagnostics>,
}

impl ErrorGateStage {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }
}

impl Stage for ErrorGateStage {
    fn id(&self) -> &str {
        "error-gate"
    }

    fn handle(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError> {
        if round.has_errors() && !round.is_terminal() {
            tracing::debug!(items = round.items().len(), "error gate closed");
            self.diagnostics.note(
                &format!(
                    "[error-gate] errors were raised, skipping round with {} item(s)",
                    round.items().len()
                ),
                None,
            );
            return Ok(false);
        }
        next.run(round)
    }
}
