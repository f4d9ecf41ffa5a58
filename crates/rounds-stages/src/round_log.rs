use rounds_core::diagnostics::round_summary;
use rounds_core::{Diagnostics, Next, RoundContext, Stage, StageError};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Structured form of a round, used by [`LogFormat::Json`].
#[derive(Debug, Clone, Serialize)]
struct RoundRecord<'a> {
    round: u64,
    is_last: bool,
    has_error: bool,
    annotations: &'a [String],
    inputs: Vec<&'a str>,
    items: usize,
}

/// Notes every round it sees, then forwards it unchanged.
pub struct RoundLogStage {
    diagnostics: Arc<dyn Diagnostics>,
    annotations: Vec<String>,
    format: LogFormat,
    seen: u64,
}

impl RoundLogStage {
    pub fn new(diagnostics: Arc<dyn Diagnostics>, annotations: &[&str]) -> Self {
        Self {
            diagnostics,
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
            format: LogFormat::Plain,
            seen: 0,
        }
    }

    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    fn plain(&self, round: &dyn RoundContext, annotations: &[&str]) -> String {
        format!("[round-log] round {}: {}", self.seen, round_summary(round, annotations))
    }

    /// Plain line used when a record cannot be encoded.
    fn fallback(&self, round: &dyn RoundContext, annotations: &[&str], err: &serde_json::Error) -> String {
        tracing::warn!(error = %err, round = self.seen, "round record not encodable, logging plain summary");
        self.plain(round, annotations)
    }

    fn describe(&self, round: &dyn RoundContext) -> String {
        let annotations: Vec<&str> = self.annotations.iter().map(String::as_str).collect();
        match self.format {
            LogFormat::Plain => self.plain(round, &annotations),
            LogFormat::Json => {
                let record = RoundRecord {
                    round: self.seen,
                    is_last: round.is_terminal(),
                    has_error: round.has_errors(),
                    annotations: &self.annotations,
                    inputs: round
                        .annotated_with_any(&annotations)
                        .into_iter()
                        .map(|item| item.name())
                        .collect(),
                    items: round.items().len(),
                };
                serde_json::to_string(&record).unwrap_or_else(|err| self.fallback(round, &annotations, &err))
            }
        }
    }
}

impl Stage for RoundLogStage {
    fn id(&self) -> &str {
        "round-log"
    }

    fn handle(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError> {
        let line = self.describe(round);
        self.diagnostics.note(&line, None);
        self.seen += 1;
        next.run(round)
    }
}
