//! Diagnostics: where errors, warnings and notes about rounds end up.
//!
//! Reporting is fire-and-forget. Nothing in the pipeline branches on what a
//! sink does with a diagnostic; [`RecordingDiagnostics`] exists so hosts and
//! tests can inspect what was reported.

use crate::context::RoundContext;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Name of the item the diagnostic refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, item: Option<&Item>) -> Self {
        Self {
            severity,
            message: message.into(),
            item: item.map(|i| i.name().to_string()),
        }
    }
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn error(&self, message: &str, item: Option<&Item>) {
        self.report(Diagnostic::new(Severity::Error, message, item));
    }

    fn warning(&self, message: &str, item: Option<&Item>) {
        self.report(Diagnostic::new(Severity::Warning, message, item));
    }

    fn note(&self, message: &str, item: Option<&Item>) {
        self.report(Diagnostic::new(Severity::Note, message, item));
    }
}

/// Forwards diagnostics to `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics {
    source: String,
}

impl TracingDiagnostics {
    /// `source` is attached to every event (typically the processor name).
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        let item = diagnostic.item.as_deref().unwrap_or("-");
        match diagnostic.severity {
            Severity::Error => {
                tracing::error!(source = %self.source, item, "{}", diagnostic.message)
            }
            Severity::Warning => {
                tracing::warn!(source = %self.source, item, "{}", diagnostic.message)
            }
            Severity::Note => {
                tracing::info!(source = %self.source, item, "{}", diagnostic.message)
            }
        }
    }
}

/// Keeps every diagnostic in memory, in reporting order.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // A poisoned recorder still holds valid entries.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.lock()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.lock().iter().any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }
}

/// One-line description of a round: flags, watched annotations and the items carrying them.
pub fn round_summary(round: &dyn RoundContext, annotations: &[&str]) -> String {
    let inputs: Vec<&str> = round
        .annotated_with_any(annotations)
        .into_iter()
        .map(Item::name)
        .collect();
    format!(
        "is last: {}, has error: {}, annotations: [{}], inputs: [{}]",
        round.is_terminal(),
        round.has_errors(),
        annotations.join(", "),
        inputs.join(", ")
    )
}
