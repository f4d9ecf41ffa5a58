//! Rounds Stages: reference interceptors for round pipelines.
//!
//! These stages stay intentionally small. Processors return them from
//! `Processor::stages` in front of their own handling.
//!
//! # Pipeline Flow
//!
//! ```text
//! driver → round-log → error-gate → last-round → processor
//!             ↓            ↓
//!           note     short-circuit
//! ```

mod error_gate;
mod round_log;

pub use error_gate::ErrorGateStage;
pub use round_log::{LogFormat, RoundLogStage};

use rounds_core::{Diagnostics, Stage};
use std::sync::Arc;

/// The usual front of a pipeline: log every round, then gate on errors.
pub fn standard_stages(diagnostics: &Arc<dyn Diagnostics>, annotations: &[&str]) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(RoundLogStage::new(diagnostics.clone(), annotations)),
        Box::new(ErrorGateStage::new(diagnostics.clone())),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
