//! Last-round compensation.
//!
//! Some drivers report the terminal round more than once, or report it on a
//! round that still carries real work. The compensator stops trusting the
//! driver's flag altogether: after every genuine round it emits a sentinel
//! item, which forces the driver to schedule another round. The first round
//! that contains nothing but sentinels is the one handed downstream as
//! terminal. Everything after that is dropped.
//!
//! ```text
//!   round {A, B}  ──► emit S0, forward (terminal = false)
//!   round {S0}    ──► forward (terminal = true), finalize
//!   round {}      ──► dropped, handler untouched
//! ```

use crate::context::RoundContext;
use crate::diagnostics::Diagnostics;
use crate::error::RoundError;
use crate::generation::{is_sentinel, sentinel_name, SentinelWriter};
use crate::proxy::TerminalOverride;
use crate::stage::{Next, Stage, StageError};
use std::sync::Arc;

/// Identifier of the compensator stage inside a pipeline.
pub const COMPENSATOR_STAGE_ID: &str = "last-round";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still forwarding genuine rounds.
    Active,
    /// The synthetic terminal round went downstream. Absorbing.
    TerminalSignaled,
}

pub struct LastRoundCompensator {
    owner: String,
    round: u64,
    phase: Phase,
    sentinels: Arc<dyn SentinelWriter>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl LastRoundCompensator {
    /// `owner` tags the sentinels this instance writes (typically the processor name).
    pub fn new(
        owner: impl Into<String>,
        sentinels: Arc<dyn SentinelWriter>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            owner: owner.into(),
            round: 0,
            phase: Phase::Active,
            sentinels,
            diagnostics,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Number of rounds seen so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn step(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError> {
        if self.phase == Phase::TerminalSignaled {
            self.drop_stray_round(round);
            return Ok(false);
        }

        if round.is_terminal() {
            self.diagnostics.warning(
                &format!(
                    "[{}] {} received a terminal round {} before its synthetic terminal round; the driver flag is ignored",
                    COMPENSATOR_STAGE_ID, self.owner, self.round
                ),
                None,
            );
        }

        let synthetic = round
            .items()
            .iter()
            .all(|item| is_sentinel(item.simple_name()));

        if synthetic {
            self.phase = Phase::TerminalSignaled;
            self.diagnostics.note(
                &format!(
                    "[{}] synthetic terminal round {} for {}",
                    COMPENSATOR_STAGE_ID, self.round, self.owner
                ),
                None,
            );
        } else {
            self.emit_sentinel();
        }

        next.run(&TerminalOverride::new(round, synthetic))
    }

    fn drop_stray_round(&self, round: &dyn RoundContext) {
        if round.is_terminal() {
            let violation = RoundError::ProtocolViolation(format!(
                "{} received a driver terminal round ({}) after its synthetic terminal round; round dropped",
                self.owner, self.round
            ));
            self.diagnostics.note(&violation.to_string(), None);
        } else {
            self.diagnostics.note(
                &format!(
                    "[{}] {} already processed its last round, skipping round {}",
                    COMPENSATOR_STAGE_ID, self.owner, self.round
                ),
                None,
            );
        }
    }

    fn emit_sentinel(&self) {
        let name = sentinel_name(&self.owner, self.round);
        self.diagnostics.note(
            &format!("[{}] write sentinel {} to force another round", COMPENSATOR_STAGE_ID, name),
            None,
        );
        if let Err(source) = self.sentinels.emit_sentinel(&name) {
            let failure = RoundError::SentinelWrite { name, source };
            self.diagnostics.error(
                &format!("{}; the driver may never schedule the terminal round", failure),
                None,
            );
        }
    }
}

impl Stage for LastRoundCompensator {
    fn id(&self) -> &str {
        COMPENSATOR_STAGE_ID
    }

    fn handle(&mut self, round: &dyn RoundContext, next: Next<'_>) -> Result<bool, StageError> {
        let result = self.step(round, next);
        self.round = self.round.saturating_add(1);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DriverRound;
    use crate::diagnostics::{RecordingDiagnostics, Severity};
    use crate::generation::{GenerationError, MemorySentinelWriter};
    use crate::item::Item;
    use std::io;

    /// Records the terminal flag of every round reaching the handler.
    #[derive(Default)]
    struct Seen(Vec<bool>);

    struct Fixture {
        compensator: LastRoundCompensator,
        sentinels: Arc<MemorySentinelWriter>,
        diagnostics: Arc<RecordingDiagnostics>,
    }

    fn fixture() -> Fixture {
        let sentinels = Arc::new(MemorySentinelWriter::new());
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let compensator = LastRoundCompensator::new("test", sentinels.clone(), diagnostics.clone());
        Fixture {
            compensator,
            sentinels,
            diagnostics,
        }
    }

    fn run(compensator: &mut LastRoundCompensator, round: &DriverRound, seen: &mut Seen) -> bool {
        let mut handler = |round: &dyn RoundContext| -> Result<bool, StageError> {
            seen.0.push(round.is_terminal());
            Ok(true)
        };
        let mut rest: Vec<Box<dyn Stage>> = Vec::new();
        compensator
            .handle(round, Next::new(&mut rest, &mut handler))
            .unwrap()
    }

    fn sentinel(owner: &str, round: u64) -> Item {
        Item::class(format!("gen.{}", sentinel_name(owner, round)))
    }

    #[test]
    fn test_driver_terminal_on_fresh_compensator_is_not_trusted() {
        let mut f = fixture();
        let mut seen = Seen::default();
        let round = DriverRound::from_items([Item::class("a.Foo")]).terminal(true);

        assert!(run(&mut f.compensator, &round, &mut seen));
        assert_eq!(seen.0, vec![false]);
        assert_eq!(f.sentinels.emitted(), vec![sentinel_name("test", 0)]);
        assert_eq!(f.diagnostics.with_severity(Severity::Warning).len(), 1);
    }

    #[test]
    fn test_all_sentinel_round_is_terminal() {
        let mut f = fixture();
        let mut seen = Seen::default();
        let round = DriverRound::from_items([sentinel("test", 4)]);

        assert!(run(&mut f.compensator, &round, &mut seen));
        assert_eq!(seen.0, vec![true]);
        assert_eq!(f.compensator.phase(), Phase::TerminalSignaled);
        assert!(f.sentinels.emitted().is_empty());
    }

    #[test]
    fn test_stop_after_synthetic_round() {
        let mut f = fixture();
        let mut seen = Seen::default();
        let round = DriverRound::from_items([sentinel("test", 4)]);

        assert!(run(&mut f.compensator, &round, &mut seen));
        assert!(!run(&mut f.compensator, &round, &mut seen));
        assert_eq!(seen.0, vec![true]);
        assert_eq!(f.compensator.round(), 2);
    }

    #[test]
    fn test_mixed_round_is_genuine() {
        let mut f = fixture();
        let mut seen = Seen::default();
        let first = DriverRound::from_items([Item::class("a.FooService")]);
        let second = DriverRound::from_items([Item::class("a.FooService"), sentinel("test", 0)]);

        assert!(run(&mut f.compensator, &first, &mut seen));
        assert!(run(&mut f.compensator, &second, &mut seen));
        assert_eq!(seen.0, vec![false, false]);
        assert_eq!(
            f.sentinels.emitted(),
            vec![sentinel_name("test", 0), sentinel_name("test", 1)]
        );
    }

    #[test]
    fn test_foreign_sentinels_count() {
        let mut f = fixture();
        let mut seen = Seen::default();
        let round = DriverRound::from_items([sentinel("other", 0), sentinel("test", 0)]);
        run(&mut f.compensator, &round, &mut seen);
        assert_eq!(seen.0, vec![true]);
    }

    #[test]
    fn test_terminal_after_finalization_is_a_protocol_violation() {
        let mut f = fixture();
        let mut seen = Seen::default();
        run(&mut f.compensator, &DriverRound::default(), &mut seen);
        assert!(!run(
            &mut f.compensator,
            &DriverRound::default().terminal(true),
            &mut seen
        ));

        assert!(!f.diagnostics.has_errors());
        let notes = f.diagnostics.with_severity(Severity::Note);
        assert!(notes.last().unwrap().message.starts_with("PROTOCOL/"));
        assert_eq!(seen.0, vec![true]);
    }

    #[test]
    fn test_well_behaved_driver_finishes_without_errors() {
        let mut f = fixture();
        let mut seen = Seen::default();

        run(&mut f.compensator, &DriverRound::from_items([Item::class("a.A")]), &mut seen);
        run(&mut f.compensator, &DriverRound::from_items([sentinel("test", 0)]), &mut seen);
        assert!(!run(&mut f.compensator, &DriverRound::default().terminal(true), &mut seen));

        assert_eq!(seen.0, vec![false, true]);
        assert_eq!(f.diagnostics.errors().len(), 0);
        assert_eq!(f.diagnostics.with_severity(Severity::Note).len(), 3);
    }

    #[test]
    fn test_round_counter_saturates() {
        let mut f = fixture();
        let mut seen = Seen::default();
        run(&mut f.compensator, &DriverRound::default(), &mut seen);

        f.compensator.round = u64::MAX;
        assert!(!run(&mut f.compensator, &DriverRound::default(), &mut seen));
        assert_eq!(f.compensator.round(), u64::MAX);
    }

    #[test]
    fn test_stray_non_terminal_round_is_a_note() {
        let mut f = fixture();
        let mut seen = Seen::default();
        run(&mut f.compensator, &DriverRound::default(), &mut seen);
        f.diagnostics.clear();

        assert!(!run(&mut f.compensator, &DriverRound::default(), &mut seen));
        assert!(!f.diagnostics.has_errors());
        assert!(f.diagnostics.entries()[0].message.contains("already processed"));
    }

    struct BrokenWriter;

    impl SentinelWriter for BrokenWriter {
        fn emit_sentinel(&self, name: &str) -> Result<(), GenerationError> {
            Err(GenerationError::Io {
                name: name.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn test_sentinel_write_failure_still_runs_round() {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let mut compensator =
            LastRoundCompensator::new("test", Arc::new(BrokenWriter), diagnostics.clone());
        let mut seen = Seen::default();

        assert!(run(&mut compensator, &DriverRound::from_items([Item::class("a.A")]), &mut seen));
        assert_eq!(seen.0, vec![false]);
        assert_eq!(compensator.phase(), Phase::Active);

        let errors = diagnostics.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("SENTINEL/test$last_round_sentinel$round0"));
    }
}
