use rounds_core::{Diagnostics, Item};
use std::fmt;

use crate::template;

type Predicate<'a> = Box<dyn Fn(&Item) -> bool + 'a>;

/// Outcome-reporting side of a verification.
pub trait Verifiable {
    /// Reports a violation as an error. Returns `true` when the item passes.
    fn fail_on_violation(&self) -> bool;

    /// Reports a violation as a warning. Returns `true` when the item passes.
    fn warn_on_violation(&self) -> bool;

    /// Reports a violation as a note. Returns `true` when the item passes.
    fn info_on_violation(&self) -> bool;

    /// Evaluates without reporting anything.
    fn is_valid(&self) -> bool;
}

/// A single check of one item against a predicate.
///
/// The message is a template (see [`template::render`]) describing the
/// expected state in its negatable form, e.g. `"{item} should [not ]be a class"`.
/// [`Verification::not`] inverts the expectation.
pub struct Verification<'a> {
    diagnostics: &'a dyn Diagnostics,
    item: &'a Item,
    predicate: Predicate<'a>,
    message: String,
    inverted: bool,
}

impl<'a> Verification<'a> {
    pub fn new(
        diagnostics: &'a dyn Diagnostics,
        item: &'a Item,
        message: impl Into<String>,
        predicate: impl Fn(&Item) -> bool + 'a,
    ) -> Self {
        Self {
            diagnostics,
            item,
            predicate: Box::new(predicate),
            message: message.into(),
            inverted: false,
        }
    }

    /// Expects the predicate not to hold.
    pub fn not(mut self) -> Self {
        self.inverted = !self.inverted;
        self
    }

    /// Appends a reason to the reported message.
    pub fn because(self, reason: impl fmt::Display) -> Reasoned<'a> {
        let message = format!("{}, because {}", self.message, reason);
        Reasoned(Self { message, ..self })
    }

    /// Appends "because it is annotated with @annotation" to the reported message.
    pub fn because_annotated(self, annotation: &str) -> Reasoned<'a> {
        self.because(format_args!("it is annotated with @{}", template::escape(annotation)))
    }

    pub fn item(&self) -> &Item {
        self.item
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The message as it would be reported.
    pub fn message(&self) -> String {
        template::render(&self.message, self.inverted)
    }

    fn check(&self, report: impl FnOnce(&dyn Diagnostics, &str, Option<&Item>)) -> bool {
        let violated = self.inverted == (self.predicate)(self.item);
        if violated {
            report(self.diagnostics, &self.message(), Some(self.item));
        }
        !violated
    }
}

impl Verifiable for Verification<'_> {
    fn fail_on_violation(&self) -> bool {
        self.check(|d, message, item| d.error(message, item))
    }

    fn warn_on_violation(&self) -> bool {
        self.check(|d, message, item| d.warning(message, item))
    }

    fn info_on_violation(&self) -> bool {
        self.check(|d, message, item| d.note(message, item))
    }

    fn is_valid(&self) -> bool {
        self.inverted != (self.predicate)(self.item)
    }
}

impl fmt::Debug for Verification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verification")
            .field("item", &self.item.name())
            .field("message", &self.message)
            .field("inverted", &self.inverted)
            .finish()
    }
}

/// A verification with its reason attached. Can only be reported or evaluated.
#[derive(Debug)]
pub struct Reasoned<'a>(Verification<'a>);

impl Reasoned<'_> {
    pub fn message(&self) -> String {
        self.0.message()
    }
}

impl Verifiable for Reasoned<'_> {
    fn fail_on_violation(&self) -> bool {
        self.0.fail_on_violation()
    }

    fn warn_on_violation(&self) -> bool {
        self.0.warn_on_violation()
    }

    fn info_on_violation(&self) -> bool {
        self.0.info_on_violation()
    }

    fn is_valid(&self) -> bool {
        self.0.is_valid()
    }
}
