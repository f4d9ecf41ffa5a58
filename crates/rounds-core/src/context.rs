//! Round Context: read-only view of one processing round
use crate::item::{Item, ItemSet};

/// What every stage and the terminal handler get to see of a round.
///
/// There are deliberately no provided methods: decorators such as
/// [`crate::proxy::TerminalOverride`] must forward each call to the wrapped
/// context exactly once.
pub trait RoundContext {
    /// Every item discovered in this round.
    fn items(&self) -> &ItemSet;

    /// Whether this round is the last one.
    fn is_terminal(&self) -> bool;

    /// Whether an earlier round (or the driver) raised an error.
    fn has_errors(&self) -> bool;

    /// Items of this round carrying `annotation`.
    fn annotated_with(&self, annotation: &str) -> Vec<&Item>;

    /// Items of this round carrying at least one of `annotations`.
    fn annotated_with_any(&self, annotations: &[&str]) -> Vec<&Item>;
}

/// The context built from a single driver call. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct DriverRound {
    items: ItemSet,
    terminal: bool,
    errors: bool,
}

impl DriverRound {
    pub fn new(items: ItemSet, terminal: bool, errors: bool) -> Self {
        Self {
            items,
            terminal,
            errors,
        }
    }

    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        Self::new(items.into_iter().collect(), false, false)
    }

    pub fn terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn with_errors(mut self, errors: bool) -> Self {
        self.errors = errors;
        self
    }
}

impl RoundContext for DriverRound {
    fn items(&self) -> &ItemSet {
        &self.items
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn has_errors(&self) -> bool {
        self.errors
    }

    fn annotated_with(&self, annotation: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.is_annotated_with(annotation))
            .collect()
    }

    fn annotated_with_any(&self, annotations: &[&str]) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| annotations.iter().any(|a| item.is_annotated_with(a)))
            .collect()
    }
}
