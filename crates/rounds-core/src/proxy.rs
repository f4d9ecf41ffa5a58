//! Terminal-flag override for a round context.
use crate::context::RoundContext;
use crate::item::{Item, ItemSet};

/// Read-through decorator that replaces only [`RoundContext::is_terminal`].
///
/// Every other query reaches the wrapped context exactly once per call and
/// nothing is cached.
pub struct TerminalOverride<'r> {
    inner: &'r dyn RoundContext,
    terminal: bool,
}

impl<'r> TerminalOverride<'r> {
    pub fn new(inner: &'r dyn RoundContext, terminal: bool) -> Self {
        Self { inner, terminal }
    }

    /// The undecorated context.
    pub fn inner(&self) -> &'r dyn RoundContext {
        self.inner
    }
}

impl RoundContext for TerminalOverride<'_> {
    fn items(&self) -> &ItemSet {
        self.inner.items()
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn has_errors(&self) -> bool {
        self.inner.has_errors()
    }

    fn annotated_with(&self, annotation: &str) -> Vec<&Item> {
        self.inner.annotated_with(annotation)
    }

    fn annotated_with_any(&self, annotations: &[&str]) -> Vec<&Item> {
        self.inner.annotated_with_any(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DriverRound;
    use std::cell::Cell;

    /// Counts every call that reaches the wrapped context.
    struct CountingRound {
        round: DriverRound,
        items: Cell<usize>,
        terminal: Cell<usize>,
        errors: Cell<usize>,
        annotated: Cell<usize>,
        annotated_any: Cell<usize>,
    }

    impl CountingRound {
        fn new(round: DriverRound) -> Self {
            Self {
                round,
                items: Cell::new(0),
                terminal: Cell::new(0),
                errors: Cell::new(0),
                annotated: Cell::new(0),
                annotated_any: Cell::new(0),
            }
        }
    }

    impl RoundContext for CountingRound {
        fn items(&self) -> &ItemSet {
            self.items.set(self.items.get() + 1);
            self.round.items()
        }

        fn is_terminal(&self) -> bool {
            self.terminal.set(self.terminal.get() + 1);
            self.round.is_terminal()
        }

        fn has_errors(&self) -> bool {
            self.errors.set(self.errors.get() + 1);
            self.round.has_errors()
        }

        fn annotated_with(&self, annotation: &str) -> Vec<&Item> {
            self.annotated.set(self.annotated.get() + 1);
            self.round.annotated_with(annotation)
        }

        fn annotated_with_any(&self, annotations: &[&str]) -> Vec<&Item> {
            self.annotated_any.set(self.annotated_any.get() + 1);
            self.round.annotated_with_any(annotations)
        }
    }

    fn counting() -> CountingRound {
        CountingRound::new(
            DriverRound::from_items([
                Item::class("a.F1").annotated("Override"),
                Item::class("a.F2").annotated("Deprecated"),
            ])
            .with_errors(true),
        )
    }

    #[test]
    fn test_override_terminal_flag() {
        let inner = counting();
        assert!(TerminalOverride::new(&inner, true).is_terminal());
        assert!(!TerminalOverride::new(&inner, false).is_terminal());
        assert_eq!(inner.terminal.get(), 0);
    }

    #[test]
    fn test_delegates_once_per_call() {
        let inner = counting();
        let proxy = TerminalOverride::new(&inner, true);

        assert_eq!(proxy.items(), inner.round.items());
        assert_eq!(inner.items.get(), 1);

        assert!(proxy.has_errors());
        assert!(proxy.has_errors());
        assert_eq!(inner.errors.get(), 2);

        let annotated: Vec<_> = proxy.annotated_with("Override").iter().map(|i| i.name()).collect();
        assert_eq!(annotated, vec!["a.F1"]);
        assert_eq!(inner.annotated.get(), 1);

        assert_eq!(proxy.annotated_with_any(&["Override", "Deprecated"]).len(), 2);
        assert_eq!(inner.annotated_any.get(), 1);
        assert_eq!(inner.annotated.get(), 1);
    }

    #[test]
    fn test_nested_override_reaches_innermost() {
        let inner = counting();
        let first = TerminalOverride::new(&inner, false);
        let second = TerminalOverride::new(&first, true);
        assert!(second.is_terminal());
        assert!(!second.inner().is_terminal());
        assert_eq!(second.items().len(), 2);
        assert_eq!(inner.items.get(), 1);
    }
}
