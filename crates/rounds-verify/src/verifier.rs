use rounds_core::{Diagnostics, Item, ItemKind};
use std::sync::Arc;

use crate::template::escape;
use crate::verification::Verification;

/// Factory for the common item checks, all reporting to one diagnostics sink.
#[derive(Clone)]
pub struct Verifier {
    diagnostics: Arc<dyn Diagnostics>,
}

impl Verifier {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// A custom check. `message` is a template such as `"x should [not ]be y"`.
    pub fn verify<'a>(
        &'a self,
        item: &'a Item,
        message: impl Into<String>,
        predicate: impl Fn(&Item) -> bool + 'a,
    ) -> Verification<'a> {
        Verification::new(self.diagnostics.as_ref(), item, message, predicate)
    }

    pub fn is_class<'a>(&'a self, item: &'a Item) -> Verification<'a> {
        self.is_kind(item, ItemKind::Class, "a class")
    }

    pub fn is_interface<'a>(&'a self, item: &'a Item) -> Verification<'a> {
        self.is_kind(item, ItemKind::Interface, "an interface")
    }

    pub fn is_enum<'a>(&'a self, item: &'a Item) -> Verification<'a> {
        self.is_kind(item, ItemKind::Enum, "an enum")
    }

    pub fn is_annotation<'a>(&'a self, item: &'a Item) -> Verification<'a> {
        self.is_kind(item, ItemKind::Annotation, "an annotation")
    }

    pub fn is_field<'a>(&'a self, item: &'a Item) -> Verification<'a> {
        self.is_kind(item, ItemKind::Field, "a field")
    }

    pub fn is_annotated_with<'a>(&'a self, item: &'a Item, annotation: &'a str) -> Verification<'a> {
        let message = format!(
            "{} should [not ]be annotated with @{}",
            escape(item.name()),
            escape(annotation)
        );
        self.verify(item, message, move |i| i.is_annotated_with(annotation))
    }

    /// Only type items can extend anything.
    pub fn does_extend<'a>(&'a self, item: &'a Item, superclass: &'a str) -> Verification<'a> {
        let message = format!("{} should [not ]extend {}", escape(item.name()), escape(superclass));
        self.verify(item, message, move |i| i.kind().is_type() && i.extends(superclass))
    }

    /// Only type items can implement anything.
    pub fn does_implement<'a>(&'a self, item: &'a Item, interface: &'a str) -> Verification<'a> {
        let message = format!("{} should [not ]implement {}", escape(item.name()), escape(interface));
        self.verify(item, message, move |i| i.kind().is_type() && i.implements(interface))
    }

    fn is_kind<'a>(&'a self, item: &'a Item, kind: ItemKind, label: &str) -> Verification<'a> {
        let message = format!("{} should [not ]be {}", escape(item.name()), label);
        self.verify(item, message, move |i| i.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Verifiable;
    use rounds_core::{RecordingDiagnostics, Severity};

    fn setup() -> (Arc<RecordingDiagnostics>, Verifier) {
        let recorder = Arc::new(RecordingDiagnostics::new());
        let verifier = Verifier::new(recorder.clone());
        (recorder, verifier)
    }

    #[test]
    fn test_kind_checks() {
        let (recorder, verifier) = setup();
        let class = Item::class("a.Foo");
        let iface = Item::new("a.Bar", ItemKind::Interface);
        let field = Item::new("a.Foo.name", ItemKind::Field);

        assert!(verifier.is_class(&class).fail_on_violation());
        assert!(verifier.is_interface(&iface).fail_on_violation());
        assert!(verifier.is_field(&field).fail_on_violation());
        assert!(verifier.is_enum(&class).not().fail_on_violation());
        assert!(verifier.is_annotation(&class).not().fail_on_violation());
        assert_eq!(recorder.count(), 0);

        assert!(!verifier.is_interface(&class).fail_on_violation());
        assert_eq!(recorder.errors()[0].message, "a.Foo should be an interface");
    }

    #[test]
    fn test_annotation_check() {
        let (recorder, verifier) = setup();
        let item = Item::class("a.FooMapper").annotated("Mapper");

        assert!(verifier.is_annotated_with(&item, "Mapper").is_valid());
        assert!(!verifier.is_annotated_with(&item, "Mapper").not().warn_on_violation());
        assert_eq!(
            recorder.with_severity(Severity::Warning)[0].message,
            "a.FooMapper should not be annotated with @Mapper"
        );
    }

    #[test]
    fn test_extends_and_implements() {
        let (recorder, verifier) = setup();
        let item = Item::class("a.FooImpl").extending("a.Base").implementing("a.Foo");

        assert!(verifier.does_extend(&item, "a.Base").fail_on_violation());
        assert!(verifier.does_implement(&item, "a.Foo").fail_on_violation());
        assert!(!verifier.does_implement(&item, "a.Other").fail_on_violation());
        assert_eq!(recorder.errors()[0].message, "a.FooImpl should implement a.Other");
    }

    #[test]
    fn test_non_types_never_extend() {
        let (_, verifier) = setup();
        let field = Item::new("a.Foo.base", ItemKind::Field).extending("a.Base");
        assert!(!verifier.does_extend(&field, "a.Base").is_valid());
        assert!(verifier.does_extend(&field, "a.Base").not().is_valid());
    }

    #[test]
    fn test_bracketed_names_render_verbatim() {
        let (recorder, verifier) = setup();
        let array = Item::new("int[]", ItemKind::Other);
        assert!(!verifier.is_class(&array).info_on_violation());
        assert_eq!(recorder.entries()[0].message, "int[] should be a class");
    }

    #[test]
    fn test_custom_check_with_reason() {
        let (recorder, verifier) = setup();
        let item = Item::class("a.FooController").annotated("Controller");
        let check = verifier
            .verify(&item, "a.FooController should [not ]end with Impl", |i| {
                i.simple_name().ends_with("Impl")
            })
            .because_annotated("Controller");

        assert!(!check.fail_on_violation());
        assert_eq!(
            recorder.errors()[0].message,
            "a.FooController should end with Impl, because it is annotated with @Controller"
        );
    }
}
