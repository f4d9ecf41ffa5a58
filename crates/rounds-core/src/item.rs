//! Items: the opaque named entities a driver hands over each round.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The set of items discovered in one round. Identity is the item name.
pub type ItemSet = BTreeSet<Item>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    Field,
    Method,
    Package,
    Other,
}

impl ItemKind {
    /// Whether items of this kind declare a type (and can therefore extend or implement one).
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Enum | Self::Annotation | Self::Record
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Record => "record",
            Self::Field => "field",
            Self::Method => "method",
            Self::Package => "package",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// A discovered item.
///
/// Equality, hashing and ordering only look at `name`, so an [`ItemSet`]
/// never holds two items with the same qualified name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    name: String,
    kind: ItemKind,
    #[serde(default)]
    annotations: BTreeSet<String>,
    #[serde(default)]
    superclasses: BTreeSet<String>,
    #[serde(default)]
    interfaces: BTreeSet<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: BTreeSet::new(),
            superclasses: BTreeSet::new(),
            interfaces: BTreeSet::new(),
        }
    }

    /// Shorthand for a class item.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, ItemKind::Class)
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.insert(annotation.into());
        self
    }

    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.superclasses.insert(superclass.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    /// Qualified name (the identity of the item).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last `.`-separated segment of the name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn annotations(&self) -> &BTreeSet<String> {
        &self.annotations
    }

    pub fn is_annotated_with(&self, annotation: &str) -> bool {
        self.annotations.contains(annotation)
    }

    /// Whether `superclass` appears anywhere in the item's superclass chain.
    pub fn extends(&self, superclass: &str) -> bool {
        self.superclasses.contains(superclass)
    }

    /// Whether `interface` appears anywhere in the item's inheritance hierarchy.
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.contains(interface)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
