//! Change descriptors.
//!
//! A [`ChangeSet`] describes what changed on one entity in one mutation. The
//! classifier only ever inspects the kinds of the changed components, so the
//! descriptor records kinds rather than borrowing the component values.

use reflex_foundation::ComponentKind;

/// The `added` / `removed` / `updated` lists of one mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Kinds of components attached by the mutation.
    pub added: Vec<ComponentKind>,
    /// Kinds of components detached by the mutation.
    pub removed: Vec<ComponentKind>,
    /// Kinds of components modified in place by the mutation.
    pub updated: Vec<ComponentKind>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set whose `added` list holds `kinds`.
    #[must_use]
    pub fn added(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            added: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a change set whose `removed` list holds `kinds`.
    #[must_use]
    pub fn removed(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            removed: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a change set with a single updated kind.
    #[must_use]
    pub fn updated(kind: ComponentKind) -> Self {
        Self {
            updated: vec![kind],
            ..Self::default()
        }
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    /// Iterates every changed kind: `added`, then `removed`, then `updated`.
    pub fn iter(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.added
            .iter()
            .chain(&self.removed)
            .chain(&self.updated)
            .copied()
    }
}
