//! Component filters.
//!
//! A [`ComponentFilter`] is a pair of kind sets: `must_have` and
//! `can_change`. An entity passes when it carries every kind in `must_have`
//! and, if `can_change` is non-empty, the mutation that triggered
//! classification touched at least one kind in `can_change`.
//!
//! Both sets are kept sorted and deduplicated, so two filters listing the
//! same kinds in a different order compare and hash equal. The registries
//! rely on this to share one entry per distinct filter.

use reflex_foundation::{Component, ComponentKind};
use reflex_storage::ChangeSet;

/// Predicate over an entity's component kinds and a change descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentFilter {
    must_have: Vec<ComponentKind>,
    can_change: Vec<ComponentKind>,
}

fn insert_sorted(kinds: &mut Vec<ComponentKind>, kind: ComponentKind) {
    if let Err(pos) = kinds.binary_search(&kind) {
        kinds.insert(pos, kind);
    }
}

impl ComponentFilter {
    /// Creates a filter that accepts every entity and every change.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires components of type `C`.
    #[must_use]
    pub fn have<C: Component>(self) -> Self {
        self.have_kind(C::KIND)
    }

    /// Requires components of `kind`.
    #[must_use]
    pub fn have_kind(mut self, kind: ComponentKind) -> Self {
        insert_sorted(&mut self.must_have, kind);
        self
    }

    /// Requires every kind in `kinds`.
    #[must_use]
    pub fn have_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        for kind in kinds {
            insert_sorted(&mut self.must_have, kind);
        }
        self
    }

    /// Accepts changes touching components of type `C`.
    #[must_use]
    pub fn changing<C: Component>(self) -> Self {
        self.changing_kind(C::KIND)
    }

    /// Accepts changes touching components of `kind`.
    #[must_use]
    pub fn changing_kind(mut self, kind: ComponentKind) -> Self {
        insert_sorted(&mut self.can_change, kind);
        self
    }

    /// Accepts changes touching any kind in `kinds`.
    #[must_use]
    pub fn changing_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        for kind in kinds {
            insert_sorted(&mut self.can_change, kind);
        }
        self
    }

    /// Required kinds, sorted.
    #[must_use]
    pub fn must_have(&self) -> &[ComponentKind] {
        &self.must_have
    }

    /// Kinds whose change is accepted, sorted. Empty means "any change".
    #[must_use]
    pub fn can_change(&self) -> &[ComponentKind] {
        &self.can_change
    }

    /// Tests an entity, given the kinds it currently carries, against a change.
    ///
    /// An empty `can_change` set places no constraint on the change, so an
    /// empty change still passes such a filter.
    #[must_use]
    pub fn test(&self, kinds: &[ComponentKind], change: &ChangeSet) -> bool {
        self.has_required(kinds) && self.accepts_change(change)
    }

    /// Checks the `must_have` half of the filter.
    #[must_use]
    pub fn has_required(&self, kinds: &[ComponentKind]) -> bool {
        self.must_have.iter().all(|required| kinds.contains(required))
    }

    /// Checks the `can_change` half of the filter.
    #[must_use]
    pub fn accepts_change(&self, change: &ChangeSet) -> bool {
        self.can_change.is_empty()
            || change
                .iter()
                .any(|kind| self.can_change.binary_search(&kind).is_ok())
    }
}
