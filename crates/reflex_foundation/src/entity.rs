//! Opaque entity identities.

use std::fmt;

/// Opaque entity identity.
///
/// Entities have reference semantics: two ids are the same entity iff their
/// indices are equal. The core never destroys an entity, so there is no
/// generation counter to detect stale handles.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId {
    index: u64,
}

impl EntityId {
    /// Creates an entity id from a raw index.
    ///
    /// Callers creating entities outside an `Ecs` are responsible for keeping
    /// indices unique.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self { index }
    }

    /// Returns the raw index of this entity.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.index
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.index)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.index)
    }
}
