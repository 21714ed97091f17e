//! String interning for hierarchy relation names.
//!
//! Relations are named by strings at the API surface and interned so the
//! hierarchy manager can index them densely. Ids are handed out in first-seen
//! order, which is also the order in which relations are flushed each tick.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Interned relation identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RelationId(pub(crate) u32);

impl RelationId {
    /// The relation used when no relation name is given.
    ///
    /// Always interned first, whatever name the interner was created with.
    pub const DEFAULT: RelationId = RelationId(0);

    /// Rebuilds an id from its raw index.
    ///
    /// The id is only meaningful for the interner that produced the index.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this relation.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationId({})", self.0)
    }
}

/// Interner mapping relation names to dense [`RelationId`]s.
///
/// Not thread-safe; owned by a single `Ecs`.
#[derive(Clone, Debug)]
pub struct Interner {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, RelationId>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new("default")
    }
}

impl Interner {
    /// Creates an interner with `default_name` pre-interned as
    /// [`RelationId::DEFAULT`].
    #[must_use]
    pub fn new(default_name: &str) -> Self {
        let mut interner = Self {
            names: Vec::new(),
            ids: HashMap::new(),
        };
        let id = interner.intern(default_name);
        debug_assert_eq!(id, RelationId::DEFAULT);
        interner
    }

    /// Interns a relation name, returning its id.
    ///
    /// # Panics
    ///
    /// Panics if the number of interned relations exceeds `u32::MAX`.
    pub fn intern(&mut self, name: &str) -> RelationId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }

        let id = RelationId(u32::try_from(self.names.len()).expect("too many relations"));
        let arc: Arc<str> = name.into();
        self.names.push(arc.clone());
        self.ids.insert(arc, id);
        id
    }

    /// Looks up a relation name without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RelationId> {
        self.ids.get(name).copied()
    }

    /// Resolves a relation id back to its name.
    #[must_use]
    pub fn resolve(&self, id: RelationId) -> Option<&str> {
        self.names.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the number of interned relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: the default relation is interned on creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates relation ids in first-seen order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn ids(&self) -> impl Iterator<Item = RelationId> + '_ {
        (0..self.names.len()).map(|i| RelationId(i as u32))
    }
}
