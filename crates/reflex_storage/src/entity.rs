//! Entity allocation and tracking.
//!
//! An entity becomes *tracked* the first time it is attached to a hierarchy.
//! Tracking happens at most once per entity and is never undone; the set
//! remembers the order in which entities were tracked.

use std::collections::HashSet;

use reflex_foundation::EntityId;

/// Allocates entity ids and records which entities are tracked.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    /// Next index handed out by [`spawn`](Self::spawn).
    next_index: u64,
    /// Tracked entities in tracking order.
    tracked: Vec<EntityId>,
    /// Membership index over `tracked`.
    tracked_set: HashSet<EntityId>,
}

impl EntityStore {
    /// Creates a new empty entity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh entity id.
    ///
    /// Ids passed to [`observe`](Self::observe) or [`track`](Self::track) are
    /// never handed out again.
    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId::new(self.next_index);
        self.next_index += 1;
        id
    }

    /// Records an id minted outside this store so `spawn` skips past it.
    pub fn observe(&mut self, entity: EntityId) {
        if entity.index() >= self.next_index {
            self.next_index = entity.index().saturating_add(1);
        }
    }

    /// Marks an entity as tracked.
    ///
    /// Returns `true` if the entity was not tracked before, i.e. this call is
    /// the entity's first classification point.
    pub fn track(&mut self, entity: EntityId) -> bool {
        if !self.tracked_set.insert(entity) {
            return false;
        }
        self.tracked.push(entity);
        self.observe(entity);
        true
    }

    /// Checks if an entity is tracked.
    #[must_use]
    pub fn is_tracked(&self, entity: EntityId) -> bool {
        self.tracked_set.contains(&entity)
    }

    /// Returns the number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Returns true if no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Iterates tracked entities in tracking order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.tracked.iter().copied()
    }
}
