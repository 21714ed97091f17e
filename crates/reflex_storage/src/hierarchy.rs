//! Relation hierarchies with pending-update queues.
//!
//! Each named relation keeps its own parent -> children edges and its own
//! queue of updates not yet delivered to subscribers. An entity has at most
//! one parent per relation; relations are independent of each other.

use std::collections::HashMap;

use reflex_foundation::{EntityId, RelationId};

// =============================================================================
// Updates
// =============================================================================

/// Operation recorded in a pending-update queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HierarchyOp {
    /// The entity was attached under `parent`.
    Added,
}

/// One `(operation, entity, parent)` entry of a pending-update queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyUpdate {
    /// What happened.
    pub op: HierarchyOp,
    /// The child entity.
    pub entity: EntityId,
    /// The parent, or `None` for a root attachment.
    pub parent: Option<EntityId>,
}

impl HierarchyUpdate {
    /// Creates an `Added` update.
    #[must_use]
    pub const fn added(entity: EntityId, parent: Option<EntityId>) -> Self {
        Self {
            op: HierarchyOp::Added,
            entity,
            parent,
        }
    }
}

// =============================================================================
// Per-relation edges
// =============================================================================

#[derive(Clone, Debug, Default)]
struct RelationEdges {
    /// parent (None = root) -> ordered children.
    children: HashMap<Option<EntityId>, Vec<EntityId>>,
    /// child -> parent (None = root).
    parents: HashMap<EntityId, Option<EntityId>>,
    /// Updates recorded since the last flush.
    pending: Vec<HierarchyUpdate>,
}

// =============================================================================
// Hierarchy Store
// =============================================================================

/// Stores hierarchy edges and pending updates for every relation.
///
/// Relations are indexed densely by [`RelationId`]; storage for a relation is
/// created the first time it is touched.
#[derive(Clone, Debug, Default)]
pub struct HierarchyStore {
    relations: Vec<RelationEdges>,
}

impl HierarchyStore {
    /// Creates a new empty hierarchy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn relation_mut(&mut self, relation: RelationId) -> &mut RelationEdges {
        let idx = relation.index() as usize;
        if idx >= self.relations.len() {
            self.relations.resize_with(idx + 1, RelationEdges::default);
        }
        &mut self.relations[idx]
    }

    fn relation(&self, relation: RelationId) -> Option<&RelationEdges> {
        self.relations.get(relation.index() as usize)
    }

    /// Attaches `entity` under `parent` in `relation` and queues an update.
    ///
    /// Attaching under a new parent moves the entity out of its previous
    /// parent's children. Attaching under the same parent again leaves the
    /// edges unchanged but still queues an update.
    pub fn add(&mut self, entity: EntityId, parent: Option<EntityId>, relation: RelationId) {
        let edges = self.relation_mut(relation);

        let previous = edges.parents.insert(entity, parent);
        if previous != Some(parent) {
            if let Some(old_parent) = previous {
                if let Some(siblings) = edges.children.get_mut(&old_parent) {
                    siblings.retain(|&c| c != entity);
                }
            }
            edges.children.entry(parent).or_default().push(entity);
        }

        edges.pending.push(HierarchyUpdate::added(entity, parent));
        log::trace!("hierarchy {relation:?}: {entity} added under {parent:?}");
    }

    /// Returns whether `entity` has been attached in `relation`.
    #[must_use]
    pub fn contains(&self, entity: EntityId, relation: RelationId) -> bool {
        self.relation(relation)
            .is_some_and(|edges| edges.parents.contains_key(&entity))
    }

    /// Returns the parent of `entity` in `relation`.
    ///
    /// `None` both for roots and for entities never attached in `relation`;
    /// use [`contains`](Self::contains) to tell them apart.
    #[must_use]
    pub fn parent(&self, entity: EntityId, relation: RelationId) -> Option<EntityId> {
        self.relation(relation)?.parents.get(&entity).copied().flatten()
    }

    /// Returns the children of `parent` in `relation`, in attachment order.
    ///
    /// `parent = None` yields the roots.
    #[must_use]
    pub fn children(&self, parent: Option<EntityId>, relation: RelationId) -> &[EntityId] {
        self.relation(relation)
            .and_then(|edges| edges.children.get(&parent))
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates the relation -> parent mapping of an entity.
    pub fn parents_of(
        &self,
        entity: EntityId,
    ) -> impl Iterator<Item = (RelationId, Option<EntityId>)> + '_ {
        self.relations
            .iter()
            .enumerate()
            .filter_map(move |(idx, edges)| {
                let parent = *edges.parents.get(&entity)?;
                #[allow(clippy::cast_possible_truncation)]
                let relation = RelationId::from_index(idx as u32);
                Some((relation, parent))
            })
    }

    /// Returns the updates queued for `relation` and not yet flushed.
    #[must_use]
    pub fn pending(&self, relation: RelationId) -> &[HierarchyUpdate] {
        self.relation(relation).map_or(&[], |edges| edges.pending.as_slice())
    }

    /// Returns the total number of queued updates across relations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.relations.iter().map(|edges| edges.pending.len()).sum()
    }

    /// Takes every non-empty pending queue, in relation order.
    ///
    /// Afterwards all queues are empty; updates recorded later accumulate in
    /// fresh queues.
    pub fn take_pending(&mut self) -> Vec<(RelationId, Vec<HierarchyUpdate>)> {
        self.relations
            .iter_mut()
            .enumerate()
            .filter(|(_, edges)| !edges.pending.is_empty())
            .map(|(idx, edges)| {
                #[allow(clippy::cast_possible_truncation)]
                let relation = RelationId::from_index(idx as u32);
                (relation, std::mem::take(&mut edges.pending))
            })
            .collect()
    }
}
