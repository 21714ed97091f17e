//! Persistent filters.
//!
//! A persistent filter accumulates the entities that passed it at their first
//! classification. Membership is decided once, when the entity becomes
//! tracked, and never revisited: later mutations neither add nor remove it.
//!
//! Each distinct filter owns one shared list. Every caller registering an
//! equal filter gets a [`FilterView`] onto that same list.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use reflex_foundation::{ComponentKind, EntityId};
use reflex_storage::ChangeSet;

use crate::filter::ComponentFilter;

// =============================================================================
// Filter View
// =============================================================================

/// Read-only handle onto a persistent filter's entity list.
///
/// The list grows as entities are tracked; the view always sees the current
/// contents. Reads copy out of the list rather than lending it, so no borrow
/// outlives a call.
#[derive(Clone, Debug, Default)]
pub struct FilterView {
    entities: Rc<RefCell<Vec<EntityId>>>,
}

impl FilterView {
    /// Returns true if both views refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entities, &other.entities)
    }

    /// Number of entities in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    /// Returns true if `entity` is in the list.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.borrow().contains(&entity)
    }

    /// Returns the entity at `index`, in classification order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<EntityId> {
        self.entities.borrow().get(index).copied()
    }

    /// Copies the current contents, in classification order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.entities.borrow().clone()
    }

    fn push(&self, entity: EntityId) {
        self.entities.borrow_mut().push(entity);
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug)]
struct PersistentFilter {
    filter: ComponentFilter,
    view: FilterView,
    /// Views created elsewhere for the same filter and adopted later.
    aliases: Vec<FilterView>,
}

/// Persistent filters, in registration order.
#[derive(Debug, Default)]
pub struct PersistentFilterRegistry {
    entries: Vec<PersistentFilter>,
    index: HashMap<ComponentFilter, usize>,
}

impl PersistentFilterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for `filter`, creating the list if needed.
    ///
    /// A newly created list starts empty; entities tracked before its
    /// creation never join it.
    pub fn register(&mut self, filter: ComponentFilter) -> FilterView {
        if let Some(&slot) = self.index.get(&filter) {
            return self.entries[slot].view.clone();
        }
        let view = FilterView::default();
        self.index.insert(filter.clone(), self.entries.len());
        self.entries.push(PersistentFilter {
            filter,
            view: view.clone(),
            aliases: Vec::new(),
        });
        view
    }

    /// Registers a view created before its filter was registered.
    ///
    /// If `filter` is already registered, `view` takes a copy of the existing
    /// list and is kept in step with it from then on.
    pub fn adopt(&mut self, filter: ComponentFilter, view: FilterView) {
        if let Some(&slot) = self.index.get(&filter) {
            let entry = &mut self.entries[slot];
            if !entry.view.ptr_eq(&view) {
                *view.entities.borrow_mut() = entry.view.to_vec();
                entry.aliases.push(view);
            }
            return;
        }
        self.index.insert(filter.clone(), self.entries.len());
        self.entries.push(PersistentFilter {
            filter,
            view,
            aliases: Vec::new(),
        });
    }

    /// Runs every filter against a newly tracked entity.
    ///
    /// Returns the number of lists the entity joined.
    pub fn classify(
        &mut self,
        entity: EntityId,
        kinds: &[ComponentKind],
        change: &ChangeSet,
    ) -> usize {
        let mut joined = 0;
        for entry in &self.entries {
            if entry.filter.test(kinds, change) {
                entry.view.push(entity);
                for alias in &entry.aliases {
                    alias.push(entity);
                }
                joined += 1;
            }
        }
        joined
    }

    /// Looks up the view for `filter` without creating one.
    #[must_use]
    pub fn get(&self, filter: &ComponentFilter) -> Option<FilterView> {
        self.index
            .get(filter)
            .map(|&slot| self.entries[slot].view.clone())
    }

    /// Number of distinct filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no filter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
