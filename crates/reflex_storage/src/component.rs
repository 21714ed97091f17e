//! Component storage.
//!
//! Each entity owns an ordered sequence of type-erased component values.
//! Several components of the same kind may coexist on one entity; lookups by
//! kind return the first match in insertion order.

use std::collections::HashMap;

use reflex_foundation::{AnyComponent, Component, ComponentKind, EntityId};

/// Stores all component values, per entity, in insertion order.
///
/// The store does not know whether an entity is tracked: components may be
/// buffered here before the entity is ever classified.
#[derive(Debug, Default)]
pub struct ComponentStore {
    /// Component values: entity -> ordered components.
    data: HashMap<EntityId, Vec<Box<dyn AnyComponent>>>,
}

impl ComponentStore {
    /// Creates a new empty component store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component to an entity's sequence.
    pub fn push(&mut self, entity: EntityId, component: Box<dyn AnyComponent>) {
        self.data.entry(entity).or_default().push(component);
    }

    /// Returns the first component of type `T` on an entity.
    #[must_use]
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.data
            .get(&entity)?
            .iter()
            .find_map(|c| c.downcast_ref::<T>())
    }

    /// Returns the first component of type `T` on an entity, mutably.
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.data
            .get_mut(&entity)?
            .iter_mut()
            .find_map(|c| c.downcast_mut::<T>())
    }

    /// Returns the first component of `kind` on an entity, type-erased.
    #[must_use]
    pub fn first_of_kind(
        &self,
        entity: EntityId,
        kind: ComponentKind,
    ) -> Option<&(dyn AnyComponent + 'static)> {
        self.data
            .get(&entity)?
            .iter()
            .find(|c| c.is_kind(kind))
            .map(AsRef::as_ref)
    }

    /// Checks if an entity carries at least one component of `kind`.
    #[must_use]
    pub fn has(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.first_of_kind(entity, kind).is_some()
    }

    /// Returns an entity's components in insertion order.
    ///
    /// Unknown entities yield an empty slice.
    #[must_use]
    pub fn components(&self, entity: EntityId) -> &[Box<dyn AnyComponent>] {
        self.data.get(&entity).map_or(&[], Vec::as_slice)
    }

    /// Iterates the kinds of an entity's components in insertion order.
    pub fn kinds(&self, entity: EntityId) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components(entity).iter().map(|c| c.kind())
    }

    /// Returns the number of components on an entity.
    #[must_use]
    pub fn count(&self, entity: EntityId) -> usize {
        self.components(entity).len()
    }

    /// Returns the number of entities holding at least one component.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.data.len()
    }
}
