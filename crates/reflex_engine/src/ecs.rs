//! The ECS instance.
//!
//! [`Ecs`] owns every store and registry. Mutations go through it so that
//! each one can be classified against the registered filters:
//!
//! - `add_component` on a tracked entity classifies immediately against the
//!   observers, before the component is attached.
//! - `update_component` on a tracked entity queues a classification for the
//!   end of the next tick.
//! - `add` tracks an entity the first time it is attached to any relation and
//!   classifies it against observers and persistent filters alike.
//!
//! Components added to an untracked entity are buffered and only take part in
//! classification once the entity is tracked.

use std::fmt;

use reflex_foundation::{
    AnyComponent, Component, ComponentKind, EntityId, Error, Interner, RelationId, Result,
};
use reflex_storage::{ChangeSet, ComponentStore, EntityStore, HierarchyStore, HierarchyUpdate};

use crate::channel::Mailbox;
use crate::config::EcsConfig;
use crate::filter::ComponentFilter;
use crate::observer::{HierarchySubscribers, ObserverRegistry, Subscriber};
use crate::persistent::{FilterView, PersistentFilterRegistry};

/// Observer callback: receives the entities matched since the last tick.
pub type ObserverFn = Box<dyn FnMut(&mut Ecs, &[EntityId]) -> Result<()>>;

/// Hierarchy callback: receives a relation's pending updates in record order.
pub type HierarchyFn = Box<dyn FnMut(&mut Ecs, &[HierarchyUpdate]) -> Result<()>>;

/// Tick callback: runs once per tick, after observers are notified.
pub type TickFn = Box<dyn FnMut(&mut Ecs) -> Result<()>>;

/// A classification deferred to the reclassify phase.
#[derive(Clone, Debug)]
pub(crate) struct PendingClassification {
    pub(crate) entity: EntityId,
    pub(crate) change: ChangeSet,
}

// =============================================================================
// Ecs
// =============================================================================

/// A reactive entity-component store with a fixed-phase tick.
pub struct Ecs {
    pub(crate) config: EcsConfig,
    pub(crate) entities: EntityStore,
    pub(crate) components: ComponentStore,
    pub(crate) hierarchy: HierarchyStore,
    pub(crate) relations: Interner,
    pub(crate) observers: ObserverRegistry<ObserverFn>,
    pub(crate) hierarchy_observers: HierarchySubscribers<HierarchyFn>,
    pub(crate) tick_callbacks: Vec<Subscriber<TickFn>>,
    pub(crate) filters: PersistentFilterRegistry,
    pub(crate) pending: Vec<PendingClassification>,
    pub(crate) systems: Vec<&'static str>,
    pub(crate) mailbox: Option<Mailbox>,
    pub(crate) tick_number: u64,
    pub(crate) in_tick: bool,
}

impl Default for Ecs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ecs")
            .field("tick_number", &self.tick_number)
            .field("tracked", &self.entities.len())
            .field("observers", &self.observers.len())
            .field("persistent_filters", &self.filters.len())
            .field("tick_callbacks", &self.tick_callbacks.len())
            .field("pending", &self.pending.len())
            .field("systems", &self.systems)
            .finish_non_exhaustive()
    }
}

impl Ecs {
    /// Creates an ECS with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EcsConfig::default())
    }

    /// Creates an ECS with the given configuration.
    #[must_use]
    pub fn with_config(config: EcsConfig) -> Self {
        let relations = Interner::new(&config.default_relation);
        Self {
            config,
            entities: EntityStore::new(),
            components: ComponentStore::new(),
            hierarchy: HierarchyStore::new(),
            relations,
            observers: ObserverRegistry::new(),
            hierarchy_observers: HierarchySubscribers::new(),
            tick_callbacks: Vec::new(),
            filters: PersistentFilterRegistry::new(),
            pending: Vec::new(),
            systems: Vec::new(),
            mailbox: None,
            tick_number: 0,
            in_tick: false,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// Mints a fresh, untracked entity.
    pub fn spawn(&mut self) -> EntityId {
        self.entities.spawn()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Appends a component to an entity.
    ///
    /// If the entity is tracked, it is classified against the observers right
    /// away with the new kind as `added`; otherwise the component is buffered.
    /// Classification sees the components the entity had before this one, so
    /// `have(C)` only matches if the entity already carried a `C`.
    pub fn add_component<C: Component>(&mut self, entity: EntityId, component: C) {
        self.entities.observe(entity);
        if self.entities.is_tracked(entity) {
            self.classify(entity, &ChangeSet::added([C::KIND]), false);
        } else {
            log::trace!("buffered {} on untracked {entity}", C::KIND);
        }
        self.components.push(entity, Box::new(component));
    }

    /// Returns the first component of type `C` on an entity.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.components.get::<C>(entity)
    }

    /// Returns the first component of `kind` on an entity, type-erased.
    #[must_use]
    pub fn get_component_of_kind(
        &self,
        entity: EntityId,
        kind: ComponentKind,
    ) -> Option<&(dyn AnyComponent + 'static)> {
        self.components.first_of_kind(entity, kind)
    }

    /// Returns an entity's components in insertion order.
    #[must_use]
    pub fn components(&self, entity: EntityId) -> &[Box<dyn AnyComponent>] {
        self.components.components(entity)
    }

    /// Mutates the first component of type `C` on an entity in place.
    ///
    /// For a tracked entity the change is queued and classified at the end of
    /// the next tick, so observers see it one tick later.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the entity has no component of type `C`;
    /// the mutator is not called.
    pub fn update_component<C, F>(&mut self, entity: EntityId, mutator: F) -> Result<()>
    where
        C: Component,
        F: FnOnce(&mut C),
    {
        let component = self
            .components
            .get_mut::<C>(entity)
            .ok_or_else(|| Error::component_not_found(entity, C::KIND))?;
        mutator(component);

        if self.entities.is_tracked(entity) {
            self.pending.push(PendingClassification {
                entity,
                change: ChangeSet::updated(C::KIND),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Attaches an entity under `parent` in the default relation.
    pub fn add(&mut self, entity: EntityId, parent: Option<EntityId>) {
        self.add_in(entity, parent, RelationId::DEFAULT);
    }

    /// Attaches an entity under `parent` in the named relation.
    pub fn add_to(&mut self, entity: EntityId, parent: Option<EntityId>, relation: &str) {
        let relation = self.relations.intern(relation);
        self.add_in(entity, parent, relation);
    }

    fn add_in(&mut self, entity: EntityId, parent: Option<EntityId>, relation: RelationId) {
        if let Some(parent) = parent {
            self.entities.observe(parent);
        }
        self.hierarchy.add(entity, parent, relation);

        if self.entities.track(entity) {
            let change = ChangeSet::added(self.components.kinds(entity));
            self.classify(entity, &change, true);
            log::debug!("tracking {entity} ({} component(s))", change.added.len());
        }
    }

    /// Returns true once an entity has been attached to any relation.
    #[must_use]
    pub fn is_tracked(&self, entity: EntityId) -> bool {
        self.entities.is_tracked(entity)
    }

    /// Iterates tracked entities in tracking order.
    pub fn tracked(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    /// Returns the parent of an entity in the named relation.
    #[must_use]
    pub fn parent(&self, entity: EntityId, relation: &str) -> Option<EntityId> {
        let relation = self.relations.get(relation)?;
        self.hierarchy.parent(entity, relation)
    }

    /// Returns the children of `parent` in the named relation.
    #[must_use]
    pub fn children(&self, parent: Option<EntityId>, relation: &str) -> &[EntityId] {
        self.relations
            .get(relation)
            .map_or(&[], |relation| self.hierarchy.children(parent, relation))
    }

    /// Returns the entities attached at the root of the named relation.
    #[must_use]
    pub fn roots(&self, relation: &str) -> &[EntityId] {
        self.children(None, relation)
    }

    /// Returns the hierarchy updates not yet delivered for the named relation.
    #[must_use]
    pub fn pending_hierarchy_updates(&self, relation: &str) -> &[HierarchyUpdate] {
        self.relations
            .get(relation)
            .map_or(&[], |relation| self.hierarchy.pending(relation))
    }

    /// Resolves an interned relation back to its name.
    #[must_use]
    pub fn relation_name(&self, relation: RelationId) -> Option<&str> {
        self.relations.resolve(relation)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Returns the persistent list for `filter`, creating it if needed.
    ///
    /// Equal filters share one list. Only entities tracked after the list was
    /// created can join it.
    pub fn filter_entities(&mut self, filter: ComponentFilter) -> FilterView {
        log::debug!("persistent filter {filter:?}");
        self.filters.register(filter)
    }

    /// Subscribes to entities matching `filter`, delivered once per tick.
    pub fn observe_entities<F>(&mut self, filter: ComponentFilter, callback: F)
    where
        F: FnMut(&mut Ecs, &[EntityId]) -> Result<()> + 'static,
    {
        self.subscribe_observer("observer", filter, Box::new(callback));
    }

    /// Subscribes to hierarchy updates of the named relation.
    pub fn observe_hierarchy<F>(&mut self, relation: &str, callback: F)
    where
        F: FnMut(&mut Ecs, &[HierarchyUpdate]) -> Result<()> + 'static,
    {
        self.subscribe_hierarchy("hierarchy observer", relation, Box::new(callback));
    }

    /// Registers a callback run once per tick.
    pub fn on_tick<F>(&mut self, callback: F)
    where
        F: FnMut(&mut Ecs) -> Result<()> + 'static,
    {
        self.subscribe_tick("tick callback", Box::new(callback));
    }

    pub(crate) fn subscribe_observer(
        &mut self,
        label: impl Into<String>,
        filter: ComponentFilter,
        callback: ObserverFn,
    ) {
        let subscriber = Subscriber::new(label, callback);
        log::debug!("{} observes {filter:?}", subscriber.label);
        self.observers.subscribe(filter, subscriber);
    }

    pub(crate) fn subscribe_hierarchy(
        &mut self,
        label: impl Into<String>,
        relation: &str,
        callback: HierarchyFn,
    ) {
        let subscriber = Subscriber::new(label, callback);
        log::debug!("{} observes relation '{relation}'", subscriber.label);
        let relation = self.relations.intern(relation);
        self.hierarchy_observers.subscribe(relation, subscriber);
    }

    pub(crate) fn subscribe_tick(&mut self, label: impl Into<String>, callback: TickFn) {
        let subscriber = Subscriber::new(label, callback);
        log::debug!("{} runs on tick", subscriber.label);
        self.tick_callbacks.push(subscriber);
    }

    /// Names of the registered systems, in registration order.
    #[must_use]
    pub fn systems(&self) -> &[&'static str] {
        &self.systems
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Entities matched by `filter`'s observer since the last notify phase.
    ///
    /// Empty if no observer uses `filter`.
    #[must_use]
    pub fn observed(&self, filter: &ComponentFilter) -> &[EntityId] {
        self.observers.get(filter).map_or(&[], |entry| entry.matches())
    }

    /// Number of classifications queued for the next reclassify phase.
    #[must_use]
    pub fn pending_classifications(&self) -> usize {
        self.pending.len()
    }

    /// Classifies an entity against the observers and, on its first
    /// classification, the persistent filters.
    pub(crate) fn classify(&mut self, entity: EntityId, change: &ChangeSet, first: bool) {
        let kinds: Vec<ComponentKind> = self.components.kinds(entity).collect();
        let observed = self.observers.classify(entity, &kinds, change);
        let persisted = if first {
            self.filters.classify(entity, &kinds, change)
        } else {
            0
        };
        log::trace!(
            "classified {entity}: {observed} observer match(es), {persisted} persistent match(es)"
        );
    }
}
